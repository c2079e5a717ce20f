use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    db::store::{ConsumptionStore, MediaCatalog, SocialGraph},
    error::AppResult,
    models::{
        Book, ConsumedMedia, ContentSignals, Film, MediaId, MediaItem, MediaKind, Music, UserId,
    },
    services::pagination::{Page, PageRequest},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Column layout of one catalog table
struct CatalogTable {
    table: &'static str,
    id_column: &'static str,
    creator_column: &'static str,
    tag_column: &'static str,
}

const BOOKS: CatalogTable = CatalogTable {
    table: "books",
    id_column: "book_id",
    creator_column: "author",
    tag_column: "publisher",
};

const CINEMA: CatalogTable = CatalogTable {
    table: "cinema",
    id_column: "cinema_id",
    creator_column: "director",
    tag_column: "type",
};

const MUSIC: CatalogTable = CatalogTable {
    table: "music",
    id_column: "music_id",
    creator_column: "artist",
    tag_column: "label",
};

impl CatalogTable {
    fn for_kind(kind: MediaKind) -> &'static CatalogTable {
        match kind {
            MediaKind::Book => &BOOKS,
            MediaKind::Film => &CINEMA,
            MediaKind::Music => &MUSIC,
        }
    }

    /// Select list projecting the table onto [`CatalogRow`], table aliased as `c`
    fn columns(&self) -> String {
        format!(
            "c.{id} AS id, c.title, c.{creator} AS creator, c.genre, c.year, c.country, \
             c.language, c.{tag} AS type_tag, c.description, c.coverart",
            id = self.id_column,
            creator = self.creator_column,
            tag = self.tag_column,
        )
    }
}

/// Common projection of the three catalog tables
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: i64,
    title: String,
    creator: Option<String>,
    genre: Option<String>,
    year: Option<i32>,
    country: Option<String>,
    language: Option<String>,
    type_tag: Option<String>,
    description: Option<String>,
    coverart: Option<String>,
}

impl CatalogRow {
    fn into_item(self, kind: MediaKind) -> MediaItem {
        match kind {
            MediaKind::Book => MediaItem::Book(Book {
                id: self.id,
                title: self.title,
                author: self.creator,
                genre: self.genre,
                year: self.year,
                country: self.country,
                language: self.language,
                publisher: self.type_tag,
                description: self.description,
                coverart: self.coverart,
            }),
            MediaKind::Film => MediaItem::Film(Film {
                id: self.id,
                title: self.title,
                director: self.creator,
                genre: self.genre,
                year: self.year,
                country: self.country,
                language: self.language,
                film_type: self.type_tag,
                description: self.description,
                coverart: self.coverart,
            }),
            MediaKind::Music => MediaItem::Music(Music {
                id: self.id,
                title: self.title,
                artist: self.creator,
                genre: self.genre,
                year: self.year,
                country: self.country,
                language: self.language,
                label: self.type_tag,
                description: self.description,
                coverart: self.coverart,
            }),
        }
    }
}

/// Escapes LIKE wildcards so a genre token only matches literally
fn like_pattern(token: &str) -> String {
    let escaped = token
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends `(<signal OR ...>) AND NOT c.id = ANY(exclude)`
fn push_signal_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    table: &CatalogTable,
    signals: &ContentSignals,
    exclude_ids: &[MediaId],
) {
    builder.push(" WHERE (FALSE");

    if !signals.creators.is_empty() {
        builder
            .push(format!(" OR c.{} = ANY(", table.creator_column))
            .push_bind(signals.creators.iter().cloned().collect::<Vec<_>>())
            .push(")");
    }
    if !signals.genres.is_empty() {
        builder
            .push(" OR c.genre LIKE ANY(")
            .push_bind(signals.genres.iter().map(|g| like_pattern(g)).collect::<Vec<_>>())
            .push(")");
    }
    if !signals.countries.is_empty() {
        builder
            .push(" OR c.country = ANY(")
            .push_bind(signals.countries.iter().cloned().collect::<Vec<_>>())
            .push(")");
    }
    if !signals.years.is_empty() {
        builder
            .push(" OR c.year = ANY(")
            .push_bind(signals.years.iter().copied().collect::<Vec<i32>>())
            .push(")");
    }
    if !signals.languages.is_empty() {
        builder
            .push(" OR c.language = ANY(")
            .push_bind(signals.languages.iter().cloned().collect::<Vec<_>>())
            .push(")");
    }
    if !signals.type_tags.is_empty() {
        builder
            .push(format!(" OR c.{} = ANY(", table.tag_column))
            .push_bind(signals.type_tags.iter().cloned().collect::<Vec<_>>())
            .push(")");
    }

    builder
        .push(format!(") AND NOT (c.{} = ANY(", table.id_column))
        .push_bind(exclude_ids.to_vec())
        .push("))");
}

/// Postgres-backed catalog, consumption store and social graph
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MediaCatalog for PgStore {
    async fn find_matching(
        &self,
        kind: MediaKind,
        signals: &ContentSignals,
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>> {
        let table = CatalogTable::for_kind(kind);

        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} c",
            table.table
        ));
        push_signal_filter(&mut count, table, signals, exclude_ids);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} c",
            table.columns(),
            table.table
        ));
        push_signal_filter(&mut select, table, signals, exclude_ids);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<CatalogRow> = select.build_query_as::<CatalogRow>().fetch_all(&self.pool).await?;

        tracing::debug!(
            kind = %kind,
            total = total,
            returned = rows.len(),
            "Content match query completed"
        );

        Ok(Page::from_slice(
            rows.into_iter().map(|row| row.into_item(kind)).collect(),
            total.max(0) as u64,
            page,
        ))
    }

    async fn find_consumed_by(
        &self,
        kind: MediaKind,
        user_ids: &[UserId],
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>> {
        if user_ids.is_empty() {
            return Ok(Page::empty(page));
        }

        let table = CatalogTable::for_kind(kind);
        let from = format!(
            "FROM {table} c JOIN user_media um ON um.{id} = c.{id} \
             WHERE um.user_id = ANY($1) AND NOT (c.{id} = ANY($2))",
            table = table.table,
            id = table.id_column,
        );

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(DISTINCT c.{}) {}",
            table.id_column, from
        ))
        .bind(user_ids)
        .bind(exclude_ids)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<CatalogRow> = sqlx::query_as(&format!(
            "SELECT DISTINCT {} {} ORDER BY id LIMIT $3 OFFSET $4",
            table.columns(),
            from
        ))
        .bind(user_ids)
        .bind(exclude_ids)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_slice(
            rows.into_iter().map(|row| row.into_item(kind)).collect(),
            total.max(0) as u64,
            page,
        ))
    }

    async fn find_by_exact_title(
        &self,
        kind: MediaKind,
        title: &str,
    ) -> AppResult<Option<MediaItem>> {
        let table = CatalogTable::for_kind(kind);
        let row: Option<CatalogRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} c WHERE c.title = $1 ORDER BY id LIMIT 1",
            table.columns(),
            table.table
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.into_item(kind)))
    }
}

#[async_trait::async_trait]
impl ConsumptionStore for PgStore {
    async fn list_consumed(&self, user_id: UserId) -> AppResult<ConsumedMedia> {
        let mut consumed = ConsumedMedia::new();

        for kind in MediaKind::ALL {
            let table = CatalogTable::for_kind(kind);
            let rows: Vec<CatalogRow> = sqlx::query_as(&format!(
                "SELECT DISTINCT {columns} FROM {table} c \
                 JOIN user_media um ON um.{id} = c.{id} \
                 WHERE um.user_id = $1 ORDER BY id",
                columns = table.columns(),
                table = table.table,
                id = table.id_column,
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

            for row in rows {
                consumed.push(row.into_item(kind));
            }
        }

        Ok(consumed)
    }
}

#[async_trait::async_trait]
impl SocialGraph for PgStore {
    async fn list_followees(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let followees: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT followed_id
            FROM follows
            WHERE follower_id = $1
            ORDER BY followed_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followees)
    }
}
