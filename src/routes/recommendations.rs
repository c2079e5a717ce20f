use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        CandidateItem, Focus, MediaKind, RecommendationCandidate, RecommendationQuery, Source,
        UserId,
    },
    services::pagination::PageRequest,
};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    pub focus: Option<String>,
    pub focus_value: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl RecommendationParams {
    fn into_query(self, user_id: UserId, default_page_size: u32) -> AppResult<RecommendationQuery> {
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_page_size),
        )?;
        let mut query = RecommendationQuery::new(user_id, page);

        match (self.focus.as_deref(), self.focus_value.as_deref()) {
            (Some(focus), Some(value)) => {
                let focus = Focus::parse(focus, value).map_err(AppError::InvalidInput)?;
                query = query.with_focus(focus);
            }
            (None, None) => {}
            _ => {
                return Err(AppError::InvalidInput(
                    "focus and focus_value must be given together".to_string(),
                ))
            }
        }

        if let Some(media_type) = self.media_type.as_deref().filter(|t| !t.is_empty()) {
            let kind = media_type
                .parse::<MediaKind>()
                .map_err(AppError::InvalidInput)?;
            query = query.with_media_kind(kind);
        }

        Ok(query)
    }
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    pub source: Source,
    pub resolved: bool,
    pub item: CandidateItem,
}

impl From<RecommendationCandidate> for CandidateResponse {
    fn from(candidate: RecommendationCandidate) -> Self {
        Self {
            media_type: candidate.media_kind(),
            source: candidate.source,
            resolved: candidate.is_resolved(),
            item: candidate.item,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<CandidateResponse>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// GET /api/v1/users/:user_id/recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationParams>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RecommendationResponse>> {
    let query = params.into_query(user_id, state.default_page_size)?;
    tracing::debug!(request_id = %request_id, user_id = user_id, query = ?query, "Recommendation request");

    let page = state.engine.recommend(&query).await?;

    Ok(Json(RecommendationResponse {
        recommendations: page.recommendations.into_iter().map(Into::into).collect(),
        current_page: page.current_page,
        total_pages: page.total_pages,
    }))
}
