//! Recommendation engine
//!
//! Loads a user's history, fans out to the content, collaborative and
//! generative sources, then merges, shuffles and filters the result.

use std::sync::Arc;

use crate::{
    db::{ConsumptionStore, MediaCatalog, SocialGraph},
    error::AppResult,
    models::{MediaItem, RecommendationCandidate, RecommendationPage, RecommendationQuery, Source},
    services::pagination::Page,
};

mod aggregator;
pub mod collaborative;
pub mod content;
pub mod generative;
pub mod merge;

#[cfg(test)]
pub(crate) mod fixtures;

pub use aggregator::load_consumption;
pub use generative::GenerativeAugmenter;
pub use merge::WeightedShuffle;

/// One source's page of candidates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCandidates {
    pub candidates: Vec<RecommendationCandidate>,
    /// Largest page count across the three media kinds
    pub total_pages: u32,
}

impl SourceCandidates {
    /// Flattens per-kind pages in book, film, music order
    pub fn from_pages(source: Source, pages: [Page<MediaItem>; 3]) -> Self {
        let total_pages = pages.iter().map(|p| p.total_pages).max().unwrap_or(0);
        let candidates = pages
            .into_iter()
            .flat_map(|page| page.items)
            .map(|item| RecommendationCandidate::catalog(item, source))
            .collect();
        Self {
            candidates,
            total_pages,
        }
    }
}

pub struct RecommendationEngine {
    consumption: Arc<dyn ConsumptionStore>,
    catalog: Arc<dyn MediaCatalog>,
    social: Arc<dyn SocialGraph>,
    augmenter: GenerativeAugmenter,
    shuffle: WeightedShuffle,
}

impl RecommendationEngine {
    pub fn new(
        consumption: Arc<dyn ConsumptionStore>,
        catalog: Arc<dyn MediaCatalog>,
        social: Arc<dyn SocialGraph>,
        augmenter: GenerativeAugmenter,
        shuffle: WeightedShuffle,
    ) -> Self {
        Self {
            consumption,
            catalog,
            social,
            augmenter,
            shuffle,
        }
    }

    /// Produces one page of recommendations for a user
    ///
    /// Only store failures are returned as errors; the generative source
    /// degrades to nothing on any failure.
    pub async fn recommend(&self, query: &RecommendationQuery) -> AppResult<RecommendationPage> {
        let consumed = load_consumption(self.consumption.as_ref(), query.user_id).await?;

        let (content, collaborative, generative) = tokio::join!(
            content::content_candidates(
                self.catalog.as_ref(),
                &consumed,
                query.focus.as_ref(),
                query.page
            ),
            collaborative::collaborative_candidates(
                self.social.as_ref(),
                self.catalog.as_ref(),
                query.user_id,
                &consumed,
                query.page
            ),
            self.augmenter.suggest(self.catalog.as_ref(), &consumed)
        );
        let (content, collaborative) = (content?, collaborative?);

        let total_pages = content.total_pages.max(collaborative.total_pages);
        let counts = (
            content.candidates.len(),
            collaborative.candidates.len(),
            generative.len(),
        );

        let mut candidates =
            merge::merge_candidates(content.candidates, collaborative.candidates, generative);
        let kept_order = {
            let mut rng = rand::thread_rng();
            self.shuffle.apply(&mut candidates, &mut rng)
        };
        let recommendations = merge::filter_by_kind(candidates, query.media_kind);

        tracing::info!(
            user_id = query.user_id,
            page = query.page.page(),
            content = counts.0,
            collaborative = counts.1,
            generative = counts.2,
            returned = recommendations.len(),
            kept_order = kept_order,
            "Recommendations generated"
        );

        Ok(RecommendationPage {
            recommendations,
            current_page: query.page.page(),
            total_pages,
        })
    }
}
