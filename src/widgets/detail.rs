use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::movie::{MovieAggregate, MovieView};
use crate::tmdb::MoviePart;

#[async_trait]
pub trait DetailRelay: Send + Sync {
    async fn get_movie(&self, id: &str) -> Result<MovieAggregate, String>;
}

/// Loading state of the movie detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MovieDetailState {
    Loading,
    Loaded {
        view: Box<MovieView>,
        /// Parts that could not be fetched; their sections render empty.
        missing: Vec<MoviePart>,
    },
    Unavailable,
}

impl MovieDetailState {
    pub fn from_aggregate(aggregate: &MovieAggregate, image_base_url: &str) -> Self {
        if aggregate.is_empty() {
            return MovieDetailState::Unavailable;
        }
        let missing = MoviePart::ALL
            .into_iter()
            .filter(|part| aggregate.error(*part).is_some())
            .collect();
        MovieDetailState::Loaded {
            view: Box::new(MovieView::from_aggregate(aggregate, image_base_url)),
            missing,
        }
    }

    pub async fn load<R>(relay: &R, id: &str, image_base_url: &str) -> Self
    where
        R: DetailRelay + ?Sized,
    {
        match relay.get_movie(id).await {
            Ok(aggregate) => Self::from_aggregate(&aggregate, image_base_url),
            Err(e) => {
                warn!(id, "Failed to fetch movie details: {}", e);
                MovieDetailState::Unavailable
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, MovieDetailState::Loading)
    }
}
