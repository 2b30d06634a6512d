use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::tmdb::{
    Credits, MovieDetails, MoviePart, ReviewList, TmdbClient, TmdbError, VideoList,
};
use crate::upstream::UpstreamError;

/// Why one of the four parts could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartFailure {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl From<&TmdbError> for PartFailure {
    fn from(err: &TmdbError) -> Self {
        let (status, body) = match err {
            TmdbError::Upstream(UpstreamError::Status { status, body }) => {
                (*status, Some(body.clone()))
            }
            TmdbError::Upstream(e) => (e.status(), None),
            TmdbError::MissingKey => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            body,
        }
    }
}

/// Everything the detail page shows for one movie.
///
/// Each part is loaded independently; a part that failed is `None` and has
/// an entry in `errors` under its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieAggregate {
    pub id: String,
    #[serde(default)]
    pub details: Option<MovieDetails>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub reviews: Option<ReviewList>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, PartFailure>,
}

impl MovieAggregate {
    pub fn is_empty(&self) -> bool {
        self.details.is_none()
            && self.credits.is_none()
            && self.videos.is_none()
            && self.reviews.is_none()
    }

    pub fn error(&self, part: MoviePart) -> Option<&PartFailure> {
        self.errors.get(part.as_str())
    }

    /// The failure to report when nothing at all could be loaded.
    pub fn total_failure(&self) -> Option<&PartFailure> {
        if !self.is_empty() {
            return None;
        }
        self.error(MoviePart::Details)
            .or_else(|| self.errors.values().next())
    }

    fn record<T>(&mut self, part: MoviePart, result: Result<T, TmdbError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(id = %self.id, part = part.as_str(), "Movie part failed: {}", err);
                self.errors.insert(part.as_str().to_string(), PartFailure::from(&err));
                None
            }
        }
    }
}

/// Builds a `MovieAggregate` from four concurrent TMDB lookups.
pub struct MovieComposer<'a> {
    tmdb: &'a TmdbClient,
}

impl<'a> MovieComposer<'a> {
    pub fn new(tmdb: &'a TmdbClient) -> Self {
        Self { tmdb }
    }

    /// Issue all four lookups at once and wait for every one of them to settle.
    ///
    /// Fails only when there is no API key, in which case nothing is sent.
    pub async fn compose(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieAggregate, TmdbError> {
        if self.tmdb.detail_key().is_none() {
            return Err(TmdbError::MissingKey);
        }

        let (details, credits, videos, reviews) = tokio::join!(
            self.tmdb.movie_part::<MovieDetails>(id, MoviePart::Details, cancel),
            self.tmdb.movie_part::<Credits>(id, MoviePart::Credits, cancel),
            self.tmdb.movie_part::<VideoList>(id, MoviePart::Videos, cancel),
            self.tmdb.movie_part::<ReviewList>(id, MoviePart::Reviews, cancel),
        );

        let mut aggregate = MovieAggregate {
            id: id.to_string(),
            ..Default::default()
        };
        aggregate.details = aggregate.record(MoviePart::Details, details);
        aggregate.credits = aggregate.record(MoviePart::Credits, credits);
        aggregate.videos = aggregate.record(MoviePart::Videos, videos);
        aggregate.reviews = aggregate.record(MoviePart::Reviews, reviews);

        info!(id = %id, failed = aggregate.errors.len(), "Composed movie");
        Ok(aggregate)
    }
}
