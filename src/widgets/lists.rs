use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::movie::{poster_url, truncate_with_ellipsis};
use crate::tmdb::{parse_entries, MovieSummary};

pub const OVERVIEW_PREVIEW_CHARS: usize = 100;
pub const GRID_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    Trending,
    TopRated,
}

impl ListKind {
    pub fn path(&self) -> &'static str {
        match self {
            ListKind::Trending => "/api/trending",
            ListKind::TopRated => "/api/top-rated",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ListKind::Trending => "Trending Movies",
            ListKind::TopRated => "Top Rated Movies",
        }
    }
}

#[async_trait]
pub trait ListRelay: Send + Sync {
    /// Body of the list endpoint, whatever its status.
    async fn get_list(&self, kind: ListKind) -> Result<serde_json::Value, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCard {
    pub id: i64,
    pub title: String,
    pub overview_preview: String,
    pub poster_url: Option<String>,
}

/// A movie list fetched once and shown as a grid of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListState {
    pub kind: ListKind,
    pub movies: Vec<MovieSummary>,
    pub loaded: bool,
}

impl MovieListState {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            movies: Vec::new(),
            loaded: false,
        }
    }

    /// Take `results` from a relay body. Anything else, error envelopes
    /// included, leaves an empty list. Entries that do not parse are dropped
    /// on their own.
    pub fn apply(&mut self, body: &serde_json::Value) {
        self.movies = body
            .get("results")
            .and_then(|results| results.as_array())
            .map(|entries| parse_entries::<MovieSummary>(entries))
            .unwrap_or_default();
        self.loaded = true;
    }

    /// Fetch the list unless that already happened.
    pub async fn load<R>(&mut self, relay: &R)
    where
        R: ListRelay + ?Sized,
    {
        if self.loaded {
            return;
        }
        match relay.get_list(self.kind).await {
            Ok(body) => self.apply(&body),
            Err(e) => {
                warn!(list = self.kind.path(), "Failed to load movie list: {}", e);
                self.movies.clear();
                self.loaded = true;
            }
        }
    }

    pub fn cards(&self, image_base_url: &str) -> Vec<MovieCard> {
        self.movies
            .iter()
            .map(|movie| MovieCard {
                id: movie.id,
                title: movie.title.clone(),
                overview_preview: truncate_with_ellipsis(&movie.overview, OVERVIEW_PREVIEW_CHARS),
                poster_url: movie
                    .poster_path
                    .as_deref()
                    .map(|p| poster_url(image_base_url, p)),
            })
            .collect()
    }

    /// Cards laid out in rows of `columns`.
    pub fn rows(&self, image_base_url: &str, columns: usize) -> Vec<Vec<MovieCard>> {
        self.cards(image_base_url)
            .chunks(columns.max(1))
            .map(|row| row.to_vec())
            .collect()
    }
}
