use serde::{Deserialize, Serialize};

use super::composer::MovieAggregate;
use crate::tmdb::{CastMember, Review, Video};

pub const MAX_CAST: usize = 6;
pub const MAX_REVIEWS: usize = 3;
pub const REVIEW_EXCERPT_CHARS: usize = 250;
pub const ELLIPSIS: &str = "...";

const TRAILER_TYPE: &str = "Trailer";
const TRAILER_SITE: &str = "YouTube";
const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    pub key: String,
    pub embed_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewExcerpt {
    pub id: String,
    pub author: String,
    pub excerpt: String,
}

/// Display values for the movie detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieView {
    pub title: String,
    pub genres: String,
    pub runtime: u32,
    pub rating: Option<f64>,
    pub overview: String,
    pub poster_url: Option<String>,
    pub trailer: Option<Trailer>,
    pub cast: Vec<CastMember>,
    pub reviews: Vec<ReviewExcerpt>,
}

impl MovieView {
    pub fn from_aggregate(aggregate: &MovieAggregate, image_base_url: &str) -> Self {
        let details = aggregate.details.as_ref();

        let title = details
            .map(|d| d.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("No title")
            .to_string();
        let overview = details
            .map(|d| d.overview.as_str())
            .filter(|o| !o.is_empty())
            .unwrap_or("No overview available.")
            .to_string();
        let genres = details
            .map(|d| {
                d.genres
                    .iter()
                    .map(|g| g.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let poster_url = details
            .and_then(|d| d.poster_path.as_deref())
            .map(|p| poster_url(image_base_url, p));

        let trailer = aggregate
            .videos
            .as_ref()
            .and_then(|v| find_trailer(&v.results));
        let cast = aggregate
            .credits
            .as_ref()
            .map(|c| c.cast.iter().take(MAX_CAST).cloned().collect())
            .unwrap_or_default();
        let reviews = aggregate
            .reviews
            .as_ref()
            .map(|r| r.results.iter().take(MAX_REVIEWS).map(excerpt).collect())
            .unwrap_or_default();

        Self {
            title,
            genres,
            runtime: details.and_then(|d| d.runtime).unwrap_or(0),
            rating: details.and_then(|d| d.vote_average),
            overview,
            poster_url,
            trailer,
            cast,
            reviews,
        }
    }
}

/// First YouTube video tagged as a trailer.
pub fn find_trailer(videos: &[Video]) -> Option<Trailer> {
    videos
        .iter()
        .find(|v| v.video_type == TRAILER_TYPE && v.site == TRAILER_SITE)
        .map(|v| Trailer {
            key: v.key.clone(),
            embed_url: format!("{}{}", EMBED_BASE_URL, v.key),
        })
}

pub fn poster_url(image_base_url: &str, path: &str) -> String {
    format!("{}{}", image_base_url.trim_end_matches('/'), path)
}

/// First `max` characters of `text`, always followed by `...`.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    out.push_str(ELLIPSIS);
    out
}

fn excerpt(review: &Review) -> ReviewExcerpt {
    ReviewExcerpt {
        id: review.id.clone(),
        author: review.author.clone(),
        excerpt: truncate_with_ellipsis(&review.content, REVIEW_EXCERPT_CHARS),
    }
}
