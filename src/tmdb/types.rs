use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

// Every field is defaultable: TMDB omits fields or sends null freely, and
// neither may fail the whole body. List entries are parsed one at a time so
// a bad entry only drops itself.

/// A missing or null field becomes the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list where each entry that does not parse is skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(parse_entries(&entries))
}

/// Parse every entry that fits `T`, logging and dropping the rest.
pub fn parse_entries<T: DeserializeOwned>(entries: &[Value]) -> Vec<T> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index, "Skipping malformed TMDB entry: {}", e);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub vote_average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieList {
    #[serde(default, deserialize_with = "null_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<MovieSummary>,
    #[serde(default, deserialize_with = "null_default")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub total_results: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default, deserialize_with = "null_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(default, deserialize_with = "null_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub release_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "lenient_list")]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "type", default, deserialize_with = "null_default")]
    pub video_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub site: String,
    #[serde(default, deserialize_with = "null_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<Review>,
}

/// The four per-movie resources the detail page is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoviePart {
    Details,
    Credits,
    Videos,
    Reviews,
}

impl MoviePart {
    pub const ALL: [MoviePart; 4] = [
        MoviePart::Details,
        MoviePart::Credits,
        MoviePart::Videos,
        MoviePart::Reviews,
    ];

    /// Path below `/movie/{id}`.
    pub fn suffix(&self) -> &'static str {
        match self {
            MoviePart::Details => "",
            MoviePart::Credits => "/credits",
            MoviePart::Videos => "/videos",
            MoviePart::Reviews => "/reviews",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoviePart::Details => "details",
            MoviePart::Credits => "credits",
            MoviePart::Videos => "videos",
            MoviePart::Reviews => "reviews",
        }
    }
}
