//! Domain primitives: MediaType, SubjectKey, CompositeKey.

use serde::{Deserialize, Serialize};

/// Kind of catalog title a record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Canonical stored form ("movie" or "tv").
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Lenient query-parameter parse: anything other than "tv" is a movie.
    pub fn from_query(raw: Option<&str>) -> MediaType {
        match raw {
            Some("tv") => MediaType::Tv,
            _ => MediaType::Movie,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a title independent of which user is acting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectKey {
    pub movie_id: String,
    pub media_type: MediaType,
}

impl SubjectKey {
    pub fn new(movie_id: impl Into<String>, media_type: MediaType) -> Self {
        SubjectKey {
            movie_id: movie_id.into(),
            media_type,
        }
    }
}

/// The (user, movie, media type) tuple under which at most one rating or
/// favorite may exist. Uniqueness is backed by an index on the store, not by
/// foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub user_id: String,
    pub movie_id: String,
    pub media_type: MediaType,
}

impl CompositeKey {
    pub fn new(
        user_id: impl Into<String>,
        movie_id: impl Into<String>,
        media_type: MediaType,
    ) -> Self {
        CompositeKey {
            user_id: user_id.into(),
            movie_id: movie_id.into(),
            media_type,
        }
    }

    /// The title part of the key, without the owning user.
    pub fn subject(&self) -> SubjectKey {
        SubjectKey::new(self.movie_id.clone(), self.media_type)
    }
}
