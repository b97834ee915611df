pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::Config;
pub use db::{open_store, BootstrapError, RepoError, Repository};
pub use domain::{
    CompositeKey, Favorite, FavoriteDraft, MediaType, Rating, RatingDraft, SearchHistoryEntry,
    SortOrder, SubjectKey, User, UserProfile,
};
pub use error::AppError;
