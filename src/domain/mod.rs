//! Plain records and key value-objects shared across the crate.

mod primitives;
mod records;

pub use primitives::{CompositeKey, MediaType, SubjectKey};
pub use records::{
    Favorite, FavoriteDraft, Rating, RatingDraft, SearchHistoryEntry, SortOrder, User, UserProfile,
};
