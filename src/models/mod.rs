//! Domain entities: users, places, reviews and amenities.
//!
//! Every entity is built through a validating constructor and changed only
//! through its patch type, so a value held by a repository is always valid.

mod amenity;
mod password;
mod place;
mod review;
mod user;
mod validation;

pub use amenity::{Amenity, AmenityPatch};
pub use password::{hash_password, verify_password};
pub use place::{NewPlace, Place, PlacePatch};
pub use review::{NewReview, Review, ReviewPatch, MAX_RATING, MIN_RATING};
pub use user::{NewUser, User, UserPatch};
pub use validation::ValidationError;
pub(crate) use validation::normalize_email;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Current time at `timestamptz` precision (microseconds).
pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Behavior shared by every stored entity.
///
/// The serde representation doubles as the storage row: field names are the
/// column names used by the repositories.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Allow-listed partial update accepted by [`Entity::apply`].
    type Patch: Send + 'static;

    /// Name used in log lines and duplicate-key errors.
    const KIND: &'static str;

    /// Field groups whose combined values are unique across the collection.
    const UNIQUE: &'static [&'static [&'static str]];

    fn id(&self) -> Uuid;

    /// Validate every touched field, then apply them all and refresh `updated_at`.
    /// On error the entity is left unchanged.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), ValidationError>;
}
