//! The one service handlers talk to. Owns the cross-entity invariants:
//! unique emails and amenity names, existing references, one review per
//! user and place, no review of one's own place, cascading deletes.
//! Authorization is the caller's job, see [`crate::authz::decide`].

use crate::authz::Rejection;
use crate::error::AppError;
use crate::models::{
    normalize_email, Amenity, AmenityPatch, NewPlace, NewReview, NewUser, Place, PlacePatch, Review,
    ReviewPatch, User, UserPatch, ValidationError,
};
use crate::repository::{Repositories, RepositoryError};
use serde_json::Value;
use uuid::Uuid;

const EMAIL_TAKEN: &str = "Email already registered";
const AMENITY_TAKEN: &str = "Amenity already exists";

/// Maps a storage-level unique violation to a conflict with `message`.
fn duplicate_as(message: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::DuplicateKey { .. } => AppError::Conflict(message.to_string()),
        other => AppError::Repository(other),
    }
}

fn id_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

pub struct HbnbFacade {
    repos: Repositories,
}

impl HbnbFacade {
    pub fn new(repos: Repositories) -> Self {
        HbnbFacade { repos }
    }

    pub fn in_memory() -> Self {
        Self::new(Repositories::in_memory())
    }

    // ---- users ----

    pub async fn create_user(&self, input: NewUser) -> Result<User, AppError> {
        if self.get_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        let user = User::new(input)?;
        self.repos.users.add(&user).await.map_err(duplicate_as(EMAIL_TAKEN))?;
        tracing::info!(user_id = %user.id(), is_admin = user.is_admin(), "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.repos.users.get(id).await?)
    }

    /// Lookup is case-insensitive; stored emails are normalized.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = Value::String(normalize_email(email));
        Ok(self.repos.users.get_by_attribute("email", &email).await?)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repos.users.get_all().await?)
    }

    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, AppError> {
        if let Some(email) = &patch.email {
            if let Some(holder) = self.get_user_by_email(email).await? {
                if holder.id() != id {
                    return Err(AppError::Conflict(EMAIL_TAKEN.into()));
                }
            }
        }
        self.repos
            .users
            .update(id, patch)
            .await
            .map_err(duplicate_as(EMAIL_TAKEN))
    }

    /// Removes the user's places (with their reviews and links) and the reviews they wrote.
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        if self.repos.users.get(id).await?.is_none() {
            return Ok(false);
        }
        for place in self.repos.places.find_by("owner_id", &id_value(id)).await? {
            self.delete_place(place.id()).await?;
        }
        let reviews = self.repos.reviews.find_by("user_id", &id_value(id)).await?;
        for review in &reviews {
            self.repos.reviews.delete(review.id()).await?;
        }
        let deleted = self.repos.users.delete(id).await?;
        tracing::info!(user_id = %id, reviews = reviews.len(), "user deleted");
        Ok(deleted)
    }

    /// `None` for an unknown email or a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        match self.get_user_by_email(email).await? {
            Some(user) if user.verify_password(password) => Ok(Some(user)),
            _ => {
                tracing::warn!("login rejected");
                Ok(None)
            }
        }
    }

    /// Creates the administrator, or promotes the existing user with that email.
    /// Running it again changes nothing.
    pub async fn ensure_admin(&self, mut seed: NewUser) -> Result<User, AppError> {
        if let Some(existing) = self.get_user_by_email(&seed.email).await? {
            if existing.is_admin() {
                tracing::info!(user_id = %existing.id(), "admin already present");
                return Ok(existing);
            }
            let patch = UserPatch {
                is_admin: Some(true),
                ..UserPatch::default()
            };
            let promoted = self
                .repos
                .users
                .update(existing.id(), patch)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            tracing::info!(user_id = %promoted.id(), "existing user promoted to admin");
            return Ok(promoted);
        }
        seed.is_admin = true;
        let admin = self.create_user(seed).await?;
        tracing::info!(user_id = %admin.id(), "admin seeded");
        Ok(admin)
    }

    // ---- places ----

    pub async fn create_place(&self, input: NewPlace) -> Result<Place, AppError> {
        let place = Place::new(input)?;
        if self.repos.users.get(place.owner_id()).await?.is_none() {
            return Err(ValidationError::new("owner_id", "owner not found").into());
        }
        self.repos.places.add(&place).await?;
        tracing::info!(place_id = %place.id(), owner_id = %place.owner_id(), "place created");
        Ok(place)
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Option<Place>, AppError> {
        Ok(self.repos.places.get(id).await?)
    }

    pub async fn get_all_places(&self) -> Result<Vec<Place>, AppError> {
        Ok(self.repos.places.get_all().await?)
    }

    /// `None` when the owner does not exist.
    pub async fn get_places_by_owner(&self, owner_id: Uuid) -> Result<Option<Vec<Place>>, AppError> {
        if self.repos.users.get(owner_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repos.places.find_by("owner_id", &id_value(owner_id)).await?))
    }

    pub async fn update_place(&self, id: Uuid, patch: PlacePatch) -> Result<Option<Place>, AppError> {
        Ok(self.repos.places.update(id, patch).await?)
    }

    /// Removes the place with its reviews and amenity links.
    pub async fn delete_place(&self, id: Uuid) -> Result<bool, AppError> {
        if self.repos.places.get(id).await?.is_none() {
            return Ok(false);
        }
        let reviews = self.repos.reviews.find_by("place_id", &id_value(id)).await?;
        for review in &reviews {
            self.repos.reviews.delete(review.id()).await?;
        }
        self.repos.links.unlink_place(id).await?;
        let deleted = self.repos.places.delete(id).await?;
        tracing::info!(place_id = %id, reviews = reviews.len(), "place deleted");
        Ok(deleted)
    }

    pub async fn add_amenity_to_place(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), AppError> {
        self.require_place(place_id).await?;
        self.require_amenity(amenity_id).await?;
        self.repos.links.link(place_id, amenity_id).await?;
        Ok(())
    }

    /// `false` when the place exists but was not linked to the amenity.
    pub async fn remove_amenity_from_place(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool, AppError> {
        self.require_place(place_id).await?;
        Ok(self.repos.links.unlink(place_id, amenity_id).await?)
    }

    /// `None` when the place does not exist.
    pub async fn get_place_amenities(&self, place_id: Uuid) -> Result<Option<Vec<Amenity>>, AppError> {
        if self.repos.places.get(place_id).await?.is_none() {
            return Ok(None);
        }
        let mut amenities = Vec::new();
        for amenity_id in self.repos.links.amenities_of(place_id).await? {
            if let Some(amenity) = self.repos.amenities.get(amenity_id).await? {
                amenities.push(amenity);
            }
        }
        Ok(Some(amenities))
    }

    async fn require_place(&self, id: Uuid) -> Result<Place, AppError> {
        self.repos
            .places
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place not found".into()))
    }

    async fn require_amenity(&self, id: Uuid) -> Result<Amenity, AppError> {
        self.repos
            .amenities
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Amenity not found".into()))
    }

    // ---- reviews ----

    /// The author must exist, the place must exist and belong to someone else,
    /// and the author must not have reviewed it yet. Admins are held to the same rules.
    pub async fn create_review(&self, input: NewReview) -> Result<Review, AppError> {
        let review = Review::new(input)?;
        if self.repos.users.get(review.user_id()).await?.is_none() {
            return Err(ValidationError::new("user_id", "user not found").into());
        }
        let place = self.require_place(review.place_id()).await?;
        if place.owner_id() == review.user_id() {
            return Err(Rejection::OwnPlace.into());
        }
        if self
            .get_review_by_user_and_place(review.user_id(), review.place_id())
            .await?
            .is_some()
        {
            return Err(Rejection::AlreadyReviewed.into());
        }
        self.repos
            .reviews
            .add(&review)
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateKey { .. } => AppError::from(Rejection::AlreadyReviewed),
                other => AppError::Repository(other),
            })?;
        tracing::info!(review_id = %review.id(), place_id = %review.place_id(), "review created");
        Ok(review)
    }

    pub async fn get_review(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self.repos.reviews.get(id).await?)
    }

    pub async fn get_all_reviews(&self) -> Result<Vec<Review>, AppError> {
        Ok(self.repos.reviews.get_all().await?)
    }

    pub async fn get_review_by_user_and_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Review>, AppError> {
        let reviews = self.repos.reviews.find_by("place_id", &id_value(place_id)).await?;
        Ok(reviews.into_iter().find(|r| r.user_id() == user_id))
    }

    /// `None` when the place does not exist.
    pub async fn get_reviews_by_place(&self, place_id: Uuid) -> Result<Option<Vec<Review>>, AppError> {
        if self.repos.places.get(place_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repos.reviews.find_by("place_id", &id_value(place_id)).await?))
    }

    /// `None` when the user does not exist.
    pub async fn get_reviews_by_user(&self, user_id: Uuid) -> Result<Option<Vec<Review>>, AppError> {
        if self.repos.users.get(user_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repos.reviews.find_by("user_id", &id_value(user_id)).await?))
    }

    pub async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Option<Review>, AppError> {
        Ok(self.repos.reviews.update(id, patch).await?)
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.repos.reviews.delete(id).await?)
    }

    // ---- amenities ----

    pub async fn create_amenity(&self, name: String) -> Result<Amenity, AppError> {
        let amenity = Amenity::new(name)?;
        if self.amenity_named(amenity.name()).await?.is_some() {
            return Err(AppError::Conflict(AMENITY_TAKEN.into()));
        }
        self.repos
            .amenities
            .add(&amenity)
            .await
            .map_err(duplicate_as(AMENITY_TAKEN))?;
        tracing::info!(amenity_id = %amenity.id(), name = %amenity.name(), "amenity created");
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: Uuid) -> Result<Option<Amenity>, AppError> {
        Ok(self.repos.amenities.get(id).await?)
    }

    pub async fn get_all_amenities(&self) -> Result<Vec<Amenity>, AppError> {
        Ok(self.repos.amenities.get_all().await?)
    }

    pub async fn update_amenity(&self, id: Uuid, patch: AmenityPatch) -> Result<Option<Amenity>, AppError> {
        if let Some(name) = &patch.name {
            if let Some(holder) = self.amenity_named(name).await? {
                if holder.id() != id {
                    return Err(AppError::Conflict(AMENITY_TAKEN.into()));
                }
            }
        }
        self.repos
            .amenities
            .update(id, patch)
            .await
            .map_err(duplicate_as(AMENITY_TAKEN))
    }

    /// Also removes the amenity from every place.
    pub async fn delete_amenity(&self, id: Uuid) -> Result<bool, AppError> {
        if self.repos.amenities.get(id).await?.is_none() {
            return Ok(false);
        }
        self.repos.links.unlink_amenity(id).await?;
        Ok(self.repos.amenities.delete(id).await?)
    }

    async fn amenity_named(&self, name: &str) -> Result<Option<Amenity>, AppError> {
        let name = Value::String(name.to_string());
        Ok(self.repos.amenities.get_by_attribute("name", &name).await?)
    }
}
