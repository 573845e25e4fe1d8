//! Storage contract shared by the in-memory and PostgreSQL backends.

mod memory;
mod postgres;

pub use memory::{InMemoryAmenityLinks, InMemoryRepository};
pub use postgres::{PgAmenityLinks, PgEntity, PgRepository};

use crate::models::{Amenity, Entity, Place, Review, User, ValidationError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("duplicate {kind}: {detail}")]
    DuplicateKey { kind: &'static str, detail: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// CRUD access to one entity type. Lookups by attribute compare the entity's
/// serialized field with `value`; unknown attribute names never match.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn add(&self, entity: &E) -> Result<(), RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<Option<E>, RepositoryError>;
    async fn get_all(&self) -> Result<Vec<E>, RepositoryError>;
    async fn get_by_attribute(&self, name: &str, value: &Value) -> Result<Option<E>, RepositoryError>;
    async fn find_by(&self, name: &str, value: &Value) -> Result<Vec<E>, RepositoryError>;
    /// Applies the patch and persists it. `None` when `id` is absent.
    async fn update(&self, id: Uuid, patch: E::Patch) -> Result<Option<E>, RepositoryError>;
    /// `false` when `id` was absent.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Place to amenity associations.
#[async_trait]
pub trait AmenityLinks: Send + Sync {
    /// Linking an existing pair is a no-op.
    async fn link(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), RepositoryError>;
    async fn unlink(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool, RepositoryError>;
    async fn amenities_of(&self, place_id: Uuid) -> Result<Vec<Uuid>, RepositoryError>;
    async fn unlink_place(&self, place_id: Uuid) -> Result<(), RepositoryError>;
    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<(), RepositoryError>;
}

/// One repository per entity plus the association store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub places: Arc<dyn Repository<Place>>,
    pub reviews: Arc<dyn Repository<Review>>,
    pub amenities: Arc<dyn Repository<Amenity>>,
    pub links: Arc<dyn AmenityLinks>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Repositories {
            users: Arc::new(InMemoryRepository::<User>::new()),
            places: Arc::new(InMemoryRepository::<Place>::new()),
            reviews: Arc::new(InMemoryRepository::<Review>::new()),
            amenities: Arc::new(InMemoryRepository::<Amenity>::new()),
            links: Arc::new(InMemoryAmenityLinks::new()),
        }
    }

    /// Tables must already exist, see [`crate::store::ensure_tables`].
    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        Repositories {
            users: Arc::new(PgRepository::<User>::new(pool.clone(), schema)),
            places: Arc::new(PgRepository::<Place>::new(pool.clone(), schema)),
            reviews: Arc::new(PgRepository::<Review>::new(pool.clone(), schema)),
            amenities: Arc::new(PgRepository::<Amenity>::new(pool.clone(), schema)),
            links: Arc::new(PgAmenityLinks::new(pool, schema)),
        }
    }
}
