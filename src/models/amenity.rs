use super::validation::{require_length, ValidationError};
use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AmenityPatch {
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    require_length("name", value, 1, 50)
}

impl Amenity {
    pub fn new(name: String) -> Result<Self, ValidationError> {
        validate_name(&name)?;
        let now = super::timestamp();
        Ok(Amenity {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Amenity {
    type Patch = AmenityPatch;
    const KIND: &'static str = "amenity";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: AmenityPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.name {
            validate_name(&name)?;
            self.name = name;
        }
        self.updated_at = super::timestamp();
        Ok(())
    }
}
