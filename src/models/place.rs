use super::validation::{require_between, require_length, require_non_negative, ValidationError};
use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct NewPlace {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
}

/// Updatable place fields. The owner is fixed at creation.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlacePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: f64,
    latitude: f64,
    longitude: f64,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    require_length("title", value, 1, 100)
}

fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    require_between("latitude", value, -90.0, 90.0)
}

fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    require_between("longitude", value, -180.0, 180.0)
}

impl Place {
    /// Validates fields only; the facade checks that the owner exists.
    pub fn new(input: NewPlace) -> Result<Self, ValidationError> {
        validate_title(&input.title)?;
        require_non_negative("price", input.price)?;
        validate_latitude(input.latitude)?;
        validate_longitude(input.longitude)?;
        let now = super::timestamp();
        Ok(Place {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            price: input.price,
            latitude: input.latitude,
            longitude: input.longitude,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Place {
    type Patch = PlacePatch;
    const KIND: &'static str = "place";
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: PlacePatch) -> Result<(), ValidationError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(price) = patch.price {
            require_non_negative("price", price)?;
        }
        if let Some(latitude) = patch.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(longitude) = patch.longitude {
            validate_longitude(longitude)?;
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        self.updated_at = super::timestamp();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewPlace {
        NewPlace {
            title: "Loft by the canal".into(),
            description: Some("Two rooms, lots of light".into()),
            price: 120.5,
            latitude: 52.37,
            longitude: 4.89,
            owner_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn new_place_round_trips_fields() {
        let source = input();
        let place = Place::new(source.clone()).unwrap();
        assert_eq!(place.title(), source.title);
        assert_eq!(place.description(), source.description.as_deref());
        assert_eq!(place.price(), source.price);
        assert_eq!(place.latitude(), source.latitude);
        assert_eq!(place.longitude(), source.longitude);
        assert_eq!(place.owner_id(), source.owner_id);
    }

    #[test]
    fn description_is_optional_and_price_may_be_zero() {
        let mut free = input();
        free.description = None;
        free.price = 0.0;
        let place = Place::new(free).unwrap();
        assert_eq!(place.description(), None);
        assert_eq!(place.price(), 0.0);
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let cases: [(fn(&mut NewPlace), &str); 5] = [
            (|p| p.title = String::new(), "title"),
            (|p| p.title = "t".repeat(101), "title"),
            (|p| p.price = -0.01, "price"),
            (|p| p.latitude = 90.0, "latitude"),
            (|p| p.longitude = -180.0, "longitude"),
        ];
        for (mutate, field) in cases {
            let mut bad = input();
            mutate(&mut bad);
            assert_eq!(Place::new(bad).unwrap_err().field, field);
        }
    }

    #[test]
    fn patch_is_all_or_nothing() {
        let mut place = Place::new(input()).unwrap();
        let before = place.clone();
        assert!(place
            .apply(PlacePatch {
                title: Some("New title".into()),
                longitude: Some(200.0),
                ..PlacePatch::default()
            })
            .is_err());
        assert_eq!(place, before);

        place
            .apply(PlacePatch {
                price: Some(99.0),
                ..PlacePatch::default()
            })
            .unwrap();
        assert_eq!(place.price(), 99.0);
        assert_eq!(place.title(), before.title());
    }
}
