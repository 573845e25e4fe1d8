use super::validation::{require_not_blank, ValidationError};
use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Clone, Debug)]
pub struct NewReview {
    pub text: String,
    pub rating: i32,
    pub place_id: Uuid,
    pub user_id: Uuid,
}

/// Updatable review fields. Author and place are fixed at creation.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    id: Uuid,
    text: String,
    rating: i32,
    place_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_rating(value: i32) -> Result<(), ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(ValidationError::new(
            "rating",
            format!("must be between {} and {}", MIN_RATING, MAX_RATING),
        ));
    }
    Ok(())
}

impl Review {
    /// Validates fields only; the facade checks the referenced user and place.
    pub fn new(input: NewReview) -> Result<Self, ValidationError> {
        require_not_blank("text", &input.text)?;
        validate_rating(input.rating)?;
        let now = super::timestamp();
        Ok(Review {
            id: Uuid::new_v4(),
            text: input.text,
            rating: input.rating,
            place_id: input.place_id,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn place_id(&self) -> Uuid {
        self.place_id
    }

    /// The author.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Review {
    type Patch = ReviewPatch;
    const KIND: &'static str = "review";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["user_id", "place_id"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: ReviewPatch) -> Result<(), ValidationError> {
        if let Some(text) = &patch.text {
            require_not_blank("text", text)?;
        }
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
        }

        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        self.updated_at = super::timestamp();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_rating(rating: i32) -> NewReview {
        NewReview {
            text: "Great stay".into(),
            rating,
            place_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [MIN_RATING, 3, MAX_RATING] {
            assert_eq!(Review::new(with_rating(rating)).unwrap().rating(), rating);
        }
        for rating in [i32::MIN, -1, 0, 6, 100] {
            assert_eq!(Review::new(with_rating(rating)).unwrap_err().field, "rating");
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut input = with_rating(4);
        input.text = "   ".into();
        assert_eq!(Review::new(input).unwrap_err().field, "text");
    }

    #[test]
    fn references_are_kept() {
        let input = with_rating(2);
        let review = Review::new(input.clone()).unwrap();
        assert_eq!(review.place_id(), input.place_id);
        assert_eq!(review.user_id(), input.user_id);
        assert_eq!(review.text(), "Great stay");
    }

    #[test]
    fn patch_revalidates_rating() {
        let mut review = Review::new(with_rating(4)).unwrap();
        assert!(review
            .apply(ReviewPatch {
                rating: Some(0),
                ..ReviewPatch::default()
            })
            .is_err());
        assert_eq!(review.rating(), 4);
        review
            .apply(ReviewPatch {
                text: Some("Even better the second time".into()),
                rating: Some(5),
            })
            .unwrap();
        assert_eq!(review.rating(), 5);
        assert_eq!(review.text(), "Even better the second time");
    }
}
