use super::password::{hash_password, verify_password};
use super::validation::{normalize_email, require_email, require_length, ValidationError};
use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Input for [`User::new`]. The password is plaintext and is hashed on construction.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// Fields a user record accepts on update. `email`, `password` and `is_admin`
/// are reserved for administrators by the authorization rules.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    require_length(field, value, 1, 50)
}

impl User {
    pub fn new(input: NewUser) -> Result<Self, ValidationError> {
        validate_name("first_name", &input.first_name)?;
        validate_name("last_name", &input.last_name)?;
        let email = normalize_email(&input.email);
        require_email("email", &email)?;
        let password_hash = hash_password(&input.password)?;
        let now = super::timestamp();
        Ok(User {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            email,
            password_hash,
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Always trimmed and lower-cased.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(&self.password_hash, password)
    }
}

impl Entity for User {
    type Patch = UserPatch;
    const KIND: &'static str = "user";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["email"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: UserPatch) -> Result<(), ValidationError> {
        if let Some(first_name) = &patch.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &patch.last_name {
            validate_name("last_name", last_name)?;
        }
        let email = match &patch.email {
            Some(email) => {
                let email = normalize_email(email);
                require_email("email", &email)?;
                Some(email)
            }
            None => None,
        };
        let password_hash = match &patch.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(password_hash) = password_hash {
            self.password_hash = password_hash;
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.updated_at = super::timestamp();
        Ok(())
    }
}
