//! HBnB: an Airbnb-style REST API over users, places, reviews and amenities.
//!
//! Storage is either in memory or PostgreSQL behind the same [`repository::Repository`]
//! trait. Handlers authenticate callers from bearer tokens, ask [`authz::decide`]
//! whether the request is allowed, and delegate to [`facade::HbnbFacade`].

pub mod auth;
pub mod authz;
pub mod config;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod facade;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::TokenService;
pub use config::{AppConfig, StorageBackend};
pub use error::{AppError, ConfigError};
pub use facade::HbnbFacade;
pub use repository::Repositories;
pub use response::{success_many, success_one, success_one_ok};
pub use routes::{api_routes, app, common_routes_with_ready};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
