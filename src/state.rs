//! Shared application state for all routes.

use crate::auth::TokenService;
use crate::facade::HbnbFacade;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<HbnbFacade>,
    pub tokens: Arc<TokenService>,
    /// Present with the PostgreSQL backend; probed by `/ready`.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(facade: HbnbFacade, tokens: TokenService, pool: Option<PgPool>) -> Self {
        AppState {
            facade: Arc::new(facade),
            tokens: Arc::new(tokens),
            pool,
        }
    }

    /// Memory-backed state with a fresh store.
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(HbnbFacade::in_memory(), tokens, None)
    }
}
