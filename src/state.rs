use crate::config::Config;
use crate::services::ListingService;
use crate::store::PgStore;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub listing: ListingService<PgStore>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let listing = ListingService::new(PgStore::new(pool.clone()), config.max_page_size);
        Self {
            pool,
            config,
            listing,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
