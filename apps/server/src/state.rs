//! Application state and startup wiring.

use std::sync::Arc;
use std::time::Duration;

use datagate_core::catalog::{ApiId, Catalog};
use datagate_core::products::{ProductGateway, ProductSource};
use datagate_core::tokens::{
    AccessTokenManager, TokenManagerOptions, TokenManagerSet, TokenSource, TokenStore,
};
use datagate_storage_sqlite::{db, ProductRepository, TokenRepository};
use datagate_upstream::direct_plus::DirectPlusClient;
use datagate_upstream::onboard::OnboardClient;
use datagate_upstream::toolkit::ToolkitClient;
use datagate_upstream::UpstreamRegistry;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Bound on any single upstream call; a hung upstream must not pin a task
/// forever.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(90);

pub struct AppState {
    pub catalog: Catalog,
    pub gateway: Arc<ProductGateway>,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

/// Builds the application state with deterministic ordering: datastore,
/// then upstream clients, then token managers, and only then the gateway
/// the routes serve from.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    db::init(&config.db_path)?;
    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;

    let token_repository: Arc<dyn TokenStore> = Arc::new(TokenRepository::new(pool.clone()));
    let product_repository = Arc::new(ProductRepository::new(pool));

    let http = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()?;

    let mut direct_plus = DirectPlusClient::new(http.clone(), config.direct_plus.clone());
    if let Some(base_url) = &config.direct_plus_base_url {
        direct_plus = direct_plus.with_base_url(base_url);
    }
    let mut onboard = OnboardClient::new(http.clone(), config.onboard.clone());
    if let Some(base_url) = &config.onboard_base_url {
        onboard = onboard.with_base_url(base_url);
    }
    let mut toolkit = ToolkitClient::new(http, config.toolkit.clone());
    if let Some(base_url) = &config.toolkit_base_url {
        toolkit = toolkit.with_base_url(base_url);
    }

    let registry = Arc::new(UpstreamRegistry::new(direct_plus, onboard, toolkit));

    let mut tokens = TokenManagerSet::new();
    for api in [ApiId::DirectPlus, ApiId::Onboard] {
        let manager = AccessTokenManager::initialize(
            api,
            token_repository.clone(),
            registry.clone() as Arc<dyn TokenSource>,
            TokenManagerOptions::default(),
        )
        .await?;
        manager.spawn_renewal_task();
        tokens.insert(manager);
    }

    let gateway = Arc::new(ProductGateway::new(
        Catalog::new(),
        product_repository,
        registry as Arc<dyn ProductSource>,
        Arc::new(tokens),
    ));

    Ok(Arc::new(AppState {
        catalog: Catalog::new(),
        gateway,
    }))
}
