use std::net::SocketAddr;
use std::sync::Arc;

use jobboard_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    identity::{GeminiVerifier, IdentityVerifier, SimulatedVerifier},
    repository::{seed::sample_jobs, InMemoryRepository, JobBoardRepository, PgRepository},
    routes::build_router,
    storage::LocalDocumentStorage,
    AppState, StateSettings,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(&config.log_format);

    let repo: Arc<dyn JobBoardRepository> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Connected to Postgres");
            Arc::new(PgRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; running in demo mode with in-memory data");
            Arc::new(InMemoryRepository::with_jobs(sample_jobs(Uuid::new_v4())))
        }
    };

    let storage = Arc::new(LocalDocumentStorage::new(
        &config.storage_dir,
        &config.storage_signing_secret,
        &config.public_base_url,
    ));
    info!("Storing documents under {}", config.storage_dir);

    let identity: Arc<dyn IdentityVerifier> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiVerifier::new(
            key.clone(),
            config.gemini_model.clone(),
            reqwest::Client::new(),
        )),
        None => {
            warn!("GEMINI_API_KEY not set; identity checks are simulated");
            Arc::new(SimulatedVerifier)
        }
    };

    let state = AppState::new(repo, storage, identity, StateSettings::from_config(config));
    let app = build_router(state, config.api_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
