use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

use opening_trainer_core::{ProgressLedger, Repertoire, SqliteStore, TrainingSession};

mod config;
mod routes;

use config::ServerConfig;

pub struct AppState {
    pub ledger: Mutex<ProgressLedger<SqliteStore>>,
    /// The one live training session, if any.
    pub session: Mutex<Option<TrainingSession>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            ledger: Mutex::new(ProgressLedger::new(store, Repertoire::standard())),
            session: Mutex::new(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let repertoire = Repertoire::standard();
    repertoire.validate()?;

    let store = SqliteStore::open(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), openings = repertoire.len(), "opened progress store");

    let state = Arc::new(AppState::new(store));
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
