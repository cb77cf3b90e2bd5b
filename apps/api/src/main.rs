use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{
    AppointmentStore, InMemoryAppointmentStore, SchedulingService, SupabaseAppointmentStore,
};
use practitioner_cell::{InMemoryRoster, PractitionerSource, SupabaseRoster};
use shared_config::{AppConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic Scheduler API server");

    let config = AppConfig::from_env();
    let (roster, store) = build_backends(&config).await?;
    let scheduling = Arc::new(SchedulingService::new(
        Arc::clone(&roster),
        store,
        config.store_timeout,
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(roster, scheduling)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}

async fn build_backends(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn PractitionerSource>, Arc<dyn AppointmentStore>)> {
    match config.store_backend {
        StoreBackend::Supabase => {
            if !config.is_supabase_configured() {
                anyhow::bail!("STORE_BACKEND=supabase requires SUPABASE_URL and SUPABASE_SERVICE_KEY");
            }
            info!("Using Supabase roster and appointment store at {}", config.supabase_url);
            let roster: Arc<dyn PractitionerSource> = Arc::new(SupabaseRoster::new(config));
            let store: Arc<dyn AppointmentStore> = Arc::new(SupabaseAppointmentStore::new(config));
            Ok((roster, store))
        }
        StoreBackend::Memory => {
            let roster: InMemoryRoster = match &config.roster_file {
                Some(path) => {
                    info!("Loading practitioner roster from {}", path);
                    InMemoryRoster::from_json_file(path)
                        .await
                        .with_context(|| format!("failed to load roster from {}", path))?
                }
                None => {
                    warn!("ROSTER_FILE not set, starting with an empty practitioner roster");
                    InMemoryRoster::new()
                }
            };
            info!("Using in-memory appointment store");
            let store: Arc<dyn AppointmentStore> = Arc::new(InMemoryAppointmentStore::new());
            let roster: Arc<dyn PractitionerSource> = Arc::new(roster);
            Ok((roster, store))
        }
    }
}
