//! Checkout JSON API Server

use std::{io, path::PathBuf, process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use thiserror::Error;
use tracing::{error, info};

use checkout::money::find_currency;
use checkout_app::{
    context::{AppContext, AppInitError},
    domain::checkout::DemoPaymentAuthorizer,
    memory::{MemoryStore, SeedError},
};

use crate::{config::ServerConfig, observability::Observability, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod addresses;
mod carts;
mod config;
mod errors;
mod extensions;
mod healthcheck;
mod identity;
mod money;
mod observability;
mod operator;
mod orders;
mod promotions;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

#[derive(Debug, Error)]
enum StartupError {
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),

    #[error("failed to read seed file {path}: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid seed file: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to initialize app context: {0}")]
    App(#[from] AppInitError),
}

/// Builds the shared state: Postgres when a database URL is configured, otherwise the
/// in-process store.
async fn build_state(config: &ServerConfig) -> Result<State, StartupError> {
    let currency = find_currency(&config.checkout.currency)
        .ok_or_else(|| StartupError::UnknownCurrency(config.checkout.currency.clone()))?;

    let settings = config.checkout.settings();
    let payments = Arc::new(DemoPaymentAuthorizer);

    let app = match &config.database.database_url {
        Some(url) => {
            info!("using postgres storage");

            AppContext::from_database_url(url, config.database.run_migrations, settings, payments)
                .await?
        }
        None => {
            let store = match &config.database.seed_file {
                Some(path) => {
                    let json = tokio::fs::read_to_string(path).await.map_err(|source| {
                        StartupError::SeedFile {
                            path: path.clone(),
                            source,
                        }
                    })?;

                    MemoryStore::seed_from_json(&json)?
                }
                None => MemoryStore::new(),
            };

            info!("using in-memory storage");

            AppContext::in_memory(&store, settings, payments)
        }
    };

    Ok(State::new(app)
        .with_currency(currency)
        .with_operator_token(config.operator.operator_token.clone()))
}

/// Checkout JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(startup_error) => {
            error!("{startup_error}");

            observability.shutdown();
            process::exit(1);
        }
    };

    if state.operator_token().is_none() {
        info!("no operator token configured, operator routes are disabled");
    }

    let addr = config.socket_addr();

    info!(currency = state.currency.iso_alpha_code, "Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(state.into_shared()))
        .push(router::app_router());

    let doc = OpenApi::new("Checkout API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    observability.shutdown();
}
