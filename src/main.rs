// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_form_admin::backend::{HttpProductBackend, InMemoryProductBackend, ProductBackend};
use product_form_admin::config::AppConfig;
use product_form_admin::{app, state::AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_form_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja serwera...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Nie można wczytać konfiguracji: {}", e);
            std::process::exit(1);
        }
    };

    let backend: Arc<dyn ProductBackend> = match &config.product_backend_url {
        Some(url) => {
            tracing::info!("Zapis produktów przez backend HTTP: {}", url);
            Arc::new(HttpProductBackend::new(url.clone()))
        }
        None => {
            tracing::warn!("Brak PRODUCT_BACKEND_URL, produkty trafią do backendu w pamięci");
            Arc::new(InMemoryProductBackend::new())
        }
    };

    let addr = config.server_address();
    let app = app(AppState::new(config, backend));

    tracing::info!("Serwer nasłuchuje na {}", addr);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Nie można powiązać adresu {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Błąd serwera: {}", e);
    }
}
