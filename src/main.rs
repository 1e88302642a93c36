use broker::{Bridge, Publisher};
use hub::Hub;
use log::*;
use service::config::Config;
use service::logging::Logger;
use service::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    let broker = match service::init_broker(&config).await {
        Ok(broker) => broker,
        Err(err) => {
            error!("Failed to connect to the events broker: {err}");
            std::process::exit(1);
        }
    };
    let sessions = match service::init_session_store(&config).await {
        Ok(sessions) => sessions,
        Err(err) => {
            error!("Failed to connect to the session store: {err}");
            std::process::exit(1);
        }
    };

    // The hub owns this instance's subscriber registry; the bridge feeds it
    // everything published on the shared broker topic, from any instance.
    let hub = Hub::spawn();
    Bridge::new(broker.clone(), hub.clone()).spawn();

    let app_state = AppState::new(config.clone(), hub, Publisher::new(broker), sessions);
    let router = web::router::define_routes(app_state);

    let interface = config.interface.as_deref().unwrap_or("0.0.0.0");
    let address = format!("{}:{}", interface, config.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {address}: {err}");
            std::process::exit(1);
        }
    };

    info!("Server starting... listening for events on http://{address}/events");
    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {err}");
        std::process::exit(1);
    }
}

/// Completes on ctrl-c; open streams are dropped on the way down, which
/// deregisters each of them from the hub.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
