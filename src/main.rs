use std::{path::Path, sync::Arc};

use clap::Parser;
use ignition::{
    AppState,
    auth::TokenSource,
    build_app,
    config::IgnitionConfig,
    identity::UaaClient,
    observability,
    platform::CloudControllerClient,
    services::Services,
};

#[derive(Parser, Debug)]
#[command(version, about = "Organization provisioning for platform users", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "ignition.toml")]
    config: String,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Load and validate the configuration file, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => run_check_config(&args.config),
        Some(Command::Serve) | None => run_server(&args.config).await,
    }
}

fn load_config(path: &Path) -> IgnitionConfig {
    match IgnitionConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_check_config(config_path: &str) {
    let config = load_config(Path::new(config_path));
    println!("Configuration OK: {}", config_path);
    println!("  platform: {}", config.platform.api_url);
    match &config.identity_provider {
        Some(idp) => println!("  identity provider: {} (origin {})", idp.url, idp.origin),
        None => println!("  identity provider: none (user id taken from request headers)"),
    }
    println!(
        "  organizations: {}-<user>, quota {}",
        config.organization.name_prefix, config.organization.quota_id
    );
}

/// Wire the remote clients into the service container.
fn build_services(config: &IgnitionConfig, http_client: &reqwest::Client) -> Services {
    let platform_tokens = Arc::new(TokenSource::from_config(&config.platform.token, http_client));
    let platform = CloudControllerClient::new(&config.platform.api_url)
        .with_http_client(http_client.clone())
        .with_token_source(platform_tokens);
    let mut services = Services::new(Arc::new(platform));

    if let Some(idp) = &config.identity_provider {
        let tokens = Arc::new(TokenSource::from_config(&idp.token, http_client));
        let uaa = UaaClient::new(&idp.url)
            .with_http_client(http_client.clone())
            .with_token_source(tokens);
        services = services.with_identity_provider(Arc::new(uaa), idp.origin.clone());
    }

    services
}

async fn run_server(config_path: &str) {
    let config = load_config(Path::new(config_path));

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    tracing::info!(config_file = %config_path, "Starting ignition");

    if config.identity_provider.is_none() {
        tracing::warn!(
            header = ?config.auth.user_id_header,
            "No identity provider configured; requests without a user id header will be rejected"
        );
    }
    if !config.server.host.is_loopback() {
        tracing::warn!(
            identity_header = %config.auth.identity_header,
            "Identity is taken from request headers. Only expose this service behind a \
             reverse proxy that sets and strips them."
        );
    }

    let http_client = match config.server.http_client.build_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let services = build_services(&config, &http_client);
    let bind_addr = config.server.socket_addr();
    let state = AppState {
        config: Arc::new(config),
        services,
    };
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
