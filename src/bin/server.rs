use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use state_finance_dashboard::{
    AppState, UploadConfig, build_router, graceful_shutdown, load_csv_file,
};

/// The web server for the state finance dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the CSV file shown to visitors that have not uploaded their own.
    #[arg(long, default_value = "data/state_finances.csv")]
    data_path: PathBuf,

    /// The IP address to serve the dashboard from.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Directory containing an SSL certificate `cert.pem` and key `key.pem`.
    /// The server uses plain HTTP if this is not set.
    #[arg(long)]
    cert_path: Option<PathBuf>,

    /// The number of uploaded datasets kept in memory.
    #[arg(long, default_value_t = UploadConfig::default().max_uploads)]
    max_uploads: usize,

    /// The largest accepted upload, in bytes.
    #[arg(long, default_value_t = UploadConfig::default().max_upload_bytes)]
    max_upload_bytes: usize,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let default_dataset = load_csv_file(&args.data_path)
        .inspect_err(|error| {
            tracing::error!(
                "Could not load the default dataset: {error}. \
                Visitors will be asked to upload a dataset."
            )
        })
        .ok();

    let secret = env::var("SECRET").ok();
    if secret.is_none() {
        tracing::warn!(
            "The environment variable 'SECRET' is not set, a random cookie key will be used. \
            Sessions will not survive a server restart."
        );
    }

    let app_state = AppState::new(
        default_dataset,
        secret.as_deref(),
        args.cert_path.is_some(),
        UploadConfig {
            max_uploads: args.max_uploads,
            max_upload_bytes: args.max_upload_bytes,
        },
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::new(args.host, args.port);

    match args.cert_path {
        Some(cert_path) => {
            let tls_config = RustlsConfig::from_pem_file(
                cert_path.join("cert.pem"),
                cert_path.join("key.pem"),
            )
            .await
            .expect("Could not open TLS certificates.");

            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
                .expect("Could not start HTTPS server.");
        }
        None => {
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
                .expect("Could not start HTTP server.");
        }
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    // RUST_LOG narrows the levels below when it is set.
    let env_filter = EnvFilter::try_from_default_env().ok();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
