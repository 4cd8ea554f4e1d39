//! Washbay Marketplace Server
//!
//! gRPC backend for the car-wash marketplace: bookings, coin wallet ledger,
//! vendor directory, and notification dispatch.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tonic::transport::Server;
use tracing::info;

use washbay_proto::v1::booking_service_server::BookingServiceServer;
use washbay_proto::v1::health_server::HealthServer;
use washbay_proto::v1::user_service_server::UserServiceServer;
use washbay_proto::v1::vendor_service_server::VendorServiceServer;
use washbay_proto::v1::wallet_service_server::WalletServiceServer;

use washbay_server::booking::BookingCoordinator;
use washbay_server::notify::{NotificationSink, WebhookNotifier, spawn_dispatcher};
use washbay_server::server::{
    BookingServiceImpl, MarketHealthService, UserServiceImpl, VendorServiceImpl, WalletServiceImpl,
};
use washbay_server::storage::MarketDatabase;

#[derive(Parser, Debug)]
#[command(name = "washbay-server")]
#[command(version, about = "Washbay marketplace server - bookings and coin wallet")]
struct Args {
    /// Address to listen on. Overrides the configured port.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to a settings.json overriding the global config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// External notifier endpoint for booking events.
    #[arg(long, env = "WASHBAY_NOTIFY_URL")]
    notify_url: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = washbay_core::config::load_config(args.config.as_deref())?;
    if let Some(url) = &args.notify_url {
        config.notify.webhook_url = Some(url.clone());
    }
    if let Some(path) = &args.db_path {
        config.server.database_path = Some(path.clone());
    }

    washbay_core::tracing_init::init_tracing(
        &format!("washbay_server={}", config.server.log_level),
        args.log_json,
    );

    let addr = args
        .addr
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], config.server.port)));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting washbay-server"
    );

    let db = match &config.server.database_path {
        Some(path) => {
            info!(path = %path.display(), "Opening market database");
            MarketDatabase::open(path).await?
        }
        None => {
            let default_path = default_db_path()?;
            info!(path = %default_path.display(), "Opening market database (default path)");
            MarketDatabase::open(&default_path).await?
        }
    };

    // Booking events flow through an unbounded channel to the dispatcher;
    // delivery failures never reach the booking path.
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let sink = match &config.notify.webhook_url {
        Some(url) => {
            info!(url = %url, "Notification webhook enabled");
            NotificationSink::Webhook(WebhookNotifier::new(
                url,
                config.notify.webhook_timeout_secs,
            )?)
        }
        None => NotificationSink::Log,
    };
    let dispatcher = spawn_dispatcher(event_rx, sink);

    let coordinator = BookingCoordinator::new(db.clone(), config.booking.clone(), event_tx);

    // Build services
    let users = UserServiceImpl::new(db.clone());
    let vendors = VendorServiceImpl::new(db.clone());
    let bookings = BookingServiceImpl::new(coordinator.clone(), db.clone());
    let wallets = WalletServiceImpl::new(coordinator, db);
    let health = MarketHealthService::new();

    let router = Server::builder()
        .add_service(UserServiceServer::new(users))
        .add_service(VendorServiceServer::new(vendors))
        .add_service(BookingServiceServer::new(bookings))
        .add_service(WalletServiceServer::new(wallets))
        .add_service(HealthServer::new(health));

    tokio::select! {
        result = router.serve(addr) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    dispatcher.abort();
    info!("Server stopped");
    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    washbay_core::config::database_path()
        .or_else(|| dirs::home_dir().map(|h| h.join(".washbay").join("market.db")))
        .ok_or_else(|| anyhow::anyhow!("Cannot determine a database path"))
}
