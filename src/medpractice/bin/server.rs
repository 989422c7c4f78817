use clap::Parser;
use medpractice::api::PracticeApi;
use medpractice::config::{self, PracticeConfig};
use medpractice::error::{PracticeError, Result};
use medpractice::logging;
use medpractice::server;
use medpractice::store::fs::FileStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "medpractice-server", version)]
#[command(about = "REST server for patients, physicians, appointments and medical notes", long_about = None)]
struct Args {
    /// Home directory holding config.json and data/
    #[arg(long, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Address to bind, overriding the configured one
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(if args.verbose { "debug" } else { "info" });

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let home = config::resolve_home(args.home)?;
    let config = PracticeConfig::load(&home)?;
    let data_dir = config::data_dir(&home);

    let api = PracticeApi::open(FileStore::new(&data_dir))?;
    let app = server::router(Arc::new(api));

    let addr = args.listen.unwrap_or(config.listen);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, data = %data_dir.display(), "medpractice server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(PracticeError::Io)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
