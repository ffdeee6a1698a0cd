use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "wayfarer-server", about = "Wayfarer game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:4174")]
    addr: SocketAddr,

    /// SQLite database path. Defaults to ~/.wayfarer/wayfarer.db.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory holding the versioned terrain JSON files.
    #[arg(long, default_value = "data/world")]
    world_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let db_path = args.db.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wayfarer")
            .join("wayfarer.db")
    });

    eprintln!("[wayfarer] server listening on http://{}", args.addr);
    wayfarer_server::serve(args.addr, db_path, args.world_dir).await
}
