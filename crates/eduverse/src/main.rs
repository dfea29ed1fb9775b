// eduverse/crates/eduverse/src/main.rs

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use eduverse::{config::Config, run_server};

/// EduVerse backend server
#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Bind host, overrides API_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides API_PORT
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file, overrides DATABASE_PATH
    #[arg(long)]
    database: Option<std::path::PathBuf>,
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = Config::from_env()?;
    if let Some(host) = args.host {
        cfg.api_host = host;
    }
    if let Some(port) = args.port {
        cfg.api_port = port;
    }
    if let Some(database) = args.database {
        cfg.database_path = database;
    }

    run_server(cfg).await
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
