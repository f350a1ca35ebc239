//! File server binary: provision credentials, then serve a storage
//! directory to authenticated clients.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sft_server::{identity, session::Connection};
use sft_transport::TcpMessageListener;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Secure file server.
#[derive(Parser, Debug)]
#[command(name = "sft-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an identity directory: authority plus server and client
    /// credentials.
    Provision {
        /// Directory to write credential files into.
        #[arg(short, long, default_value = "identities")]
        dir: PathBuf,

        /// Subject name for the server credentials.
        #[arg(long, default_value = "fileserver")]
        server_name: String,

        /// Subject names for client credentials (repeatable).
        #[arg(long, default_value = "client")]
        client_name: Vec<String>,

        /// Certificate validity in days.
        #[arg(long, default_value_t = 365)]
        validity_days: u64,
    },

    /// Accept connections and serve the storage directory.
    Serve {
        /// Address to listen on.
        #[arg(short, long, default_value = "127.0.0.1:4433")]
        listen: String,

        /// Directory holding uploaded and retrievable files.
        #[arg(short, long, default_value = "storage")]
        storage: PathBuf,

        /// Identity directory produced by `provision`.
        #[arg(short, long, default_value = "identities")]
        identity_dir: PathBuf,

        /// Which credentials in the identity directory to serve as.
        #[arg(long, default_value = "fileserver")]
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Provision {
            dir,
            server_name,
            client_name,
            validity_days,
        } => cmd_provision(dir, server_name, client_name, validity_days),
        Commands::Serve {
            listen,
            storage,
            identity_dir,
            name,
        } => cmd_serve(listen, storage, identity_dir, name),
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn cmd_provision(
    dir: PathBuf,
    server_name: String,
    client_names: Vec<String>,
    validity_days: u64,
) -> Result<()> {
    let not_after = unix_now() + validity_days * 86_400;

    let mut subjects = vec![server_name.as_str()];
    subjects.extend(client_names.iter().map(String::as_str));
    identity::provision(&dir, &subjects, not_after)?;

    info!(dir = %dir.display(), "identity directory ready");
    Ok(())
}

fn cmd_serve(
    listen: String,
    storage: PathBuf,
    identity_dir: PathBuf,
    name: String,
) -> Result<()> {
    let credentials = identity::load_credentials(&identity_dir, &name)?;
    let anchor = identity::load_trust_anchor(&identity_dir)?;

    std::fs::create_dir_all(&storage)
        .with_context(|| format!("cannot create storage dir {}", storage.display()))?;

    let listener = TcpMessageListener::bind(&listen)?;
    info!(%listen, storage = %storage.display(), serving_as = %name, "server ready");

    // One connection at a time; a session's failure never stops the loop.
    loop {
        let (stream, addr) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };
        info!(%addr, "client connected");

        match Connection::establish(stream, &credentials, &anchor, storage.clone()) {
            Ok(mut connection) => {
                info!(%addr, peer = connection.peer_subject(), "session established");
                if let Err(e) = connection.serve() {
                    warn!(%addr, "session ended with error: {e}");
                }
            }
            Err(e) => warn!(%addr, "handshake failed: {e}"),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
