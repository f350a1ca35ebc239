//! File client binary: upload, list, and download over a secure session.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sft_core::SecureChannel;
use sft_server::{client, identity};
use sft_transport::TcpMessageStream;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Secure file client.
#[derive(Parser, Debug)]
#[command(name = "sft-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server address.
    #[arg(short, long, default_value = "127.0.0.1:4433")]
    server: String,

    /// Identity directory produced by `sft-server provision`.
    #[arg(short, long, default_value = "identities")]
    identity_dir: PathBuf,

    /// Which credentials in the identity directory to connect as.
    #[arg(long, default_value = "client")]
    name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a local file.
    Put {
        /// File to upload.
        file: PathBuf,
    },

    /// List files stored on the server.
    Ls,

    /// Download a stored file.
    Get {
        /// Name of the stored file.
        name: String,

        /// Where to write it (defaults to the same name in the current
        /// directory).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let credentials = identity::load_credentials(&cli.identity_dir, &cli.name)?;
    let anchor = identity::load_trust_anchor(&cli.identity_dir)?;

    let stream = TcpMessageStream::connect(&cli.server)?;
    let mut channel = SecureChannel::new(stream);
    channel.establish_client(&credentials, &anchor)?;

    match cli.command {
        Commands::Put { file } => {
            let bytes = client::put(&mut channel, &file)?;
            println!("uploaded {} ({bytes} bytes)", file.display());
        }
        Commands::Ls => {
            let listing = client::list(&mut channel)?;
            if listing.is_empty() {
                println!("(no files stored)");
            } else {
                print!("{listing}");
            }
        }
        Commands::Get { name, out } => {
            let dest = out.unwrap_or_else(|| PathBuf::from(&name));
            let bytes = client::get(&mut channel, &name, &dest)?;
            println!("downloaded {name} -> {} ({bytes} bytes)", dest.display());
        }
    }

    Ok(())
}
