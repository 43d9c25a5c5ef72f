//! hello-function: run the bridge under a proxy-event runtime, or serve it
//! locally.
//!
//! # Usage
//!
//! ```text
//! hello-function serve --port 8888 --config bridge.toml
//! hello-function lambda
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hello-function", about = "hello RPC function host")]
struct Cli {
    /// TOML adapter configuration. `BRIDGE_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the function over plain HTTP, converting each request into a
    /// trigger event.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8888")]
        port: u16,

        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Run under the Lambda runtime API.
    Lambda,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = hello_function::load_config(cli.config.as_deref())?;
    let bridge = hello_function::bridge(config);

    match cli.command {
        Command::Serve { port, host } => {
            let listener = TcpListener::bind((host.as_str(), port)).await?;
            hello_function::dev::run(listener, bridge).await?;
        }
        Command::Lambda => {
            hello_function::lambda::run(bridge)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}
