//! relayd - chat relay daemon speaking an IRC-family line protocol.
//!
//! Usage: `relayd [--conf PATH | PATH] [--initdb] [--genpasswd PASSWORD]`

mod config;
mod db;
mod error;
mod handlers;
mod network;
mod security;
mod state;

use crate::config::Config;
use crate::db::{ChannelStore, Database, NoopStore};
use crate::network::Gateway;
use crate::state::Matrix;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "relayd.toml";

/// What the process was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Serve { config_path: String },
    InitDb { config_path: String },
    GenPasswd(String),
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Mode> {
    let mut config_path = None;
    let mut initdb = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--conf" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--conf requires a path"))?;
                config_path = Some(path);
            }
            "--initdb" => initdb = true,
            "--genpasswd" => {
                let password = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--genpasswd requires a password"))?;
                return Ok(Mode::GenPasswd(password));
            }
            other if other.starts_with("--") => anyhow::bail!("unknown option {other}"),
            other => config_path = Some(other.to_string()),
        }
    }

    let config_path = config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    Ok(if initdb {
        Mode::InitDb { config_path }
    } else {
        Mode::Serve { config_path }
    })
}

fn init_tracing(config: &Config) {
    let default_filter = if config.debug.any() {
        "info,relayd=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .init();
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    Config::load(path).map_err(|e| {
        // Tracing is not up yet.
        eprintln!("relayd: failed to load {path}: {e}");
        e.into()
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = match parse_args(std::env::args().skip(1))? {
        Mode::GenPasswd(password) => {
            let hash = security::password::hash_password(&password)
                .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
            println!("{hash}");
            return Ok(());
        }
        Mode::InitDb { config_path } => {
            let config = load_config(&config_path)?;
            init_tracing(&config);
            let Some(database) = &config.database else {
                anyhow::bail!("--initdb needs a [database] section in {config_path}");
            };
            Database::new(&database.path).await?;
            info!(path = %database.path, "Database initialized");
            return Ok(());
        }
        Mode::Serve { config_path } => config_path,
    };

    let config = load_config(&config_path)?;
    init_tracing(&config);

    info!(
        server = %config.server.name,
        sid = %config.server.sid,
        config = %config_path,
        "Starting relayd"
    );

    let store: Arc<dyn ChannelStore> = match &config.database {
        Some(database) => Arc::new(Database::new(&database.path).await.map_err(|e| {
            error!(path = %database.path, error = %e, "Failed to open database");
            e
        })?),
        None => {
            warn!("No [database] configured; topics will not be persisted");
            Arc::new(NoopStore)
        }
    };

    let matrix = Arc::new(Matrix::new(&config, store));
    info!(opers = matrix.config.oper_blocks.len(), "Matrix initialized");

    let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix)).await?;

    tokio::select! {
        result = gateway.run() => {
            if let Err(e) = result {
                error!(error = %e, "Gateway stopped");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
