use std::{net::SocketAddr, path::PathBuf};

use axum::http::HeaderValue;
use clap::Parser;

use crate::session::SessionOptions;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_EXPORT_PATH: &str = "route.yaml";

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Serve the route selector bridge for an interactive map surface"
)]
pub struct Args {
    /// Address to listen on (falls back to SELECTOR_BIND, then 127.0.0.1:8000)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// File written by the save endpoint (falls back to SELECTOR_EXPORT_PATH, then route.yaml)
    #[arg(long)]
    pub export_path: Option<PathBuf>,

    /// Route file imported before the server starts
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Send one RemoveMarker per marker when clearing routes
    #[arg(long)]
    pub per_marker_clear: bool,

    /// Origin of the map page allowed to call the API cross-origin (repeatable).
    /// Without one, browsers only reach the API from its own origin.
    #[arg(long = "allow-origin")]
    pub allow_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub bind: SocketAddr,
    pub export_path: PathBuf,
    pub load: Option<PathBuf>,
    pub session: SessionOptions,
    pub allowed_origins: Vec<HeaderValue>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid SELECTOR_BIND address {0:?}")]
    InvalidBind(String),
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),
}

impl SelectorConfig {
    /// Resolve CLI flags, then environment variables, then defaults.
    pub fn resolve(args: Args) -> Result<Self, ConfigError> {
        let bind = match args.bind {
            Some(addr) => addr,
            None => {
                let raw = std::env::var("SELECTOR_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::InvalidBind(raw))?
            }
        };
        let export_path = args.export_path.unwrap_or_else(|| {
            std::env::var("SELECTOR_EXPORT_PATH")
                .unwrap_or_else(|_| DEFAULT_EXPORT_PATH.to_string())
                .into()
        });

        let allowed_origins = args
            .allow_origins
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(&origin).map_err(|_| ConfigError::InvalidOrigin(origin))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bind,
            export_path,
            load: args.load,
            session: SessionOptions {
                per_marker_clear: args.per_marker_clear,
            },
            allowed_origins,
        })
    }
}
