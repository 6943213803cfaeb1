use std::io;

use shared::RouteId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("route {0} not found")]
    NotFound(RouteId),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed route document: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("document has neither a `routes` nor a `global_route` key")]
    UnrecognizedDocument,
    #[error("failed to serialize routes: {0}")]
    Serialize(serde_yaml::Error),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("route file error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// True when the failure is in the document itself rather than the
    /// file system or the writer.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, CodecError::Parse(_) | CodecError::UnrecognizedDocument)
    }
}
