//! Error types for fuzzing campaigns.

use std::path::PathBuf;

use pipweave_common::InternalError;
use pipweave_config::ConfigError;
use pipweave_graph::GraphError;

use crate::ids::{CellId, NetId};

/// Fatal errors raised while running a campaign.
#[derive(Debug, thiserror::Error)]
pub enum FuzzError {
    /// An output file or directory could not be created or written.
    #[error("cannot write '{}': {source}", path.display())]
    Output {
        /// The path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An input file could not be opened.
    #[error("cannot read '{}': {source}", path.display())]
    Input {
        /// The path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A coverage report line could not be parsed.
    #[error("coverage report line {line}: {message}")]
    CoverageReport {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Reading an input stream failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The campaign configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The routing graph could not be loaded.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An internal invariant was broken.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// A binder commit that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The pin is already bound to a different finalized net.
    #[error("pin {pin} of cell {} is already bound to net {}", cell.as_raw(), existing.as_raw())]
    Conflict {
        /// Cell owning the pin.
        cell: CellId,
        /// Cell pin name.
        pin: String,
        /// Net currently holding the pin.
        existing: NetId,
    },

    /// The site is used as a routethru and cannot host a cell pin.
    #[error("site is reserved as a routethru")]
    Routethru,
}
