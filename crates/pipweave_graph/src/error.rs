//! Error types for routing graph ingestion.

use std::path::PathBuf;

/// Fatal errors raised while reading a routing graph.
///
/// Malformed lines are not errors; they are dropped during ingestion.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The graph file could not be opened.
    #[error("cannot open routing graph '{}': {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading from the graph stream failed.
    #[error("failed to read routing graph: {0}")]
    Io(#[from] std::io::Error),

    /// A line started with a keyword that is not part of the format.
    #[error("line {line}: unexpected routing graph entry '{keyword}'")]
    UnknownKeyword {
        /// 1-based line number.
        line: usize,
        /// The unrecognized keyword.
        keyword: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_keyword() {
        let err = GraphError::UnknownKeyword {
            line: 7,
            keyword: "wire".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "line 7: unexpected routing graph entry 'wire'"
        );
    }

    #[test]
    fn display_open_error() {
        let err = GraphError::Open {
            path: PathBuf::from("/tmp/missing.graph"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(format!("{err}").starts_with("cannot open routing graph '/tmp/missing.graph'"));
    }
}
