//! Shared setup for CLI commands.

use std::path::Path;

use pipweave_common::Interner;
use pipweave_config::{CampaignConfig, ConfigError};
use pipweave_graph::{GraphError, RoutingGraph};

use crate::GlobalArgs;

/// Loads `--config` if given, otherwise the defaults.
pub fn resolve_config(global: &GlobalArgs) -> Result<CampaignConfig, ConfigError> {
    match &global.config {
        Some(path) => pipweave_config::load_config(path),
        None => Ok(CampaignConfig::default()),
    }
}

/// Reads a routing graph and the interner holding its names.
pub fn read_graph(path: &Path) -> Result<(RoutingGraph, Interner), GraphError> {
    let mut interner = Interner::new();
    let graph = pipweave_graph::load_graph(path, &mut interner)?;
    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        pips = graph.pip_count(),
        "loaded routing graph"
    );
    Ok((graph, interner))
}
