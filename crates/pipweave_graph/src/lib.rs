//! Routing-resource graph for interconnect fuzzing.
//!
//! This crate holds the immutable wire/PIP graph of a device, the text
//! ingestion that builds it, and the [`ResourceCatalog`] of distinct
//! (tile-type, PIP-name) pairs that coverage is tracked against.
//!
//! # Pipeline
//!
//! 1. **Ingest**: [`load_graph`] parses the line-oriented graph dump into a
//!    [`RoutingGraph`]
//! 2. **Catalog**: [`ResourceCatalog::build`] groups fuzz-target PIPs by tile
//!    type and tile instance
//!
//! Nodes and PIPs live in flat arenas and refer to each other by
//! [`NodeId`]/[`PipId`] indices.

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod graph;
pub mod ids;
pub mod ingest;
pub mod tile_key;

pub use catalog::{ResourceCatalog, TileInstance, TileTypePip};
pub use error::GraphError;
pub use graph::{GraphBuilder, Node, Pip, RoutingGraph, SitePin};
pub use ids::{NodeId, PipId};
pub use ingest::{load_graph, parse_graph};
pub use tile_key::TileKey;
