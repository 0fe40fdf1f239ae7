//! Coverage-guided interconnect fuzzing.
//!
//! Given a [`RoutingGraph`](pipweave_graph::RoutingGraph), a [`Campaign`]
//! generates a sequence of designs. Each design routes as many nets as it
//! can, every net forced through one target PIP and ending at usable site
//! pins, and is written out as a Vivado Tcl script.
//!
//! # Pipeline
//!
//! 1. **Schedule**: [`WorkOrder::build`] orders ttpips by ascending coverage
//! 2. **Route**: [`Router::route`] searches downhill for a sink and uphill for
//!    a source, then commits the path to the [`Design`]
//! 3. **Bind**: the [`binder`] maps site pins to primitive pins and owns the
//!    per-design cells
//! 4. **Emit**: [`write_design`] serializes cells, nets and fixed routes
//!
//! The whole run draws from one seeded RNG, so a fixed seed, graph and
//! configuration reproduce every output byte for byte.

#![warn(missing_docs)]

pub mod binder;
pub mod campaign;
pub mod coverage;
pub mod design;
pub mod emitter;
pub mod error;
pub mod ids;
pub mod router;
pub mod schedule;

pub use binder::{classify, BelPin, Binder, Cell, PinDir, SiteType};
pub use campaign::{Campaign, DesignOutcome, DesignStats, DEFAULT_SEED};
pub use coverage::CoverageState;
pub use design::{BoundPin, Design, NetRoute, NetSource, Owner, RouteCommit};
pub use emitter::write_design;
pub use error::{BindError, FuzzError};
pub use ids::{CellId, NetId};
pub use router::Router;
pub use schedule::{retry_budget, WorkOrder};
