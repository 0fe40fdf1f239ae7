//! Opaque ID newtypes for routing graph entities.
//!
//! Each ID is a thin `u32` index into one of the [`RoutingGraph`](crate::RoutingGraph)
//! arenas. They are `Copy`, `Hash`, `Ord` and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize` for arena access.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a routing node (wire segment).
    NodeId
);

define_id!(
    /// Opaque, copyable ID for a programmable interconnect point.
    PipId
);
