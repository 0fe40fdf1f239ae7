//! Per-design ID newtypes.

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
        }
    };
}

define_id!(
    /// A net within one design. Allocated in commit order.
    NetId
);

define_id!(
    /// A cell within one design. The raw value is the cell's ordinal.
    CellId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_id_ordering() {
        assert!(NetId::from_raw(0) < NetId::from_raw(1));
    }

    #[test]
    fn cell_id_serde_roundtrip() {
        let id = CellId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: CellId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
