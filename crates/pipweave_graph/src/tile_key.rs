//! Grid-located names for tiles and sites.
//!
//! Tiles and sites share the `PREFIX_X<col>Y<row>` naming scheme. The prefix
//! of a tile name is its tile type (`RCLK_CLEL_R_L_X10Y59` is an
//! `RCLK_CLEL_R_L` tile), and the prefix of a site name is its site type.

use pipweave_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// A tile or site location: interned prefix plus grid coordinates.
///
/// Names without a canonical coordinate suffix keep the whole name as the
/// prefix and use `-1` for both coordinates, so every key renders back to
/// the exact name it was parsed from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TileKey {
    /// Tile type (for tiles) or site type (for sites).
    pub prefix: Ident,
    /// Column coordinate, `-1` if absent.
    pub x: i32,
    /// Row coordinate, `-1` if absent.
    pub y: i32,
}

impl TileKey {
    /// Parses `PREFIX_X<n>Y<m>`, interning the prefix.
    pub fn parse(interner: &mut Interner, name: &str) -> Self {
        match split_coords(name) {
            Some((prefix, x, y)) => Self {
                prefix: interner.get_or_intern(prefix),
                x,
                y,
            },
            None => Self {
                prefix: interner.get_or_intern(name),
                x: -1,
                y: -1,
            },
        }
    }

    /// Returns whether this key carries grid coordinates.
    pub fn has_coords(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// Renders the key back into its textual name.
    pub fn render(&self, interner: &Interner) -> String {
        let prefix = interner.resolve(self.prefix);
        if self.has_coords() {
            format!("{prefix}_X{}Y{}", self.x, self.y)
        } else {
            prefix.to_string()
        }
    }
}

/// Splits `PREFIX_X<n>Y<m>` into its parts, or `None` if the suffix is absent
/// or would not render back identically.
fn split_coords(name: &str) -> Option<(&str, i32, i32)> {
    let split = name.rfind("_X")?;
    let (prefix, suffix) = (&name[..split], &name[split + 2..]);
    if prefix.is_empty() {
        return None;
    }
    let (x, y) = suffix.split_once('Y')?;
    Some((prefix, coord(x)?, coord(y)?))
}

/// A decimal coordinate without sign or leading zeros.
fn coord(digits: &str) -> Option<i32> {
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}
