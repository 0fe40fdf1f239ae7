//! Reader for the line-oriented routing graph dump.
//!
//! # Format
//!
//! ```text
//! # comment
//! pip INT_X3Y140/EE2_E_BEG0.EE2_E_END0 1 INT_X3Y140/EE2_E_BEG0 INT_X4Y140/EE2_E_END0
//! extpip RCLK_INT_L_X3Y119 RCLK_INT_L_X3Y119/CLK_LEAF0 INT_X3Y120/GCLK_B_0
//! pin SLICE_X3Y140/A1 CLEL_R_X3Y140/CLE_CLE_L_SITE_0_A1
//! extpin BUFCE_ROW_X0Y12/CLK_IN RCLK_CLEL_R_L_X10Y59/CLK_HROUTE_0
//! ```
//!
//! * `pip <TILE>/<PIP> <FLAG> <SRC> <DST>`: a named, fuzzable PIP.
//!   It is bidirectional when `FLAG` is `0`.
//! * `extpip <TILE> <SRC> <DST>`: an anonymous one-way edge.
//! * `pin`/`extpin <SITE>/<PIN> <NODE>`: attaches a site pin to a node.
//!
//! Node references are `<TILE>/<WIRE>`. Trailing fields are ignored. A line
//! with a missing field, a name without `/`, or a non-numeric flag is dropped
//! without touching the graph. An unknown keyword is fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::SplitWhitespace;

use flate2::read::GzDecoder;
use pipweave_common::Interner;

use crate::error::GraphError;
use crate::graph::{GraphBuilder, RoutingGraph};
use crate::ids::NodeId;
use crate::tile_key::TileKey;

/// One validated line, still borrowing from the input.
enum Entry<'a> {
    Pip {
        tile: &'a str,
        name: Option<&'a str>,
        bidirectional: bool,
        src: (&'a str, &'a str),
        dst: (&'a str, &'a str),
    },
    Pin {
        site: &'a str,
        pin: &'a str,
        node: (&'a str, &'a str),
    },
}

/// Parses one non-empty line. `Ok(None)` means the line is malformed and
/// should be dropped.
fn parse_line(line_no: usize, line: &str) -> Result<Option<Entry<'_>>, GraphError> {
    let mut fields = line.split_whitespace();
    let Some(keyword) = fields.next() else {
        return Ok(None);
    };
    match keyword {
        "pip" => Ok(parse_pip(&mut fields)),
        "extpip" => Ok(parse_extpip(&mut fields)),
        "pin" | "extpin" => Ok(parse_pin(&mut fields)),
        other => Err(GraphError::UnknownKeyword {
            line: line_no,
            keyword: other.to_string(),
        }),
    }
}

fn parse_pip<'a>(fields: &mut SplitWhitespace<'a>) -> Option<Entry<'a>> {
    let (tile, name) = fields.next()?.split_once('/')?;
    let flag: u32 = fields.next()?.parse().ok()?;
    let src = fields.next()?.split_once('/')?;
    let dst = fields.next()?.split_once('/')?;
    Some(Entry::Pip {
        tile,
        name: Some(name),
        bidirectional: flag == 0,
        src,
        dst,
    })
}

fn parse_extpip<'a>(fields: &mut SplitWhitespace<'a>) -> Option<Entry<'a>> {
    let tile = fields.next()?;
    let src = fields.next()?.split_once('/')?;
    let dst = fields.next()?.split_once('/')?;
    Some(Entry::Pip {
        tile,
        name: None,
        bidirectional: false,
        src,
        dst,
    })
}

fn parse_pin<'a>(fields: &mut SplitWhitespace<'a>) -> Option<Entry<'a>> {
    let (site, pin) = fields.next()?.split_once('/')?;
    let node = fields.next()?.split_once('/')?;
    Some(Entry::Pin { site, pin, node })
}

/// Parses a routing graph from a buffered reader.
///
/// # Errors
///
/// Returns [`GraphError::Io`] if reading fails and
/// [`GraphError::UnknownKeyword`] for a line with an unrecognized keyword.
pub fn parse_graph<R: BufRead>(
    reader: R,
    interner: &mut Interner,
) -> Result<RoutingGraph, GraphError> {
    let mut builder = GraphBuilder::new();
    let mut pins = 0usize;
    let mut dropped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(entry) = parse_line(idx + 1, line)? else {
            dropped += 1;
            continue;
        };
        match entry {
            Entry::Pip {
                tile,
                name,
                bidirectional,
                src,
                dst,
            } => {
                let tile = TileKey::parse(interner, tile);
                let name = name.map(|n| interner.get_or_intern(n));
                let src = node_ref(&mut builder, interner, src);
                let dst = node_ref(&mut builder, interner, dst);
                builder.add_pip(tile, name, src, dst, bidirectional);
            }
            Entry::Pin { site, pin, node } => {
                let site = TileKey::parse(interner, site);
                let pin = interner.get_or_intern(pin);
                let node = node_ref(&mut builder, interner, node);
                builder.add_site_pin(node, site, pin);
                pins += 1;
            }
        }
    }

    let graph = builder.build();
    tracing::debug!(
        nodes = graph.node_count(),
        pips = graph.pip_count(),
        pins,
        dropped,
        "parsed routing graph"
    );
    Ok(graph)
}

fn node_ref(
    builder: &mut GraphBuilder,
    interner: &mut Interner,
    (tile, wire): (&str, &str),
) -> NodeId {
    let tile = TileKey::parse(interner, tile);
    let wire = interner.get_or_intern(wire);
    builder.node(tile, wire)
}

/// Loads a routing graph from a file. Paths ending in `.gz` are
/// decompressed on the fly.
///
/// # Errors
///
/// Returns [`GraphError::Open`] if the file cannot be opened, plus any error
/// from [`parse_graph`].
pub fn load_graph(path: &Path, interner: &mut Interner) -> Result<RoutingGraph, GraphError> {
    let file = File::open(path).map_err(|source| GraphError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    tracing::debug!(path = %path.display(), gzipped, "loading routing graph");
    if gzipped {
        parse_graph(BufReader::new(GzDecoder::new(file)), interner)
    } else {
        parse_graph(BufReader::new(file), interner)
    }
}
