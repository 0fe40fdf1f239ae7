//! Vivado Tcl writer for generated designs.
//!
//! Each design becomes one script that clears the open design, creates and
//! locks every cell, then creates every net, connects its cell pins and fixes
//! its route to the exact node path found by the router.
//!
//! # Format
//!
//! ```text
//! # pipweave design 0: 1 nets, 2 cells
//! remove_net -quiet [get_nets -quiet]
//! remove_cell -quiet [get_cells -quiet]
//!
//! set c [create_cell -reference LUT6 cell_0]
//! place_cell $c SLICE_X1Y0/B6LUT
//! set_property IS_BEL_FIXED 1 $c
//! set_property IS_LOC_FIXED 1 $c
//!
//! set n [create_net net_0]
//! connect_net -hierarchical -net $n -objects {cell_1/O cell_0/I1}
//! set_property FIXED_ROUTE {INT_X0Y0/S INT_X0Y0/A INT_X0Y0/B} $n
//! ```
//!
//! Every `BUFG_GT` cell gets an unplaced `BUFG_GT_SYNC` companion whose
//! `CESYNC`/`CLRSYNC` outputs drive the buffer's `CE`/`CLR` pins.

use std::collections::BTreeMap;
use std::io::{self, Write};

use pipweave_common::Interner;
use pipweave_graph::RoutingGraph;

use crate::design::Design;
use crate::ids::{CellId, NetId};

const SYNC_TARGET: &str = "BUFG_GT";
const SYNC_CELL_TYPE: &str = "BUFG_GT_SYNC";
const SYNC_NETS: [(&str, &str); 2] = [("CESYNC", "CE"), ("CLRSYNC", "CLR")];

fn cell_name(id: CellId) -> String {
    format!("cell_{}", id.as_raw())
}

fn sync_cell_name(id: CellId) -> String {
    format!("cell_{}_sync", id.as_raw())
}

fn net_name(id: NetId) -> String {
    format!("net_{}", id.as_raw())
}

/// Writes one design as a Vivado Tcl script.
pub fn write_design<W: Write>(
    mut out: W,
    index: usize,
    design: &Design,
    graph: &RoutingGraph,
    interner: &Interner,
) -> io::Result<()> {
    let binder = design.binder();
    writeln!(
        out,
        "# pipweave design {index}: {} nets, {} cells",
        design.net_count(),
        binder.cell_count()
    )?;
    writeln!(out, "remove_net -quiet [get_nets -quiet]")?;
    writeln!(out, "remove_cell -quiet [get_cells -quiet]")?;
    writeln!(out)?;

    let mut net_pins: BTreeMap<NetId, Vec<String>> = BTreeMap::new();
    let mut sync_cells = Vec::new();
    for (id, cell) in binder.cells() {
        let name = cell_name(id);
        writeln!(out, "set c [create_cell -reference {} {name}]", cell.cell_type)?;
        if let Some((site, bel)) = &cell.placement {
            writeln!(out, "place_cell $c {}/{bel}", site.render(interner))?;
            writeln!(out, "set_property IS_BEL_FIXED 1 $c")?;
            writeln!(out, "set_property IS_LOC_FIXED 1 $c")?;
        }
        writeln!(out)?;
        if cell.cell_type == SYNC_TARGET {
            writeln!(
                out,
                "create_cell -reference {SYNC_CELL_TYPE} {}",
                sync_cell_name(id)
            )?;
            writeln!(out)?;
            sync_cells.push(id);
        }
        for (pin, &net) in &cell.pins {
            net_pins.entry(net).or_default().push(format!("{name}/{pin}"));
        }
    }

    for (&net, route) in design.net_routes() {
        let pins = net_pins.get(&net).map(Vec::as_slice).unwrap_or(&[]);
        let nodes: Vec<String> = route
            .nodes
            .iter()
            .map(|&n| graph.node_name(n, interner))
            .collect();
        writeln!(out, "set n [create_net {}]", net_name(net))?;
        writeln!(
            out,
            "connect_net -hierarchical -net $n -objects {{{}}}",
            pins.join(" ")
        )?;
        writeln!(out, "set_property FIXED_ROUTE {{{}}} $n", nodes.join(" "))?;
        writeln!(out)?;
    }

    for id in sync_cells {
        for (sync_pin, buf_pin) in SYNC_NETS {
            writeln!(
                out,
                "set n [create_net {}_{}]",
                cell_name(id),
                sync_pin.to_ascii_lowercase()
            )?;
            writeln!(
                out,
                "connect_net -hierarchical -net $n -objects {{{}/{sync_pin} {}/{buf_pin}}}",
                sync_cell_name(id),
                cell_name(id)
            )?;
        }
        writeln!(out)?;
    }
    out.flush()
}
