//! `pipweave info`: routing graph statistics.

use std::io::Write;

use pipweave_common::Interner;
use pipweave_graph::{ResourceCatalog, RoutingGraph};

use crate::pipeline::read_graph;
use crate::{GlobalArgs, InfoArgs};

/// Runs the `pipweave info` command, printing a summary to stdout.
pub fn run(args: &InfoArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (graph, interner) = read_graph(&args.graph)?;
    let catalog = ResourceCatalog::build(&graph);
    let stdout = std::io::stdout();
    write_summary(&mut stdout.lock(), &graph, &catalog, &interner)?;
    Ok(0)
}

/// Writes node, PIP and ttpip totals followed by one line per tile type.
fn write_summary(
    out: &mut impl Write,
    graph: &RoutingGraph,
    catalog: &ResourceCatalog,
    interner: &Interner,
) -> std::io::Result<()> {
    let targets = graph.pips().filter(|(_, p)| p.is_fuzz_target).count();
    writeln!(out, "nodes:       {}", graph.node_count())?;
    writeln!(out, "pips:        {} ({targets} fuzzable)", graph.pip_count())?;
    writeln!(out, "ttpips:      {}", catalog.len())?;

    let mut rows: Vec<(&str, usize, usize)> = catalog
        .tile_types()
        .map(|ty| {
            (
                interner.resolve(ty),
                catalog.instances(ty).len(),
                catalog.max_pips(ty),
            )
        })
        .collect();
    rows.sort();
    if !rows.is_empty() {
        writeln!(out)?;
        writeln!(out, "{:<24} {:>9} {:>9}", "tile type", "instances", "max pips")?;
        for (name, instances, max_pips) in rows {
            writeln!(out, "{name:<24} {instances:>9} {max_pips:>9}")?;
        }
    }
    Ok(())
}
