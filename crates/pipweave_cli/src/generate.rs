//! `pipweave generate`: the fuzzing campaign.
//!
//! 1. Load configuration and the routing graph
//! 2. Build the catalog and, with `--resume`, merge earlier coverage
//! 3. Generate designs, writing one Tcl script per design
//! 4. Optionally write the coverage report

use pipweave_fuzz::Campaign;

use crate::pipeline::{read_graph, resolve_config};
use crate::{GenerateArgs, GlobalArgs};

/// Runs the `pipweave generate` command.
///
/// Returns exit code 0 once every requested design has been written.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(global)?;
    let (graph, interner) = read_graph(&args.graph)?;

    let mut campaign = Campaign::new(graph, interner, config, args.seed)?;
    if campaign.catalog().is_empty() {
        tracing::warn!("routing graph has no fuzzable PIPs");
    }
    if let Some(path) = &args.resume {
        campaign.load_coverage_report(path)?;
    }

    let stats = campaign.generate(args.designs, &args.out)?;
    if let Some(path) = &args.coverage_report {
        campaign.write_coverage_report(path)?;
    }

    let routed: usize = stats.iter().map(|s| s.routed).sum();
    let coverage = campaign.coverage();
    if !global.quiet {
        eprintln!(
            "   Generated {} design(s), {routed} net(s); {}/{} ttpips covered",
            stats.len(),
            coverage.covered(),
            coverage.total()
        );
    }
    Ok(0)
}
