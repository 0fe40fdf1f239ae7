//! The outer generation loop.
//!
//! A [`Campaign`] owns the graph, its catalog, the run-wide coverage and the
//! single seeded RNG. Designs run strictly one after another: each starts
//! from a fresh [`Design`], disables a random subset of nodes, builds a work
//! order from the current coverage and fills a fixed number of routing slots.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use pipweave_common::{Interner, PipweaveResult};
use pipweave_config::CampaignConfig;
use pipweave_graph::{ResourceCatalog, RoutingGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::coverage::CoverageState;
use crate::design::Design;
use crate::emitter::write_design;
use crate::error::FuzzError;
use crate::router::Router;
use crate::schedule::{retry_budget, WorkOrder};

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 0x3141_5926_5358_9793;

/// Summary of one generated design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignStats {
    /// Design index within the run.
    pub index: usize,
    /// Routing slots attempted.
    pub slots: usize,
    /// Slots that produced a committed net.
    pub routed: usize,
    /// Nodes disabled at the start of the design.
    pub disabled_nodes: usize,
    /// Cells placed, including synthetic constant drivers.
    pub cells: usize,
}

/// A finished design and its statistics.
#[derive(Debug)]
pub struct DesignOutcome {
    /// The populated design.
    pub design: Design,
    /// Its summary.
    pub stats: DesignStats,
}

/// A fuzzing run over one routing graph.
pub struct Campaign {
    graph: RoutingGraph,
    catalog: ResourceCatalog,
    interner: Interner,
    config: CampaignConfig,
    coverage: CoverageState,
    rng: StdRng,
}

impl Campaign {
    /// Builds the catalog for `graph` and starts all coverage at zero.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::Config`] if `config` fails validation.
    pub fn new(
        graph: RoutingGraph,
        interner: Interner,
        config: CampaignConfig,
        seed: u64,
    ) -> Result<Self, FuzzError> {
        pipweave_config::validate_config(&config)?;
        let catalog = ResourceCatalog::build(&graph);
        let coverage = CoverageState::new(&catalog);
        Ok(Self {
            graph,
            catalog,
            interner,
            config,
            coverage,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The routing graph.
    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    /// The ttpip catalog.
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// The interner holding every graph name.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Coverage so far.
    pub fn coverage(&self) -> &CoverageState {
        &self.coverage
    }

    /// Generates and routes one design.
    ///
    /// # Errors
    ///
    /// Fails only on a broken design invariant.
    pub fn run_design(&mut self, index: usize) -> PipweaveResult<DesignOutcome> {
        let mut design = Design::new(&self.graph);
        let disabled_nodes =
            design.disable_random_nodes(&mut self.rng, self.config.design.disable_probability);
        let order = WorkOrder::build(&self.coverage, &mut self.rng);
        let router = Router::new(&self.graph, &self.catalog, &self.interner, &self.config.router);

        let mut slots = 0;
        let mut routed = 0;
        for slot in 0..self.config.design.slots {
            let Some(ttpip) = order.slot(slot) else {
                break;
            };
            slots += 1;
            let budget = retry_budget(self.coverage.count(ttpip), &self.config.scheduler);
            if router
                .route(&mut design, &mut self.coverage, ttpip, budget, &mut self.rng)?
                .is_some()
            {
                routed += 1;
            }
        }

        let stats = DesignStats {
            index,
            slots,
            routed,
            disabled_nodes,
            cells: design.binder().cell_count(),
        };
        tracing::info!(
            design = index,
            routed,
            slots,
            cells = stats.cells,
            disabled = disabled_nodes,
            "design complete"
        );
        Ok(DesignOutcome { design, stats })
    }

    /// Generates `count` designs, writing `design_<index>.tcl` for each into
    /// `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::Output`] if the directory or a script cannot be
    /// written.
    pub fn generate(&mut self, count: usize, out_dir: &Path) -> Result<Vec<DesignStats>, FuzzError> {
        fs::create_dir_all(out_dir).map_err(|source| FuzzError::Output {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let mut all = Vec::with_capacity(count);
        for index in 0..count {
            let outcome = self.run_design(index)?;
            let path = out_dir.join(format!("design_{index}.tcl"));
            let output_error = |source: std::io::Error| FuzzError::Output {
                path: path.clone(),
                source,
            };
            let file = File::create(&path).map_err(output_error)?;
            write_design(
                BufWriter::new(file),
                index,
                &outcome.design,
                &self.graph,
                &self.interner,
            )
            .map_err(output_error)?;
            all.push(outcome.stats);
        }

        tracing::info!(
            designs = count,
            covered = self.coverage.covered(),
            total = self.coverage.total(),
            "campaign complete"
        );
        Ok(all)
    }

    /// Writes the coverage report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::Output`] if the file cannot be written.
    pub fn write_coverage_report(&self, path: &Path) -> Result<(), FuzzError> {
        let output_error = |source: std::io::Error| FuzzError::Output {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(output_error)?;
        self.coverage
            .write_report(BufWriter::new(file), &self.interner)
            .map_err(output_error)
    }

    /// Adds the counts from a previous coverage report, for resumed runs.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::Input`] if the file cannot be opened and
    /// [`FuzzError::CoverageReport`] for a malformed line.
    pub fn load_coverage_report(&mut self, path: &Path) -> Result<usize, FuzzError> {
        let file = File::open(path).map_err(|source| FuzzError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let merged =
            self.coverage
                .load_report(BufReader::new(file), &self.interner, &self.catalog)?;
        tracing::info!(merged, path = %path.display(), "resumed coverage");
        Ok(merged)
    }
}
