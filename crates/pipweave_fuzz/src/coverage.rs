//! Run-wide coverage counters.
//!
//! [`CoverageState`] holds one success count per ttpip in the catalog. It
//! outlives every design and is only ever incremented, once per committed
//! route.
//!
//! # Report format
//!
//! ```text
//! RCLK_CLEL_R_L CLK_LEAF_SITES_0_CLK_IN.CLK_HROUTE_0 3
//! INT EE2_E_BEG0.EE2_E_END0 0
//! ```
//!
//! One `<tile_type> <pip_name> <count>` line per ttpip, in catalog order.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use pipweave_common::Interner;
use pipweave_graph::{ResourceCatalog, TileTypePip};

use crate::error::FuzzError;

/// Success count per ttpip.
#[derive(Debug, Clone)]
pub struct CoverageState {
    counts: BTreeMap<TileTypePip, u64>,
}

impl CoverageState {
    /// Starts every catalog ttpip at zero.
    pub fn new(catalog: &ResourceCatalog) -> Self {
        Self {
            counts: catalog.ttpips().iter().map(|&t| (t, 0)).collect(),
        }
    }

    /// Current count of a ttpip; zero if it is not tracked.
    pub fn count(&self, ttpip: TileTypePip) -> u64 {
        self.counts.get(&ttpip).copied().unwrap_or(0)
    }

    /// Records one committed route for `ttpip`.
    pub fn record_success(&mut self, ttpip: TileTypePip) {
        if let Some(count) = self.counts.get_mut(&ttpip) {
            *count += 1;
        }
    }

    /// Iterates over `(ttpip, count)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (TileTypePip, u64)> + '_ {
        self.counts.iter().map(|(&t, &c)| (t, c))
    }

    /// Number of ttpips with at least one success.
    pub fn covered(&self) -> usize {
        self.counts.values().filter(|&&c| c > 0).count()
    }

    /// Number of tracked ttpips.
    pub fn total(&self) -> usize {
        self.counts.len()
    }

    /// Writes the coverage report.
    pub fn write_report<W: Write>(&self, mut writer: W, interner: &Interner) -> std::io::Result<()> {
        for (ttpip, count) in self.iter() {
            writeln!(
                writer,
                "{} {} {}",
                interner.resolve(ttpip.tile_type),
                interner.resolve(ttpip.pip_name),
                count
            )?;
        }
        writer.flush()
    }

    /// Adds the counts of a previous report to this state.
    ///
    /// Lines naming a ttpip that is not in the catalog are skipped. Returns the
    /// number of lines merged.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzError::CoverageReport`] for a line without exactly three
    /// fields, with a non-numeric count, or whose count would overflow the
    /// running total.
    pub fn load_report<R: BufRead>(
        &mut self,
        reader: R,
        interner: &Interner,
        catalog: &ResourceCatalog,
    ) -> Result<usize, FuzzError> {
        let mut merged = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [tile_type, pip_name, count] = fields[..] else {
                return Err(FuzzError::CoverageReport {
                    line: idx + 1,
                    message: format!("expected 3 fields, found {}", fields.len()),
                });
            };
            let count: u64 = count.parse().map_err(|_| FuzzError::CoverageReport {
                line: idx + 1,
                message: format!("invalid count '{count}'"),
            })?;
            let Some(ttpip) = catalog.find(interner, tile_type, pip_name) else {
                tracing::debug!(tile_type, pip_name, "skipping unknown ttpip in coverage report");
                continue;
            };
            if let Some(slot) = self.counts.get_mut(&ttpip) {
                *slot = slot.checked_add(count).ok_or_else(|| FuzzError::CoverageReport {
                    line: idx + 1,
                    message: "count overflow".to_string(),
                })?;
                merged += 1;
            }
        }
        Ok(merged)
    }
}
