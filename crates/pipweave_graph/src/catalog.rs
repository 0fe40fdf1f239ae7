//! Catalog of fuzzable (tile-type, PIP-name) pairs.
//!
//! Coverage is tracked per [`TileTypePip`], independent of which physical
//! tile instance provided the PIP. The catalog also keeps, per tile type, a
//! PIP-name lookup for every instance so the router can pick a concrete PIP
//! from any tile of the right type.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pipweave_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

use crate::graph::RoutingGraph;
use crate::ids::PipId;
use crate::tile_key::TileKey;

/// A coverage unit: a PIP name within a tile type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TileTypePip {
    /// Tile type (tile name prefix).
    pub tile_type: Ident,
    /// PIP name within the tile.
    pub pip_name: Ident,
}

impl TileTypePip {
    /// Renders as `TILE_TYPE/PIP_NAME`.
    pub fn render(&self, interner: &Interner) -> String {
        format!(
            "{}/{}",
            interner.resolve(self.tile_type),
            interner.resolve(self.pip_name)
        )
    }
}

/// One physical tile and the fuzzable PIPs it provides, by name.
#[derive(Clone, Debug)]
pub struct TileInstance {
    /// The tile.
    pub tile: TileKey,
    /// PIP name to concrete PIP.
    pub pips: HashMap<Ident, PipId>,
}

/// The fixed set of ttpips for a run, with per-instance lookup tables.
#[derive(Debug, Default)]
pub struct ResourceCatalog {
    ttpips: Vec<TileTypePip>,
    instances: BTreeMap<Ident, Vec<TileInstance>>,
    max_pips: BTreeMap<Ident, usize>,
}

impl ResourceCatalog {
    /// Builds the catalog from every fuzz-target PIP in `graph`.
    ///
    /// Tile instances are kept in first-seen order. If a tile has two PIPs
    /// with the same name, the first one wins.
    pub fn build(graph: &RoutingGraph) -> Self {
        let mut instances: BTreeMap<Ident, Vec<TileInstance>> = BTreeMap::new();
        let mut slot_of: HashMap<TileKey, usize> = HashMap::new();
        let mut ttpips = BTreeSet::new();

        for (id, pip) in graph.pips() {
            if !pip.is_fuzz_target {
                continue;
            }
            let Some(pip_name) = pip.name else {
                continue;
            };
            let tile_type = pip.tile.prefix;
            let tiles = instances.entry(tile_type).or_default();
            let slot = *slot_of.entry(pip.tile).or_insert_with(|| {
                tiles.push(TileInstance {
                    tile: pip.tile,
                    pips: HashMap::new(),
                });
                tiles.len() - 1
            });
            tiles[slot].pips.entry(pip_name).or_insert(id);
            ttpips.insert(TileTypePip {
                tile_type,
                pip_name,
            });
        }

        let max_pips = instances
            .iter()
            .map(|(&ty, tiles)| (ty, tiles.iter().map(|t| t.pips.len()).max().unwrap_or(0)))
            .collect();

        let catalog = Self {
            ttpips: ttpips.into_iter().collect(),
            instances,
            max_pips,
        };
        tracing::debug!(
            ttpips = catalog.ttpips.len(),
            tile_types = catalog.instances.len(),
            "built resource catalog"
        );
        catalog
    }

    /// All ttpips, sorted and deduplicated.
    pub fn ttpips(&self) -> &[TileTypePip] {
        &self.ttpips
    }

    /// Number of ttpips.
    pub fn len(&self) -> usize {
        self.ttpips.len()
    }

    /// Returns `true` if the graph had no fuzz-target PIPs.
    pub fn is_empty(&self) -> bool {
        self.ttpips.is_empty()
    }

    /// Tile instances of a tile type, empty if the type is unknown.
    pub fn instances(&self, tile_type: Ident) -> &[TileInstance] {
        self.instances
            .get(&tile_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Largest number of distinct PIP names in any one tile of this type.
    pub fn max_pips(&self, tile_type: Ident) -> usize {
        self.max_pips.get(&tile_type).copied().unwrap_or(0)
    }

    /// Tile types that have at least one fuzzable PIP, in interning order.
    pub fn tile_types(&self) -> impl Iterator<Item = Ident> + '_ {
        self.instances.keys().copied()
    }

    /// Looks up a ttpip by name without interning.
    pub fn find(&self, interner: &Interner, tile_type: &str, pip_name: &str) -> Option<TileTypePip> {
        let ttpip = TileTypePip {
            tile_type: interner.get(tile_type)?,
            pip_name: interner.get(pip_name)?,
        };
        self.ttpips.binary_search(&ttpip).ok().map(|_| ttpip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_graph;

    const GRAPH: &str = "\
pip INT_X0Y0/A.B 1 INT_X0Y0/A INT_X0Y0/B
pip INT_X0Y0/B.C 1 INT_X0Y0/B INT_X0Y0/C
pip INT_X1Y0/A.B 1 INT_X1Y0/A INT_X1Y0/B
pip INT_X0Y0/A.B 1 INT_X0Y0/A2 INT_X0Y0/B2
pip RCLK_X0Y0/HROUTE 0 RCLK_X0Y0/H0 RCLK_X0Y0/H1
extpip INT_X0Y0 INT_X0Y0/C RCLK_X0Y0/H0
";

    fn build(text: &str) -> (RoutingGraph, ResourceCatalog, Interner) {
        let mut interner = Interner::new();
        let graph = parse_graph(text.as_bytes(), &mut interner).unwrap();
        let catalog = ResourceCatalog::build(&graph);
        (graph, catalog, interner)
    }

    #[test]
    fn ttpips_are_distinct_per_type() {
        let (_, catalog, interner) = build(GRAPH);
        let names: Vec<String> = catalog.ttpips().iter().map(|t| t.render(&interner)).collect();
        assert_eq!(names, vec!["INT/A.B", "INT/B.C", "RCLK/HROUTE"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn instances_in_first_seen_order() {
        let (_, catalog, interner) = build(GRAPH);
        let int = interner.get("INT").unwrap();
        let tiles: Vec<String> = catalog
            .instances(int)
            .iter()
            .map(|t| t.tile.render(&interner))
            .collect();
        assert_eq!(tiles, vec!["INT_X0Y0", "INT_X1Y0"]);
    }

    #[test]
    fn first_pip_wins_on_duplicate_name() {
        let (_, catalog, interner) = build(GRAPH);
        let int = interner.get("INT").unwrap();
        let ab = interner.get("A.B").unwrap();
        assert_eq!(catalog.instances(int)[0].pips[&ab], PipId::from_raw(0));
    }

    #[test]
    fn max_pips_per_type() {
        let (_, catalog, interner) = build(GRAPH);
        assert_eq!(catalog.max_pips(interner.get("INT").unwrap()), 2);
        assert_eq!(catalog.max_pips(interner.get("RCLK").unwrap()), 1);
    }

    #[test]
    fn external_pips_are_not_cataloged() {
        let (graph, catalog, _) = build(GRAPH);
        assert_eq!(graph.pip_count(), 6);
        let total: usize = catalog
            .tile_types()
            .map(|ty| catalog.instances(ty).iter().map(|t| t.pips.len()).sum::<usize>())
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn empty_graph_has_empty_catalog() {
        let (_, catalog, interner) = build("");
        assert!(catalog.is_empty());
        assert!(catalog.instances(Ident::from_raw(0)).is_empty());
        assert!(catalog.find(&interner, "INT", "A.B").is_none());
    }

    #[test]
    fn find_by_name() {
        let (_, catalog, interner) = build(GRAPH);
        let found = catalog.find(&interner, "RCLK", "HROUTE").unwrap();
        assert_eq!(found.render(&interner), "RCLK/HROUTE");
        assert!(catalog.find(&interner, "RCLK", "A.B").is_none());
    }
}
