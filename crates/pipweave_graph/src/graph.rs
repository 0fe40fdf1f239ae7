//! The immutable routing-resource graph.
//!
//! Nodes and PIPs are stored in flat arenas and refer to each other by
//! [`NodeId`]/[`PipId`]. A [`GraphBuilder`] is the only way to populate a
//! graph; once built, the [`RoutingGraph`] is read-only.

use std::collections::HashMap;

use pipweave_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, PipId};
use crate::tile_key::TileKey;

/// A physical site pin reachable from a routing node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SitePin {
    /// The site exposing the pin.
    pub site: TileKey,
    /// The pin name within the site.
    pub pin: Ident,
}

/// A wire segment, identified by its tile and wire name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Tile the node is named relative to.
    pub tile: TileKey,
    /// Wire name within the tile.
    pub name: Ident,
    /// PIPs driving this node.
    pub uphill: Vec<PipId>,
    /// PIPs driven by this node.
    pub downhill: Vec<PipId>,
    /// Site pins attached to this node.
    pub pins: Vec<SitePin>,
}

impl Node {
    fn new(tile: TileKey, name: Ident) -> Self {
        Self {
            tile,
            name,
            uphill: Vec::new(),
            downhill: Vec::new(),
            pins: Vec::new(),
        }
    }

    /// Returns whether any site pin is attached to this node.
    pub fn has_pins(&self) -> bool {
        !self.pins.is_empty()
    }
}

/// A programmable interconnect point: a switchable edge between two nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pip {
    /// Tile the PIP belongs to.
    pub tile: TileKey,
    /// PIP name within its tile, `None` for anonymous external edges.
    pub name: Option<Ident>,
    /// Driving node.
    pub src: NodeId,
    /// Driven node.
    pub dst: NodeId,
    /// Whether the PIP may be used in either direction.
    pub bidirectional: bool,
    /// Whether the PIP may be chosen as a routing target.
    pub is_fuzz_target: bool,
}

/// The device routing graph.
#[derive(Debug, Default)]
pub struct RoutingGraph {
    nodes: Vec<Node>,
    pips: Vec<Pip>,
    node_index: HashMap<(TileKey, Ident), NodeId>,
}

impl RoutingGraph {
    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the PIP with the given ID.
    pub fn pip(&self, id: PipId) -> &Pip {
        &self.pips[id.index()]
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of PIPs in the graph.
    pub fn pip_count(&self) -> usize {
        self.pips.len()
    }

    /// Iterates over all nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from_raw(i as u32), n))
    }

    /// Iterates over all PIPs in ID order.
    pub fn pips(&self) -> impl Iterator<Item = (PipId, &Pip)> {
        self.pips
            .iter()
            .enumerate()
            .map(|(i, p)| (PipId::from_raw(i as u32), p))
    }

    /// Looks up a node by tile and wire name.
    pub fn find_node(&self, tile: TileKey, name: Ident) -> Option<NodeId> {
        self.node_index.get(&(tile, name)).copied()
    }

    /// Renders a node as `TILE/WIRE`.
    pub fn node_name(&self, id: NodeId, interner: &Interner) -> String {
        let node = self.node(id);
        format!(
            "{}/{}",
            node.tile.render(interner),
            interner.resolve(node.name)
        )
    }

    /// Sites with a pin on both endpoints of `pip`, sorted and deduplicated.
    ///
    /// Using such a PIP routes through the site.
    pub fn shared_sites(&self, pip: PipId) -> Vec<TileKey> {
        let pip = self.pip(pip);
        let dst_pins = &self.node(pip.dst).pins;
        let mut sites: Vec<TileKey> = self
            .node(pip.src)
            .pins
            .iter()
            .filter(|sp| dst_pins.iter().any(|dp| dp.site == sp.site))
            .map(|sp| sp.site)
            .collect();
        sites.sort();
        sites.dedup();
        sites
    }
}

/// Incrementally assembles a [`RoutingGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: RoutingGraph,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `(tile, name)`, creating it on first mention.
    pub fn node(&mut self, tile: TileKey, name: Ident) -> NodeId {
        let RoutingGraph {
            nodes, node_index, ..
        } = &mut self.graph;
        *node_index.entry((tile, name)).or_insert_with(|| {
            let id = NodeId::from_raw(nodes.len() as u32);
            nodes.push(Node::new(tile, name));
            id
        })
    }

    /// Adds a PIP from `src` to `dst` and links it into both nodes.
    pub fn add_pip(
        &mut self,
        tile: TileKey,
        name: Option<Ident>,
        src: NodeId,
        dst: NodeId,
        bidirectional: bool,
    ) -> PipId {
        let id = PipId::from_raw(self.graph.pips.len() as u32);
        self.graph.pips.push(Pip {
            tile,
            name,
            src,
            dst,
            bidirectional,
            is_fuzz_target: name.is_some(),
        });
        self.graph.nodes[src.index()].downhill.push(id);
        self.graph.nodes[dst.index()].uphill.push(id);
        id
    }

    /// Attaches a site pin to a node.
    pub fn add_site_pin(&mut self, node: NodeId, site: TileKey, pin: Ident) {
        self.graph.nodes[node.index()]
            .pins
            .push(SitePin { site, pin });
    }

    /// Finishes construction.
    pub fn build(self) -> RoutingGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(interner: &mut Interner, name: &str) -> TileKey {
        TileKey::parse(interner, name)
    }

    #[test]
    fn node_is_created_once() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "INT_X0Y0");
        let wire = interner.get_or_intern("EE2_E_BEG0");
        let mut builder = GraphBuilder::new();
        let a = builder.node(tile, wire);
        let b = builder.node(tile, wire);
        assert_eq!(a, b);
        let graph = builder.build();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.find_node(tile, wire), Some(a));
    }

    #[test]
    fn pip_links_both_nodes() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "INT_X0Y0");
        let w0 = interner.get_or_intern("W0");
        let w1 = interner.get_or_intern("W1");
        let pname = interner.get_or_intern("W0->W1");
        let mut builder = GraphBuilder::new();
        let a = builder.node(tile, w0);
        let b = builder.node(tile, w1);
        let p = builder.add_pip(tile, Some(pname), a, b, false);
        let graph = builder.build();

        assert_eq!(graph.node(a).downhill, vec![p]);
        assert_eq!(graph.node(b).uphill, vec![p]);
        assert!(graph.node(a).uphill.is_empty());
        assert!(graph.pip(p).is_fuzz_target);
        assert_eq!(graph.pip_count(), 1);
    }

    #[test]
    fn anonymous_pip_is_not_a_target() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "INT_X0Y0");
        let w0 = interner.get_or_intern("W0");
        let w1 = interner.get_or_intern("W1");
        let mut builder = GraphBuilder::new();
        let a = builder.node(tile, w0);
        let b = builder.node(tile, w1);
        let p = builder.add_pip(tile, None, a, b, false);
        let graph = builder.build();
        assert!(!graph.pip(p).is_fuzz_target);
    }

    #[test]
    fn node_name_renders_tile_and_wire() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "CLEL_R_X12Y34");
        let wire = interner.get_or_intern("CLE_CLE_L_SITE_0_A_O");
        let mut builder = GraphBuilder::new();
        let n = builder.node(tile, wire);
        let graph = builder.build();
        assert_eq!(
            graph.node_name(n, &interner),
            "CLEL_R_X12Y34/CLE_CLE_L_SITE_0_A_O"
        );
    }

    #[test]
    fn shared_sites_requires_both_endpoints() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "CLEL_R_X0Y0");
        let slice0 = key(&mut interner, "SLICE_X0Y0");
        let slice1 = key(&mut interner, "SLICE_X1Y0");
        let a1 = interner.get_or_intern("A1");
        let a_o = interner.get_or_intern("A_O");
        let w0 = interner.get_or_intern("W0");
        let w1 = interner.get_or_intern("W1");
        let mut builder = GraphBuilder::new();
        let a = builder.node(tile, w0);
        let b = builder.node(tile, w1);
        builder.add_site_pin(a, slice0, a1);
        builder.add_site_pin(a, slice1, a1);
        builder.add_site_pin(b, slice0, a_o);
        let p = builder.add_pip(tile, None, a, b, false);
        let graph = builder.build();

        assert_eq!(graph.shared_sites(p), vec![slice0]);
        assert!(graph.node(a).has_pins());
    }

    #[test]
    fn iterators_follow_id_order() {
        let mut interner = Interner::new();
        let tile = key(&mut interner, "INT_X0Y0");
        let mut builder = GraphBuilder::new();
        for i in 0..4 {
            let w = interner.get_or_intern(&format!("W{i}"));
            builder.node(tile, w);
        }
        let graph = builder.build();
        let ids: Vec<u32> = graph.nodes().map(|(id, _)| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
