//! Per-design resource allocation.
//!
//! A [`Design`] records which nodes and PIPs are taken, which cells exist
//! and which nets have been routed. It is created fresh for every design and
//! dropped once the design is emitted. Only coverage outlives it.

use std::collections::{BTreeMap, HashSet};

use pipweave_common::{InternalError, PipweaveResult};
use pipweave_graph::{NodeId, PipId, RoutingGraph, TileKey, TileTypePip};
use rand::Rng;

use crate::binder::{BelPin, Binder};
use crate::ids::NetId;

/// Who holds a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Owner {
    /// Randomly removed from this design.
    Disabled,
    /// Part of a routed net.
    Net(NetId),
}

/// The stored route of a finalized net.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetRoute {
    /// The ttpip the net was routed for.
    pub target: TileTypePip,
    /// Nodes from driver to sink.
    pub nodes: Vec<NodeId>,
    /// PIPs between consecutive nodes; one fewer than `nodes`.
    pub pips: Vec<PipId>,
}

/// A resolved site pin at one end of a net.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundPin {
    /// Site hosting the pin.
    pub site: TileKey,
    /// Primitive pin the site pin maps to.
    pub bel_pin: BelPin,
}

/// What drives a routed net.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetSource {
    /// A site output pin.
    Pin(BoundPin),
    /// A constant-high wire; a `VCC` cell is created for it.
    Constant,
}

/// Everything needed to finalize one net.
#[derive(Clone, Debug)]
pub struct RouteCommit {
    /// The ttpip the net was routed for.
    pub target: TileTypePip,
    /// Nodes from driver to sink.
    pub nodes: Vec<NodeId>,
    /// PIPs between consecutive nodes.
    pub pips: Vec<PipId>,
    /// The driver end.
    pub source: NetSource,
    /// The sink end.
    pub sink: BoundPin,
}

/// Allocation state of one design.
#[derive(Debug)]
pub struct Design {
    node_owner: Vec<Option<Owner>>,
    used_pips: HashSet<PipId>,
    binder: Binder,
    net_routes: BTreeMap<NetId, NetRoute>,
    next_net: u32,
}

impl Design {
    /// Creates an empty design sized for `graph`.
    pub fn new(graph: &RoutingGraph) -> Self {
        Self {
            node_owner: vec![None; graph.node_count()],
            used_pips: HashSet::new(),
            binder: Binder::new(),
            net_routes: BTreeMap::new(),
            next_net: 0,
        }
    }

    /// Marks each node disabled with probability `probability`, drawing once
    /// per node in ID order. Returns the number of disabled nodes.
    pub fn disable_random_nodes(&mut self, rng: &mut impl Rng, probability: f64) -> usize {
        let mut disabled = 0;
        for i in 0..self.node_owner.len() {
            if rng.gen_bool(probability) && self.disable(NodeId::from_raw(i as u32)) {
                disabled += 1;
            }
        }
        disabled
    }

    /// Disables a free node. Returns `false` if it was already owned.
    pub fn disable(&mut self, node: NodeId) -> bool {
        let owner = &mut self.node_owner[node.index()];
        if owner.is_some() {
            return false;
        }
        *owner = Some(Owner::Disabled);
        true
    }

    /// The owner of `node`, if any.
    pub fn owner(&self, node: NodeId) -> Option<Owner> {
        self.node_owner[node.index()]
    }

    /// Whether `node` is disabled or belongs to a net.
    pub fn is_owned(&self, node: NodeId) -> bool {
        self.node_owner[node.index()].is_some()
    }

    /// Whether `pip` is on a routed net.
    pub fn is_pip_used(&self, pip: PipId) -> bool {
        self.used_pips.contains(&pip)
    }

    /// Whether using `pip` would route through a site that already hosts a
    /// committed cell.
    pub fn is_routethru_blocked(&self, graph: &RoutingGraph, pip: PipId) -> bool {
        if self.binder.used_sites().is_empty() {
            return false;
        }
        let p = graph.pip(pip);
        let dst_pins = &graph.node(p.dst).pins;
        graph.node(p.src).pins.iter().any(|a| {
            self.binder.is_site_used(a.site) && dst_pins.iter().any(|b| b.site == a.site)
        })
    }

    /// The ID the next committed net will get.
    pub fn next_net(&self) -> NetId {
        NetId::from_raw(self.next_net)
    }

    /// Whether `net` has a stored route.
    pub fn is_finalized(&self, net: NetId) -> bool {
        self.net_routes.contains_key(&net)
    }

    /// Binder query for `net`.
    pub fn is_pin_available(&self, pin: &BoundPin, net: NetId) -> bool {
        self.binder
            .is_available(pin.site, &pin.bel_pin, net, |n| self.is_finalized(n))
    }

    /// Finalizes a net: binds both ends, takes every node and PIP on the
    /// path, reserves routethru sites and stores the route.
    ///
    /// All checks run before any state changes, so a rejected commit leaves
    /// the design untouched.
    ///
    /// # Errors
    ///
    /// Returns an [`InternalError`] if the path is malformed, a node or PIP
    /// is already taken, or an endpoint pin is unavailable.
    pub fn commit_route(&mut self, graph: &RoutingGraph, commit: RouteCommit) -> PipweaveResult<NetId> {
        let net = self.next_net();
        self.validate(&commit, net)?;

        let routes = &self.net_routes;
        let finalized = |n: NetId| routes.contains_key(&n);
        if let NetSource::Pin(source) = &commit.source {
            self.binder
                .bind(source.site, &source.bel_pin, net, finalized)
                .map_err(|e| InternalError::new(format!("source pin: {e}")))?;
        }
        self.binder
            .bind(commit.sink.site, &commit.sink.bel_pin, net, finalized)
            .map_err(|e| InternalError::new(format!("sink pin: {e}")))?;
        if commit.source == NetSource::Constant {
            self.binder.bind_constant(net);
        }

        for &node in &commit.nodes {
            self.node_owner[node.index()] = Some(Owner::Net(net));
        }
        for &pip in &commit.pips {
            self.used_pips.insert(pip);
            for site in graph.shared_sites(pip) {
                self.binder.mark_routethru(site);
            }
        }
        self.net_routes.insert(
            net,
            NetRoute {
                target: commit.target,
                nodes: commit.nodes,
                pips: commit.pips,
            },
        );
        self.next_net += 1;
        Ok(net)
    }

    fn validate(&self, commit: &RouteCommit, net: NetId) -> PipweaveResult<()> {
        if commit.nodes.is_empty() || commit.pips.len() + 1 != commit.nodes.len() {
            return Err(InternalError::new(format!(
                "net {} has {} nodes and {} pips",
                net.as_raw(),
                commit.nodes.len(),
                commit.pips.len()
            )));
        }
        let mut seen = HashSet::new();
        for &node in &commit.nodes {
            if self.is_owned(node) || !seen.insert(node) {
                return Err(InternalError::new(format!(
                    "node {} claimed twice by net {}",
                    node.as_raw(),
                    net.as_raw()
                )));
            }
        }
        if let Some(&pip) = commit.pips.iter().find(|&&pip| self.is_pip_used(pip)) {
            return Err(InternalError::new(format!(
                "pip {} claimed twice by net {}",
                pip.as_raw(),
                net.as_raw()
            )));
        }
        if let NetSource::Pin(source) = &commit.source {
            if !self.is_pin_available(source, net) {
                return Err(InternalError::new("source pin unavailable at commit"));
            }
        }
        if !self.is_pin_available(&commit.sink, net) {
            return Err(InternalError::new("sink pin unavailable at commit"));
        }
        Ok(())
    }

    /// Finalized nets in ID order.
    pub fn net_routes(&self) -> &BTreeMap<NetId, NetRoute> {
        &self.net_routes
    }

    /// Number of finalized nets.
    pub fn net_count(&self) -> usize {
        self.net_routes.len()
    }

    /// Cells and site bookkeeping.
    pub fn binder(&self) -> &Binder {
        &self.binder
    }
}
