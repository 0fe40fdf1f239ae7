//! Bidirectional breadth-first router.
//!
//! To route a ttpip, the router picks a random tile instance offering the
//! PIP, searches downhill from the PIP's driven node for a free site input
//! (the sink), then searches uphill from the driving node for a free site
//! output or a constant-high wire (the source). The two searches are
//! node-disjoint. When both succeed the whole path is committed to the
//! [`Design`] at once; a failed attempt leaves no trace.
//!
//! Every random draw comes from the caller's RNG in a fixed order:
//!
//! 1. tile instance
//! 2. direction swap (bidirectional PIPs only)
//! 3. per dequeued node: constant check (only when the sink allows a
//!    tie-off, backward search only), then endpoint check (only for nodes
//!    with site pins)

use std::collections::{HashMap, HashSet, VecDeque};

use pipweave_common::{Interner, InternalError, PipweaveResult};
use pipweave_config::RouterConfig;
use pipweave_graph::{Node, NodeId, PipId, ResourceCatalog, RoutingGraph, TileTypePip};
use rand::Rng;

use crate::binder::{classify_site_pin, is_constant_source, PinDir};
use crate::coverage::CoverageState;
use crate::design::{BoundPin, Design, NetSource, RouteCommit};
use crate::ids::NetId;

/// Which way a search walks PIPs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
    /// From a node to the nodes it drives; looks for sinks.
    Downhill,
    /// From a node to the nodes driving it; looks for sources.
    Uphill,
}

impl Direction {
    fn pin_dir(self) -> PinDir {
        match self {
            Direction::Downhill => PinDir::Input,
            Direction::Uphill => PinDir::Output,
        }
    }
}

enum Endpoint {
    Pin(BoundPin),
    Constant,
}

/// Result of one search: where it stopped and how it got there.
struct SearchHit {
    end: NodeId,
    endpoint: Endpoint,
    /// PIP used to first reach each visited node.
    prev: HashMap<NodeId, PipId>,
}

/// Routes single ttpips into a design.
pub struct Router<'a> {
    graph: &'a RoutingGraph,
    catalog: &'a ResourceCatalog,
    interner: &'a Interner,
    config: &'a RouterConfig,
}

impl<'a> Router<'a> {
    /// Creates a router over a graph and its catalog.
    pub fn new(
        graph: &'a RoutingGraph,
        catalog: &'a ResourceCatalog,
        interner: &'a Interner,
        config: &'a RouterConfig,
    ) -> Self {
        Self {
            graph,
            catalog,
            interner,
            config,
        }
    }

    /// Tries up to `retry_budget` times to route a net through `ttpip`.
    ///
    /// On success the net is committed to `design`, the ttpip's coverage is
    /// incremented and the new net's ID is returned. Running out of attempts
    /// is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only returns an error if committing a found path breaks a design
    /// invariant.
    pub fn route(
        &self,
        design: &mut Design,
        coverage: &mut CoverageState,
        ttpip: TileTypePip,
        retry_budget: u32,
        rng: &mut impl Rng,
    ) -> PipweaveResult<Option<NetId>> {
        let instances = self.catalog.instances(ttpip.tile_type);
        if instances.is_empty() {
            return Ok(None);
        }
        for attempt in 0..retry_budget {
            let instance = &instances[rng.gen_range(0..instances.len())];
            let Some(&pip) = instance.pips.get(&ttpip.pip_name) else {
                continue;
            };
            if let Some(net) = self.attempt(design, ttpip, pip, rng)? {
                coverage.record_success(ttpip);
                tracing::trace!(
                    ttpip = %ttpip.render(self.interner),
                    attempt,
                    net = net.as_raw(),
                    "routed"
                );
                return Ok(Some(net));
            }
        }
        tracing::trace!(ttpip = %ttpip.render(self.interner), retry_budget, "gave up");
        Ok(None)
    }

    fn attempt(
        &self,
        design: &mut Design,
        target: TileTypePip,
        pip: PipId,
        rng: &mut impl Rng,
    ) -> PipweaveResult<Option<NetId>> {
        let data = self.graph.pip(pip);
        let (mut src, mut dst) = (data.src, data.dst);
        if src == dst
            || design.is_owned(src)
            || design.is_owned(dst)
            || design.is_routethru_blocked(self.graph, pip)
        {
            return Ok(None);
        }
        if data.bidirectional && rng.gen_bool(0.5) {
            std::mem::swap(&mut src, &mut dst);
        }
        let net = design.next_net();

        let no_src = HashSet::from([src]);
        let Some(forward) = self.search(design, dst, Direction::Downhill, &no_src, net, false, rng)
        else {
            return Ok(None);
        };
        let (mut fwd_nodes, mut fwd_pips) = self.trace_back(&forward, dst, Direction::Downhill)?;
        fwd_nodes.reverse();
        fwd_pips.reverse();
        let Endpoint::Pin(sink) = forward.endpoint else {
            return Ok(None);
        };

        let on_forward: HashSet<NodeId> = fwd_nodes.iter().copied().collect();
        let Some(backward) = self.search(
            design,
            src,
            Direction::Uphill,
            &on_forward,
            net,
            sink.bel_pin.tie_high,
            rng,
        ) else {
            return Ok(None);
        };
        let (mut nodes, mut pips) = self.trace_back(&backward, src, Direction::Uphill)?;
        nodes.extend(fwd_nodes);
        pips.push(pip);
        pips.extend(fwd_pips);

        let source = match backward.endpoint {
            Endpoint::Pin(pin) => NetSource::Pin(pin),
            Endpoint::Constant => NetSource::Constant,
        };
        let commit = RouteCommit {
            target,
            nodes,
            pips,
            source,
            sink,
        };
        design.commit_route(self.graph, commit).map(Some)
    }

    /// Breadth-first search from `start`, skipping owned nodes, nodes in
    /// `exclude` and routethru-blocked PIPs.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        design: &Design,
        start: NodeId,
        direction: Direction,
        exclude: &HashSet<NodeId>,
        net: NetId,
        accept_constant: bool,
        rng: &mut impl Rng,
    ) -> Option<SearchHit> {
        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::from([start]);
        let mut prev = HashMap::new();
        let mut iterations = 0usize;

        while let Some(node) = queue.pop_front() {
            iterations += 1;
            if iterations > self.config.max_iterations {
                tracing::trace!(?direction, iterations, "search hit iteration cap");
                return None;
            }
            let data = self.graph.node(node);

            if accept_constant
                && rng.gen_bool(self.config.constant_accept_probability)
                && is_constant_source(self.interner.resolve(data.name))
            {
                return Some(SearchHit {
                    end: node,
                    endpoint: Endpoint::Constant,
                    prev,
                });
            }
            if data.has_pins() && rng.gen_bool(self.config.endpoint_accept_probability) {
                if let Some(pin) = self.open_pin(design, data, direction.pin_dir(), net) {
                    return Some(SearchHit {
                        end: node,
                        endpoint: Endpoint::Pin(pin),
                        prev,
                    });
                }
            }

            let edges = match direction {
                Direction::Downhill => &data.downhill,
                Direction::Uphill => &data.uphill,
            };
            for &pip in edges {
                let p = self.graph.pip(pip);
                let next = match direction {
                    Direction::Downhill => p.dst,
                    Direction::Uphill => p.src,
                };
                if visited.contains(&next)
                    || exclude.contains(&next)
                    || design.is_owned(next)
                    || design.is_routethru_blocked(self.graph, pip)
                {
                    continue;
                }
                visited.insert(next);
                prev.insert(next, pip);
                queue.push_back(next);
            }
        }
        None
    }

    /// First site pin on `node` that maps to a primitive pin `net` may use.
    fn open_pin(&self, design: &Design, node: &Node, dir: PinDir, net: NetId) -> Option<BoundPin> {
        node.pins.iter().find_map(|pin| {
            let bound = BoundPin {
                site: pin.site,
                bel_pin: classify_site_pin(pin, dir, self.interner)?,
            };
            design.is_pin_available(&bound, net).then_some(bound)
        })
    }

    /// Walks predecessor links from the hit back to `start`. Returns nodes
    /// `[end, .., start]` and the PIPs between them in the same order.
    fn trace_back(
        &self,
        hit: &SearchHit,
        start: NodeId,
        direction: Direction,
    ) -> PipweaveResult<(Vec<NodeId>, Vec<PipId>)> {
        let mut nodes = vec![hit.end];
        let mut pips = Vec::new();
        let mut cur = hit.end;
        while cur != start {
            let pip = *hit.prev.get(&cur).ok_or_else(|| {
                InternalError::new(format!("node {} has no predecessor", cur.as_raw()))
            })?;
            let p = self.graph.pip(pip);
            cur = match direction {
                Direction::Downhill => p.src,
                Direction::Uphill => p.dst,
            };
            pips.push(pip);
            nodes.push(cur);
        }
        Ok((nodes, pips))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Owner;
    use pipweave_graph::parse_graph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        graph: RoutingGraph,
        catalog: ResourceCatalog,
        interner: Interner,
        config: RouterConfig,
    }

    fn fixture(text: &str) -> Fixture {
        let mut interner = Interner::new();
        let graph = parse_graph(text.as_bytes(), &mut interner).unwrap();
        let catalog = ResourceCatalog::build(&graph);
        Fixture {
            graph,
            catalog,
            interner,
            config: RouterConfig {
                endpoint_accept_probability: 1.0,
                constant_accept_probability: 1.0,
                ..RouterConfig::default()
            },
        }
    }

    impl Fixture {
        fn router(&self) -> Router<'_> {
            Router::new(&self.graph, &self.catalog, &self.interner, &self.config)
        }

        fn ttpip(&self, tile_type: &str, pip: &str) -> TileTypePip {
            self.catalog.find(&self.interner, tile_type, pip).unwrap()
        }

        fn names(&self, nodes: &[NodeId]) -> Vec<String> {
            nodes
                .iter()
                .map(|&n| self.graph.node_name(n, &self.interner))
                .collect()
        }
    }

    /// Driver LUT -> two hops -> target -> two hops -> sink LUT input.
    const CHAIN: &str = "\
pip INT_X0Y0/S.A 1 INT_X0Y0/S INT_X0Y0/A
pip INT_X0Y0/A.B 1 INT_X0Y0/A INT_X0Y0/B
pip INT_X0Y0/B.C 1 INT_X0Y0/B INT_X0Y0/C
pip INT_X0Y0/C.D 1 INT_X0Y0/C INT_X0Y0/D
pin SLICE_X0Y0/A_O INT_X0Y0/S
pin SLICE_X1Y0/B2 INT_X0Y0/D
";

    #[test]
    fn routes_through_chain() {
        let f = fixture(CHAIN);
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let ttpip = f.ttpip("INT", "A.B");

        let net = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 1, &mut rng)
            .unwrap()
            .unwrap();

        let route = &design.net_routes()[&net];
        assert_eq!(
            f.names(&route.nodes),
            vec!["INT_X0Y0/S", "INT_X0Y0/A", "INT_X0Y0/B", "INT_X0Y0/C", "INT_X0Y0/D"]
        );
        assert_eq!(route.pips.len(), 4);
        assert_eq!(route.pips[1], PipId::from_raw(1));
        assert_eq!(coverage.count(ttpip), 1);
        assert_eq!(design.binder().cell_count(), 2);
    }

    #[test]
    fn second_route_fails_when_nodes_are_taken() {
        let f = fixture(CHAIN);
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let ttpip = f.ttpip("INT", "A.B");
        let router = f.router();
        assert!(router
            .route(&mut design, &mut coverage, ttpip, 1, &mut rng)
            .unwrap()
            .is_some());
        assert!(router
            .route(&mut design, &mut coverage, ttpip, 5, &mut rng)
            .unwrap()
            .is_none());
        assert_eq!(coverage.count(ttpip), 1);
        assert_eq!(design.net_count(), 1);
    }

    #[test]
    fn no_sink_leaves_no_residue() {
        let f = fixture(
            "\
pip INT_X0Y0/A.B 1 INT_X0Y0/A INT_X0Y0/B
pin SLICE_X0Y0/A_O INT_X0Y0/A
pin RAMB36_X0Y0/ADDR0 INT_X0Y0/B
",
        );
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(3);
        let ttpip = f.ttpip("INT", "A.B");
        let routed = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 20, &mut rng)
            .unwrap();
        assert!(routed.is_none());
        assert_eq!(design.binder().cell_count(), 0);
        assert!(f.graph.nodes().all(|(id, _)| design.owner(id).is_none()));
        assert_eq!(coverage.count(ttpip), 0);
    }

    #[test]
    fn disabled_nodes_are_avoided() {
        let f = fixture(
            "\
pip INT_X0Y0/A.B 1 INT_X0Y0/A INT_X0Y0/B
pip INT_X0Y0/B.C 1 INT_X0Y0/B INT_X0Y0/C
pip INT_X0Y0/B.D 1 INT_X0Y0/B INT_X0Y0/D
pip INT_X0Y0/D.E 1 INT_X0Y0/D INT_X0Y0/E
pin SLICE_X0Y0/A_O INT_X0Y0/A
pin SLICE_X1Y0/A1 INT_X0Y0/C
pin SLICE_X2Y0/A1 INT_X0Y0/E
",
        );
        let ttpip = f.ttpip("INT", "A.B");
        let tile = f.graph.node(NodeId::from_raw(0)).tile;
        let c = f.graph.find_node(tile, f.interner.get("C").unwrap()).unwrap();

        // The nearest sink is C.
        let mut open = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(8);
        let net = f
            .router()
            .route(&mut open, &mut coverage, ttpip, 1, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            f.names(&open.net_routes()[&net].nodes),
            vec!["INT_X0Y0/A", "INT_X0Y0/B", "INT_X0Y0/C"]
        );

        let mut design = Design::new(&f.graph);
        assert!(design.disable(c));
        assert_eq!(design.owner(c), Some(Owner::Disabled));
        let net = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 1, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            f.names(&design.net_routes()[&net].nodes),
            vec!["INT_X0Y0/A", "INT_X0Y0/B", "INT_X0Y0/D", "INT_X0Y0/E"]
        );
    }

    #[test]
    fn constant_source_ties_clock_enable() {
        let f = fixture(
            "\
pip RCLK_X0Y0/CE 1 RCLK_X0Y0/VCC_WIRE RCLK_X0Y0/CE_IN
pin BUFCE_ROW_X0Y0/CE_INT RCLK_X0Y0/CE_IN
",
        );
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(0);
        let ttpip = f.ttpip("RCLK", "CE");
        let net = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 1, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            f.names(&design.net_routes()[&net].nodes),
            vec!["RCLK_X0Y0/VCC_WIRE", "RCLK_X0Y0/CE_IN"]
        );
        let types: Vec<&str> = design.binder().cells().map(|(_, c)| c.cell_type).collect();
        assert_eq!(types, vec!["BUFCE_ROW", "VCC"]);
    }

    #[test]
    fn constant_wire_needs_tie_high_sink() {
        let f = fixture(
            "\
pip RCLK_X0Y0/CLK 1 RCLK_X0Y0/VCC_WIRE RCLK_X0Y0/CLK_IN
pin BUFCE_ROW_X0Y0/CLK_IN RCLK_X0Y0/CLK_IN
",
        );
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(0);
        let ttpip = f.ttpip("RCLK", "CLK");
        let routed = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 10, &mut rng)
            .unwrap();
        assert!(routed.is_none());
    }

    #[test]
    fn iteration_cap_fails_search() {
        let mut f = fixture(CHAIN);
        f.config.max_iterations = 1;
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let ttpip = f.ttpip("INT", "A.B");
        let routed = f
            .router()
            .route(&mut design, &mut coverage, ttpip, 3, &mut rng)
            .unwrap();
        assert!(routed.is_none());
    }

    /// Target `X` runs from a slice output straight into an input of the same
    /// slice. `P` is driven by another output of that slice.
    const SHARED_SITE: &str = "\
pip INT_X0Y0/X 1 INT_X0Y0/IN INT_X0Y0/OUT
pip INT_X0Y0/P 1 INT_X0Y0/DRV INT_X0Y0/SNK
pin SLICE_X0Y0/A_O INT_X0Y0/IN
pin SLICE_X0Y0/A1 INT_X0Y0/OUT
pin SLICE_X0Y0/B_O INT_X0Y0/DRV
pin SLICE_X1Y0/B1 INT_X0Y0/SNK
";

    #[test]
    fn occupied_site_blocks_routethru_target() {
        let f = fixture(SHARED_SITE);
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(4);
        let router = f.router();

        let p = f.ttpip("INT", "P");
        let x = f.ttpip("INT", "X");
        assert!(router
            .route(&mut design, &mut coverage, p, 1, &mut rng)
            .unwrap()
            .is_some());
        assert!(router
            .route(&mut design, &mut coverage, x, 5, &mut rng)
            .unwrap()
            .is_none());
        assert!(design.binder().routethru_sites().is_empty());
        assert_eq!(coverage.count(x), 0);
    }

    #[test]
    fn routethru_reserves_site_against_later_pins() {
        let f = fixture(SHARED_SITE);
        let mut design = Design::new(&f.graph);
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(4);
        let router = f.router();

        let p = f.ttpip("INT", "P");
        let x = f.ttpip("INT", "X");
        assert!(router
            .route(&mut design, &mut coverage, x, 1, &mut rng)
            .unwrap()
            .is_some());
        let reserved: Vec<String> = design
            .binder()
            .routethru_sites()
            .iter()
            .map(|site| site.render(&f.interner))
            .collect();
        assert_eq!(reserved, vec!["SLICE_X0Y0"]);

        assert!(router
            .route(&mut design, &mut coverage, p, 5, &mut rng)
            .unwrap()
            .is_none());
        assert_eq!(coverage.count(p), 0);
        assert_eq!(design.binder().cell_count(), 1);
    }

    #[test]
    fn search_skips_pips_through_occupied_sites() {
        let f = fixture(
            "\
pip INT_X0Y0/T 1 INT_X0Y0/S INT_X0Y0/B
pip INT_X0Y0/R 1 INT_X0Y0/B INT_X0Y0/C
pip INT_X0Y0/B.D 1 INT_X0Y0/B INT_X0Y0/D
pip INT_X0Y0/D.E 1 INT_X0Y0/D INT_X0Y0/E
pip INT_X0Y0/Q 1 INT_X0Y0/U INT_X0Y0/V
pin SLICE_X1Y0/A_O INT_X0Y0/S
pin SLICE_X0Y0/C_O INT_X0Y0/B
pin SLICE_X0Y0/C1 INT_X0Y0/C
pin SLICE_X2Y0/A1 INT_X0Y0/E
pin SLICE_X0Y0/D_O INT_X0Y0/U
pin SLICE_X3Y0/A1 INT_X0Y0/V
",
        );
        let t = f.ttpip("INT", "T");
        let q = f.ttpip("INT", "Q");
        let mut coverage = CoverageState::new(&f.catalog);
        let mut rng = StdRng::seed_from_u64(2);

        // With SLICE_X0Y0 free, the nearest sink is behind R.
        let mut open = Design::new(&f.graph);
        let net = f
            .router()
            .route(&mut open, &mut coverage, t, 1, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            f.names(&open.net_routes()[&net].nodes),
            vec!["INT_X0Y0/S", "INT_X0Y0/B", "INT_X0Y0/C"]
        );

        // A cell in SLICE_X0Y0 turns R into a blocked routethru.
        let mut design = Design::new(&f.graph);
        assert!(f
            .router()
            .route(&mut design, &mut coverage, q, 1, &mut rng)
            .unwrap()
            .is_some());
        let net = f
            .router()
            .route(&mut design, &mut coverage, t, 1, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            f.names(&design.net_routes()[&net].nodes),
            vec!["INT_X0Y0/S", "INT_X0Y0/B", "INT_X0Y0/D", "INT_X0Y0/E"]
        );
    }

    #[test]
    fn bidirectional_pip_is_walked_either_way() {
        let f = fixture(
            "\
pip INT_X0Y0/BI 0 INT_X0Y0/A INT_X0Y0/B
pin SLICE_X0Y0/A_O INT_X0Y0/A
pin SLICE_X0Y0/B1 INT_X0Y0/A
pin SLICE_X1Y0/A_O INT_X0Y0/B
pin SLICE_X1Y0/B1 INT_X0Y0/B
",
        );
        let ttpip = f.ttpip("INT", "BI");
        let mut starts = HashSet::new();
        for seed in 0..32 {
            let mut design = Design::new(&f.graph);
            let mut coverage = CoverageState::new(&f.catalog);
            let mut rng = StdRng::seed_from_u64(seed);
            let net = f
                .router()
                .route(&mut design, &mut coverage, ttpip, 1, &mut rng)
                .unwrap()
                .unwrap();
            starts.insert(design.net_routes()[&net].nodes[0]);
        }
        assert_eq!(starts.len(), 2);
    }
}
