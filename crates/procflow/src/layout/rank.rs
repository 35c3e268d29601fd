//! Rank layout adapter around `rust-sugiyama`.
//!
//! The ranker only assigns nodes to ranks and orders them inside each rank.
//! Final coordinates are computed here from per-node footprints and the
//! configured separations, so the output does not depend on the ranker's
//! coordinate conventions.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use petgraph::{algo, graph::DiGraph, visit::EdgeRef};
use rust_sugiyama::configure::Config;

use procflow_core::{
    document::{Edge, Node},
    geometry::{Point, Size},
    identifier::Id,
};

use super::Direction;
use crate::{config::LayoutConfig, error::FlowError};

/// Spacing handed to the ranker; only the relative order of its coordinates is used.
const VERTEX_SPACING: f64 = 3.0;

/// Nodes of one connected component grouped by rank, each rank in cross-axis order.
type Ranks = Vec<Vec<Id>>;

/// Ranking hints for a single edge.
///
/// Self-loops are kept out of ranking, so their `min_length` of 2 is
/// recorded for completeness but never reaches the ranker or the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeHints {
    pub weight: usize,
    pub min_length: usize,
}

impl EdgeHints {
    /// Exception edges pull hardest, self-loops ask for extra rank room.
    pub(crate) fn for_edge(edge: &Edge) -> Self {
        let weight = if edge.semantics().is_exception() {
            4
        } else if edge.is_self_loop() {
            3
        } else {
            1
        };
        let min_length = if edge.is_self_loop() { 2 } else { 1 };

        Self { weight, min_length }
    }
}

/// Locally owned ranking graph for a single layout pass.
///
/// Edges are stored already oriented so the graph is acyclic; see
/// [`orient_edges`].
pub(crate) struct RankGraph<'a> {
    nodes: IndexMap<Id, &'a Node>,
    edges: Vec<(Id, Id, EdgeHints)>,
}

impl<'a> RankGraph<'a> {
    /// Builds the ranking graph, dropping entries the ranker cannot use.
    pub(crate) fn new(nodes: &'a [Node], edges: &[Edge]) -> Self {
        let mut kept = IndexMap::new();
        for node in nodes {
            if node.id().is_empty() {
                debug!(label = node.label(); "Skipping node without id");
                continue;
            }
            kept.entry(node.id()).or_insert(node);
        }

        let mut ranked = Vec::new();
        for edge in edges {
            let known = kept.contains_key(&edge.source_id()) && kept.contains_key(&edge.target_id());
            if edge.id().is_empty() || !known {
                debug!(
                    edge_id = edge.id().to_string(),
                    source = edge.source_id().to_string(),
                    target = edge.target_id().to_string();
                    "Skipping unusable edge"
                );
                continue;
            }

            let hints = EdgeHints::for_edge(edge);
            if edge.is_self_loop() {
                trace!(edge_id = edge.id().to_string(), min_length = hints.min_length; "Self-loop kept out of ranking");
                continue;
            }
            ranked.push((edge.source_id(), edge.target_id(), hints));
        }

        let edges = orient_edges(kept.keys().copied(), ranked);
        Self { nodes: kept, edges }
    }

    /// Computes the top-left position of every kept node, in document order.
    pub(crate) fn positions(&self, direction: Direction, config: &LayoutConfig) -> IndexMap<Id, Point> {
        if self.nodes.is_empty() {
            return IndexMap::new();
        }

        let ranked_ids = self.ranked_ids();
        let mut components = if ranked_ids.is_empty() {
            Vec::new()
        } else {
            match self.sugiyama_ranks(&ranked_ids) {
                Ok(components) => components,
                Err(err) => {
                    warn!(error = err.to_string(); "Falling back to longest-path layering");
                    vec![self.longest_path_ranks(&ranked_ids)]
                }
            }
        };

        let ranked: HashSet<Id> = components.iter().flatten().flatten().copied().collect();
        let isolated: Vec<Id> = self
            .nodes
            .keys()
            .filter(|id| !ranked.contains(id))
            .copied()
            .collect();
        if !isolated.is_empty() {
            components.push(vec![isolated]);
        }

        debug!(
            nodes_count = self.nodes.len(),
            edges_count = self.edges.len(),
            components_count = components.len(),
            direction = direction.to_string();
            "Ranking complete"
        );

        let mut positions = self.place(&components, direction, config);
        self.nodes
            .keys()
            .filter_map(|id| positions.remove(id).map(|position| (*id, position)))
            .collect()
    }

    /// Ids of nodes touched by at least one ranked edge, in document order.
    fn ranked_ids(&self) -> Vec<Id> {
        let touched: HashSet<Id> = self
            .edges
            .iter()
            .flat_map(|&(source, target, _)| [source, target])
            .collect();
        self.nodes
            .keys()
            .filter(|id| touched.contains(id))
            .copied()
            .collect()
    }

    /// Runs the ranker and normalizes each of its component layouts into ranks.
    ///
    /// Edge weights are expressed as parallel edges, the only weighting the
    /// ranker understands. The edges are acyclic at this point, so the extra
    /// copies never influence which way a cycle is broken.
    fn sugiyama_ranks(&self, ranked_ids: &[Id]) -> Result<Vec<Ranks>, FlowError> {
        let indices: HashMap<Id, u32> = ranked_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx as u32))
            .collect();

        let mut edges = Vec::new();
        for (source, target, hints) in &self.edges {
            let (Some(&source), Some(&target)) = (indices.get(source), indices.get(target)) else {
                continue;
            };
            edges.extend(std::iter::repeat_n((source, target), hints.weight));
        }

        debug!(
            nodes_count = ranked_ids.len(),
            edges_count = edges.len();
            "Applying Sugiyama algorithm"
        );

        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: VERTEX_SPACING,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        })
        .map_err(|err| {
            let message = err
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| err.downcast_ref::<&str>().map(|msg| msg.to_string()))
                .unwrap_or_else(|| "unknown error".to_string());
            FlowError::Layout(format!("ranker panicked: {message}"))
        })?;

        if layouts.is_empty() {
            return Err(FlowError::Layout("ranker returned no layouts".to_string()));
        }

        let components: Vec<Ranks> = layouts
            .iter()
            .map(|(coords, _, _)| {
                let coords: Vec<(Id, f64, f64)> = coords
                    .iter()
                    .filter_map(|&(idx, (x, y))| ranked_ids.get(idx).map(|id| (*id, x, y)))
                    .collect();
                self.normalize(&coords)
            })
            .filter(|ranks| !ranks.is_empty())
            .collect();

        if components.is_empty() {
            return Err(FlowError::Layout(
                "ranker positions did not map back to any node".to_string(),
            ));
        }
        Ok(components)
    }

    /// Turns raw ranker coordinates of one component into ranks.
    ///
    /// Distinct `y` values become ranks. Rank order is flipped if most edges
    /// would otherwise point backwards; nodes inside a rank are ordered by `x`.
    fn normalize(&self, coords: &[(Id, f64, f64)]) -> Ranks {
        let mut levels: Vec<i64> = coords.iter().map(|&(_, _, y)| level_key(y)).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut rank_of: HashMap<Id, usize> = coords
            .iter()
            .filter_map(|&(id, _, y)| {
                levels
                    .binary_search(&level_key(y))
                    .ok()
                    .map(|rank| (id, rank))
            })
            .collect();

        let (forward, backward) = self.edges.iter().fold((0, 0), |(fwd, bwd), (s, t, _)| {
            match (rank_of.get(s), rank_of.get(t)) {
                (Some(rs), Some(rt)) if rs < rt => (fwd + 1, bwd),
                (Some(rs), Some(rt)) if rs > rt => (fwd, bwd + 1),
                _ => (fwd, bwd),
            }
        });
        if backward > forward {
            let last = levels.len().saturating_sub(1);
            for rank in rank_of.values_mut() {
                *rank = last - *rank;
            }
        }

        let order: HashMap<Id, usize> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut grouped: Vec<Vec<(f64, usize, Id)>> = vec![Vec::new(); levels.len()];
        for &(id, x, _) in coords {
            if let Some(&rank) = rank_of.get(&id) {
                grouped[rank].push((x, order.get(&id).copied().unwrap_or(usize::MAX), id));
            }
        }

        grouped
            .into_iter()
            .filter(|rank| !rank.is_empty())
            .map(|mut rank| {
                rank.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                rank.into_iter().map(|(_, _, id)| id).collect()
            })
            .collect()
    }

    /// Longest-path layering over the oriented edges.
    ///
    /// Used when the ranker fails; always succeeds and keeps document order
    /// inside each rank.
    pub(crate) fn longest_path_ranks(&self, ranked_ids: &[Id]) -> Ranks {
        let mut graph = DiGraph::<Id, usize>::new();
        let indices: HashMap<Id, _> = ranked_ids
            .iter()
            .map(|id| (*id, graph.add_node(*id)))
            .collect();
        for (source, target, hints) in &self.edges {
            if let (Some(&source), Some(&target)) = (indices.get(source), indices.get(target)) {
                graph.add_edge(source, target, hints.min_length);
            }
        }

        let sorted =
            algo::toposort(&graph, None).unwrap_or_else(|_| graph.node_indices().collect());

        let mut rank = vec![0usize; graph.node_count()];
        for node in sorted {
            for edge in graph.edges(node) {
                let candidate = rank[node.index()] + *edge.weight();
                let target = edge.target().index();
                rank[target] = rank[target].max(candidate);
            }
        }

        let depth = rank.iter().copied().max().unwrap_or(0);
        let mut ranks: Ranks = vec![Vec::new(); depth + 1];
        for (idx, id) in ranked_ids.iter().enumerate() {
            ranks[rank[idx]].push(*id);
        }
        ranks.retain(|rank| !rank.is_empty());
        ranks
    }

    /// Assigns coordinates to ranked components.
    ///
    /// Ranks share their main-axis band across components; components sit
    /// side by side along the cross axis, each rank centered within its
    /// component.
    fn place(&self, components: &[Ranks], direction: Direction, config: &LayoutConfig) -> HashMap<Id, Point> {
        let has_decision = self.nodes.values().any(|node| node.kind().is_decision());
        let mut rank_separation = config.rank_separation(has_decision);
        if direction.is_top_down() {
            rank_separation *= config.top_down_rank_factor();
        }
        let node_separation = config.node_separation();
        let margin = config.margin();

        let footprint =
            |id: &Id| -> Size { self.nodes.get(id).map(|node| node.size()).unwrap_or_default() };
        let (main, cross) = match direction {
            Direction::TopDown => (Size::height as fn(Size) -> f32, Size::width as fn(Size) -> f32),
            Direction::LeftRight => (Size::width as fn(Size) -> f32, Size::height as fn(Size) -> f32),
        };

        let depth = components.iter().map(Vec::len).max().unwrap_or(0);
        let mut extents = vec![0.0f32; depth];
        for ranks in components {
            for (rank, ids) in ranks.iter().enumerate() {
                for id in ids {
                    extents[rank] = extents[rank].max(main(footprint(id)));
                }
            }
        }
        let mut band_starts = Vec::with_capacity(depth);
        let mut cursor = margin;
        for extent in &extents {
            band_starts.push(cursor);
            cursor += extent + rank_separation;
        }

        let mut positions = HashMap::new();
        let mut cross_cursor = margin;
        for ranks in components {
            let rank_widths: Vec<f32> = ranks
                .iter()
                .map(|ids| {
                    let sizes: f32 = ids.iter().map(|id| cross(footprint(id))).sum();
                    sizes + node_separation * ids.len().saturating_sub(1) as f32
                })
                .collect();
            let component_width = rank_widths.iter().copied().fold(0.0f32, f32::max);

            for (rank, ids) in ranks.iter().enumerate() {
                let band_center = band_starts[rank] + extents[rank] / 2.0;
                let mut offset = cross_cursor + (component_width - rank_widths[rank]) / 2.0;

                for id in ids {
                    let size = footprint(id);
                    let main_pos = band_center - main(size) / 2.0;
                    let position = match direction {
                        Direction::TopDown => Point::new(offset, main_pos),
                        Direction::LeftRight => Point::new(main_pos, offset),
                    };
                    positions.insert(*id, position);
                    offset += cross(size) + node_separation;
                }
            }

            cross_cursor += component_width + node_separation;
        }

        positions
    }
}

/// Reverses the edges that close a cycle so every remaining edge points forward.
///
/// A depth-first walk starts from each unvisited node in document order and
/// follows outgoing edges in document order; an edge reaching a node still on
/// the walk's stack is turned around. Weights play no part, so a heavy rework
/// edge never outranks the forward flow it returns to.
fn orient_edges(
    node_order: impl Iterator<Item = Id>,
    edges: Vec<(Id, Id, EdgeHints)>,
) -> Vec<(Id, Id, EdgeHints)> {
    let mut outgoing: HashMap<Id, Vec<usize>> = HashMap::new();
    for (idx, (source, _, _)) in edges.iter().enumerate() {
        outgoing.entry(*source).or_default().push(idx);
    }

    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut reversed = vec![false; edges.len()];

    for root in node_order {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        let mut stack = vec![(root, 0usize)];

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let Some(&edge_idx) = outgoing.get(&node).and_then(|out| out.get(*next)) else {
                on_stack.remove(&node);
                stack.pop();
                continue;
            };
            *next += 1;

            let target = edges[edge_idx].1;
            if on_stack.contains(&target) {
                reversed[edge_idx] = true;
            } else if visited.insert(target) {
                on_stack.insert(target);
                stack.push((target, 0));
            }
        }
    }

    let flipped = reversed.iter().filter(|flag| **flag).count();
    if flipped > 0 {
        trace!(reversed_edges = flipped; "Cycles broken for ranking");
    }

    edges
        .into_iter()
        .zip(reversed)
        .map(|((source, target, hints), flip)| {
            if flip {
                (target, source, hints)
            } else {
                (source, target, hints)
            }
        })
        .collect()
}

fn level_key(y: f64) -> i64 {
    (y * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use procflow_core::document::{EdgeSemantics, NodeKind};

    use super::*;

    fn task(id: &str) -> Node {
        Node::new(id, NodeKind::Task, id)
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge::new(id, source, target, "")
    }

    #[test]
    fn test_edge_hints() {
        let plain = edge("e1", "a", "b");
        let looped = edge("e2", "a", "a");
        let exception = edge("e3", "a", "b").with_semantics(EdgeSemantics::new(false, true));
        let exception_loop = edge("e4", "a", "a").with_semantics(EdgeSemantics::new(false, true));

        assert_eq!(EdgeHints::for_edge(&plain), EdgeHints { weight: 1, min_length: 1 });
        assert_eq!(EdgeHints::for_edge(&looped), EdgeHints { weight: 3, min_length: 2 });
        assert_eq!(EdgeHints::for_edge(&exception), EdgeHints { weight: 4, min_length: 1 });
        assert_eq!(EdgeHints::for_edge(&exception_loop), EdgeHints { weight: 4, min_length: 2 });
    }

    #[test]
    fn test_filters_unusable_entries() {
        let nodes = vec![task("a"), task("b"), Node::new("", NodeKind::Task, "ghost")];
        let edges = vec![
            edge("e1", "a", "b"),
            edge("e2", "a", "missing"),
            edge("", "b", "a"),
            edge("e4", "b", "b"),
        ];
        let graph = RankGraph::new(&nodes, &edges);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_empty_graph_has_no_positions() {
        let graph = RankGraph::new(&[], &[]);
        assert!(graph.positions(Direction::TopDown, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_chain_top_down_coordinates() {
        let nodes = vec![task("a"), task("b"), task("c")];
        let edges = vec![edge("e1", "a", "b"), edge("e2", "b", "c")];
        let positions =
            RankGraph::new(&nodes, &edges).positions(Direction::TopDown, &LayoutConfig::default());

        // 200 * 1.5 between 80-high bands, 50 margin.
        let expected = [50.0, 430.0, 810.0];
        for (id, y) in ["a", "b", "c"].iter().zip(expected) {
            let position = positions[&Id::new(id)];
            assert_approx_eq!(f32, position.x(), 50.0);
            assert_approx_eq!(f32, position.y(), y);
        }
    }

    #[test]
    fn test_chain_left_right_coordinates() {
        let nodes = vec![task("a"), task("b")];
        let edges = vec![edge("e1", "a", "b")];
        let positions =
            RankGraph::new(&nodes, &edges).positions(Direction::LeftRight, &LayoutConfig::default());

        let a = positions[&Id::new("a")];
        let b = positions[&Id::new("b")];
        assert_approx_eq!(f32, a.x(), 50.0);
        assert_approx_eq!(f32, b.x(), 50.0 + 192.0 + 200.0);
        assert_approx_eq!(f32, a.y(), b.y());
    }

    #[test]
    fn test_decision_widens_rank_separation() {
        let nodes = vec![task("a"), Node::new("d", NodeKind::Decision, "Check")];
        let edges = vec![edge("e1", "a", "d")];
        let positions =
            RankGraph::new(&nodes, &edges).positions(Direction::TopDown, &LayoutConfig::default());

        // 250 * 1.5 below the 80-high first band.
        assert_approx_eq!(f32, positions[&Id::new("d")].y(), 50.0 + 80.0 + 375.0);
    }

    #[test]
    fn test_isolated_nodes_follow_components_on_first_rank() {
        let nodes = vec![task("lonely"), task("a"), task("b")];
        let edges = vec![edge("e1", "a", "b"), edge("e2", "lonely", "lonely")];
        let positions =
            RankGraph::new(&nodes, &edges).positions(Direction::TopDown, &LayoutConfig::default());

        let keys: Vec<Id> = positions.keys().copied().collect();
        assert_eq!(keys, vec![Id::new("lonely"), Id::new("a"), Id::new("b")]);

        let lonely = positions[&Id::new("lonely")];
        let a = positions[&Id::new("a")];
        assert_approx_eq!(f32, lonely.y(), a.y());
        assert!(lonely.x() > a.x());
    }

    #[test]
    fn test_orient_edges_reverses_only_back_edges() {
        let hints = EdgeHints { weight: 1, min_length: 1 };
        let heavy = EdgeHints { weight: 4, min_length: 1 };
        let ids = ["a", "b", "c"].map(Id::new);
        let edges = vec![
            (ids[0], ids[1], hints),
            (ids[1], ids[2], hints),
            (ids[2], ids[1], heavy),
        ];

        let oriented = orient_edges(ids.into_iter(), edges);

        assert_eq!(
            oriented,
            vec![
                (ids[0], ids[1], hints),
                (ids[1], ids[2], hints),
                (ids[1], ids[2], heavy),
            ]
        );
    }

    #[test]
    fn test_exception_rework_edge_keeps_flow_order() {
        let nodes = vec![task("a"), task("b"), task("c")];
        let edges = vec![
            edge("e1", "a", "b"),
            edge("e2", "b", "c"),
            edge("e3", "c", "b").with_semantics(EdgeSemantics::new(false, true)),
        ];
        let positions =
            RankGraph::new(&nodes, &edges).positions(Direction::TopDown, &LayoutConfig::default());

        let a = positions[&Id::new("a")];
        let b = positions[&Id::new("b")];
        let c = positions[&Id::new("c")];
        assert!(a.y() < b.y());
        assert!(b.y() < c.y());
    }

    #[test]
    fn test_longest_path_breaks_cycles() {
        let nodes = vec![task("a"), task("b"), task("c")];
        let edges = vec![edge("e1", "a", "b"), edge("e2", "b", "c"), edge("e3", "c", "a")];
        let graph = RankGraph::new(&nodes, &edges);
        let ranks = graph.longest_path_ranks(&graph.ranked_ids());

        assert_eq!(ranks.len(), 3);
        assert!(ranks.iter().all(|rank| rank.len() == 1));
    }

    #[test]
    fn test_longest_path_uses_longest_route() {
        let nodes = vec![task("a"), task("b"), task("c")];
        let edges = vec![edge("e1", "a", "b"), edge("e2", "b", "c"), edge("e3", "a", "c")];
        let graph = RankGraph::new(&nodes, &edges);
        let ranks = graph.longest_path_ranks(&graph.ranked_ids());

        assert_eq!(
            ranks,
            vec![vec![Id::new("a")], vec![Id::new("b")], vec![Id::new("c")]]
        );
    }
}
