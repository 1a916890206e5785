//! The single-day expansion of the epidemic frontier.
//!
//! Each node on the previous frontier exposes a random subset of its eligible neighbors: those
//! not yet visited and not excluded by the caller (immune nodes, and under the lifetime policy
//! nodes that were reached before). A neighbor on the same frontier stays eligible and counts
//! against the exposure budget, though the tracker ignores the exposure since that node is no
//! longer susceptible. The number of exposures per node is drawn uniformly from
//! `[branching_factor - delta, branching_factor + delta]` and then clipped to the number of
//! eligible neighbors. Once expanded, frontier nodes move to `visited`.
//!
//! This step only computes sets. It never touches disease state; that is the job of
//! [`EpidemicTracker`](crate::tracker::EpidemicTracker).

use indexmap::IndexSet;
use log::trace;
use rand::Rng;

use crate::graph::{Graph, NodeId};
use crate::random::sample_multiple_from_known_length;

/// An insertion-ordered, deduplicated set of nodes.
pub type NodeSet = IndexSet<NodeId>;

/// The frontier/visited bookkeeping carried from one day to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpreadState {
    /// Nodes newly reached on the current day.
    pub frontier: NodeSet,
    /// Nodes whose expansion has already been computed.
    pub visited: NodeSet,
}

impl SpreadState {
    /// The state on day 0: only `root` is on the frontier.
    #[must_use]
    pub fn rooted_at(root: NodeId) -> Self {
        let mut frontier = NodeSet::default();
        frontier.insert(root);
        SpreadState {
            frontier,
            visited: NodeSet::default(),
        }
    }

    /// Drops `node` from both sets.
    pub fn forget(&mut self, node: NodeId) -> bool {
        let in_frontier = self.frontier.shift_remove(&node);
        let in_visited = self.visited.shift_remove(&node);
        in_frontier || in_visited
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.frontier.contains(&node) || self.visited.contains(&node)
    }

    /// Every tracked node: `visited` first, then the frontier nodes not already visited.
    pub fn tracked(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.visited.iter().copied().chain(
            self.frontier
                .iter()
                .copied()
                .filter(|node| !self.visited.contains(node)),
        )
    }
}

/// How many neighbors each frontier node tries to expose.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Branching {
    pub factor: u32,
    pub delta: u32,
}

impl Branching {
    /// Draws an exposure count uniformly from `[factor - delta, factor + delta]` (the lower bound
    /// saturating at zero), clipped to `eligible`.
    pub fn draw<R: Rng>(&self, rng: &mut R, eligible: usize) -> usize {
        if eligible == 0 {
            return 0;
        }
        let low = self.factor.saturating_sub(self.delta);
        let high = self.factor.saturating_add(self.delta);
        let count = if low == high {
            low
        } else {
            rng.random_range(low..=high)
        };
        usize::try_from(count).map_or(eligible, |count| count.min(eligible))
    }
}

/// Computes the next day's frontier and visited sets from the previous ones.
///
/// `is_excluded` marks nodes that cannot be exposed today regardless of the bookkeeping.
pub fn spread_step<R, F>(
    graph: &Graph,
    previous: &SpreadState,
    branching: Branching,
    is_excluded: F,
    rng: &mut R,
) -> SpreadState
where
    R: Rng,
    F: Fn(NodeId) -> bool,
{
    let mut frontier = NodeSet::default();

    for &node in &previous.frontier {
        let eligible: Vec<NodeId> = graph
            .neighbor_ids(node)
            .iter()
            .copied()
            .filter(|neighbor| {
                !previous.visited.contains(neighbor) && !is_excluded(*neighbor)
            })
            .collect();

        let count = branching.draw(rng, eligible.len());
        let exposed = sample_multiple_from_known_length(rng, eligible, count);
        trace!("node {node} exposes {} of its eligible neighbors", exposed.len());
        frontier.extend(exposed);
    }

    let mut visited = previous.visited.clone();
    visited.extend(previous.frontier.iter().copied());

    SpreadState { frontier, visited }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn unbounded() -> Branching {
        Branching {
            factor: 10,
            delta: 0,
        }
    }

    fn ids(graph: &Graph, names: &[&str]) -> NodeSet {
        names.iter().map(|n| graph.node_id(n).unwrap()).collect()
    }

    #[test]
    fn path_spreads_one_hop_per_day() {
        let graph = Graph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]);
        let mut rng = SmallRng::seed_from_u64(1);
        let root = graph.node_id("A").unwrap();

        let day1 = spread_step(
            &graph,
            &SpreadState::rooted_at(root),
            unbounded(),
            |_| false,
            &mut rng,
        );
        assert_eq!(day1.frontier, ids(&graph, &["B"]));
        assert_eq!(day1.visited, ids(&graph, &["A"]));

        let day2 = spread_step(&graph, &day1, unbounded(), |_| false, &mut rng);
        assert_eq!(day2.frontier, ids(&graph, &["C"]));
        assert_eq!(day2.visited, ids(&graph, &["A", "B"]));

        let day3 = spread_step(&graph, &day2, unbounded(), |_| false, &mut rng);
        let day4 = spread_step(&graph, &day3, unbounded(), |_| false, &mut rng);
        assert!(day4.frontier.is_empty());
        assert_eq!(day4.visited, ids(&graph, &["A", "B", "C", "D"]));
    }

    #[test]
    fn zero_branching_never_spreads() {
        let graph = Graph::from_edges([("A", "B"), ("A", "C")]);
        let mut rng = SmallRng::seed_from_u64(3);
        let root = graph.node_id("A").unwrap();
        let branching = Branching {
            factor: 0,
            delta: 0,
        };
        let day1 = spread_step(
            &graph,
            &SpreadState::rooted_at(root),
            branching,
            |_| false,
            &mut rng,
        );
        assert!(day1.frontier.is_empty());
        assert_eq!(day1.visited, ids(&graph, &["A"]));
    }

    #[test]
    fn excluded_nodes_are_not_exposed() {
        let graph = Graph::from_edges([("A", "B"), ("A", "C")]);
        let mut rng = SmallRng::seed_from_u64(5);
        let root = graph.node_id("A").unwrap();
        let b = graph.node_id("B").unwrap();
        let day1 = spread_step(
            &graph,
            &SpreadState::rooted_at(root),
            unbounded(),
            |node| node == b,
            &mut rng,
        );
        assert_eq!(day1.frontier, ids(&graph, &["C"]));
    }

    #[test]
    fn frontier_nodes_can_expose_each_other() {
        // B and C are both on the frontier and adjacent.
        let graph = Graph::from_edges([("B", "C"), ("B", "D"), ("C", "E")]);
        let mut rng = SmallRng::seed_from_u64(9);
        let previous = SpreadState {
            frontier: ids(&graph, &["B", "C"]),
            visited: NodeSet::default(),
        };
        let next = spread_step(&graph, &previous, unbounded(), |_| false, &mut rng);
        assert_eq!(next.frontier, ids(&graph, &["C", "D", "B", "E"]));
        assert_eq!(next.visited, ids(&graph, &["B", "C"]));
    }

    #[test]
    fn frontier_neighbor_shares_the_exposure_budget() {
        // B draws one of {C, D}; C can only be reached through B.
        let graph = Graph::from_edges([("B", "C"), ("B", "D")]);
        let c = graph.node_id("C").unwrap();
        let single = Branching {
            factor: 1,
            delta: 0,
        };
        let previous = SpreadState {
            frontier: ids(&graph, &["B", "C"]),
            visited: NodeSet::default(),
        };
        let mut c_exposed = 0;
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let next = spread_step(&graph, &previous, single, |_| false, &mut rng);
            assert_eq!(next.frontier.len(), 2);
            if next.frontier.contains(&c) {
                c_exposed += 1;
            }
        }
        assert!((50..150).contains(&c_exposed), "C exposed in {c_exposed}/200 runs");
    }

    #[test]
    fn shared_neighbors_are_deduplicated() {
        let graph = Graph::from_edges([("A", "X"), ("B", "X")]);
        let mut rng = SmallRng::seed_from_u64(11);
        let previous = SpreadState {
            frontier: ids(&graph, &["A", "B"]),
            visited: NodeSet::default(),
        };
        let next = spread_step(&graph, &previous, unbounded(), |_| false, &mut rng);
        assert_eq!(next.frontier, ids(&graph, &["X"]));
    }

    #[test]
    fn empty_frontier_stays_empty() {
        let graph = Graph::from_edges([("A", "B")]);
        let mut rng = SmallRng::seed_from_u64(0);
        let previous = SpreadState {
            frontier: NodeSet::default(),
            visited: ids(&graph, &["A"]),
        };
        let next = spread_step(&graph, &previous, unbounded(), |_| false, &mut rng);
        assert!(next.frontier.is_empty());
        assert_eq!(next.visited, previous.visited);
    }

    #[test]
    fn exposure_count_stays_within_bounds() {
        // A star with 20 leaves; R0 = 4 gives delta 2, so 2..=6 leaves per day.
        let edges: Vec<(String, String)> =
            (0..20).map(|i| ("hub".to_string(), format!("leaf{i}"))).collect();
        let graph = Graph::from_edges(edges);
        let root = graph.node_id("hub").unwrap();
        let branching = Branching {
            factor: 4,
            delta: 2,
        };
        let mut seen = std::collections::BTreeSet::new();
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let next = spread_step(
                &graph,
                &SpreadState::rooted_at(root),
                branching,
                |_| false,
                &mut rng,
            );
            let n = next.frontier.len();
            assert!((2..=6).contains(&n), "exposed {n}");
            seen.insert(n);
        }
        // Every count in the range shows up over 200 seeds.
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn draw_clips_to_eligible() {
        let mut rng = SmallRng::seed_from_u64(0);
        let branching = Branching {
            factor: 10,
            delta: 5,
        };
        for _ in 0..50 {
            assert!(branching.draw(&mut rng, 3) <= 3);
        }
        assert_eq!(branching.draw(&mut rng, 0), 0);
    }

    #[test]
    fn same_seed_same_spread() {
        let edges: Vec<(String, String)> = (0..30)
            .map(|i| (format!("n{}", i % 7), format!("n{}", (i * 3 + 1) % 13)))
            .collect();
        let graph = Graph::from_edges(edges);
        let root = graph.node_id("n0").unwrap();
        let branching = Branching {
            factor: 2,
            delta: 1,
        };
        let run = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut state = SpreadState::rooted_at(root);
            for _ in 0..5 {
                state = spread_step(&graph, &state, branching, |_| false, &mut rng);
            }
            state
        };
        assert_eq!(run(17), run(17));
    }

    #[test]
    fn forget_and_tracked() {
        let graph = Graph::from_edges([("A", "B"), ("B", "C")]);
        let mut state = SpreadState {
            frontier: ids(&graph, &["C", "A"]),
            visited: ids(&graph, &["A", "B"]),
        };
        assert_eq!(
            state.tracked().collect::<NodeSet>(),
            ids(&graph, &["A", "B", "C"])
        );
        let a = graph.node_id("A").unwrap();
        assert!(state.forget(a));
        assert!(!state.contains(a));
        assert!(!state.forget(a));
    }
}
