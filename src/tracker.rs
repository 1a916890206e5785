//! The epidemic state tracker.
//!
//! [`EpidemicTracker`] owns the graph, the per-node [`DiseaseState`], the spread bookkeeping and
//! the random streams of one simulation. It advances the simulation one day at a time with
//! [`EpidemicTracker::advance_day`]:
//!
//! 1. The day counter is incremented.
//! 2. The [spread step](crate::spread::spread_step) computes the new frontier and visited sets.
//! 3. Every susceptible node in those sets flips the death coin: it either dies or becomes
//!    infected on the current day.
//! 4. Dead nodes are scrubbed from the spread bookkeeping.
//! 5. Infected nodes whose infection has lasted `day_to_immunity` days become immune and leave the
//!    spread bookkeeping.
//! 6. Immune nodes whose immunity has lasted `immunity_period` days become susceptible again.
//!
//! The running case counter always equals the number of infected nodes. Parameter changes made
//! with [`EpidemicTracker::set_parameters`] apply from the next call to `advance_day`.

use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

use crate::disease::{Day, DiseaseState, NodeStatus, StateCounts};
use crate::error::EpiError;
use crate::graph::{Graph, NodeId};
use crate::parameters::{Parameters, ReexposurePolicy};
use crate::random::RngStreams;
use crate::spread::{spread_step, Branching, NodeSet, SpreadState};
use crate::termination;
use crate::HashSet;

/// What happened on one simulated day.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: Day,
    pub counts: StateCounts,
    /// The running case counter after the day.
    pub cases: usize,
    pub new_infections: usize,
    pub new_deaths: usize,
    pub new_immunities: usize,
    pub reversions: usize,
    pub frontier_size: usize,
}

pub struct EpidemicTracker<R: Rng = SmallRng> {
    graph: Graph,
    root: NodeId,
    parameters: Parameters,
    day: Day,
    states: Vec<DiseaseState>,
    spread: SpreadState,
    /// Every node the spread has ever reached. Never shrinks.
    reached: HashSet<NodeId>,
    cases: usize,
    rng: RngStreams<R>,
}

impl<R: Rng> EpidemicTracker<R> {
    /// Starts a simulation with `root` infected on day 0. A root that is not in the graph is
    /// added as an isolated node.
    pub fn new(mut graph: Graph, root: &str, parameters: Parameters, rng: RngStreams<R>) -> Self {
        let root = match graph.node_id(root) {
            Some(id) => id,
            None => {
                warn!("root node {root} has no recorded edges, adding it as an isolated node");
                graph.add_node(root)
            }
        };
        Self::start(graph, root, parameters, rng)
    }

    /// Starts a simulation with `root` infected on day 0.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::UnknownRootNode` if `root` is not a node of `graph`.
    pub fn with_existing_root(
        graph: Graph,
        root: &str,
        parameters: Parameters,
        rng: RngStreams<R>,
    ) -> Result<Self, EpiError> {
        let root = graph
            .node_id(root)
            .ok_or_else(|| EpiError::UnknownRootNode(root.to_string()))?;
        Ok(Self::start(graph, root, parameters, rng))
    }

    fn start(graph: Graph, root: NodeId, parameters: Parameters, rng: RngStreams<R>) -> Self {
        let mut states = vec![DiseaseState::Susceptible; graph.len()];
        states[root.index()] = DiseaseState::Infected { onset_day: 0 };
        let mut reached = HashSet::default();
        reached.insert(root);
        info!(
            "starting epidemic at {} in a population of {}",
            graph.name(root).unwrap_or_default(),
            graph.len()
        );
        EpidemicTracker {
            graph,
            root,
            parameters: parameters.clamped(),
            day: 0,
            states,
            spread: SpreadState::rooted_at(root),
            reached,
            cases: 1,
            rng,
        }
    }

    /// Advances the simulation by exactly one day.
    pub fn advance_day(&mut self) -> DaySummary {
        self.day += 1;
        let day = self.day;
        let parameters = self.parameters;
        let mut summary = DaySummary {
            day,
            ..DaySummary::default()
        };

        let branching = Branching {
            factor: parameters.branching_factor,
            delta: parameters.branching_delta(),
        };
        let states = &self.states;
        let reached = &self.reached;
        let is_excluded = |node: NodeId| match states[node.index()] {
            DiseaseState::Immune { .. } => true,
            _ => parameters.reexposure == ReexposurePolicy::Lifetime && reached.contains(&node),
        };
        self.spread = spread_step(
            &self.graph,
            &self.spread,
            branching,
            is_excluded,
            self.rng.spread(),
        );
        self.reached.extend(self.spread.frontier.iter().copied());

        self.expose_tracked(day, &mut summary);
        self.scrub_dead();
        self.onset_immunity(day, &mut summary);
        self.expire_immunity(day, &mut summary);

        summary.counts = self.counts();
        summary.cases = self.cases;
        summary.frontier_size = self.spread.frontier.len();
        debug!(
            "day {day}: frontier {} visited {} cases {}",
            self.spread.frontier.len(),
            self.spread.visited.len(),
            self.cases
        );
        summary
    }

    /// Every susceptible node in the spread bookkeeping either dies or becomes infected today.
    fn expose_tracked(&mut self, day: Day, summary: &mut DaySummary) {
        let death_probability = self.parameters.death_probability;
        let tracked: Vec<NodeId> = self.spread.tracked().collect();
        for node in tracked {
            if !self.states[node.index()].is_susceptible() {
                continue;
            }
            if self.rng.outcome().random_bool(death_probability) {
                trace!("{} just died", self.node_name(node));
                self.states[node.index()] = DiseaseState::Dead;
                self.spread.forget(node);
                summary.new_deaths += 1;
            } else {
                trace!("{} infected on day {day}", self.node_name(node));
                self.states[node.index()] = DiseaseState::Infected { onset_day: day };
                self.cases += 1;
                summary.new_infections += 1;
            }
        }
    }

    /// Dead nodes never stay in the frontier or visited sets.
    fn scrub_dead(&mut self) {
        let dead: Vec<NodeId> = self
            .spread
            .tracked()
            .filter(|node| self.states[node.index()].is_dead())
            .collect();
        for node in dead {
            self.spread.forget(node);
        }
    }

    fn onset_immunity(&mut self, day: Day, summary: &mut DaySummary) {
        let day_to_immunity = self.parameters.day_to_immunity;
        for index in 0..self.states.len() {
            if let DiseaseState::Infected { onset_day } = self.states[index] {
                if day >= onset_day.saturating_add(day_to_immunity) {
                    let node = NodeId(index);
                    trace!("{} immune on day {day}", self.node_name(node));
                    self.states[index] = DiseaseState::Immune { since_day: day };
                    self.cases -= 1;
                    self.spread.forget(node);
                    summary.new_immunities += 1;
                }
            }
        }
    }

    fn expire_immunity(&mut self, day: Day, summary: &mut DaySummary) {
        let immunity_period = self.parameters.immunity_period;
        for index in 0..self.states.len() {
            if let DiseaseState::Immune { since_day } = self.states[index] {
                if day >= since_day.saturating_add(immunity_period) {
                    trace!("{} susceptible again on day {day}", self.node_name(NodeId(index)));
                    self.states[index] = DiseaseState::Susceptible;
                    summary.reversions += 1;
                }
            }
        }
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.graph.name(node).unwrap_or_default()
    }

    /// Replaces the parameters used from the next day on.
    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = parameters.clamped();
        debug!("parameters updated: {:?}", self.parameters);
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Whether automatic advancement should continue.
    #[must_use]
    pub fn is_active(&self) -> bool {
        termination::is_active(&self.states)
    }
}

impl<R: Rng> EpidemicTracker<R> {
    #[must_use]
    pub fn day(&self) -> Day {
        self.day
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The state of the node called `name`, or `None` for names not in the graph.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<DiseaseState> {
        self.graph.node_id(name).and_then(|node| self.state_of(node))
    }

    #[must_use]
    pub fn state_of(&self, node: NodeId) -> Option<DiseaseState> {
        self.states.get(node.index()).copied()
    }

    #[must_use]
    pub fn status(&self, name: &str) -> Option<NodeStatus> {
        self.state(name).map(|state| state.status())
    }

    /// Every node with its current state, in graph order.
    pub fn states(&self) -> impl Iterator<Item = (&str, DiseaseState)> + '_ {
        self.graph.vertices().zip(self.states.iter().copied())
    }

    /// The running count of infected nodes.
    #[must_use]
    pub fn cases(&self) -> usize {
        self.cases
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.graph.len()
    }

    #[must_use]
    pub fn counts(&self) -> StateCounts {
        StateCounts::tally(&self.states)
    }

    /// The current day as a summary without any transitions, e.g. the starting state on day 0.
    #[must_use]
    pub fn snapshot(&self) -> DaySummary {
        DaySummary {
            day: self.day,
            counts: self.counts(),
            cases: self.cases,
            frontier_size: self.spread.frontier.len(),
            ..DaySummary::default()
        }
    }

    #[must_use]
    pub fn frontier(&self) -> &NodeSet {
        &self.spread.frontier
    }

    #[must_use]
    pub fn visited(&self) -> &NodeSet {
        &self.spread.visited
    }

    /// Every node the spread has reached since day 0.
    #[must_use]
    pub fn reached(&self) -> &HashSet<NodeId> {
        &self.reached
    }

    #[must_use]
    pub fn frontier_names(&self) -> Vec<&str> {
        self.spread
            .frontier
            .iter()
            .filter_map(|&node| self.graph.name(node))
            .collect()
    }
}
