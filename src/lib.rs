//! Day-by-day simulation of an epidemic spreading over a social graph
//!
//! Nodes of the graph are people and edges are relationships. The simulation starts with a
//! single infected root on day 0 and advances one day at a time. Each day:
//! * The infection spreads from the frontier of newly infected people to a random subset of
//!   their neighbors, sized around the branching factor (R0).
//! * Everyone newly exposed either dies or becomes infected.
//! * People who have been infected for long enough become immune.
//! * People whose immunity has run out become susceptible again.
//!
//! The [`EpidemicTracker`] owns the state of one simulation and is fully headless. A
//! [`Session`](session::Session) drives it from operator actions, either one day at a time or
//! automatically until the epidemic is over, and the [`console`] module presents the session as a
//! text REPL. The [`runner`] module wires everything up from command line arguments.
pub mod console;
pub mod disease;
pub mod error;
pub mod graph;
pub mod hashing;
pub mod loader;
pub mod log;
pub mod parameters;
pub mod random;
pub mod report;
pub mod runner;
pub mod session;
pub mod spread;
pub mod termination;
pub mod tracker;

pub use disease::{Day, DiseaseState, NodeStatus, StateCounts};
pub use error::EpiError;
pub use graph::{Graph, NodeId};
pub use hashing::{HashMap, HashSet};
pub use parameters::{Parameters, ReexposurePolicy};
pub use tracker::{DaySummary, EpidemicTracker};

// Re-export for use by callers that inject their own generators
pub use rand;
