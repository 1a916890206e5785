//! Per-node disease state and its display classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The simulation day, counted from the infection of the root on day 0.
pub type Day = u32;

/// The disease state of one node. A node is in exactly one of these at any time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiseaseState {
    #[default]
    Susceptible,
    Infected {
        onset_day: Day,
    },
    Dead,
    Immune {
        since_day: Day,
    },
}

impl DiseaseState {
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        matches!(self, Self::Susceptible)
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::Infected { .. })
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    #[must_use]
    pub fn is_immune(&self) -> bool {
        matches!(self, Self::Immune { .. })
    }

    #[must_use]
    pub fn status(&self) -> NodeStatus {
        match self {
            Self::Susceptible => NodeStatus::Normal,
            Self::Infected { .. } => NodeStatus::Infected,
            Self::Dead => NodeStatus::Dead,
            Self::Immune { .. } => NodeStatus::Immune,
        }
    }
}

/// The classification a renderer needs to colour a node.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Normal,
    Infected,
    Immune,
    Dead,
}

impl NodeStatus {
    /// The display colour of this status as an RGB hex string.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            NodeStatus::Normal => "#35FFAD",
            NodeStatus::Infected => "#FF4348",
            NodeStatus::Immune => "#7B02FF",
            NodeStatus::Dead => "#000000",
        }
    }
}

/// Number of nodes in each disease state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
    pub dead: usize,
}

impl StateCounts {
    pub fn tally<'a>(states: impl IntoIterator<Item = &'a DiseaseState>) -> Self {
        let mut counts = Self::default();
        for state in states {
            match state {
                DiseaseState::Susceptible => counts.susceptible += 1,
                DiseaseState::Infected { .. } => counts.infected += 1,
                DiseaseState::Immune { .. } => counts.immune += 1,
                DiseaseState::Dead => counts.dead += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.immune + self.dead
    }
}
