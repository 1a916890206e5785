//! Decides whether the epidemic is still running.

use crate::disease::DiseaseState;

/// Returns `false` once no node is infected and the population is not a mix of susceptible and
/// immune nodes. A mix can still change as immunity wears off; anything else is settled.
///
/// This gates automatic advancement only. Stepping manually is always allowed.
pub fn is_active<'a>(states: impl IntoIterator<Item = &'a DiseaseState>) -> bool {
    let mut susceptible = false;
    let mut immune = false;
    for state in states {
        match state {
            DiseaseState::Infected { .. } => return true,
            DiseaseState::Susceptible => susceptible = true,
            DiseaseState::Immune { .. } => immune = true,
            DiseaseState::Dead => {}
        }
    }
    susceptible && immune
}
