//! Simulation parameters and the configuration layer that loads and clamps them.
//!
//! The simulation core never validates parameters itself. Every value reaching the
//! [`EpidemicTracker`](crate::tracker::EpidemicTracker) has been through [`Parameters::clamped`],
//! either when a config file is loaded, when the operator changes a value from the console, or
//! when the tracker receives new parameters.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::EpiError;

pub const MAX_BRANCHING_FACTOR: u32 = 10;
pub const MAX_DAY_TO_IMMUNITY: u32 = 10;
pub const MAX_IMMUNITY_PERIOD: u32 = 100;

/// Whether a node whose immunity has expired may be exposed again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReexposurePolicy {
    /// Once immunity wears off the node rejoins the susceptible pool and can be reached again.
    #[default]
    Reinfectable,
    /// A node reached once is never exposed again, whatever its state.
    Lifetime,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Parameters {
    /// Target number of new exposures per frontier node per day (R0).
    pub branching_factor: u32,
    /// Days from infection onset to immunity.
    pub day_to_immunity: u32,
    /// Days an immune node stays immune.
    pub immunity_period: u32,
    /// Probability that a newly exposed node dies instead of becoming infected.
    pub death_probability: f64,
    pub reexposure: ReexposurePolicy,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            branching_factor: 3,
            day_to_immunity: 3,
            immunity_period: 10,
            death_probability: 0.1,
            reexposure: ReexposurePolicy::Reinfectable,
        }
    }
}

impl Parameters {
    /// The spread around `branching_factor` when drawing an exposure count.
    #[must_use]
    pub fn branching_delta(&self) -> u32 {
        self.branching_factor / 2
    }

    /// Returns a copy with every value brought into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let death_probability = if self.death_probability.is_nan() {
            0.0
        } else {
            self.death_probability.clamp(0.0, 1.0)
        };
        Parameters {
            branching_factor: self.branching_factor.min(MAX_BRANCHING_FACTOR),
            day_to_immunity: self.day_to_immunity.min(MAX_DAY_TO_IMMUNITY),
            immunity_period: self.immunity_period.min(MAX_IMMUNITY_PERIOD),
            death_probability,
            reexposure: self.reexposure,
        }
    }

    /// Applies every value present in `input` on top of `self`, clamping with a warning.
    #[must_use]
    pub fn merged(self, input: &ParametersInput) -> Self {
        let mut parameters = self;
        if let Some(value) = input.branching_factor {
            parameters.branching_factor =
                clamp_days(ParameterName::BranchingFactor, value, MAX_BRANCHING_FACTOR);
        }
        if let Some(value) = input.day_to_immunity {
            parameters.day_to_immunity =
                clamp_days(ParameterName::DayToImmunity, value, MAX_DAY_TO_IMMUNITY);
        }
        if let Some(value) = input.immunity_period {
            parameters.immunity_period =
                clamp_days(ParameterName::ImmunityPeriod, value, MAX_IMMUNITY_PERIOD);
        }
        if let Some(value) = input.death_probability {
            parameters.death_probability = clamp_probability(value);
        }
        if let Some(policy) = input.reexposure {
            parameters.reexposure = policy;
        }
        parameters.clamped()
    }

    /// Sets one parameter from its textual value, as typed by the operator.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigError` if the value cannot be parsed for that parameter.
    pub fn set(&mut self, name: ParameterName, value: &str) -> Result<(), EpiError> {
        let value = value.trim();
        let input = match name {
            ParameterName::DeathProbability => ParametersInput {
                death_probability: Some(parse_value(name, value)?),
                ..ParametersInput::default()
            },
            ParameterName::Reexposure => ParametersInput {
                reexposure: Some(ReexposurePolicy::from_str(value).map_err(|_| {
                    EpiError::ConfigError(format!(
                        "{name} must be `reinfectable` or `lifetime`, got `{value}`"
                    ))
                })?),
                ..ParametersInput::default()
            },
            ParameterName::BranchingFactor => ParametersInput {
                branching_factor: Some(parse_value(name, value)?),
                ..ParametersInput::default()
            },
            ParameterName::DayToImmunity => ParametersInput {
                day_to_immunity: Some(parse_value(name, value)?),
                ..ParametersInput::default()
            },
            ParameterName::ImmunityPeriod => ParametersInput {
                immunity_period: Some(parse_value(name, value)?),
                ..ParametersInput::default()
            },
        };
        *self = self.merged(&input);
        info!("{name} set to {value}");
        Ok(())
    }
}

/// The names under which parameters can be changed at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ParameterName {
    #[strum(to_string = "branching-factor", serialize = "r0")]
    BranchingFactor,
    #[strum(to_string = "day-to-immunity", serialize = "dti")]
    DayToImmunity,
    #[strum(serialize = "immunity-period")]
    ImmunityPeriod,
    #[strum(serialize = "death-probability")]
    DeathProbability,
    Reexposure,
}

fn parse_value<T: FromStr>(name: ParameterName, value: &str) -> Result<T, EpiError> {
    value
        .parse()
        .map_err(|_| EpiError::ConfigError(format!("invalid value `{value}` for {name}")))
}

fn clamp_days(name: ParameterName, value: i64, max: u32) -> u32 {
    let clamped = value.clamp(0, i64::from(max));
    if clamped != value {
        warn!("{name} {value} is out of range, using {clamped}");
    }
    // In range after the clamp above.
    u32::try_from(clamped).unwrap_or(max)
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        warn!("death probability is not a number, using 0");
        return 0.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        warn!("death probability {value} is out of range, using {clamped}");
    }
    clamped
}

/// Parameter values as they appear in a config file. Every field is optional and may be out of
/// range; [`Parameters::merged`] brings them into range.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParametersInput {
    pub branching_factor: Option<i64>,
    pub day_to_immunity: Option<i64>,
    pub immunity_period: Option<i64>,
    pub death_probability: Option<f64>,
    pub reexposure: Option<ReexposurePolicy>,
}

/// Loads parameters from a JSON file, starting from the defaults.
///
/// # Errors
///
/// Returns an `EpiError` if the file cannot be read or is not a valid parameters document.
pub fn load_parameters(path: &Path) -> Result<Parameters, EpiError> {
    info!("Loading parameters from: {}", path.display());
    let data = fs::read_to_string(path)?;
    let input: ParametersInput = serde_json::from_str(&data)?;
    Ok(Parameters::default().merged(&input))
}
