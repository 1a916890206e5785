//! The run loop that drives an [`EpidemicTracker`] from operator actions.
//!
//! A session is either idle, waiting for the next [`Action`], or in auto mode, advancing one day
//! per cadence until the epidemic is over or the operator stops it. Actions arrive over a
//! channel so the simulation never leaves the thread that runs the loop. Stopping only prevents
//! the next day from starting; a day in progress always completes.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::disease::Day;
use crate::error::EpiError;
use crate::parameters::ParameterName;
use crate::report::DailyReport;
use crate::tracker::{DaySummary, EpidemicTracker};

/// The time between two days in auto mode unless configured otherwise.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(500);

/// Something the operator asked the session to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Advance exactly one day, whether or not the epidemic is still active.
    Next,
    /// Advance at the session cadence until the epidemic is over.
    Auto,
    /// Leave auto mode before the next day starts.
    Stop,
    Status,
    Nodes,
    Params,
    /// Change a parameter from the next day on.
    Set(ParameterName, String),
    Close,
}

/// What came of an action, or of a tick in auto mode.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Advanced(DaySummary),
    AutoStarted,
    AutoStopped,
    /// Auto mode ended, or was refused, because the epidemic is over.
    AutoFinished { day: Day },
    Status,
    Nodes,
    Params,
    ParameterSet(ParameterName),
    /// The action could not be carried out. The session is unchanged.
    Rejected(String),
    Closed,
}

/// Receives every outcome together with the tracker it came from, after the fact.
pub trait SessionObserver<R: Rng> {
    /// # Errors
    ///
    /// Returns an `EpiError` if the outcome cannot be presented. The session loop stops.
    fn observe(&mut self, tracker: &EpidemicTracker<R>, outcome: &Outcome) -> Result<(), EpiError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Auto,
}

pub struct Session<R: Rng = SmallRng> {
    tracker: EpidemicTracker<R>,
    report: Option<DailyReport>,
    cadence: Duration,
    mode: Mode,
    closed: bool,
}

impl<R: Rng> Session<R> {
    #[must_use]
    pub fn new(tracker: EpidemicTracker<R>) -> Self {
        Session {
            tracker,
            report: None,
            cadence: DEFAULT_CADENCE,
            mode: Mode::Idle,
            closed: false,
        }
    }

    #[must_use]
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Attaches a report and writes the current state to it as the first row.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the first row cannot be written.
    pub fn with_report(mut self, mut report: DailyReport) -> Result<Self, EpiError> {
        report.record(&self.tracker.snapshot(), self.tracker.population())?;
        self.report = Some(report);
        Ok(self)
    }

    #[must_use]
    pub fn tracker(&self) -> &EpidemicTracker<R> {
        &self.tracker
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Advances one day and reports it.
    fn step(&mut self) -> Result<DaySummary, EpiError> {
        let summary = self.tracker.advance_day();
        if let Some(report) = &mut self.report {
            report.record(&summary, self.tracker.population())?;
        }
        Ok(summary)
    }

    /// Carries out one action.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` only if a day was simulated and could not be reported. Actions that
    /// cannot be carried out come back as [`Outcome::Rejected`].
    pub fn handle(&mut self, action: Action) -> Result<Outcome, EpiError> {
        if self.closed {
            return Ok(Outcome::Rejected("the session is closed".to_string()));
        }
        debug!("handling {action:?} in {:?} mode", self.mode);
        let outcome = match action {
            Action::Next => Outcome::Advanced(self.step()?),
            Action::Auto => {
                if self.tracker.is_active() {
                    self.mode = Mode::Auto;
                    Outcome::AutoStarted
                } else {
                    Outcome::AutoFinished {
                        day: self.tracker.day(),
                    }
                }
            }
            Action::Stop => {
                if self.mode == Mode::Auto {
                    self.mode = Mode::Idle;
                    Outcome::AutoStopped
                } else {
                    Outcome::Rejected("not running automatically".to_string())
                }
            }
            Action::Status => Outcome::Status,
            Action::Nodes => Outcome::Nodes,
            Action::Params => Outcome::Params,
            Action::Set(name, value) => {
                let mut parameters = *self.tracker.parameters();
                match parameters.set(name, &value) {
                    Ok(()) => {
                        self.tracker.set_parameters(parameters);
                        Outcome::ParameterSet(name)
                    }
                    Err(err) => Outcome::Rejected(err.to_string()),
                }
            }
            Action::Close => {
                self.mode = Mode::Idle;
                self.closed = true;
                info!("session closed on day {}", self.tracker.day());
                Outcome::Closed
            }
        };
        Ok(outcome)
    }

    /// One tick of auto mode: advance if the epidemic is active, otherwise go idle.
    fn tick(&mut self) -> Result<Outcome, EpiError> {
        if self.tracker.is_active() {
            Ok(Outcome::Advanced(self.step()?))
        } else {
            self.mode = Mode::Idle;
            info!("epidemic over on day {}", self.tracker.day());
            Ok(Outcome::AutoFinished {
                day: self.tracker.day(),
            })
        }
    }

    /// Waits for the next action. `None` means it is time for an auto mode tick, `Some(None)`
    /// that the operator will send nothing more.
    fn next_action(&self, actions: &Receiver<Action>) -> Option<Option<Action>> {
        match self.mode {
            Mode::Idle => Some(actions.recv().ok()),
            Mode::Auto => match actions.recv_timeout(self.cadence) {
                Ok(action) => Some(Some(action)),
                Err(RecvTimeoutError::Timeout) => None,
                // Keep running without input, at the same pace.
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(self.cadence);
                    None
                }
            },
        }
    }

    /// Runs the interactive loop until the operator closes the session or stops sending
    /// actions while the session is idle.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if a day cannot be reported or the observer fails.
    pub fn run<O: SessionObserver<R>>(
        &mut self,
        actions: &Receiver<Action>,
        observer: &mut O,
    ) -> Result<(), EpiError> {
        while !self.closed {
            let outcome = match self.next_action(actions) {
                Some(Some(action)) => self.handle(action)?,
                Some(None) => break,
                None => self.tick()?,
            };
            observer.observe(&self.tracker, &outcome)?;
        }
        Ok(())
    }

    /// Advances up to `days` days without operator input, ending early once the epidemic is
    /// over. Returns the number of days simulated.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if a day cannot be reported or the observer fails.
    pub fn run_days<O: SessionObserver<R>>(
        &mut self,
        days: u32,
        observer: &mut O,
    ) -> Result<u32, EpiError> {
        let mut simulated = 0;
        while simulated < days && self.tracker.is_active() {
            let summary = self.step()?;
            observer.observe(&self.tracker, &Outcome::Advanced(summary))?;
            simulated += 1;
        }
        if simulated < days {
            observer.observe(
                &self.tracker,
                &Outcome::AutoFinished {
                    day: self.tracker.day(),
                },
            )?;
        }
        Ok(simulated)
    }
}
