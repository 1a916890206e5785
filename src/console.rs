//! The operator console: a line based command REPL and a text renderer.
//!
//! Each line typed by the operator is split like a shell command and parsed into an [`Action`]:
//!
//! ```text
//! next                      advance one day
//! auto                      advance automatically until the epidemic is over
//! stop                      leave auto mode before the next day
//! status                    day, case count and state counts
//! nodes                     every node with its status and colour
//! params                    the current parameters
//! set <parameter> <value>   change a parameter from the next day on
//! close                     end the session (also `quit` and `exit`)
//! ```
//!
//! Input is read on a helper thread and handed over as actions on a channel, so the session stays
//! responsive to `stop` while it is advancing on its own.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use clap::{Arg, Command};
use log::{debug, warn};
use rand::Rng;

use crate::disease::NodeStatus;
use crate::error::EpiError;
use crate::parameters::ParameterName;
use crate::session::{Action, Outcome, SessionObserver};
use crate::tracker::EpidemicTracker;

fn cli() -> Command {
    // strip out "Usage: " in the default template
    const MAIN_HELP_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    Command::new("repl")
        .multicall(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand_value_name("COMMAND")
        .subcommand_help_heading("EPIGRAPH CONSOLE")
        .help_template(MAIN_HELP_TEMPLATE)
        .subcommand(
            Command::new("next")
                .about("Advance the simulation by one day")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("auto")
                .about("Advance automatically until the epidemic is over")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("stop")
                .about("Stop advancing automatically")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("status")
                .about("Show the day, the case count and the state counts")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("nodes")
                .about("List every node with its status")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("params")
                .about("Show the current parameters")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("set")
                .about("Change a parameter from the next day on")
                .arg(
                    Arg::new("parameter")
                        .help("branching-factor (r0), day-to-immunity (dti), immunity-period, death-probability or reexposure")
                        .required(true)
                        .value_parser(|name: &str| {
                            ParameterName::from_str(name)
                                .map_err(|_| format!("unknown parameter `{name}`"))
                        }),
                )
                .arg(Arg::new("value").required(true))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("close")
                .alias("exit")
                .alias("quit")
                .about("End the session")
                .help_template(COMMAND_TEMPLATE),
        )
}

/// Parses one console line.
///
/// # Errors
///
/// Returns `EpiError::CommandError` with the message to show the operator, which for `help` is
/// the help text itself.
pub fn parse_action(line: &str) -> Result<Action, EpiError> {
    let args = shlex::split(line)
        .ok_or_else(|| EpiError::CommandError("error: Invalid quoting".to_string()))?;
    let matches = cli()
        .try_get_matches_from(args)
        .map_err(|e| EpiError::CommandError(e.to_string()))?;
    let action = match matches.subcommand() {
        Some(("next", _)) => Action::Next,
        Some(("auto", _)) => Action::Auto,
        Some(("stop", _)) => Action::Stop,
        Some(("status", _)) => Action::Status,
        Some(("nodes", _)) => Action::Nodes,
        Some(("params", _)) => Action::Params,
        Some(("set", matches)) => {
            let name = matches
                .get_one::<ParameterName>("parameter")
                .copied()
                .ok_or_else(|| EpiError::CommandError("error: missing parameter".to_string()))?;
            let value = matches
                .get_one::<String>("value")
                .cloned()
                .ok_or_else(|| EpiError::CommandError("error: missing value".to_string()))?;
            Action::Set(name, value)
        }
        Some(("close", _)) => Action::Close,
        Some((name, _)) => {
            return Err(EpiError::CommandError(format!("error: unknown command `{name}`")))
        }
        None => return Err(EpiError::CommandError("error: missing command".to_string())),
    };
    Ok(action)
}

/// Reads lines from `input` until it is exhausted, the operator closes the session or the session
/// hangs up. Lines that do not parse are answered on `output`.
///
/// # Errors
///
/// Returns an `EpiError` if `input` cannot be read or `output` cannot be written.
pub fn read_actions<B: BufRead, W: Write>(
    input: B,
    mut output: W,
    actions: &Sender<Action>,
) -> Result<(), EpiError> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_action(line) {
            Ok(action) => {
                let closing = action == Action::Close;
                if actions.send(action).is_err() {
                    debug!("session ended, no longer reading input");
                    break;
                }
                if closing {
                    break;
                }
            }
            Err(err) => {
                write!(output, "{err}")?;
                if !err.to_string().ends_with('\n') {
                    writeln!(output)?;
                }
                output.flush()?;
            }
        }
    }
    Ok(())
}

/// Reads operator input from stdin on a helper thread.
pub fn spawn_stdin_reader(actions: Sender<Action>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        if let Err(err) = read_actions(stdin.lock(), io::stdout(), &actions) {
            warn!("console input failed: {err}");
        }
    })
}

/// Presents session outcomes as text.
pub struct TextRenderer<W: Write> {
    output: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(output: W) -> Self {
        TextRenderer { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn render_day<R: Rng>(&mut self, tracker: &EpidemicTracker<R>) -> io::Result<()> {
        writeln!(self.output, "Day: {}", tracker.day())?;
        writeln!(
            self.output,
            "Cases: {}/{}",
            tracker.cases(),
            tracker.population()
        )
    }

    fn render_status<R: Rng>(&mut self, tracker: &EpidemicTracker<R>) -> io::Result<()> {
        self.render_day(tracker)?;
        let counts = tracker.counts();
        writeln!(
            self.output,
            "Susceptible: {} Infected: {} Immune: {} Dead: {}",
            counts.susceptible, counts.infected, counts.immune, counts.dead
        )?;
        let activity = if tracker.is_active() { "active" } else { "over" };
        writeln!(self.output, "Epidemic: {activity}")
    }

    fn render_nodes<R: Rng>(&mut self, tracker: &EpidemicTracker<R>) -> io::Result<()> {
        for (name, state) in tracker.states() {
            let status: NodeStatus = state.status();
            writeln!(self.output, "{name} {status} {}", status.color())?;
        }
        Ok(())
    }

    fn render_params<R: Rng>(&mut self, tracker: &EpidemicTracker<R>) -> io::Result<()> {
        let parameters = tracker.parameters();
        writeln!(
            self.output,
            "{}: {}",
            ParameterName::BranchingFactor,
            parameters.branching_factor
        )?;
        writeln!(
            self.output,
            "{}: {}",
            ParameterName::DayToImmunity,
            parameters.day_to_immunity
        )?;
        writeln!(
            self.output,
            "{}: {}",
            ParameterName::ImmunityPeriod,
            parameters.immunity_period
        )?;
        writeln!(
            self.output,
            "{}: {}",
            ParameterName::DeathProbability,
            parameters.death_probability
        )?;
        writeln!(
            self.output,
            "{}: {}",
            ParameterName::Reexposure,
            parameters.reexposure
        )
    }

    fn render<R: Rng>(&mut self, tracker: &EpidemicTracker<R>, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Advanced(_) => self.render_day(tracker)?,
            Outcome::AutoStarted => writeln!(self.output, "Running automatically")?,
            Outcome::AutoStopped => {
                writeln!(self.output, "Stopped on day {}", tracker.day())?;
            }
            Outcome::AutoFinished { day } => {
                writeln!(self.output, "The epidemic is over on day {day}")?;
            }
            Outcome::Status => self.render_status(tracker)?,
            Outcome::Nodes => self.render_nodes(tracker)?,
            Outcome::Params => self.render_params(tracker)?,
            Outcome::ParameterSet(name) => {
                writeln!(self.output, "{name} takes effect on day {}", tracker.day() + 1)?;
            }
            Outcome::Rejected(reason) => writeln!(self.output, "{reason}")?,
            Outcome::Closed => writeln!(self.output, "Closing on day {}", tracker.day())?,
        }
        self.output.flush()
    }
}

impl<W: Write, R: Rng> SessionObserver<R> for TextRenderer<W> {
    fn observe(&mut self, tracker: &EpidemicTracker<R>, outcome: &Outcome) -> Result<(), EpiError> {
        self.render(tracker, outcome)?;
        Ok(())
    }
}
