use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::channel;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::{info, LevelFilter};

use crate::console::{spawn_stdin_reader, TextRenderer};
use crate::error::EpiError;
use crate::loader::load_graph;
use crate::log::{apply_log_spec, set_log_level, LogSpec};
use crate::parameters::{load_parameters, Parameters};
use crate::random::RngStreams;
use crate::report::{DailyReport, ReportOptions};
use crate::session::{Session, DEFAULT_CADENCE};
use crate::tracker::EpidemicTracker;

/// Default cli arguments for the epigraph runner
#[derive(Parser, Debug)]
#[command(name = "epigraph", version, about = "Simulate an epidemic spreading over a social graph")]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Path to the edge list CSV (`source,target` header)
    #[arg(short, long)]
    pub edges: PathBuf,

    /// Name of the node infected on day 0
    #[arg(long)]
    pub root: String,

    /// Add the root as an isolated node when it is not in the edge list
    #[arg(long)]
    pub isolated_root: bool,

    /// Optional path for a parameters config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for the daily counts report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Optional prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Run headless for at most this many days, then exit
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Time between days in auto mode, e.g. `250ms` or `2s`
    #[arg(long, value_parser = humantime::parse_duration, default_value = "500ms")]
    pub cadence: Duration,

    /// Log level spec, e.g. `info` or `epigraph::tracker=trace,warn`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl BaseArgs {
    /// Arguments for `edges` and `root` with every other option at its default.
    #[must_use]
    pub fn new(edges: PathBuf, root: &str) -> Self {
        BaseArgs {
            random_seed: 0,
            edges,
            root: root.to_string(),
            isolated_root: false,
            config: None,
            output_dir: None,
            file_prefix: String::new(),
            force_overwrite: false,
            days: None,
            cadence: DEFAULT_CADENCE,
            log_level: None,
            verbose: 0,
        }
    }
}

fn setup_logging(args: &BaseArgs) -> Result<(), EpiError> {
    if let Some(spec) = &args.log_level {
        apply_log_spec(&LogSpec::from_str(spec)?);
    } else if args.verbose > 0 {
        let level = match args.verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        set_log_level(level);
    }
    Ok(())
}

/// Builds the session described by `args`: graph, parameters, random streams and report.
///
/// # Errors
///
/// Returns an `EpiError` if an input file cannot be loaded, the root is unknown and isolated
/// roots are not allowed, or the report cannot be created.
pub fn build_session(args: &BaseArgs) -> Result<Session, EpiError> {
    let graph = load_graph(&args.edges)?;

    // Optionally load parameters from a file
    let parameters = match &args.config {
        Some(path) => load_parameters(path)?,
        None => Parameters::default(),
    };
    info!("parameters: {parameters:?}");

    let rng = RngStreams::from_seed(args.random_seed);
    let tracker = if args.isolated_root {
        EpidemicTracker::new(graph, &args.root, parameters, rng)
    } else {
        EpidemicTracker::with_existing_root(graph, &args.root, parameters, rng)?
    };
    let session = Session::new(tracker).with_cadence(args.cadence);

    // Optionally write the daily counts report
    match &args.output_dir {
        Some(output_dir) => {
            let mut options = ReportOptions::default();
            options
                .directory(output_dir.clone())
                .file_prefix(args.file_prefix.clone())
                .overwrite(args.force_overwrite);
            session.with_report(DailyReport::create(&options)?)
        }
        None => Ok(session),
    }
}

/// Runs a simulation with the given arguments: headless when `days` is set, otherwise from
/// console commands read on stdin. Returns the finished session.
///
/// # Errors
///
/// Returns an `EpiError` if setup fails or a day cannot be reported or rendered.
pub fn run_with_args(args: BaseArgs) -> Result<Session, EpiError> {
    setup_logging(&args)?;
    let mut session = build_session(&args)?;
    let mut renderer = TextRenderer::new(io::stdout());

    if let Some(days) = args.days {
        let simulated = session.run_days(days, &mut renderer)?;
        info!("simulated {simulated} days");
    } else {
        println!("Type `help` for the list of commands.");
        let (sender, receiver) = channel();
        // The reader thread ends on its own once stdin closes or the operator closes the session.
        let _reader = spawn_stdin_reader(sender);
        session.run(&receiver, &mut renderer)?;
    }
    Ok(session)
}

/// Parses the command line and runs the simulation.
///
/// # Errors
///
/// Returns an error if argument parsing or the simulation fails
pub fn run() -> Result<Session, EpiError> {
    run_with_args(BaseArgs::parse())
}
