use assert_cmd::Command;
use tempfile::tempdir;

fn epigraph() -> Command {
    let mut command = Command::cargo_bin("epigraph").unwrap();
    command.current_dir(env!("CARGO_MANIFEST_DIR"));
    command
}

fn path_args() -> [&'static str; 6] {
    [
        "--edges",
        "tests/data/path_edges.csv",
        "--root",
        "A",
        "--config",
        "tests/data/path_parameters.json",
    ]
}

fn stdout_of(command: &mut Command) -> String {
    let output = command.output().unwrap();
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn headless_run_ends_with_the_epidemic() {
    let stdout = stdout_of(epigraph().args(path_args()).args(["--days", "100"]));
    assert!(stdout.starts_with("Day: 1\nCases: 2/4\n"));
    assert!(stdout.contains("Day: 6\nCases: 0/4\n"));
    assert!(!stdout.contains("Day: 7"));
    assert!(stdout.ends_with("The epidemic is over on day 6\n"));
}

#[test]
fn headless_run_is_bounded_by_days() {
    let stdout = stdout_of(epigraph().args(path_args()).args(["--days", "2"]));
    assert_eq!(stdout, "Day: 1\nCases: 2/4\nDay: 2\nCases: 3/4\n");
}

#[test]
fn console_commands_drive_the_simulation() {
    let stdout = stdout_of(
        epigraph()
            .args(path_args())
            .write_stdin("next\nstatus\nnodes\nclose\n"),
    );
    assert!(stdout.contains("Day: 1\nCases: 2/4\n"));
    assert!(stdout.contains("Susceptible: 2 Infected: 2 Immune: 0 Dead: 0"));
    assert!(stdout.contains("B infected #FF4348"));
    assert!(stdout.ends_with("Closing on day 1\n"));
}

#[test]
fn auto_mode_runs_until_the_epidemic_is_over() {
    let stdout = stdout_of(
        epigraph()
            .args(path_args())
            .args(["--cadence", "1ms"])
            .write_stdin("auto\n"),
    );
    assert!(stdout.contains("Running automatically"));
    assert!(stdout.contains("The epidemic is over on day 6"));
}

#[test]
fn set_from_the_console() {
    let stdout = stdout_of(
        epigraph()
            .args(path_args())
            .write_stdin("set r0 0\nparams\nset r0 lots\nquit\n"),
    );
    assert!(stdout.contains("branching-factor takes effect on day 1"));
    assert!(stdout.contains("branching-factor: 0"));
    assert!(stdout.contains("invalid value `lots` for branching-factor"));
}

#[test]
fn unknown_root_fails() {
    epigraph()
        .args(["--edges", "tests/data/path_edges.csv", "--root", "Z"])
        .args(["--days", "1"])
        .assert()
        .failure();
}

#[test]
fn isolated_root_is_added() {
    let stdout = stdout_of(
        epigraph()
            .args(["--edges", "tests/data/path_edges.csv", "--root", "Z"])
            .args(["--isolated-root", "--days", "1"]),
    );
    assert_eq!(stdout, "Day: 1\nCases: 1/5\n");
}

#[test]
fn report_is_written_to_the_output_dir() {
    let temp_dir = tempdir().unwrap();
    epigraph()
        .args(path_args())
        .args(["--days", "3", "--output-dir"])
        .arg(temp_dir.path())
        .assert()
        .success();
    let report = std::fs::read_to_string(temp_dir.path().join("daily_counts.csv")).unwrap();
    let mut lines = report.lines();
    assert_eq!(
        lines.next(),
        Some("day,susceptible,infected,immune,dead,cases,population,new_infections,new_deaths,new_immunities,reversions")
    );
    assert_eq!(lines.next(), Some("0,3,1,0,0,1,4,0,0,0,0"));
    assert_eq!(lines.next(), Some("1,2,2,0,0,2,4,1,0,0,0"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn log_level_enables_module_logging() {
    let stdout = stdout_of(
        epigraph()
            .args(path_args())
            .args(["--days", "1", "--log-level", "epigraph::tracker=trace"]),
    );
    assert!(stdout.contains("Logging enabled for epigraph::tracker at level TRACE"));
    assert!(stdout.contains("epigraph::tracker - B infected on day 1"));
}

#[test]
fn clamped_config_values_are_used() {
    let stdout = stdout_of(
        epigraph()
            .args(["--edges", "tests/data/village_edges.csv", "--root", "ada"])
            .args(["--config", "tests/data/clamped_parameters.json"])
            .write_stdin("params\nclose\n"),
    );
    assert!(stdout.contains("branching-factor: 2"));
    assert!(stdout.contains("death-probability: 1"));
}
