//! CLI entry point for the `wb-sim` binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

#[cfg(test)]
use tempfile as _;
use wishbone_master::{
    CompletionPolicy, ControllerConfig, MemoryTarget, SimConfig, Simulator, TargetConfig,
    WatchdogConfig,
};
use wishbone_sim::runner::run_script;
use wishbone_sim::script::parse_script;

const USAGE_TEXT: &str = "\
Usage: wb-sim <command> [options]

Commands:
  run <script>  Execute a transaction script against a memory target

Options:
  --latency <cycles>   Target acknowledge latency (default: 1)
  --timeout <cycles>   Enable a watchdog that resets after this many busy cycles
  --clear-on-complete  Drop strobe/cycle/write-enable on the completion edge
  --trace              Print controller trace events after the run
  -h, --help           Show this help message

Script commands:
  write <addr> <data>, read <addr> [== <value>], idle <cycles>,
  reset <cycles>, irq <0|1>, irq_ack <0|1>, sync <0|1>
  idle and reset accept at most 1000000 cycles; with --trace every reset
  edge records one event.

Examples:
  wb-sim run smoke.wb
  wb-sim run slow.wb --latency 20 --timeout 64
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    script: PathBuf,
    latency: Option<u32>,
    timeout: Option<u32>,
    clear_on_complete: bool,
    trace: bool,
}

impl RunArgs {
    fn sim_config(&self) -> SimConfig {
        let defaults = SimConfig::default();
        SimConfig {
            controller: ControllerConfig {
                completion: if self.clear_on_complete {
                    CompletionPolicy::ClearBusOutputs
                } else {
                    CompletionPolicy::HoldBusOutputs
                },
                tracing_enabled: self.trace,
            },
            target: self
                .latency
                .map_or(defaults.target, |ack_latency| TargetConfig { ack_latency }),
            watchdog: self
                .timeout
                .map(|timeout_cycles| WatchdogConfig { timeout_cycles }),
            ..defaults
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut script: Option<PathBuf> = None;
    let mut latency = None;
    let mut timeout = None;
    let mut clear_on_complete = false;
    let mut trace = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--clear-on-complete" {
            clear_on_complete = true;
            continue;
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--latency" || arg == "--timeout" {
            let name = arg.to_string_lossy().to_string();
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {name}"))?;
            let cycles = value
                .to_string_lossy()
                .parse::<u32>()
                .map_err(|_| format!("invalid cycle count for {name}"))?;
            if name == "--latency" {
                latency = Some(cycles);
            } else {
                timeout = Some(cycles);
            }
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if script.is_some() {
            return Err("multiple script paths provided".to_string());
        }
        script = Some(PathBuf::from(arg));
    }

    let script = script.ok_or_else(|| "missing script path".to_string())?;
    Ok(RunArgs {
        script,
        latency,
        timeout,
        clear_on_complete,
        trace,
    })
}

fn run(args: &RunArgs) -> Result<(), i32> {
    let content = match fs::read_to_string(&args.script) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.script.display());
            return Err(1);
        }
    };

    let script = match parse_script(&content) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}:{e}", args.script.display());
            return Err(1);
        }
    };

    let mut sim = match Simulator::<MemoryTarget>::with_memory(args.sim_config()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(1);
        }
    };

    log::info!(
        "running {} ({} commands)",
        args.script.display(),
        script.len()
    );
    let report = run_script(&mut sim, &script);

    for result in &report.results {
        println!("{result}");
    }

    if args.trace {
        println!();
        for event in sim.take_trace() {
            println!("trace: {event:?}");
        }
    }

    let summary = report.summary();
    println!();
    println!(
        "Run Summary: {summary} (total: {}, cycles: {})",
        summary.total, report.total_cycles
    );

    if report.all_passed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_run_command_with_all_options() {
        let result = parse_run_args(os(&[
            "smoke.wb",
            "--latency",
            "4",
            "--timeout",
            "32",
            "--clear-on-complete",
            "--trace",
        ]))
        .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                script: PathBuf::from("smoke.wb"),
                latency: Some(4),
                timeout: Some(32),
                clear_on_complete: true,
                trace: true,
            }
        );
    }

    #[test]
    fn options_map_onto_simulator_config() {
        let args = parse_run_args(os(&["s.wb", "--latency", "7", "--clear-on-complete"]))
            .expect("valid run args should parse");
        let config = args.sim_config();

        assert_eq!(config.target.ack_latency, 7);
        assert_eq!(config.controller.completion, CompletionPolicy::ClearBusOutputs);
        assert!(!config.controller.tracing_enabled);
        assert_eq!(config.watchdog, None);
        assert_eq!(config.max_wait_cycles, SimConfig::default().max_wait_cycles);
    }

    #[test]
    fn defaults_keep_stale_bus_outputs() {
        let args = parse_run_args(os(&["s.wb"])).expect("valid run args should parse");
        assert_eq!(args.sim_config(), SimConfig::default());
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(os(&["simulate"])).expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn rejects_non_numeric_latency() {
        let error = parse_run_args(os(&["s.wb", "--latency", "soon"]))
            .expect_err("latency must be numeric");
        assert!(error.contains("invalid cycle count for --latency"));
    }

    #[test]
    fn rejects_missing_timeout_value() {
        let error =
            parse_run_args(os(&["s.wb", "--timeout"])).expect_err("timeout needs a value");
        assert!(error.contains("missing value for --timeout"));
    }

    #[test]
    fn parse_run_missing_script() {
        let error = parse_run_args(std::iter::empty()).expect_err("missing script should fail");
        assert!(error.contains("missing script"));
    }
}
