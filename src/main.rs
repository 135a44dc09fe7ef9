//! Command-line entry point: `solve` runs the local search against an
//! instance and initial assignment, `check` validates and scores a
//! candidate assignment without searching.

use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use mrp_solver::check::check_solution;
use mrp_solver::config::{init_logging, Config};
use mrp_solver::parse::{parse_assignment, parse_instance, write_assignment};
use mrp_solver::solve::{solve, Deadline};

#[derive(Parser)]
#[command(name = "mrp-solver", about = "A local-search solver for the Machine Reassignment Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Searches for an improved assignment and writes it to `output`.
    Solve {
        instance: String,
        initial_assignment: String,
        output: String,
        /// Overrides the search deadline (seconds); falls back to MRP_DEADLINE_SECS, then 1800.
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Validates `candidate` against `instance` and reports its cost breakdown.
    Check {
        instance: String,
        initial_assignment: String,
        candidate: String,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { instance, initial_assignment, output, deadline_secs } => {
            run_solve(&instance, &initial_assignment, &output, deadline_secs)
        }
        Commands::Check { instance, initial_assignment, candidate } => {
            run_check(&instance, &initial_assignment, &candidate)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_solve(instance_path: &str, initial_assignment_path: &str, output_path: &str, deadline_secs: Option<u64>) -> Result<(), String> {
    let config = Config::resolve(deadline_secs);

    let initial_assignment = read_assignment(initial_assignment_path)?;
    let instance = read_instance(instance_path, initial_assignment)?;
    let before = check_solution(&instance, instance.initial_assignment());

    let result = solve(&instance, Deadline::from_now(config.deadline));

    fs::write(output_path, write_assignment(&result)).map_err(|e| format!("writing {output_path}: {e}"))?;

    let after = check_solution(&instance, &result);
    info!(old_cost = before.costs.total_cost, new_cost = after.costs.total_cost, "search complete");
    println!("valid: {}", after.is_valid);
    println!("total cost: {}", after.costs.total_cost);

    Ok(())
}

fn run_check(instance_path: &str, initial_assignment_path: &str, candidate_path: &str) -> Result<(), String> {
    let initial_assignment = read_assignment(initial_assignment_path)?;
    let instance = read_instance(instance_path, initial_assignment)?;
    let candidate = read_assignment(candidate_path)?;

    let output = check_solution(&instance, &candidate);
    report_violation(output.violations.capacity, "capacity");
    report_violation(output.violations.conflict, "conflict");
    report_violation(output.violations.spread, "spread");
    report_violation(output.violations.dependency, "dependency");
    report_violation(output.violations.transient, "transient");

    info!(valid = output.is_valid, total_cost = output.costs.total_cost, "check complete");
    println!("valid: {}", output.is_valid);
    println!("load cost: {}", output.costs.load_cost);
    println!("balance cost: {}", output.costs.balance_cost);
    println!("process move cost: {}", output.costs.process_move_cost);
    println!("service move cost: {}", output.costs.service_move_cost);
    println!("machine move cost: {}", output.costs.machine_move_cost);
    println!("total cost: {}", output.costs.total_cost);

    Ok(())
}

/// Reports one constraint kind's violation, if any, at warn level and to
/// stdout, without aborting the rest of the check.
fn report_violation(ok: bool, kind: &str) {
    if !ok {
        warn!(kind, "constraint violated");
        println!("violation: {kind}");
    }
}

fn read_instance(path: &str, initial_assignment: mrp_solver::model::Assignment) -> Result<mrp_solver::model::Instance, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {path}: {e}"))?;
    parse_instance(&text, initial_assignment).map_err(|e| format!("parsing {path}: {e}"))
}

fn read_assignment(path: &str) -> Result<mrp_solver::model::Assignment, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {path}: {e}"))?;
    parse_assignment(&text).map_err(|e| format!("parsing {path}: {e}"))
}
