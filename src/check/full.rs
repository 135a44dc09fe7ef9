//! Full-solution checker: the correctness oracle.
//!
//! Given a complete assignment, recomputes usage from scratch and
//! evaluates every constraint and every cost term. Used to bootstrap the
//! solver's initial cost and as the ground-truth reference in tests.

use rayon::prelude::*;

use crate::check::micro;
use crate::model::{Assignment, Instance};

/// The five cost terms and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Costs {
    pub load_cost: i64,
    pub balance_cost: i64,
    pub process_move_cost: i64,
    pub service_move_cost: i64,
    pub machine_move_cost: i64,
    pub total_cost: i64,
}

/// Per-kind constraint validity, so a caller can report exactly which kind
/// of constraint failed rather than a single collapsed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violations {
    pub capacity: bool,
    pub conflict: bool,
    pub spread: bool,
    pub dependency: bool,
    pub transient: bool,
}

impl Violations {
    pub fn is_valid(&self) -> bool {
        self.capacity && self.conflict && self.spread && self.dependency && self.transient
    }
}

/// Validity and cost breakdown for a complete assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerOutput {
    pub is_valid: bool,
    pub violations: Violations,
    pub costs: Costs,
}

/// Recomputes usage from `assignment` and evaluates every constraint and
/// cost term. Costs are always computed, even when the assignment is
/// infeasible, so a caller can diagnose a bad solution's cost as well as
/// its validity.
pub fn check_solution(instance: &Instance, assignment: &Assignment) -> CheckerOutput {
    let usage = instance.usage_for(assignment);

    let (capacity, (conflict, (spread, (dependency, transient)))) = rayon::join(
        || check_capacity(instance, &usage),
        || {
            rayon::join(
                || check_conflict(instance, assignment),
                || {
                    rayon::join(
                        || check_spread(instance, assignment),
                        || {
                            rayon::join(
                                || check_dependency(instance, assignment),
                                || check_transient(instance, assignment, &usage),
                            )
                        },
                    )
                },
            )
        },
    );

    let violations = Violations { capacity, conflict, spread, dependency, transient };
    let costs = calculate_solution_costs(instance, assignment, &usage);

    CheckerOutput { is_valid: violations.is_valid(), violations, costs }
}

/// Computes the cost breakdown for `assignment`, given its precomputed usage.
pub fn calculate_solution_costs(instance: &Instance, assignment: &Assignment, usage: &[Vec<i64>]) -> Costs {
    let (load_cost, (balance_cost, (process_move_cost, (service_move_cost, machine_move_cost)))) = rayon::join(
        || calculate_load_cost(instance, usage),
        || {
            rayon::join(
                || calculate_balance_cost(instance, usage),
                || {
                    rayon::join(
                        || calculate_process_move_cost(instance, assignment),
                        || {
                            rayon::join(
                                || calculate_service_move_cost(instance, assignment),
                                || calculate_machine_move_cost(instance, assignment),
                            )
                        },
                    )
                },
            )
        },
    );

    let total_cost = load_cost + balance_cost + process_move_cost + service_move_cost + machine_move_cost;

    Costs {
        load_cost,
        balance_cost,
        process_move_cost,
        service_move_cost,
        machine_move_cost,
        total_cost,
    }
}

fn check_capacity(instance: &Instance, usage: &[Vec<i64>]) -> bool {
    instance
        .machine_ids()
        .all(|m| micro::check_machine_capacity(instance, m, &usage[m.as_usize()]))
}

fn check_conflict(instance: &Instance, assignment: &Assignment) -> bool {
    instance
        .service_ids()
        .all(|s| micro::check_service_conflict(instance, assignment, s))
}

fn check_spread(instance: &Instance, assignment: &Assignment) -> bool {
    instance
        .service_ids()
        .all(|s| micro::check_service_spread(instance, assignment, s))
}

fn check_dependency(instance: &Instance, assignment: &Assignment) -> bool {
    instance
        .service_ids()
        .all(|s| micro::check_service_dependency(instance, assignment, s))
}

fn check_transient(instance: &Instance, assignment: &Assignment, usage: &[Vec<i64>]) -> bool {
    instance
        .machine_ids()
        .all(|m| micro::check_machine_transient(instance, assignment, m, &usage[m.as_usize()]))
}

fn calculate_load_cost(instance: &Instance, usage: &[Vec<i64>]) -> i64 {
    instance
        .machine_ids()
        .map(|m| micro::machine_load_cost(instance, m, &usage[m.as_usize()]))
        .sum()
}

fn calculate_balance_cost(instance: &Instance, usage: &[Vec<i64>]) -> i64 {
    instance
        .machine_ids()
        .map(|m| micro::machine_balance_cost(instance, m, &usage[m.as_usize()]))
        .sum()
}

fn calculate_process_move_cost(instance: &Instance, assignment: &Assignment) -> i64 {
    let unweighted: i64 = instance
        .process_ids()
        .filter(|&p| instance.initial_machine_of(p) != assignment[p.as_usize()])
        .map(|p| instance.process(p).move_cost())
        .sum();
    unweighted * instance.weights().process
}

fn calculate_service_move_cost(instance: &Instance, assignment: &Assignment) -> i64 {
    let max_moved = instance
        .service_ids()
        .map(|s| {
            instance
                .service(s)
                .processes()
                .iter()
                .filter(|&&p| instance.initial_machine_of(p) != assignment[p.as_usize()])
                .count() as i64
        })
        .max()
        .unwrap_or(0);
    max_moved * instance.weights().service
}

fn calculate_machine_move_cost(instance: &Instance, assignment: &Assignment) -> i64 {
    let unweighted: i64 = instance
        .process_ids()
        .map(|p| {
            let from = instance.initial_machine_of(p);
            let to = assignment[p.as_usize()];
            instance.machine(from).move_cost_to(to)
        })
        .sum();
    unweighted * instance.weights().machine
}
