//! Stateless per-machine / per-service constraint predicates and cost
//! contributions.
//!
//! Every function here is pure: given a current assignment and/or usage
//! vectors, it answers a single question without touching any other state.
//! The solver calls these on the hot path to filter candidate swaps.

use std::collections::HashSet;

use crate::model::{Assignment, Instance, MachineId, ResourceId, ServiceId};

/// Returns true if every resource's usage on `machine` is within capacity.
pub fn check_machine_capacity(instance: &Instance, machine: MachineId, usage: &[i64]) -> bool {
    for r in 0..instance.nb_resources() {
        if usage[r] > instance.machine(machine).capacity(ResourceId::new(r)) {
            return false;
        }
    }
    true
}

/// Returns true if no two processes of `service` share a machine.
pub fn check_service_conflict(instance: &Instance, assignment: &Assignment, service: ServiceId) -> bool {
    let mut seen = HashSet::new();
    for &process in instance.service(service).processes() {
        let machine = assignment[process.as_usize()];
        if !seen.insert(machine) {
            return false;
        }
    }
    true
}

/// Returns true if `service`'s processes occupy at least `spread_min` distinct locations.
pub fn check_service_spread(instance: &Instance, assignment: &Assignment, service: ServiceId) -> bool {
    let mut locations = HashSet::new();
    for &process in instance.service(service).processes() {
        let machine = assignment[process.as_usize()];
        locations.insert(instance.machine_location(machine));
    }
    locations.len() as i64 >= instance.service(service).spread_min()
}

/// Returns true if every process of `service` shares a neighbourhood with some
/// process of each service it depends on.
pub fn check_service_dependency(instance: &Instance, assignment: &Assignment, service: ServiceId) -> bool {
    for &dependency in instance.service(service).dependencies() {
        let dependency_neighbourhoods: HashSet<_> = instance
            .service(dependency)
            .processes()
            .iter()
            .map(|&p| instance.machine_neighbourhood(assignment[p.as_usize()]))
            .collect();

        for &process in instance.service(service).processes() {
            let neighbourhood = instance.machine_neighbourhood(assignment[process.as_usize()]);
            if !dependency_neighbourhoods.contains(&neighbourhood) {
                return false;
            }
        }
    }
    true
}

/// Returns true if `machine`'s transient-resource usage, including the
/// requirement of processes that started there and have since moved away,
/// stays within capacity.
pub fn check_machine_transient(
    instance: &Instance,
    assignment: &Assignment,
    machine: MachineId,
    usage: &[i64],
) -> bool {
    for &resource in instance.transient_resources() {
        let mut transient_usage = 0;
        for &process in instance.machine_initial_processes(machine) {
            if assignment[process.as_usize()] != machine {
                transient_usage += instance.process(process).requirement(resource);
            }
        }

        if usage[resource.as_usize()] + transient_usage > instance.machine(machine).capacity(resource) {
            return false;
        }
    }
    true
}

/// Fast-path conflict check for a single candidate swap: only the two
/// affected services are examined, not the whole instance.
pub fn check_swap_conflict(
    instance: &Instance,
    assignment: &Assignment,
    process1: crate::model::ProcessId,
    process2: crate::model::ProcessId,
) -> bool {
    let service1 = instance.process_service(process1);
    let service2 = instance.process_service(process2);

    let ok_for = |checked: crate::model::ProcessId, service: ServiceId| -> bool {
        let machine = assignment[checked.as_usize()];
        instance
            .service(service)
            .processes()
            .iter()
            .all(|&other| other == checked || assignment[other.as_usize()] != machine)
    };

    ok_for(process1, service1) && ok_for(process2, service2)
}

/// Weighted overuse of `machine`'s resources above their safety limits.
pub fn machine_load_cost(instance: &Instance, machine: MachineId, usage: &[i64]) -> i64 {
    let mut cost = 0;
    for r in 0..instance.nb_resources() {
        let resource = ResourceId::new(r);
        let overuse = usage[r] - instance.machine(machine).safety_limit(resource);
        if overuse > 0 {
            cost += overuse * instance.resource(resource).load_cost_weight;
        }
    }
    cost
}

/// Weighted balance-objective penalty for `machine`.
pub fn machine_balance_cost(instance: &Instance, machine: MachineId, usage: &[i64]) -> i64 {
    let mut cost = 0;
    for id in instance.balance_objective_ids() {
        let objective = instance.balance_objective(id);
        let r1 = objective.first_resource();
        let r2 = objective.second_resource();

        let free1 = instance.machine(machine).capacity(r1) - usage[r1.as_usize()];
        let free2 = instance.machine(machine).capacity(r2) - usage[r2.as_usize()];

        let unweighted = objective.target_ratio() * free1 - free2;
        if unweighted > 0 {
            cost += objective.weight() * unweighted;
        }
    }
    cost
}
