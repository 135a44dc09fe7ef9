//! Feasibility check for a single candidate swap.
//!
//! Mirrors the reference solver's `isSwapValid`: a swap is valid only if it
//! keeps every constraint satisfied for the two machines and the one or two
//! services it touches. Everything else in the instance is unaffected by a
//! swap and is not re-examined.

use crate::check::micro;
use crate::model::{Instance, ResourceId};
use crate::solve::state::{SolverState, Swap};

/// Checks whether `swap` may be applied to `state` without violating any
/// constraint. Does not mutate `state`; callers apply the swap separately
/// once it is known to be valid.
pub fn is_swap_valid(instance: &Instance, state: &SolverState, swap: Swap) -> bool {
    let p1 = swap.process1;
    let p2 = swap.process2;

    if p1 == p2 {
        return false;
    }

    let m1 = state.machine_of(p1);
    let m2 = state.machine_of(p2);
    if m1 == m2 {
        return false;
    }

    let s1 = instance.process_service(p1);
    let s2 = instance.process_service(p2);
    let intra_service = s1 == s2;

    let hypothetical_usage_m1 = swapped_usage(instance, state.usage(m1), p1, p2);
    let hypothetical_usage_m2 = swapped_usage(instance, state.usage(m2), p2, p1);

    if !micro::check_machine_capacity(instance, m1, &hypothetical_usage_m1)
        || !micro::check_machine_capacity(instance, m2, &hypothetical_usage_m2)
    {
        return false;
    }

    let mut hypothetical_assignment = state.assignment().clone();
    hypothetical_assignment[p1.as_usize()] = m2;
    hypothetical_assignment[p2.as_usize()] = m1;

    if !micro::check_machine_transient(instance, &hypothetical_assignment, m1, &hypothetical_usage_m1)
        || !micro::check_machine_transient(instance, &hypothetical_assignment, m2, &hypothetical_usage_m2)
    {
        return false;
    }

    if !intra_service {
        if !micro::check_service_conflict(instance, &hypothetical_assignment, s1)
            || !micro::check_service_conflict(instance, &hypothetical_assignment, s2)
        {
            return false;
        }
    }

    if !micro::check_service_spread(instance, &hypothetical_assignment, s1)
        || !micro::check_service_spread(instance, &hypothetical_assignment, s2)
    {
        return false;
    }

    if !micro::check_service_dependency(instance, &hypothetical_assignment, s1)
        || !micro::check_service_dependency(instance, &hypothetical_assignment, s2)
    {
        return false;
    }

    // Moving s1's or s2's processes can also change the neighbourhood set
    // other services rely on through a dependency edge onto s1 or s2, so
    // every such dependent service must be re-checked too.
    for dependent in services_depending_on(instance, s1, s2) {
        if !micro::check_service_dependency(instance, &hypothetical_assignment, dependent) {
            return false;
        }
    }

    true
}

/// Every service (other than `s1`/`s2` themselves) whose dependency list
/// names `s1` or `s2`.
fn services_depending_on(
    instance: &Instance,
    s1: crate::model::ServiceId,
    s2: crate::model::ServiceId,
) -> Vec<crate::model::ServiceId> {
    instance
        .service_ids()
        .filter(|&service| service != s1 && service != s2)
        .filter(|&service| {
            let dependencies = instance.service(service).dependencies();
            dependencies.contains(&s1) || dependencies.contains(&s2)
        })
        .collect()
}

/// Usage on a machine after process `leaving` is replaced by process `arriving`.
fn swapped_usage(instance: &Instance, current: &[i64], leaving: crate::model::ProcessId, arriving: crate::model::ProcessId) -> Vec<i64> {
    let mut usage = current.to_vec();
    for r in 0..instance.nb_resources() {
        let resource = ResourceId::new(r);
        usage[r] += instance.process(arriving).requirement(resource) - instance.process(leaving).requirement(resource);
    }
    usage
}
