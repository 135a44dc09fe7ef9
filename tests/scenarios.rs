//! End-to-end scenarios exercising the solver and checkers together through
//! the public library API, without going through the CLI or file formats.

use std::time::{Duration, Instant};

use mrp_solver::check::check_solution;
use mrp_solver::model::{
    BalanceObjective, Instance, LocationId, Machine, MachineId, MoveWeights, NeighbourhoodId, Process,
    ProcessId, Resource, ResourceId, Service, ServiceId,
};
use mrp_solver::solve::{solve, Deadline};

#[test]
fn colocated_processes_cannot_be_separated_by_a_swap_alone() {
    let resources = vec![Resource::new(false, 1)];
    let machines = vec![
        Machine::new(LocationId::new(0), NeighbourhoodId::new(0), vec![10], vec![5], vec![0, 0]),
        Machine::new(LocationId::new(1), NeighbourhoodId::new(1), vec![10], vec![5], vec![0, 0]),
    ];
    let processes = vec![
        Process::new(ServiceId::new(0), 1, vec![6]),
        Process::new(ServiceId::new(1), 1, vec![4]),
    ];
    let mut services = vec![Service::new(1, vec![]), Service::new(1, vec![])];
    services[0].add_process(ProcessId::new(0));
    services[1].add_process(ProcessId::new(1));

    let instance = Instance::new(
        resources,
        machines,
        processes,
        services,
        vec![],
        MoveWeights { process: 1, service: 1, machine: 1 },
        2,
        2,
        vec![MachineId::new(0), MachineId::new(0)],
    );

    let before = check_solution(&instance, instance.initial_assignment());
    let result = solve(&instance, Deadline::from_now(Duration::from_millis(100)));

    assert_eq!(&result, instance.initial_assignment());
    let after = check_solution(&instance, &result);
    assert_eq!(after.costs.total_cost, before.costs.total_cost);
}

#[test]
fn spread_requirement_stays_satisfied_no_matter_which_machine_is_explored() {
    let resources = vec![Resource::new(false, 1)];
    let machines = vec![
        Machine::new(LocationId::new(0), NeighbourhoodId::new(0), vec![10], vec![10], vec![0, 0]),
        Machine::new(LocationId::new(1), NeighbourhoodId::new(1), vec![10], vec![10], vec![0, 0]),
    ];
    let processes = vec![
        Process::new(ServiceId::new(0), 1, vec![1]),
        Process::new(ServiceId::new(0), 1, vec![1]),
    ];
    let mut services = vec![Service::new(2, vec![])];
    services[0].add_process(ProcessId::new(0));
    services[0].add_process(ProcessId::new(1));

    let instance = Instance::new(
        resources,
        machines,
        processes,
        services,
        vec![],
        MoveWeights { process: 1, service: 1, machine: 1 },
        2,
        2,
        vec![MachineId::new(0), MachineId::new(1)],
    );

    let result = solve(&instance, Deadline::from_now(Duration::from_millis(100)));
    let output = check_solution(&instance, &result);
    assert!(output.is_valid);
}

#[test]
fn intra_service_swap_keeps_the_service_conflict_free() {
    let resources = vec![Resource::new(false, 1)];
    let machines = vec![
        Machine::new(LocationId::new(0), NeighbourhoodId::new(0), vec![10], vec![10], vec![0, 0]),
        Machine::new(LocationId::new(1), NeighbourhoodId::new(1), vec![10], vec![10], vec![0, 0]),
    ];
    let processes = vec![
        Process::new(ServiceId::new(0), 1, vec![3]),
        Process::new(ServiceId::new(0), 1, vec![7]),
    ];
    let mut services = vec![Service::new(1, vec![])];
    services[0].add_process(ProcessId::new(0));
    services[0].add_process(ProcessId::new(1));

    let instance = Instance::new(
        resources,
        machines,
        processes,
        services,
        vec![],
        MoveWeights { process: 1, service: 1, machine: 1 },
        2,
        2,
        vec![MachineId::new(0), MachineId::new(1)],
    );

    let result = solve(&instance, Deadline::from_now(Duration::from_millis(100)));
    let output = check_solution(&instance, &result);
    assert!(output.is_valid);
}

#[test]
fn a_short_deadline_on_a_large_instance_still_returns_promptly() {
    let nb_processes = 2000;
    let nb_machines = 200;

    let resources = vec![Resource::new(false, 1), Resource::new(true, 1)];
    let machines: Vec<Machine> = (0..nb_machines)
        .map(|m| {
            Machine::new(
                LocationId::new(m % 20),
                NeighbourhoodId::new(m % 10),
                vec![100, 100],
                vec![80, 80],
                vec![1; nb_machines],
            )
        })
        .collect();

    let nb_services = 200;
    let mut services: Vec<Service> = (0..nb_services).map(|_| Service::new(1, vec![])).collect();
    let processes: Vec<Process> = (0..nb_processes)
        .map(|p| {
            let service = ServiceId::new(p % nb_services);
            services[service.as_usize()].add_process(ProcessId::new(p));
            Process::new(service, 1, vec![2, 1])
        })
        .collect();

    let balance_objectives = vec![BalanceObjective::new(ResourceId::new(0), ResourceId::new(1), 1, 1)];
    let initial_assignment = (0..nb_processes).map(|p| MachineId::new(p % nb_machines)).collect();

    let instance = Instance::new(
        resources,
        machines,
        processes,
        services,
        balance_objectives,
        MoveWeights { process: 1, service: 1, machine: 1 },
        20,
        10,
        initial_assignment,
    );

    let started = Instant::now();
    let result = solve(&instance, Deadline::from_now(Duration::from_millis(300)));
    let elapsed = started.elapsed();

    assert_eq!(result.len(), nb_processes);
    assert!(elapsed < Duration::from_secs(2), "search overran its deadline by too much: {elapsed:?}");
}
