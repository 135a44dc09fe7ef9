//! The immutable problem instance.
//!
//! Everything the solver reads but never mutates: resources, machines,
//! processes, services, balance objectives, move-cost weights, and the
//! initial assignment. Built once by the parser and handed to the solver
//! and checkers as a read-only reference.

use super::balance::BalanceObjective;
use super::ids::{BalanceObjectiveId, LocationId, MachineId, NeighbourhoodId, ProcessId, ResourceId, ServiceId};
use super::machine::Machine;
use super::process::Process;
use super::resource::Resource;
use super::service::Service;

/// A total assignment of processes to machines, dense by `ProcessId`.
pub type Assignment = Vec<MachineId>;

/// Scalar weights applied to the three move-cost terms.
#[derive(Debug, Clone, Copy)]
pub struct MoveWeights {
    pub process: i64,
    pub service: i64,
    pub machine: i64,
}

/// The complete, immutable Machine Reassignment Problem instance.
#[derive(Debug)]
pub struct Instance {
    resources: Vec<Resource>,
    transient_resources: Vec<ResourceId>,
    machines: Vec<Machine>,
    processes: Vec<Process>,
    services: Vec<Service>,
    balance_objectives: Vec<BalanceObjective>,
    weights: MoveWeights,
    nb_locations: usize,
    nb_neighbourhoods: usize,
    initial_assignment: Assignment,
    machine_initial_processes: Vec<Vec<ProcessId>>,
}

impl Instance {
    /// Assembles an instance from already-parsed components.
    ///
    /// `services` must already own their processes (via `Service::add_process`)
    /// before this is called, since `machine_initial_processes` is derived here.
    pub fn new(
        resources: Vec<Resource>,
        machines: Vec<Machine>,
        processes: Vec<Process>,
        services: Vec<Service>,
        balance_objectives: Vec<BalanceObjective>,
        weights: MoveWeights,
        nb_locations: usize,
        nb_neighbourhoods: usize,
        initial_assignment: Assignment,
    ) -> Self {
        let transient_resources = resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.transient)
            .map(|(i, _)| ResourceId::new(i))
            .collect();

        let mut machine_initial_processes = vec![Vec::new(); machines.len()];
        for (process_index, &machine) in initial_assignment.iter().enumerate() {
            machine_initial_processes[machine.as_usize()].push(ProcessId::new(process_index));
        }

        Self {
            resources,
            transient_resources,
            machines,
            processes,
            services,
            balance_objectives,
            weights,
            nb_locations,
            nb_neighbourhoods,
            initial_assignment,
            machine_initial_processes,
        }
    }

    #[inline]
    pub fn nb_resources(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn nb_machines(&self) -> usize {
        self.machines.len()
    }

    #[inline]
    pub fn nb_processes(&self) -> usize {
        self.processes.len()
    }

    #[inline]
    pub fn nb_services(&self) -> usize {
        self.services.len()
    }

    #[inline]
    pub fn nb_balance_objectives(&self) -> usize {
        self.balance_objectives.len()
    }

    #[inline]
    pub fn nb_locations(&self) -> usize {
        self.nb_locations
    }

    #[inline]
    pub fn nb_neighbourhoods(&self) -> usize {
        self.nb_neighbourhoods
    }

    #[inline]
    pub fn weights(&self) -> MoveWeights {
        self.weights
    }

    #[inline]
    pub fn transient_resources(&self) -> &[ResourceId] {
        &self.transient_resources
    }

    #[inline]
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.as_usize()]
    }

    #[inline]
    pub fn machine(&self, id: MachineId) -> &Machine {
        &self.machines[id.as_usize()]
    }

    #[inline]
    pub fn process(&self, id: ProcessId) -> &Process {
        &self.processes[id.as_usize()]
    }

    #[inline]
    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.as_usize()]
    }

    #[inline]
    pub fn balance_objective(&self, id: BalanceObjectiveId) -> &BalanceObjective {
        &self.balance_objectives[id.as_usize()]
    }

    #[inline]
    pub fn process_service(&self, process: ProcessId) -> ServiceId {
        self.processes[process.as_usize()].service()
    }

    #[inline]
    pub fn machine_location(&self, machine: MachineId) -> LocationId {
        self.machines[machine.as_usize()].location()
    }

    #[inline]
    pub fn machine_neighbourhood(&self, machine: MachineId) -> NeighbourhoodId {
        self.machines[machine.as_usize()].neighbourhood()
    }

    #[inline]
    pub fn initial_assignment(&self) -> &Assignment {
        &self.initial_assignment
    }

    #[inline]
    pub fn initial_machine_of(&self, process: ProcessId) -> MachineId {
        self.initial_assignment[process.as_usize()]
    }

    #[inline]
    pub fn machine_initial_processes(&self, machine: MachineId) -> &[ProcessId] {
        &self.machine_initial_processes[machine.as_usize()]
    }

    /// Iterates every process id in the instance, in dense index order.
    pub fn process_ids(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.processes.len()).map(ProcessId::new)
    }

    /// Iterates every service id in the instance, in dense index order.
    pub fn service_ids(&self) -> impl Iterator<Item = ServiceId> {
        (0..self.services.len()).map(ServiceId::new)
    }

    /// Iterates every machine id in the instance, in dense index order.
    pub fn machine_ids(&self) -> impl Iterator<Item = MachineId> {
        (0..self.machines.len()).map(MachineId::new)
    }

    /// Iterates every balance objective id in the instance, in dense index order.
    pub fn balance_objective_ids(&self) -> impl Iterator<Item = BalanceObjectiveId> {
        (0..self.balance_objectives.len()).map(BalanceObjectiveId::new)
    }

    /// Computes per-machine, per-resource usage from scratch for the given assignment.
    pub fn usage_for(&self, assignment: &Assignment) -> Vec<Vec<i64>> {
        let mut usage = vec![vec![0i64; self.nb_resources()]; self.nb_machines()];
        for (process_index, &machine) in assignment.iter().enumerate() {
            let process = &self.processes[process_index];
            let row = &mut usage[machine.as_usize()];
            for (resource_index, slot) in row.iter_mut().enumerate() {
                *slot += process.requirement(ResourceId::new(resource_index));
            }
        }
        usage
    }

    /// Computes, for the given assignment, the set of processes on each machine.
    pub fn machine_processes_for(&self, assignment: &Assignment) -> Vec<Vec<ProcessId>> {
        let mut by_machine = vec![Vec::new(); self.nb_machines()];
        for (process_index, &machine) in assignment.iter().enumerate() {
            by_machine[machine.as_usize()].push(ProcessId::new(process_index));
        }
        by_machine
    }

    /// Computes, for the given assignment, the per-service per-location process counts.
    pub fn location_spread_for(&self, assignment: &Assignment) -> Vec<Vec<i64>> {
        let mut spread = vec![vec![0i64; self.nb_locations]; self.services.len()];
        for (process_index, &machine) in assignment.iter().enumerate() {
            let service = self.processes[process_index].service();
            let location = self.machines[machine.as_usize()].location();
            spread[service.as_usize()][location.as_usize()] += 1;
        }
        spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_instance() -> Instance {
        let resources = vec![Resource::new(false, 1)];
        let machines = vec![
            Machine::new(LocationId::new(0), NeighbourhoodId::new(0), vec![10], vec![5], vec![0, 0]),
            Machine::new(LocationId::new(1), NeighbourhoodId::new(0), vec![10], vec![5], vec![0, 0]),
        ];
        let processes = vec![
            Process::new(ServiceId::new(0), 1, vec![6]),
            Process::new(ServiceId::new(0), 1, vec![4]),
        ];
        let mut services = vec![Service::new(1, vec![])];
        services[0].add_process(ProcessId::new(0));
        services[0].add_process(ProcessId::new(1));

        Instance::new(
            resources,
            machines,
            processes,
            services,
            vec![],
            MoveWeights { process: 1, service: 1, machine: 1 },
            2,
            1,
            vec![MachineId::new(0), MachineId::new(0)],
        )
    }

    #[test]
    fn counts_are_correct() {
        let instance = tiny_instance();
        assert_eq!(instance.nb_processes(), 2);
        assert_eq!(instance.nb_machines(), 2);
        assert_eq!(instance.nb_services(), 1);
        assert_eq!(instance.nb_locations(), 2);
    }

    #[test]
    fn transient_resources_are_precomputed() {
        let instance = tiny_instance();
        assert!(instance.transient_resources().is_empty());
    }

    #[test]
    fn machine_initial_processes_reflects_initial_assignment() {
        let instance = tiny_instance();
        assert_eq!(
            instance.machine_initial_processes(MachineId::new(0)),
            &[ProcessId::new(0), ProcessId::new(1)]
        );
        assert!(instance
            .machine_initial_processes(MachineId::new(1))
            .is_empty());
    }

    #[test]
    fn usage_for_sums_requirements_per_machine() {
        let instance = tiny_instance();
        let usage = instance.usage_for(instance.initial_assignment());
        assert_eq!(usage[0][0], 10);
        assert_eq!(usage[1][0], 0);
    }

    #[test]
    fn location_spread_counts_distinct_assignment() {
        let instance = tiny_instance();
        let assignment = vec![MachineId::new(0), MachineId::new(1)];
        let spread = instance.location_spread_for(&assignment);
        assert_eq!(spread[0][0], 1);
        assert_eq!(spread[0][1], 1);
    }
}
