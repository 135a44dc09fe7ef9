//! Mutable derived state owned by the solver.
//!
//! Holds the current assignment plus everything that must stay in sync
//! with it: per-machine resource usage, per-machine occupant sets,
//! per-service location spreads, and per-service moved-process counts.
//! The only mutation primitive is [`SolverState::apply_swap`], and it is
//! its own inverse: applying the same swap twice restores every field.

use crate::model::{Assignment, Instance, MachineId, ProcessId, ServiceId};

/// An ordered pair of processes whose machine assignments are exchanged.
///
/// Always constructed with `process1 < process2`; this is not enforced by
/// the type so self-swaps can be rejected explicitly where that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub process1: ProcessId,
    pub process2: ProcessId,
}

impl Swap {
    pub fn new(process1: ProcessId, process2: ProcessId) -> Self {
        Self { process1, process2 }
    }
}

/// The solver's mutable view of a candidate solution.
pub struct SolverState<'a> {
    instance: &'a Instance,
    assignment: Assignment,
    usage: Vec<Vec<i64>>,
    machine_processes: Vec<Vec<ProcessId>>,
    location_spread: Vec<Vec<i64>>,
    distinct_locations: Vec<i64>,
    moved_count: Vec<i64>,
}

impl<'a> SolverState<'a> {
    /// Builds derived state from `instance`'s initial assignment.
    pub fn from_initial(instance: &'a Instance) -> Self {
        Self::from_assignment(instance, instance.initial_assignment().clone())
    }

    /// Builds derived state from an arbitrary starting assignment.
    pub fn from_assignment(instance: &'a Instance, assignment: Assignment) -> Self {
        let usage = instance.usage_for(&assignment);
        let machine_processes = instance.machine_processes_for(&assignment);
        let location_spread = instance.location_spread_for(&assignment);
        let distinct_locations = location_spread
            .iter()
            .map(|row| row.iter().filter(|&&count| count > 0).count() as i64)
            .collect();
        let moved_count = instance
            .service_ids()
            .map(|s| {
                instance
                    .service(s)
                    .processes()
                    .iter()
                    .filter(|&&p| instance.initial_machine_of(p) != assignment[p.as_usize()])
                    .count() as i64
            })
            .collect();

        Self {
            instance,
            assignment,
            usage,
            machine_processes,
            location_spread,
            distinct_locations,
            moved_count,
        }
    }

    #[inline]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[inline]
    pub fn machine_of(&self, process: ProcessId) -> MachineId {
        self.assignment[process.as_usize()]
    }

    #[inline]
    pub fn usage(&self, machine: MachineId) -> &[i64] {
        &self.usage[machine.as_usize()]
    }

    #[inline]
    pub fn distinct_locations(&self, service: ServiceId) -> i64 {
        self.distinct_locations[service.as_usize()]
    }

    #[inline]
    pub fn moved_count(&self, service: ServiceId) -> i64 {
        self.moved_count[service.as_usize()]
    }

    #[inline]
    pub fn max_moved_count(&self) -> i64 {
        self.moved_count.iter().copied().max().unwrap_or(0)
    }

    pub fn into_assignment(self) -> Assignment {
        self.assignment
    }

    /// Exchanges the machines of `swap.process1` and `swap.process2`, updating
    /// every derived field. Applying the same swap twice in a row is a no-op
    /// on all observable state (apply-involution).
    ///
    /// Panics in debug builds if the two processes are equal: a swap between
    /// a process and itself is meaningless and indicates a caller bug.
    pub fn apply_swap(&mut self, swap: Swap) {
        debug_assert_ne!(swap.process1, swap.process2, "applySwap called with equal process ids");

        let p1 = swap.process1;
        let p2 = swap.process2;

        let old_m1 = self.assignment[p1.as_usize()];
        let old_m2 = self.assignment[p2.as_usize()];

        let s1 = self.instance.process_service(p1);
        let s2 = self.instance.process_service(p2);

        self.assignment[p1.as_usize()] = old_m2;
        self.assignment[p2.as_usize()] = old_m1;

        self.update_machine_processes(old_m1, old_m2, p1, p2);
        self.update_usage(old_m1, old_m2, p1, p2);
        self.update_spread(s1, s2, old_m1, old_m2);
        self.update_moved_count(s1, s2, p1, p2, old_m1, old_m2);
    }

    fn update_machine_processes(&mut self, old_m1: MachineId, old_m2: MachineId, p1: ProcessId, p2: ProcessId) {
        let occupants1 = &mut self.machine_processes[old_m1.as_usize()];
        occupants1.retain(|&p| p != p1);
        occupants1.push(p2);

        let occupants2 = &mut self.machine_processes[old_m2.as_usize()];
        occupants2.retain(|&p| p != p2);
        occupants2.push(p1);
    }

    fn update_usage(&mut self, old_m1: MachineId, old_m2: MachineId, p1: ProcessId, p2: ProcessId) {
        for r in 0..self.instance.nb_resources() {
            let resource = crate::model::ResourceId::new(r);
            let req1 = self.instance.process(p1).requirement(resource);
            let req2 = self.instance.process(p2).requirement(resource);

            self.usage[old_m1.as_usize()][r] += req2 - req1;
            self.usage[old_m2.as_usize()][r] += req1 - req2;
        }
    }

    fn update_spread(&mut self, s1: ServiceId, s2: ServiceId, old_m1: MachineId, old_m2: MachineId) {
        let old_loc1 = self.instance.machine_location(old_m1);
        let old_loc2 = self.instance.machine_location(old_m2);
        let new_loc1 = old_loc2;
        let new_loc2 = old_loc1;

        self.move_spread(s1, old_loc1, new_loc1);
        self.move_spread(s2, old_loc2, new_loc2);
    }

    fn move_spread(&mut self, service: ServiceId, old_loc: crate::model::LocationId, new_loc: crate::model::LocationId) {
        let row = &mut self.location_spread[service.as_usize()];
        if row[old_loc.as_usize()] == 1 {
            self.distinct_locations[service.as_usize()] -= 1;
        }
        row[old_loc.as_usize()] -= 1;

        if row[new_loc.as_usize()] == 0 {
            self.distinct_locations[service.as_usize()] += 1;
        }
        row[new_loc.as_usize()] += 1;
    }

    fn update_moved_count(
        &mut self,
        s1: ServiceId,
        s2: ServiceId,
        p1: ProcessId,
        p2: ProcessId,
        old_m1: MachineId,
        old_m2: MachineId,
    ) {
        let initial1 = self.instance.initial_machine_of(p1);
        if old_m1 == initial1 {
            self.moved_count[s1.as_usize()] += 1;
        } else if old_m2 == initial1 {
            // old_m2 becomes p1's new machine; if that equals p1's own initial
            // machine, p1 has returned home.
            self.moved_count[s1.as_usize()] -= 1;
        }

        let initial2 = self.instance.initial_machine_of(p2);
        if old_m2 == initial2 {
            self.moved_count[s2.as_usize()] += 1;
        } else if old_m1 == initial2 {
            self.moved_count[s2.as_usize()] -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instance, LocationId, Machine, MoveWeights, NeighbourhoodId, Process, Resource, Service, ServiceId};

    fn sample_instance() -> Instance {
        let resources = vec![Resource::new(false, 1), Resource::new(true, 1)];
        let machines = vec![
            Machine::new(LocationId::new(0), NeighbourhoodId::new(0), vec![20, 20], vec![20, 20], vec![0, 0, 0]),
            Machine::new(LocationId::new(1), NeighbourhoodId::new(1), vec![20, 20], vec![20, 20], vec![0, 0, 0]),
            Machine::new(LocationId::new(2), NeighbourhoodId::new(2), vec![20, 20], vec![20, 20], vec![0, 0, 0]),
        ];
        let processes = vec![
            Process::new(ServiceId::new(0), 1, vec![3, 1]),
            Process::new(ServiceId::new(0), 1, vec![2, 1]),
            Process::new(ServiceId::new(1), 1, vec![4, 1]),
        ];
        let mut services = vec![Service::new(1, vec![]), Service::new(1, vec![])];
        services[0].add_process(ProcessId::new(0));
        services[0].add_process(ProcessId::new(1));
        services[1].add_process(ProcessId::new(2));

        Instance::new(
            resources,
            machines,
            processes,
            services,
            vec![],
            MoveWeights { process: 1, service: 1, machine: 1 },
            3,
            3,
            vec![MachineId::new(0), MachineId::new(1), MachineId::new(2)],
        )
    }

    #[test]
    fn apply_swap_twice_is_the_identity() {
        let instance = sample_instance();
        let mut state = SolverState::from_initial(&instance);
        let before_assignment = state.assignment().clone();
        let before_usage0 = state.usage(MachineId::new(0)).to_vec();
        let before_usage1 = state.usage(MachineId::new(1)).to_vec();
        let before_distinct = state.distinct_locations(ServiceId::new(0));
        let before_moved = state.moved_count(ServiceId::new(0));

        let swap = Swap::new(ProcessId::new(0), ProcessId::new(1));
        state.apply_swap(swap);
        state.apply_swap(swap);

        assert_eq!(state.assignment(), &before_assignment);
        assert_eq!(state.usage(MachineId::new(0)), before_usage0.as_slice());
        assert_eq!(state.usage(MachineId::new(1)), before_usage1.as_slice());
        assert_eq!(state.distinct_locations(ServiceId::new(0)), before_distinct);
        assert_eq!(state.moved_count(ServiceId::new(0)), before_moved);
    }

    #[test]
    fn apply_swap_updates_usage_consistently_with_full_recompute() {
        let instance = sample_instance();
        let mut state = SolverState::from_initial(&instance);

        state.apply_swap(Swap::new(ProcessId::new(0), ProcessId::new(2)));

        let recomputed = instance.usage_for(state.assignment());
        for m in instance.machine_ids() {
            assert_eq!(state.usage(m), recomputed[m.as_usize()].as_slice());
        }
    }

    #[test]
    fn apply_swap_updates_moved_count_when_process_returns_home() {
        let instance = sample_instance();
        let mut state = SolverState::from_initial(&instance);
        let swap = Swap::new(ProcessId::new(0), ProcessId::new(2));

        state.apply_swap(swap);
        assert_eq!(state.moved_count(ServiceId::new(0)), 1);
        assert_eq!(state.moved_count(ServiceId::new(1)), 1);

        // Swapping back should restore both services to zero moved processes.
        state.apply_swap(swap);
        assert_eq!(state.moved_count(ServiceId::new(0)), 0);
        assert_eq!(state.moved_count(ServiceId::new(1)), 0);
    }

    #[test]
    fn apply_swap_updates_distinct_locations() {
        let instance = sample_instance();
        let mut state = SolverState::from_initial(&instance);

        // Service 0 starts spread across machines 0 and 1 (locations 0 and 1): 2 distinct.
        assert_eq!(state.distinct_locations(ServiceId::new(0)), 2);

        state.apply_swap(Swap::new(ProcessId::new(1), ProcessId::new(2)));
        // Now service 0 has processes on machines 0 and 2 (locations 0 and 2): still 2.
        assert_eq!(state.distinct_locations(ServiceId::new(0)), 2);
    }
}
