//! Machine definitions.
//!
//! Each machine carries per-resource capacity and safety limits, a location
//! and neighbourhood for the spread/dependency constraints, and a row of
//! move costs to every other machine.

use super::ids::{LocationId, MachineId, NeighbourhoodId, ResourceId};

/// A machine in the fleet.
#[derive(Debug, Clone)]
pub struct Machine {
    location: LocationId,
    neighbourhood: NeighbourhoodId,
    capacity: Vec<i64>,
    safety_limit: Vec<i64>,
    move_cost: Vec<i64>,
}

impl Machine {
    pub fn new(
        location: LocationId,
        neighbourhood: NeighbourhoodId,
        capacity: Vec<i64>,
        safety_limit: Vec<i64>,
        move_cost: Vec<i64>,
    ) -> Self {
        Self {
            location,
            neighbourhood,
            capacity,
            safety_limit,
            move_cost,
        }
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    #[inline]
    pub fn neighbourhood(&self) -> NeighbourhoodId {
        self.neighbourhood
    }

    #[inline]
    pub fn capacity(&self, resource: ResourceId) -> i64 {
        self.capacity[resource.as_usize()]
    }

    #[inline]
    pub fn safety_limit(&self, resource: ResourceId) -> i64 {
        self.safety_limit[resource.as_usize()]
    }

    #[inline]
    pub fn move_cost_to(&self, other: MachineId) -> i64 {
        self.move_cost[other.as_usize()]
    }
}
