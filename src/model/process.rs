//! Process definitions.
//!
//! A process belongs to exactly one service and carries a per-resource
//! requirement row plus the cost of moving it off its initial machine.

use super::ids::{ResourceId, ServiceId};

/// A process to be assigned to a machine.
#[derive(Debug, Clone)]
pub struct Process {
    service: ServiceId,
    move_cost: i64,
    requirement: Vec<i64>,
}

impl Process {
    pub fn new(service: ServiceId, move_cost: i64, requirement: Vec<i64>) -> Self {
        Self {
            service,
            move_cost,
            requirement,
        }
    }

    #[inline]
    pub fn service(&self) -> ServiceId {
        self.service
    }

    #[inline]
    pub fn move_cost(&self) -> i64 {
        self.move_cost
    }

    #[inline]
    pub fn requirement(&self, resource: ResourceId) -> i64 {
        self.requirement[resource.as_usize()]
    }
}
