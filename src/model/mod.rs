//! The problem's data model: resources, machines, processes, services,
//! balance objectives, and the immutable instance that ties them together.

pub mod balance;
pub mod ids;
pub mod instance;
pub mod machine;
pub mod process;
pub mod resource;
pub mod service;

pub use balance::BalanceObjective;
pub use ids::{
    BalanceObjectiveId, LocationId, MachineId, NeighbourhoodId, ProcessId, ResourceId, ServiceId,
};
pub use instance::{Assignment, Instance, MoveWeights};
pub use machine::Machine;
pub use process::Process;
pub use resource::Resource;
pub use service::Service;
