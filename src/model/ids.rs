//! Dense integer identifiers for every entity kind.
//!
//! Every id is a thin newtype over `usize` so the compiler rejects a
//! machine id passed where a process id is expected, while still being
//! free to use as an array index (`as_usize()`).

use std::fmt;

macro_rules! dense_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(ResourceId, "Identifies a resource kind (CPU, RAM, ...).");
dense_id!(MachineId, "Identifies a machine in the fleet.");
dense_id!(ProcessId, "Identifies a process to be assigned.");
dense_id!(ServiceId, "Identifies a service owning a set of processes.");
dense_id!(
    BalanceObjectiveId,
    "Identifies a balance objective between two resources."
);

/// A location groups machines for the spread constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(usize);

impl LocationId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// A neighbourhood groups machines for the dependency constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeighbourhoodId(usize);

impl NeighbourhoodId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}
