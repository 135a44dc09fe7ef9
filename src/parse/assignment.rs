//! Assignment file parsing and writing.
//!
//! An assignment is a single line of space-separated machine ids, one per
//! process in dense `ProcessId` order. The reference instances end the line
//! with a trailing space, which splits into one trailing empty token that
//! must be tolerated rather than rejected.

use crate::model::{Assignment, MachineId};

/// Errors produced while parsing an assignment file.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("assignment file is empty")]
    Empty,

    #[error("invalid machine id '{0}' at position {1}")]
    InvalidMachineId(String, usize),
}

/// Parses a single-line assignment, tolerating a trailing space (and
/// trailing newline) after the last id.
pub fn parse_assignment(input: &str) -> Result<Assignment, AssignmentError> {
    let line = input.lines().next().unwrap_or("");
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.is_empty() {
        return Err(AssignmentError::Empty);
    }

    tokens
        .iter()
        .enumerate()
        .map(|(position, token)| {
            token
                .parse::<usize>()
                .map(MachineId::new)
                .map_err(|_| AssignmentError::InvalidMachineId(token.to_string(), position))
        })
        .collect()
}

/// Renders an assignment the way the reference solver writes it: ids
/// separated by spaces, with a trailing space before the newline.
pub fn write_assignment(assignment: &Assignment) -> String {
    let mut out = String::new();
    for machine in assignment {
        out.push_str(&machine.as_usize().to_string());
        out.push(' ');
    }
    out.push('\n');
    out
}
