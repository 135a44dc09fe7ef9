//! Instance file parsing.
//!
//! The instance file is a fixed sequence of six sections -- resources,
//! machines, services, processes, balance objectives, weights -- each
//! introduced by a line holding the number of entries that follow. Balance
//! objectives are the one irregular section: each entry is split across two
//! lines (`r1 r2 target` then `weight` on the next line).

use crate::model::{
    Assignment, BalanceObjective, Instance, LocationId, Machine, MachineId, MoveWeights,
    NeighbourhoodId, Process, Resource, ResourceId, Service, ServiceId,
};

const MAX_RESOURCES: usize = 20;
const MAX_MACHINES: usize = 5000;
const MAX_PROCESSES: usize = 50_000;
const MAX_SERVICES: usize = 5000;
const MAX_NEIGHBOURHOODS: usize = 1000;
const MAX_DEPENDENCIES: usize = 5000;
const MAX_LOCATIONS: usize = 1000;
const MAX_BALANCE_OBJECTIVES: usize = 10;

/// Errors produced while parsing an instance file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input while reading the '{section}' section")]
    UnexpectedEof { section: &'static str },

    #[error("line {line}: expected an integer count, got '{value}'")]
    InvalidCount { line: usize, value: String },

    #[error("line {line}: expected {expected} fields, got {actual}")]
    WrongFieldCount { line: usize, expected: usize, actual: usize },

    #[error("line {line}: expected an integer, got '{value}'")]
    InvalidInteger { line: usize, value: String },
}

struct Cursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().map(|line| line.trim_end()).collect(),
            position: 0,
        }
    }

    fn next_line(&mut self, section: &'static str) -> Result<(usize, &'a str), ParseError> {
        let line = self.lines.get(self.position).ok_or(ParseError::UnexpectedEof { section })?;
        let line_number = self.position + 1;
        self.position += 1;
        Ok((line_number, line))
    }

    fn next_count(&mut self, section: &'static str) -> Result<usize, ParseError> {
        let (line_number, line) = self.next_line(section)?;
        line.trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidCount { line: line_number, value: line.to_string() })
    }

    fn next_tokens(&mut self, section: &'static str) -> Result<(usize, Vec<&'a str>), ParseError> {
        let (line_number, line) = self.next_line(section)?;
        Ok((line_number, line.split_whitespace().collect()))
    }
}

fn parse_i64(line: usize, token: &str) -> Result<i64, ParseError> {
    token.parse::<i64>().map_err(|_| ParseError::InvalidInteger { line, value: token.to_string() })
}

fn expect_len(line: usize, tokens: &[&str], expected: usize) -> Result<(), ParseError> {
    if tokens.len() != expected {
        return Err(ParseError::WrongFieldCount { line, expected, actual: tokens.len() });
    }
    Ok(())
}

/// Parses a complete instance file, pairing it with an already-parsed
/// initial assignment (see [`crate::parse::assignment::parse_assignment`]).
pub fn parse_instance(input: &str, initial_assignment: Assignment) -> Result<Instance, ParseError> {
    let mut cursor = Cursor::new(input);

    let resources = parse_resources(&mut cursor)?;
    let (machines, nb_locations, nb_neighbourhoods) = parse_machines(&mut cursor, resources.len())?;
    let (mut services, max_dependencies) = parse_services(&mut cursor)?;
    let processes = parse_processes(&mut cursor, resources.len(), &mut services)?;
    let balance_objectives = parse_balance_objectives(&mut cursor)?;
    let weights = parse_weights(&mut cursor)?;

    warn_if_over_limit("resources", resources.len(), MAX_RESOURCES);
    warn_if_over_limit("machines", machines.len(), MAX_MACHINES);
    warn_if_over_limit("processes", processes.len(), MAX_PROCESSES);
    warn_if_over_limit("services", services.len(), MAX_SERVICES);
    warn_if_over_limit("locations", nb_locations, MAX_LOCATIONS);
    warn_if_over_limit("neighbourhoods", nb_neighbourhoods, MAX_NEIGHBOURHOODS);
    warn_if_over_limit("dependencies", max_dependencies, MAX_DEPENDENCIES);
    warn_if_over_limit("balance objectives", balance_objectives.len(), MAX_BALANCE_OBJECTIVES);

    if initial_assignment.len() != processes.len() {
        tracing::warn!(
            assignment_len = initial_assignment.len(),
            process_count = processes.len(),
            "initial assignment length does not match the number of processes"
        );
    }

    tracing::info!(
        resources = resources.len(),
        machines = machines.len(),
        services = services.len(),
        processes = processes.len(),
        "instance loaded"
    );

    Ok(Instance::new(
        resources,
        machines,
        processes,
        services,
        balance_objectives,
        weights,
        nb_locations,
        nb_neighbourhoods,
        initial_assignment,
    ))
}

fn warn_if_over_limit(what: &str, actual: usize, limit: usize) {
    if actual > limit {
        tracing::warn!(what, actual, limit, "instance exceeds the recommended size limit");
    }
}

fn parse_resources(cursor: &mut Cursor) -> Result<Vec<Resource>, ParseError> {
    let count = cursor.next_count("resources")?;
    let mut resources = Vec::with_capacity(count);
    for _ in 0..count {
        let (line, tokens) = cursor.next_tokens("resources")?;
        expect_len(line, &tokens, 2)?;
        let transient = parse_i64(line, tokens[0])? == 1;
        let load_cost_weight = parse_i64(line, tokens[1])?;
        resources.push(Resource::new(transient, load_cost_weight));
    }
    Ok(resources)
}

fn parse_machines(cursor: &mut Cursor, nb_resources: usize) -> Result<(Vec<Machine>, usize, usize), ParseError> {
    let count = cursor.next_count("machines")?;
    let mut machines = Vec::with_capacity(count);
    let mut max_location = 0usize;
    let mut max_neighbourhood = 0usize;
    let expected_fields = 2 + 2 * nb_resources + count;

    for _ in 0..count {
        let (line, tokens) = cursor.next_tokens("machines")?;
        expect_len(line, &tokens, expected_fields)?;

        let neighbourhood = parse_i64(line, tokens[0])? as usize;
        let location = parse_i64(line, tokens[1])? as usize;
        max_location = max_location.max(location + 1);
        max_neighbourhood = max_neighbourhood.max(neighbourhood + 1);

        let capacity = tokens[2..2 + nb_resources]
            .iter()
            .map(|t| parse_i64(line, t))
            .collect::<Result<Vec<_>, _>>()?;
        let safety_limit = tokens[2 + nb_resources..2 + 2 * nb_resources]
            .iter()
            .map(|t| parse_i64(line, t))
            .collect::<Result<Vec<_>, _>>()?;
        let move_cost = tokens[2 + 2 * nb_resources..]
            .iter()
            .map(|t| parse_i64(line, t))
            .collect::<Result<Vec<_>, _>>()?;

        machines.push(Machine::new(
            LocationId::new(location),
            NeighbourhoodId::new(neighbourhood),
            capacity,
            safety_limit,
            move_cost,
        ));
    }

    Ok((machines, max_location, max_neighbourhood))
}

fn parse_services(cursor: &mut Cursor) -> Result<(Vec<Service>, usize), ParseError> {
    let count = cursor.next_count("services")?;
    let mut services = Vec::with_capacity(count);
    let mut max_dependencies = 0usize;

    for _ in 0..count {
        let (line, tokens) = cursor.next_tokens("services")?;
        if tokens.len() < 2 {
            return Err(ParseError::WrongFieldCount { line, expected: 2, actual: tokens.len() });
        }
        let spread_min = parse_i64(line, tokens[0])?;
        let nb_dependencies = parse_i64(line, tokens[1])? as usize;
        expect_len(line, &tokens, 2 + nb_dependencies)?;
        max_dependencies = max_dependencies.max(nb_dependencies);

        let dependencies = tokens[2..]
            .iter()
            .map(|t| parse_i64(line, t).map(|v| ServiceId::new(v as usize)))
            .collect::<Result<Vec<_>, _>>()?;

        services.push(Service::new(spread_min, dependencies));
    }

    Ok((services, max_dependencies))
}

fn parse_processes(cursor: &mut Cursor, nb_resources: usize, services: &mut [Service]) -> Result<Vec<Process>, ParseError> {
    let count = cursor.next_count("processes")?;
    let mut processes = Vec::with_capacity(count);
    let expected_fields = 1 + nb_resources + 1;

    for process_index in 0..count {
        let (line, tokens) = cursor.next_tokens("processes")?;
        expect_len(line, &tokens, expected_fields)?;

        let service_index = parse_i64(line, tokens[0])? as usize;
        let requirement = tokens[1..1 + nb_resources]
            .iter()
            .map(|t| parse_i64(line, t))
            .collect::<Result<Vec<_>, _>>()?;
        let move_cost = parse_i64(line, tokens[1 + nb_resources])?;

        let service = ServiceId::new(service_index);
        services[service_index].add_process(crate::model::ProcessId::new(process_index));
        processes.push(Process::new(service, move_cost, requirement));
    }

    Ok(processes)
}

fn parse_balance_objectives(cursor: &mut Cursor) -> Result<Vec<BalanceObjective>, ParseError> {
    let count = cursor.next_count("balance objectives")?;
    let mut objectives = Vec::with_capacity(count);

    for _ in 0..count {
        let (line, tokens) = cursor.next_tokens("balance objectives")?;
        expect_len(line, &tokens, 3)?;
        let first_resource = ResourceId::new(parse_i64(line, tokens[0])? as usize);
        let second_resource = ResourceId::new(parse_i64(line, tokens[1])? as usize);
        let target_ratio = parse_i64(line, tokens[2])?;

        let (weight_line, weight_tokens) = cursor.next_tokens("balance objectives")?;
        expect_len(weight_line, &weight_tokens, 1)?;
        let weight = parse_i64(weight_line, weight_tokens[0])?;

        objectives.push(BalanceObjective::new(first_resource, second_resource, target_ratio, weight));
    }

    Ok(objectives)
}

fn parse_weights(cursor: &mut Cursor) -> Result<MoveWeights, ParseError> {
    let (line, tokens) = cursor.next_tokens("weights")?;
    expect_len(line, &tokens, 3)?;
    Ok(MoveWeights {
        process: parse_i64(line, tokens[0])?,
        service: parse_i64(line, tokens[1])?,
        machine: parse_i64(line, tokens[2])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance_text() -> &'static str {
        "1\n\
         0 1\n\
         2\n\
         0 0 10 10 0 0\n\
         0 1 10 10 0 0\n\
         1\n\
         1 0\n\
         2\n\
         0 5 1\n\
         0 5 1\n\
         1\n\
         0 1 2\n\
         3\n\
         1 1 1\n"
    }

    #[test]
    fn parses_every_section_of_a_well_formed_instance() {
        let assignment: Assignment = vec![MachineId::new(0), MachineId::new(1)];
        let instance = parse_instance(sample_instance_text(), assignment).expect("should parse");

        assert_eq!(instance.nb_resources(), 1);
        assert_eq!(instance.nb_machines(), 2);
        assert_eq!(instance.nb_services(), 1);
        assert_eq!(instance.nb_processes(), 2);
        assert_eq!(instance.nb_balance_objectives(), 1);
        assert_eq!(instance.weights().process, 1);
        assert_eq!(instance.weights().service, 1);
        assert_eq!(instance.weights().machine, 1);
    }

    #[test]
    fn processes_are_attached_to_their_declared_service() {
        let assignment: Assignment = vec![MachineId::new(0), MachineId::new(1)];
        let instance = parse_instance(sample_instance_text(), assignment).expect("should parse");
        assert_eq!(instance.service(ServiceId::new(0)).processes().len(), 2);
    }

    #[test]
    fn rejects_a_non_numeric_count_line() {
        let text = "not-a-number\n";
        let err = parse_instance(text, vec![]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidCount { .. }));
    }

    #[test]
    fn rejects_a_machine_line_with_the_wrong_field_count() {
        let text = "1\n0 1\n1\n0 0 10\n1\n1 0\n1\n0 5 1\n0\n0 0 0\n";
        let err = parse_instance(text, vec![]).unwrap_err();
        assert!(matches!(err, ParseError::WrongFieldCount { .. }));
    }

    #[test]
    fn rejects_truncated_input() {
        let text = "2\n0 1\n";
        let err = parse_instance(text, vec![]).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }
}
