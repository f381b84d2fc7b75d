use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::config::ContractionConfig;
use crate::error::ContractionError;
use crate::symbolic::Symbolic;
use crate::tensornetwork::signature::parse_signature;
use crate::tensornetwork::transform::apply_transform;
use crate::tensornetwork::variables::{
    node_arities, PortMapping, VariableId, VariableKind, VariableRegistry,
};
use crate::types::{Edge, Node};

/// Outcome of a contraction: one value per assignment of the dangling
/// variables, with the first variable as the most significant bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractionResult {
    pub signature: Vec<Symbolic>,
    pub variables: Vec<String>,
}

/// A node ready for enumeration: its (transformed) values and the variable
/// of each leg, leg 0 first.
struct PreparedNode {
    values: Vec<Symbolic>,
    legs: Vec<VariableId>,
}

impl PreparedNode {
    /// Signature index under `assignment`, leg 0 being the most significant bit.
    #[inline]
    fn index(&self, assignment: &[bool]) -> usize {
        self.legs
            .iter()
            .fold(0, |acc, leg| (acc << 1) | usize::from(assignment[leg.index()]))
    }
}

/// Writes the bits of `value` to `variables`, the first variable receiving the
/// most significant bit.
#[inline]
fn assign_bits(assignment: &mut [bool], variables: &[VariableId], value: usize) {
    let width = variables.len();
    for (position, variable) in variables.iter().enumerate() {
        assignment[variable.index()] = (value >> (width - 1 - position)) & 1 == 1;
    }
}

/// Fails if `bits` binary variables cannot or may not be enumerated.
fn check_enumeration_bits(bits: usize, limit: Option<u32>) -> Result<(), ContractionError> {
    if bits >= usize::BITS as usize {
        return Err(ContractionError::validation(format!(
            "{bits} binary variables cannot be enumerated on this platform"
        )));
    }
    if let Some(limit) = limit {
        if bits > limit as usize {
            return Err(ContractionError::validation(format!(
                "{bits} binary variables exceed the enumeration limit of {limit}"
            )));
        }
    }
    Ok(())
}

/// Contracts a network by brute-force enumeration.
///
/// Nodes are processed in declaration order: each signature is parsed, checked
/// against the node's arity and transformed (a node's own transform replaces
/// `transform`). Every edge becomes an internal variable that is summed over;
/// every unconnected leg becomes a dangling variable of the result, ordered by
/// node and then by ascending leg index.
///
/// # Examples
/// ```
/// # use holocontract::config::ContractionConfig;
/// # use holocontract::edge;
/// # use holocontract::tensornetwork::contraction::contract_network;
/// # use holocontract::types::Node;
/// let nodes = vec![Node::new("u", 1, ["a", "b"]), Node::new("w", 1, ["c", "d"])];
/// let edges = vec![edge![("u", 0), ("w", 0)]];
/// let result = contract_network(&nodes, &edges, None, &ContractionConfig::default()).unwrap();
/// assert_eq!(result.signature[0].to_string(), "a*c + b*d");
/// assert!(result.variables.is_empty());
/// ```
pub fn contract_network(
    nodes: &[Node],
    edges: &[Edge],
    transform: Option<&str>,
    config: &ContractionConfig,
) -> Result<ContractionResult, ContractionError> {
    debug!(nodes = nodes.len(), edges = edges.len(); "Start contracting network");

    let arities = node_arities(nodes)?;
    let mut registry = VariableRegistry::new();
    let mapping = PortMapping::build(edges, &arities, &mut registry)?;

    let mut dangling = Vec::new();
    let prepared = nodes
        .iter()
        .map(|node| {
            let values = parse_signature(
                node,
                &config.signature_imaginary_aliases,
                config.unparsable_entry,
            )?;
            let values = apply_transform(
                values,
                node.arity,
                node.transform
                    .as_deref()
                    .filter(|own| !own.trim().is_empty())
                    .or(transform),
                &node.id,
                &config.transform_imaginary_aliases,
            )?;
            let legs = mapping.assign_legs(node, &mut registry, &mut dangling)?;
            Ok(PreparedNode { values, legs })
        })
        .collect::<Result<Vec<_>, ContractionError>>()?;

    let internal = mapping.internal();
    debug_assert!(internal
        .iter()
        .all(|&variable| registry.kind(variable) == VariableKind::Internal));
    debug_assert!(dangling
        .iter()
        .all(|&variable| registry.kind(variable) == VariableKind::Dangling));
    let total_bits = dangling.len() + internal.len();
    check_enumeration_bits(total_bits, config.max_enumeration_bits)?;
    info!(external = dangling.len(), internal = internal.len(); "Enumerating assignments");

    let mut assignment = vec![false; registry.len()];
    let mut signature = Vec::with_capacity(1 << dangling.len());
    for external in 0..1usize << dangling.len() {
        assign_bits(&mut assignment, &dangling, external);
        let mut total = Symbolic::zero();
        for inner in 0..1usize << internal.len() {
            assign_bits(&mut assignment, internal, inner);
            let factors = prepared
                .iter()
                .map(|node| &node.values[node.index(&assignment)])
                .collect_vec();
            if factors.iter().any(|factor| factor.is_zero()) {
                continue;
            }
            total += factors.into_iter().product::<Symbolic>();
        }
        signature.push(total.simplify());
    }

    let variables = dangling
        .iter()
        .map(|&variable| registry.name(variable).to_owned())
        .collect();
    debug!("Completed network contraction");
    Ok(ContractionResult {
        signature,
        variables,
    })
}
