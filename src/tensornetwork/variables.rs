use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::ContractionError;
use crate::types::{Edge, Leg, Node, NodeId};
use crate::utils::traits::HashMapInsertNew;

/// Index of a variable in its [`VariableRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Bound by an edge, shared by two legs and summed over.
    Internal,
    /// An unconnected leg; one bit of the output index.
    Dangling,
}

/// Name table of the binary variables of one contraction.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    names: Vec<String>,
    kinds: Vec<VariableKind>,
    by_name: FxHashMap<String, VariableId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new variable. Fails with the id already holding `name` if
    /// the name is taken.
    pub fn intern(&mut self, name: String, kind: VariableKind) -> Result<VariableId, VariableId> {
        let id = VariableId::new(self.names.len());
        self.by_name.insert_new(name.clone(), id).map_err(|&taken| taken)?;
        self.names.push(name);
        self.kinds.push(kind);
        Ok(id)
    }

    pub fn name(&self, id: VariableId) -> &str {
        &self.names[id.0]
    }

    pub fn kind(&self, id: VariableId) -> VariableKind {
        self.kinds[id.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

impl fmt::Display for VariableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

/// Name of the variable an edge binds, `e_{A}_{B}_{a}_{b}` with `(A, a)` the
/// smaller endpoint.
pub fn internal_variable_name(edge: &Edge) -> String {
    let (low, high) = edge.canonical_endpoints();
    format!("e_{}_{}_{}_{}", low.node, high.node, low.index, high.index)
}

/// Name of the variable of an unconnected leg.
pub fn dangling_variable_name(leg: &Leg) -> String {
    format!("v_{}_{}", leg.node, leg.index)
}

/// Arity of every node by id. Node ids must be unique.
pub fn node_arities(nodes: &[Node]) -> Result<FxHashMap<&NodeId, usize>, ContractionError> {
    let mut arities = FxHashMap::default();
    arities.reserve(nodes.len());
    for node in nodes {
        if arities.insert_new(&node.id, node.arity).is_err() {
            return Err(ContractionError::validation(format!(
                "duplicate node id `{}`",
                node.id
            )));
        }
    }
    Ok(arities)
}

/// Binding of connected legs to the internal variables of their edges.
#[derive(Debug, Default)]
pub struct PortMapping {
    bindings: FxHashMap<Leg, VariableId>,
    internal: Vec<VariableId>,
}

impl PortMapping {
    /// Derives one internal variable per edge, in edge order, and binds it to
    /// both endpoints.
    ///
    /// # Errors
    /// Fails if an endpoint names an unknown node or a leg beyond the node's
    /// arity, if a leg is claimed by a second edge, or if two edges produce the
    /// same variable name.
    pub fn build(
        edges: &[Edge],
        arities: &FxHashMap<&NodeId, usize>,
        registry: &mut VariableRegistry,
    ) -> Result<Self, ContractionError> {
        let mut mapping = Self::default();
        mapping.internal.reserve(edges.len());
        for (position, edge) in edges.iter().enumerate() {
            for leg in [&edge.source, &edge.target] {
                check_leg(leg, arities)
                    .map_err(|message| edge_error(position, edge, &message))?;
            }

            let name = internal_variable_name(edge);
            let variable = registry
                .intern(name, VariableKind::Internal)
                .map_err(|taken| {
                    edge_error(
                        position,
                        edge,
                        &format!(
                            "variable name `{}` is already used by another edge",
                            registry.name(taken)
                        ),
                    )
                })?;

            for leg in [&edge.source, &edge.target] {
                if let Err(&other) = mapping.bindings.insert_new(leg.clone(), variable) {
                    return Err(edge_error(
                        position,
                        edge,
                        &format!(
                            "leg {leg} is already bound to `{}`",
                            registry.name(other)
                        ),
                    ));
                }
            }
            mapping.internal.push(variable);
        }
        Ok(mapping)
    }

    /// Variable bound to `leg`, if an edge claims it.
    pub fn binding(&self, leg: &Leg) -> Option<VariableId> {
        self.bindings.get(leg).copied()
    }

    /// Internal variables in edge declaration order.
    pub fn internal(&self) -> &[VariableId] {
        &self.internal
    }

    /// Variables of `node`'s legs in ascending leg order. Unbound legs get a
    /// fresh dangling variable, appended to `dangling`.
    pub fn assign_legs(
        &self,
        node: &Node,
        registry: &mut VariableRegistry,
        dangling: &mut Vec<VariableId>,
    ) -> Result<Vec<VariableId>, ContractionError> {
        (0..node.arity)
            .map(|index| {
                let leg = node.leg(index);
                if let Some(variable) = self.binding(&leg) {
                    return Ok(variable);
                }
                let variable = registry
                    .intern(dangling_variable_name(&leg), VariableKind::Dangling)
                    .map_err(|taken| {
                        ContractionError::validation(format!(
                            "variable name `{}` of leg {leg} is already in use",
                            registry.name(taken)
                        ))
                    })?;
                dangling.push(variable);
                Ok(variable)
            })
            .collect()
    }
}

fn check_leg(leg: &Leg, arities: &FxHashMap<&NodeId, usize>) -> Result<(), String> {
    let Some(&arity) = arities.get(&leg.node) else {
        return Err(format!("unknown node `{}`", leg.node));
    };
    if leg.index >= arity {
        return Err(format!(
            "leg index {} out of range for node `{}` of arity {arity}",
            leg.index, leg.node
        ));
    }
    Ok(())
}

fn edge_error(position: usize, edge: &Edge, message: &str) -> ContractionError {
    ContractionError::validation(format!("edge {position} ({edge}): {message}"))
}
