use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNodeId", into = "String")]
pub struct NodeId(String);

/// Node ids arrive either as strings or as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Integer(i64),
}

impl From<RawNodeId> for NodeId {
    fn from(value: RawNodeId) -> Self {
        match value {
            RawNodeId::Text(text) => Self(text),
            RawNodeId::Integer(number) => Self(number.to_string()),
        }
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a leg within its node; leg 0 is the most significant bit of the
/// node's signature index.
pub type LegIndex = usize;

/// One binary leg of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Leg {
    pub node: NodeId,
    pub index: LegIndex,
}

impl Leg {
    pub fn new<N>(node: N, index: LegIndex) -> Self
    where
        N: Into<NodeId>,
    {
        Self {
            node: node.into(),
            index,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.node, self.index)
    }
}

/// A node of the network: `2^arity` raw signature entries, optionally with a
/// transform of its own that replaces the network-wide one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub arity: usize,
    pub signature: Vec<String>,
    /// Replaces the network-wide transform for this node. `None` falls back
    /// to the network-wide one, so a node is exempted by giving it the
    /// identity `[[1, 0], [0, 1]]`.
    pub transform: Option<String>,
}

impl Node {
    pub fn new<N, S>(id: N, arity: usize, signature: impl IntoIterator<Item = S>) -> Self
    where
        N: Into<NodeId>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            arity,
            signature: signature.into_iter().map(Into::into).collect(),
            transform: None,
        }
    }

    /// Sets a transform that applies to this node only.
    #[must_use]
    pub fn with_transform<S>(mut self, transform: S) -> Self
    where
        S: Into<String>,
    {
        self.transform = Some(transform.into());
        self
    }

    pub fn leg(&self, index: LegIndex) -> Leg {
        Leg::new(self.id.clone(), index)
    }
}

/// Identification of two legs under one summed binary variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: Leg,
    pub target: Leg,
}

impl Edge {
    pub fn new(source: Leg, target: Leg) -> Self {
        Self { source, target }
    }

    /// The endpoints in canonical order, independent of which one was listed
    /// as the source.
    pub fn canonical_endpoints(&self) -> (&Leg, &Leg) {
        if self.source <= self.target {
            (&self.source, &self.target)
        } else {
            (&self.target, &self.source)
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", self.source, self.target)
    }
}

/// Builds an [`Edge`] between `(node, leg)` pairs.
///
/// # Examples
/// ```
/// # use holocontract::edge;
/// # use holocontract::types::{Edge, Leg};
/// assert_eq!(edge![("a", 0), ("b", 1)], Edge::new(Leg::new("a", 0), Leg::new("b", 1)));
/// let edges = edge![[("a", 0), ("b", 0)], [("b", 1), ("c", 0)]];
/// assert_eq!(edges.len(), 2);
/// ```
#[macro_export]
macro_rules! edge {
    ($([($sn:expr, $sl:expr), ($tn:expr, $tl:expr)]),+ $(,)?) => {
        vec![$($crate::edge![($sn, $sl), ($tn, $tl)]),+]
    };
    (($sn:expr, $sl:expr), ($tn:expr, $tl:expr)) => {
        $crate::types::Edge::new(
            $crate::types::Leg::new($sn, $sl),
            $crate::types::Leg::new($tn, $tl),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_from_json() {
        let ids: Vec<NodeId> = serde_json::from_str(r#"["n1", 7]"#).unwrap();
        assert_eq!(ids, vec![NodeId::from("n1"), NodeId::from("7")]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"["n1","7"]"#);
    }

    #[test]
    fn canonical_endpoints_ignore_direction() {
        let forward = edge![("b", 0), ("a", 1)];
        let backward = edge![("a", 1), ("b", 0)];
        assert_eq!(forward.canonical_endpoints(), backward.canonical_endpoints());
        assert_eq!(forward.canonical_endpoints().0, &Leg::new("a", 1));
    }

    #[test]
    fn canonical_endpoints_same_node() {
        let e = edge![("a", 2), ("a", 0)];
        assert_eq!(
            e.canonical_endpoints(),
            (&Leg::new("a", 0), &Leg::new("a", 2))
        );
    }

    #[test]
    fn edge_macro_list() {
        let edges = edge![[("a", 0), ("b", 0)], [("b", 1), ("c", 0)]];
        assert_eq!(edges[1].to_string(), "b[1] -- c[0]");
    }
}
