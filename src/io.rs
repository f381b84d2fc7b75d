//! JSON request and response documents.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ContractionConfig;
use crate::error::ContractionError;
use crate::tensornetwork::contraction::{contract_network, ContractionResult};
use crate::types::{Edge, Leg, Node, NodeId};

/// A contraction request as sent by a client.
///
/// Nodes and edges are kept as raw JSON until [`ContractionRequest::network`]
/// decodes them, so that a malformed record can be reported with its
/// position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractionRequest {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
    /// A matrix string, or an already structured list of rows.
    #[serde(default)]
    pub transform: Value,
}

/// A signature entry: JSON numbers are read through their textual form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawEntry> for String {
    fn from(entry: RawEntry) -> Self {
        match entry {
            RawEntry::Number(number) => number.to_string(),
            RawEntry::Text(text) => text,
        }
    }
}

#[derive(Deserialize)]
struct RawNode {
    id: NodeId,
    arity: usize,
    signature: Vec<RawEntry>,
    #[serde(default)]
    transform: Value,
}

/// Leg index of an edge endpoint: an integer or a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawHandle {
    Index(u64),
    Text(String),
}

impl TryFrom<RawHandle> for usize {
    type Error = String;

    fn try_from(handle: RawHandle) -> Result<Self, Self::Error> {
        match handle {
            RawHandle::Index(index) => {
                usize::try_from(index).map_err(|_| format!("leg index {index} is too large"))
            }
            RawHandle::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("handle {text:?} is not a leg index")),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEdge {
    source: NodeId,
    source_handle: RawHandle,
    target: NodeId,
    target_handle: RawHandle,
}

/// Reads a transform given either as text or as a list of rows. `null` and
/// blank text mean no transform; on a node that falls back to the request's
/// transform.
fn transform_text(value: &Value) -> Result<Option<String>, ContractionError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Array(_) => Ok(Some(value.to_string())),
        other => Err(ContractionError::parse(format!(
            "transform must be a string or a list of rows, got {other}"
        ))),
    }
}

fn decode_node(position: usize, value: &Value) -> Result<Node, ContractionError> {
    let raw = RawNode::deserialize(value).map_err(|err| {
        ContractionError::validation(format!("node {position} is malformed: {err}"))
    })?;
    let transform = transform_text(&raw.transform).map_err(|err| err.in_node(&raw.id))?;
    Ok(Node {
        id: raw.id,
        arity: raw.arity,
        signature: raw.signature.into_iter().map(String::from).collect(),
        transform,
    })
}

fn decode_edge(position: usize, value: &Value) -> Result<Edge, ContractionError> {
    let malformed = |cause: String| {
        ContractionError::validation(format!("edge {position} is malformed: {cause}"))
    };
    let raw = RawEdge::deserialize(value).map_err(|err| malformed(err.to_string()))?;
    let source = usize::try_from(raw.source_handle).map_err(malformed)?;
    let target = usize::try_from(raw.target_handle).map_err(malformed)?;
    Ok(Edge::new(
        Leg::new(raw.source, source),
        Leg::new(raw.target, target),
    ))
}

impl ContractionRequest {
    /// Decodes the nodes, edges and network-wide transform.
    pub fn network(&self) -> Result<(Vec<Node>, Vec<Edge>, Option<String>), ContractionError> {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, value)| decode_node(position, value))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = self
            .edges
            .iter()
            .enumerate()
            .map(|(position, value)| decode_edge(position, value))
            .collect::<Result<Vec<_>, _>>()?;
        let transform = transform_text(&self.transform)?;
        Ok((nodes, edges, transform))
    }

    /// Runs the contraction the request describes.
    pub fn contract(
        &self,
        config: &ContractionConfig,
    ) -> Result<ContractionResult, ContractionError> {
        let (nodes, edges, transform) = self.network()?;
        contract_network(&nodes, &edges, transform.as_deref(), config)
    }
}

/// The response document.
///
/// ```json
/// {"status": "success", "result": {"signature": ["a*c + b*d"], "variables": []}}
/// {"status": "error", "message": "validation error: ..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ContractionResponse {
    Success { result: ContractionResult },
    Error { message: String },
}

impl ContractionResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<ContractionResult, ContractionError>> for ContractionResponse {
    fn from(outcome: Result<ContractionResult, ContractionError>) -> Self {
        match outcome {
            Ok(result) => Self::Success { result },
            Err(err) => Self::Error {
                message: err.to_string(),
            },
        }
    }
}

/// Decodes `body`, contracts the network and shapes the outcome as a
/// response. Every failure, including an undecodable body, becomes an error
/// response.
///
/// # Examples
/// ```
/// # use holocontract::config::ContractionConfig;
/// # use holocontract::io::handle_request;
/// let body = r#"{"nodes": [{"id": "n0", "arity": 1, "signature": [0, 1]}], "edges": []}"#;
/// let response = handle_request(body, &ContractionConfig::default());
/// assert_eq!(
///     serde_json::to_string(&response).unwrap(),
///     r#"{"status":"success","result":{"signature":["0","1"],"variables":["v_n0_0"]}}"#
/// );
/// ```
pub fn handle_request(body: &str, config: &ContractionConfig) -> ContractionResponse {
    let outcome = serde_json::from_str::<ContractionRequest>(body)
        .map_err(ContractionError::from)
        .and_then(|request| request.contract(config));
    if let Err(err) = &outcome {
        warn!(error:% = err; "Contraction request failed");
    } else {
        debug!("Contraction request succeeded");
    }
    outcome.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn respond(body: Value) -> Value {
        let response = handle_request(&body.to_string(), &ContractionConfig::default());
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn empty_request() {
        assert_eq!(
            respond(json!({})),
            json!({"status": "success", "result": {"signature": ["1"], "variables": []}})
        );
    }

    #[test]
    fn numeric_ids_and_handles() {
        let response = respond(json!({
            "nodes": [
                {"id": 1, "arity": 1, "signature": ["a", "b"]},
                {"id": 2, "arity": 1, "signature": [2, 0.5]},
            ],
            "edges": [{"source": 1, "sourceHandle": "0", "target": 2, "targetHandle": 0}],
        }));
        assert_eq!(
            response,
            json!({"status": "success", "result": {"signature": ["2*a + b/2"], "variables": []}})
        );
    }

    #[test]
    fn structured_transform() {
        let response = respond(json!({
            "nodes": [{"id": "h", "arity": 1, "signature": ["a", "b"]}],
            "transform": [[1, 1], [1, "-1"]],
        }));
        assert_eq!(response["result"]["signature"], json!(["a + b", "a - b"]));
    }

    #[test]
    fn node_transform_text() {
        let response = respond(json!({
            "nodes": [
                {"id": "h", "arity": 1, "signature": ["a", "b"], "transform": "[[0, 1], [1, 0]]"},
            ],
        }));
        assert_eq!(response["result"]["signature"], json!(["b", "a"]));
    }

    #[test]
    fn error_response() {
        let response = respond(json!({
            "nodes": [{"id": "n", "arity": 2, "signature": ["1"]}],
        }));
        assert_eq!(
            response,
            json!({
                "status": "error",
                "message": "validation error: node `n`: signature has 1 entries, expected 4 (2^2)",
            })
        );
    }

    #[test]
    fn malformed_edges() {
        for edge in [
            json!({"source": "a", "sourceHandle": 0, "target": "b"}),
            json!({"source": "a", "sourceHandle": -1, "target": "b", "targetHandle": 0}),
            json!({"source": "a", "sourceHandle": "x", "target": "b", "targetHandle": 0}),
            json!({"source": [1], "sourceHandle": 0, "target": "b", "targetHandle": 0}),
        ] {
            let response = respond(json!({
                "nodes": [
                    {"id": "a", "arity": 1, "signature": [1, 0]},
                    {"id": "b", "arity": 1, "signature": [1, 0]},
                ],
                "edges": [edge],
            }));
            assert_eq!(response["status"], "error");
            let message = response["message"].as_str().unwrap();
            assert!(message.starts_with("validation error: edge 0 is malformed"), "{message}");
        }
    }

    #[test]
    fn malformed_node() {
        let response = respond(json!({"nodes": [{"id": "n", "signature": []}]}));
        let message = response["message"].as_str().unwrap();
        assert!(message.starts_with("validation error: node 0 is malformed"), "{message}");
    }

    #[test]
    fn invalid_json_body() {
        let response = handle_request("{nodes: ", &ContractionConfig::default());
        assert!(!response.is_success());
        let ContractionResponse::Error { message } = response else {
            unreachable!();
        };
        assert!(message.starts_with("parse error:"), "{message}");
    }

    #[test]
    fn transform_of_wrong_type() {
        let response = respond(json!({"nodes": [], "transform": 5}));
        assert_eq!(
            response["message"],
            "parse error: transform must be a string or a list of rows, got 5"
        );
    }
}
