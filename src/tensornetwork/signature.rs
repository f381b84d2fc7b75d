use log::warn;

use crate::config::UnparsableEntryPolicy;
use crate::error::ContractionError;
use crate::symbolic::{parse_symbolic, Symbolic};
use crate::types::Node;

/// Number of entries a signature over `arity` binary legs has, `None` if it
/// does not fit a `usize`.
pub fn signature_len(arity: usize) -> Option<usize> {
    u32::try_from(arity)
        .ok()
        .and_then(|bits| 1usize.checked_shl(bits))
}

/// Fails unless `actual == 2^arity`.
pub(crate) fn check_signature_len(arity: usize, actual: usize) -> Result<(), ContractionError> {
    let Some(expected) = signature_len(arity) else {
        return Err(ContractionError::validation(format!(
            "arity {arity} is too large to enumerate"
        )));
    };
    if actual != expected {
        return Err(ContractionError::validation(format!(
            "signature has {actual} entries, expected {expected} (2^{arity})"
        )));
    }
    Ok(())
}

/// Parses the raw signature of `node` into symbolic values.
///
/// The length is checked before any entry is parsed. Entries that cannot be
/// read become zero or fail the call depending on `policy`.
///
/// # Examples
/// ```
/// # use holocontract::config::UnparsableEntryPolicy;
/// # use holocontract::tensornetwork::signature::parse_signature;
/// # use holocontract::types::Node;
/// let node = Node::new("n", 1, ["x + x", "1/2"]);
/// let aliases = vec![String::from("I")];
/// let values = parse_signature(&node, &aliases, UnparsableEntryPolicy::Zero).unwrap();
/// assert_eq!(values[0].to_string(), "2*x");
/// assert_eq!(values[1].to_string(), "1/2");
/// ```
pub fn parse_signature(
    node: &Node,
    imaginary_aliases: &[String],
    policy: UnparsableEntryPolicy,
) -> Result<Vec<Symbolic>, ContractionError> {
    check_signature_len(node.arity, node.signature.len()).map_err(|err| err.in_node(&node.id))?;

    node.signature
        .iter()
        .enumerate()
        .map(|(index, entry)| match parse_symbolic(entry, imaginary_aliases) {
            Ok(value) => Ok(value),
            Err(err) => match policy {
                UnparsableEntryPolicy::Zero => {
                    warn!(
                        node:% = node.id, index, entry:?, cause:% = err;
                        "Unparsable signature entry replaced by 0"
                    );
                    Ok(Symbolic::zero())
                }
                UnparsableEntryPolicy::Reject => Err(ContractionError::validation(format!(
                    "node `{}`: signature entry {index} ({entry:?}) is invalid: {err}",
                    node.id
                ))),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> Vec<String> {
        vec![String::from("I"), String::from("i")]
    }

    #[test]
    fn lengths() {
        assert_eq!(signature_len(0), Some(1));
        assert_eq!(signature_len(3), Some(8));
        assert_eq!(signature_len(usize::BITS as usize), None);
    }

    #[test]
    fn imaginary_aliases() {
        let node = Node::new("n", 1, ["i", "2*I + x"]);
        let values = parse_signature(&node, &aliases(), UnparsableEntryPolicy::Zero).unwrap();
        assert_eq!(values[0], Symbolic::imaginary_unit());
        assert_eq!(values[1].to_string(), "x + 2*I");
    }

    #[test]
    fn alias_inside_identifier_is_untouched() {
        let node = Node::new("n", 1, ["pi", "idx"]);
        let values = parse_signature(&node, &aliases(), UnparsableEntryPolicy::Zero).unwrap();
        assert_eq!(values[0], Symbolic::symbol("pi"));
        assert_eq!(values[1], Symbolic::symbol("idx"));
    }

    #[test]
    fn unparsable_becomes_zero() {
        let node = Node::new("n", 1, ["1 +", "3"]);
        let values = parse_signature(&node, &aliases(), UnparsableEntryPolicy::Zero).unwrap();
        assert_eq!(values, [Symbolic::zero(), Symbolic::from_integer(3)]);
    }

    #[test]
    fn unparsable_rejected() {
        let node = Node::new("n", 1, ["1", "sin(x)"]);
        let err = parse_signature(&node, &aliases(), UnparsableEntryPolicy::Reject).unwrap_err();
        let ContractionError::Validation(message) = &err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert!(message.starts_with("node `n`: signature entry 1"), "{message}");
    }

    #[test]
    fn wrong_length() {
        let node = Node::new("n", 2, ["1", "2", "3"]);
        let err = parse_signature(&node, &aliases(), UnparsableEntryPolicy::Zero).unwrap_err();
        assert_eq!(
            err,
            ContractionError::Validation(String::from(
                "node `n`: signature has 3 entries, expected 4 (2^2)"
            ))
        );
    }
}
