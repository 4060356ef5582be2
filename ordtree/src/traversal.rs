//! Traversal orders for exporting a tree's keys.
//!
//! Binary trees support all three depth-first orders. The B-tree only
//! supports in-order, since a multiway node has no single emission point
//! for its keys relative to its children.

use std::str::FromStr;

/// Depth-first order used when exporting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Node, then left subtree, then right subtree.
    Pre,
    /// Left subtree, node, right subtree. Yields keys in sorted order.
    In,
    /// Left subtree, right subtree, then node.
    Post,
}

impl TraversalOrder {
    /// All orders, in the order they are usually listed.
    pub const ALL: [Self; 3] = [Self::Pre, Self::In, Self::Post];

    /// The short tag used on the command line (`PRE`, `IN`, `POS`).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::In => "IN",
            Self::Post => "POS",
        }
    }
}

impl std::fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TraversalOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRE" => Ok(Self::Pre),
            "IN" => Ok(Self::In),
            "POS" | "POST" => Ok(Self::Post),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

/// Error returned when an order tag is not one of `PRE`, `IN` or `POS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrderError(pub String);

impl std::fmt::Display for ParseOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown traversal order '{}' (expected PRE, IN or POS)", self.0)
    }
}

impl std::error::Error for ParseOrderError {}

/// Error returned when a tree cannot export in the requested order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalError {
    /// The tree has no meaningful emission point for this order.
    UnsupportedOrder(TraversalOrder),
}

impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOrder(order) => {
                write!(f, "traversal order {order} is not supported by this tree")
            }
        }
    }
}

impl std::error::Error for TraversalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("PRE".parse::<TraversalOrder>(), Ok(TraversalOrder::Pre));
        assert_eq!("in".parse::<TraversalOrder>(), Ok(TraversalOrder::In));
        assert_eq!("Pos".parse::<TraversalOrder>(), Ok(TraversalOrder::Post));
    }

    #[test]
    fn test_parse_unknown_tag() {
        let err = "LEVEL".parse::<TraversalOrder>().unwrap_err();
        assert_eq!(err, ParseOrderError("LEVEL".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown traversal order 'LEVEL' (expected PRE, IN or POS)"
        );
    }

    #[test]
    fn test_tag_round_trip() {
        for order in TraversalOrder::ALL {
            assert_eq!(order.tag().parse::<TraversalOrder>(), Ok(order));
        }
    }

    #[test]
    fn test_unsupported_order_display() {
        let err = TraversalError::UnsupportedOrder(TraversalOrder::Pre);
        assert_eq!(
            err.to_string(),
            "traversal order PRE is not supported by this tree"
        );
    }
}
