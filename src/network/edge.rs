//! Direction-normalized edge identities.

use std::fmt;
use std::sync::Arc;

/// A direction-normalized pair of node identifiers.
///
/// `(u, v)` and `(v, u)` collapse to the same key, so membership tests and
/// overlap counts never depend on the orientation a loader happened to use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    a: Arc<str>,
    b: Arc<str>,
}

impl EdgeKey {
    /// Builds the canonical key for an endpoint pair, in either order.
    pub fn new(u: Arc<str>, v: Arc<str>) -> Self {
        if u <= v {
            Self { a: u, b: v }
        } else {
            Self { a: v, b: u }
        }
    }

    /// The endpoints in canonical (lexicographic) order.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}--{}", self.a, self.b)
    }
}

/// Sign of an edge weight, collapsed to -1, 0 or +1.
pub fn weight_sign(weight: f64) -> i8 {
    if weight > 0.0 {
        1
    } else if weight < 0.0 {
        -1
    } else {
        0
    }
}

/// An edge identity as counted by the set sizing engine: the normalized
/// endpoint pair, optionally extended with the weight sign.
///
/// Under signed comparison, an interaction that flips sign between two
/// replicates yields two distinct identities for the same endpoint pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdentity {
    pub key: EdgeKey,
    pub sign: Option<i8>,
}

impl EdgeIdentity {
    pub fn unsigned(key: EdgeKey) -> Self {
        Self { key, sign: None }
    }

    pub fn signed(key: EdgeKey, weight: f64) -> Self {
        Self {
            key,
            sign: Some(weight_sign(weight)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn arc(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_edge_key_ignores_orientation() {
        let forward = EdgeKey::new(arc("sp1"), arc("sp2"));
        let reverse = EdgeKey::new(arc("sp2"), arc("sp1"));
        assert_eq!(forward, reverse);
        assert_eq!(forward.endpoints(), ("sp1", "sp2"));
    }

    #[rstest]
    #[case(2.5, 1)]
    #[case(-0.1, -1)]
    #[case(0.0, 0)]
    fn test_weight_sign(#[case] weight: f64, #[case] expected: i8) {
        assert_eq!(weight_sign(weight), expected);
    }

    #[test]
    fn test_signed_identity_splits_on_sign() {
        let key = EdgeKey::new(arc("sp1"), arc("sp2"));
        let positive = EdgeIdentity::signed(key.clone(), 1.0);
        let negative = EdgeIdentity::signed(key.clone(), -1.0);
        assert_ne!(positive, negative);
        assert_eq!(EdgeIdentity::unsigned(key.clone()), EdgeIdentity::unsigned(key));
    }
}
