//! Validation rules for connections being drawn.
//!
//! The store accepts any edge — including mismatched channel kinds and exact
//! duplicates — so these rules apply only while the user is actively drawing
//! a new connection. Compose validators with [`CompositeValidator`] or chain
//! results manually with [`ValidationResult::and`].

use thiserror::Error;

use crate::connections::{ConnectionMap, Edge};

/// Result of validating a proposed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Connection is allowed.
    Valid,
    /// Connection is rejected with a reason.
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): the first error wins.
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }
}

/// Reasons a proposed connection is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cannot connect a '{source_kind}' output to a '{target_kind}' input")]
    KindMismatch {
        source_kind: String,
        target_kind: String,
    },

    #[error("cannot connect node '{0}' to itself")]
    SelfLoop(String),

    #[error("this connection already exists")]
    Duplicate,

    #[error("{0}")]
    Custom(String),
}

/// A rule applied to a connection while it is being drawn.
///
/// # Example
///
/// ```
/// use workflow_canvas::{ConnectionMap, ConnectionValidator, Edge, ValidationResult};
///
/// struct MaxFanOut(usize);
///
/// impl ConnectionValidator for MaxFanOut {
///     fn validate(&self, edge: &Edge, connections: &ConnectionMap) -> ValidationResult {
///         let existing = connections
///             .edges_from(&edge.source)
///             .filter(|e| e.source_kind == edge.source_kind && e.source_index == edge.source_index)
///             .count();
///         if existing >= self.0 {
///             ValidationResult::Invalid(workflow_canvas::ValidationError::Custom(
///                 "output slot is full".into(),
///             ))
///         } else {
///             ValidationResult::Valid
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, edge: &Edge, connections: &ConnectionMap) -> ValidationResult;
}

/// Requires the source and target channel kinds to agree.
///
/// The store itself never enforces this; it is the rule the editor applies
/// while a new edge is being dragged out.
#[derive(Clone, Copy, Debug, Default)]
pub struct KindMatch;

impl ConnectionValidator for KindMatch {
    fn validate(&self, edge: &Edge, _connections: &ConnectionMap) -> ValidationResult {
        if edge.source_kind == edge.target_kind {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::KindMismatch {
                source_kind: edge.source_kind.clone(),
                target_kind: edge.target_kind.clone(),
            })
        }
    }
}

/// Rejects connections from a node to itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSelfLoop;

impl ConnectionValidator for NoSelfLoop {
    fn validate(&self, edge: &Edge, _connections: &ConnectionMap) -> ValidationResult {
        if edge.source == edge.target {
            ValidationResult::Invalid(ValidationError::SelfLoop(edge.source.clone()))
        } else {
            ValidationResult::Valid
        }
    }
}

/// Rejects exact structural duplicates of an existing edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicate;

impl ConnectionValidator for NoDuplicate {
    fn validate(&self, edge: &Edge, connections: &ConnectionMap) -> ValidationResult {
        if connections.contains(edge) {
            ValidationResult::Invalid(ValidationError::Duplicate)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Runs several validators in order; the first failure short-circuits.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules the editor applies by default while drawing: matching
    /// channel kinds and no self-loops.
    pub fn drawing_rules() -> Self {
        Self::new().add(KindMatch).add(NoSelfLoop)
    }

    /// Add a validator. Validators run in the order they were added.
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, edge: &Edge, connections: &ConnectionMap) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(edge, connections);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::{ConnectionTarget, MAIN_CHANNEL};

    fn edge(source: &str, source_kind: &str, target: &str, target_kind: &str) -> Edge {
        Edge::new(source, source_kind, 0, target, target_kind, 0)
    }

    // ========================================================================
    // KindMatch
    // ========================================================================

    #[test]
    fn test_kind_match_accepts_same_kind() {
        let connections = ConnectionMap::new();
        let result = KindMatch.validate(&edge("A", "main", "B", "main"), &connections);
        assert!(result.is_valid());
    }

    #[test]
    fn test_kind_match_rejects_mismatch() {
        let connections = ConnectionMap::new();
        let result = KindMatch.validate(&edge("A", "main", "B", "aux"), &connections);
        assert_eq!(
            result,
            ValidationResult::Invalid(ValidationError::KindMismatch {
                source_kind: "main".into(),
                target_kind: "aux".into(),
            })
        );
    }

    // ========================================================================
    // NoSelfLoop
    // ========================================================================

    #[test]
    fn test_no_self_loop_rejects_same_node() {
        let connections = ConnectionMap::new();
        let result = NoSelfLoop.validate(&edge("A", "main", "A", "main"), &connections);
        assert_eq!(
            result,
            ValidationResult::Invalid(ValidationError::SelfLoop("A".into()))
        );
    }

    #[test]
    fn test_no_self_loop_accepts_distinct_nodes() {
        let connections = ConnectionMap::new();
        let result = NoSelfLoop.validate(&edge("A", "main", "B", "main"), &connections);
        assert!(result.is_valid());
    }

    // ========================================================================
    // NoDuplicate
    // ========================================================================

    #[test]
    fn test_no_duplicate_rejects_existing_edge() {
        let mut connections = ConnectionMap::new();
        connections.add(
            "A",
            MAIN_CHANNEL,
            0,
            ConnectionTarget::new("B", MAIN_CHANNEL, 0),
        );

        let result = NoDuplicate.validate(&edge("A", "main", "B", "main"), &connections);
        assert_eq!(result, ValidationResult::Invalid(ValidationError::Duplicate));
    }

    #[test]
    fn test_no_duplicate_accepts_different_slot() {
        let mut connections = ConnectionMap::new();
        connections.add(
            "A",
            MAIN_CHANNEL,
            0,
            ConnectionTarget::new("B", MAIN_CHANNEL, 0),
        );

        let candidate = Edge::new("A", "main", 1, "B", "main", 0);
        let result = NoDuplicate.validate(&candidate, &connections);
        assert!(result.is_valid());
    }

    // ========================================================================
    // CompositeValidator
    // ========================================================================

    #[test]
    fn test_composite_passes_all() {
        let connections = ConnectionMap::new();
        let validator = CompositeValidator::drawing_rules();

        let result = validator.validate(&edge("A", "main", "B", "main"), &connections);
        assert!(result.is_valid());
    }

    #[test]
    fn test_composite_short_circuits_on_first_failure() {
        let connections = ConnectionMap::new();
        let validator = CompositeValidator::drawing_rules();

        // Both kind-mismatched and a self-loop: kind check runs first
        let result = validator.validate(&edge("A", "main", "A", "aux"), &connections);
        assert!(matches!(
            result,
            ValidationResult::Invalid(ValidationError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_composite_empty_is_valid() {
        let connections = ConnectionMap::new();
        let validator = CompositeValidator::new();
        assert!(validator
            .validate(&edge("A", "main", "A", "aux"), &connections)
            .is_valid());
    }

    // ========================================================================
    // ValidationResult combinators
    // ========================================================================

    #[test]
    fn test_and_first_error_wins() {
        let ok = ValidationResult::Valid;
        assert!(ok.clone().and(ValidationResult::Valid).is_valid());

        let err1 = ValidationResult::Invalid(ValidationError::Duplicate);
        let err2 = ValidationResult::Invalid(ValidationError::SelfLoop("A".into()));
        assert_eq!(err1.clone().and(err2.clone()), err1);
        assert_eq!(ok.and(err2.clone()), err2);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ValidationError::KindMismatch {
                source_kind: "main".into(),
                target_kind: "aux".into(),
            }
            .to_string(),
            "cannot connect a 'main' output to a 'aux' input"
        );
        assert_eq!(
            ValidationError::SelfLoop("A".into()).to_string(),
            "cannot connect node 'A' to itself"
        );
        assert_eq!(
            ValidationError::Duplicate.to_string(),
            "this connection already exists"
        );
    }
}
