//! Generation errors.
//!
//! Tasks never abort the run: each failure is recorded as a
//! [`GenerateError`] and collected into [`Failures`], which the caller
//! receives once the affected phase has drained.

use crate::catalog::{Kind, Node, NodeId};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One failed generation step.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to construct renderer for worker {slot}")]
    Construction {
        slot: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to render {kind} `{name}`")]
    Render {
        kind: Kind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to render single-page {layout}")]
    Layout {
        layout: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error when writing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to write tag file `{0}`")]
    Tagfile(PathBuf, #[source] anyhow::Error),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("entity {0} is not in the catalog")]
    UnknownNode(NodeId),
}

impl GenerateError {
    /// Render failure of `node`.
    pub fn render(node: &Node, source: anyhow::Error) -> Self {
        Self::Render {
            kind: node.kind,
            name: node.qualified_name.clone(),
            source,
        }
    }
}

// ============================================================================
// Failures
// ============================================================================

/// Failures collected from one or more phases.
#[derive(Debug, Default)]
pub struct Failures(Vec<GenerateError>);

impl Failures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: GenerateError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenerateError> {
        self.0.iter()
    }

    /// `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => f.write_str("no errors"),
            1 => f.write_str("1 error"),
            n => write!(f, "{n} errors"),
        }
    }
}

impl std::error::Error for Failures {}

impl From<GenerateError> for Failures {
    fn from(error: GenerateError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for Failures {
    type Item = GenerateError;
    type IntoIter = std::vec::IntoIter<GenerateError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a GenerateError;
    type IntoIter = std::slice::Iter<'a, GenerateError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_summary() {
        let mut failures = Failures::new();
        assert_eq!(failures.to_string(), "no errors");
        assert!(failures.is_empty());

        failures.push(GenerateError::Panicked("boom".into()));
        assert_eq!(failures.to_string(), "1 error");

        failures.push(GenerateError::UnknownNode(NodeId(7)));
        assert_eq!(failures.to_string(), "2 errors");
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_into_result() {
        assert!(Failures::new().into_result().is_ok());
        let failures: Failures = GenerateError::Panicked("x".into()).into();
        assert_eq!(failures.into_result().unwrap_err().len(), 1);
    }

    #[test]
    fn test_render_error_names_entity() {
        let mut node = Node::new(NodeId(2), Kind::Function, "f");
        node.qualified_name = "a::f".into();
        let err = GenerateError::render(&node, anyhow::anyhow!("bad template"));
        assert_eq!(err.to_string(), "failed to render function `a::f`");
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "bad template"
        );
    }
}
