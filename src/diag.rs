//! Error taxonomy for the layout pipeline.
//!
//! Fatal conditions abort the pipeline with a [`LayoutError`]; everything
//! else accumulates as [`Diagnostic`] values on the layout result so the
//! caller decides whether to surface warnings.

use serde::Serialize;
use thiserror::Error;

/// Fatal pipeline errors. No layout is produced when one of these surfaces.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: String },

    #[error("containment cycle involving '{id}'")]
    ContainmentCycle { id: String },
}

/// Non-fatal diagnostic kinds, mirroring the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// An edge endpoint, containment child, or condensation member id did
    /// not resolve. The offending edge/child is dropped.
    Reference,
    /// The edge graph contains a cycle; levels were computed with the cycle
    /// broken at its highest-indegree edge.
    EdgeCycle,
    /// A degenerate quantity (zero-length chord, zero radius) was snapped to
    /// a one-pixel minimum.
    NumericDegenerate,
    /// An iterative stage hit its pass cap without converging; the
    /// best-so-far result was kept.
    BudgetExceeded,
    /// A routed edge or label exceeded the working canvas; the assembler
    /// expanded it.
    CanvasOverflow,
}

/// A single accumulated warning.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
