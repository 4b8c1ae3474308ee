//! Diagnostics reported back to the host.
//!
//! Every operation collects its diagnostics in a [`Diagnostics`] bag.
//! Errors short-circuit the operation; warnings accumulate and travel back
//! with the resulting state.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Render a provider error for the host.
    ///
    /// The summary names the resource kind and identity when the error
    /// carries them; the detail holds the full message.
    pub fn from_error(err: &ProviderError) -> Self {
        Self::error(err.summary()).with_detail(err.to_string())
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Set the attribute path unless it is empty (the record root).
    pub(crate) fn with_attribute_if_not_empty(self, attribute: &str) -> Self {
        if attribute.is_empty() {
            self
        } else {
            self.with_attribute(attribute)
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }
}

/// The diagnostics collected during one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Add an error diagnostic for an attribute.
    pub fn error(&mut self, attribute: &str, summary: impl Into<String>) {
        self.push(Diagnostic::error(summary).with_attribute_if_not_empty(attribute));
    }

    /// Add a warning diagnostic for an attribute.
    pub fn warning(&mut self, attribute: &str, summary: impl Into<String>) {
        self.push(Diagnostic::warning(summary).with_attribute_if_not_empty(attribute));
    }

    /// Append every diagnostic from another bag.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    /// Whether any error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Iterate over warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    /// Fail with the first recorded error, if any.
    pub fn check(&self) -> Result<(), ProviderError> {
        match self.items.iter().find(|d| d.is_error()) {
            Some(first) => {
                let mut message = first.summary.clone();
                if let Some(attr) = &first.attribute {
                    message = format!("{message} (at {attr})");
                }
                if let Some(detail) = &first.detail {
                    message = format!("{message}: {detail}");
                }
                Err(ProviderError::Validation(message))
            },
            None => Ok(()),
        }
    }

    /// Consume the bag.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self { items }
    }
}
