//! Loggable view of an arbitrary error value.

use serde::Serialize;
use std::error::Error;

/// Message, kind, and trace of an error, each of which may be unknown.
///
/// Absent fields are logged as `null`; building or logging details never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    /// Human-readable message.
    pub message: Option<String>,
    /// Error kind, usually the short type name.
    pub name: Option<String>,
    /// Source chain, one `caused by:` line per cause.
    pub stack: Option<String>,
}

impl ErrorDetails {
    /// Details with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Override the kind.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<E> From<&E> for ErrorDetails
where
    E: Error + ?Sized,
{
    fn from(error: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        Self {
            message: Some(error.to_string()),
            name: Some(short_type_name(std::any::type_name::<E>()).to_string()),
            stack: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }
}

/// `a::b::Thing<c::D>` → `Thing`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
