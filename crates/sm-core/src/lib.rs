//! Shared primitives used across Scrollmark crates.

mod geometry;

pub use geometry::Rect;
pub use geometry::SideOffsets;

/// Result alias used across the workspace.
pub type ScrollmarkResult<T> = Result<T, ScrollmarkError>;

/// Workspace-wide error: a dotted machine-readable code plus a human message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ScrollmarkError {
    pub code: &'static str,
    pub message: String,
}

impl ScrollmarkError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

#[cfg(test)]
mod tests {
    use super::ScrollmarkError;

    #[test]
    fn displays_code_and_message() {
        let error = ScrollmarkError::new("dom.selector.invalid", "unexpected `]`");
        assert_eq!(error.to_string(), "dom.selector.invalid: unexpected `]`");
        assert!(error.is("dom.selector.invalid"));
    }
}
