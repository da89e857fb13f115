//! Per-run conversion reporter.
//!
//! Decoders never log through a global sink directly; they record warnings
//! and errors on a [`Reporter`] that is passed explicitly into each stage.
//! This keeps the pipeline testable and lets the caller inspect everything
//! that went wrong during one component conversion.

/// Collects warnings and errors produced while converting one component.
#[derive(Debug, Default)]
pub struct Reporter {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Reporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and forwards it to the tracing sink.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Records an error and forwards it to the tracing sink.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.errors.push(message);
    }

    /// Returns the recorded warnings in order.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the recorded errors in order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns true if no warnings or errors were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let mut report = Reporter::new();
        assert!(report.is_clean());

        report.warn("first");
        report.warn("second");
        report.error("third");

        assert_eq!(report.warnings(), ["first", "second"]);
        assert_eq!(report.errors(), ["third"]);
        assert!(!report.is_clean());
    }
}
