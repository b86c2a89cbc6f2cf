//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages.

use ariadne::{Color, Report};
use std::{any::Any, fmt::Debug, ops::Range};

// the `ErrorKind` derive emits paths through `step_error`, which the tests below also need
#[cfg(test)]
extern crate self as step_error;

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Send {
    /// Returns this error kind as a [`std::any::Any`] reference, useful for downcasting in tests.
    fn as_any(&self) -> &dyn Any;

    /// Builds the report for this error.
    fn build_report(
        &self,
        src_id: &'static str,
        spans: &[Range<usize>],
    ) -> Report<(&'static str, Range<usize>)>;
}

/// An error associated with regions of source code that can be highlighted.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source code that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Build a report from this error kind.
    pub fn build_report(&self, src_id: &'static str) -> Report<(&'static str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne::{Fmt, Source};
    use step_attrs::ErrorKind;

    /// The operand cannot be used where a whole number is expected.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("`{}` is not a whole number", found),
        labels = ["this operand"],
        help = format!("try using a {} here", "whole number".fg(EXPR)),
    )]
    struct NotWholeNumber {
        found: String,
    }

    /// Renders the report for the given error and returns the plain text output.
    fn render(error: &Error, source: &str) -> String {
        let mut buf = Vec::new();
        error
            .build_report("input")
            .write(("input", Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(strip_ansi_escapes::strip(buf)).unwrap()
    }

    #[test]
    fn report_contains_message_and_help() {
        let source = "1/2 + x";
        let error = Error::new(vec![6..7], NotWholeNumber { found: String::from("x") });
        let text = render(&error, source);

        assert!(text.contains("`x` is not a whole number"));
        assert!(text.contains("whole number"));
    }

    #[test]
    fn kind_downcasts() {
        let error = Error::new(vec![0..1], NotWholeNumber { found: String::from("y") });
        let kind = error.kind.as_any().downcast_ref::<NotWholeNumber>().unwrap();
        assert_eq!(kind, &NotWholeNumber { found: String::from("y") });
    }
}
