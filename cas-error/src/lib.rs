//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages.
//!
//! Errors come in two classes. Most are recoverable: the statement that raised them is abandoned
//! and the next statement runs normally. A few are **fatal** (see [`ErrorKind::is_fatal`]); they
//! signal a broken internal invariant or an exhausted resource and terminate the current run.

// lets `#[derive(ErrorKind)]` resolve `cas_error::` paths inside this crate's own tests
#[cfg(test)]
extern crate self as cas_error;

use ariadne::{Color, Report};
use std::{any::Any, fmt::Debug, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Send {
    /// Returns the error as [`Any`], so that callers can test for a specific kind of error.
    fn as_any(&self) -> &dyn Any;

    /// Returns `true` if the error is an internal error that cannot be recovered from by
    /// abandoning the current statement.
    fn is_fatal(&self) -> bool {
        false
    }

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;
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

    /// Creates a new error from an already boxed kind.
    pub fn from_boxed(spans: Vec<Range<usize>>, kind: Box<dyn ErrorKind>) -> Self {
        Self { spans, kind }
    }

    /// Returns `true` if the error is fatal.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Returns `true` if the kind of this error is `K`.
    pub fn is<K: 'static>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }
}

#[cfg(test)]
mod tests {
    use ariadne::Source;
    use cas_attrs::ErrorKind;
    use super::*;

    #[derive(Debug, ErrorKind)]
    #[error(
        message = format!("`{}` went wrong", self.name),
        labels = ["this part"],
        help = "try something else",
    )]
    struct Oops {
        name: String,
    }

    #[derive(Debug, ErrorKind)]
    #[error(fatal, message = "internal failure", labels = ["here"])]
    struct Broken;

    /// Renders the report of the error into a plain string.
    fn render(err: &Error, src: &str) -> String {
        let mut buf = Vec::new();
        err.build_report("input").write(("input", Source::from(src)), &mut buf).unwrap();
        String::from_utf8(strip_ansi_escapes::strip(buf)).unwrap()
    }

    #[test]
    fn report_contains_message() {
        let err = Error::new(vec![0..3], Oops { name: "abc".to_string() });
        let text = render(&err, "abc + 1");
        assert!(text.contains("`abc` went wrong"));
        assert!(text.contains("this part"));
        assert!(text.contains("try something else"));
    }

    #[test]
    fn fatal_flag() {
        assert!(!Error::new(vec![0..1], Oops { name: String::new() }).is_fatal());
        assert!(Error::new(vec![0..1], Broken).is_fatal());
    }

    #[test]
    fn downcast_kind() {
        let err = Error::new(vec![0..1], Broken);
        assert!(err.is::<Broken>());
        assert!(!err.is::<Oops>());
    }
}
