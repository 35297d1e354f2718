pub mod kind;

use cas_error::ErrorKind;
use std::ops::Range;

/// An error that occurred while evaluating a statement.
///
/// Evaluation errors are not associated with a region of source code; the statement loop
/// attaches the span of the failing statement with [`Error::into_spanned`].
#[derive(Debug)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: impl ErrorKind + 'static) -> Self {
        Self { kind: Box::new(kind) }
    }

    /// Returns `true` if the error is fatal and the interpreter state should be considered lost.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Returns `true` if the kind of this error is `K`.
    pub fn is<K: 'static>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Attaches the given span to the error, producing an error that can be reported.
    pub fn into_spanned(self, span: Range<usize>) -> cas_error::Error {
        cas_error::Error::from_boxed(vec![span], self.kind)
    }
}

impl From<cas_num::DivideByZero> for Error {
    fn from(_: cas_num::DivideByZero) -> Self {
        Self::new(kind::DivideByZero)
    }
}

/// The result type of every evaluation step.
pub type Result<T> = std::result::Result<T, Error>;
