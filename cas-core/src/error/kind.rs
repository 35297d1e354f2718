use ariadne::Fmt;
use cas_attrs::ErrorKind;
use cas_error::EXPR;

/// A number was divided by zero.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "divide by zero",
    labels = ["this statement divides by zero"],
)]
pub struct DivideByZero;

/// Evaluation nested too deeply, usually because a symbol is defined in terms of itself.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "circular definition",
    labels = ["evaluating this statement never terminates"],
    help = format!("check for a symbol defined in terms of itself, such as {}", "`x = x + 1`".fg(EXPR)),
)]
pub struct CircularDefinition;

/// Two tensors that must have the same shape do not.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "tensor dimensions do not match",
    labels = [format!("expected dimensions {:?}, found {:?}", self.expected, self.found)],
)]
pub struct TensorDimensionMismatch {
    /// The dimensions of the first operand.
    pub expected: Vec<usize>,

    /// The dimensions of the offending operand.
    pub found: Vec<usize>,
}

/// A tensor would exceed the maximum supported rank.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "tensor rank too large",
    labels = [format!("this would create a tensor of rank {}", self.rank)],
    help = "the maximum rank is 24",
)]
pub struct RankTooLarge {
    /// The rank that was requested.
    pub rank: usize,
}

/// An operation that requires a square matrix was given something else.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` requires a square matrix", self.function),
    labels = ["this argument is not a square matrix"],
)]
pub struct NotSquareMatrix {
    /// The name of the function.
    pub function: &'static str,
}

/// A matrix with determinant zero was inverted.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "singular matrix",
    labels = ["this matrix has no inverse"],
)]
pub struct SingularMatrix;

/// A tensor index was outside the dimensions of the tensor.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "index out of range",
    labels = [format!("index {} is out of range for an axis of size {}", self.index, self.size)],
    help = "tensor indices start at 1",
)]
pub struct IndexOutOfRange {
    /// The index that was given.
    pub index: i64,

    /// The size of the indexed axis.
    pub size: usize,
}

/// A function was given an argument it cannot work with.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid argument to `{}`", self.function),
    labels = [format!("expected {}", self.expected)],
)]
pub struct InvalidArgument {
    /// The name of the function.
    pub function: &'static str,

    /// A description of what was expected.
    pub expected: &'static str,
}

/// A relational operator or condition could not be decided.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "cannot decide this condition",
    labels = ["this condition does not evaluate to a number"],
    help = format!("try {} to see what the condition evaluates to", "`float`".fg(EXPR)),
)]
pub struct UndecidableCondition;

/// The logarithm of zero was taken.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "logarithm of zero",
    labels = ["this statement takes the logarithm of zero"],
)]
pub struct LogOfZero;

/// An exponent was too large to compute exactly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "exponent too large",
    labels = ["this exponent is too large to compute exactly"],
    help = format!("use {} to compute an approximation", "`float`".fg(EXPR)),
)]
pub struct ExponentTooLarge;

/// Every symbol slot in a bucket of the symbol table is in use.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "symbol table full",
    labels = [format!("cannot create the symbol `{}`", self.name)],
    help = format!("use {} to remove unused symbols", "`clear`".fg(EXPR)),
)]
pub struct SymbolTableFull {
    /// The name of the symbol that could not be created.
    pub name: String,
}

/// No template of the integral table matched the integrand.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "integral not found",
    labels = ["no antiderivative was found for this expression"],
)]
pub struct NoIntegralFound;

/// The roots of a polynomial could not be found in closed form.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "roots not found",
    labels = ["this polynomial has no roots expressible in closed form"],
    help = format!("use {} to find the roots numerically", "`nroots`".fg(EXPR)),
)]
pub struct RootsNotFound;

/// An iterative numerical method failed to converge.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "convergence failure",
    labels = [format!("`{}` did not converge", self.function)],
)]
pub struct ConvergenceFailure {
    /// The name of the function.
    pub function: &'static str,
}

/// A `check` condition was false.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "check failed",
    labels = ["this condition is false"],
)]
pub struct CheckFailed;

/// The script called `stop`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "stop function called",
    labels = ["evaluation stopped here"],
)]
pub struct UserStop;

/// Evaluation was interrupted from outside.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "interrupted",
    labels = ["evaluation of this statement was interrupted"],
)]
pub struct Interrupted;

/// The operand stack exceeded its capacity.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(fatal, message = "operand stack overflow", labels = ["while evaluating this"])]
pub struct StackOverflow;

/// A value was popped from an empty operand stack.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(fatal, message = "operand stack underflow", labels = ["while evaluating this"])]
pub struct StackUnderflow;

/// The frame stack exceeded its capacity.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(fatal, message = "frame stack overflow", labels = ["while evaluating this"])]
pub struct FrameOverflow;

/// The undo journal exceeded its capacity.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(fatal, message = "journal overflow", labels = ["while evaluating this"])]
pub struct JournalOverflow;

/// The node arena is full and cannot grow.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    fatal,
    message = "out of memory",
    labels = ["while evaluating this"],
    help = "the node arena reached its maximum number of blocks",
)]
pub struct ArenaExhausted;

/// An internal invariant was broken.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    fatal,
    message = format!("internal error: {}", self.message),
    labels = ["while evaluating this"],
)]
pub struct InternalError {
    /// A description of the broken invariant.
    pub message: &'static str,
}
