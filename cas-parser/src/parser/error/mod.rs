pub mod kind;

/// A general parsing error, pointing at the regions of the source code it originated from.
pub use cas_error::Error;
