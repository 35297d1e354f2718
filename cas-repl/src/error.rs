use ariadne::Source;
use cas_error::Error;

/// Reports the error to stderr, pointing at the statement of `input` that failed.
///
/// The `ariadne` crate's [`Report`](ariadne::Report) type does not implement `Display`, so the
/// report can only be written with its `eprint` method.
pub fn report_to_stderr(err: &Error, input: &str) {
    let report = err.build_report("input");
    if let Err(io_err) = report.eprint(("input", Source::from(input))) {
        log::error!("could not write error report: {}", io_err);
    }
}
