//! Utility macros for the parser crate.

/// Returns early with an error if a condition is not met.
///
/// Works like `assert!`, but hands the error back to the caller instead of panicking,
/// which is what every state of the parser does on a protocol violation.
///
/// # Example
///
/// ```ignore
/// ensure!(byte == b'\n', ParseErrorKind::LfExpected);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
