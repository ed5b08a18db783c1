use thiserror::Error;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Invariant {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Invariant {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type covering every failure this library can return.
///
/// Almost all user-reachable conditions in this subsystem are reported through
/// the diagnostics sink on the emit context rather than through `Err` values
/// (see [`crate::metadata::diagnostics`]); the variants here are reserved for
/// conditions that make it impossible to continue the current pass at all.
///
/// # Error Categories
///
/// ## Structural invariant violations
/// - [`Error::Invariant`] - A caller handed this subsystem a symbol shape that
///   the semantic-analysis contract forbids (e.g. a generic instance where a
///   definition is structurally required). These are programmer errors on the
///   producing side, never user diagnostics.
///
/// ## Generation sequencing errors
/// - [`Error::GenerationOrder`] - A delta generation was started against a
///   baseline that is not the most recently produced one, or against a
///   baseline that has not finished building.
///
/// ## Identity errors
/// - [`Error::InvalidIdentity`] - An assembly display name or version string
///   could not be parsed into an identity.
///
/// # Examples
///
/// ```rust
/// use cilemit::{Error, metadata::identity::AssemblyVersion};
///
/// match AssemblyVersion::parse("1.2.banana.4") {
///     Ok(version) => println!("parsed {version}"),
///     Err(Error::InvalidIdentity { message }) => eprintln!("bad version: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An internal structural invariant was violated by the caller.
    ///
    /// The semantic-analysis layer handed this subsystem a symbol shape that
    /// the Symbol contract forbids. The error includes the source location
    /// where the violation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file in which the violation was detected
    /// * `line` - Source line in which the violation was detected
    #[error("Invariant violated - {file}:{line}: {message}")]
    Invariant {
        /// The message describing the violated invariant
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A delta generation was requested out of order.
    ///
    /// Building generation N+1 requires generation N to have fully completed;
    /// the baseline chain is append-only and strictly sequential.
    #[error("Generation sequencing violated: {0}")]
    GenerationOrder(String),

    /// An assembly identity component could not be parsed.
    ///
    /// Raised by display-name and version-string parsing in
    /// [`crate::metadata::identity`].
    #[error("Invalid assembly identity: {message}")]
    InvalidIdentity {
        /// Description of the malformed identity component
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use crate::Error;

    fn raise_invariant() -> crate::Result<()> {
        Err(invariant_error!("expected a definition, got an instance"))
    }

    fn raise_invariant_fmt(arity: usize) -> crate::Result<()> {
        Err(invariant_error!("arity mismatch: {} arguments", arity))
    }

    #[test]
    fn test_invariant_macro_plain() {
        let err = raise_invariant().unwrap_err();
        match err {
            Error::Invariant { message, file, line } => {
                assert_eq!(message, "expected a definition, got an instance");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("expected Invariant"),
        }
    }

    #[test]
    fn test_invariant_macro_format() {
        let err = raise_invariant_fmt(3).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("arity mismatch: 3 arguments"));
        assert!(text.contains("error.rs"));
    }

    #[test]
    fn test_generation_order_display() {
        let err = Error::GenerationOrder("baseline ordinal 2, expected 4".into());
        assert!(err.to_string().contains("ordinal 2"));
    }
}
