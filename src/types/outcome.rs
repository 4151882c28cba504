//! Value-or-error results delivered by tasks.

/// Boxed error type used as the default error slot of an [`Outcome`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result of a task: exactly one of a value or an error.
///
/// Produced by task bodies handed to [`process`](crate::combinator::process)
/// and [`co_begin`](crate::combinator::co_begin). The toolkit never inspects
/// the error slot; consumers check it before using the value.
///
/// # Example
///
/// ```
/// use cosync::types::Outcome;
///
/// let ok: Outcome<u32, String> = Outcome::ok(3);
/// assert_eq!(ok.value(), Some(&3));
/// assert!(ok.error().is_none());
///
/// let failed: Outcome<u32, String> = Outcome::err("boom".to_string());
/// assert!(failed.is_err());
/// assert!(failed.value().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an Outcome may carry an error that should be checked"]
pub enum Outcome<T, E = BoxError> {
    /// The task produced a value.
    Ok(T),
    /// The task failed.
    Err(E),
}

impl<T, E> Outcome<T, E> {
    /// Creates a value outcome.
    pub const fn ok(value: T) -> Self {
        Self::Ok(value)
    }

    /// Creates an error outcome.
    pub const fn err(error: E) -> Self {
        Self::Err(error)
    }

    /// Returns true if this outcome carries a value.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome carries an error.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns the value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Err(_) => None,
        }
    }

    /// Returns the error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::Ok(_) => None,
            Self::Err(error) => Some(error),
        }
    }

    /// Maps the value slot, leaving an error untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Err(error) => Outcome::Err(error),
        }
    }

    /// Converts into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Err(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
