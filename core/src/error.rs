//! Error types, the last-error record and the error handlers.
//!
//! Every failure inside a [`MockContext`](crate::MockContext) is a
//! [`MockError`]. The context stores it in an [`ErrorRecord`] and hands the
//! record to its [`ErrorHandler`]. The handler decides the policy: the
//! default panics, [`handlers::terminate`] exits the process,
//! [`handlers::record`] logs and lets the operation return `void`.

use std::cell::OnceCell;
use std::fmt;

use crate::arena::Region;
use crate::type_tag::TypeTag;

/// Formats a diagnostic position, which is omitted when zero.
struct At<'a>(&'a usize);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self.0 > 0 {
            write!(f, " ({})", self.0)
        } else {
            Ok(())
        }
    }
}

/// A configuration or dispatch failure.
///
/// `Display` renders the diagnostic line
/// `"<description>: <function>[ (<position>)][: <actual>[<><expected>]]"`.
///
/// ```
/// use mockarena::{Kind, MockError, TypeTag};
///
/// let err = MockError::UnexpectedParameterType {
///     function: "f4".into(),
///     position: 4,
///     actual: TypeTag::mut_of(Kind::Void),
///     expected: TypeTag::mut_of(Kind::Int),
/// };
/// assert_eq!(err.to_string(), "unexpected parameter type: f4 (4): (void *)<>(int *)");
/// assert_eq!(err.kind().code(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    /// A region of the arena is full.
    #[error("insufficient memory for {region}: {function}")]
    CapacityExceeded { region: Region, function: String },

    /// A checked matcher or responder does not have its parameter's type.
    #[error("unexpected parameter type: {function}{}: {actual}<>{expected}", At(.position))]
    UnexpectedParameterType {
        function: String,
        position: usize,
        actual: TypeTag,
        expected: TypeTag,
    },

    /// The result's tag differs from the tag the caller expects.
    #[error("unexpected return type: {function}: {actual}<>{expected}")]
    UnexpectedReturnType {
        function: String,
        actual: TypeTag,
        expected: TypeTag,
    },

    /// A matcher or responder carries an invalid tag.
    #[error("invalid parameter type: {function}{}: {tag}", At(.position))]
    InvalidParameterType {
        function: String,
        position: usize,
        tag: TypeTag,
    },

    /// An ordering comparison on function addresses.
    #[error("invalid comparison operator: {function}{}", At(.position))]
    InvalidOperator { function: String, position: usize },

    /// No function with this name and arity is configured.
    #[error("function not found in mappings: {function}{}", At(.arity))]
    FunctionNotFound { function: String, arity: usize },

    /// The function exists but none of its mappings accepted the call.
    #[error("no mappings matched for call: {function}{}", At(.arity))]
    NoMappingMatched { function: String, arity: usize },

    /// An ordinary matcher sits past the arity, or an extra one within it.
    #[error("invalid place for matcher: {function}{}", At(.position))]
    InvalidMatcherPlacement { function: String, position: usize },

    /// A parameter reference is zero or past the arity.
    #[error("invalid parameter number: {function}{}", At(.position))]
    InvalidParameterNumber { function: String, position: usize },
}

/// The stable classification of a [`MockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ErrorKind {
    FunctionCapacity = 1,
    MappingCapacity,
    MatcherCapacity,
    ResponderCapacity,
    ListNodeCapacity,
    UnexpectedParameterType,
    UnexpectedReturnType,
    InvalidParameterType,
    InvalidOperator,
    FunctionNotFound,
    NoMappingMatched,
    InvalidMatcherPlacement,
    InvalidParameterNumber,
}

impl ErrorKind {
    /// Numeric code, `1..=13`.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The description that starts every diagnostic of this kind.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FunctionCapacity => "insufficient memory for functions",
            Self::MappingCapacity => "insufficient memory for mappings",
            Self::MatcherCapacity => "insufficient memory for matchers",
            Self::ResponderCapacity => "insufficient memory for responders",
            Self::ListNodeCapacity => "insufficient memory for list nodes",
            Self::UnexpectedParameterType => "unexpected parameter type",
            Self::UnexpectedReturnType => "unexpected return type",
            Self::InvalidParameterType => "invalid parameter type",
            Self::InvalidOperator => "invalid comparison operator",
            Self::FunctionNotFound => "function not found in mappings",
            Self::NoMappingMatched => "no mappings matched for call",
            Self::InvalidMatcherPlacement => "invalid place for matcher",
            Self::InvalidParameterNumber => "invalid parameter number",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl MockError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapacityExceeded { region, .. } => match region {
                Region::Functions => ErrorKind::FunctionCapacity,
                Region::Mappings => ErrorKind::MappingCapacity,
                Region::Matchers => ErrorKind::MatcherCapacity,
                Region::Responders => ErrorKind::ResponderCapacity,
                Region::ListNodes => ErrorKind::ListNodeCapacity,
            },
            Self::UnexpectedParameterType { .. } => ErrorKind::UnexpectedParameterType,
            Self::UnexpectedReturnType { .. } => ErrorKind::UnexpectedReturnType,
            Self::InvalidParameterType { .. } => ErrorKind::InvalidParameterType,
            Self::InvalidOperator { .. } => ErrorKind::InvalidOperator,
            Self::FunctionNotFound { .. } => ErrorKind::FunctionNotFound,
            Self::NoMappingMatched { .. } => ErrorKind::NoMappingMatched,
            Self::InvalidMatcherPlacement { .. } => ErrorKind::InvalidMatcherPlacement,
            Self::InvalidParameterNumber { .. } => ErrorKind::InvalidParameterNumber,
        }
    }

    /// Name of the mock the failure concerns.
    #[must_use]
    pub fn function(&self) -> &str {
        match self {
            Self::CapacityExceeded { function, .. }
            | Self::UnexpectedParameterType { function, .. }
            | Self::UnexpectedReturnType { function, .. }
            | Self::InvalidParameterType { function, .. }
            | Self::InvalidOperator { function, .. }
            | Self::FunctionNotFound { function, .. }
            | Self::NoMappingMatched { function, .. }
            | Self::InvalidMatcherPlacement { function, .. }
            | Self::InvalidParameterNumber { function, .. } => function,
        }
    }

    /// 1-based matcher/responder position, the arity for lookup failures,
    /// or 0 when the failure has no position.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::CapacityExceeded { .. } | Self::UnexpectedReturnType { .. } => 0,
            Self::FunctionNotFound { arity, .. } | Self::NoMappingMatched { arity, .. } => *arity,
            Self::UnexpectedParameterType { position, .. }
            | Self::InvalidParameterType { position, .. }
            | Self::InvalidOperator { position, .. }
            | Self::InvalidMatcherPlacement { position, .. }
            | Self::InvalidParameterNumber { position, .. } => *position,
        }
    }

    /// `(actual, expected)` tags, for the kinds that carry them.
    #[must_use]
    pub fn types(&self) -> Option<(TypeTag, TypeTag)> {
        match self {
            Self::UnexpectedParameterType {
                actual, expected, ..
            }
            | Self::UnexpectedReturnType {
                actual, expected, ..
            } => Some((*actual, *expected)),
            Self::InvalidParameterType { tag, .. } => Some((*tag, *tag)),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Last-error record
// ═══════════════════════════════════════════════════════════════════════════════

/// The most recent failure, with its diagnostic formatted on first request.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    error: MockError,
    message: OnceCell<String>,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(error: MockError) -> Self {
        Self {
            error,
            message: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn error(&self) -> &MockError {
        &self.error
    }

    #[must_use]
    pub fn into_error(self) -> MockError {
        self.error
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Numeric code of the kind.
    #[must_use]
    pub fn code(&self) -> u8 {
        self.error.kind().code()
    }

    #[must_use]
    pub fn function(&self) -> &str {
        self.error.function()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.error.position()
    }

    /// The diagnostic line. Formatted once, then cached.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.get_or_init(|| self.error.to_string())
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Called with the record of every failure.
///
/// When the handler returns, the failed operation yields `void` and leaves
/// the registry untouched.
pub type ErrorHandler = fn(&ErrorRecord);

/// Stock error handlers.
pub mod handlers {
    use super::ErrorRecord;

    /// Panic with the diagnostic. The default: a failed mock fails its test.
    pub fn panic(record: &ErrorRecord) {
        panic!("{}", record.message());
    }

    /// Print the diagnostic to stderr and exit with status 1.
    pub fn terminate(record: &ErrorRecord) {
        log::error!("{}", record.message());
        eprintln!("{}", record.message());
        std::process::exit(1);
    }

    /// Log the diagnostic and continue. Inspect it later through
    /// [`MockContext::last_error`](crate::MockContext::last_error).
    pub fn record(record: &ErrorRecord) {
        log::warn!("{}", record.message());
    }
}
