use crate::lexer::TokenKind;

/// Errors that can occur while parsing a route pattern.
///
/// No tree mutation ever happens once parsing has failed; the error is
/// reported to the caller verbatim.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Patterns are absolute: the first token must be a `/`.
    #[error("path must start with a slash /")]
    MissingLeadingSlash,

    /// Two placeholders with no literal text between them, e.g. `/{a}{b}`.
    /// There would be no way to tell where one capture ends and the next
    /// begins.
    #[error("slot {0:?} can't have another slot after")]
    SlotAfterSlot(String),

    /// `{name?}` anywhere but the end of the pattern.
    #[error("optional slots must be at the end of the path")]
    OptionalNotAtEnd,

    /// `{name*}` anywhere but the end of the pattern.
    #[error("wildcard slots must be at the end of the path")]
    WildcardNotAtEnd,

    /// A regexp placeholder whose pattern can match the empty string,
    /// e.g. `/{name|[A-Z]*}`.
    #[error("regexp {pattern:?} must match at least one character")]
    EmptyRegexp { pattern: String },

    /// A regexp placeholder whose pattern could match a `/`, which would
    /// let a single segment swallow a path separator.
    #[error("regexp {pattern:?} can't contain '/'")]
    SlashInRegexp { pattern: String },

    /// The regexp placeholder's pattern failed to compile.
    #[error("invalid regexp: {0}")]
    InvalidRegexp(String),

    /// The token stream did not have the expected shape.
    #[error("expected {expected}, got {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },

    /// The lexer rejected the input outright.
    #[error("{0}")]
    Lex(String),
}

/// Errors that can occur when registering a new route.
///
/// ```rust
/// use waymark::{InsertError, Tree};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = Tree::new();
/// tree.insert("/hello/{name}", "greet")?;
///
/// let err = tree.insert("/hello/{name}", "greet").unwrap_err();
/// assert_eq!(
///     err,
///     InsertError::Duplicate { route: "/hello/{name}".into() },
/// );
/// # Ok(())
/// # }
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsertError {
    /// The pattern did not parse; nothing was inserted.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The exact same pattern was already registered.
    #[error("route already exists {route:?}")]
    Duplicate { route: String },

    /// A structurally identical pattern with different placeholder names
    /// was already registered; the two could never be told apart at match
    /// time.
    #[error("route {route:?} is ambiguous with {with:?}")]
    Ambiguous { route: String, with: String },
}

/// A failed lookup.
///
/// ```rust
/// use waymark::{MatchError, Tree};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = Tree::new();
/// tree.insert("/home", "index")?;
///
/// let err = tree.at("/missing").unwrap_err();
/// assert_eq!(err, MatchError::NotFound { path: "/missing".into() });
/// # Ok(())
/// # }
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// No registered route corresponds to the input.
    #[error("no match for {path:?}")]
    NotFound { path: String },

    /// The input to [`Tree::find`](crate::Tree::find) or
    /// [`Tree::find_by_prefix`](crate::Tree::find_by_prefix) is itself a
    /// pattern and failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
