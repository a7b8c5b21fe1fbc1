#![deny(rust_2018_idioms)]

//! Matches URL paths against registered patterns with typed placeholders.
//!
//! ```rust
//! use waymark::Tree;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = Tree::new();
//! tree.insert("/home", "Welcome!")?;
//! tree.insert("/users/{id}", "A User")?;
//!
//! let matched = tree.at("/users/1")?;
//! assert_eq!(matched.slots.get("id"), Some("1"));
//! assert_eq!(*matched.value, "A User");
//! # Ok(())
//! # }
//! ```
//!
//! `waymark` stores patterns in a compressed radix tree: routes sharing a
//! prefix share the nodes that spell it, and matching a path is a single
//! descent with sibling backtracking instead of a scan over every route.
//!
//! ## Placeholders
//!
//! A pattern is a `/`-separated path whose segments may mix literal text
//! with `{…}` placeholders:
//!
//! ```text
//! Syntax            Behavior
//! {name}            captures one segment (at least one character)
//! {name?}           like {name}, but the route also matches without it
//! {name*}           captures the entire rest of the path, slashes included
//! {name|[0-9]+}     captures one segment, which must match the regexp
//! ```
//!
//! `{name?}` and `{name*}` must be the final segment of a pattern. A
//! placeholder stops capturing at `/` and at the literal character that
//! follows it, so `/v{major}.{minor}` splits `v1.2` into `1` and `2`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = waymark::Tree::new();
//! tree.insert("/v{major}.{minor}", "versioned")?;
//!
//! let matched = tree.at("/v1.2")?;
//! assert_eq!(matched.slots.get("major"), Some("1"));
//! assert_eq!(matched.slots.get("minor"), Some("2"));
//! # Ok(())
//! # }
//! ```
//!
//! Literal text matches case-insensitively (ASCII). Trailing slashes are
//! normalized away on both sides: `/users/` registers `/users`, and
//! matching `/users//` looks up `/users`.
//!
//! ## Precedence
//!
//! Several patterns can cover the same path; siblings are tried in a fixed
//! order of specificity, and matching backtracks when a more specific
//! branch fails deeper down:
//!
//! 1. slashes and literal text
//! 2. regexp placeholders
//! 3. plain placeholders
//! 4. wildcards
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = waymark::Tree::new();
//! tree.insert("/users/settings", "static")?;
//! tree.insert("/users/{id}", "dynamic")?;
//!
//! assert_eq!(*tree.at("/users/settings")?.value, "static");
//! assert_eq!(*tree.at("/users/42")?.value, "dynamic");
//! # Ok(())
//! # }
//! ```
//!
//! Registering two patterns that could never be told apart (`/{name}` and
//! `/{title}`) fails with [`InsertError::Ambiguous`]; registering the same
//! pattern twice fails with [`InsertError::Duplicate`]. A failed insert
//! leaves the tree exactly as it was.
//!
//! ## Concurrency
//!
//! The tree is a passive data structure with no interior locking: one
//! writer at a time, and readers only while no insert is running. Wrap it
//! in a lock (or clone it) for anything fancier.

mod error;
mod lexer;
mod parser;
mod route;
mod section;
mod sections;
mod slots;
mod tree;

pub use error::{InsertError, MatchError, ParseError};
pub use lexer::TokenKind;
pub use route::Route;
pub use slots::Slots;
pub use tree::{Match, Node, Tree};

/// Parses a pattern into a [`Route`] without registering it anywhere.
///
/// ```rust
/// let route = waymark::parse("/{name|[A-Z]}")?;
/// assert_eq!(route.canonical(), "/{name|^[A-Z]$}");
/// assert!(waymark::parse("hello").is_err());
/// # Ok::<(), waymark::ParseError>(())
/// ```
pub fn parse(pattern: &str) -> Result<Route, ParseError> {
    Route::parse(pattern)
}
