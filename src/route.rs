use std::fmt;

use crate::error::ParseError;
use crate::parser::Parser;
use crate::section::Section;
use crate::sections::Sections;

/// A parsed route pattern.
///
/// Holds the section sequence and the canonical rendered string. The
/// canonical form is stable: regexp placeholders are normalized to their
/// anchored `^…$` spelling, so `/{v|[0-9]}` and `/{v|^[0-9]$}` render the
/// same.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    sections: Sections,
    canonical: String,
}

impl Route {
    /// Parses a pattern into a route.
    ///
    /// ```rust
    /// let route = waymark::parse("/posts/{post_id}/comments/{id}")?;
    /// assert_eq!(route.canonical(), "/posts/{post_id}/comments/{id}");
    /// # Ok::<(), waymark::ParseError>(())
    /// ```
    pub fn parse(pattern: &str) -> Result<Route, ParseError> {
        Parser::new(pattern).parse()
    }

    pub(crate) fn from_sections(sections: Sections) -> Route {
        let canonical = sections.to_string();
        Route {
            sections,
            canonical,
        }
    }

    /// The pattern as re-rendered from the parsed sections.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub(crate) fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Placeholder names in declaration order.
    pub(crate) fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(Section::slot_name)
    }

    /// Expands the route into the forms the tree actually stores.
    ///
    /// A trailing optional placeholder produces the route without it (and
    /// without a preceding slash) plus the route with the placeholder made
    /// required; a trailing wildcard produces the route without it plus the
    /// route as-is. Anything else expands to itself.
    ///
    /// ```rust
    /// let route = waymark::parse("/first/{name?}")?;
    /// let forms: Vec<String> = route.expand().iter().map(ToString::to_string).collect();
    /// assert_eq!(forms, ["/first", "/first/{name}"]);
    /// # Ok::<(), waymark::ParseError>(())
    /// ```
    pub fn expand(&self) -> Vec<Route> {
        match self.sections.last() {
            Some(Section::Optional { .. }) => {
                let mut with = self.sections.clone();
                if let Some(slot) = with.pop() {
                    with.push(slot.into_required());
                }
                vec![self.without_trailing_slot(), Route::from_sections(with)]
            }
            Some(Section::Wildcard { .. }) => {
                vec![self.without_trailing_slot(), self.clone()]
            }
            _ => vec![self.clone()],
        }
    }

    /// Drops the final placeholder, plus the slash in front of it when one
    /// is there to drop (`/first/{x?}` becomes `/first`, but
    /// `/users/{id}.{x?}` keeps its `.` and `/{x?}` keeps its root slash).
    fn without_trailing_slot(&self) -> Route {
        let mut sections = self.sections.clone();
        sections.pop();
        if sections.section_count() > 1 && matches!(sections.last(), Some(Section::Slash)) {
            sections.pop();
        }
        Route::from_sections(sections)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
