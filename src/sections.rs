use std::fmt;

use crate::section::Section;

/// One comparable position in a section sequence.
///
/// Literal text contributes one unit per character; a slash and a
/// placeholder are one unit each. A placeholder is atomic: the common
/// prefix either includes all of it or stops in front of it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Unit<'a> {
    Slash,
    Char(char),
    Slot(&'a Section),
}

impl PartialEq for Unit<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Unit::Slash, Unit::Slash) => true,
            (Unit::Char(a), Unit::Char(b)) => a == b,
            (Unit::Slot(a), Unit::Slot(b)) => a.same_slot(b),
            _ => false,
        }
    }
}

fn section_units(section: &Section) -> usize {
    match section {
        Section::Slash => 1,
        Section::Literal { text } => text.chars().count(),
        _ => 1,
    }
}

/// An ordered list of sections: the label of one tree edge, or a whole
/// parsed route.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Sections(Vec<Section>);

impl Sections {
    pub(crate) fn new(sections: Vec<Section>) -> Self {
        Sections(sections)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, section: Section) {
        self.0.push(section);
    }

    pub(crate) fn pop(&mut self) -> Option<Section> {
        self.0.pop()
    }

    pub(crate) fn last(&self) -> Option<&Section> {
        self.0.last()
    }

    pub(crate) fn section_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of comparable units.
    pub(crate) fn unit_len(&self) -> usize {
        self.0.iter().map(section_units).sum()
    }

    /// Total rendered length in characters.
    pub(crate) fn len(&self) -> usize {
        self.0.iter().map(Section::len).sum()
    }

    pub(crate) fn units(&self) -> impl Iterator<Item = Unit<'_>> {
        self.0.iter().flat_map(|section| {
            let (head, text) = match section {
                Section::Slash => (Some(Unit::Slash), ""),
                Section::Literal { text } => (None, text.as_str()),
                slot => (Some(Unit::Slot(slot)), ""),
            };
            head.into_iter().chain(text.chars().map(Unit::Char))
        })
    }

    pub(crate) fn first_unit(&self) -> Option<Unit<'_>> {
        self.units().next()
    }

    /// The number of leading units the two sequences share.
    pub(crate) fn longest_common_prefix(&self, other: &Sections) -> usize {
        self.units()
            .zip(other.units())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Copies the sequence into the first `at` units and the rest. A cut
    /// that lands inside a literal splits its text; `at` always comes from
    /// [`longest_common_prefix`](Self::longest_common_prefix), which never
    /// stops inside a slash or a placeholder.
    pub(crate) fn split(&self, at: usize) -> (Sections, Sections) {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut remaining = at;
        for section in &self.0 {
            if remaining == 0 {
                tail.push(section.clone());
                continue;
            }
            let units = section_units(section);
            if units <= remaining {
                head.push(section.clone());
                remaining -= units;
                continue;
            }
            let Section::Literal { text } = section else {
                unreachable!("split point inside an atomic section");
            };
            let cut = text
                .char_indices()
                .nth(remaining)
                .map_or(text.len(), |(index, _)| index);
            head.push(Section::literal(&text[..cut]));
            tail.push(Section::literal(&text[cut..]));
            remaining = 0;
        }
        (Sections(head), Sections(tail))
    }

    /// Unions the delimiter sets of `other`'s placeholders into the
    /// placeholders this sequence stores, for the first `units` units the
    /// two sequences share. Keeps a tree edge able to stop a capture at
    /// every separator any of its registered routes declared.
    pub(crate) fn merge_slot_delimiters(&mut self, other: &Sections, units: usize) {
        let mut theirs = Vec::new();
        let mut position = 0;
        for section in &other.0 {
            if position >= units {
                break;
            }
            if section.is_placeholder() {
                theirs.push((position, section));
            }
            position += section_units(section);
        }

        let mut theirs = theirs.into_iter().peekable();
        let mut position = 0;
        for section in &mut self.0 {
            if position >= units {
                break;
            }
            if let Some(&(their_position, their_section)) = theirs.peek() {
                if their_position == position {
                    if let (Some(mine), Some(found)) =
                        (section.delimiters_mut(), their_section.delimiters())
                    {
                        mine.union(found);
                    }
                    theirs.next();
                }
            }
            position += section_units(section);
        }
    }
}

impl fmt::Display for Sections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.0 {
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal_route(text: &str) -> Sections {
        // "/slower" -> [/, slower]
        Sections::new(vec![Section::Slash, Section::literal(&text[1..])])
    }

    #[test]
    fn lcp_counts_shared_characters() {
        assert_eq!(
            literal_route("/test").longest_common_prefix(&literal_route("/team")),
            3
        );
        assert_eq!(
            literal_route("/x").longest_common_prefix(&literal_route("/y")),
            1
        );
        assert_eq!(
            literal_route("/x").longest_common_prefix(&literal_route("/x")),
            2
        );
    }

    #[test]
    fn lcp_treats_placeholders_as_single_units() {
        let a = Sections::new(vec![Section::Slash, Section::required("a")]);
        let b = Sections::new(vec![Section::Slash, Section::required("b")]);
        assert_eq!(a.longest_common_prefix(&b), 2);

        let lit = literal_route("/x");
        assert_eq!(a.longest_common_prefix(&lit), 1);
    }

    #[test]
    fn lcp_stops_before_differing_placeholders() {
        let plain = Sections::new(vec![Section::Slash, Section::required("a")]);
        let regexp = Sections::new(vec![
            Section::Slash,
            Section::regexp("a", regex::Regex::new("^[0-9]$").unwrap(), "^[0-9]$".into()),
        ]);
        assert_eq!(plain.longest_common_prefix(&regexp), 1);
    }

    #[test]
    fn split_inside_a_literal_copies_both_halves() {
        let route = literal_route("/slower");
        let (head, tail) = route.split(5);
        assert_eq!(route.to_string(), "/slower");
        assert_eq!(head.to_string(), "/slow");
        assert_eq!(tail.to_string(), "er");
    }

    #[test]
    fn split_at_a_placeholder_boundary() {
        let route = Sections::new(vec![Section::Slash, Section::required("name")]);
        let (head, tail) = route.split(1);
        assert_eq!(head.to_string(), "/");
        assert_eq!(tail.to_string(), "{name}");
    }

    #[test]
    fn split_never_cuts_a_scalar_in_half() {
        let route = literal_route("/αβ");
        let (head, tail) = route.split(2);
        assert_eq!(head.to_string(), "/α");
        assert_eq!(tail.to_string(), "β");
    }

    #[test]
    fn merge_unions_delimiters_within_the_shared_prefix() {
        let mut stored = Sections::new(vec![
            Section::Slash,
            Section::required("post_id"),
            Section::Slash,
            Section::literal("comments"),
        ]);
        let mut dotted = Section::required("post_id");
        if let Some(delimiters) = dotted.delimiters_mut() {
            delimiters.insert(b'.');
        }
        let incoming = Sections::new(vec![Section::Slash, dotted, Section::literal(".")]);

        let lcp = stored.longest_common_prefix(&incoming);
        assert_eq!(lcp, 2);
        stored.merge_slot_delimiters(&incoming, lcp);

        let merged = stored.iter().nth(1).and_then(Section::delimiters).unwrap();
        assert!(merged.contains(b'/'));
        assert!(merged.contains(b'.'));
    }
}
