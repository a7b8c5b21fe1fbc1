use std::fmt;

use regex::Regex;

/// The set of bytes at which a placeholder stops consuming input.
///
/// `/` is always a member. Parsing adds at most one more byte: the first
/// byte of the literal that immediately follows the placeholder, so that
/// `{major}` in `/v{major}.{minor}` stops at the `.`. When two routes come
/// to share a placeholder on one tree edge, their sets are unioned.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct DelimiterSet {
    bits: [u64; 4],
}

impl DelimiterSet {
    pub(crate) fn slash() -> Self {
        let mut set = DelimiterSet { bits: [0; 4] };
        set.insert(b'/');
        set
    }

    pub(crate) fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1 << (byte & 63);
    }

    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1 << (byte & 63)) != 0
    }

    pub(crate) fn union(&mut self, other: &DelimiterSet) {
        for (word, extra) in self.bits.iter_mut().zip(other.bits) {
            *word |= extra;
        }
    }
}

impl fmt::Debug for DelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for byte in 0..=u8::MAX {
            if self.contains(byte) {
                set.entry(&(byte as char));
            }
        }
        set.finish()
    }
}

/// The smallest atomic unit of a route: a slash, a run of literal text, or
/// one placeholder.
#[derive(Debug, Clone)]
pub(crate) enum Section {
    /// A single `/`.
    Slash,
    /// Literal text between separators; never empty, never contains `/`.
    Literal { text: String },
    /// `{name}`: captures at least one byte, up to the next delimiter.
    Required {
        name: String,
        delimiters: DelimiterSet,
    },
    /// `{name?}`: like required, but an empty capture also succeeds.
    /// Only exists pre-expansion; the tree never stores one.
    Optional {
        name: String,
        delimiters: DelimiterSet,
    },
    /// `{name*}`: captures the entire remainder, slashes included.
    Wildcard {
        name: String,
        delimiters: DelimiterSet,
    },
    /// `{name|^…$}`: like required, but the capture must match the
    /// anchored pattern.
    Regexp {
        name: String,
        pattern: Regex,
        source: String,
        delimiters: DelimiterSet,
    },
}

impl Section {
    pub(crate) fn literal(text: impl Into<String>) -> Self {
        Section::Literal { text: text.into() }
    }

    pub(crate) fn required(name: impl Into<String>) -> Self {
        Section::Required {
            name: name.into(),
            delimiters: DelimiterSet::slash(),
        }
    }

    pub(crate) fn optional(name: impl Into<String>) -> Self {
        Section::Optional {
            name: name.into(),
            delimiters: DelimiterSet::slash(),
        }
    }

    pub(crate) fn wildcard(name: impl Into<String>) -> Self {
        Section::Wildcard {
            name: name.into(),
            delimiters: DelimiterSet::slash(),
        }
    }

    pub(crate) fn regexp(name: impl Into<String>, pattern: Regex, source: String) -> Self {
        Section::Regexp {
            name: name.into(),
            pattern,
            source,
            delimiters: DelimiterSet::slash(),
        }
    }

    /// Match-time tiebreak between siblings; higher is tried first.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Section::Slash => 6,
            Section::Literal { .. } => 5,
            Section::Regexp { .. } => 4,
            Section::Required { .. } => 3,
            Section::Optional { .. } => 2,
            Section::Wildcard { .. } => 1,
        }
    }

    /// Rendered length in characters, as used for tree indentation.
    pub(crate) fn len(&self) -> usize {
        match self {
            Section::Slash => 1,
            Section::Literal { text } => text.chars().count(),
            // {name}
            Section::Required { name, .. } => name.chars().count() + 2,
            // {name?} / {name*}
            Section::Optional { name, .. } | Section::Wildcard { name, .. } => {
                name.chars().count() + 3
            }
            // {name|^…$}
            Section::Regexp { name, source, .. } => {
                name.chars().count() + source.chars().count() + 3
            }
        }
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        !matches!(self, Section::Slash | Section::Literal { .. })
    }

    /// The capture name, for placeholder sections.
    pub(crate) fn slot_name(&self) -> Option<&str> {
        match self {
            Section::Slash | Section::Literal { .. } => None,
            Section::Required { name, .. }
            | Section::Optional { name, .. }
            | Section::Wildcard { name, .. }
            | Section::Regexp { name, .. } => Some(name),
        }
    }

    pub(crate) fn delimiters_mut(&mut self) -> Option<&mut DelimiterSet> {
        match self {
            Section::Slash | Section::Literal { .. } => None,
            Section::Required { delimiters, .. }
            | Section::Optional { delimiters, .. }
            | Section::Wildcard { delimiters, .. }
            | Section::Regexp { delimiters, .. } => Some(delimiters),
        }
    }

    pub(crate) fn delimiters(&self) -> Option<&DelimiterSet> {
        match self {
            Section::Slash | Section::Literal { .. } => None,
            Section::Required { delimiters, .. }
            | Section::Optional { delimiters, .. }
            | Section::Wildcard { delimiters, .. }
            | Section::Regexp { delimiters, .. } => Some(delimiters),
        }
    }

    /// Whether two placeholders occupy the same position in the tree.
    ///
    /// Names are not part of a placeholder's tree identity: `/{title}` and
    /// `/{name}` land on the same node (and conflict there). Plain
    /// placeholders form one class; regexp placeholders split further by
    /// their canonical pattern.
    pub(crate) fn same_slot(&self, other: &Section) -> bool {
        match (self, other) {
            (
                Section::Required { .. } | Section::Optional { .. } | Section::Wildcard { .. },
                Section::Required { .. } | Section::Optional { .. } | Section::Wildcard { .. },
            ) => true,
            (Section::Regexp { source: a, .. }, Section::Regexp { source: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Attempts to consume a prefix of `path`. Returns the number of bytes
    /// consumed, plus the captured text for placeholder sections.
    pub(crate) fn match_prefix<'p>(&self, path: &'p str) -> Option<(usize, Option<&'p str>)> {
        match self {
            Section::Slash => path.starts_with('/').then_some((1, None)),
            Section::Literal { text } => {
                let prefix = path.as_bytes().get(..text.len())?;
                prefix
                    .eq_ignore_ascii_case(text.as_bytes())
                    .then_some((text.len(), None))
            }
            Section::Required { delimiters, .. } => {
                let end = seek_delimiter(path, delimiters);
                (end > 0).then(|| (end, Some(&path[..end])))
            }
            Section::Optional { delimiters, .. } => {
                let end = seek_delimiter(path, delimiters);
                Some((end, Some(&path[..end])))
            }
            Section::Wildcard { .. } => Some((path.len(), Some(path))),
            Section::Regexp {
                pattern,
                delimiters,
                ..
            } => {
                let end = seek_delimiter(path, delimiters);
                (end > 0 && pattern.is_match(&path[..end])).then(|| (end, Some(&path[..end])))
            }
        }
    }

    /// Converts an optional placeholder into its required form, keeping the
    /// name and delimiters. Used by route expansion.
    pub(crate) fn into_required(self) -> Section {
        match self {
            Section::Optional { name, delimiters } => Section::Required { name, delimiters },
            other => other,
        }
    }
}

// Delimiters are all ASCII, so the scan always stops on a character
// boundary and the capture slice stays valid UTF-8.
fn seek_delimiter(path: &str, delimiters: &DelimiterSet) -> usize {
    path.bytes()
        .position(|b| delimiters.contains(b))
        .unwrap_or(path.len())
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Section::Slash, Section::Slash) => true,
            (Section::Literal { text: a }, Section::Literal { text: b }) => a == b,
            (Section::Required { name: a, .. }, Section::Required { name: b, .. })
            | (Section::Optional { name: a, .. }, Section::Optional { name: b, .. })
            | (Section::Wildcard { name: a, .. }, Section::Wildcard { name: b, .. }) => a == b,
            (
                Section::Regexp {
                    name: a, source: sa, ..
                },
                Section::Regexp {
                    name: b, source: sb, ..
                },
            ) => a == b && sa == sb,
            _ => false,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Slash => f.write_str("/"),
            Section::Literal { text } => f.write_str(text),
            Section::Required { name, .. } => write!(f, "{{{name}}}"),
            Section::Optional { name, .. } => write!(f, "{{{name}?}}"),
            Section::Wildcard { name, .. } => write!(f, "{{{name}*}}"),
            Section::Regexp { name, source, .. } => write!(f, "{{{name}|{source}}}"),
        }
    }
}
