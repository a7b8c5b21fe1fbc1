use std::fmt;
use std::mem;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{InsertError, MatchError};
use crate::route::Route;
use crate::section::Section;
use crate::sections::Sections;
use crate::slots::Slots;

type Captures<'p> = SmallVec<[&'p str; 8]>;

/// A pattern that terminates at a node.
///
/// `label` is the pattern as the caller wrote it (canonicalized); `route`
/// is the expanded form this particular node stores. The two differ for
/// the forms produced by optional/wildcard expansion, which makes such a
/// registration *synthetic*: it never conflicts with other patterns and a
/// later real registration may take the node over.
#[derive(Debug, Clone)]
struct Registration<T> {
    label: String,
    route: Route,
    value: T,
}

impl<T> Registration<T> {
    fn is_synthetic(&self) -> bool {
        self.route.canonical() != self.label
    }
}

enum Fate {
    Assign,
    Skip,
    Override,
    Duplicate,
    Ambiguous(String),
}

fn fate<T>(existing: &Option<Registration<T>>, label: &str, canonical: &str) -> Fate {
    let Some(registration) = existing else {
        return Fate::Assign;
    };
    if registration.label == label {
        return Fate::Duplicate;
    }
    if canonical != label {
        // an expansion form landing on an occupied node backs off
        return Fate::Skip;
    }
    if registration.is_synthetic() {
        return Fate::Override;
    }
    Fate::Ambiguous(registration.label.clone())
}

/// One node of the compressed radix tree: the section sequence labelling
/// the edge into it, an optional terminating registration, and its
/// children sorted by descending priority of their first section.
#[derive(Debug, Clone)]
pub struct Node<T> {
    sections: Sections,
    registration: Option<Registration<T>>,
    children: Vec<Node<T>>,
}

impl<T> Node<T> {
    fn leaf(sections: Sections, registration: Registration<T>) -> Node<T> {
        Node {
            sections,
            registration: Some(registration),
            children: Vec::new(),
        }
    }

    /// The canonical registered pattern terminating here, if any.
    pub fn label(&self) -> Option<&str> {
        self.registration
            .as_ref()
            .map(|registration| registration.label.as_str())
    }

    /// The value bound to this node's pattern, if any.
    pub fn value(&self) -> Option<&T> {
        self.registration
            .as_ref()
            .map(|registration| &registration.value)
    }

    fn priority(&self) -> u8 {
        self.sections.iter().next().map_or(0, Section::priority)
    }

    // stable sort: equal priorities keep insertion order
    fn sort_children(&mut self) {
        self.children
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    fn child_for(&self, rest: &Sections) -> Option<&Node<T>> {
        let unit = rest.first_unit()?;
        self.children.iter().find(|child| {
            child
                .sections
                .first_unit()
                .is_some_and(|first| first == unit)
        })
    }

    fn child_for_mut(&mut self, rest: &Sections) -> Option<&mut Node<T>> {
        let unit = rest.first_unit()?;
        self.children.iter_mut().find(|child| {
            child
                .sections
                .first_unit()
                .is_some_and(|first| first == unit)
        })
    }

    /// Read-only conflict probe: reports the duplicate/ambiguous error an
    /// insert of `sections` would hit, without touching the tree. Insert
    /// runs it for every expanded form first, which is what makes a failed
    /// insert leave no trace.
    fn check(&self, sections: &Sections, label: &str, canonical: &str) -> Result<(), InsertError> {
        let lcp = self.sections.longest_common_prefix(sections);
        if lcp < self.sections.unit_len() {
            // a split point is freshly created, or freshly labelled
            return Ok(());
        }
        if lcp == sections.unit_len() {
            return match fate(&self.registration, label, canonical) {
                Fate::Duplicate => Err(InsertError::Duplicate {
                    route: label.to_owned(),
                }),
                Fate::Ambiguous(with) => Err(InsertError::Ambiguous {
                    route: label.to_owned(),
                    with,
                }),
                _ => Ok(()),
            };
        }
        let (_, rest) = sections.split(lcp);
        match self.child_for(&rest) {
            Some(child) => child.check(&rest, label, canonical),
            None => Ok(()),
        }
    }

    fn insert(&mut self, sections: Sections, registration: Registration<T>) {
        let lcp = self.sections.longest_common_prefix(&sections);
        self.sections.merge_slot_delimiters(&sections, lcp);

        if lcp < self.sections.unit_len() {
            // split: the tail, the registration and the children move to a
            // freshly allocated owner
            let (head, tail) = self.sections.split(lcp);
            let split_child = Node {
                sections: tail,
                registration: self.registration.take(),
                children: mem::take(&mut self.children),
            };
            self.sections = head;
            self.children.push(split_child);
            if lcp < sections.unit_len() {
                let (_, rest) = sections.split(lcp);
                self.children.push(Node::leaf(rest, registration));
            } else {
                // the incoming route terminates at the split point
                self.registration = Some(registration);
            }
            self.sort_children();
            return;
        }

        if lcp == sections.unit_len() {
            self.assign(sections, registration);
            return;
        }

        let (_, rest) = sections.split(lcp);
        if let Some(child) = self.child_for_mut(&rest) {
            child.insert(rest, registration);
            return;
        }
        self.children.push(Node::leaf(rest, registration));
        self.sort_children();
    }

    /// Exact landing on an existing node. Duplicate/ambiguous fates were
    /// already rejected by [`check`](Self::check) and leave the node as-is.
    fn assign(&mut self, sections: Sections, registration: Registration<T>) {
        match fate(
            &self.registration,
            &registration.label,
            registration.route.canonical(),
        ) {
            Fate::Assign => self.registration = Some(registration),
            Fate::Override => {
                // the incoming placeholder kind wins (a wildcard may take
                // over a node a required placeholder created), accumulated
                // delimiters survive
                let mut sections = sections;
                let units = sections.unit_len();
                sections.merge_slot_delimiters(&self.sections, units);
                self.sections = sections;
                self.registration = Some(registration);
            }
            Fate::Skip | Fate::Duplicate | Fate::Ambiguous(_) => {}
        }
    }

    fn find_match<'n, 'p>(
        &'n self,
        mut path: &'p str,
        captures: &mut Captures<'p>,
    ) -> Option<&'n Registration<T>> {
        let checkpoint = captures.len();
        for section in self.sections.iter() {
            let consumed = if path.is_empty() {
                None
            } else {
                section.match_prefix(path)
            };
            let Some((consumed, capture)) = consumed.filter(|&(n, _)| n > 0) else {
                captures.truncate(checkpoint);
                return None;
            };
            if let Some(capture) = capture {
                captures.push(capture);
            }
            path = &path[consumed..];
        }

        if path.is_empty() {
            match &self.registration {
                Some(registration) => return Some(registration),
                None => {
                    captures.truncate(checkpoint);
                    return None;
                }
            }
        }

        for child in &self.children {
            if let Some(found) = child.find_match(path, captures) {
                return Some(found);
            }
        }
        captures.truncate(checkpoint);
        None
    }

    fn find_exact(&self, sections: &Sections) -> Option<&Node<T>> {
        let lcp = self.sections.longest_common_prefix(sections);
        if lcp < self.sections.unit_len() {
            return None;
        }
        if lcp == sections.unit_len() {
            return self.registration.is_some().then_some(self);
        }
        let (_, rest) = sections.split(lcp);
        self.child_for(&rest)?.find_exact(&rest)
    }

    fn find_prefix<'n>(
        &'n self,
        sections: &Sections,
        best: Option<&'n Node<T>>,
    ) -> Option<&'n Node<T>> {
        let lcp = self.sections.longest_common_prefix(sections);
        if lcp < self.sections.unit_len() {
            return best;
        }
        let best = if self.registration.is_some() {
            Some(self)
        } else {
            best
        };
        if lcp == sections.unit_len() {
            return best;
        }
        let (_, rest) = sections.split(lcp);
        match self.child_for(&rest) {
            Some(child) => child.find_prefix(&rest, best),
            None => best,
        }
    }

    fn each<F: FnMut(&Node<T>) -> bool>(&self, visitor: &mut F) {
        if !visitor(self) {
            return;
        }
        for child in &self.children {
            child.each(visitor);
        }
    }

    fn render(&self, out: &mut String, indent: usize) {
        for _ in 0..indent {
            out.push('•');
        }
        out.push_str(&self.sections.to_string());
        if let Some(registration) = &self.registration {
            out.push_str(" [from=");
            out.push_str(&registration.label);
            out.push(']');
        }
        out.push('\n');
        let indent = indent + self.sections.len();
        for child in &self.children {
            child.render(out, indent);
        }
    }
}

/// A registered route matched against a concrete path.
#[derive(Debug)]
pub struct Match<'t, 'p, T> {
    /// The input path after trailing-slash normalization.
    pub path: &'p str,
    /// The canonical pattern that matched, as registered.
    pub route: &'t str,
    /// The value bound to the pattern.
    pub value: &'t T,
    /// Captured placeholder bindings in declaration order.
    pub slots: Slots<'t, 'p>,
}

impl<T> fmt::Display for Match<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route)?;
        for (index, (key, value)) in self.slots.iter().enumerate() {
            let separator = if index == 0 { ' ' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// A routing table: maps registered patterns to values and matches
/// concrete paths against the most specific pattern.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = waymark::Tree::new();
/// tree.insert("/hello", "order")?;
/// tree.insert("/hello/{name}", "greet")?;
///
/// let matched = tree.at("/hello/matt")?;
/// assert_eq!(matched.route, "/hello/{name}");
/// assert_eq!(*matched.value, "greet");
/// assert_eq!(matched.slots.get("name"), Some("matt"));
/// # Ok(())
/// # }
/// ```
///
/// The tree is a passive data structure: it assumes a single writer, and
/// readers may only run while no insert is in flight.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    root: Option<Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree { root: None }
    }

    /// Registers a pattern. A trailing slash on the pattern is ignored
    /// (`/users/` registers `/users`).
    ///
    /// A trailing optional or wildcard placeholder installs both expanded
    /// forms, sharing a clone of the value; either every form installs or,
    /// on any conflict, none does.
    pub fn insert(&mut self, pattern: &str, value: T) -> Result<(), InsertError>
    where
        T: Clone,
    {
        let route = Route::parse(trim_trailing_slashes(pattern))?;
        let label = route.canonical().to_owned();
        let expanded = route.expand();

        if let Some(root) = &self.root {
            for form in &expanded {
                root.check(form.sections(), &label, form.canonical())?;
            }
        }

        debug!(route = %label, forms = expanded.len(), "insert");
        for form in expanded {
            let sections = form.sections().clone();
            let registration = Registration {
                label: label.clone(),
                route: form,
                value: value.clone(),
            };
            match &mut self.root {
                Some(root) => root.insert(sections, registration),
                None => self.root = Some(Node::leaf(sections, registration)),
            }
        }
        Ok(())
    }

    /// Matches a concrete path against the registered patterns.
    ///
    /// Trailing slashes are stripped first (a run of slashes collapses to
    /// `/`); siblings are tried most-specific-first with backtracking.
    pub fn at<'t, 'p>(&'t self, path: &'p str) -> Result<Match<'t, 'p, T>, MatchError> {
        let lookup = trim_trailing_slashes(path);
        trace!(path = lookup, "match");
        if self.root.is_none() || lookup.is_empty() || !lookup.starts_with('/') {
            return Err(MatchError::NotFound {
                path: lookup.to_owned(),
            });
        }

        let mut captures = Captures::new();
        let registration = self
            .root
            .as_ref()
            .and_then(|root| root.find_match(lookup, &mut captures))
            .ok_or_else(|| MatchError::NotFound {
                path: lookup.to_owned(),
            })?;

        let mut slots = Slots::new();
        for (key, value) in registration.route.slot_names().zip(captures) {
            slots.push(key, value);
        }
        Ok(Match {
            path: lookup,
            route: &registration.label,
            value: &registration.value,
            slots,
        })
    }

    /// Looks up the node a pattern was registered at. The descent follows
    /// the same structural comparison as insert but never mutates; only a
    /// routable node counts.
    pub fn find(&self, pattern: &str) -> Result<&Node<T>, MatchError> {
        let route = Route::parse(trim_trailing_slashes(pattern))?;
        self.root
            .as_ref()
            .and_then(|root| root.find_exact(route.sections()))
            .ok_or_else(|| MatchError::NotFound {
                path: pattern.to_owned(),
            })
    }

    /// Finds the most specific routable node whose pattern is a prefix of
    /// the given pattern. Used to resolve the closest registered layout
    /// for a path pattern.
    pub fn find_by_prefix(&self, pattern: &str) -> Result<&Node<T>, MatchError> {
        let route = Route::parse(trim_trailing_slashes(pattern))?;
        self.root
            .as_ref()
            .and_then(|root| root.find_prefix(route.sections(), None))
            .ok_or_else(|| MatchError::NotFound {
                path: pattern.to_owned(),
            })
    }

    /// Visits every node depth-first, children in priority order. The
    /// visitor returns whether to descend into the node's subtree.
    pub fn each<F: FnMut(&Node<T>) -> bool>(&self, mut visitor: F) {
        if let Some(root) = &self.root {
            root.each(&mut visitor);
        }
    }

    /// Renders the tree as an indented listing, one node per line; a
    /// routable node carries its registered pattern. An empty tree renders
    /// as the empty string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            root.render(&mut out, 0);
        }
        out
    }
}

impl<T> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn trim_trailing_slashes(input: &str) -> &str {
    let trimmed = input.trim_end_matches('/');
    if trimmed.is_empty() && input.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_collapse() {
        assert_eq!(trim_trailing_slashes("/"), "/");
        assert_eq!(trim_trailing_slashes("//"), "/");
        assert_eq!(trim_trailing_slashes("///"), "/");
        assert_eq!(trim_trailing_slashes("/users/"), "/users");
        assert_eq!(trim_trailing_slashes("/users"), "/users");
        assert_eq!(trim_trailing_slashes(""), "");
    }

    #[test]
    fn empty_tree_renders_empty() {
        let tree: Tree<()> = Tree::new();
        assert_eq!(tree.render(), "");
    }

    #[test]
    fn failed_insert_leaves_no_trace() {
        let mut tree = Tree::new();
        tree.insert("/{name}", 1).unwrap();
        let before = tree.render();

        // the "/" expansion of the wildcard would install cleanly, but the
        // wildcard form collides with {name}; neither may land
        let err = tree.insert("/{last*}", 2).unwrap_err();
        assert_eq!(
            err,
            InsertError::Ambiguous {
                route: "/{last*}".into(),
                with: "/{name}".into()
            }
        );
        assert_eq!(tree.render(), before);
    }

    #[test]
    fn values_survive_cloning_the_tree() {
        let mut tree = Tree::new();
        tree.insert("/a", String::from("a")).unwrap();
        let copy = tree.clone();
        assert_eq!(*copy.at("/a").unwrap().value, "a");
    }
}
