use tracing::debug;

use crate::occlusion::node::Node;
use crate::validation::Reporter;

/// Detects directories claimed by more than one owner, either directly or by
/// nesting one owner's directory below another's.
///
/// A checker is filled through [`add`](Checker::add) and then queried once
/// through [`conflicts`](Checker::conflicts).
#[derive(Debug, Default)]
pub struct Checker {
    root: Node,
    claims: usize,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `owner` claims the `/`-delimited relative `path`, with
    /// `note` as a human readable justification. Paths are not validated:
    /// empty segments become ordinary directories named by the empty string.
    pub fn add(&mut self, path: &str, owner: impl Into<String>, note: impl Into<String>) {
        let owner = owner.into();
        debug!("Registering '{}' for owner '{}'", path, owner);

        let node = path
            .split('/')
            .fold(&mut self.root, |node, segment| node.child_mut(segment));
        node.claim(owner, note.into());
        self.claims += 1;
    }

    /// Reports every conflict to `ctx` and returns whether any was found.
    ///
    /// Children are visited in lexicographic order, so the reported messages
    /// only depend on the set of claims and not on the order they were added.
    /// Once a directory is found to be conflicting, nothing below it is
    /// inspected.
    pub fn conflicts<R>(&self, ctx: &mut R) -> bool
    where
        R: Reporter + ?Sized,
    {
        debug!("Checking {} directory claims for conflicts", self.claims);
        let found = self.root.find_conflicts(ctx);
        debug!("Directory conflicts found: {}", found);
        found
    }
}
