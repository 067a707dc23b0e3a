use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::ext::{QuoteExt, quoted_list};
use crate::validation::Reporter;

/// One directory of the claimed hierarchy. Full paths are not stored; they
/// are rebuilt while walking so deep hierarchies stay linear in size.
#[derive(Default)]
pub(super) struct Node {
    owner_notes: HashMap<String, HashSet<String>>,
    children: HashMap<String, Node>,
}

/// The nearest node up the chain that had exactly one owner. Its path is the
/// first `path_len` bytes of the path currently being visited.
#[derive(Clone, Copy)]
struct OwnedAncestor<'a> {
    node: &'a Node,
    owner: &'a str,
    path_len: usize,
}

/// A node waiting to be visited, with what it inherits from its parent.
struct Visit<'a> {
    node: &'a Node,
    segment: &'a str,
    parent_len: usize,
    owned_ancestor: Option<OwnedAncestor<'a>>,
}

impl Node {
    pub(super) fn child_mut(&mut self, segment: &str) -> &mut Node {
        self.children.entry(segment.to_string()).or_default()
    }

    pub(super) fn claim(&mut self, owner: String, note: String) {
        self.owner_notes.entry(owner).or_default().insert(note);
    }

    /// Depth-first walk over an explicit stack. Children are pushed in
    /// reverse order so they are popped lexicographically, and the path
    /// buffer is truncated back to the parent before each visit.
    pub(super) fn find_conflicts<R>(&self, ctx: &mut R) -> bool
    where
        R: Reporter + ?Sized,
    {
        let mut found = false;
        let mut path = String::new();
        let mut pending = vec![Visit {
            node: self,
            segment: "",
            parent_len: 0,
            owned_ancestor: None,
        }];

        while let Some(Visit {
            node,
            segment,
            parent_len,
            mut owned_ancestor,
        }) = pending.pop()
        {
            path.truncate(parent_len);
            if parent_len > 0 {
                path.push('/');
            }
            path.push_str(segment);

            match node.sorted_owners().as_slice() {
                [] => {}
                [owner] => match owned_ancestor {
                    Some(ancestor) if ancestor.owner != *owner => {
                        ctx.error(format!(
                            "{} uses {}, which conflicts with {} using {}",
                            node.describe(owner),
                            path.quoted(),
                            ancestor.node.describe(ancestor.owner),
                            path[..ancestor.path_len].quoted(),
                        ));
                        found = true;
                        continue;
                    }
                    Some(_) => {}
                    None => {
                        owned_ancestor = Some(OwnedAncestor {
                            node,
                            owner: *owner,
                            path_len: path.len(),
                        });
                    }
                },
                owners => {
                    let descriptions = owners
                        .iter()
                        .map(|owner| node.describe(owner))
                        .collect::<Vec<_>>();
                    ctx.error(format!(
                        "{}: directory has conflicting owners: {}",
                        path.quoted(),
                        descriptions.join(" and "),
                    ));
                    found = true;
                    continue;
                }
            }

            let mut children = node.children.iter().collect::<Vec<_>>();
            children.sort_unstable_by(|(a, _), (b, _)| b.cmp(a));

            let parent_len = path.len();
            pending.extend(children.into_iter().map(|(segment, child)| Visit {
                node: child,
                segment,
                parent_len,
                owned_ancestor,
            }));
        }
        found
    }

    fn sorted_owners(&self) -> Vec<&str> {
        let mut owners = self.owner_notes.keys().map(String::as_str).collect::<Vec<_>>();
        owners.sort_unstable();
        owners
    }

    /// `owner`, followed by its non-empty notes as a sorted list literal when
    /// there are any.
    fn describe(&self, owner: &str) -> String {
        let mut notes = self
            .owner_notes
            .get(owner)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|note| !note.is_empty())
            .collect::<Vec<_>>();

        if notes.is_empty() {
            return owner.to_string();
        }
        notes.sort_unstable();
        format!("{owner}{}", quoted_list(notes))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("owner_notes", &self.owner_notes)
            .field("children", &self.children.len())
            .finish()
    }
}

// Unlinks descendants one level at a time so dropping a deep chain does not
// recurse once per segment.
impl Drop for Node {
    fn drop(&mut self) {
        let mut detached = self.children.drain().map(|(_, child)| child).collect::<Vec<_>>();
        while let Some(mut node) = detached.pop() {
            detached.extend(node.children.drain().map(|(_, child)| child));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationContext;

    fn messages(root: &Node) -> Vec<String> {
        let mut ctx = ValidationContext::new();
        root.find_conflicts(&mut ctx);
        ctx.result().messages.into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn paths_join_without_leading_slash() {
        let mut root = Node::default();
        root.child_mut("a").claim("bobbie".into(), "".into());
        root.child_mut("a")
            .child_mut("b")
            .child_mut("c")
            .claim("charlie".into(), "".into());
        assert_eq!(
            messages(&root),
            vec!["charlie uses 'a/b/c', which conflicts with bobbie using 'a'"]
        );
    }

    #[test]
    fn child_of_empty_segment_keeps_empty_prefix() {
        let mut root = Node::default();
        let empty = root.child_mut("");
        empty.claim("bobbie".into(), "".into());
        empty.child_mut("x").claim("charlie".into(), "".into());
        assert_eq!(
            messages(&root),
            vec!["charlie uses 'x', which conflicts with bobbie using ''"]
        );
    }

    #[test]
    fn child_mut_reuses_existing_nodes() {
        let mut root = Node::default();
        root.child_mut("a").claim("bobbie".into(), "n".into());
        root.child_mut("a");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children["a"].owner_notes.len(), 1);
    }

    #[test]
    fn describe_omits_empty_notes() {
        let mut node = Node::default();
        node.claim("bobbie".into(), String::new());
        assert_eq!(node.describe("bobbie"), "bobbie");
    }

    #[test]
    fn describe_sorts_and_deduplicates_notes() {
        let mut node = Node::default();
        node.claim("bobbie".into(), "for peace".into());
        node.claim("bobbie".into(), "".into());
        node.claim("bobbie".into(), "for justice".into());
        node.claim("bobbie".into(), "for peace".into());
        assert_eq!(node.describe("bobbie"), "bobbie['for justice', 'for peace']");
    }

    #[test]
    fn deep_chain_is_walked_and_dropped_without_recursion() {
        let mut root = Node::default();
        let mut node = &mut root;
        for _ in 0..50_000 {
            node = node.child_mut("d");
        }
        node.claim("bobbie".into(), "".into());

        assert!(messages(&root).is_empty());
        drop(root);
    }
}
