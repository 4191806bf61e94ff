//! Pre-order traversal with explicit edit intents.
//!
//! Visitors never touch a parent's child list themselves. They return a
//! [`Visit`] describing what should happen, and [`walk`] applies it and
//! decides where iteration resumes. This keeps ownership of every `children`
//! vector with the traversal, even while it is being edited.

use crate::Node;

/// What the traversal should do after visiting a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Descend into the node's children, then move to the next sibling.
    Continue,
    /// Move to the next sibling without descending.
    Skip,
    /// Replace `remove` siblings starting at the visited index with `insert`,
    /// then resume iteration at sibling index `resume_at`.
    ///
    /// Resuming at the visited index re-visits whatever now occupies that
    /// slot, so a visitor must not splice again for a node it produced.
    Splice {
        remove: usize,
        insert: Vec<Node>,
        resume_at: usize,
    },
}

impl Visit {
    /// Replace the visited node with exactly one node and resume at the same
    /// index.
    pub fn replace(index: usize, node: Node) -> Self {
        Visit::Splice {
            remove: 1,
            insert: vec![node],
            resume_at: index,
        }
    }
}

pub trait Visitor {
    type Error;

    /// Called once per node below the root, in document order.
    fn visit(&mut self, node: &Node, index: usize, parent: &Node) -> Result<Visit, Self::Error>;
}

/// Walks every descendant of `root` in document order.
///
/// The first visitor error stops the walk and is returned as is; edits made
/// before that point stay applied, so callers wanting all-or-nothing
/// behaviour should walk an owned tree and drop it on error.
pub fn walk<V: Visitor>(root: &mut Node, visitor: &mut V) -> Result<(), V::Error> {
    let mut index = 0;
    loop {
        let visit = match root.children() {
            Some(children) if index < children.len() => {
                visitor.visit(&children[index], index, root)?
            }
            _ => return Ok(()),
        };

        match visit {
            Visit::Continue => {
                if let Some(children) = root.children_mut() {
                    walk(&mut children[index], visitor)?;
                }
                index += 1;
            }
            Visit::Skip => index += 1,
            Visit::Splice {
                remove,
                insert,
                resume_at,
            } => {
                if let Some(children) = root.children_mut() {
                    let end = index.saturating_add(remove).min(children.len());
                    children.splice(index..end, insert);
                }
                index = resume_at;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Literal, Parent};

    fn text(value: &str) -> Node {
        Node::Text(Literal {
            value: value.to_string(),
        })
    }

    fn inline_math(value: &str) -> Node {
        Node::InlineMath(Literal {
            value: value.to_string(),
        })
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::Paragraph(Parent { children })
    }

    fn root(children: Vec<Node>) -> Node {
        Node::Root(Parent { children })
    }

    /// Records `(kind, index, parent kind)` for every visit.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(&'static str, usize, &'static str)>,
    }

    impl Visitor for Recorder {
        type Error = ();

        fn visit(&mut self, node: &Node, index: usize, parent: &Node) -> Result<Visit, ()> {
            self.seen.push((node.kind(), index, parent.kind()));
            Ok(Visit::Continue)
        }
    }

    #[test]
    fn test_preorder_document_order() {
        let mut tree = root(vec![
            paragraph(vec![text("a"), inline_math("x")]),
            Node::Math(Literal {
                value: "y".into(),
            }),
        ]);
        let mut recorder = Recorder::default();
        walk(&mut tree, &mut recorder).unwrap();
        assert_eq!(
            recorder.seen,
            vec![
                ("paragraph", 0, "root"),
                ("text", 0, "paragraph"),
                ("inlineMath", 1, "paragraph"),
                ("math", 1, "root"),
            ]
        );
    }

    /// Replaces every inline math node with a text node holding its value.
    struct MathToText {
        visits: usize,
    }

    impl Visitor for MathToText {
        type Error = ();

        fn visit(&mut self, node: &Node, index: usize, _parent: &Node) -> Result<Visit, ()> {
            self.visits += 1;
            match node {
                Node::InlineMath(math) => Ok(Visit::replace(index, text(&math.value))),
                _ => Ok(Visit::Continue),
            }
        }
    }

    #[test]
    fn test_splice_keeps_position_and_siblings() {
        let mut tree = root(vec![paragraph(vec![
            text("a"),
            inline_math("x"),
            inline_math("y"),
            text("b"),
        ])]);
        let mut visitor = MathToText { visits: 0 };
        walk(&mut tree, &mut visitor).unwrap();

        assert_eq!(
            tree,
            root(vec![paragraph(vec![text("a"), text("x"), text("y"), text("b")])])
        );
        // paragraph + 4 children + 2 re-visits of the replacements
        assert_eq!(visitor.visits, 7);
    }

    #[test]
    fn test_skip_does_not_descend() {
        struct SkipParagraphs(usize);
        impl Visitor for SkipParagraphs {
            type Error = ();
            fn visit(&mut self, node: &Node, _: usize, _: &Node) -> Result<Visit, ()> {
                self.0 += 1;
                Ok(match node {
                    Node::Paragraph(_) => Visit::Skip,
                    _ => Visit::Continue,
                })
            }
        }

        let mut tree = root(vec![paragraph(vec![text("a")]), text("b")]);
        let mut visitor = SkipParagraphs(0);
        walk(&mut tree, &mut visitor).unwrap();
        assert_eq!(visitor.0, 2);
    }

    #[test]
    fn test_error_stops_walk() {
        struct FailOnMath;
        impl Visitor for FailOnMath {
            type Error = String;
            fn visit(&mut self, node: &Node, index: usize, _: &Node) -> Result<Visit, String> {
                if node.is_math() {
                    Err(format!("math at {index}"))
                } else {
                    Ok(Visit::Continue)
                }
            }
        }

        let mut tree = root(vec![paragraph(vec![text("a"), inline_math("x")])]);
        assert_eq!(walk(&mut tree, &mut FailOnMath), Err("math at 1".to_string()));
    }

    #[test]
    fn test_splice_past_end_is_clamped() {
        struct RemoveMany;
        impl Visitor for RemoveMany {
            type Error = ();
            fn visit(&mut self, node: &Node, index: usize, _: &Node) -> Result<Visit, ()> {
                Ok(match node {
                    Node::InlineMath(_) => Visit::Splice {
                        remove: 10,
                        insert: vec![],
                        resume_at: index,
                    },
                    _ => Visit::Continue,
                })
            }
        }

        let mut tree = root(vec![text("a"), inline_math("x"), text("b")]);
        walk(&mut tree, &mut RemoveMany).unwrap();
        assert_eq!(tree, root(vec![text("a")]));
    }

    #[test]
    fn test_leaf_root_is_a_no_op() {
        let mut leaf = text("a");
        let mut recorder = Recorder::default();
        walk(&mut leaf, &mut recorder).unwrap();
        assert!(recorder.seen.is_empty());
    }
}
