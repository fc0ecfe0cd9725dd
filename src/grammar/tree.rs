//! `--verbose` AST tree dumps, grounded on the teacher's `ast_node.rs`
//! `ptree::TreeItem` impl: a borrowing view over one arena node, its
//! children computed on demand from the node's `ExprKind`.

use std::borrow::Cow;
use std::io;

use ptree::{Style, TreeItem};

use super::{ExprKind, Grammar, NodeId};

/// A view of one AST node usable as a [`TreeItem`], borrowing the arena
/// rather than cloning a subtree.
#[derive(Clone)]
pub struct NodeView<'g> {
    grammar: &'g Grammar,
    id: NodeId,
}

impl<'g> NodeView<'g> {
    pub fn new(grammar: &'g Grammar, id: NodeId) -> Self {
        Self { grammar, id }
    }

    fn label(&self) -> String {
        let node = self.grammar.node(self.id);
        let text = match &node.kind {
            ExprKind::Sym(t) => format!("Sym({})", self.grammar.terms.name(*t)),
            ExprKind::Value(c) => format!("Value({:?})", c),
            ExprKind::Parens(_) => "Parens".to_string(),
            ExprKind::Alts(_) => "Alts".to_string(),
            ExprKind::Sequence { .. } => "Sequence".to_string(),
            ExprKind::Cons(..) => "Cons".to_string(),
            ExprKind::Lambda => "Lambda".to_string(),
            ExprKind::Opt(_) => "Opt".to_string(),
            ExprKind::Rep(_) => "Rep".to_string(),
            ExprKind::OnePlus(_) => "OnePlus".to_string(),
            ExprKind::Infinite(_) => "Infinite".to_string(),
            ExprKind::Break => "Break".to_string(),
            ExprKind::Continue => "Continue".to_string(),
        };
        match (&node.name, node.keep) {
            (Some(name), true) => format!("{text} @'{name}"),
            (Some(name), false) => format!("{text} '{name}"),
            (None, true) => format!("{text} @"),
            (None, false) => text,
        }
    }
}

impl<'g> TreeItem for NodeView<'g> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", self.label())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        let kids: Vec<NodeId> = match &self.grammar.node(self.id).kind {
            ExprKind::Parens(e)
            | ExprKind::Opt(e)
            | ExprKind::Rep(e)
            | ExprKind::OnePlus(e)
            | ExprKind::Infinite(e) => vec![*e],
            ExprKind::Alts(vs) => vs.clone(),
            ExprKind::Sequence { seq, .. } => vec![*seq],
            ExprKind::Cons(h, t) => vec![*h, *t],
            ExprKind::Sym(_)
            | ExprKind::Value(_)
            | ExprKind::Lambda
            | ExprKind::Break
            | ExprKind::Continue => Vec::new(),
        };
        Cow::Owned(kids.into_iter().map(|id| NodeView::new(self.grammar, id)).collect())
    }
}

/// Write every production's right-hand side as an indented tree to `w`,
/// each prefixed by its left-hand side name.
pub fn write_productions(grammar: &Grammar, w: &mut impl io::Write) -> io::Result<()> {
    for production in &grammar.productions {
        writeln!(w, "{}:", production.lhs)?;
        ptree::write_tree(&NodeView::new(grammar, production.rhs), &mut *w)?;
    }
    Ok(())
}
