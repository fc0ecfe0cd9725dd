//! The grammar AST (§3 of the design): a tagged-variant tree of grammar
//! expressions, arena-allocated so that analysis cells and inference
//! decisions can be addressed by a stable integer id rather than shared
//! reference-counted pointers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::util::Pragmas;

pub mod tree;

/// Interned terminal/non-terminal name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

/// Index of a node in a [Grammar]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Destination a node's value must be written to, plus whether that value
/// must additionally be appended to an enclosing loop's list (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub append_to: Option<String>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), append_to: None }
    }
}

/// The tagged grammar-expression variants (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Sym(TermId),
    /// Embedded host-language expression (a code block used as a term).
    Value(String),
    Parens(NodeId),
    /// Ordered list of `Sequence` node ids.
    Alts(Vec<NodeId>),
    /// Wraps a `Seq0` (Cons-chain) head node id, plus the sequence's own
    /// prologue code blocks and optional trailing `= code`.
    Sequence { seq: NodeId, prologue: Vec<String>, code: Option<String> },
    /// Cons-chain element: head expr, tail `Seq0` (another Cons, or Lambda).
    Cons(NodeId, NodeId),
    Lambda,
    Opt(NodeId),
    Rep(NodeId),
    OnePlus(NodeId),
    Infinite(NodeId),
    Break,
    Continue,
}

/// One AST node plus its attribute slots, filled in by later passes.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,

    // Decorations carried from the surface syntax.
    pub name: Option<String>,
    pub keep: bool,
    pub keep0: bool,
    pub simple: bool,
    /// Inline code blocks trailing this term ("epilogue").
    pub stmts: Vec<String>,

    // Filled by the analysis pass (§4.2); never mutated afterwards.
    pub nullable: bool,
    pub first: BTreeSet<TermId>,
    pub follow: BTreeSet<TermId>,
    pub predict: BTreeSet<TermId>,
    pub warnings: Vec<String>,

    // Filled by the inference pass (§4.3).
    pub target: Option<Target>,
    /// Synthesized element name for a non-simple loop body.
    pub element: Option<String>,
}

impl ExprNode {
    fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            name: None,
            keep: false,
            keep0: false,
            simple: false,
            stmts: Vec::new(),
            nullable: false,
            first: BTreeSet::new(),
            follow: BTreeSet::new(),
            predict: BTreeSet::new(),
            warnings: Vec::new(),
            target: None,
            element: None,
        }
    }
}

/// `lhs -> rhs`. Multiple source productions sharing a `lhs` are merged
/// into one before analysis (§3 invariants, §9 Open Question 1).
#[derive(Debug, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: NodeId,
}

/// Interns terminal/non-terminal names to small integers.
#[derive(Debug, Default)]
pub struct Interner {
    names: Vec<String>,
    lookup: BTreeMap<String, TermId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> TermId {
        if let Some(id) = self.lookup.get(name) {
            return *id;
        }
        let id = TermId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: TermId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn get(&self, name: &str) -> Option<TermId> {
        self.lookup.get(name).copied()
    }

    /// All interned names, indexable by `TermId.0`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The whole grammar: preamble, pragmas, and the merged production list,
/// with every node living in one arena.
pub struct Grammar {
    pub nodes: Vec<ExprNode>,
    pub terms: Interner,
    pub preamble: Vec<String>,
    pub pragmas: Pragmas,
    pub productions: Vec<Production>,
    /// Non-terminal names, i.e. every distinct production `lhs`. Anything
    /// referenced by `Sym` that isn't in this set is a terminal.
    pub nonterminals: BTreeSet<String>,
}

impl Grammar {
    pub fn new(preamble: Vec<String>, pragmas: Pragmas) -> Self {
        Self {
            nodes: Vec::new(),
            terms: Interner::new(),
            preamble,
            pragmas,
            productions: Vec::new(),
            nonterminals: BTreeSet::new(),
        }
    }

    pub fn push(&mut self, kind: ExprKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ExprNode::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ExprNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        !self.nonterminals.contains(name)
    }

    /// EOF is always a terminal, injected implicitly; it is never written in
    /// the grammar file (§4.1).
    pub fn eof(&mut self) -> TermId {
        self.terms.intern("EOF")
    }

    pub fn start_production(&self) -> &Production {
        &self.productions[0]
    }

    /// A compact one-line structural dump of a node, used for `Verbose` IR
    /// stmts (§4.4) and for debugging (`--verbose`).
    pub fn dump0(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.kind {
            ExprKind::Sym(t) => format!("Sym({})", self.terms.name(*t)),
            ExprKind::Value(c) => format!("Value({:?})", c),
            ExprKind::Parens(e) => format!("Parens({})", self.dump0(*e)),
            ExprKind::Alts(vs) => {
                format!(
                    "Alts({})",
                    vs.iter().map(|v| self.dump0(*v)).collect::<Vec<_>>().join(" | ")
                )
            }
            ExprKind::Sequence { seq, .. } => format!("Sequence({})", self.dump0(*seq)),
            ExprKind::Cons(h, t) => format!("{} {}", self.dump0(*h), self.dump0(*t)),
            ExprKind::Lambda => String::new(),
            ExprKind::Opt(e) => format!("[{}]", self.dump0(*e)),
            ExprKind::Rep(e) => format!("{{{}}}", self.dump0(*e)),
            ExprKind::OnePlus(e) => format!("{{+{}+}}", self.dump0(*e)),
            ExprKind::Infinite(e) => format!("{{*{}*}}", self.dump0(*e)),
            ExprKind::Break => "break".to_string(),
            ExprKind::Continue => "continue".to_string(),
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("productions", &self.productions.len())
            .field("nodes", &self.nodes.len())
            .field("nonterminals", &self.nonterminals)
            .finish()
    }
}
