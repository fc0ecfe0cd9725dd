//! The analysis engine (§4.2): computes NULLABLE, FIRST, FOLLOW, PREDICT for
//! every AST node and every symbol.
//!
//! Implemented as an explicit fixed-point solver over arena-indexed cells
//! (§9 design note, option (a)/(b) combined) rather than a literal port of
//! a dynamic observer-notification graph: each grammar attribute is a cell
//! addressed by a stable integer id, and repeated passes over the
//! production list drain a conceptual work-list until no cell changes. The
//! termination argument is the same one the reactive formulation relies on
//! — every cell is monotone over a finite lattice (a boolean that only
//! flips false->true, or a set that only grows).

mod warnings;

use std::collections::BTreeSet;

use crate::error::InferenceError;
use crate::grammar::{ExprKind, Grammar, NodeId, TermId};

pub use warnings::compute_warnings;

/// The solved attributes for every node and every symbol in a [Grammar].
pub struct Analysis {
    node_nullable: Vec<bool>,
    node_first: Vec<BTreeSet<TermId>>,
    node_follow: Vec<BTreeSet<TermId>>,
    node_predict: Vec<BTreeSet<TermId>>,
    node_warnings: Vec<Vec<String>>,
    syms_nullable: std::collections::BTreeMap<TermId, bool>,
    syms_first: std::collections::BTreeMap<TermId, BTreeSet<TermId>>,
    syms_follow: std::collections::BTreeMap<TermId, BTreeSet<TermId>>,
}

impl Analysis {
    pub fn nullable(&self, id: NodeId) -> bool {
        self.node_nullable[id.0 as usize]
    }
    pub fn first(&self, id: NodeId) -> &BTreeSet<TermId> {
        &self.node_first[id.0 as usize]
    }
    pub fn follow(&self, id: NodeId) -> &BTreeSet<TermId> {
        &self.node_follow[id.0 as usize]
    }
    pub fn predict(&self, id: NodeId) -> &BTreeSet<TermId> {
        &self.node_predict[id.0 as usize]
    }
    pub fn warnings(&self, id: NodeId) -> &[String] {
        &self.node_warnings[id.0 as usize]
    }
    pub fn sym_nullable(&self, t: TermId) -> bool {
        *self.syms_nullable.get(&t).unwrap_or(&false)
    }
    pub fn sym_first(&self, t: TermId) -> BTreeSet<TermId> {
        self.syms_first.get(&t).cloned().unwrap_or_default()
    }
    pub fn sym_follow(&self, t: TermId) -> BTreeSet<TermId> {
        self.syms_follow.get(&t).cloned().unwrap_or_default()
    }
}

fn merge_into(map: &mut std::collections::BTreeMap<TermId, BTreeSet<TermId>>, key: TermId, new: &BTreeSet<TermId>, changed: &mut bool) {
    let entry = map.entry(key).or_default();
    let before = entry.len();
    entry.extend(new.iter().copied());
    if entry.len() != before {
        *changed = true;
    }
}

/// Run the full analysis over `grammar`, returning the solved cells.
///
/// Errors if a `break`/`continue` has no enclosing loop (§9: "a `Break`
/// outside any loop is ill-formed — reject at inference time").
pub fn analyze(grammar: &Grammar) -> Result<Analysis, InferenceError> {
    let n = grammar.nodes.len();
    let mut a = Analysis {
        node_nullable: vec![false; n],
        node_first: vec![BTreeSet::new(); n],
        node_follow: vec![BTreeSet::new(); n],
        node_predict: vec![BTreeSet::new(); n],
        node_warnings: vec![Vec::new(); n],
        syms_nullable: Default::default(),
        syms_first: Default::default(),
        syms_follow: Default::default(),
    };

    for i in 0..grammar.terms.len() {
        let id = TermId(i as u32);
        let name = grammar.terms.name(id);
        if grammar.is_terminal(name) {
            a.syms_nullable.insert(id, false);
            let mut s = BTreeSet::new();
            s.insert(id);
            a.syms_first.insert(id, s);
            a.syms_follow.entry(id).or_default();
        } else {
            a.syms_nullable.entry(id).or_insert(false);
            a.syms_first.entry(id).or_default();
            a.syms_follow.entry(id).or_default();
        }
    }

    let eof = grammar.terms.get("EOF").expect("EOF interned before analysis");
    let start_lhs = grammar.start_production().lhs.clone();
    let start_id = grammar.terms.get(&start_lhs).expect("production lhs interned");
    a.syms_follow.entry(start_id).or_default().insert(eof);

    // NULLABLE pass.
    loop {
        let mut changed = false;
        for p in &grammar.productions {
            let lhs_id = grammar.terms.get(&p.lhs).unwrap();
            let val = compute_nullable(grammar, &mut a, p.rhs);
            let cur = *a.syms_nullable.get(&lhs_id).unwrap_or(&false);
            if val && !cur {
                a.syms_nullable.insert(lhs_id, true);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // FIRST pass.
    loop {
        let mut changed = false;
        for p in &grammar.productions {
            let lhs_id = grammar.terms.get(&p.lhs).unwrap();
            let val = compute_first(grammar, &mut a, p.rhs);
            let entry = a.syms_first.entry(lhs_id).or_default();
            let before = entry.len();
            entry.extend(val.iter().copied());
            if entry.len() != before {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // FOLLOW pass.
    loop {
        let mut changed = false;
        for p in &grammar.productions {
            let lhs_id = grammar.terms.get(&p.lhs).unwrap();
            let seed = a.syms_follow.get(&lhs_id).cloned().unwrap_or_default();
            propagate_follow(grammar, &mut a, p.rhs, &seed, &mut changed);
        }
        if !changed {
            break;
        }
    }

    // PREDICT law: predict(n) = first(n) U (follow(n) if nullable(n) else {}).
    for idx in 0..n {
        let mut pred = a.node_first[idx].clone();
        if a.node_nullable[idx] {
            pred.extend(a.node_follow[idx].iter().copied());
        }
        a.node_predict[idx] = pred;
    }

    // Break's predict is an exception: it reuses the nearest enclosing
    // loop's FOLLOW rather than its own (always-empty) first/follow.
    for p in &grammar.productions {
        resolve_break_predict(grammar, &mut a, p.rhs, &mut Vec::new())?;
    }

    compute_warnings(grammar, &mut a);

    Ok(a)
}

fn compute_nullable(grammar: &Grammar, a: &mut Analysis, id: NodeId) -> bool {
    let idx = id.0 as usize;
    let val = match grammar.node(id).kind.clone() {
        ExprKind::Sym(t) => a.sym_nullable(t),
        ExprKind::Value(_) => true,
        ExprKind::Parens(e) => compute_nullable(grammar, a, e),
        ExprKind::Alts(vs) => vs.iter().any(|v| compute_nullable(grammar, a, *v)),
        ExprKind::Sequence { seq, .. } => compute_nullable(grammar, a, seq),
        ExprKind::Cons(h, t) => compute_nullable(grammar, a, h) && compute_nullable(grammar, a, t),
        ExprKind::Lambda => true,
        ExprKind::Opt(e) => {
            compute_nullable(grammar, a, e);
            true
        }
        ExprKind::Rep(e) => {
            compute_nullable(grammar, a, e);
            true
        }
        ExprKind::OnePlus(e) => compute_nullable(grammar, a, e),
        ExprKind::Infinite(e) => {
            compute_nullable(grammar, a, e);
            false
        }
        ExprKind::Break => false,
        ExprKind::Continue => false,
    };
    a.node_nullable[idx] = val;
    val
}

fn compute_first(grammar: &Grammar, a: &mut Analysis, id: NodeId) -> BTreeSet<TermId> {
    let idx = id.0 as usize;
    let val = match grammar.node(id).kind.clone() {
        ExprKind::Sym(t) => a.sym_first(t),
        ExprKind::Value(_) => BTreeSet::new(),
        ExprKind::Parens(e) => compute_first(grammar, a, e),
        ExprKind::Alts(vs) => {
            let mut out = BTreeSet::new();
            for v in vs {
                out.extend(compute_first(grammar, a, v));
            }
            out
        }
        ExprKind::Sequence { seq, .. } => compute_first(grammar, a, seq),
        ExprKind::Cons(h, t) => {
            let mut fh = compute_first(grammar, a, h);
            if a.node_nullable[h.0 as usize] {
                fh.extend(compute_first(grammar, a, t));
            } else {
                compute_first(grammar, a, t);
            }
            fh
        }
        ExprKind::Lambda => BTreeSet::new(),
        ExprKind::Opt(e) | ExprKind::Rep(e) | ExprKind::OnePlus(e) | ExprKind::Infinite(e) => {
            compute_first(grammar, a, e)
        }
        ExprKind::Break | ExprKind::Continue => BTreeSet::new(),
    };
    a.node_first[idx] = val.clone();
    val
}

fn propagate_follow(grammar: &Grammar, a: &mut Analysis, id: NodeId, inherited: &BTreeSet<TermId>, changed: &mut bool) {
    let idx = id.0 as usize;
    a.node_follow[idx] = inherited.clone();
    match grammar.node(id).kind.clone() {
        ExprKind::Sym(t) => merge_into(&mut a.syms_follow, t, inherited, changed),
        ExprKind::Value(_) | ExprKind::Lambda | ExprKind::Break | ExprKind::Continue => {}
        ExprKind::Parens(e) => propagate_follow(grammar, a, e, inherited, changed),
        ExprKind::Alts(vs) => {
            for v in vs {
                propagate_follow(grammar, a, v, inherited, changed);
            }
        }
        ExprKind::Sequence { seq, .. } => propagate_follow(grammar, a, seq, inherited, changed),
        ExprKind::Cons(h, t) => {
            propagate_follow(grammar, a, t, inherited, changed);
            let mut fh = a.node_first[t.0 as usize].clone();
            if a.node_nullable[t.0 as usize] {
                fh.extend(a.node_follow[t.0 as usize].iter().copied());
            }
            propagate_follow(grammar, a, h, &fh, changed);
        }
        ExprKind::Opt(e) => propagate_follow(grammar, a, e, inherited, changed),
        ExprKind::Rep(e) | ExprKind::OnePlus(e) => {
            let mut f = a.node_first[idx].clone();
            f.extend(inherited.iter().copied());
            propagate_follow(grammar, a, e, &f, changed);
        }
        ExprKind::Infinite(e) => propagate_follow(grammar, a, e, inherited, changed),
    }
}

fn resolve_break_predict(
    grammar: &Grammar,
    a: &mut Analysis,
    id: NodeId,
    loop_stack: &mut Vec<NodeId>,
) -> Result<(), InferenceError> {
    let kind = grammar.node(id).kind.clone();
    match kind {
        ExprKind::Break => {
            let nearest = loop_stack.last().copied().ok_or_else(|| {
                InferenceError::new("`break` used outside any enclosing loop".to_string())
            })?;
            a.node_predict[id.0 as usize] = a.node_follow[nearest.0 as usize].clone();
        }
        ExprKind::Continue => {
            if loop_stack.is_empty() {
                return Err(InferenceError::new(
                    "`continue` used outside any enclosing loop".to_string(),
                ));
            }
        }
        ExprKind::Parens(e) | ExprKind::Opt(e) => resolve_break_predict(grammar, a, e, loop_stack)?,
        ExprKind::Rep(e) | ExprKind::OnePlus(e) | ExprKind::Infinite(e) => {
            loop_stack.push(id);
            resolve_break_predict(grammar, a, e, loop_stack)?;
            loop_stack.pop();
        }
        ExprKind::Alts(vs) => {
            for v in vs {
                resolve_break_predict(grammar, a, v, loop_stack)?;
            }
        }
        ExprKind::Sequence { seq, .. } => resolve_break_predict(grammar, a, seq, loop_stack)?,
        ExprKind::Cons(h, t) => {
            resolve_break_predict(grammar, a, h, loop_stack)?;
            resolve_break_predict(grammar, a, t, loop_stack)?;
        }
        ExprKind::Sym(_) | ExprKind::Value(_) | ExprKind::Lambda => {}
    }
    Ok(())
}
