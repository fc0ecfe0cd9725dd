use std::collections::BTreeMap;

use crate::grammar::{ExprKind, Grammar, NodeId};

use super::Analysis;

/// Attach ambiguity diagnostics to every `Alts`/`Rep`/`Opt`/`OnePlus` node
/// (§4.2 "Ambiguity warnings").
pub fn compute_warnings(grammar: &Grammar, a: &mut Analysis) {
    for idx in 0..grammar.nodes.len() {
        let id = NodeId(idx as u32);
        match grammar.node(id).kind.clone() {
            ExprKind::Alts(vs) => warn_alts(grammar, a, id, &vs),
            ExprKind::Rep(e) | ExprKind::Opt(e) | ExprKind::OnePlus(e) => {
                warn_loop_like(grammar, a, id, e)
            }
            _ => {}
        }
    }
}

fn warn_alts(grammar: &Grammar, a: &mut Analysis, id: NodeId, vs: &[NodeId]) {
    let mut counts: BTreeMap<_, usize> = BTreeMap::new();
    for v in vs {
        for t in a.predict(*v) {
            *counts.entry(*t).or_insert(0) += 1;
        }
    }
    let ambiguous: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).map(|(t, _)| t).collect();
    if !ambiguous.is_empty() {
        let names: Vec<_> = ambiguous.iter().map(|t| grammar.terms.name(*t).to_string()).collect();
        a.node_warnings[id.0 as usize].push(format!("AMBIGUOUS LOOKAHEAD: {}", names.join(", ")));
    }
}

fn warn_loop_like(grammar: &Grammar, a: &mut Analysis, id: NodeId, body: NodeId) {
    let overlap: Vec<_> = a.first(body).intersection(a.follow(id)).copied().collect();
    if !overlap.is_empty() {
        let names: Vec<_> = overlap.iter().map(|t| grammar.terms.name(*t).to_string()).collect();
        a.node_warnings[id.0 as usize]
            .push(format!("AMBIGUOUS with lookahead {}", names.join(", ")));
    }
    if a.nullable(body) {
        a.node_warnings[id.0 as usize].push("NULLABLE repetition/optional".to_string());
    }
}
