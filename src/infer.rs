//! Target inference (§4.3): decides, for every sub-expression, which local
//! variable its value should flow into, synthesizing names and list/element
//! wiring for loops along the way.
//!
//! Only run when `--decorate` is passed to `create` (§9 Open Question 3):
//! skipping this pass yields a pure recognizer with no value threading.

use crate::analysis::Analysis;
use crate::grammar::{ExprKind, Grammar, NodeId, Target};

/// Run inference over every production's right-hand side.
pub fn infer(grammar: &mut Grammar, analysis: &Analysis) {
    for i in 0..grammar.productions.len() {
        let rhs = grammar.productions[i].rhs;
        let lhs = grammar.productions[i].lhs.clone();
        let root_target = Target::new(format!("_{}_", lhs));
        infer_expr(grammar, analysis, rhs, Some(root_target));
    }
}

fn destination_for(grammar: &Grammar, id: NodeId, inherited: &Option<Target>) -> Option<Target> {
    let node = grammar.node(id);
    if node.keep || node.keep0 {
        inherited.clone()
    } else if let Some(name) = &node.name {
        Some(Target::new(name.clone()))
    } else {
        None
    }
}

fn infer_expr(grammar: &mut Grammar, analysis: &Analysis, id: NodeId, inherited: Option<Target>) {
    let destination = destination_for(grammar, id, &inherited);
    grammar.node_mut(id).target = destination.clone();

    match grammar.node(id).kind.clone() {
        ExprKind::Alts(vs) => {
            // Propagate the parent target unchanged to each alternative.
            for v in vs {
                infer_expr(grammar, analysis, v, inherited.clone());
            }
        }
        ExprKind::Sequence { seq, .. } => {
            mark_keep0_if_singleton(grammar, seq);
            infer_expr(grammar, analysis, seq, inherited);
        }
        ExprKind::Cons(h, t) => {
            infer_expr(grammar, analysis, h, inherited.clone());
            infer_expr(grammar, analysis, t, inherited);
        }
        ExprKind::Parens(e) => infer_expr(grammar, analysis, e, destination),
        ExprKind::Opt(e) => infer_expr(grammar, analysis, e, destination),
        ExprKind::Rep(e) | ExprKind::OnePlus(e) | ExprKind::Infinite(e) => {
            let simple = grammar.node(id).simple;
            match (simple, destination) {
                (false, Some(dst)) => {
                    let element = format!("{}_element_", dst.name);
                    grammar.node_mut(id).element = Some(element.clone());
                    let child = Target { name: element, append_to: Some(dst.name) };
                    infer_expr(grammar, analysis, e, Some(child));
                }
                _ => infer_expr(grammar, analysis, e, None),
            }
        }
        ExprKind::Sym(t) => {
            let node = grammar.node(id);
            let is_nonterminal = !grammar.is_terminal(grammar.terms.name(t));
            if node.target.is_none() && node.name.is_none() && is_nonterminal {
                let name = grammar.terms.name(t).to_string();
                grammar.node_mut(id).name = Some(name);
            }
        }
        ExprKind::Value(_) | ExprKind::Lambda | ExprKind::Break | ExprKind::Continue => {}
    }
}

fn mark_keep0_if_singleton(grammar: &mut Grammar, seq: NodeId) {
    if let ExprKind::Cons(h, t) = grammar.node(seq).kind {
        if matches!(grammar.node(t).kind, ExprKind::Lambda) {
            grammar.node_mut(h).keep0 = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::syntax::parse_spec;

    #[test]
    fn scenario_5_keep_and_name_produce_copy_target() {
        let mut g = parse_spec(r#"S : @"a"'x <<x>> ."#).unwrap();
        let a = analyze(&g).unwrap();
        infer(&mut g, &a);

        let rhs = g.productions[0].rhs;
        let seq = match &g.node(rhs).kind {
            ExprKind::Sequence { seq, .. } => *seq,
            _ => panic!(),
        };
        let head = match &g.node(seq).kind {
            ExprKind::Cons(h, _) => *h,
            _ => panic!(),
        };
        let node = g.node(head);
        assert_eq!(node.name.as_deref(), Some("x"));
        assert_eq!(node.target.as_ref().unwrap().name, "_S_");
    }

    #[test]
    fn synthesizes_name_for_bare_nonterminal_call() {
        let mut g = parse_spec(r#"S : "a" T . T : "b" ."#).unwrap();
        let a = analyze(&g).unwrap();
        infer(&mut g, &a);

        let rhs = g.productions[0].rhs;
        let seq = match &g.node(rhs).kind {
            ExprKind::Sequence { seq, .. } => *seq,
            _ => panic!(),
        };
        let (_, tail) = match &g.node(seq).kind {
            ExprKind::Cons(h, t) => (*h, *t),
            _ => panic!(),
        };
        let t_call = match &g.node(tail).kind {
            ExprKind::Cons(h, _) => *h,
            _ => panic!(),
        };
        assert_eq!(g.node(t_call).name.as_deref(), Some("T"));
    }

    #[test]
    fn loop_element_synthesis() {
        let mut g = parse_spec(r#"S : @{ "a" }'xs ."#).unwrap();
        let a = analyze(&g).unwrap();
        infer(&mut g, &a);

        let rhs = g.productions[0].rhs;
        let seq = match &g.node(rhs).kind {
            ExprKind::Sequence { seq, .. } => *seq,
            _ => panic!(),
        };
        let head = match &g.node(seq).kind {
            ExprKind::Cons(h, _) => *h,
            _ => panic!(),
        };
        assert_eq!(g.node(head).element.as_deref(), Some("xs_element_"));
    }
}
