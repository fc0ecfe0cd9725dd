//! Scenario 4 (SPEC_FULL §8): `S : "a" | "a" .` — two alternatives with
//! identical PREDICT sets. Ambiguity is a warning surfaced as a comment in
//! the emitted source, never a hard error.

use crate::analysis::analyze;
use crate::grammar::ExprKind;
use crate::syntax::parse_spec;
use crate::{create, shortest};

#[test]
fn overlapping_alternatives_warn_with_the_shared_terminal() {
    let g = parse_spec(r#"S : "a" | "a" ."#).unwrap();
    let a = analyze(&g).unwrap();
    let rhs = g.productions[0].rhs;
    assert!(matches!(g.node(rhs).kind, ExprKind::Alts(_)));
    let warnings = a.warnings(rhs);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("AMBIGUOUS LOOKAHEAD"));
    assert!(warnings[0].contains("a"));
}

#[test]
fn ambiguous_grammars_still_render_to_a_working_parser() {
    // Non-goal (§1): the tool detects and warns rather than rejects.
    let out = create(r#"S : "a" | "a" ."#, false, false).unwrap();
    assert!(out.contains("def S(self):"));
    assert!(out.contains("# WARNING: AMBIGUOUS LOOKAHEAD"));
}

#[test]
fn disjoint_alternatives_carry_no_warning() {
    let g = parse_spec(r#"S : "a" | "b" ."#).unwrap();
    let a = analyze(&g).unwrap();
    let rhs = g.productions[0].rhs;
    assert!(a.warnings(rhs).is_empty());
}

#[test]
fn nullable_optional_body_warns() {
    let g = parse_spec(r#"S : [ "a" S | . ] "b" ."#).unwrap();
    let a = analyze(&g).unwrap();
    let seq = match &g.node(g.productions[0].rhs).kind {
        ExprKind::Sequence { seq, .. } => *seq,
        _ => panic!(),
    };
    let head = match &g.node(seq).kind {
        ExprKind::Cons(h, _) => *h,
        _ => panic!(),
    };
    assert!(matches!(g.node(head).kind, ExprKind::Opt(_)));
    assert!(a.warnings(head).iter().any(|w| w.contains("NULLABLE")));
}

#[test]
fn shortest_enumeration_is_unaffected_by_a_warning() {
    // Warnings decorate the AST; the example generators never consult them.
    let out = shortest(r#"S : "a" | "a" ."#, 1, 10).unwrap();
    assert_eq!(out, vec!["a".to_string()]);
}
