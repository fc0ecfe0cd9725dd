//! Scenario 6 (SPEC_FULL §8): `{+ term +}` lowers to a bottom-tested loop
//! that runs at least once, as opposed to `{ term }`'s top-tested loop.

use crate::analysis::analyze;
use crate::gen_ir::lower;
use crate::grammar::ExprKind;
use crate::infer::infer;
use crate::ir::Stmt;
use crate::syntax::parse_spec;
use crate::{create, examples};

fn lowered(src: &str, decorate: bool) -> crate::ir::Program {
    let mut g = parse_spec(src).unwrap();
    let a = analyze(&g).unwrap();
    if decorate {
        infer(&mut g, &a);
    }
    lower(&g, &a, decorate)
}

#[test]
fn one_plus_lowers_to_a_bottom_guarded_loop() {
    let program = lowered(r#"S : {+ "a" +} ."#, false);
    let f = &program.functions[0];
    let loop_stmt = f.body.iter().find(|s| matches!(s, Stmt::Loop { .. })).unwrap();
    match loop_stmt {
        Stmt::Loop { top, bottom, .. } => {
            assert!(top.is_none());
            assert!(bottom.is_some());
        }
        _ => unreachable!(),
    }
}

#[test]
fn rep_lowers_to_a_top_guarded_loop() {
    let program = lowered(r#"S : { "a" } ."#, false);
    let f = &program.functions[0];
    let loop_stmt = f.body.iter().find(|s| matches!(s, Stmt::Loop { .. })).unwrap();
    match loop_stmt {
        Stmt::Loop { top, bottom, .. } => {
            assert!(top.is_some());
            assert!(bottom.is_none());
        }
        _ => unreachable!(),
    }
}

#[test]
fn infinite_loop_has_no_guard_at_all_and_exits_only_via_break() {
    let program = lowered(r#"S : {* "a" break *} ."#, false);
    let f = &program.functions[0];
    let loop_stmt = f.body.iter().find(|s| matches!(s, Stmt::Loop { .. })).unwrap();
    match loop_stmt {
        Stmt::Loop { top, bottom, body } => {
            assert!(top.is_none());
            assert!(bottom.is_none());
            assert!(body.iter().any(|s| matches!(s, Stmt::Break)));
        }
        _ => unreachable!(),
    }
}

#[test]
fn one_plus_never_produces_the_empty_derivation() {
    let g = parse_spec(r#"S : {+ "a" +} ."#).unwrap();
    let rhs = g.productions[0].rhs;
    let seq = match &g.node(rhs).kind {
        ExprKind::Sequence { seq, .. } => *seq,
        _ => panic!(),
    };
    let head = match &g.node(seq).kind {
        ExprKind::Cons(h, _) => *h,
        _ => panic!(),
    };
    assert!(matches!(g.node(head).kind, ExprKind::OnePlus(_)));
    for sentence in examples(r#"S : {+ "a" +} ."#, 5, 10).unwrap() {
        assert!(!sentence.is_empty());
    }
}

#[test]
fn emitted_one_plus_tests_the_guard_after_the_body() {
    let out = create(r#"S : {+ "a" +} ."#, false, false).unwrap();
    assert!(out.contains("while True:"));
    assert!(out.contains("if not ("));
    assert!(out.contains("break"));
}
