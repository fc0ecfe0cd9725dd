//! Scenario 5 (SPEC_FULL §8): `S : ="a"'x =code«x» .` — a kept, named term
//! feeding a trailing value expression, exercised through the full
//! `create(.., decorate=true, ..)` pipeline end to end.

use crate::infer::infer;
use crate::syntax::parse_spec;
use crate::{analysis::analyze, create};

#[test]
fn kept_named_terminal_threads_through_to_the_production_return() {
    let out = create(r#"S : @"a"'x <<x>> ."#, true, false).unwrap();
    assert!(out.contains("x = self.match(\"a\")"));
    assert!(out.contains("return _S_"));
}

#[test]
fn without_decorate_no_value_is_threaded_at_all() {
    let out = create(r#"S : @"a"'x <<x>> ."#, false, false).unwrap();
    assert!(out.contains("x = self.match(\"a\")"));
    assert!(!out.contains("return _S_"));
    assert!(!out.contains("return x"));
}

#[test]
fn the_kept_term_node_carries_the_x_name_and_a_root_target() {
    let mut g = parse_spec(r#"S : @"a"'x <<x>> ."#).unwrap();
    let a = analyze(&g).unwrap();
    infer(&mut g, &a);

    let rhs = g.productions[0].rhs;
    let seq = match &g.node(rhs).kind {
        crate::grammar::ExprKind::Sequence { seq, .. } => *seq,
        _ => panic!(),
    };
    let head = match &g.node(seq).kind {
        crate::grammar::ExprKind::Cons(h, _) => *h,
        _ => panic!(),
    };
    let node = g.node(head);
    assert!(node.keep);
    assert_eq!(node.name.as_deref(), Some("x"));
    assert_eq!(node.target.as_ref().unwrap().name, "_S_");
}

#[test]
fn a_name_with_no_keep_only_declares_a_local_not_a_return_path() {
    let out = create(r#"S : "a"'first "b"'second . "#, true, false).unwrap();
    assert!(out.contains("first = self.match(\"a\")"));
    assert!(out.contains("second = self.match(\"b\")"));
    // Neither `first` nor `second` is `=`-kept, so the sequence's own
    // return value is the synthesized `_S_`, never either local.
    assert!(!out.contains("return first"));
    assert!(!out.contains("return second"));
}
