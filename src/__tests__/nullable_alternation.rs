//! Scenario 2 (SPEC_FULL §8): `S : "a" S | .` — a right-recursive,
//! nullable alternation. The guarded dispatch must pick the recursive arm
//! on `a` and the empty arm on anything else (here, only `EOF`).

use crate::create;

#[test]
fn empty_alternative_is_shortest_and_recursive_arm_is_guarded_on_a() {
    let out = create(r#"S : "a" S | ."#, false, false).unwrap();
    assert!(out.contains("if self.current().kind in {\"a\"}:"));
    assert!(out.contains(r#"self.match("a")"#));
    assert!(out.contains("self.S()"));
}

#[test]
fn shortest_enumeration_yields_the_empty_sentence_first() {
    let out = crate::shortest(r#"S : "a" S | ."#, 2, 10).unwrap();
    assert_eq!(out[0], "");
    assert_eq!(out[1], "a");
}
