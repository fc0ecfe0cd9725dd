//! Scenario 1 (SPEC_FULL §8): `S : "a" .` — a single terminal production.

use crate::{create, examples, shortest};

#[test]
fn generated_parser_matches_the_sole_terminal() {
    let out = create(r#"S : "a" ."#, false, false).unwrap();
    assert!(out.contains("def S(self):"));
    assert!(out.contains(r#"self.match("a")"#));
}

#[test]
fn both_generators_agree_on_the_only_possible_sentence() {
    let src = r#"S : "a" ."#;
    assert_eq!(shortest(src, 5, 10).unwrap(), vec!["a".to_string()]);
    assert_eq!(examples(src, 3, 10).unwrap(), vec!["a".to_string()]);
}
