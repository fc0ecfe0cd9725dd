//! Random-walk example enumeration (§4.6): depth-first uniform-random
//! expansion of the start production, capped by a recursion counter so loop
//! bodies stop expanding once a sentence has grown long enough.
//!
//! Grounded on `gen_random.py`'s `gen`/`gen_examples`: a global step counter
//! incremented on *every* node visited (not just loop bodies), consulted by
//! `rep`/`opt` as `count < limit` to decide whether another repetition is
//! attempted at all. The Rust port threads the counter through explicitly
//! instead of mutating a module-global, and extends the same `count < limit`
//! gate to this superset's extra loop variants (`OnePlus`, `Infinite`),
//! which the original grammar never had.

use rand::Rng;

use crate::grammar::{ExprKind, Grammar, NodeId};

struct Walk<'g> {
    grammar: &'g Grammar,
    count: usize,
    limit: usize,
}

impl<'g> Walk<'g> {
    fn gen(&mut self, id: NodeId, rng: &mut impl Rng, out: &mut Vec<String>) {
        self.count += 1;
        match self.grammar.node(id).kind.clone() {
            ExprKind::Alts(vs) => {
                let choice = vs[rng.gen_range(0..vs.len())];
                self.gen(choice, rng, out);
            }
            ExprKind::Cons(h, t) => {
                self.gen(h, rng, out);
                self.gen(t, rng, out);
            }
            ExprKind::Sequence { seq, .. } => self.gen(seq, rng, out),
            ExprKind::Parens(e) => self.gen(e, rng, out),
            ExprKind::Rep(e) => {
                if self.count < self.limit {
                    for _ in 0..rng.gen_range(0..=2) {
                        self.gen(e, rng, out);
                    }
                }
            }
            ExprKind::Infinite(e) => {
                if self.count < self.limit {
                    for _ in 0..rng.gen_range(0..=2) {
                        self.gen(e, rng, out);
                    }
                }
            }
            ExprKind::OnePlus(e) => {
                let reps = if self.count < self.limit { rng.gen_range(1..=3) } else { 1 };
                for _ in 0..reps {
                    self.gen(e, rng, out);
                }
            }
            ExprKind::Opt(e) => {
                if self.count < self.limit && rng.gen_range(0..=1) == 1 {
                    self.gen(e, rng, out);
                }
            }
            ExprKind::Sym(t) => {
                let name = self.grammar.terms.name(t).to_string();
                if self.grammar.is_terminal(&name) {
                    out.push(name);
                } else {
                    let production = self
                        .grammar
                        .productions
                        .iter()
                        .find(|p| p.lhs == name)
                        .unwrap_or_else(|| panic!("unknown symbol: {name}"));
                    self.gen(production.rhs, rng, out);
                }
            }
            ExprKind::Lambda | ExprKind::Value(_) | ExprKind::Break | ExprKind::Continue => {}
        }
    }
}

/// Enumerate `quantity` distinct random sentences (terminal tokens joined by
/// a single space), each a fresh top-level walk with its own step counter
/// reset to zero, deduplicated by insertion order until `quantity` distinct
/// strings have been produced.
pub fn random_examples(grammar: &Grammar, quantity: usize, limit: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut outputs: Vec<String> = Vec::new();
    while outputs.len() < quantity {
        let mut walk = Walk { grammar, count: 0, limit };
        let mut words = Vec::new();
        walk.gen(grammar.start_production().rhs, &mut rng, &mut words);
        let sentence = words.join(" ");
        if !outputs.contains(&sentence) {
            outputs.push(sentence);
        }
    }
    outputs
}
