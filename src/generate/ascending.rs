//! Shortest-first example enumeration (§4.6): a bounded, pruned min-heap
//! search over partially-expanded sentential forms.

use crate::grammar::{ExprKind, Grammar, NodeId};

/// One element of a sentential form: either resolved terminal text, or an
/// AST node still awaiting expansion (an `Alts`/`Rep`/`OnePlus`/`Infinite`/
/// `Opt`, or a `Sym` naming a non-terminal).
#[derive(Clone, Debug, PartialEq, Eq)]
enum Elem {
    Term(String),
    Node(NodeId),
}

type Form = Vec<Elem>;

/// Expand every node in `ids` into a flat [Form]: `Cons`/`Sequence`/`Parens`/
/// `Lambda` are transparent wrappers inlined away, a terminal `Sym` becomes
/// resolved text, and anything else (`Alts`/`Rep`/`OnePlus`/`Infinite`/`Opt`,
/// a `Sym` naming a non-terminal) is kept as a node to expand later.
fn flatten(grammar: &Grammar, ids: &[NodeId]) -> Form {
    let mut out = Vec::new();
    for id in ids {
        flatten_into(grammar, *id, &mut out);
    }
    out
}

fn flatten_into(grammar: &Grammar, id: NodeId, out: &mut Form) {
    match grammar.node(id).kind.clone() {
        ExprKind::Cons(h, t) => {
            flatten_into(grammar, h, out);
            flatten_into(grammar, t, out);
        }
        ExprKind::Sequence { seq, .. } => flatten_into(grammar, seq, out),
        ExprKind::Parens(e) => flatten_into(grammar, e, out),
        ExprKind::Lambda | ExprKind::Value(_) | ExprKind::Break | ExprKind::Continue => {}
        ExprKind::Sym(t) => {
            let name = grammar.terms.name(t);
            if grammar.is_terminal(name) {
                out.push(Elem::Term(name.to_string()));
            } else {
                out.push(Elem::Node(id));
            }
        }
        ExprKind::Alts(_) | ExprKind::Rep(_) | ExprKind::OnePlus(_) | ExprKind::Infinite(_) | ExprKind::Opt(_) => {
            out.push(Elem::Node(id));
        }
    }
}

fn min_terminals0(grammar: &Grammar, id: NodeId) -> usize {
    match grammar.node(id).kind.clone() {
        ExprKind::Alts(vs) => vs.iter().map(|v| min_terminals0(grammar, *v)).min().unwrap_or(0),
        ExprKind::Cons(h, t) => min_terminals0(grammar, h) + min_terminals0(grammar, t),
        ExprKind::Sequence { seq, .. } => min_terminals0(grammar, seq),
        ExprKind::Parens(e) => min_terminals0(grammar, e),
        ExprKind::OnePlus(e) => min_terminals0(grammar, e).max(1),
        ExprKind::Rep(_) | ExprKind::Opt(_) | ExprKind::Infinite(_) => 0,
        ExprKind::Sym(t) => usize::from(grammar.is_terminal(grammar.terms.name(t))),
        ExprKind::Lambda | ExprKind::Value(_) | ExprKind::Break | ExprKind::Continue => 0,
    }
}

fn min_terminals(grammar: &Grammar, form: &[Elem]) -> usize {
    form.iter()
        .map(|e| match e {
            Elem::Term(_) => 1,
            Elem::Node(id) => min_terminals0(grammar, *id),
        })
        .sum()
}

fn count_terminals(form: &[Elem]) -> usize {
    form.iter().filter(|e| matches!(e, Elem::Term(_))).count()
}

#[derive(Clone, Eq, PartialEq)]
struct Entry {
    key: (usize, usize),
    index: usize,
    form: Form,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.key, self.index).cmp(&(other.key, other.index))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A binary min-heap over a plain `Vec`, mirroring CPython's `heapq` (push
/// and pop by index-swapping on the backing array) so the exact truncation
/// quirk below can be replicated: truncating the array is *not* followed by
/// a re-heapify, matching ground truth (`ascending.py`'s `MyHeap.push`).
struct Heap {
    data: Vec<Entry>,
    index: usize,
    limit: usize,
}

impl Heap {
    fn new(limit: usize) -> Self {
        Self { data: Vec::new(), index: 0, limit }
    }

    fn push(&mut self, grammar: &Grammar, form: Form) {
        let key = (min_terminals(grammar, &form), form.len());
        if key.0 > self.limit {
            return;
        }
        if self.data.len() > 4_000_000 {
            self.data.truncate(3_000_000);
        }
        let entry = Entry { key, index: self.index, form };
        self.index += 1;
        self.data.push(entry);
        let mut i = self.data.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.data[parent] <= self.data[i] {
                break;
            }
            self.data.swap(parent, i);
            i = parent;
        }
    }

    fn pop(&mut self) -> Option<Form> {
        if self.data.is_empty() {
            return None;
        }
        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let popped = self.data.pop().unwrap();
        let n = self.data.len();
        let mut i = 0;
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < n && self.data[l] < self.data[smallest] {
                smallest = l;
            }
            if r < n && self.data[r] < self.data[smallest] {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.data.swap(i, smallest);
            i = smallest;
        }
        Some(popped.form)
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn add_derivations(grammar: &Grammar, id: NodeId, before: &[Elem], after: &[Elem], heap: &mut Heap) {
    let push_with = |heap: &mut Heap, mid: Form| {
        let mut form = before.to_vec();
        form.extend(mid);
        form.extend(after.to_vec());
        heap.push(grammar, form);
    };
    match grammar.node(id).kind.clone() {
        ExprKind::Alts(vs) => {
            for v in vs {
                push_with(heap, flatten(grammar, &[v]));
            }
        }
        ExprKind::Rep(e) | ExprKind::Infinite(e) => {
            for count in 0..3 {
                push_with(heap, flatten(grammar, &vec![e; count]));
            }
        }
        ExprKind::OnePlus(e) => {
            for count in 1..=3 {
                push_with(heap, flatten(grammar, &vec![e; count]));
            }
        }
        ExprKind::Opt(e) => {
            push_with(heap, flatten(grammar, &[e]));
            push_with(heap, Vec::new());
        }
        ExprKind::Sym(t) => {
            let name = grammar.terms.name(t).to_string();
            let production = grammar
                .productions
                .iter()
                .find(|p| p.lhs == name)
                .unwrap_or_else(|| panic!("unknown symbol: {name}"));
            push_with(heap, flatten(grammar, &[production.rhs]));
        }
        // Cons/Sequence/Parens/Lambda are resolved at flatten-time and never
        // survive as a bare `Elem::Node`; Value/Break/Continue contribute no
        // terminal text and need no further derivation.
        other => unreachable!("{other:?} never reaches add_derivations"),
    }
}

/// Enumerate up to `quantity` shortest sentences (terminal tokens joined by
/// a single space), never considering a partial form whose minimum possible
/// terminal count exceeds `limit`.
pub fn shortest_examples(grammar: &Grammar, quantity: usize, limit: usize) -> Vec<String> {
    let mut outputs = Vec::new();
    let mut heap = Heap::new(limit);
    let start = flatten(grammar, &[grammar.start_production().rhs]);
    heap.push(grammar, start);

    while !heap.is_empty() && outputs.len() < quantity {
        let form = heap.pop().unwrap();
        if count_terminals(&form) == form.len() {
            let words: Vec<&str> = form
                .iter()
                .map(|e| match e {
                    Elem::Term(s) => s.as_str(),
                    Elem::Node(_) => unreachable!(),
                })
                .collect();
            outputs.push(words.join(" "));
        } else if let Some(i) = form.iter().position(|e| matches!(e, Elem::Node(_))) {
            let Elem::Node(id) = form[i] else { unreachable!() };
            let before = form[..i].to_vec();
            let after = form[i + 1..].to_vec();
            add_derivations(grammar, id, &before, &after, &mut heap);
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_spec;

    #[test]
    fn enumerates_single_terminal() {
        let g = parse_spec(r#"S : "a" ."#).unwrap();
        let out = shortest_examples(&g, 5, 10);
        assert_eq!(out, vec!["a".to_string()]);
    }

    #[test]
    fn shortest_first_picks_the_empty_alternative_before_the_recursive_one() {
        let g = parse_spec(r#"S : "a" S | ."#).unwrap();
        let out = shortest_examples(&g, 3, 10);
        assert_eq!(out[0], "");
        assert_eq!(out[1], "a");
    }

    #[test]
    fn respects_quantity() {
        let g = parse_spec(r#"S : "a" S | ."#).unwrap();
        let out = shortest_examples(&g, 2, 10);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn repetition_yields_zero_one_and_two_element_forms() {
        let g = parse_spec(r#"S : { "a" } ."#).unwrap();
        let out = shortest_examples(&g, 3, 10);
        assert_eq!(out, vec!["".to_string(), "a".to_string(), "a a".to_string()]);
    }
}
