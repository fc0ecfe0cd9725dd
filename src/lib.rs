//! `rdgen`: a parser generator for a superset of EBNF.
//!
//! The crate consumes a grammar specification (§4.1/§6) and produces the
//! source of a recursive-descent, predictive (LL(1)) parser in a target
//! host language (Python), together with optional actions that build
//! semantic values. The pipeline is linear and leaf-first:
//!
//! ```text
//! syntax::parse_spec -> analysis::analyze -> infer::infer (optional)
//!                     -> gen_ir::lower -> emit::Render
//! ```
//!
//! [`create`] runs the whole pipeline for the `create` CLI subcommand;
//! [`shortest`] and [`examples`] drive the two independent example-sentence
//! generators in [`generate`] off the AST and its solved [`analysis::Analysis`]
//! alone, never touching inference or the emitter.
//!
//! # Example
//!
//! ```
//! let source = r#"S : @"a"'x <<x>> ."#;
//! let python = rdgen::create(source, true, false).unwrap();
//! assert!(python.contains("class Parser:"));
//! assert!(python.contains("def S(self):"));
//! ```

pub mod analysis;
pub mod emit;
pub mod error;
pub mod gen_ir;
pub mod generate;
pub mod grammar;
pub mod infer;
pub mod ir;
pub mod syntax;
#[cfg(test)]
mod __tests__;
pub mod util;

pub use emit::{PythonEmitter, Render};
pub use error::CliError;
pub use grammar::Grammar;

/// Run the `create` subcommand's pipeline (§2 stages A→F): parse `source`,
/// solve NULLABLE/FIRST/FOLLOW/PREDICT, optionally run target inference
/// (when `decorate`), lower to IR, and render Python source. `verbose`
/// controls whether the emitted source carries `# VERBOSE:` structural
/// comments (§4.5); it is independent of [`util::Tracer`]'s own stderr
/// tracing, which the CLI wires to the same flag.
pub fn create(source: &str, decorate: bool, verbose: bool) -> Result<String, CliError> {
    let mut grammar = syntax::parse_spec(source)?;
    let analysis = analysis::analyze(&grammar)?;
    if decorate {
        infer::infer(&mut grammar, &analysis);
    }
    let program = gen_ir::lower(&grammar, &analysis, decorate);
    Ok(PythonEmitter.render(&program, verbose))
}

/// Run the `shortest` subcommand: parse `source` and enumerate up to
/// `quantity` shortest sentences, never considering a partial derivation
/// whose minimum possible terminal count exceeds `limit` (§4.6.1).
pub fn shortest(source: &str, quantity: usize, limit: usize) -> Result<Vec<String>, CliError> {
    let grammar = syntax::parse_spec(source)?;
    Ok(generate::shortest_examples(&grammar, quantity, limit))
}

/// Run the `examples` subcommand: parse `source` and enumerate `quantity`
/// distinct randomly-walked sentences, capping each walk's expansion depth
/// at `limit` (§4.6.2).
pub fn examples(source: &str, quantity: usize, limit: usize) -> Result<Vec<String>, CliError> {
    let grammar = syntax::parse_spec(source)?;
    Ok(generate::random_examples(&grammar, quantity, limit))
}
