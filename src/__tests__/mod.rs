//! End-to-end scenarios exercising the whole pipeline against a grammar
//! source string, one module per concern, mirroring the six scenarios.

mod ambiguity;
mod loops;
mod nullable_alternation;
mod single_terminal;
mod value_threading;
