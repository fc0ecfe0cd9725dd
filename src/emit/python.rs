//! Python backend: renders [crate::ir::Program] into `Parser` class source
//! text, with a fixed `ParseError`/`Parser` prologue in front of one method
//! per production (§4.5).

use std::collections::BTreeSet;

use crate::grammar::TermId;
use crate::ir::{Guard, Guarded, Program, Stmt};

use super::Render;

const INDENT: &str = "    ";

const PROLOGUE_TEMPLATE: &str = r#"import sys


class ParseError(Exception):
    def __init__(self, message, current, expected):
        self.message = message
        self.current = current
        self.expected = expected

    def __str__(self):
        return f"Parse error {self.message} at {self.current}: Expected {self.expected}"


class Parser:
    def __init__(self, tokens, debug=False):
        self.tokens = tokens
        self.index = 0
        self.debug = debug

    def current(self):
        return self.tokens[self.index]

    def match(self, kind):
        tok = self.current()
        if tok.kind != kind:
            self.error(f"expected {kind!r}", tok, {kind})
        self.index += 1
        return tok

    def error(self, message, current, expected):
        err = ParseError(message, current, expected)
        if self.debug:
            raise err
        print(err, file=sys.stderr)
        sys.exit(1)

    def parse(self):
{PARSE_BODY}
"#;

#[derive(Default)]
pub struct PythonEmitter;

struct Ctx<'a> {
    program: &'a Program,
    verbose: bool,
    function: &'a str,
}

impl Render for PythonEmitter {
    fn render(&self, program: &Program, verbose: bool) -> String {
        let mut out = String::new();
        for block in &program.prologue {
            out.push_str(block);
            out.push('\n');
        }
        out.push_str(&fixed_prologue(&program.start_nonterminal, program.decorate));
        out.push('\n');
        for f in &program.functions {
            render_function(program, f, verbose, &mut out);
        }
        out
    }
}

fn fixed_prologue(start: &str, decorate: bool) -> String {
    let call = format!("self.{}()", start);
    let parse_body = if decorate {
        format!("        result = {call}\n        self.match(\"EOF\")\n        return result")
    } else {
        format!("        {call}\n        self.match(\"EOF\")")
    };
    PROLOGUE_TEMPLATE.replace("{PARSE_BODY}", &parse_body)
}

fn render_function(program: &Program, f: &crate::ir::Function, verbose: bool, out: &mut String) {
    let rettype = program.pragmas.return_type(&f.name);
    let retdecl = rettype.map(|t| format!(" -> {t}")).unwrap_or_default();
    out.push_str(&format!("{INDENT}def {}(self){retdecl}:\n", f.name));
    if let Some(rt) = rettype {
        out.push_str(&format!("{INDENT}{INDENT}_{}_: {rt}\n", f.name));
    }
    let ctx = Ctx { program, verbose, function: &f.name };
    emit_stmts(&ctx, &f.body, &format!("{INDENT}{INDENT}"), out);
    out.push('\n');
}

fn emit_stmts(ctx: &Ctx, stmts: &[Stmt], indent: &str, out: &mut String) {
    if stmts.is_empty() {
        out.push_str(&format!("{indent}pass\n"));
        return;
    }
    for s in stmts {
        render_stmt(ctx, s, indent, out);
    }
}

fn render_stmt(ctx: &Ctx, s: &Stmt, indent: &str, out: &mut String) {
    let indent1 = format!("{indent}{INDENT}");
    let indent2 = format!("{indent1}{INDENT}");
    match s {
        Stmt::Copy { lhs, rhs } => out.push_str(&format!("{indent}{lhs} = {rhs}\n")),
        Stmt::Sequence { decls, stmts } => {
            if ctx.verbose && !decls.is_empty() {
                let names: Vec<&str> = decls.iter().map(|d| d.0.as_str()).collect();
                out.push_str(&format!("{indent}# VERBOSE: locals: {}\n", names.join(", ")));
            }
            for d in decls {
                if let Some(ty) = ctx.program.pragmas.local_type(ctx.function, &d.0) {
                    out.push_str(&format!("{indent}{}: {ty}\n", d.0));
                }
            }
            emit_stmts(ctx, stmts, indent, out);
        }
        Stmt::Terminal { lhs, kind } => {
            let tgt = lhs.as_ref().map(|l| format!("{l} = ")).unwrap_or_default();
            out.push_str(&format!("{indent}{tgt}self.match({})\n", py_repr(kind)));
        }
        Stmt::NonTerminal { lhs, name } => {
            let tgt = lhs.as_ref().map(|l| format!("{l} = ")).unwrap_or_default();
            out.push_str(&format!("{indent}{tgt}self.{name}()\n"));
        }
        Stmt::Loop { top, body, bottom } => {
            out.push_str(&format!("{indent}while {}:\n", mk_guard(ctx.program, top.as_ref())));
            emit_stmts(ctx, body, &indent1, out);
            if let Some(b) = bottom {
                out.push_str(&format!("{indent1}if not ({}):\n", mk_guard(ctx.program, Some(b))));
                out.push_str(&format!("{indent2}break\n"));
            }
        }
        Stmt::SelectAlternative { arms, error } => {
            render_select(ctx, arms, error.as_deref(), indent, &indent1, out);
        }
        Stmt::ParseError { message } => {
            out.push_str(&format!("{indent}self.error({}, self.current(), set())\n", py_repr(message)));
        }
        Stmt::Corn(value) => out.push_str(&format!("{indent}{value}\n")),
        Stmt::Break => out.push_str(&format!("{indent}break\n")),
        Stmt::Continue => out.push_str(&format!("{indent}continue\n")),
        Stmt::Empty => {}
        Stmt::AssignNull(lhs) => out.push_str(&format!("{indent}{lhs} = None\n")),
        Stmt::AssignEmptyList(lhs) => out.push_str(&format!("{indent}{lhs} = []\n")),
        Stmt::AppendToList { list, value } => out.push_str(&format!("{indent}{list}.append({value})\n")),
        Stmt::Return(value) => match value {
            Some(v) => out.push_str(&format!("{indent}return {v}\n")),
            None => out.push_str(&format!("{indent}return\n")),
        },
        Stmt::Warning(message) => out.push_str(&format!("{indent}# WARNING: {message}\n")),
        Stmt::Comment(message) => out.push_str(&format!("{indent}# {message}\n")),
        Stmt::Verbose(message) => {
            if ctx.verbose {
                out.push_str(&format!("{indent}# VERBOSE: {message}\n"));
            }
        }
    }
}

fn render_select(ctx: &Ctx, arms: &[Guarded], error: Option<&Stmt>, indent: &str, indent1: &str, out: &mut String) {
    let mut test = "if";
    for g in arms {
        out.push_str(&format!("{indent}{test} {}:\n", mk_guard(ctx.program, Some(&g.guard))));
        test = "elif";
        emit_stmts(ctx, &g.body, indent1, out);
    }
    if let Some(Stmt::ParseError { message }) = error {
        let expected: BTreeSet<TermId> = arms.iter().flat_map(|g| g.guard.0.iter().copied()).collect();
        out.push_str(&format!("{indent}else:\n"));
        out.push_str(&format!(
            "{indent1}self.error({}, self.current(), {})\n",
            py_repr(message),
            render_set(ctx.program, &expected)
        ));
    }
}

fn mk_guard(program: &Program, guard: Option<&Guard>) -> String {
    match guard {
        None => "True".to_string(),
        Some(g) if g.0.is_empty() => "True".to_string(),
        Some(g) => format!("self.current().kind in {}", render_set(program, &g.0)),
    }
}

fn render_set(program: &Program, set: &BTreeSet<TermId>) -> String {
    let mut names: Vec<&str> = set.iter().map(|t| program.term_name(*t)).collect();
    names.sort_unstable();
    format!("{{{}}}", names.iter().map(|n| py_repr(n)).collect::<Vec<_>>().join(", "))
}

fn py_repr(s: &str) -> String {
    format!("{s:?}")
}
