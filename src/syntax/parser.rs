use crate::error::SyntaxError;
use crate::grammar::{ExprKind, Grammar, NodeId};
use crate::util::Code;

use super::scanner::{Token, TokenKind};

/// Recursive-descent parser over the grammar file's token stream, building
/// the AST described in §3. Mirrors the grammar-of-the-grammar in §6.
pub struct Parser<'c> {
    tokens: Vec<Token>,
    pos: usize,
    code: &'c Code<'c>,
}

impl<'c> Parser<'c> {
    pub fn new(tokens: Vec<Token>, code: &'c Code<'c>) -> Self {
        Self { tokens, pos: 0, code }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&[kind]))
        }
    }

    fn error_expected(&self, expected: &[TokenKind]) -> SyntaxError {
        let tok = self.peek();
        SyntaxError::new(
            self.code.obtain_position(tok.start),
            "syntax error".to_string(),
            format!("{} {:?}", tok.kind.describe(), tok.text),
            expected.iter().map(|k| k.describe().to_string()).collect(),
        )
    }

    /// Parse the whole token stream into `grammar`'s preamble and
    /// production list (preamble/pragmas are expected to already be set on
    /// `grammar` by the caller from the extracted `%%` lines).
    pub fn parse(mut self, grammar: &mut Grammar) -> Result<(), SyntaxError> {
        while self.current_kind() == TokenKind::Code {
            grammar.preamble.push(self.advance().text);
        }
        self.production(grammar)?;
        while self.current_kind() == TokenKind::Id {
            self.production(grammar)?;
        }
        self.expect(TokenKind::Eof)?;
        Ok(())
    }

    fn production(&mut self, grammar: &mut Grammar) -> Result<(), SyntaxError> {
        let lhs = self.expect(TokenKind::Id)?.text;
        self.expect(TokenKind::Colon)?;
        let rhs = self.alternation(grammar)?;
        self.expect(TokenKind::Dot)?;

        grammar.nonterminals.insert(lhs.clone());
        if let Some(existing) = grammar.productions.iter().position(|p| p.lhs == lhs) {
            let prev = grammar.productions[existing].rhs;
            let merged = merge_alts(grammar, prev, rhs);
            grammar.productions[existing].rhs = merged;
        } else {
            grammar.productions.push(crate::grammar::Production { lhs, rhs });
        }
        Ok(())
    }

    // alternation -> sequence ( "|" sequence )*
    fn alternation(&mut self, grammar: &mut Grammar) -> Result<NodeId, SyntaxError> {
        let mut vals = vec![self.sequence(grammar)?];
        while self.current_kind() == TokenKind::Pipe {
            self.advance();
            vals.push(self.sequence(grammar)?);
        }
        if vals.len() == 1 {
            Ok(vals[0])
        } else {
            Ok(grammar.push(ExprKind::Alts(vals)))
        }
    }

    fn at_term_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Id | TokenKind::Str | TokenKind::LParen | TokenKind::LBracket
                | TokenKind::LBrace | TokenKind::OnePlusOpen | TokenKind::InfiniteOpen | TokenKind::At
        )
    }

    // sequence -> ( code-block )* ( term+ | /* epsilon */ ) [ "=" code-block ]
    //
    // An alternative with no terms at all (immediately followed by "|", the
    // closing bracket of an enclosing construct, or the production's final
    // ".") lowers to a bare `Lambda` — this is how a nullable alternative
    // like `S : "a" S | .` is written.
    fn sequence(&mut self, grammar: &mut Grammar) -> Result<NodeId, SyntaxError> {
        let mut prologue = Vec::new();
        while self.current_kind() == TokenKind::Code {
            prologue.push(self.advance().text);
        }

        if !self.at_term_start() {
            let seq = grammar.push(ExprKind::Lambda);
            let code = if self.current_kind() == TokenKind::Equals {
                self.advance();
                Some(self.code_block()?)
            } else {
                None
            };
            return Ok(grammar.push(ExprKind::Sequence { seq, prologue, code }));
        }

        let first = self.term(grammar)?;
        let lambda = grammar.push(ExprKind::Lambda);
        let root = grammar.push(ExprKind::Cons(first, lambda));
        let mut last = root;

        while self.at_term_start() {
            let t = self.term(grammar)?;
            let tail = grammar.push(ExprKind::Lambda);
            let next = grammar.push(ExprKind::Cons(t, tail));
            if let ExprKind::Cons(head, _) = grammar.node(last).kind.clone() {
                grammar.node_mut(last).kind = ExprKind::Cons(head, next);
            }
            last = next;
        }

        let code = if self.current_kind() == TokenKind::Equals {
            self.advance();
            Some(self.code_block()?)
        } else {
            None
        };

        Ok(grammar.push(ExprKind::Sequence { seq: root, prologue, code }))
    }

    // term -> [ "@" ] base [ "!" ] [ "'" ID ] ( code-block )*
    fn term(&mut self, grammar: &mut Grammar) -> Result<NodeId, SyntaxError> {
        let keep = if self.current_kind() == TokenKind::At {
            self.advance();
            true
        } else {
            false
        };

        let node = self.base(grammar)?;

        let simple = if self.current_kind() == TokenKind::Bang {
            self.advance();
            true
        } else {
            false
        };

        let name = if self.current_kind() == TokenKind::Quote {
            self.advance();
            Some(self.expect(TokenKind::Id)?.text)
        } else {
            None
        };

        let mut stmts = Vec::new();
        while self.current_kind() == TokenKind::Code {
            stmts.push(self.advance().text);
        }

        let n = grammar.node_mut(node);
        n.keep = keep;
        n.simple = simple;
        n.name = name;
        n.stmts = stmts;

        Ok(node)
    }

    // base -> "(" alternation ")" | "{" alternation "}" | "[" alternation "]"
    //       | "{+" alternation "+}" | ID | STR | "break" | "continue"
    fn base(&mut self, grammar: &mut Grammar) -> Result<NodeId, SyntaxError> {
        match self.current_kind() {
            TokenKind::LParen => {
                self.advance();
                let v = self.alternation(grammar)?;
                self.expect(TokenKind::RParen)?;
                Ok(grammar.push(ExprKind::Parens(v)))
            }
            TokenKind::LBrace => {
                self.advance();
                let v = self.alternation(grammar)?;
                self.expect(TokenKind::RBrace)?;
                Ok(grammar.push(ExprKind::Rep(v)))
            }
            TokenKind::LBracket => {
                self.advance();
                let v = self.alternation(grammar)?;
                self.expect(TokenKind::RBracket)?;
                Ok(grammar.push(ExprKind::Opt(v)))
            }
            TokenKind::OnePlusOpen => {
                self.advance();
                let v = self.alternation(grammar)?;
                self.expect(TokenKind::OnePlusClose)?;
                Ok(grammar.push(ExprKind::OnePlus(v)))
            }
            TokenKind::InfiniteOpen => {
                self.advance();
                let v = self.alternation(grammar)?;
                self.expect(TokenKind::InfiniteClose)?;
                Ok(grammar.push(ExprKind::Infinite(v)))
            }
            TokenKind::Id => {
                let tok = self.advance();
                match tok.text.as_str() {
                    "break" => Ok(grammar.push(ExprKind::Break)),
                    "continue" => Ok(grammar.push(ExprKind::Continue)),
                    _ => {
                        let id = grammar.terms.intern(&tok.text);
                        Ok(grammar.push(ExprKind::Sym(id)))
                    }
                }
            }
            TokenKind::Str => {
                let tok = self.advance();
                let id = grammar.terms.intern(&tok.text);
                Ok(grammar.push(ExprKind::Sym(id)))
            }
            _ => Err(self.error_expected(&[
                TokenKind::LParen,
                TokenKind::LBrace,
                TokenKind::LBracket,
                TokenKind::OnePlusOpen,
                TokenKind::InfiniteOpen,
                TokenKind::Id,
                TokenKind::Str,
            ])),
        }
    }

    fn code_block(&mut self) -> Result<String, SyntaxError> {
        if self.current_kind() == TokenKind::Code {
            Ok(self.advance().text)
        } else {
            Err(self.error_expected(&[TokenKind::Code]))
        }
    }
}

fn flatten_alts(grammar: &Grammar, id: NodeId) -> Vec<NodeId> {
    match grammar.node(id).kind.clone() {
        ExprKind::Alts(vs) => vs,
        _ => vec![id],
    }
}

/// Merge two productions sharing a `lhs`: concatenate alternatives,
/// flattening any nested `Alts` (§9 Open Question 1).
fn merge_alts(grammar: &mut Grammar, a: NodeId, b: NodeId) -> NodeId {
    let mut vals = flatten_alts(grammar, a);
    vals.extend(flatten_alts(grammar, b));
    grammar.push(ExprKind::Alts(vals))
}

/// Scan and parse a full grammar-file source into a [Grammar].
pub fn parse_spec(source: &str) -> Result<Grammar, crate::error::CliError> {
    let (rest, pragma_lines) = super::scanner::extract_pragma_lines(source);
    let pragmas = crate::util::parse_pragmas(&pragma_lines)?;

    let code = Code::new(rest.as_bytes());
    let scanner = super::scanner::Scanner::new(&rest);
    let tokens = scanner.tokenize()?;

    let mut grammar = Grammar::new(Vec::new(), pragmas);
    grammar.eof();
    let parser = Parser::new(tokens, &code);
    parser.parse(&mut grammar)?;
    Ok(grammar)
}
