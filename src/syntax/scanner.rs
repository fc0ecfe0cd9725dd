use crate::error::ScanError;
use crate::util::Code;

/// Surface token kinds (§4.1, §6 grammar-of-the-grammar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenKind {
    Id,
    Str,
    Code,
    Pragma,
    Colon,
    Dot,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    OnePlusOpen,
    OnePlusClose,
    InfiniteOpen,
    InfiniteClose,
    Quote,
    Equals,
    At,
    Bang,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Id => "identifier",
            TokenKind::Str => "string literal",
            TokenKind::Code => "code block",
            TokenKind::Pragma => "pragma line",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Pipe => "'|'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::OnePlusOpen => "'{+'",
            TokenKind::OnePlusClose => "'+}'",
            TokenKind::InfiniteOpen => "'{*'",
            TokenKind::InfiniteClose => "'*}'",
            TokenKind::Quote => "'''",
            TokenKind::Equals => "'='",
            TokenKind::At => "'@'",
            TokenKind::Bang => "'!'",
            TokenKind::Eof => "end of input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Lexeme text; for `Str` the surrounding quotes have already been
    /// stripped, for `Code` the delimiters have been stripped and the body
    /// trimmed.
    pub text: String,
    /// Byte offset into the source, used to compute a [Position] lazily.
    pub start: usize,
}

pub struct Scanner<'c> {
    code: Code<'c>,
    pos: usize,
}

impl<'c> Scanner<'c> {
    pub fn new(source: &'c str) -> Self {
        Self { code: Code::new(source.as_bytes()), pos: 0 }
    }

    pub fn code(&self) -> &Code<'c> {
        &self.code
    }

    fn bytes(&self) -> &'c [u8] {
        self.code.value
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn err(&self, message: impl Into<String>) -> ScanError {
        ScanError::new(self.code.obtain_position(self.pos), message.into())
    }

    /// Tokenize the whole input, returning the stream with a trailing `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.pos;
            let Some(b) = self.peek_byte() else {
                tokens.push(Token { kind: TokenKind::Eof, text: String::new(), start });
                break;
            };
            let tok = match b {
                b':' => self.single(TokenKind::Colon, start),
                b'.' => self.single(TokenKind::Dot, start),
                b'|' => self.single(TokenKind::Pipe, start),
                b')' => self.single(TokenKind::RParen, start),
                b'(' => self.single(TokenKind::LParen, start),
                b'[' => self.single(TokenKind::LBracket, start),
                b']' => self.single(TokenKind::RBracket, start),
                b'\'' => self.single(TokenKind::Quote, start),
                b'=' => self.single(TokenKind::Equals, start),
                b'@' => self.single(TokenKind::At, start),
                b'!' => self.single(TokenKind::Bang, start),
                b'{' => {
                    if self.peek_at(1) == Some(b'+') {
                        self.advance_n(2);
                        Token { kind: TokenKind::OnePlusOpen, text: "{+".into(), start }
                    } else if self.peek_at(1) == Some(b'*') {
                        self.advance_n(2);
                        Token { kind: TokenKind::InfiniteOpen, text: "{*".into(), start }
                    } else {
                        self.single(TokenKind::LBrace, start)
                    }
                }
                b'+' if self.peek_at(1) == Some(b'}') => {
                    self.advance_n(2);
                    Token { kind: TokenKind::OnePlusClose, text: "+}".into(), start }
                }
                b'*' if self.peek_at(1) == Some(b'}') => {
                    self.advance_n(2);
                    Token { kind: TokenKind::InfiniteClose, text: "*}".into(), start }
                }
                b'}' => self.single(TokenKind::RBrace, start),
                b'"' => self.scan_string(start)?,
                b if b.is_ascii_alphabetic() => self.scan_identifier(start),
                0xc2..=0xf4 => self.scan_unicode_code_block(start)?,
                b'<' if self.peek_at(1) == Some(b'<') => self.scan_angle_code_block(start)?,
                other => {
                    return Err(self.err(format!("unexpected character {:?}", other as char)));
                }
            };
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        let text = (self.peek_byte().unwrap() as char).to_string();
        self.advance_n(1);
        Token { kind, text, start }
    }

    fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => self.advance_n(1),
                Some(b'#') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance_n(1);
                    }
                }
                Some(b'%') if self.peek_at(1) == Some(b'%') => {
                    // handled specially so the pragma fragment text is kept;
                    // but tokenizing it as trivia would drop it, so break out
                    // and let the caller pick it up as a token instead.
                    break;
                }
                _ => break,
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        let s = self.pos;
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.advance_n(1);
        }
        let text = std::str::from_utf8(&self.bytes()[s..self.pos]).unwrap().to_string();
        Token { kind: TokenKind::Id, text, start }
    }

    fn scan_string(&mut self, start: usize) -> Result<Token, ScanError> {
        self.advance_n(1); // opening quote
        let s = self.pos;
        while self.peek_byte() != Some(b'"') {
            if self.peek_byte().is_none() {
                return Err(self.err("unterminated string literal"));
            }
            self.advance_n(1);
        }
        let text = std::str::from_utf8(&self.bytes()[s..self.pos]).unwrap().to_string();
        self.advance_n(1); // closing quote
        Ok(Token { kind: TokenKind::Str, text, start })
    }

    // Code blocks delimited by the ASCII pair "<<" ... ">>".
    fn scan_angle_code_block(&mut self, start: usize) -> Result<Token, ScanError> {
        self.advance_n(2);
        let s = self.pos;
        loop {
            if self.peek_byte() == Some(b'>') && self.peek_at(1) == Some(b'>') {
                let text = std::str::from_utf8(&self.bytes()[s..self.pos]).unwrap().trim().to_string();
                self.advance_n(2);
                return Ok(Token { kind: TokenKind::Code, text, start });
            }
            if self.peek_byte().is_none() {
                return Err(self.err("unterminated code block"));
            }
            self.advance_n(1);
        }
    }

    // Code blocks delimited by the unicode pairs "«" "»" or "⟪" "⟫", which
    // are multi-byte in UTF-8 (U+00AB/U+00BB and U+27EA/U+27EB respectively).
    fn scan_unicode_code_block(&mut self, start: usize) -> Result<Token, ScanError> {
        let rest = std::str::from_utf8(&self.bytes()[self.pos..])
            .map_err(|_| self.err("invalid UTF-8"))?;
        let mut chars = rest.char_indices();
        let (_, open) = chars.next().expect("checked by caller");
        let close = match open {
            '\u{00AB}' => '\u{00BB}',
            '\u{27EA}' => '\u{27EB}',
            _ => return Err(self.err(format!("unexpected character {:?}", open))),
        };
        let open_len = open.len_utf8();
        self.advance_n(open_len);
        let s = self.pos;
        let tail = std::str::from_utf8(&self.bytes()[self.pos..])
            .map_err(|_| self.err("invalid UTF-8"))?;
        match tail.find(close) {
            Some(rel) => {
                let text = tail[..rel].trim().to_string();
                self.advance_n(rel + close.len_utf8());
                let _ = s;
                Ok(Token { kind: TokenKind::Code, text, start })
            }
            None => Err(self.err("unterminated code block")),
        }
    }
}

/// Scan all `%%`-prefixed pragma lines out of the raw source, in order,
/// stripped of the leading `%%` and trailing newline. The remaining source
/// (with pragma lines blanked out) is what gets fed to [Scanner].
pub fn extract_pragma_lines(source: &str) -> (String, Vec<String>) {
    let mut pragmas = Vec::new();
    let mut rest = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n');
        if let Some(frag) = trimmed.trim_start().strip_prefix("%%") {
            pragmas.push(frag.trim_start().to_string());
            rest.push('\n');
        } else {
            rest.push_str(line);
        }
    }
    (rest, pragmas)
}
