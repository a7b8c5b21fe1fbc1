use std::fmt;

/// The kind of a pattern token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Slash,
    Path,
    OpenCurly,
    Slot,
    Question,
    Star,
    Pipe,
    Regexp,
    CloseCurly,
    End,
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Slash => "slash",
            TokenKind::Path => "path",
            TokenKind::OpenCurly => "open-curly",
            TokenKind::Slot => "slot-name",
            TokenKind::Question => "question",
            TokenKind::Star => "star",
            TokenKind::Pipe => "pipe",
            TokenKind::Regexp => "regexp",
            TokenKind::CloseCurly => "close-curly",
            TokenKind::End => "end",
            TokenKind::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind,
    pub(crate) text: &'a str,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, text: &'a str) -> Self {
        Token { kind, text }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Outside braces: slashes and literal text.
    Path,
    /// Right after `{`: a slot name is expected.
    SlotName,
    /// After the slot name: `?`, `*`, `|` or `}`.
    SlotModifier,
    /// After `|`: regexp text up to the matching `}`.
    SlotRegexp,
    /// After the regexp: the closing `}`.
    SlotClose,
}

/// Hand-rolled scanner over a pattern string. Produces the token stream the
/// parser consumes; lexical failures surface as an `Error` token carrying
/// the message.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    mode: Mode,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            mode: Mode::Path,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&mut self, message: &'static str) -> Token<'a> {
        // park the cursor at the end so the stream stays on Error/End
        self.pos = self.input.len();
        self.mode = Mode::Path;
        Token::new(TokenKind::Error, message)
    }

    pub(crate) fn next_token(&mut self) -> Token<'a> {
        match self.mode {
            Mode::Path => self.lex_path(),
            Mode::SlotName => self.lex_slot_name(),
            Mode::SlotModifier => self.lex_slot_modifier(),
            Mode::SlotRegexp => self.lex_regexp(),
            Mode::SlotClose => self.lex_slot_close(),
        }
    }

    fn lex_path(&mut self) -> Token<'a> {
        let rest = self.rest();
        let Some(first) = rest.chars().next() else {
            return Token::new(TokenKind::End, "");
        };
        match first {
            '/' => {
                self.pos += 1;
                Token::new(TokenKind::Slash, "/")
            }
            '{' => {
                self.pos += 1;
                self.mode = Mode::SlotName;
                Token::new(TokenKind::OpenCurly, "{")
            }
            _ => {
                let end = rest.find(['/', '{']).unwrap_or(rest.len());
                self.pos += end;
                Token::new(TokenKind::Path, &rest[..end])
            }
        }
    }

    fn lex_slot_name(&mut self) -> Token<'a> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            None => self.error("unterminated slot"),
            Some((_, first)) if first.is_ascii_alphabetic() || first == '_' => {
                let end = chars
                    .find(|&(_, c)| !c.is_ascii_alphanumeric() && c != '_')
                    .map_or(rest.len(), |(index, _)| index);
                self.pos += end;
                self.mode = Mode::SlotModifier;
                Token::new(TokenKind::Slot, &rest[..end])
            }
            Some(_) => self.error("slot name must start with a letter or underscore"),
        }
    }

    fn lex_slot_modifier(&mut self) -> Token<'a> {
        let rest = self.rest();
        match rest.chars().next() {
            None => self.error("unterminated slot"),
            Some('?') => {
                self.pos += 1;
                self.mode = Mode::SlotClose;
                Token::new(TokenKind::Question, "?")
            }
            Some('*') => {
                self.pos += 1;
                self.mode = Mode::SlotClose;
                Token::new(TokenKind::Star, "*")
            }
            Some('|') => {
                self.pos += 1;
                self.mode = Mode::SlotRegexp;
                Token::new(TokenKind::Pipe, "|")
            }
            Some('}') => {
                self.pos += 1;
                self.mode = Mode::Path;
                Token::new(TokenKind::CloseCurly, "}")
            }
            Some(_) => self.error("unexpected character in slot"),
        }
    }

    /// Regexp text runs to the `}` that closes the slot. The pattern itself
    /// may contain braces (`[0-9]{2,3}`), so track nesting depth, and let
    /// `\x` escapes pass through.
    fn lex_regexp(&mut self) -> Token<'a> {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut escaped = false;
        for (index, c) in rest.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                '}' => {
                    self.pos += index;
                    self.mode = Mode::SlotClose;
                    return Token::new(TokenKind::Regexp, &rest[..index]);
                }
                _ => {}
            }
        }
        self.error("unterminated slot")
    }

    fn lex_slot_close(&mut self) -> Token<'a> {
        match self.rest().chars().next() {
            Some('}') => {
                self.pos += 1;
                self.mode = Mode::Path;
                Token::new(TokenKind::CloseCurly, "}")
            }
            Some(_) => self.error("unexpected character in slot"),
            None => self.error("unterminated slot"),
        }
    }
}
