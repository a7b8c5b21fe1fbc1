use std::collections::VecDeque;

use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind};

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::route::Route;
use crate::section::Section;
use crate::sections::Sections;

/// Recursive-descent parser over the token stream.
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            lookahead: VecDeque::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Route, ParseError> {
        if self.peek(0).kind != TokenKind::Slash {
            return Err(ParseError::MissingLeadingSlash);
        }

        let mut sections = Vec::new();
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::End => break,
                TokenKind::Error => return Err(ParseError::Lex(token.text.to_owned())),
                TokenKind::Slash => sections.push(Section::Slash),
                TokenKind::Path => sections.push(Section::literal(token.text)),
                TokenKind::OpenCurly => sections.push(self.parse_slot()?),
                found => {
                    return Err(ParseError::UnexpectedToken {
                        expected: TokenKind::Slash,
                        found,
                    })
                }
            }
        }
        Ok(Route::from_sections(Sections::new(sections)))
    }

    fn parse_slot(&mut self) -> Result<Section, ParseError> {
        let name = self.expect(TokenKind::Slot)?.text.to_owned();
        match self.peek(0).kind {
            TokenKind::Question => {
                self.advance();
                self.expect(TokenKind::CloseCurly)?;
                self.expect_end(ParseError::OptionalNotAtEnd)?;
                Ok(Section::optional(name))
            }
            TokenKind::Star => {
                self.advance();
                self.expect(TokenKind::CloseCurly)?;
                self.expect_end(ParseError::WildcardNotAtEnd)?;
                Ok(Section::wildcard(name))
            }
            TokenKind::Pipe => {
                self.advance();
                let raw = self.expect(TokenKind::Regexp)?.text;
                let section = regexp_section(&name, raw)?;
                self.expect(TokenKind::CloseCurly)?;
                self.finish_slot(section, &name)
            }
            _ => {
                self.expect(TokenKind::CloseCurly)?;
                self.finish_slot(Section::required(name.clone()), &name)
            }
        }
    }

    /// After a closed placeholder: a directly following placeholder is an
    /// error, and the first byte of directly following literal text joins
    /// the placeholder's delimiter set.
    fn finish_slot(&mut self, mut section: Section, name: &str) -> Result<Section, ParseError> {
        let next = self.peek(0);
        match next.kind {
            TokenKind::OpenCurly => return Err(ParseError::SlotAfterSlot(name.to_owned())),
            TokenKind::Path => {
                if let (Some(delimiters), Some(&byte)) =
                    (section.delimiters_mut(), next.text.as_bytes().first())
                {
                    delimiters.insert(byte);
                }
            }
            _ => {}
        }
        Ok(section)
    }

    fn advance(&mut self) -> Token<'a> {
        self.lookahead
            .pop_front()
            .unwrap_or_else(|| self.lexer.next_token())
    }

    fn peek(&mut self, n: usize) -> Token<'a> {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.advance();
        if token.kind == kind {
            return Ok(token);
        }
        match token.kind {
            TokenKind::Error => Err(ParseError::Lex(token.text.to_owned())),
            found => Err(ParseError::UnexpectedToken {
                expected: kind,
                found,
            }),
        }
    }

    fn expect_end(&mut self, otherwise: ParseError) -> Result<(), ParseError> {
        match self.peek(0).kind {
            TokenKind::End => Ok(()),
            _ => Err(otherwise),
        }
    }
}

/// Builds a regexp section: strips any existing anchors, re-anchors as
/// `^…$`, compiles, and verifies the pattern cannot match empty input or a
/// `/`.
fn regexp_section(name: &str, raw: &str) -> Result<Section, ParseError> {
    let mut pattern = raw;
    if let Some(stripped) = pattern.strip_prefix('^') {
        pattern = stripped;
    }
    if let Some(stripped) = pattern.strip_suffix('$') {
        pattern = stripped;
    }

    let anchored = format!("^{pattern}$");
    let compiled =
        Regex::new(&anchored).map_err(|err| ParseError::InvalidRegexp(err.to_string()))?;

    let hir = regex_syntax::Parser::new()
        .parse(pattern)
        .map_err(|err| ParseError::Lex(err.to_string()))?;
    if hir.properties().minimum_len().unwrap_or(0) == 0 {
        return Err(ParseError::EmptyRegexp {
            pattern: pattern.to_owned(),
        });
    }
    if can_match_slash(&hir) {
        return Err(ParseError::SlashInRegexp {
            pattern: pattern.to_owned(),
        });
    }

    Ok(Section::regexp(name, compiled, anchored))
}

fn can_match_slash(hir: &Hir) -> bool {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => false,
        HirKind::Literal(literal) => literal.0.contains(&b'/'),
        HirKind::Class(Class::Unicode(class)) => class
            .ranges()
            .iter()
            .any(|range| range.start() <= '/' && '/' <= range.end()),
        HirKind::Class(Class::Bytes(class)) => class
            .ranges()
            .iter()
            .any(|range| range.start() <= b'/' && b'/' <= range.end()),
        HirKind::Repetition(repetition) => can_match_slash(&repetition.sub),
        HirKind::Capture(capture) => can_match_slash(&capture.sub),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => subs.iter().any(can_match_slash),
    }
}
