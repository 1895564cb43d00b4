//! Lexical analysis (tokenizer)
use crate::{
    diagnostic::{DiagnosticKind, Diagnostics, Phase},
    tokens::{Span, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use log::{debug, info};
use std::{error, fmt, iter::Iterator, str::CharIndices};

/// Tokens of one program in a batch, terminated by `EOP`.
#[derive(Debug, Default)]
pub struct LexedProgram {
    /// One-based position of the program in the batch.
    pub number: usize,
    pub tokens: Vec<Token>,
    pub diagnostics: Diagnostics,
}

impl LexedProgram {
    #[inline]
    pub fn success(&self) -> bool {
        self.diagnostics.success()
    }
}

/// Lex a batch of programs, splitting on the end-of-program symbol `$`.
///
/// Lexing continues past errors so every problem in a program is
/// reported. Trailing tokens without a closing `$` are closed with an
/// implicit `EOP` and a warning.
pub fn lex_programs(source: &str) -> Vec<LexedProgram> {
    let mut programs = vec![];
    let mut current = LexedProgram {
        number: 1,
        ..Default::default()
    };

    let mut lexer = Lexer::new(source);
    while let Some(result) = lexer.next_token() {
        match result {
            Ok(token) => {
                let is_eop = token.kind == TokenKind::Eop;
                current.tokens.push(token);
                if is_eop {
                    let number = current.number + 1;
                    programs.push(finish_program(current));
                    current = LexedProgram {
                        number,
                        ..Default::default()
                    };
                }
            }
            Err(err) => current
                .diagnostics
                .report_at(DiagnosticKind::Lexical, Phase::Lexer, err.span(), err.to_string()),
        }
    }

    if !current.tokens.is_empty() || !current.diagnostics.is_empty() {
        let end = lexer.source.pos();
        let span = Span {
            start: end.position,
            end: end.position,
            line: end.line,
            column: end.column,
        };
        current.diagnostics.report_at(
            DiagnosticKind::MissingEndOfProgram,
            Phase::Lexer,
            span,
            "missing end-of-program symbol '$', one was added",
        );
        current.tokens.push(Token::new(TokenKind::Eop, "$", span));
        programs.push(finish_program(current));
    }

    programs
}

fn finish_program(program: LexedProgram) -> LexedProgram {
    let errors = program.diagnostics.error_count();
    if errors == 0 {
        info!(
            "Lexed program {} into {} tokens with {} warning(s)",
            program.number,
            program.tokens.len(),
            program.diagnostics.warning_count()
        );
    } else {
        info!("Lex of program {} failed with {} error(s)", program.number, errors);
    }
    program
}

/// Lexical analyzer.
///
/// Iterates tokens until the source is exhausted. Program delimiters are
/// ordinary `EOP` tokens; splitting a batch is left to [`lex_programs`].
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    token_start: SourcePos,
    /// Inside a quoted string, where only characters and spaces are legal.
    in_string: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos::default(),
            in_string: false,
        }
    }

    /// Lex the next token.
    ///
    /// Returns `None` when the end of the source is reached.
    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        use TokenKind as T;

        if self.in_string {
            return self.next_string_token();
        }

        loop {
            self.start_token();
            let (_, next_char) = self.source.next_char()?;

            let token = match next_char {
                ' ' | '\t' | '\r' | '\n' => continue,
                '{'             => self.make_token(T::OpenBlock),
                '}'             => self.make_token(T::CloseBlock),
                '('             => self.make_token(T::OpenParen),
                ')'             => self.make_token(T::CloseParen),
                '+'             => self.make_token(T::AddOp),
                '$'             => self.make_token(T::Eop),
                '='             => {
                    if self.source.peek_char() == Some('=') {
                        self.source.next_char();
                        self.make_token(T::EqualityOp)
                    } else {
                        self.make_token(T::AssignOp)
                    }
                }
                '!'             => {
                    if self.source.peek_char() == Some('=') {
                        self.source.next_char();
                        self.make_token(T::InequalityOp)
                    } else {
                        self.source.reset_peek();
                        return Some(Err(LexError::UnknownCharacter('!', self.span())));
                    }
                }
                '"'             => {
                    self.in_string = true;
                    self.make_token(T::Quote)
                }
                '/'             => {
                    if self.source.peek_char() == Some('*') {
                        self.source.next_char();
                        match self.consume_comment() {
                            Ok(()) => continue,
                            Err(err) => return Some(Err(err)),
                        }
                    } else {
                        self.source.reset_peek();
                        return Some(Err(LexError::UnknownCharacter('/', self.span())));
                    }
                }
                '0'..='9'       => self.make_token(T::Digit),
                'a'..='z'       => self.consume_word(),
                _               => return Some(Err(LexError::UnknownCharacter(next_char, self.span()))),
            };

            debug!("{}", token);
            return Some(Ok(token));
        }
    }

    fn next_string_token(&mut self) -> Option<Result<Token, LexError>> {
        self.start_token();

        // The end of a program or of the source closes the string
        // without being consumed, so lexing recovers after the error.
        match self.source.peek_char() {
            None | Some('$') => {
                self.source.reset_peek();
                self.in_string = false;
                return Some(Err(LexError::UnterminatedString(self.span())));
            }
            _ => self.source.reset_peek(),
        }

        let (_, next_char) = self.source.next_char()?;
        match next_char {
            '"' => {
                self.in_string = false;
                Some(Ok(self.make_token(TokenKind::Quote)))
            }
            'a'..='z' | ' ' => Some(Ok(self.make_token(TokenKind::Char))),
            _ => Some(Err(LexError::InvalidStringCharacter(next_char, self.span()))),
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.pos();
    }

    fn span(&self) -> Span {
        Span {
            start: self.token_start.position,
            end: self.source.pos().position,
            line: self.token_start.line,
            column: self.token_start.column,
        }
    }

    fn make_token(&mut self, token_kind: TokenKind) -> Token {
        let span = self.span();
        Token::new(token_kind, &self.source.original[span.start..span.end], span)
    }

    /// Keywords take precedence over identifiers, so `intx` is the
    /// keyword `int` followed by the identifier `x`.
    fn consume_word(&mut self) -> Token {
        let rest = &self.source.original[self.token_start.position..];

        for (keyword, kind) in TokenKind::KEYWORDS {
            if rest.starts_with(keyword) {
                // First character is already consumed.
                for _ in 1..keyword.len() {
                    self.source.next_char();
                }
                return self.make_token(*kind);
            }
        }

        self.make_token(TokenKind::Id)
    }

    /// Skip a block comment. The opening `/*` is already consumed.
    fn consume_comment(&mut self) -> Result<(), LexError> {
        while let Some((_, c)) = self.source.next_char() {
            if c == '*' {
                if self.source.peek_char() == Some('/') {
                    self.source.next_char();
                    return Ok(());
                }
                self.source.reset_peek();
            }
        }

        Err(LexError::UnterminatedComment(self.span()))
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the lexer can
    /// slice lexemes from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. Peeking advances
    /// the internal peek cursor by 1, and the cursor is restored when
    /// calling `MultiPeek::next()` or `MultiPeek::reset_peek()`.
    source: MultiPeek<CharIndices<'a>>,

    /// Position of the next character to be consumed.
    next: SourcePos,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            next: SourcePos {
                position: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        let (index, c) = self.source.next()?;
        self.next.position = index + c.len_utf8();
        if c == '\n' {
            self.next.line += 1;
            self.next.column = 1;
        } else {
            self.next.column += 1;
        }
        Some((index, c))
    }

    /// Peeks the current character in the stream.
    ///
    /// This call advances the peek cursor. Subsequent
    /// calls will look ahead by one character each call.
    fn peek_char(&mut self) -> Option<char> {
        self.source.peek().map(|(_, c)| *c)
    }

    /// Reset the stream peek cursor.
    fn reset_peek(&mut self) {
        self.source.reset_peek()
    }

    #[inline]
    pub(crate) fn pos(&self) -> SourcePos {
        self.next
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SourcePos {
    pub(crate) position: usize,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnknownCharacter(char, Span),
    /// Only lowercase letters and spaces may appear in a string.
    InvalidStringCharacter(char, Span),
    UnterminatedString(Span),
    UnterminatedComment(Span),
}

impl LexError {
    pub fn span(&self) -> Span {
        use LexError as E;
        match self {
            E::UnknownCharacter(_, span)
            | E::InvalidStringCharacter(_, span)
            | E::UnterminatedString(span)
            | E::UnterminatedComment(span) => *span,
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LexError as E;
        match self {
            E::UnknownCharacter(c, _) => write!(f, "unrecognized character {:?}", c),
            E::InvalidStringCharacter(c, _) => write!(f, "invalid character {:?} in string", c),
            E::UnterminatedString(_) => write!(f, "unterminated string"),
            E::UnterminatedComment(_) => write!(f, "unterminated comment"),
        }
    }
}
