use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text the token was lexed from.
    ///
    /// Keywords and symbols carry their spelling, `CHAR` tokens
    /// carry the single character inside a string.
    pub lexeme: SmolStr,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// First character of the lexeme.
    ///
    /// Identifiers, digits and string characters are all one character wide.
    pub fn first_char(&self) -> Option<char> {
        self.lexeme.chars().next()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [ {} ] on line {}", self.kind, self.lexeme, self.span.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenBlock,    // `{`
    CloseBlock,   // `}`
    OpenParen,    // `(`
    CloseParen,   // `)`
    AssignOp,     // `=`
    EqualityOp,   // `==`
    InequalityOp, // `!=`
    AddOp,        // `+`
    TypeInt,
    TypeString,
    TypeBoolean,
    While,
    If,
    Print,
    True,
    False,
    /// Single decimal digit.
    Digit,
    /// One character inside a string literal.
    Char,
    Quote,
    /// Single lowercase letter.
    Id,
    /// End-of-program `$`
    Eop,
}

impl TokenKind {
    /// Spelling of reserved words, in the order they must be matched.
    pub const KEYWORDS: &'static [(&'static str, TokenKind)] = &[
        ("print", TokenKind::Print),
        ("while", TokenKind::While),
        ("if", TokenKind::If),
        ("int", TokenKind::TypeInt),
        ("string", TokenKind::TypeString),
        ("boolean", TokenKind::TypeBoolean),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
    ];

    #[inline]
    pub fn is_type(self) -> bool {
        matches!(self, TokenKind::TypeInt | TokenKind::TypeString | TokenKind::TypeBoolean)
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        let name = match self {
            T::OpenBlock    => "OPEN_BLOCK",
            T::CloseBlock   => "CLOSE_BLOCK",
            T::OpenParen    => "OPEN_PAREN",
            T::CloseParen   => "CLOSE_PAREN",
            T::AssignOp     => "ASSIGN_OP",
            T::EqualityOp   => "EQUALITY_OP",
            T::InequalityOp => "INEQUALITY_OP",
            T::AddOp        => "ADD_OP",
            T::TypeInt      => "TYPE_INT",
            T::TypeString   => "TYPE_STRING",
            T::TypeBoolean  => "TYPE_BOOLEAN",
            T::While        => "WHILE",
            T::If           => "IF",
            T::Print        => "PRINT",
            T::True         => "TRUE",
            T::False        => "FALSE",
            T::Digit        => "DIGIT",
            T::Char         => "CHAR",
            T::Quote        => "QUOTE",
            T::Id           => "ID",
            T::Eop          => "EOP",
        };
        f.pad(name)
    }
}

/// Chunk of source code, encoded as starting and ending positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// End position of bytes in source, exclusive.
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
