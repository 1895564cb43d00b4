use acc8_compiler::{
    diagnostic::DiagnosticKind,
    lex::{lex_programs, Lexer},
    tokens::TokenKind,
};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).filter_map(Result::ok).map(|token| token.kind).collect()
}

#[test]
fn test_keywords_before_identifiers() {
    use TokenKind as T;
    assert_eq!(kinds("intx"), vec![T::TypeInt, T::Id]);
    assert_eq!(kinds("while whilex"), vec![T::While, T::While, T::Id]);
    assert_eq!(kinds("i f"), vec![T::Id, T::Id]);
    assert_eq!(kinds("booleanb string"), vec![T::TypeBoolean, T::Id, T::TypeString]);
}

#[test]
fn test_symbols() {
    use TokenKind as T;
    assert_eq!(
        kinds("{ a = 1 + 2 (a == b) (a != b) }$"),
        vec![
            T::OpenBlock,
            T::Id,
            T::AssignOp,
            T::Digit,
            T::AddOp,
            T::Digit,
            T::OpenParen,
            T::Id,
            T::EqualityOp,
            T::Id,
            T::CloseParen,
            T::OpenParen,
            T::Id,
            T::InequalityOp,
            T::Id,
            T::CloseParen,
            T::CloseBlock,
            T::Eop,
        ]
    );
}

#[test]
fn test_string_characters() {
    use TokenKind as T;

    let tokens: Vec<_> = Lexer::new("print(\"a b\")").filter_map(Result::ok).collect();
    let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![T::Print, T::OpenParen, T::Quote, T::Char, T::Char, T::Char, T::Quote, T::CloseParen]
    );
    // Keywords are not recognised inside strings.
    assert_eq!(tokens[4].lexeme, " ");
    assert_eq!(self::kinds("\"int\""), vec![T::Quote, T::Char, T::Char, T::Char, T::Quote]);
}

#[test]
fn test_comments_skipped() {
    use TokenKind as T;
    assert_eq!(kinds("/* int a */ { } /**/ $"), vec![T::OpenBlock, T::CloseBlock, T::Eop]);
}

#[test]
fn test_spans() {
    let tokens: Vec<_> = Lexer::new("{\n  int a\n}$").filter_map(Result::ok).collect();
    assert_eq!(tokens[1].kind, TokenKind::TypeInt);
    assert_eq!((tokens[1].span.line, tokens[1].span.column), (2, 3));
    assert_eq!((tokens[2].span.line, tokens[2].span.column), (2, 7));
    assert_eq!(tokens[3].span.line, 3);
}

#[test]
fn test_batch_split() {
    let programs = lex_programs("{}$ { int a }$\n");
    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0].number, 1);
    assert_eq!(programs[1].number, 2);
    assert_eq!(programs[1].tokens.len(), 5);
    assert!(programs.iter().all(|program| program.success() && program.diagnostics.is_empty()));
}

#[test]
fn test_unknown_character_continues() {
    let programs = lex_programs("{ @ }$");
    assert_eq!(programs.len(), 1);

    let program = &programs[0];
    assert!(!program.success());
    assert_eq!(program.diagnostics.count(DiagnosticKind::Lexical), 1);
    assert_eq!(
        program.tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
        vec![TokenKind::OpenBlock, TokenKind::CloseBlock, TokenKind::Eop]
    );
}

#[test]
fn test_invalid_string() {
    let programs = lex_programs("{ print(\"Ab\") }$");
    let program = &programs[0];
    assert!(!program.success());
    assert!(program.diagnostics.count(DiagnosticKind::Lexical) >= 1);
}

#[test]
fn test_unterminated_string_stops_at_end_of_program() {
    let programs = lex_programs("{ print(\"ab }$ {}$");
    assert_eq!(programs.len(), 2);
    assert!(!programs[0].success());
    assert_eq!(programs[0].tokens.last().map(|token| token.kind), Some(TokenKind::Eop));
    assert!(programs[1].success());
}

#[test]
fn test_missing_end_of_program() {
    let programs = lex_programs("{}$ {}");
    assert_eq!(programs.len(), 2);

    let last = &programs[1];
    assert!(last.success());
    assert_eq!(last.diagnostics.count(DiagnosticKind::MissingEndOfProgram), 1);
    assert_eq!(last.tokens.last().map(|token| token.kind), Some(TokenKind::Eop));
}

#[test]
fn test_unterminated_comment() {
    let programs = lex_programs("{}$ /* {}$");
    assert_eq!(programs.len(), 2);
    assert!(!programs[1].success());
}
