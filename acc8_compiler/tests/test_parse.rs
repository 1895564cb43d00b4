use acc8_compiler::{
    lex::lex_programs,
    parsing::{parse_program, CstNode, ParseError},
    tokens::TokenKind,
};

fn parse(source: &str) -> Result<acc8_compiler::parsing::Cst, ParseError> {
    let mut programs = lex_programs(source);
    assert_eq!(programs.len(), 1, "fixture must hold exactly one program");
    parse_program(programs.remove(0).tokens)
}

#[test]
fn test_empty_program() {
    let cst = parse("{}$").unwrap();
    assert_eq!(
        cst.to_string(),
        "<Program>\n-<Block>\n--[{]\n--<Statement List>\n--[}]\n-[$]\n"
    );
}

#[test]
fn test_every_statement() {
    let cst = parse(
        r#"{
            int a
            a = 1 + 2 + a
            string s
            s = "hi there"
            boolean b
            b = (a != 3)
            while (b == true) { b = false }
            if true { print(s) }
            { print(a) }
        }$"#,
    )
    .unwrap();

    let rendered = cst.to_string();
    for production in [
        "<Variable Declaration>",
        "<Assignment Statement>",
        "<Int Expression>",
        "<String Expression>",
        "<Char List>",
        "<Boolean Expression>",
        "<While Statement>",
        "<If Statement>",
        "<Print Statement>",
    ] {
        assert!(rendered.contains(production), "missing {}", production);
    }
    assert!(rendered.contains("[!=]"));
    assert_eq!(cst.get(cst.root().unwrap()), Some(&CstNode::Production("Program")));
}

#[test]
fn test_declaration_without_identifier() {
    let err = parse("{ int }$").unwrap_err();
    assert_eq!(err.expected, vec![TokenKind::Id]);
    assert_eq!(err.found.map(|token| token.kind), Some(TokenKind::CloseBlock));
}

#[test]
fn test_incomplete_addition() {
    let err = parse("{ print(1 + ) }$").unwrap_err();
    assert!(err.expected.contains(&TokenKind::Digit));
    assert_eq!(err.found.as_ref().map(|token| token.kind), Some(TokenKind::CloseParen));
    assert!(err.to_string().contains("CLOSE_PAREN"));
}

#[test]
fn test_missing_close_block() {
    let err = parse("{ int a $").unwrap_err();
    assert_eq!(err.expected, vec![TokenKind::CloseBlock]);
    assert_eq!(err.found.map(|token| token.kind), Some(TokenKind::Eop));
}

#[test]
fn test_comparison_needs_parentheses() {
    assert!(parse("{ if a == 1 { } }$").is_err());
    assert!(parse("{ if (a == 1) { } }$").is_ok());
}
