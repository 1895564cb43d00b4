use acc8_compiler::{
    diagnostic::DiagnosticKind,
    lex::lex_programs,
    semantic::{Analysis, Analyzer, AstNode, ScopeId, ValueType},
};

fn analyze(source: &str) -> Analysis {
    let mut programs = lex_programs(source);
    assert_eq!(programs.len(), 1, "fixture must hold exactly one program");
    Analyzer::new(programs.remove(0).tokens).analyze()
}

#[test]
fn test_sibling_blocks_have_distinct_scopes() {
    let analysis = analyze("{ { int x x = 1 print(x) } { int x x = 2 print(x) } }$");
    assert!(analysis.success());

    let symbols: Vec<_> = analysis.symbols.iter().collect();
    assert_eq!(symbols.len(), 2);
    let (first, first_symbol) = symbols[0];
    let (second, second_symbol) = symbols[1];
    assert_eq!(first_symbol.scope, ScopeId(1));
    assert_eq!(second_symbol.scope, ScopeId(2));

    let lookup = |scope| analysis.symbols.lookup('x', scope, &analysis.scopes);
    assert_eq!(lookup(ScopeId(1)), Some(first));
    assert_eq!(lookup(ScopeId(2)), Some(second));
    assert_eq!(lookup(ScopeId(0)), None);
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let analysis = analyze("{ int a { string a a = \"x\" print(a) } }$");
    assert!(analysis.success());

    let (_, outer) = analysis.symbols.iter().next().unwrap();
    assert_eq!(outer.ty, ValueType::Int);
    assert!(!outer.initialized);
    assert!(!outer.used);

    let (_, inner) = analysis.symbols.iter().nth(1).unwrap();
    assert_eq!(inner.ty, ValueType::String);
    assert!(inner.initialized);
    assert!(inner.used);
}

#[test]
fn test_scope_identifiers_are_never_reused() {
    let analysis = analyze("{ { } { { } } }$");
    assert_eq!(analysis.scopes.len(), 4);
    assert_eq!(analysis.scopes.parent(ScopeId(1)), Some(ScopeId(0)));
    assert_eq!(analysis.scopes.parent(ScopeId(2)), Some(ScopeId(0)));
    assert_eq!(analysis.scopes.parent(ScopeId(3)), Some(ScopeId(2)));
    assert_eq!(analysis.scopes.to_string(), "<Scope 0>\n-<Scope 1>\n-<Scope 2>\n--<Scope 3>\n");
}

#[test]
fn test_undeclared_variable() {
    let analysis = analyze("{ x = 1 }$");
    assert!(!analysis.success());
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::UndeclaredVariable), 1);

    let analysis = analyze("{ int a a = 1 print(b) }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::UndeclaredVariable), 1);
}

#[test]
fn test_declaration_is_not_visible_in_sibling() {
    let analysis = analyze("{ { int a } { a = 1 } }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::UndeclaredVariable), 1);
}

#[test]
fn test_assignment_type_mismatch() {
    let analysis = analyze("{ int a a = \"hi\" }$");
    assert!(!analysis.success());
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::TypeMismatch), 1);

    let (_, symbol) = analysis.symbols.iter().next().unwrap();
    assert!(!symbol.initialized);
}

#[test]
fn test_assignment_from_identifier_checks_declared_type() {
    let analysis = analyze("{ int a int b a = 1 b = a string s s = a }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::TypeMismatch), 1);

    let flags: Vec<_> = analysis
        .symbols
        .iter()
        .map(|(_, symbol)| (symbol.name, symbol.initialized, symbol.used))
        .collect();
    assert_eq!(flags, vec![('a', true, true), ('b', true, false), ('s', false, false)]);
}

#[test]
fn test_expression_type_errors() {
    let analysis = analyze("{ int a a = 1 + true }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::TypeMismatch), 1);

    let analysis = analyze("{ if (1 == \"a\") { } }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::TypeMismatch), 1);
}

#[test]
fn test_redeclaration() {
    let analysis = analyze("{ int a boolean a }$");
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::Redeclaration), 1);
    assert_eq!(analysis.symbols.len(), 1);

    // Redeclaring in a nested block is shadowing, not an error.
    assert!(analyze("{ int a { boolean a } }$").success());
}

#[test]
fn test_warning_sweep() {
    let analysis = analyze("{ int a string b b = \"hi\" }$");
    assert!(analysis.success());
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::Uninitialized), 1);
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::Unused), 2);
    assert_eq!(analysis.diagnostics.warning_count(), 3);
}

#[test]
fn test_ast_is_pruned() {
    let analysis = analyze("{ int a a = 1 + a print(a) }$");
    assert_eq!(
        analysis.ast.to_string(),
        "<Block>\n\
         -<Variable Declaration>\n\
         --[int]\n\
         --[a]\n\
         -<Assignment Statement>\n\
         --[a]\n\
         --<Add>\n\
         ---[1]\n\
         ---[a]\n\
         -<Print Statement>\n\
         --[a]\n"
    );
}

#[test]
fn test_comparison_nodes() {
    let analysis = analyze("{ while (1 != 2) { print(\"a b\") } if (true == false) { } }$");
    let nodes: Vec<_> = analysis
        .ast
        .iter_depth_first()
        .filter_map(|(id, _)| analysis.ast.get(id))
        .collect();

    assert!(nodes.contains(&&AstNode::IsNotEqual));
    assert!(nodes.contains(&&AstNode::IsEqual));
    assert!(nodes.contains(&&AstNode::Str("a b".into())));
    assert!(nodes.contains(&&AstNode::Block(ScopeId(2))));
}

#[test]
fn test_dead_code_declarations_are_walked() {
    let analysis = analyze("{ if false { int x } }$");
    assert!(analysis.success());

    let (_, symbol) = analysis.symbols.iter().next().unwrap();
    assert_eq!(symbol.name, 'x');
    assert_eq!(symbol.scope, ScopeId(1));
}

#[test]
fn test_broken_token_stream() {
    // Syntax errors are normally caught by the parser first.
    let analysis = analyze("{ int }$");
    assert!(!analysis.success());
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::Internal), 1);
}
