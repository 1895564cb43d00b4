use acc8_compiler::{compile_source, diagnostic::DiagnosticKind, CompilerConf};

const PROGRAMS: &str = include_str!("programs.acc8");

#[test]
fn test_batch_continues_after_failures() {
    let reports = compile_source(PROGRAMS);

    let numbers: Vec<_> = reports.iter().map(|report| report.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

    let outcomes: Vec<_> = reports.iter().map(|report| report.success()).collect();
    assert_eq!(outcomes, vec![true, false, false, false, true]);
}

#[test]
fn test_failing_phase_stops_the_pipeline() {
    let reports = compile_source(PROGRAMS);

    // Undeclared variable: analyzed, not generated.
    assert_eq!(reports[1].diagnostics.count(DiagnosticKind::UndeclaredVariable), 1);
    assert!(reports[1].analysis.is_some());
    assert!(reports[1].generated.is_none());

    // Lexical error: nothing after the lexer runs.
    assert_eq!(reports[2].diagnostics.count(DiagnosticKind::Lexical), 1);
    assert!(reports[2].cst.is_none());
    assert!(reports[2].analysis.is_none());

    // Syntax error: no semantic walk.
    assert_eq!(reports[3].diagnostics.count(DiagnosticKind::Syntax), 1);
    assert!(reports[3].analysis.is_none());
}

#[test]
fn test_missing_end_of_program_is_a_warning() {
    let reports = compile_source(PROGRAMS);
    let last = &reports[4];
    assert_eq!(last.diagnostics.count(DiagnosticKind::MissingEndOfProgram), 1);
    assert_eq!(last.diagnostics.error_count(), 0);
    assert!(last.image().is_some());
}

#[test]
fn test_render_selected_artifacts() {
    let reports = compile_source(PROGRAMS);

    let rendered = reports[0].render(&CompilerConf::default());
    assert!(rendered.starts_with("Program 1: compiled with 0 error(s)"));
    assert!(rendered.contains("AST for program 1"));
    assert!(rendered.contains("Symbol table for program 1"));
    assert!(rendered.contains("Image for program 1"));
    assert!(!rendered.contains("CST for program 1"));

    let everything = CompilerConf {
        show_cst: true,
        show_scopes: true,
        show_tables: true,
        ..CompilerConf::default()
    };
    let rendered = reports[0].render(&everything);
    assert!(rendered.contains("<Program>"));
    assert!(rendered.contains("<Scope 0>"));
    assert!(rendered.contains("Variable table"));
    assert!(rendered.contains("Jump table"));

    let rendered = reports[1].render(&everything);
    assert!(rendered.starts_with("Program 2: failed with 1 error(s)"));
    assert!(!rendered.contains("Image for program 2"));
}
