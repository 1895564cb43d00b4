//! Accumulated compiler errors and warnings.
//!
//! Phases never unwind on a user mistake. They record a [`Diagnostic`]
//! and carry on, and the driver asks [`Diagnostics::success`] before
//! starting the next phase.
use crate::tokens::Span;
use log::Level;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// Compiler stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    SemanticAnalyzer,
    CodeGenerator,
}

impl fmt::Display for Phase {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::Lexer            => f.write_str("Lexer"),
            Phase::Parser           => f.write_str("Parser"),
            Phase::SemanticAnalyzer => f.write_str("Semantic Analyzer"),
            Phase::CodeGenerator    => f.write_str("Code Generator"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Errors
    UndeclaredVariable,
    TypeMismatch,
    Redeclaration,
    ImageOverflow,
    Syntax,
    Lexical,
    /// Token stream broke the grammar contract the semantic walk relies on.
    Internal,

    // Warnings
    Uninitialized,
    Unused,
    DeadCode,
    InfiniteLoop,
    MissingEndOfProgram,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        use DiagnosticKind as K;
        match self {
            K::UndeclaredVariable | K::TypeMismatch | K::Redeclaration | K::ImageOverflow | K::Syntax | K::Lexical | K::Internal => {
                Severity::Error
            }
            K::Uninitialized | K::Unused | K::DeadCode | K::InfiniteLoop | K::MissingEndOfProgram => Severity::Warning,
        }
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self.severity() == Severity::Error
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub phase: Phase,
    pub span: Option<Span>,
    pub message: String,
}

impl Diagnostic {
    #[inline]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {} - {}", self.severity(), self.phase, self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a diagnostic.
    pub fn report(&mut self, kind: DiagnosticKind, phase: Phase, message: impl Into<String>) {
        self.push(Diagnostic {
            kind,
            phase,
            span: None,
            message: message.into(),
        })
    }

    pub fn report_at(&mut self, kind: DiagnosticKind, phase: Phase, span: Span, message: impl Into<String>) {
        self.push(Diagnostic {
            kind,
            phase,
            span: Some(span),
            message: message.into(),
        })
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity() {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warn,
        };
        log::log!(level, "{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Append diagnostics recorded by another phase, without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.kind.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.len() - self.error_count()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// No errors were recorded. Warnings don't count.
    #[inline]
    pub fn success(&self) -> bool {
        self.error_count() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counts() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::Unused, Phase::SemanticAnalyzer, "unused");
        assert!(diagnostics.success());

        diagnostics.report(DiagnosticKind::TypeMismatch, Phase::SemanticAnalyzer, "mismatch");
        assert!(!diagnostics.success());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::Unused), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::DeadCode), 0);
    }
}
