//! Compiler for a small block structured teaching language, targeting
//! the 256 byte acc8 machine.
//!
//! Each program of a batch runs through the pipeline on its own:
//! lex, parse, semantic walk, code generation. A phase only runs when
//! every phase before it succeeded.
pub mod compile;
pub mod diagnostic;
pub mod lex;
pub mod parsing;
pub mod semantic;
pub mod token_stream;
pub mod tokens;
pub mod tree;

use compile::{render_cells, CodeGen, Generated, Image};
use diagnostic::{DiagnosticKind, Diagnostics, Phase};
use log::{info, warn};
use parsing::Cst;
use semantic::{Analysis, Analyzer};
use std::fmt::Write;
use tokens::Token;

/// Which artifacts a [`ProgramReport`] renders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct CompilerConf {
    pub show_cst: bool,
    pub show_ast: bool,
    pub show_scopes: bool,
    pub show_symbols: bool,
    /// Placeholder stream plus the variable and jump tables.
    pub show_tables: bool,
    pub show_image: bool,
}

impl Default for CompilerConf {
    fn default() -> Self {
        Self {
            show_cst: false,
            show_ast: true,
            show_scopes: false,
            show_symbols: true,
            show_tables: false,
            show_image: true,
        }
    }
}

/// Outcome of compiling one program of a batch.
#[derive(Debug)]
pub struct ProgramReport {
    /// One-based position in the batch.
    pub number: usize,
    /// Diagnostics of every phase that ran, in order.
    pub diagnostics: Diagnostics,
    pub cst: Option<Cst>,
    pub analysis: Option<Analysis>,
    pub generated: Option<Generated>,
}

impl ProgramReport {
    #[inline]
    pub fn success(&self) -> bool {
        self.diagnostics.success() && self.image().is_some()
    }

    pub fn image(&self) -> Option<&Image> {
        self.generated.as_ref().and_then(|generated| generated.image.as_ref())
    }

    /// Render the artifacts selected in the configuration.
    pub fn render(&self, conf: &CompilerConf) -> String {
        let mut out = String::new();
        // Writing to a String can't fail.
        let _ = self.write_report(&mut out, conf);
        out
    }

    fn write_report(&self, out: &mut String, conf: &CompilerConf) -> std::fmt::Result {
        writeln!(
            out,
            "Program {}: {} with {} error(s) and {} warning(s)",
            self.number,
            if self.success() { "compiled" } else { "failed" },
            self.diagnostics.error_count(),
            self.diagnostics.warning_count()
        )?;

        if let (true, Some(cst)) = (conf.show_cst, &self.cst) {
            writeln!(out, "\nCST for program {}:\n{}", self.number, cst)?;
        }
        if let Some(analysis) = &self.analysis {
            if conf.show_ast {
                writeln!(out, "\nAST for program {}:\n{}", self.number, analysis.ast)?;
            }
            if conf.show_scopes {
                writeln!(out, "\nScope tree for program {}:\n{}", self.number, analysis.scopes)?;
            }
            if conf.show_symbols {
                writeln!(out, "\nSymbol table for program {}:\n{}", self.number, analysis.symbols)?;
            }
        }
        if let Some(generated) = &self.generated {
            if conf.show_tables {
                writeln!(
                    out,
                    "\nCode for program {} ({} bytes, heap at {:#04X}):\n{}",
                    self.number,
                    generated.code_len,
                    generated.heap_start(),
                    render_cells(&generated.cells)
                )?;
                writeln!(out, "\nVariable table:\n{}", generated.variables)?;
                writeln!(out, "Jump table:\n{}", generated.jumps)?;
            }
            if let (true, Some(image)) = (conf.show_image, &generated.image) {
                writeln!(out, "\nImage for program {}:\n{}", self.number, image)?;
            }
        }

        Ok(())
    }
}

/// Compile every program in a batch source.
///
/// A failing program never stops the batch.
pub fn compile_source(source: &str) -> Vec<ProgramReport> {
    lex::lex_programs(source)
        .into_iter()
        .map(|program| {
            let mut report = if program.success() {
                compile_tokens(program.number, program.tokens)
            } else {
                warn!("Skipping parse of program {} due to lex errors", program.number);
                ProgramReport {
                    number: program.number,
                    diagnostics: Diagnostics::new(),
                    cst: None,
                    analysis: None,
                    generated: None,
                }
            };

            // Lex diagnostics come first.
            let mut diagnostics = program.diagnostics;
            diagnostics.extend(report.diagnostics);
            report.diagnostics = diagnostics;
            report
        })
        .collect()
}

/// Parse, analyze and generate code for the tokens of one program.
pub fn compile_tokens(number: usize, tokens: Vec<Token>) -> ProgramReport {
    let mut report = ProgramReport {
        number,
        diagnostics: Diagnostics::new(),
        cst: None,
        analysis: None,
        generated: None,
    };

    info!("Parsing program {}", number);
    match parsing::parse_program(tokens.clone()) {
        Ok(cst) => report.cst = Some(cst),
        Err(err) => {
            report.diagnostics.report(DiagnosticKind::Syntax, Phase::Parser, err.to_string());
            info!("Parse of program {} failed, skipping semantic analysis", number);
            return report;
        }
    }

    info!("Semantically analyzing program {}", number);
    let analysis = Analyzer::new(tokens).analyze();
    report.diagnostics.extend(analysis.diagnostics.clone());
    if !analysis.success() {
        info!("Skipping code generation for program {} due to semantic errors", number);
        report.analysis = Some(analysis);
        return report;
    }

    info!("Generating code for program {}", number);
    let generated = CodeGen::new(&analysis).generate();
    report.diagnostics.extend(generated.diagnostics.clone());
    report.analysis = Some(analysis);
    report.generated = Some(generated);

    report
}
