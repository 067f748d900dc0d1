//! Ties the whole run together: read the grammar file, run the core passes
//! in order, render the report, emit the driver. One function per stage,
//! matching `main.c`'s own straight-line `MlnParse` → `MlnFindStates` →
//! `MlnFindFollowSets` → `MlnFindActions` → `MlnReportOutput` sequence.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::Cli;
use crate::emit::{self, EmitContext};
use crate::frontend;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("can't read grammar file {path}: {source}")]
    ReadGrammar {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Lex(#[from] frontend::LexError),
    #[error(transparent)]
    Lalr(#[from] melon_lalr::LalrError),
    #[error(transparent)]
    Emit(#[from] emit::EmitError),
    #[error("can't write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a run produced, for `main` to report and turn into an exit code.
pub struct RunSummary {
    pub error_cnt: usize,
    pub conflict_cnt: usize,
    pub report_path: Option<PathBuf>,
    pub parser_path: PathBuf,
}

pub fn run(cli: &Cli) -> Result<RunSummary, PipelineError> {
    let input = cli.input.as_ref().expect("caller checked input is present");
    let text = fs::read_to_string(input).map_err(|source| PipelineError::ReadGrammar {
        path: input.clone(),
        source,
    })?;
    let filename = input.to_string_lossy().to_string();

    let (grammar, source, syntax_diagnostics) = frontend::parse_grammar(&filename, &text)?;
    for diagnostic in &syntax_diagnostics {
        log::error!("{diagnostic}");
    }
    for error in &grammar.errors {
        log::error!("{error}");
    }

    let automaton = melon_lalr::build_states(&grammar)?;
    let tables = melon_action::build_actions(&grammar, &automaton);
    let conflict_cnt = tables.conflicts;
    let num_states = automaton.states.len() as u32;

    let report_text = if cli.quiet {
        None
    } else {
        Some(melon_report::render(&grammar, &automaton, &tables.per_state, cli.basis))
    };

    let compressed = if cli.compress_disabled {
        tables
            .per_state
            .into_iter()
            .map(|actions| (actions, None))
            .collect()
    } else {
        melon_action::compress_default_actions(&grammar, tables.per_state)
    };

    let code_space = melon_pack::CodeSpace::new(num_states, grammar.rules.len() as u32);
    let packed = melon_pack::pack_tables(&grammar, &compressed, code_space);

    let out_dir = resolve_out_dir(cli, input);
    fs::create_dir_all(&out_dir).map_err(|source| PipelineError::Write {
        path: out_dir.clone(),
        source,
    })?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "grammar".to_string());

    let report_path = match report_text {
        Some(text) => {
            let path = out_dir.join(format!("{stem}.out"));
            fs::write(&path, text).map_err(|source| PipelineError::Write {
                path: path.clone(),
                source,
            })?;
            Some(path)
        }
        None => None,
    };

    let template_text = emit::load_template(cli.template.as_deref())?;

    let ctx = EmitContext {
        grammar: &grammar,
        source: &source,
        packed: &packed,
        num_states,
    };
    let parser_text = emit::emit(&template_text, &ctx);
    let parser_path = out_dir.join(format!("{stem}.rs"));
    emit::write_parser(&parser_path, &parser_text)?;

    Ok(RunSummary {
        error_cnt: grammar.errors.len() + syntax_diagnostics.len(),
        conflict_cnt,
        report_path,
        parser_path,
    })
}

fn resolve_out_dir(cli: &Cli, input: &Path) -> PathBuf {
    match &cli.out_dir {
        Some(dir) => dir.clone(),
        None => input
            .parent()
            .map(|p| p.to_path_buf())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}
