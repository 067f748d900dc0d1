//! End-to-end pipeline tests, run in-process against `melon_cli::pipeline::run`
//! rather than the built binary, so the test suite needs no process-spawning
//! or temp-file helper crates beyond what the workspace already depends on.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use melon_cli::cli::Cli;
use melon_cli::pipeline;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("melon_cli_test_{}_{}_{}", std::process::id(), name, n));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_grammar(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn cli(input: PathBuf, out_dir: PathBuf) -> Cli {
    Cli {
        input: Some(input),
        basis: false,
        compress_disabled: false,
        out_dir: Some(out_dir),
        template: None,
        quiet: false,
        version: false,
    }
}

#[test]
fn trivial_identity_grammar_produces_a_clean_run() {
    let dir = scratch_dir("trivial");
    let input = write_grammar(&dir, "g.y", "start ::= ID.\n");

    let summary = pipeline::run(&cli(input, dir.clone())).unwrap();
    assert_eq!(summary.error_cnt, 0);
    assert_eq!(summary.conflict_cnt, 0);

    let report = fs::read_to_string(summary.report_path.as_ref().unwrap()).unwrap();
    assert!(report.contains("State 0:"));
    assert!(report.contains("accept"));

    let parser = fs::read_to_string(&summary.parser_path).unwrap();
    assert!(parser.contains("pub const ID: u32"));
    assert!(parser.contains("const YY_NSTATE: u32"));
    assert!(parser.contains("fn next_action"));
}

#[test]
fn left_recursive_expression_grammar_with_precedence_has_no_conflicts() {
    let dir = scratch_dir("expr_prec");
    let text = "\
%left PLUS MINUS.
%left TIMES DIVIDE.
expr ::= expr(a) PLUS expr(b) . { a + b }
expr ::= expr(a) MINUS expr(b) . { a - b }
expr ::= expr(a) TIMES expr(b) . { a * b }
expr ::= expr(a) DIVIDE expr(b) . { a / b }
expr ::= NUM.
";
    let input = write_grammar(&dir, "expr.y", text);

    let summary = pipeline::run(&cli(input, dir.clone())).unwrap();
    assert_eq!(summary.error_cnt, 0);
    assert_eq!(summary.conflict_cnt, 0, "precedence should resolve every shift/reduce run");
}

#[test]
fn dangling_else_without_precedence_is_reported_as_a_conflict() {
    let dir = scratch_dir("dangling_else");
    let text = "\
stmt ::= IF expr THEN stmt.
stmt ::= IF expr THEN stmt ELSE stmt.
stmt ::= OTHER.
expr ::= ID.
";
    let input = write_grammar(&dir, "if.y", text);

    let summary = pipeline::run(&cli(input, dir.clone())).unwrap();
    assert_eq!(summary.error_cnt, 0);
    assert!(summary.conflict_cnt > 0, "an undeclared shift/reduce ambiguity must surface as a conflict");

    let report = fs::read_to_string(summary.report_path.as_ref().unwrap()).unwrap();
    assert!(report.contains("** Parsing conflict **"));

    let code = melon_cli::run(&cli(dir.join("if.y"), dir));
    assert_eq!(code, summary.error_cnt as i32 + summary.conflict_cnt as i32, "exit code must equal error_cnt + nconflict");
    assert_ne!(code, 0, "a grammar with unresolved conflicts but no hard errors must not exit 0");
}

#[test]
fn ambiguous_reduce_reduce_without_precedence_is_reported() {
    let dir = scratch_dir("reduce_reduce");
    let text = "\
start ::= a.
start ::= b.
a ::= ID.
b ::= ID.
";
    let input = write_grammar(&dir, "rr.y", text);

    let summary = pipeline::run(&cli(input, dir.clone())).unwrap();
    assert_eq!(summary.error_cnt, 0);
    assert!(summary.conflict_cnt > 0, "two rules reducing the same lookahead must conflict");
}

#[test]
fn fallback_token_is_accepted_without_an_unknown_symbol_diagnostic() {
    let dir = scratch_dir("fallback");
    let text = "\
%fallback ID NUM STR.
start ::= ID.
start ::= NUM.
start ::= STR.
";
    let input = write_grammar(&dir, "fb.y", text);

    let summary = pipeline::run(&cli(input, dir.clone())).unwrap();
    assert_eq!(summary.error_cnt, 0, "NUM and STR must each be mentioned by a rule to avoid the unknown-fallback-symbol diagnostic");
}

#[test]
fn default_action_compression_can_be_toggled_and_both_runs_succeed() {
    let dir = scratch_dir("compress");
    let text = "\
start ::= expr.
expr ::= expr PLUS NUM.
expr ::= expr MINUS NUM.
expr ::= expr TIMES NUM.
expr ::= NUM.
";
    let input = write_grammar(&dir, "compress.y", text);

    let mut compressed_cli = cli(input.clone(), dir.join("compressed"));
    let compressed = pipeline::run(&compressed_cli).unwrap();
    assert_eq!(compressed.error_cnt, 0);

    compressed_cli.compress_disabled = true;
    compressed_cli.out_dir = Some(dir.join("uncompressed"));
    let uncompressed = pipeline::run(&compressed_cli).unwrap();
    assert_eq!(uncompressed.error_cnt, 0);

    let compressed_parser = fs::read_to_string(&compressed.parser_path).unwrap();
    let uncompressed_parser = fs::read_to_string(&uncompressed.parser_path).unwrap();
    assert!(compressed_parser.contains("YY_DEFAULT"));
    assert!(uncompressed_parser.contains("YY_DEFAULT"));
}

#[test]
fn quiet_mode_skips_the_report_file() {
    let dir = scratch_dir("quiet");
    let input = write_grammar(&dir, "g.y", "start ::= ID.\n");
    let mut c = cli(input, dir.clone());
    c.quiet = true;

    let summary = pipeline::run(&c).unwrap();
    assert!(summary.report_path.is_none());
    assert!(summary.parser_path.exists());
}

#[test]
fn unreadable_grammar_file_is_a_pipeline_error() {
    let dir = scratch_dir("missing");
    let missing = dir.join("does_not_exist.y");
    let summary = pipeline::run(&cli(missing, dir));
    assert!(summary.is_err());
}
