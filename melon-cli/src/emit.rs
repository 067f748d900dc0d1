//! Driver-template emission (§4.10): copies a template line by line,
//! expanding `%%` marker lines into one of the substitution blocks rendered
//! from the packed tables. Mirrors the distilled spec's "driver skeleton
//! splice" description; the marker syntax itself is the teacher-idiom
//! stand-in for `mlt_parser.c`'s own `%%` sections.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use melon_grammar::Grammar;
use melon_pack::PackedTables;
use thiserror::Error;

use crate::frontend::GrammarSource;

pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/driver.rs.tmpl");

/// I/O failures specific to driver-template emission: reading a
/// user-supplied template and writing the rendered parser back out.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("can't read template file {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't write parser file {path}: {source}")]
    WriteParser {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads the driver template: a user-supplied file if `path` is given,
/// otherwise the built-in default.
pub fn load_template(path: Option<&Path>) -> Result<String, EmitError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| EmitError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// Writes the rendered parser text to `path`.
pub fn write_parser(path: &Path, text: &str) -> Result<(), EmitError> {
    fs::write(path, text).map_err(|source| EmitError::WriteParser {
        path: path.to_path_buf(),
        source,
    })
}

pub struct EmitContext<'a> {
    pub grammar: &'a Grammar,
    pub source: &'a GrammarSource,
    pub packed: &'a PackedTables,
    pub num_states: u32,
}

/// Expands `template` against `ctx`, returning the generated driver text.
pub fn emit(template: &str, ctx: &EmitContext) -> String {
    let mut out = String::new();
    for line in template.lines() {
        match line.trim_start().strip_prefix("%%") {
            Some(marker) => {
                let marker = marker.trim();
                match render_block(marker, ctx) {
                    Some(block) => {
                        out.push_str(&block);
                        if !block.ends_with('\n') {
                            out.push('\n');
                        }
                    }
                    None => {
                        log::warn!("unrecognized template marker \"%%{marker}\", copying line through verbatim");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

fn render_block(marker: &str, ctx: &EmitContext) -> Option<String> {
    match marker {
        "table_sizes" => Some(format!(
            "const YY_NSTATE: u32 = {};\nconst YY_NRULE: u32 = {};",
            ctx.num_states,
            ctx.grammar.rules.len()
        )),
        "token_defines" => Some(render_token_defines(ctx)),
        "rule_info" => Some(render_rule_info(ctx)),
        "action_tables" => Some(render_action_tables(ctx)),
        "reduce_actions" => Some(render_reduce_actions(ctx)),
        "include_code" => Some(render_include_code(ctx)),
        _ => None,
    }
}

fn render_token_defines(ctx: &EmitContext) -> String {
    let prefix = ctx.source.token_prefix.as_deref().unwrap_or("");
    let mut out = String::new();
    for sym in ctx.grammar.symbols.iter() {
        let attrs = ctx.grammar.symbols.get(sym);
        if attrs.kind == melon_grammar::SymbolKind::Terminal && sym != ctx.grammar.symbols.end_of_input() {
            writeln!(out, "pub const {prefix}{}: u32 = {};", attrs.name, sym.index()).unwrap();
        }
    }
    out
}

fn render_rule_info(ctx: &EmitContext) -> String {
    let lhs: Vec<String> = ctx
        .grammar
        .rules
        .iter()
        .map(|r| r.lhs.index().to_string())
        .collect();
    let nrhs: Vec<String> = ctx.grammar.rules.iter().map(|r| r.len().to_string()).collect();
    format!(
        "static YY_RULE_LHS: &[u32] = &[{}];\nstatic YY_RULE_NRHS: &[u32] = &[{}];",
        lhs.join(", "),
        nrhs.join(", ")
    )
}

fn render_action_tables(ctx: &EmitContext) -> String {
    let mut out = String::new();
    writeln!(out, "static YY_ACTION: &[i64] = &[{}];", join(&ctx.packed.action)).unwrap();
    writeln!(out, "static YY_LOOKAHEAD: &[i64] = &[{}];", join(&ctx.packed.lookahead)).unwrap();

    let shift_ofst: Vec<String> = ctx
        .packed
        .per_state
        .iter()
        .map(|s| s.tkn_off.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string()))
        .collect();
    let reduce_ofst: Vec<String> = ctx
        .packed
        .per_state
        .iter()
        .map(|s| s.ntkn_off.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string()))
        .collect();
    let default: Vec<String> = ctx
        .packed
        .per_state
        .iter()
        .map(|s| {
            s.dflt_act
                .map(|v| v.to_string())
                .unwrap_or_else(|| (ctx.num_states + ctx.grammar.rules.len() as u32).to_string())
        })
        .collect();
    writeln!(out, "static YY_SHIFT_OFST: &[i64] = &[{}];", shift_ofst.join(", ")).unwrap();
    writeln!(out, "static YY_REDUCE_OFST: &[i64] = &[{}];", reduce_ofst.join(", ")).unwrap();
    writeln!(out, "static YY_DEFAULT: &[u32] = &[{}];", default.join(", ")).unwrap();
    out
}

fn join(values: &[i64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn render_reduce_actions(ctx: &EmitContext) -> String {
    let mut out = String::new();
    writeln!(out, "fn yy_reduce(rule: u32, yygoto: &mut dyn FnMut(u32)) {{").unwrap();
    writeln!(out, "    match rule {{").unwrap();
    for rule in &ctx.grammar.rules {
        if let Some(code) = &rule.code {
            writeln!(out, "        {} => {{ {} }}", rule.index, code.code.trim()).unwrap();
        }
    }
    writeln!(out, "        _ => {{}}").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "    let _ = yygoto;").unwrap();
    writeln!(out, "}}").unwrap();
    out
}

fn render_include_code(ctx: &EmitContext) -> String {
    let mut out = String::new();
    if let Some(include) = &ctx.source.include {
        out.push_str(&include.code);
        out.push('\n');
    }
    if let Some(extra) = &ctx.source.extra_code {
        out.push_str(&extra.code);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_grammar;

    #[test]
    fn load_template_falls_back_to_default_without_a_path() {
        let text = load_template(None).unwrap();
        assert_eq!(text, DEFAULT_TEMPLATE);
    }

    #[test]
    fn load_template_reads_a_user_supplied_file() {
        let path = std::env::temp_dir().join(format!("melon_emit_test_{}_template.tmpl", std::process::id()));
        fs::write(&path, "custom template\n").unwrap();
        let text = load_template(Some(&path)).unwrap();
        assert_eq!(text, "custom template\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_template_reports_a_missing_file() {
        let path = std::env::temp_dir().join(format!("melon_emit_test_{}_missing.tmpl", std::process::id()));
        let _ = fs::remove_file(&path);
        assert!(matches!(load_template(Some(&path)), Err(EmitError::ReadTemplate { .. })));
    }

    #[test]
    fn write_parser_writes_the_rendered_text() {
        let path = std::env::temp_dir().join(format!("melon_emit_test_{}_parser.rs", std::process::id()));
        write_parser(&path, "fn main() {}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn main() {}\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unrecognized_marker_is_copied_through_with_a_warning() {
        let (grammar, _, _) = parse_grammar("t.y", "start ::= ID.").unwrap();
        let automaton = melon_lalr::build_states(&grammar).unwrap();
        let tables = melon_action::build_actions(&grammar, &automaton);
        let compressed = melon_action::compress_default_actions(&grammar, tables.per_state);
        let code_space = melon_pack::CodeSpace::new(automaton.states.len() as u32, grammar.rules.len() as u32);
        let packed = melon_pack::pack_tables(&grammar, &compressed, code_space);
        let source = GrammarSource::default();
        let ctx = EmitContext {
            grammar: &grammar,
            source: &source,
            packed: &packed,
            num_states: automaton.states.len() as u32,
        };
        let rendered = emit("before\n%% bogus_marker\nafter\n", &ctx);
        assert!(rendered.contains("before"));
        assert!(rendered.contains("%% bogus_marker"));
        assert!(rendered.contains("after"));
    }

    #[test]
    fn token_defines_uses_the_declared_prefix() {
        let (grammar, _, _) = parse_grammar("t.y", "start ::= ID.").unwrap();
        let automaton = melon_lalr::build_states(&grammar).unwrap();
        let tables = melon_action::build_actions(&grammar, &automaton);
        let compressed = melon_action::compress_default_actions(&grammar, tables.per_state);
        let code_space = melon_pack::CodeSpace::new(automaton.states.len() as u32, grammar.rules.len() as u32);
        let packed = melon_pack::pack_tables(&grammar, &compressed, code_space);
        let mut source = GrammarSource::default();
        source.token_prefix = Some("TK_".to_string());
        let ctx = EmitContext {
            grammar: &grammar,
            source: &source,
            packed: &packed,
            num_states: automaton.states.len() as u32,
        };
        let block = render_token_defines(&ctx);
        assert!(block.contains("TK_ID"));
    }
}
