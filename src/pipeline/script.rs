// src/pipeline/script.rs

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use tracing::debug;

use crate::errors::{Result, SitepipeError};
use crate::pipeline::sources::collect_sources;
use crate::pipeline::{AssetTask, TaskContext, TaskKind, TaskReport};
use crate::types::AssetClass;

/// Separator placed between concatenated files.
pub const BUNDLE_SEPARATOR: &str = "\n";

/// Bundles every matched script into a single file.
///
/// In production each file is minified on its own *before* concatenation,
/// so the bundle is the per-file minified outputs joined in enumeration
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTask;

impl AssetTask for ScriptTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Scripts
    }

    fn run(&self, ctx: &TaskContext) -> Result<TaskReport> {
        let cfg = &ctx.config;
        let stages = cfg.stages();
        let files = collect_sources(ctx.fs.as_ref(), cfg.root(), &cfg.table().source.scripts)?;

        let mut report = TaskReport::new(self.kind());
        let mut parts = Vec::with_capacity(files.len());

        for file in &files {
            let part = report.isolate(&file.path, || {
                let source = ctx.fs.read_to_string(&file.path).map_err(|e| {
                    SitepipeError::Script(format!("{}: {e:#}", file.path.display()))
                })?;
                if stages.minify_scripts {
                    minify(&source).map_err(|e| {
                        SitepipeError::Script(format!("{}: {e}", file.path.display()))
                    })
                } else {
                    Ok(source)
                }
            });
            if let Some(part) = part {
                parts.push(part);
            }
        }

        if parts.is_empty() {
            debug!(matched = files.len(), "no scripts to bundle");
            return Ok(report);
        }

        let dest = cfg
            .output_dir(AssetClass::Scripts)
            .join(&stages.script_bundle_name);
        let bundle = concat(&parts);
        let written = report.isolate(&dest, || {
            ctx.write(&dest, bundle.as_bytes())?;
            Ok(dest.clone())
        });
        if let Some(dest) = written {
            report.written.push(dest);
        }

        Ok(report)
    }
}

/// Minify a single classic (non-module) script.
///
/// The source is parsed and printed back without whitespace or comments,
/// so statement boundaries that came from line breaks become explicit `;`.
/// A file that does not parse is an error rather than passed through.
pub fn minify(source: &str) -> std::result::Result<String, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(err) = parsed.errors.first() {
        return Err(format!("syntax error: {err}"));
    }
    if parsed.panicked {
        return Err("syntax error".to_string());
    }

    let printed = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .build(&parsed.program);
    Ok(printed.code)
}

/// Join bundle parts in order.
pub fn concat<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(BUNDLE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{BuildConfig, PathTable};
    use crate::fs::mock::MockFileSystem;
    use crate::types::Mode;

    const A: &str = "function add(first, second) {\n    return first + second;\n}\n";
    const B: &str = "var total = add(1,   2);\n";

    fn site() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/site/app/js/b.js", B);
        fs.add_file("/site/app/js/a.js", A);
        fs
    }

    fn run(fs: &MockFileSystem, mode: Mode) -> TaskReport {
        let cfg = BuildConfig::new("/site", mode, PathTable::default());
        let ctx = TaskContext::new(Arc::new(cfg), Arc::new(fs.clone()));
        ScriptTask.run(&ctx).unwrap()
    }

    #[test]
    fn development_concatenates_in_order() {
        let fs = site();
        run(&fs, Mode::Development);

        let out = String::from_utf8(fs.contents("/site/build/js/index.js").unwrap()).unwrap();
        assert_eq!(out, format!("{A}\n{B}"));
    }

    #[test]
    fn production_minifies_each_file_before_concat() {
        let fs = site();
        run(&fs, Mode::Development);
        run(&fs, Mode::Production);

        let dev = fs.contents("/site/build/js/index.js").unwrap();
        let prod = String::from_utf8(fs.contents("/site/public/js/index.js").unwrap()).unwrap();

        assert!(prod.len() <= dev.len());
        assert_eq!(prod, format!("{}\n{}", minify(A).unwrap(), minify(B).unwrap()));
    }

    fn assert_parses(code: &str) {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, code, SourceType::cjs()).parse();
        assert!(parsed.errors.is_empty(), "minified output does not parse: {code:?}");
    }

    #[test]
    fn line_breaks_that_end_statements_survive() {
        let vars = minify("var a = 1\nvar b = 2\n").unwrap();
        assert_parses(&vars);
        assert!(vars.contains("var a=1;"), "{vars}");

        let early_return = minify("function f() {\n  return\n  42\n}\n").unwrap();
        assert_parses(&early_return);
        assert!(!early_return.contains("return 42"), "{early_return}");

        let prefix = minify("a = b\n++c\n").unwrap();
        assert_parses(&prefix);
        assert!(prefix.contains("a=b;"), "{prefix}");
        assert!(!prefix.contains("b++"), "{prefix}");

        let template = minify("var t = `x${1}`\nvar r = t\n").unwrap();
        assert_parses(&template);
        assert!(!template.contains("`var"), "{template}");
    }

    #[test]
    fn syntax_error_skips_only_that_file() {
        let fs = site();
        fs.add_file("/site/app/js/c.js", "function (\n");

        let report = run(&fs, Mode::Production);

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("c.js"));
        assert!(report.failed[0].message.starts_with("Script error:"));
        let out = String::from_utf8(fs.contents("/site/public/js/index.js").unwrap()).unwrap();
        assert_eq!(out, format!("{}\n{}", minify(A).unwrap(), minify(B).unwrap()));
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let fs = site();
        fs.add_file("/site/app/js/c.js", vec![0xff, 0xfe, 0x00]);

        let report = run(&fs, Mode::Development);

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("c.js"));
        assert!(report.failed[0].message.starts_with("Script error:"));
        let out = String::from_utf8(fs.contents("/site/build/js/index.js").unwrap()).unwrap();
        assert_eq!(out, format!("{A}\n{B}"));
    }

    #[test]
    fn nothing_matched_writes_nothing() {
        let fs = MockFileSystem::new();
        fs.add_dir("/site/app/js");

        let report = run(&fs, Mode::Development);

        assert!(report.written.is_empty());
        assert!(fs.contents("/site/build/js/index.js").is_none());
    }
}
