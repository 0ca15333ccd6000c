// src/pipeline/style.rs

use std::path::Path;

use grass::{Options, OutputStyle};

use crate::errors::{Result, SitepipeError};
use crate::pipeline::sources::collect_sources;
use crate::pipeline::{AssetTask, TaskContext, TaskKind, TaskReport};
use crate::types::AssetClass;

/// Compiles the style-sheet entry point(s) with `grass`.
///
/// Each entry `<name>.scss` becomes `<name>.css` in the styles output
/// directory; imports resolve relative to the entry's directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleTask;

impl AssetTask for StyleTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Styles
    }

    fn run(&self, ctx: &TaskContext) -> Result<TaskReport> {
        let cfg = &ctx.config;
        let entries = collect_sources(ctx.fs.as_ref(), cfg.root(), &cfg.table().source.scss)?;

        let mut report = TaskReport::new(self.kind());
        let out_dir = cfg.output_dir(AssetClass::Styles);
        let style = if cfg.stages().compress_styles {
            OutputStyle::Compressed
        } else {
            OutputStyle::Expanded
        };

        for entry in entries {
            let written = report.isolate(&entry.path, || {
                let source = ctx.fs.read_to_string(&entry.path)?;
                let css = compile(&source, &entry.path, style)?;
                let dest = out_dir.join(Path::new(&entry.relative).with_extension("css"));
                ctx.write(&dest, css.as_bytes())?;
                Ok(dest)
            });
            if let Some(dest) = written {
                report.written.push(dest);
            }
        }

        Ok(report)
    }
}

/// Compile one style sheet. `path` is used for import resolution and error
/// messages.
pub fn compile(source: &str, path: &Path, style: OutputStyle) -> Result<String> {
    let mut options = Options::default().style(style);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }

    grass::from_string(source.to_string(), &options)
        .map_err(|e| SitepipeError::Style(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::config::{BuildConfig, PathTable};
    use crate::fs::mock::MockFileSystem;
    use crate::types::Mode;

    const MAIN: &str = "$brand: #ff0000;\n\nbody {\n  .title {\n    color: $brand;\n  }\n}\n";

    fn run(fs: &MockFileSystem, mode: Mode) -> TaskReport {
        let cfg = BuildConfig::new("/site", mode, PathTable::default());
        let ctx = TaskContext::new(Arc::new(cfg), Arc::new(fs.clone()));
        StyleTask.run(&ctx).unwrap()
    }

    #[test]
    fn development_output_is_expanded() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/app/scss/main.scss", MAIN);

        let report = run(&fs, Mode::Development);

        assert_eq!(report.written, vec![PathBuf::from("/site/build/css/main.css")]);
        let css = String::from_utf8(fs.contents("/site/build/css/main.css").unwrap()).unwrap();
        assert!(css.contains("body .title {\n  color: #ff0000;\n}"));
    }

    #[test]
    fn production_output_is_compressed() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/app/scss/main.scss", MAIN);

        run(&fs, Mode::Production);

        let css = String::from_utf8(fs.contents("/site/public/css/main.css").unwrap()).unwrap();
        assert!(css.starts_with("body .title{color:"));
        assert!(!css.contains("\n  "));
    }

    #[test]
    fn syntax_error_is_isolated() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/app/scss/main.scss", "body { color: ; ");

        let report = run(&fs, Mode::Development);

        assert!(report.written.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.contains("main.scss"));
    }
}
