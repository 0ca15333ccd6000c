// src/pipeline/template.rs

//! Page rendering with `tera`.
//!
//! Views under the template root are loaded under names relative to that
//! root, so pages can `{% extends "layout.njk" %}` or
//! `{% include "partials/nav.njk" %}`. Every page is then rendered on its
//! own; in production the result is whitespace-collapsed.

use tera::{Context, Template, Tera};
use tracing::debug;

use crate::errors::Result;
use crate::pipeline::sources::{collect_sources, relative_to, SourceFile};
use crate::pipeline::{AssetTask, TaskContext, TaskKind, TaskReport};
use crate::types::AssetClass;

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTask;

impl AssetTask for TemplateTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Templates
    }

    fn run(&self, ctx: &TaskContext) -> Result<TaskReport> {
        let cfg = &ctx.config;
        let pages = collect_sources(ctx.fs.as_ref(), cfg.root(), &cfg.table().source.html)?;

        let mut report = TaskReport::new(self.kind());
        let views = load_views(ctx, &mut report)?;
        let out_dir = cfg.output_dir(AssetClass::Html);
        let minify = cfg.stages().minify_html;

        for page in pages {
            let written = report.isolate(&page.path, || {
                let html = render_page(ctx, &views, &page)?;
                let bytes = if minify {
                    collapse_whitespace(&html)
                } else {
                    html.into_bytes()
                };
                let dest = out_dir.join(&page.relative);
                ctx.write(&dest, &bytes)?;
                Ok(dest)
            });
            if let Some(dest) = written {
                report.written.push(dest);
            }
        }

        Ok(report)
    }
}

/// Load every view template.
///
/// A view that does not parse is recorded as a failure and left out. If the
/// remaining views cannot be linked (e.g. a parent is missing), pages are
/// rendered without any views so standalone pages still come out.
fn load_views(ctx: &TaskContext, report: &mut TaskReport) -> Result<Tera> {
    let cfg = &ctx.config;
    let templates_dir = cfg.templates_dir();
    let mut tera = Tera::default();

    if !ctx.fs.is_dir(&templates_dir) {
        debug!(dir = ?templates_dir, "no template root; rendering pages standalone");
        return Ok(tera);
    }

    let views = collect_sources(
        ctx.fs.as_ref(),
        cfg.root(),
        std::slice::from_ref(&cfg.table().views.source),
    )?;

    let mut parsed = Vec::with_capacity(views.len());
    for view in views {
        let loaded = report.isolate(&view.path, || {
            let name = relative_to(&templates_dir, &view.path).unwrap_or(view.relative.clone());
            let source = ctx.fs.read_to_string(&view.path)?;
            Template::new(&name, None, &source)?;
            Ok((name, source))
        });
        if let Some(entry) = loaded {
            parsed.push(entry);
        }
    }

    debug!(count = parsed.len(), "loaded view templates");

    if let Err(err) = tera.add_raw_templates(parsed) {
        report.isolate(&templates_dir, || -> Result<()> { Err(err.into()) });
        return Ok(Tera::default());
    }

    Ok(tera)
}

fn render_page(ctx: &TaskContext, views: &Tera, page: &SourceFile) -> Result<String> {
    let source = ctx.fs.read_to_string(&page.path)?;
    let mut tera = views.clone();
    tera.add_raw_template(&page.relative, &source)?;
    Ok(tera.render(&page.relative, &Context::new())?)
}

/// Collapse insignificant whitespace only: tags, closing tags and comments
/// stay as written.
pub fn collapse_whitespace(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = true;
    minify_html::minify(html.as_bytes(), &cfg)
}
