// src/pipeline/image.rs

//! Image optimization.
//!
//! Development copies images verbatim. Production applies lossless
//! optimizations per format and keeps the result only when it is not larger
//! than the input:
//!
//! - PNG: recompressed with `oxipng` at the configured preset.
//! - JPEG: metadata segments (EXIF/XMP, comments, vendor APPn) are dropped;
//!   the entropy-coded data is copied untouched.
//! - GIF and anything else: passed through.

use std::path::Path;

use image::ImageFormat;
use img_parts::jpeg::{markers, Jpeg};
use img_parts::Bytes;
use tracing::debug;

use crate::config::ImageOptions;
use crate::errors::{Result, SitepipeError};
use crate::pipeline::sources::collect_sources;
use crate::pipeline::{AssetTask, TaskContext, TaskKind, TaskReport};
use crate::types::AssetClass;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTask;

impl AssetTask for ImageTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Images
    }

    fn run(&self, ctx: &TaskContext) -> Result<TaskReport> {
        let cfg = &ctx.config;
        let stages = cfg.stages();
        let files = collect_sources(ctx.fs.as_ref(), cfg.root(), &cfg.table().source.images)?;

        let mut report = TaskReport::new(self.kind());
        let out_dir = cfg.output_dir(AssetClass::Images);

        for file in files {
            let written = report.isolate(&file.path, || {
                let original = ctx.fs.read(&file.path)?;
                let bytes = if stages.optimize_images {
                    optimize(&original, &file.path, &stages.image)?
                } else {
                    original
                };
                let dest = out_dir.join(&file.relative);
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

/// Sniff the format from content, falling back to the file extension.
pub fn detect_format(bytes: &[u8], path: &Path) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
}

/// Optimize one image. The result is never larger than `original`.
pub fn optimize(original: &[u8], path: &Path, options: &ImageOptions) -> Result<Vec<u8>> {
    let optimized = match detect_format(original, path) {
        Some(ImageFormat::Png) => {
            let opts = oxipng::Options::from_preset(options.optimization_level);
            oxipng::optimize_from_memory(original, &opts)
                .map_err(|e| SitepipeError::Image(format!("{}: {}", path.display(), e)))?
        }
        Some(ImageFormat::Jpeg) => strip_jpeg_metadata(original)
            .map_err(|e| SitepipeError::Image(format!("{}: {}", path.display(), e)))?,
        other => {
            debug!(file = ?path, format = ?other, "no optimizer for format; passing through");
            return Ok(original.to_vec());
        }
    };

    if optimized.len() <= original.len() {
        Ok(optimized)
    } else {
        Ok(original.to_vec())
    }
}

/// Drop JPEG header segments that do not affect decoding.
///
/// Kept: JFIF (APP0), ICC profiles (APP2 `ICC_PROFILE`), Adobe (APP14, it
/// carries the colour transform), and every non-APP marker. Scan data is
/// re-emitted untouched.
pub fn strip_jpeg_metadata(data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(data)).map_err(|e| e.to_string())?;
    jpeg.segments_mut()
        .retain(|segment| !is_droppable(segment.marker(), segment.contents()));
    Ok(jpeg.encoder().bytes().to_vec())
}

fn is_droppable(marker: u8, payload: &[u8]) -> bool {
    match marker {
        markers::COM => true,
        markers::APP2 => !payload.starts_with(b"ICC_PROFILE\0"),
        markers::APP14 => false,
        markers::APP1..=markers::APP15 => true,
        _ => false,
    }
}
