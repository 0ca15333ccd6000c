#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sitepipe::config::{BuildConfig, PathTable};
use sitepipe::fs::RealFileSystem;
use sitepipe::pipeline::TaskContext;
use sitepipe::types::Mode;
use tempfile::TempDir;

/// A project tree on disk, removed when dropped.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        std::fs::read(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_string(&self, rel: &str) -> String {
        String::from_utf8(self.read(rel)).expect("output is not UTF-8")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Every file under `rel`, as sorted paths relative to the project root.
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![self.path(rel)];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(self.root()).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        out.sort();
        out
    }

    pub fn config(&self, mode: Mode) -> BuildConfig {
        BuildConfig::new(self.root(), mode, PathTable::default())
    }

    pub fn context(&self, mode: Mode) -> TaskContext {
        TaskContext::new(Arc::new(self.config(mode)), Arc::new(RealFileSystem))
    }
}

/// Builder for on-disk project fixtures.
#[derive(Default)]
pub struct ProjectBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, rel: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files.push((rel.to_string(), contents.as_ref().to_vec()));
        self
    }

    /// A small site touching every asset class.
    pub fn standard_site(self) -> Self {
        self.file(
            "app/views/layout.njk",
            "<!DOCTYPE html>\n<html>\n  <head>\n    <title>{% block title %}Site{% endblock %}</title>\n  </head>\n  <body>\n    {% block content %}{% endblock %}\n  </body>\n</html>\n",
        )
        .file("app/views/partials/nav.njk", "<nav>\n  <a href=\"/\">Home</a>\n</nav>\n")
        .file(
            "app/index.html",
            "{% extends \"layout.njk\" %}\n{% block content %}\n    {% include \"partials/nav.njk\" %}\n    <h1>Welcome</h1>\n{% endblock %}\n",
        )
        .file(
            "app/scss/main.scss",
            "$accent: #336699;\n\nbody {\n  margin: 0;\n\n  h1 {\n    color: $accent;\n  }\n}\n",
        )
        .file(
            "app/js/a.js",
            "// first\nfunction greet(name) {\n    return 'hello ' + name;\n}\n",
        )
        .file(
            "app/js/b.js",
            "// second\nvar message = greet('world');\nconsole.log(message);\n",
        )
        .file("app/images/logo.png", sample_png())
        .file("app/images/photos/shot.jpg", sample_jpeg())
        .file("app/images/spinner.gif", sample_gif())
    }

    pub fn build(self) -> Project {
        let dir = tempfile::tempdir().expect("creating temp project dir");
        let project = Project { dir };
        for (rel, contents) in self.files {
            project.write(&rel, contents);
        }
        project
    }
}

/// A small, losslessly compressible PNG.
pub fn sample_png() -> Vec<u8> {
    let mut img = RgbImage::new(24, 24);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgb([(x * 10) as u8, (y * 10) as u8, 200]);
    }
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encoding sample PNG");
    buf
}

/// JPEG header with a comment and an EXIF segment in front of the scan.
pub fn sample_jpeg() -> Vec<u8> {
    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut seg = vec![0xFF, marker];
        seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        seg.extend_from_slice(payload);
        seg
    }

    let mut out = vec![0xFF, 0xD8];
    out.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
    out.extend(segment(0xE1, b"Exif\0\0camera model and GPS"));
    out.extend(segment(0xFE, b"exported by an editor"));
    out.extend(segment(0xDB, &[1u8; 65]));
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x55, 0xAA, 0xFF, 0xD9]);
    out
}

pub fn sample_gif() -> Vec<u8> {
    b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;".to_vec()
}
