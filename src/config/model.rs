// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::types::{AssetClass, Mode};

/// Path table as read from an optional `Sitepipe.toml`.
///
/// Every section is optional; missing sections and keys fall back to the
/// stock front-end layout:
///
/// ```toml
/// [source]
/// html = ["app/*.html"]
/// scss = ["app/scss/main.scss"]
/// scripts = ["app/js/**/*.js"]
/// images = ["app/images/**/*.{jpg,png,gif}"]
///
/// [views]
/// templates = "app/views/"
/// source = "app/views/**/*.njk"
///
/// [production]
/// html = "public/"
///
/// [development]
/// html = "build/"
///
/// [serve]
/// base_dir = "./build/"
/// port = 8000
/// ```
///
/// `production` and `development` share the [`OutputGroup`] type, so both
/// always carry the same four asset classes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PathTable {
    #[serde(default)]
    pub source: SourceGroup,

    #[serde(default)]
    pub views: ViewsGroup,

    #[serde(default = "OutputGroup::production", deserialize_with = "production_group")]
    pub production: OutputGroup,

    #[serde(default = "OutputGroup::development", deserialize_with = "development_group")]
    pub development: OutputGroup,

    #[serde(default)]
    pub serve: ServeGroup,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            source: SourceGroup::default(),
            views: ViewsGroup::default(),
            production: OutputGroup::production(),
            development: OutputGroup::development(),
            serve: ServeGroup::default(),
        }
    }
}

impl PathTable {
    /// The output group for `mode` (the `paths[mode]` alias).
    pub fn output(&self, mode: Mode) -> &OutputGroup {
        match mode {
            Mode::Production => &self.production,
            Mode::Development => &self.development,
        }
    }
}

/// `[source]`: input glob patterns per asset class.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceGroup {
    #[serde(default = "default_source_html")]
    pub html: Vec<String>,
    #[serde(default = "default_source_scss")]
    pub scss: Vec<String>,
    #[serde(default = "default_source_scripts")]
    pub scripts: Vec<String>,
    #[serde(default = "default_source_images")]
    pub images: Vec<String>,
}

impl SourceGroup {
    pub fn patterns(&self, class: AssetClass) -> &[String] {
        match class {
            AssetClass::Html => &self.html,
            AssetClass::Styles => &self.scss,
            AssetClass::Scripts => &self.scripts,
            AssetClass::Images => &self.images,
        }
    }
}

impl Default for SourceGroup {
    fn default() -> Self {
        Self {
            html: default_source_html(),
            scss: default_source_scss(),
            scripts: default_source_scripts(),
            images: default_source_images(),
        }
    }
}

fn default_source_html() -> Vec<String> {
    vec!["app/*.html".to_string()]
}

fn default_source_scss() -> Vec<String> {
    vec!["app/scss/main.scss".to_string()]
}

fn default_source_scripts() -> Vec<String> {
    vec!["app/js/**/*.js".to_string()]
}

fn default_source_images() -> Vec<String> {
    vec!["app/images/**/*.{jpg,png,gif}".to_string()]
}

/// `[views]`: template root and the glob of templates that pages may
/// `extends` / `include`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ViewsGroup {
    #[serde(default = "default_views_templates")]
    pub templates: String,
    #[serde(default = "default_views_source")]
    pub source: String,
}

impl Default for ViewsGroup {
    fn default() -> Self {
        Self {
            templates: default_views_templates(),
            source: default_views_source(),
        }
    }
}

fn default_views_templates() -> String {
    "app/views/".to_string()
}

fn default_views_source() -> String {
    "app/views/**/*.njk".to_string()
}

/// Output directory per asset class for one mode.
///
/// Keys missing from a `[production]` / `[development]` section keep that
/// mode's stock directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGroup {
    pub html: String,
    pub scss: String,
    pub scripts: String,
    pub images: String,
}

impl OutputGroup {
    pub fn production() -> Self {
        Self::rooted("public")
    }

    pub fn development() -> Self {
        Self::rooted("build")
    }

    fn rooted(root: &str) -> Self {
        Self {
            html: format!("{root}/"),
            scss: format!("{root}/css"),
            scripts: format!("{root}/js"),
            images: format!("{root}/images"),
        }
    }

    pub fn dir(&self, class: AssetClass) -> &str {
        match class {
            AssetClass::Html => &self.html,
            AssetClass::Styles => &self.scss,
            AssetClass::Scripts => &self.scripts,
            AssetClass::Images => &self.images,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialOutputGroup {
    html: Option<String>,
    scss: Option<String>,
    scripts: Option<String>,
    images: Option<String>,
}

impl PartialOutputGroup {
    fn over(self, base: OutputGroup) -> OutputGroup {
        OutputGroup {
            html: self.html.unwrap_or(base.html),
            scss: self.scss.unwrap_or(base.scss),
            scripts: self.scripts.unwrap_or(base.scripts),
            images: self.images.unwrap_or(base.images),
        }
    }
}

fn production_group<'de, D: Deserializer<'de>>(d: D) -> Result<OutputGroup, D::Error> {
    Ok(PartialOutputGroup::deserialize(d)?.over(OutputGroup::production()))
}

fn development_group<'de, D: Deserializer<'de>>(d: D) -> Result<OutputGroup, D::Error> {
    Ok(PartialOutputGroup::deserialize(d)?.over(OutputGroup::development()))
}

/// `[serve]`: live-reload server settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServeGroup {
    #[serde(default = "default_serve_base_dir")]
    pub base_dir: String,
    /// Output globs (relative to the project root) whose changes are pushed
    /// to connected browsers.
    #[serde(default = "default_serve_path_list")]
    pub path_list: Vec<String>,
    #[serde(default = "default_serve_port")]
    pub port: u16,
}

impl Default for ServeGroup {
    fn default() -> Self {
        Self {
            base_dir: default_serve_base_dir(),
            path_list: default_serve_path_list(),
            port: default_serve_port(),
        }
    }
}

fn default_serve_base_dir() -> String {
    "./build/".to_string()
}

fn default_serve_path_list() -> Vec<String> {
    vec![
        "build/**/*.html".to_string(),
        "build/css/**/*.css".to_string(),
        "build/images/**/*".to_string(),
        "build/js/**/*.js".to_string(),
    ]
}

fn default_serve_port() -> u16 {
    8000
}

/// Image optimization knobs applied in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    /// GIF interlacing. Accepted for parity with the stock settings; GIFs are
    /// currently passed through.
    pub interlaced: bool,
    /// Progressive JPEG. Accepted for parity; JPEGs are optimized by lossless
    /// metadata stripping only.
    pub progressive: bool,
    /// PNG optimization preset (0..=6).
    pub optimization_level: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            interlaced: true,
            progressive: true,
            optimization_level: 2,
        }
    }
}

/// Per-stage toggles. Each task consults these instead of branching on the
/// mode itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOptions {
    pub minify_html: bool,
    pub compress_styles: bool,
    pub minify_scripts: bool,
    pub optimize_images: bool,
    pub image: ImageOptions,
    pub script_bundle_name: String,
}

impl StageOptions {
    pub fn for_mode(mode: Mode) -> Self {
        let production = mode.is_production();
        Self {
            minify_html: production,
            compress_styles: production,
            minify_scripts: production,
            optimize_images: production,
            image: ImageOptions::default(),
            script_bundle_name: "index.js".to_string(),
        }
    }
}

/// Immutable, fully resolved configuration handed to every task.
///
/// Built once at startup from the mode and the path table; nothing reads
/// ambient state after that.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    root: PathBuf,
    mode: Mode,
    table: PathTable,
    stages: StageOptions,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>, mode: Mode, table: PathTable) -> Self {
        Self {
            root: root.into(),
            mode,
            stages: StageOptions::for_mode(mode),
            table,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_production(&self) -> bool {
        self.mode.is_production()
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }

    pub fn stages(&self) -> &StageOptions {
        &self.stages
    }

    /// Active output group, selected by mode.
    pub fn output(&self) -> &OutputGroup {
        self.table.output(self.mode)
    }

    /// Absolute output directory for `class` in the active mode.
    pub fn output_dir(&self, class: AssetClass) -> PathBuf {
        self.resolve(self.output().dir(class))
    }

    /// Absolute template root directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.resolve(&self.table.views.templates)
    }

    /// Absolute directory served by the live-reload server.
    pub fn serve_dir(&self) -> PathBuf {
        self.resolve(&self.table.serve.base_dir)
    }

    /// Resolve a table entry against the project root.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        let trimmed = rel.trim_start_matches("./");
        let trimmed = trimmed.trim_end_matches('/');
        if trimmed.is_empty() {
            self.root.clone()
        } else {
            self.root.join(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_alias_follows_mode() {
        let table = PathTable::default();
        assert_eq!(table.output(Mode::Production).html, "public/");
        assert_eq!(table.output(Mode::Development).scss, "build/css");
    }

    #[test]
    fn stages_only_enabled_in_production() {
        let dev = StageOptions::for_mode(Mode::Development);
        assert!(!dev.minify_html && !dev.compress_styles);
        assert!(!dev.minify_scripts && !dev.optimize_images);

        let prod = StageOptions::for_mode(Mode::Production);
        assert!(prod.minify_html && prod.compress_styles);
        assert!(prod.minify_scripts && prod.optimize_images);
        assert_eq!(prod.script_bundle_name, "index.js");
    }

    #[test]
    fn resolve_strips_dot_slash_and_trailing_slash() {
        let cfg = BuildConfig::new("/proj", Mode::Development, PathTable::default());
        assert_eq!(cfg.serve_dir(), PathBuf::from("/proj/build"));
        assert_eq!(cfg.output_dir(AssetClass::Html), PathBuf::from("/proj/build"));
        assert_eq!(
            cfg.output_dir(AssetClass::Images),
            PathBuf::from("/proj/build/images")
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let table: PathTable = toml::from_str(
            r#"
[development]
html = "out/"
scss = "out/css"
scripts = "out/js"
images = "out/img"

[serve]
port = 9000
"#,
        )
        .unwrap();

        assert_eq!(table.development.images, "out/img");
        assert_eq!(table.production, OutputGroup::production());
        assert_eq!(table.source, SourceGroup::default());
        assert_eq!(table.serve.port, 9000);
        assert_eq!(table.serve.base_dir, "./build/");
    }

    #[test]
    fn partial_output_group_keeps_mode_defaults() {
        let table: PathTable = toml::from_str(
            r#"
[production]
scripts = "dist/js"

[development]
html = "out/"
"#,
        )
        .unwrap();

        assert_eq!(table.development.html, "out/");
        assert_eq!(table.development.scss, "build/css");
        assert_eq!(table.development.images, "build/images");
        assert_eq!(table.production.scripts, "dist/js");
        assert_eq!(table.production.html, "public/");
    }
}
