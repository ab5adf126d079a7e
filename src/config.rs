//! Site configuration.
//!
//! An optional `config.toml` at the content root. Every section and key is
//! optional; missing ones keep their defaults, unknown ones are rejected.
//!
//! ```toml
//! site_title = "Acme Handbook"
//!
//! [outline]
//! level = 2                 # h2 headings are listed under "On this page"
//! scroll_offset = 70        # Fixed header height in pixels
//! label = "On this page"
//!
//! [palette.light]
//! accent = "#0969da"        # Links
//!
//! [palette.dark]
//! background = "#0d1117"
//!
//! [processing]
//! max_processes = 4         # Parse/render workers (omit for one per core)
//! ```
//!
//! Run `simple-docs gen-config` for a fully commented file with every key.

use crate::outline::DEFAULT_SCROLL_OFFSET;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up at the content root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// First breadcrumb, header link and home page title.
    pub site_title: String,
    pub outline: OutlineConfig,
    pub palette: PaletteConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Documentation".to_string(),
            outline: OutlineConfig::default(),
            palette: PaletteConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site_title must not be empty".into(),
            ));
        }
        if !(2..=6).contains(&self.outline.level) {
            return Err(ConfigError::Validation(format!(
                "outline.level must be 2-6 (level 1 is the page title), got {}",
                self.outline.level
            )));
        }
        for (scheme, palette) in [("light", &self.palette.light), ("dark", &self.palette.dark)] {
            for (property, value) in palette.properties() {
                if value.trim().is_empty() || value.contains([';', '{', '}']) {
                    return Err(ConfigError::Validation(format!(
                        "palette.{scheme}: invalid value {value:?} for {property}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// "On this page" settings, shared by the rendered list and the scroll script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    pub level: u8,
    /// Pixels below the viewport top past which a heading counts as read.
    pub scroll_offset: u32,
    pub label: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            level: 2,
            scroll_offset: DEFAULT_SCROLL_OFFSET,
            label: "On this page".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Upper bound on parse/render workers; `None` means one per core.
    pub max_processes: Option<usize>,
}

impl ProcessingConfig {
    /// Worker count: `max_processes` clamped to `1..=cores`.
    pub fn worker_threads(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.max_processes {
            Some(n) => n.clamp(1, cores),
            None => cores,
        }
    }
}

/// Size the global rayon pool from `processing` and return the pool size.
///
/// Must run before any parallel work: once rayon has started its default
/// pool the size can no longer change, and a warning is logged instead.
pub fn init_thread_pool(processing: &ProcessingConfig) -> usize {
    let threads = processing.worker_threads();
    if let Err(err) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        tracing::warn!(%err, threads, "Worker pool already running; max_processes not applied");
    }
    rayon::current_num_threads()
}

/// Light and dark palettes, switched by `prefers-color-scheme`.
///
/// Each scheme is filled from its own defaults, so overriding one dark color
/// keeps the rest of the dark palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PaletteOverrides")]
pub struct PaletteConfig {
    pub light: Palette,
    pub dark: Palette,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            light: Palette::light(),
            dark: Palette::dark(),
        }
    }
}

/// Colors of one scheme. Each field becomes a `--docs-*` custom property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: String,
    pub text: String,
    /// Breadcrumbs, outline entries, captions.
    pub muted: String,
    /// Borders and horizontal rules.
    pub rule: String,
    /// Links.
    pub accent: String,
    /// Hovered links and the active outline entry.
    pub accent_active: String,
    pub code_background: String,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: "#ffffff".into(),
            text: "#1f2328".into(),
            muted: "#656d76".into(),
            rule: "#d0d7de".into(),
            accent: "#0969da".into(),
            accent_active: "#0550ae".into(),
            code_background: "#f6f8fa".into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#0d1117".into(),
            text: "#e6edf3".into(),
            muted: "#8d96a0".into(),
            rule: "#30363d".into(),
            accent: "#4493f8".into(),
            accent_active: "#79c0ff".into(),
            code_background: "#161b22".into(),
        }
    }

    /// `(custom property, value)` pairs read by `static/style.css`.
    pub fn properties(&self) -> [(&'static str, &str); 7] {
        [
            ("--docs-bg", self.background.as_str()),
            ("--docs-text", self.text.as_str()),
            ("--docs-muted", self.muted.as_str()),
            ("--docs-rule", self.rule.as_str()),
            ("--docs-accent", self.accent.as_str()),
            ("--docs-accent-active", self.accent_active.as_str()),
            ("--docs-code-bg", self.code_background.as_str()),
        ]
    }
}

/// The `[palette]` table as written; unset colors stay `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteOverrides {
    light: ColorOverrides,
    dark: ColorOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorOverrides {
    background: Option<String>,
    text: Option<String>,
    muted: Option<String>,
    rule: Option<String>,
    accent: Option<String>,
    accent_active: Option<String>,
    code_background: Option<String>,
}

impl ColorOverrides {
    fn over(self, base: Palette) -> Palette {
        Palette {
            background: self.background.unwrap_or(base.background),
            text: self.text.unwrap_or(base.text),
            muted: self.muted.unwrap_or(base.muted),
            rule: self.rule.unwrap_or(base.rule),
            accent: self.accent.unwrap_or(base.accent),
            accent_active: self.accent_active.unwrap_or(base.accent_active),
            code_background: self.code_background.unwrap_or(base.code_background),
        }
    }
}

impl From<PaletteOverrides> for PaletteConfig {
    fn from(overrides: PaletteOverrides) -> Self {
        Self {
            light: overrides.light.over(Palette::light()),
            dark: overrides.dark.over(Palette::dark()),
        }
    }
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the content root, or the defaults when absent.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    match fs::read_to_string(root.join(CONFIG_FILE)) {
        Ok(text) => parse_config(&text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SiteConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Custom properties prepended to the static stylesheet.
pub fn generate_css(config: &SiteConfig) -> String {
    let mut css = String::from(":root {\n");
    push_properties(&mut css, "    ", &config.palette.light);
    let _ = writeln!(css, "    --header-offset: {}px;", config.outline.scroll_offset);
    css.push_str("}\n\n@media (prefers-color-scheme: dark) {\n    :root {\n");
    push_properties(&mut css, "        ", &config.palette.dark);
    css.push_str("    }\n}\n");
    css
}

fn push_properties(css: &mut String, indent: &str, palette: &Palette) {
    for (property, value) in palette.properties() {
        let _ = writeln!(css, "{indent}{property}: {value};");
    }
}

/// Commented `config.toml` listing every key with its default.
///
/// Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-docs configuration
#
# Place this file at the root of the content directory. Every key is
# optional and shown with its default; unknown keys are an error.

# First breadcrumb, header link and home page title.
site_title = "Documentation"

[outline]
# Heading level listed under "On this page" (2-6).
level = 2
# Height of the fixed header in pixels. A heading counts as read once its
# top scrolls above this line.
scroll_offset = 70
label = "On this page"

# Colors used when the reader prefers a light scheme.
[palette.light]
background = "#ffffff"
text = "#1f2328"
muted = "#656d76"            # Breadcrumbs, outline
rule = "#d0d7de"             # Borders, horizontal rules
accent = "#0969da"           # Links
accent_active = "#0550ae"    # Hovered links, active outline entry
code_background = "#f6f8fa"

# Colors used when the reader prefers a dark scheme.
[palette.dark]
background = "#0d1117"
text = "#e6edf3"
muted = "#8d96a0"
rule = "#30363d"
accent = "#4493f8"
accent_active = "#79c0ff"
code_background = "#161b22"

[processing]
# Parse/render workers. Omit for one per CPU core; larger values are
# clamped to the core count.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.site_title, "Documentation");
        assert_eq!(config.outline.level, 2);
        assert_eq!(config.outline.scroll_offset, 70);
        assert_eq!(config.outline.label, "On this page");
        assert!(config.processing.max_processes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sparse_file_keeps_other_defaults() {
        let config = parse_config(
            r##"
site_title = "Handbook"

[palette.dark]
accent = "#ff8800"
"##,
        )
        .unwrap();
        assert_eq!(config.site_title, "Handbook");
        assert_eq!(config.palette.dark.accent, "#ff8800");
        assert_eq!(config.palette.dark.background, "#0d1117");
        assert_eq!(config.palette.light, Palette::light());
        assert_eq!(config.outline.level, 2);
    }

    #[test]
    fn unknown_palette_color_rejected() {
        assert!(parse_config("[palette.light]\nlink = \"#000\"\n").is_err());
    }

    #[test]
    fn palette_survives_manifest_json() {
        let config = parse_config("[palette.dark]\nmuted = \"#777\"\n").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: SiteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.palette.dark, config.palette.dark);
        assert_eq!(back.palette.dark.muted, "#777");
    }

    #[test]
    fn empty_file_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.site_title, "Documentation");
    }

    #[test]
    fn misspelled_key_rejected() {
        let err = parse_config("[outline]\nlevle = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn outline_level_bounds() {
        assert!(parse_config("[outline]\nlevel = 6\n").is_ok());
        for level in [0, 1, 7] {
            let result = parse_config(&format!("[outline]\nlevel = {level}\n"));
            assert!(matches!(result, Err(ConfigError::Validation(_))), "level {level}");
        }
    }

    #[test]
    fn blank_site_title_rejected() {
        let err = parse_config("site_title = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("site_title"));
    }

    #[test]
    fn palette_value_cannot_break_out_of_declaration() {
        let err = parse_config("[palette.light]\naccent = \"red; } body { display: none\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("palette.light"));
        assert!(parse_config("[palette.dark]\nrule = \"\"\n").is_err());
    }

    #[test]
    fn css_has_both_schemes_and_offset() {
        let mut config = SiteConfig::default();
        config.palette.light.background = "#fafafa".into();
        config.palette.dark.background = "#101010".into();
        config.outline.scroll_offset = 88;

        let css = generate_css(&config);
        let (light, dark) = css.split_once("@media (prefers-color-scheme: dark)").unwrap();
        assert!(light.contains("--docs-bg: #fafafa;"));
        assert!(light.contains("--header-offset: 88px;"));
        assert!(dark.contains("--docs-bg: #101010;"));
        assert_eq!(css.matches("--docs-code-bg").count(), 2);
    }

    #[test]
    fn load_without_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Documentation");
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "site_title = \"Team Wiki\"\n[outline]\nlabel = \"Contents\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Team Wiki");
        assert_eq!(config.outline.label, "Contents");
    }

    #[test]
    fn load_reports_malformed_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "site_title = [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let stock = parse_config(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(stock.site_title, defaults.site_title);
        assert_eq!(stock.outline.scroll_offset, defaults.outline.scroll_offset);
        assert_eq!(stock.outline.label, defaults.outline.label);
        assert_eq!(generate_css(&stock), generate_css(&defaults));
        assert!(stock.processing.max_processes.is_none());
    }

    #[test]
    fn worker_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        let processing = |max| ProcessingConfig { max_processes: max };
        assert_eq!(processing(None).worker_threads(), cores);
        assert_eq!(processing(Some(1)).worker_threads(), 1);
        assert_eq!(processing(Some(0)).worker_threads(), 1);
        assert_eq!(processing(Some(usize::MAX)).worker_threads(), cores);
    }
}
