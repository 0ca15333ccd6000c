use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

/// Build profile selected once at startup.
///
/// Drives which output group of the path table is active and which optional
/// pipeline stages (minification, compression, image optimization) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Resolve the `--mode` flag.
    ///
    /// Only the exact string `"production"` selects [`Mode::Production`].
    /// Everything else, including an absent flag, resolves to
    /// [`Mode::Development`]; unrecognized values are logged.
    pub fn resolve(raw: Option<&str>) -> Mode {
        match raw {
            None => Mode::Development,
            Some(s) => match s.parse::<Mode>() {
                Ok(mode) => mode,
                Err(e) => {
                    warn!("{e}; falling back to development");
                    Mode::Development
                }
            },
        }
    }

    pub fn is_production(self) -> bool {
        self == Mode::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            other => Err(format!(
                "unrecognized mode: {other:?} (expected \"development\" or \"production\")"
            )),
        }
    }
}

/// The four asset classes every output group maps to a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Html,
    Styles,
    Scripts,
    Images,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Html,
        AssetClass::Styles,
        AssetClass::Scripts,
        AssetClass::Images,
    ];
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Html => "html",
            AssetClass::Styles => "scss",
            AssetClass::Scripts => "scripts",
            AssetClass::Images => "images",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_mode_is_development() {
        assert_eq!(Mode::resolve(None), Mode::Development);
    }

    #[test]
    fn production_is_exact_match() {
        assert_eq!(Mode::resolve(Some("production")), Mode::Production);
        assert_eq!(Mode::resolve(Some("Production")), Mode::Development);
        assert_eq!(Mode::resolve(Some("prod")), Mode::Development);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in [Mode::Development, Mode::Production] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }
}
