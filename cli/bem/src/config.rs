//! `bem.toml` project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bem_core::DEFAULT_TOLERANCE;
use bem_physical::{ResolveOptions, Sense};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "bem.toml";

/// The top-level configuration of a BEM project. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BemConfig {
    #[serde(default)]
    pub project: Option<ProjectConfig>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Blocks realizable by series/parallel combinations, with their sense.
    #[serde(default)]
    pub combinable: BTreeMap<String, Sense>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

/// Locations of the block library and the stock catalog, relative to the
/// directory holding `bem.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_blocks")]
    pub blocks: PathBuf,
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            blocks: default_blocks(),
            catalog: default_catalog(),
        }
    }
}

fn default_blocks() -> PathBuf {
    PathBuf::from("blocks")
}

fn default_catalog() -> PathBuf {
    PathBuf::from("stock.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Relative tolerance of precision attributes.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Attributes compared as "at least" ratings.
    #[serde(default = "default_rating")]
    pub rating: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            tolerance: default_tolerance(),
            rating: default_rating(),
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_rating() -> Vec<String> {
    ResolveOptions::default().rating
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_error_percent")]
    pub error_percent: f64,
    #[serde(default = "default_closest_error_percent")]
    pub closest_error_percent: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            error_percent: default_error_percent(),
            closest_error_percent: default_closest_error_percent(),
        }
    }
}

fn default_error_percent() -> f64 {
    ResolveOptions::default().error_percent
}

fn default_closest_error_percent() -> f64 {
    ResolveOptions::default().closest_error_percent
}

impl BemConfig {
    /// Search upward from `start_dir` for a `bem.toml` file, parse and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing bem.toml")
    }

    /// Resolution options described by this configuration.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            tolerance: self.matching.tolerance,
            rating: self.matching.rating.clone(),
            error_percent: self.synthesis.error_percent,
            closest_error_percent: self.synthesis.closest_error_percent,
            combinable: self.combinable.clone(),
            virtual_part: false,
        }
    }

    /// Generate the default template for `bem init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"

[paths]
blocks = "blocks"
catalog = "stock.json"

[matching]
tolerance = 0.1
rating = ["V", "I", "P", "Z"]

[synthesis]
error_percent = 15.0
closest_error_percent = 5.0

# Blocks building on abstract.Combination are combinable already; entries
# here override their sense, or make other blocks combinable.
[combinable]
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = BemConfig::from_str("").unwrap();
        assert!(config.project.is_none());
        assert_eq!(config.paths.blocks, PathBuf::from("blocks"));
        assert_eq!(config.paths.catalog, PathBuf::from("stock.json"));

        let options = config.resolve_options();
        assert_eq!(options, ResolveOptions::default());
    }

    #[test]
    fn parse_full_config() {
        let config = BemConfig::from_str(
            r#"
[project]
name = "amp"

[paths]
blocks = "lib/blocks"

[matching]
tolerance = 0.05
rating = ["V"]

[synthesis]
error_percent = 10.0

[combinable]
"basic.Inductor" = "increase"
"basic.Capacitor" = "decrease"
"#,
        )
        .unwrap();

        assert_eq!(config.project.as_ref().unwrap().name, "amp");
        assert_eq!(config.paths.blocks, PathBuf::from("lib/blocks"));
        assert_eq!(config.paths.catalog, PathBuf::from("stock.json"));

        let options = config.resolve_options();
        assert_eq!(options.tolerance, 0.05);
        assert_eq!(options.rating, vec!["V".to_string()]);
        assert_eq!(options.error_percent, 10.0);
        assert_eq!(options.closest_error_percent, 5.0);
        assert_eq!(options.sense("basic.Inductor"), Some(Sense::Increase));
        assert_eq!(options.sense("basic.Capacitor"), Some(Sense::Decrease));
        assert_eq!(options.sense("basic.Resistor"), None);
    }

    #[test]
    fn reject_unknown_sense() {
        let bad = "[combinable]\n\"basic.Resistor\" = \"sideways\"\n";
        assert!(BemConfig::from_str(bad).is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let config = BemConfig::from_str(&BemConfig::template("demo")).unwrap();
        assert_eq!(config.project.unwrap().name, "demo");
        assert!(config.combinable.is_empty());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"parent\"\n").unwrap();

        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, found_dir) = BemConfig::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(config.project.unwrap().name, "parent");
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[[[").unwrap();
        let err = BemConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bem.toml"));
    }
}
