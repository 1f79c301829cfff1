//! CLI command implementations.

pub mod compose;
pub mod init;
pub mod resolve;
pub mod scope;
pub mod stock;
pub mod synth;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bem_core::ComponentSpecification;
use bem_physical::{ResolveOptions, Resolver};
use bem_registry::{CachedRegistry, LocalRegistry};
use bem_stock::LocalCatalog;
use clap::Args;
use serde::Serialize;

use crate::config::BemConfig;

/// The block being asked for, shared by `compose`, `match` and `resolve`.
#[derive(Args, Debug, Clone)]
pub struct BlockArgs {
    /// Dotted block name (e.g. basic.Resistor)
    pub name: String,
    /// Modifier selection `key=v1,v2` (repeatable)
    #[arg(short = 'm', long = "mod", value_name = "KEY=VALUES")]
    pub mods: Vec<String>,
    /// Argument override `attr=value` (repeatable)
    #[arg(short = 's', long = "set", value_name = "ATTR=VALUE")]
    pub sets: Vec<String>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl BlockArgs {
    /// The component specification these arguments describe.
    pub fn specification(&self) -> Result<ComponentSpecification> {
        let mut spec = ComponentSpecification::new(&self.name);
        for selection in &self.mods {
            spec.apply_modifier(selection)
                .with_context(|| format!("invalid --mod '{selection}'"))?;
        }
        for assignment in &self.sets {
            spec.apply_override(assignment)
                .with_context(|| format!("invalid --set '{assignment}'"))?;
        }
        Ok(spec)
    }
}

pub type ProjectRegistry = CachedRegistry<LocalRegistry>;

/// A located project: its configuration and the directory paths resolve
/// against.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: BemConfig,
    pub root: PathBuf,
}

impl Project {
    /// Load `config` when given, else search upward from `cwd`. Without any
    /// `bem.toml` the defaults apply relative to `cwd`.
    pub fn discover(config: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = config {
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            return Ok(Project {
                config: BemConfig::load(path)?,
                root,
            });
        }

        match BemConfig::find_and_load(cwd)? {
            Some((config, root)) => Ok(Project { config, root }),
            None => Ok(Project {
                config: BemConfig::default(),
                root: cwd.to_path_buf(),
            }),
        }
    }

    pub fn blocks_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.blocks)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.catalog)
    }

    pub fn registry(&self) -> ProjectRegistry {
        CachedRegistry::new(LocalRegistry::new(self.blocks_dir()))
    }

    pub fn catalog(&self) -> Result<LocalCatalog> {
        let path = self.catalog_path();
        LocalCatalog::load(&path).with_context(|| format!("loading catalog {}", path.display()))
    }

    pub fn options(&self) -> ResolveOptions {
        self.config.resolve_options()
    }

    pub fn resolver(&self, options: ResolveOptions) -> Result<Resolver<ProjectRegistry, LocalCatalog>> {
        Ok(Resolver::new(self.registry(), self.catalog()?, options))
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A freshly scaffolded project in a temporary directory.
    pub fn project() -> (tempfile::TempDir, Project) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        super::init::create_project(&root, "demo").unwrap();
        let project = Project::discover(None, &root).unwrap();
        (dir, project)
    }

    pub fn block(name: &str, mods: &[&str], sets: &[&str]) -> BlockArgs {
        BlockArgs {
            name: name.to_string(),
            mods: mods.iter().map(|s| s.to_string()).collect(),
            sets: sets.iter().map(|s| s.to_string()).collect(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_args_build_a_specification() {
        let args = testing::block("basic.Resistor", &["series=E24,E96"], &["value=4.7k"]);
        let spec = args.specification().unwrap();
        assert_eq!(spec.name, "basic.Resistor");
        assert_eq!(spec.modifiers["series"], vec!["E24", "E96"]);
        assert!(spec.overrides.contains_key("value"));
    }

    #[test]
    fn block_args_reject_malformed_selection() {
        let args = testing::block("basic.Resistor", &["series"], &[]);
        let err = args.specification().unwrap_err();
        assert!(format!("{err:#}").contains("invalid --mod"));
    }

    #[test]
    fn discover_without_config_uses_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::discover(None, dir.path()).unwrap();
        assert_eq!(project.blocks_dir(), dir.path().join("blocks"));
        assert_eq!(project.catalog_path(), dir.path().join("stock.json"));
    }

    #[test]
    fn explicit_config_sets_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("conf");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("custom.toml");
        std::fs::write(&path, "[paths]\ncatalog = \"parts.json\"\n").unwrap();

        let project = Project::discover(Some(&path), dir.path()).unwrap();
        assert_eq!(project.root, nested);
        assert_eq!(project.catalog_path(), nested.join("parts.json"));
    }

    #[test]
    fn missing_catalog_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::discover(None, dir.path()).unwrap();
        let err = project.catalog().unwrap_err();
        assert!(format!("{err:#}").contains("stock.json"));
    }
}
