use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tagforge_schema::{Namespace, IMAGES_ROOT};

/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "tagforge.toml";

/// Accepted top-level shape of a base catalog file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseShape {
    /// Accept either a bare array or a namespace-keyed object.
    #[default]
    Auto,
    /// A bare array of records.
    Array,
    /// An object holding the records under the namespace key.
    Keyed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Base catalog file; defaults to `<resources_dir>/<namespace>.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub shape: BaseShape,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesSection {
    #[serde(default)]
    pub amiibo: SourceConfig,
    #[serde(default)]
    pub skylanders: SourceConfig,
}

/// Locations and policies for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Patch root; defaults to `<resources_dir>/patches`.
    #[serde(default)]
    pub patches_dir: Option<PathBuf>,
    /// Base image directory; defaults to `<resources_dir>/images`.
    #[serde(default)]
    pub images_dir: Option<PathBuf>,
    /// File name stem of the published artifacts.
    #[serde(default = "default_stem")]
    pub stem: String,
    /// Fail the build when two image sources publish the same path.
    #[serde(default)]
    pub strict_assets: bool,
    #[serde(default)]
    pub sources: SourcesSection,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resources_dir: default_resources_dir(),
            dist_dir: default_dist_dir(),
            patches_dir: None,
            images_dir: None,
            stem: default_stem(),
            strict_assets: false,
            sources: SourcesSection::default(),
        }
    }
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from("resources")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_stem() -> String {
    "tags".to_owned()
}

impl PipelineConfig {
    /// Default layout rooted at `dir`.
    pub fn rooted_at(dir: &Path) -> Self {
        let mut config = Self::default();
        config.rebase(dir);
        config
    }

    pub fn parse_str(input: &str) -> Result<Self, CoreError> {
        let config: Self =
            toml::from_str(input).map_err(|e| CoreError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::parse_str(&content)?;
        config.rebase(path.parent().unwrap_or(Path::new(".")));
        Ok(config)
    }

    /// Load `tagforge.toml` from `dir` if present, otherwise use defaults rooted at `dir`.
    pub fn discover(dir: &Path) -> Result<Self, CoreError> {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::rooted_at(dir))
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        let stem = self.stem.trim();
        if stem.is_empty() {
            return Err(CoreError::Config("stem must not be empty".to_owned()));
        }
        if stem.contains(['/', '\\']) {
            return Err(CoreError::Config(format!(
                "stem must be a plain file name, got '{stem}'"
            )));
        }
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.resources_dir);
        join(&mut self.dist_dir);
        for path in [
            &mut self.patches_dir,
            &mut self.images_dir,
            &mut self.sources.amiibo.path,
            &mut self.sources.skylanders.path,
        ]
        .into_iter()
        .flatten()
        {
            join(path);
        }
    }

    pub fn source(&self, namespace: Namespace) -> &SourceConfig {
        match namespace {
            Namespace::Amiibo => &self.sources.amiibo,
            Namespace::Skylanders => &self.sources.skylanders,
        }
    }

    pub fn base_path(&self, namespace: Namespace) -> PathBuf {
        self.source(namespace).path.clone().unwrap_or_else(|| {
            self.resources_dir
                .join(format!("{}.json", namespace.key()))
        })
    }

    pub fn patches_dir(&self) -> PathBuf {
        self.patches_dir
            .clone()
            .unwrap_or_else(|| self.resources_dir.join("patches"))
    }

    pub fn base_images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.resources_dir.join(IMAGES_ROOT))
    }
}
