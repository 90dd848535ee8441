//! Orchestration manifest: which documents to compile and where.
//!
//! Paths are resolved against the manifest's own directory; source
//! documents additionally live under `source_dir`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BuildError, BuildResult};
use crate::model::Family;

/// Manifest read when no path is given on the command line.
pub const FILE_NAME: &str = "builder.json";

/// Extension substituted on every compiled output.
pub const OUTPUT_EXTENSION: &str = "bin";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFiles {
    pub floor: PathBuf,
    pub wall: PathBuf,
    pub scene_obj: PathBuf,
    pub item: PathBuf,
    pub criature: PathBuf,
    pub roof: PathBuf,
}

impl ProfileFiles {
    pub fn get(&self, family: Family) -> &Path {
        match family {
            Family::Floor => &self.floor,
            Family::Wall => &self.wall,
            Family::SceneObj => &self.scene_obj,
            Family::Item => &self.item,
            Family::Criature => &self.criature,
            Family::Roof => &self.roof,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub rules: PathBuf,
    #[serde(default)]
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    pub anim_templates: PathBuf,
    pub profiles: ProfileFiles,
    #[serde(default)]
    pub areas: Vec<PathBuf>,
    pub interfaces: PathBuf,
    pub static_text: PathBuf,
    pub presentations: PathBuf,
    pub global_events: PathBuf,
    pub player_profile: PathBuf,

    /// Directory of the manifest file itself.
    #[serde(skip)]
    base: PathBuf,
}

impl Manifest {
    pub fn load(path: &Path) -> BuildResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json(&json, base)
    }

    pub fn from_json(json: &str, base: PathBuf) -> BuildResult<Self> {
        let mut manifest: Manifest =
            serde_json::from_str(json).map_err(|e| BuildError::Manifest(e.to_string()))?;
        manifest.base = base;
        manifest.check_outputs()?;
        Ok(manifest)
    }

    pub fn rules_path(&self) -> PathBuf {
        self.base.join(&self.rules)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.as_ref().map(|p| self.base.join(p))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base.join(&self.output_dir)
    }

    /// Full path of a source document named in the manifest.
    pub fn source(&self, file: &Path) -> PathBuf {
        self.base.join(&self.source_dir).join(file)
    }

    /// `<output_dir>/<stem>.bin` for a compiled source.
    pub fn output_for(&self, file: &Path) -> BuildResult<PathBuf> {
        let stem = file.file_stem().ok_or_else(|| {
            BuildError::Manifest(format!("`{}` has no file name", file.display()))
        })?;
        let mut out = self.output_dir().join(stem);
        out.set_extension(OUTPUT_EXTENSION);
        Ok(out)
    }

    /// Every document that produces a binary, in compilation order.
    pub fn compiled_sources(&self) -> Vec<&Path> {
        let mut sources = vec![self.anim_templates.as_path()];
        sources.extend(Family::ALL.iter().map(|f| self.profiles.get(*f)));
        sources.extend(self.areas.iter().map(PathBuf::as_path));
        sources
    }

    /// Two sources sharing a stem would overwrite each other's output.
    fn check_outputs(&self) -> BuildResult<()> {
        let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
        for source in self.compiled_sources() {
            let out = self.output_for(source)?;
            if let Some(prev) = seen.insert(out.clone(), source) {
                return Err(BuildError::Manifest(format!(
                    "`{}` and `{}` would both be written to `{}`",
                    prev.display(),
                    source.display(),
                    out.display()
                )));
            }
        }
        Ok(())
    }
}
