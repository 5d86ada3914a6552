//! Job files: which layout to build, with what parameters, and where to write it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use maskforge_core::{LayerSpec, LayoutKind, LayoutParams};

use crate::IoError;

/// Output files of a job. Unset formats are not written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub dxf: Option<PathBuf>,
    pub gds: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    /// Named shape collection of the layout.
    pub shapes: Option<PathBuf>,
}

impl OutputPaths {
    pub fn is_empty(&self) -> bool {
        self.dxf.is_none() && self.gds.is_none() && self.svg.is_none() && self.shapes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub layout: LayoutKind,
    #[serde(default)]
    pub params: LayoutParams,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub outputs: OutputPaths,
    /// Glyph table used for labels.
    #[serde(default)]
    pub glyphs: Option<PathBuf>,
    /// Start the DXF from scratch instead of adding to an existing file.
    #[serde(default = "default_reset")]
    pub reset: bool,
}

fn default_reset() -> bool {
    true
}

impl JobConfig {
    pub fn new(name: &str, layout: LayoutKind) -> Self {
        Self {
            name: name.to_string(),
            layout,
            params: LayoutParams::default(),
            layers: Vec::new(),
            outputs: OutputPaths::default(),
            glyphs: None,
            reset: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, IoError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Relative paths inside the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let mut job = Self::from_json(&fs::read_to_string(path)?)?;
        if let Some(dir) = path.parent() {
            job.resolve_paths(dir);
        }
        log::info!("Loaded job '{}' ({}) from {}", job.name, job.layout, path.display());
        Ok(job)
    }

    pub fn save(&self, path: &Path) -> Result<(), IoError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p {
                if path.is_relative() {
                    *path = dir.join(&*path);
                }
            }
        };
        resolve(&mut self.outputs.dxf);
        resolve(&mut self.outputs.gds);
        resolve(&mut self.outputs.svg);
        resolve(&mut self.outputs.shapes);
        resolve(&mut self.glyphs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::compose::pads::DcPadKind;

    #[test]
    fn test_minimal_job_uses_defaults() {
        let job = JobConfig::from_json(r#"{"name": "chip", "layout": "coplanar_3"}"#).unwrap();
        assert_eq!(job.layout, LayoutKind::Coplanar3);
        assert!(job.reset);
        assert!(job.outputs.is_empty());
        assert_eq!(job.params, LayoutParams::default());
    }

    #[test]
    fn test_nested_overrides() {
        let json = r#"{
            "name": "chip",
            "layout": "coplanar_2_magnet",
            "params": {"coplanar": {"sig_width": 10.0}, "dc_pad": "stub"},
            "layers": [{"name": "magnet", "gds_layer": 4}],
            "outputs": {"gds": "out/chip.gds"},
            "reset": false
        }"#;
        let job = JobConfig::from_json(json).unwrap();
        assert_eq!(job.params.coplanar.sig_width, 10.0);
        assert_eq!(job.params.coplanar.gnd_width, 50.0);
        assert_eq!(job.params.dc_pad, Some(DcPadKind::Stub));
        assert_eq!(job.layers[0].gds_datatype, 0);
        assert!(!job.reset);
    }

    #[test]
    fn test_unknown_layout_rejected() {
        assert!(JobConfig::from_json(r#"{"name": "x", "layout": "coplanar_9"}"#).is_err());
    }

    #[test]
    fn test_relative_outputs_resolved() {
        let mut job = JobConfig::new("chip", LayoutKind::AlignmentMark);
        job.outputs.dxf = Some(PathBuf::from("chip.dxf"));
        job.outputs.svg = Some(PathBuf::from("/abs/chip.svg"));
        job.resolve_paths(Path::new("/jobs"));
        assert_eq!(job.outputs.dxf, Some(PathBuf::from("/jobs/chip.dxf")));
        assert_eq!(job.outputs.svg, Some(PathBuf::from("/abs/chip.svg")));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("maskforge-job-{}.json", std::process::id()));
        let mut job = JobConfig::new("chip", LayoutKind::Coplanar1);
        job.params.coplanar.straight_length = 250.0;
        job.save(&path).unwrap();
        let loaded = JobConfig::load(&path).unwrap();
        assert_eq!(loaded.params.coplanar.straight_length, 250.0);
        assert_eq!(loaded.layout, LayoutKind::Coplanar1);
        let _ = std::fs::remove_file(&path);
    }
}
