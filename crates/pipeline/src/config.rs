use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::colormap::PaletteKind;
use crate::split::{assign, assign_stratified, Split, SplitKind};
use crate::{PipelineError, Result, Transformation};

pub const GEOMETRY_DIR: &str = "Geometry";
pub const CFD_DIR: &str = "CFD";
pub const IMAGES_DIR: &str = "Images";
pub const PAIRED_DIR: &str = "Paired";

/// Which extra viewpoints training geometries receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AugmentationPolicy {
    /// Full x and y sweeps in addition to the canonical z sweep.
    #[default]
    FullSweep,
    /// A single x and a single y frame in addition to the z sweep.
    SingleFrame,
    /// Canonical z sweep only.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Grayscale,
    Rgb,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Canvas size before cropping.
    pub width: u32,
    pub height: u32,
    /// Pixels removed from the left and from the right of every frame.
    pub crop_margin: u32,
    /// Supersampling factor per axis used for anti-aliasing.
    pub supersample: u32,
    pub color: ColorMode,
    pub palette: PaletteKind,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            crop_margin: 128,
            supersample: 2,
            color: ColorMode::Grayscale,
            palette: PaletteKind::Cfd,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 2 * self.crop_margin || self.height == 0 {
            return Err(PipelineError::Config(format!(
                "a {}x{} canvas leaves nothing after cropping {} pixels per side",
                self.width, self.height, self.crop_margin
            )));
        }
        if self.supersample == 0 {
            return Err(PipelineError::Config(
                "supersample factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything a dataset build depends on. Passing this around explicitly
/// keeps separate invocations agreeing on the split.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub root: PathBuf,
    pub train_fraction: f64,
    /// Degrees between frames; must divide 360.
    pub rotation_step: u32,
    pub seed: u64,
    /// Split synthetic and real geometries separately.
    pub stratify: bool,
    pub synthetic_marker: String,
    pub augmentation: AugmentationPolicy,
    /// Transformations `build` renders when none are named explicitly.
    pub transformations: Vec<Transformation>,
    pub render: RenderOptions,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            train_fraction: 0.9,
            rotation_step: 30,
            seed: 42,
            stratify: false,
            synthetic_marker: "SYNTHETIC".to_string(),
            augmentation: AugmentationPolicy::FullSweep,
            transformations: Transformation::ALL.to_vec(),
            render: RenderOptions::default(),
        }
    }
}

impl DatasetConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON config; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.train_fraction) {
            return Err(PipelineError::Config(format!(
                "train fraction {} is outside [0, 1]",
                self.train_fraction
            )));
        }
        if self.rotation_step == 0 || 360 % self.rotation_step != 0 {
            return Err(PipelineError::InvalidRotationStep(self.rotation_step));
        }
        self.render.validate()
    }

    pub fn cfd_dir(&self) -> PathBuf {
        self.root.join(CFD_DIR)
    }

    /// `<root>/Images/<Split>/<Transformation>`
    pub fn images_dir(&self, split: SplitKind, transformation: Transformation) -> PathBuf {
        self.root
            .join(IMAGES_DIR)
            .join(split.dir_name())
            .join(transformation.name())
    }

    /// `<root>/Paired/<Input>-<Target>/<Split>`
    pub fn paired_dir(
        &self,
        input: Transformation,
        target: Transformation,
        split: SplitKind,
    ) -> PathBuf {
        self.root
            .join(PAIRED_DIR)
            .join(format!("{}-{}", input.name(), target.name()))
            .join(split.dir_name())
    }

    /// Partitions `ids` according to the configured seed, ratio and strategy.
    pub fn split(&self, ids: &[String]) -> Split {
        if self.stratify {
            assign_stratified(ids, self.train_fraction, self.seed, &self.synthetic_marker)
        } else {
            assign(ids, self.train_fraction, self.seed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DatasetConfig::default();
        assert_eq!(0.9, config.train_fraction);
        assert_eq!(30, config.rotation_step);
        assert_eq!(42, config.seed);
        assert_eq!(Transformation::ALL.to_vec(), config.transformations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DatasetConfig::from_json(
            r#"{ "root": "/data/aneurysm", "rotation_step": 45,
                 "augmentation": "single-frame", "transformations": ["curvature", "TAWSS"],
                 "render": { "color": "rgb" } }"#,
        )
        .unwrap();
        assert_eq!(PathBuf::from("/data/aneurysm"), config.root);
        assert_eq!(45, config.rotation_step);
        assert_eq!(AugmentationPolicy::SingleFrame, config.augmentation);
        assert_eq!(ColorMode::Rgb, config.render.color);
        assert_eq!(
            vec![Transformation::Curvature, Transformation::Tawss],
            config.transformations
        );
        assert_eq!(1024, config.render.width);
        assert_eq!(0.9, config.train_fraction);
    }

    #[test]
    fn unknown_enum_value_is_a_config_error() {
        assert!(matches!(
            DatasetConfig::from_json(r#"{ "augmentation": "sideways" }"#),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn unknown_transformation_is_a_config_error() {
        assert!(matches!(
            DatasetConfig::from_json(r#"{ "transformations": ["pressure"] }"#),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn rotation_step_must_divide_a_turn() {
        let config = DatasetConfig {
            rotation_step: 7,
            ..DatasetConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidRotationStep(7))
        ));
    }

    #[test]
    fn crop_must_leave_pixels() {
        let mut config = DatasetConfig::default();
        config.render.width = 256;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn output_layout() {
        let config = DatasetConfig::new("/data");
        assert_eq!(
            PathBuf::from("/data/Images/Train/TAWSS"),
            config.images_dir(SplitKind::Train, Transformation::Tawss)
        );
        assert_eq!(
            PathBuf::from("/data/Paired/Curvature-TAWSS/Test"),
            config.paired_dir(
                Transformation::Curvature,
                Transformation::Tawss,
                SplitKind::Test
            )
        );
    }
}
