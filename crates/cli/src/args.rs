use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vesselshot::{AugmentationPolicy, PaletteKind, Transformation};

/// Options shared by every command that touches a dataset root.
#[derive(clap::Args, Debug)]
pub struct DatasetArgs {
    /// Dataset root holding `Geometry/` and `CFD/`.
    pub root: PathBuf,

    /// JSON file with build settings; flags override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub train_fraction: Option<f64>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Split synthetic and real geometries separately.
    #[arg(long)]
    pub stratify: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Augmentation {
    FullSweep,
    SingleFrame,
    None,
}

impl From<Augmentation> for AugmentationPolicy {
    fn from(a: Augmentation) -> Self {
        match a {
            Augmentation::FullSweep => AugmentationPolicy::FullSweep,
            Augmentation::SingleFrame => AugmentationPolicy::SingleFrame,
            Augmentation::None => AugmentationPolicy::None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Palette {
    Cfd,
    Binary,
}

impl From<Palette> for PaletteKind {
    fn from(p: Palette) -> Self {
        match p {
            Palette::Cfd => PaletteKind::Cfd,
            Palette::Binary => PaletteKind::Binary,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Comma separated transformations to render; the config's list (all of
    /// them unless configured) by default.
    #[arg(short, long, value_delimiter = ',')]
    pub transformations: Vec<Transformation>,

    /// Degrees between frames; must divide 360.
    #[arg(long)]
    pub rotation_step: Option<u32>,

    #[arg(long, value_enum)]
    pub augmentation: Option<Augmentation>,

    /// Keep color instead of converting frames to grayscale.
    #[arg(long)]
    pub rgb: bool,

    #[arg(long, value_enum)]
    pub palette: Option<Palette>,
}

#[derive(clap::Args, Debug)]
pub struct PairArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Transformation shown on the left.
    #[arg(long)]
    pub input: Transformation,

    /// Transformation shown on the right.
    #[arg(long)]
    pub target: Transformation,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the train/test assignment of every geometry.
    Split(SplitArgs),
    /// Render the image dataset.
    Build(BuildArgs),
    /// Join input and target images side by side.
    Pair(PairArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_flags() {
        let args = Args::try_parse_from([
            "vesselshot",
            "build",
            "/data",
            "--transformations",
            "curvature,TAWSS",
            "--rotation-step",
            "45",
            "--augmentation",
            "single-frame",
            "--rgb",
        ])
        .unwrap();
        let Commands::Build(build) = args.command else {
            panic!("expected build");
        };
        assert_eq!(PathBuf::from("/data"), build.dataset.root);
        assert_eq!(
            vec![Transformation::Curvature, Transformation::Tawss],
            build.transformations
        );
        assert_eq!(Some(45), build.rotation_step);
        assert!(matches!(build.augmentation, Some(Augmentation::SingleFrame)));
        assert!(build.rgb);
        assert!(!build.dataset.stratify);
    }

    #[test]
    fn unknown_transformation_is_rejected() {
        assert!(Args::try_parse_from(["vesselshot", "build", "/data", "-t", "pressure"]).is_err());
    }

    #[test]
    fn pair_needs_both_sides() {
        assert!(Args::try_parse_from(["vesselshot", "pair", "/data", "--input", "raw"]).is_err());
        let args = Args::try_parse_from([
            "vesselshot",
            "pair",
            "/data",
            "--input",
            "raw",
            "--target",
            "osi",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Commands::Pair(PairArgs {
                input: Transformation::Raw,
                target: Transformation::Osi,
                ..
            })
        ));
    }
}
