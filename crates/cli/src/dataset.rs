use anyhow::Context;
use vesselshot::{
    pair_dataset, ColorMode, DatasetBuilder, DatasetConfig, GeometryRepository, GeometrySource,
};

use crate::args;

/// Config file values, then the root and flags from the command line.
pub fn resolve_config(args: &args::DatasetArgs) -> anyhow::Result<DatasetConfig> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DatasetConfig::default(),
    };
    config.root = args.root.clone();
    if let Some(fraction) = args.train_fraction {
        config.train_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.stratify {
        config.stratify = true;
    }
    Ok(config)
}

pub fn split_command(args: args::SplitArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.dataset)?;
    config.validate()?;
    let repo = GeometryRepository::new(&config.root);
    let ids = repo
        .identifiers()
        .context("listing geometries")?;
    let split = config.split(&ids);
    for id in &split.train {
        println!("train\t{}", id);
    }
    for id in &split.test {
        println!("test\t{}", id);
    }
    log::info!("{} train, {} test", split.train.len(), split.test.len());
    Ok(())
}

pub fn build_command(args: args::BuildArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(&args.dataset)?;
    if let Some(step) = args.rotation_step {
        config.rotation_step = step;
    }
    if let Some(augmentation) = args.augmentation {
        config.augmentation = augmentation.into();
    }
    if args.rgb {
        config.render.color = ColorMode::Rgb;
    }
    if let Some(palette) = args.palette {
        config.render.palette = palette.into();
    }
    if !args.transformations.is_empty() {
        config.transformations = args.transformations;
    }
    config.validate()?;
    let transformations = config.transformations.clone();

    let repo = GeometryRepository::new(&config.root);
    let ids = repo.identifiers().context("listing geometries")?;
    let split = config.split(&ids);
    log::info!(
        "{} geometries: {} train, {} test",
        ids.len(),
        split.train.len(),
        split.test.len()
    );

    let report = DatasetBuilder::new(repo, config)
        .build(&transformations, &split)
        .context("dataset build failed")?;
    log::info!(
        "wrote {} images for {} geometry passes",
        report.images,
        report.geometries
    );
    Ok(())
}

pub fn pair_command(args: args::PairArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.dataset)?;
    let pairs = pair_dataset(&config, args.input, args.target)
        .with_context(|| format!("pairing {} with {}", args.input, args.target))?;
    log::info!("wrote {} pairs", pairs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vesselshot::Transformation;

    fn dataset_args(root: &str) -> args::DatasetArgs {
        args::DatasetArgs {
            root: PathBuf::from(root),
            config: None,
            train_fraction: None,
            seed: None,
            stratify: false,
        }
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "root": "/elsewhere", "seed": 1, "train_fraction": 0.5 }"#)
            .unwrap();
        let args = args::DatasetArgs {
            config: Some(path),
            seed: Some(7),
            ..dataset_args("/data")
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(PathBuf::from("/data"), config.root);
        assert_eq!(7, config.seed);
        assert_eq!(0.5, config.train_fraction);
    }

    #[test]
    fn build_renders_and_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let geometry = dir.path().join(vesselshot::GEOMETRY_DIR);
        std::fs::create_dir_all(&geometry).unwrap();
        for id in ["A", "B"] {
            std::fs::write(
                geometry.join(format!("{}.stl", id)),
                vesselshot_test_data::stl_tube(1.0, 4.0, 12, 2).binary_stl(),
            )
            .unwrap();
        }
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "render": { "width": 40, "height": 24, "crop_margin": 8, "supersample": 1 } }"#,
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();
        let dataset = || args::DatasetArgs {
            config: Some(config_path.clone()),
            train_fraction: Some(0.5),
            ..dataset_args(root)
        };

        build_command(args::BuildArgs {
            dataset: dataset(),
            transformations: vec![Transformation::Raw, Transformation::Curvature],
            rotation_step: Some(180),
            augmentation: None,
            rgb: false,
            palette: None,
        })
        .unwrap();
        pair_command(args::PairArgs {
            dataset: dataset(),
            input: Transformation::Raw,
            target: Transformation::Curvature,
        })
        .unwrap();

        let config = resolve_config(&dataset()).unwrap();
        let paired = config.paired_dir(
            Transformation::Raw,
            Transformation::Curvature,
            vesselshot::SplitKind::Test,
        );
        let mut names: Vec<String> = std::fs::read_dir(paired)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(2, names.len());
        assert!(names[0].ends_with("_z_000.png"), "{:?}", names);
        assert!(names[1].ends_with("_z_001.png"), "{:?}", names);
    }
}
