//! Side by side input/target pairs for image-to-image training.

use std::path::{Path, PathBuf};

use image::{GenericImage, RgbImage};

use crate::builder::reset_dir;
use crate::config::DatasetConfig;
use crate::split::SplitKind;
use crate::{PipelineError, Result, Transformation};

fn png_names(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !is_png {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn open_rgb(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.into_rgb8())
        .map_err(|source| PipelineError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes, for every PNG in `input_dir`, the input on the left and the
/// same-named image from `target_dir` on the right into `output_dir`.
///
/// `output_dir` is emptied first. The pair is as tall as the input; a taller
/// target is cut off at the bottom. Returns the number of pairs written.
pub fn pair_images(input_dir: &Path, target_dir: &Path, output_dir: &Path) -> Result<usize> {
    let names = png_names(input_dir)?;
    reset_dir(output_dir)?;
    for name in &names {
        let target_path = target_dir.join(name);
        if !target_path.is_file() {
            return Err(PipelineError::MissingPair {
                name: name.clone(),
                dir: target_dir.to_path_buf(),
            });
        }
        let input = open_rgb(&input_dir.join(name))?;
        let target = open_rgb(&target_path)?;

        let mut pair = RgbImage::new(input.width() + target.width(), input.height());
        let out_path = output_dir.join(name);
        let visible = target.height().min(input.height());
        let right = image::imageops::crop_imm(&target, 0, 0, target.width(), visible).to_image();
        pair.copy_from(&input, 0, 0)
            .and_then(|_| pair.copy_from(&right, input.width(), 0))
            .and_then(|_| pair.save(&out_path))
            .map_err(|source| PipelineError::Image {
                path: out_path.clone(),
                source,
            })?;
        log::debug!("wrote {}", out_path.display());
    }
    Ok(names.len())
}

/// Pairs the `input` and `target` images of both splits into
/// `<root>/Paired/<Input>-<Target>/<Split>`.
pub fn pair_dataset(
    config: &DatasetConfig,
    input: Transformation,
    target: Transformation,
) -> Result<usize> {
    let mut total = 0;
    for kind in SplitKind::ALL {
        let out: PathBuf = config.paired_dir(input, target, kind);
        let n = pair_images(
            &config.images_dir(kind, input),
            &config.images_dir(kind, target),
            &out,
        )?;
        log::info!("{} {}-{}: {} pairs", kind, input, target, n);
        total += n;
    }
    Ok(total)
}
