//! Rotating a mesh about an axis and writing one image per increment.

use std::path::{Path, PathBuf};

use vesselshot_mesh::{Axis, SurfaceMesh};

use crate::colormap::ColorMap;
use crate::config::RenderOptions;
use crate::raster::{RenderContext, SurfaceStyle};
use crate::{PipelineError, Result};

/// One sweep of frames about a single axis.
#[derive(Debug, Clone)]
pub struct SnapshotRequest<'a> {
    pub axis: Axis,
    /// Degrees added before each frame.
    pub step: u32,
    /// Frames to render; a full turn when `None`.
    pub frames: Option<u32>,
    pub clim: (f32, f32),
    pub ambient: f32,
    /// Directory and file stem every frame path starts with.
    pub prefix: &'a Path,
}

/// Frames in a full turn at `step` degrees per frame.
pub fn frame_count(step: u32) -> Result<u32> {
    if step == 0 || 360 % step != 0 {
        return Err(PipelineError::InvalidRotationStep(step));
    }
    Ok(360 / step)
}

/// `<prefix>_<axis>_<index:03>.png`
pub fn frame_path(prefix: &Path, axis: Axis, index: u32) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{}_{:03}.png", axis, index));
    PathBuf::from(name)
}

const WRITE_CHECK_FILE: &str = ".vesselshot-write-check";

fn check_output_dir(prefix: &Path) -> Result<()> {
    let dir = match prefix.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let render_error = |reason: &str| PipelineError::Render {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    };
    let metadata = std::fs::metadata(dir).map_err(|_| render_error("directory does not exist"))?;
    if !metadata.is_dir() {
        return Err(render_error("not a directory"));
    }
    // Mode bits do not say whether this process may write, so try it.
    let marker = dir.join(WRITE_CHECK_FILE);
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&marker)
        .map_err(|e| render_error(&format!("directory is not writable: {}", e)))?;
    std::fs::remove_file(&marker).map_err(|e| PipelineError::io(&marker, e))?;
    Ok(())
}

pub struct SnapshotRenderer {
    options: RenderOptions,
    colormap: ColorMap,
}

impl SnapshotRenderer {
    pub fn new(options: RenderOptions) -> Self {
        let colormap = ColorMap::from_kind(options.palette);
        Self { options, colormap }
    }

    /// Renders the sweep described by `request` and returns the number of
    /// images written.
    ///
    /// Each frame first rotates `mesh` in place by `request.step` degrees
    /// about the axis through the origin, so frame `i` shows the mesh turned
    /// by `(i + 1) * step` degrees and the mesh is left in its last
    /// orientation. The camera is fitted once, to the mesh as passed in.
    pub fn render(&self, mesh: &mut SurfaceMesh, request: &SnapshotRequest) -> Result<usize> {
        let full_turn = frame_count(request.step)?;
        let frames = match request.frames {
            Some(n) if n == 0 || n > full_turn => {
                return Err(PipelineError::InvalidFrameCount {
                    requested: n,
                    max: full_turn,
                })
            }
            Some(n) => n,
            None => full_turn,
        };
        self.options.validate().map_err(|e| PipelineError::Render {
            path: request.prefix.to_path_buf(),
            reason: e.to_string(),
        })?;
        check_output_dir(request.prefix)?;
        let bounds = mesh.bounds().ok_or_else(|| PipelineError::Render {
            path: request.prefix.to_path_buf(),
            reason: "mesh has no points".to_string(),
        })?;

        let style = SurfaceStyle {
            clim: request.clim,
            ambient: request.ambient,
            colormap: &self.colormap,
        };
        let mut ctx = RenderContext::acquire(&self.options, &bounds);
        for i in 0..frames {
            mesh.rotate(request.axis, request.step as f32);
            ctx.draw(mesh, &style);
            let path = frame_path(request.prefix, request.axis, i);
            ctx.capture()
                .save(&path)
                .map_err(|source| PipelineError::Image {
                    path: path.clone(),
                    source,
                })?;
            log::debug!("wrote {}", path.display());
        }
        Ok(frames as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use vesselshot_mesh::{Triangle, TriangleMesh};
    use vesselshot_test_data::box_facets;

    fn renderer() -> SnapshotRenderer {
        SnapshotRenderer::new(RenderOptions {
            width: 48,
            height: 32,
            crop_margin: 8,
            supersample: 1,
            ..RenderOptions::default()
        })
    }

    fn slab() -> SurfaceMesh {
        SurfaceMesh::from_triangles(
            box_facets([0.0, 0.0, 0.0], [4.0, 1.0, 1.0])
                .into_iter()
                .map(Triangle::from)
                .collect(),
        )
    }

    fn request(prefix: &Path, axis: Axis, step: u32, frames: Option<u32>) -> SnapshotRequest<'_> {
        SnapshotRequest {
            axis,
            step,
            frames,
            clim: (0.0, 150.0),
            ambient: 0.3,
            prefix,
        }
    }

    fn png_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn frame_names() {
        assert_eq!(
            PathBuf::from("/out/P01_z_007.png"),
            frame_path(Path::new("/out/P01"), Axis::Z, 7)
        );
        assert_eq!(
            PathBuf::from("P01_x_000.png"),
            frame_path(Path::new("P01"), Axis::X, 0)
        );
    }

    #[test]
    fn full_turns() {
        assert_eq!(12, frame_count(30).unwrap());
        assert_eq!(1, frame_count(360).unwrap());
        assert!(matches!(frame_count(0), Err(PipelineError::InvalidRotationStep(0))));
        assert!(matches!(frame_count(7), Err(PipelineError::InvalidRotationStep(7))));
    }

    #[test]
    fn bad_step_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        let mut mesh = slab();
        let result = renderer().render(&mut mesh, &request(&prefix, Axis::Z, 7, None));
        assert!(matches!(result, Err(PipelineError::InvalidRotationStep(7))));
        assert_eq!(0, png_count(dir.path()));
        assert_eq!(slab().points, mesh.points);
    }

    #[test]
    fn full_sweep_numbers_frames() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        let written = renderer()
            .render(&mut slab(), &request(&prefix, Axis::X, 30, None))
            .unwrap();
        assert_eq!(12, written);
        assert_eq!(12, png_count(dir.path()));
        for i in 0..12 {
            assert!(frame_path(&prefix, Axis::X, i).is_file(), "frame {}", i);
        }
        assert!(!frame_path(&prefix, Axis::X, 12).exists());

        let image = image::open(frame_path(&prefix, Axis::X, 0)).unwrap();
        assert_eq!(32, image.width());
        assert_eq!(32, image.height());
        assert_eq!(image::ColorType::L8, image.color());
    }

    #[test]
    fn rotation_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        let mut mesh = slab();
        let written = renderer()
            .render(&mut mesh, &request(&prefix, Axis::Z, 90, Some(3)))
            .unwrap();
        assert_eq!(3, written);

        // 270 degrees about z maps (x, y) to (y, -x).
        let bounds = mesh.bounds().unwrap();
        assert_float_eq!(0.0, bounds.min.x, abs <= 1e-5);
        assert_float_eq!(1.0, bounds.max.x, abs <= 1e-5);
        assert_float_eq!(-4.0, bounds.min.y, abs <= 1e-5);
        assert_float_eq!(0.0, bounds.max.y, abs <= 1e-5);
        assert_float_eq!(1.0, bounds.max.z, abs <= 1e-5);
    }

    #[test]
    fn frame_limit_is_bounded_by_the_turn() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        let result = renderer().render(&mut slab(), &request(&prefix, Axis::Y, 90, Some(5)));
        assert!(matches!(
            result,
            Err(PipelineError::InvalidFrameCount {
                requested: 5,
                max: 4
            })
        ));
        let result = renderer().render(&mut slab(), &request(&prefix, Axis::Y, 90, Some(0)));
        assert!(matches!(result, Err(PipelineError::InvalidFrameCount { .. })));
        assert_eq!(0, png_count(dir.path()));
    }

    #[test]
    fn missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent").join("slab");
        let result = renderer().render(&mut slab(), &request(&prefix, Axis::Z, 90, None));
        assert!(matches!(result, Err(PipelineError::Render { .. })));
    }

    #[test]
    fn output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"").unwrap();
        let prefix = file.join("slab");
        match renderer().render(&mut slab(), &request(&prefix, Axis::Z, 90, None)) {
            Err(PipelineError::Render { path, reason }) => {
                assert_eq!(file, path);
                assert_eq!("not a directory", reason);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_output_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("locked");
        std::fs::create_dir(&out).unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o555)).unwrap();
        // Privileged users write through the mode bits; nothing to observe.
        let privileged = std::fs::write(out.join("canary"), b"").is_ok();

        let prefix = out.join("slab");
        let result = renderer().render(&mut slab(), &request(&prefix, Axis::Z, 90, None));
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o755)).unwrap();
        if privileged {
            return;
        }
        match result {
            Err(PipelineError::Render { reason, .. }) => {
                assert!(reason.starts_with("directory is not writable"), "{}", reason)
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(0, png_count(&out));
    }

    #[test]
    fn write_check_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        renderer()
            .render(&mut slab(), &request(&prefix, Axis::Z, 180, None))
            .unwrap();
        assert!(!dir.path().join(WRITE_CHECK_FILE).exists());
        assert_eq!(2, png_count(dir.path()));
    }

    #[test]
    fn single_frame() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("slab");
        let written = renderer()
            .render(&mut slab(), &request(&prefix, Axis::Y, 30, Some(1)))
            .unwrap();
        assert_eq!(1, written);
        assert!(frame_path(&prefix, Axis::Y, 0).is_file());
    }
}
