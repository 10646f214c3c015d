//! CPU rasterizer for scalar colored surfaces.
//!
//! A [`RenderContext`] owns the frame and depth buffers for one sweep. It is
//! created with a camera fitted to the mesh as it looks before the sweep and
//! released when dropped.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector4};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use vesselshot_mesh::{Bounds, SurfaceMesh, Vector3};

use crate::colormap::ColorMap;
use crate::config::{ColorMode, RenderOptions};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Flat color of surfaces without an active scalar ("lightblue").
const SURFACE_COLOR: [f32; 3] = [0.678, 0.847, 0.902];

/// Vertical field of view in degrees.
const FOVY: f32 = 30.0;

pub struct Camera {
    // Where the camera is located.
    pub eye: Point3<f32>,
    // Where the camera is pointing.
    pub target: Point3<f32>,
    pub up: Vector3,
    // The aspect ratio of the image (width:height).
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Isometric view with z up, far enough away that the bounding sphere of
    /// `bounds` fills the vertical field of view.
    pub fn fit(bounds: &Bounds, aspect: f32) -> Self {
        let radius = bounds.radius().max(f32::EPSILON);
        let distance = radius / (FOVY.to_radians() * 0.5).sin();
        let center = bounds.center();
        let direction = Vector3::new(1.0, 1.0, 1.0).normalize();
        Camera {
            eye: Point3::from_vec(center + direction * distance),
            target: Point3::from_vec(center),
            up: Vector3::unit_z(),
            aspect,
            fovy: FOVY,
            znear: distance * 0.01,
            zfar: distance * 10.0,
        }
    }

    /// World to clip space, OpenGL conventions.
    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = cgmath::perspective(Deg(self.fovy), self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Unit vector from the target towards the eye. The scene is lit by a
    /// headlight along this direction.
    pub fn view_direction(&self) -> Vector3 {
        (self.eye - self.target).normalize()
    }
}

/// How a surface is colored and lit.
pub struct SurfaceStyle<'a> {
    pub clim: (f32, f32),
    pub ambient: f32,
    pub colormap: &'a ColorMap,
}

#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    // 1/w is linear in screen space, which makes it both the depth key and
    // the weight for perspective correct interpolation.
    inv_w: f32,
}

fn edge(a: ScreenVertex, b: ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn to_pixel(c: Vector3) -> Rgb<u8> {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(c.x), channel(c.y), channel(c.z)])
}

pub struct RenderContext {
    options: RenderOptions,
    camera: Camera,
    view_proj: Matrix4<f32>,
    color: RgbImage,
    depth: Vec<f32>,
    frames: usize,
}

impl RenderContext {
    pub fn acquire(options: &RenderOptions, bounds: &Bounds) -> Self {
        let width = options.width * options.supersample;
        let height = options.height * options.supersample;
        let camera = Camera::fit(bounds, width as f32 / height as f32);
        let view_proj = camera.build_view_projection_matrix();
        log::debug!("acquired {}x{} render context", width, height);
        RenderContext {
            options: options.clone(),
            camera,
            view_proj,
            color: RgbImage::from_pixel(width, height, BACKGROUND),
            depth: vec![0.0; (width * height) as usize],
            frames: 0,
        }
    }

    fn clear(&mut self) {
        for p in self.color.pixels_mut() {
            *p = BACKGROUND;
        }
        self.depth.fill(0.0);
    }

    fn project(&self, p: &Vector3) -> Option<ScreenVertex> {
        let clip: Vector4<f32> = self.view_proj * p.extend(1.0);
        if clip.w <= self.camera.znear {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let (width, height) = self.color.dimensions();
        Some(ScreenVertex {
            x: (clip.x * inv_w + 1.0) * 0.5 * width as f32,
            y: (1.0 - clip.y * inv_w) * 0.5 * height as f32,
            inv_w,
        })
    }

    /// Renders `mesh` into a freshly cleared frame. Facets are drawn from
    /// both sides; facets crossing the near plane are skipped.
    pub fn draw(&mut self, mesh: &SurfaceMesh, style: &SurfaceStyle) {
        self.clear();
        self.frames += 1;

        let (lo, hi) = style.clim;
        let scalars = mesh.active_scalars().filter(|_| lo < hi);
        let normals = mesh.vertex_normals();
        let light = self.camera.view_direction();
        let flat = Vector3::from(SURFACE_COLOR);
        let screen: Vec<_> = mesh.points.iter().map(|p| self.project(p)).collect();
        let (width, height) = self.color.dimensions();

        for facet in &mesh.facets {
            let idx = facet.indices();
            let (Some(v0), Some(v1), Some(v2)) = (screen[idx[0]], screen[idx[1]], screen[idx[2]])
            else {
                continue;
            };
            let area = edge(v0, v1, v2.x, v2.y);
            if area.abs() < f32::EPSILON {
                continue;
            }

            let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as u32;
            let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as u32;
            let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(width as i64 - 1);
            let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(height as i64 - 1);
            if max_x < 0 || max_y < 0 {
                continue;
            }

            for py in min_y..=max_y as u32 {
                for px in min_x..=max_x as u32 {
                    let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
                    // Dividing by the signed area makes the weights positive
                    // inside the triangle for either winding.
                    let w0 = edge(v1, v2, sx, sy) / area;
                    let w1 = edge(v2, v0, sx, sy) / area;
                    let w2 = 1.0 - w0 - w1;
                    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                        continue;
                    }

                    let inv_w = w0 * v0.inv_w + w1 * v1.inv_w + w2 * v2.inv_w;
                    let slot = (py * width + px) as usize;
                    if inv_w <= self.depth[slot] {
                        continue;
                    }
                    self.depth[slot] = inv_w;

                    let b = [
                        w0 * v0.inv_w / inv_w,
                        w1 * v1.inv_w / inv_w,
                        w2 * v2.inv_w / inv_w,
                    ];
                    let normal = normals[idx[0]] * b[0] + normals[idx[1]] * b[1] + normals[idx[2]] * b[2];
                    let lambert = if normal.magnitude2() > 0.0 {
                        normal.normalize().dot(light).abs()
                    } else {
                        0.0
                    };
                    let base = match scalars {
                        Some(s) => style.colormap.map(
                            s[idx[0]] * b[0] + s[idx[1]] * b[1] + s[idx[2]] * b[2],
                            style.clim,
                        ),
                        None => flat,
                    };
                    let intensity = (style.ambient + lambert).min(1.0);
                    self.color.put_pixel(px, py, to_pixel(base * intensity));
                }
            }
        }
    }

    /// Resolves the supersampled frame to the output size, crops the side
    /// margins and applies the color mode.
    pub fn capture(&self) -> DynamicImage {
        let RenderOptions {
            width,
            height,
            crop_margin,
            ..
        } = self.options;
        let resolved = if self.options.supersample > 1 {
            imageops::resize(&self.color, width, height, FilterType::Triangle)
        } else {
            self.color.clone()
        };
        let cropped =
            imageops::crop_imm(&resolved, crop_margin, 0, width - 2 * crop_margin, height)
                .to_image();
        match self.options.color {
            ColorMode::Grayscale => DynamicImage::ImageLuma8(imageops::grayscale(&cropped)),
            ColorMode::Rgb => DynamicImage::ImageRgb8(cropped),
        }
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        let (width, height) = self.color.dimensions();
        log::debug!(
            "released {}x{} render context after {} frames",
            width,
            height,
            self.frames
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesselshot_mesh::{Triangle, TriangleMesh};
    use vesselshot_test_data::box_facets;

    fn small_options(color: ColorMode) -> RenderOptions {
        RenderOptions {
            width: 96,
            height: 64,
            crop_margin: 16,
            supersample: 2,
            color,
            ..RenderOptions::default()
        }
    }

    fn cube() -> SurfaceMesh {
        SurfaceMesh::from_triangles(
            box_facets([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])
                .into_iter()
                .map(Triangle::from)
                .collect(),
        )
    }

    #[test]
    fn capture_is_cropped() {
        let mesh = cube();
        let ctx = RenderContext::acquire(&small_options(ColorMode::Rgb), &mesh.bounds().unwrap());
        let image = ctx.capture();
        assert_eq!(64, image.width());
        assert_eq!(64, image.height());
    }

    #[test]
    fn empty_frame_is_white() {
        let mesh = cube();
        let ctx = RenderContext::acquire(&small_options(ColorMode::Grayscale), &mesh.bounds().unwrap());
        let image = ctx.capture().into_luma8();
        assert!(image.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn mesh_covers_the_center() {
        let mut mesh = cube();
        mesh.add_field("Curvature", vec![150.0; 8]).unwrap();
        mesh.set_active_scalars(Some("Curvature")).unwrap();
        let colormap = ColorMap::cfd();
        let style = SurfaceStyle {
            clim: (0.0, 150.0),
            ambient: 0.3,
            colormap: &colormap,
        };

        let mut ctx = RenderContext::acquire(&small_options(ColorMode::Rgb), &mesh.bounds().unwrap());
        ctx.draw(&mesh, &style);
        let image = ctx.capture().into_rgb8();

        // The top of the range is red; the corners stay background.
        let center = image.get_pixel(32, 32);
        assert!(center.0[0] > center.0[2], "{:?}", center);
        assert_eq!(&Rgb([255, 255, 255]), image.get_pixel(0, 0));
    }

    #[test]
    fn degenerate_clim_renders_flat() {
        let mut mesh = cube();
        mesh.add_field("Raw", vec![1.0; 8]).unwrap();
        mesh.set_active_scalars(Some("Raw")).unwrap();
        let colormap = ColorMap::cfd();
        let style = SurfaceStyle {
            clim: (0.0, 0.0),
            ambient: 1.0,
            colormap: &colormap,
        };

        let mut ctx = RenderContext::acquire(&small_options(ColorMode::Rgb), &mesh.bounds().unwrap());
        ctx.draw(&mesh, &style);
        let image = ctx.capture().into_rgb8();
        assert_eq!(&to_pixel(SURFACE_COLOR.into()), image.get_pixel(32, 32));
    }
}
