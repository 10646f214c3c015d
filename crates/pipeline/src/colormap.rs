//! Scalar to color mapping.

use serde::Deserialize;
use vesselshot_mesh::Vector3;

/// Color of scalars that are not a number.
const NAN_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// Palette used for CFD results, from blue through green to red.
const CFD_PALETTE: [[u8; 3]; 11] = [
    [0, 51, 251],
    [5, 164, 246],
    [2, 244, 255],
    [1, 245, 251],
    [0, 253, 198],
    [4, 250, 122],
    [77, 253, 1],
    [177, 253, 3],
    [247, 254, 1],
    [255, 176, 0],
    [250, 68, 3],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteKind {
    #[default]
    Cfd,
    Binary,
}

/// Evenly spaced color samples over `[0, 1]`, linearly interpolated.
#[derive(Debug, Clone)]
pub struct ColorMap {
    colors: Vec<Vector3>,
}

impl ColorMap {
    /// A map over `colors`, or `None` when there are no colors to sample.
    pub fn new(colors: Vec<Vector3>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    pub fn cfd() -> Self {
        Self {
            colors: CFD_PALETTE
                .iter()
                .map(|c| Vector3::new(c[0] as f32, c[1] as f32, c[2] as f32) / 255.0)
                .collect(),
        }
    }

    /// White to black.
    pub fn binary() -> Self {
        Self {
            colors: vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 0.0)],
        }
    }

    pub fn from_kind(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Cfd => Self::cfd(),
            PaletteKind::Binary => Self::binary(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Samples the map at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vector3 {
        if t.is_nan() {
            return NAN_COLOR.into();
        }
        let t = t.clamp(0.0, 1.0);
        if self.colors.len() == 1 {
            return self.colors[0];
        }
        let n = self.colors.len() - 1;
        let idx = ((t * n as f32).floor() as usize).min(n - 1);
        let frac = t * n as f32 - idx as f32;
        self.colors[idx] + (self.colors[idx + 1] - self.colors[idx]) * frac
    }

    /// Maps `value` through the range `clim`, clamping outside values to the
    /// end colors.
    pub fn map(&self, value: f32, clim: (f32, f32)) -> Vector3 {
        let (lo, hi) = clim;
        self.sample((value - lo) / (hi - lo))
    }
}
