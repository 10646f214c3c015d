//! Synthetic vessel-like models used by the tests of the other crates.
//!
//! Models are generated in memory rather than checked in so that tests can
//! vary their resolution.

use byteorder::{LittleEndian, WriteBytesExt};

/// Three corners of a facet, counter-clockwise when seen from outside.
pub type Facet = [[f32; 3]; 3];

pub struct TestModel {
    pub facets: Vec<Facet>,
}

impl TestModel {
    pub fn binary_stl(&self) -> Vec<u8> {
        to_binary_stl(&self.facets)
    }

    pub fn ascii_stl(&self) -> String {
        to_ascii_stl("model", &self.facets)
    }
}

/// A 20mm cube with a corner on the origin.
pub fn stl_cube() -> TestModel {
    TestModel {
        facets: box_facets([0.0, 0.0, 0.0], [20.0, 20.0, 20.0]),
    }
}

/// An open cylinder along +z, the closest simple stand-in for a vessel segment.
pub fn stl_tube(radius: f32, length: f32, segments: usize, rings: usize) -> TestModel {
    TestModel {
        facets: tube_facets(radius, length, segments, rings),
    }
}

// Corner indices are bit masks: bit 0 selects max x, bit 1 max y, bit 2 max z.
const BOX_FACETS: [[usize; 3]; 12] = [
    [0b000, 0b010, 0b011],
    [0b000, 0b011, 0b001],
    [0b100, 0b101, 0b111],
    [0b100, 0b111, 0b110],
    [0b000, 0b001, 0b101],
    [0b000, 0b101, 0b100],
    [0b010, 0b110, 0b111],
    [0b010, 0b111, 0b011],
    [0b000, 0b100, 0b110],
    [0b000, 0b110, 0b010],
    [0b001, 0b011, 0b111],
    [0b001, 0b111, 0b101],
];

/// Axis aligned box spanning `min..max` with outward facing facets.
pub fn box_facets(min: [f32; 3], max: [f32; 3]) -> Vec<Facet> {
    let corner = |mask: usize| {
        let mut p = [0.0; 3];
        for (axis, v) in p.iter_mut().enumerate() {
            *v = if mask & (1 << axis) != 0 {
                max[axis]
            } else {
                min[axis]
            };
        }
        p
    };
    BOX_FACETS
        .iter()
        .map(|f| [corner(f[0]), corner(f[1]), corner(f[2])])
        .collect()
}

pub fn tube_facets(radius: f32, length: f32, segments: usize, rings: usize) -> Vec<Facet> {
    let point = |j: usize, k: usize| {
        // Wrap the seam so the first and last column share bit-identical points.
        let theta = 2.0 * std::f32::consts::PI * (j % segments) as f32 / segments as f32;
        let z = length * k as f32 / rings as f32;
        [radius * theta.cos(), radius * theta.sin(), z]
    };
    let mut facets = Vec::with_capacity(segments * rings * 2);
    for k in 0..rings {
        for j in 0..segments {
            facets.push([point(j, k), point(j + 1, k), point(j + 1, k + 1)]);
            facets.push([point(j, k), point(j + 1, k + 1), point(j, k + 1)]);
        }
    }
    facets
}

fn normal(f: &Facet) -> [f32; 3] {
    let u = [f[1][0] - f[0][0], f[1][1] - f[0][1], f[1][2] - f[0][2]];
    let v = [f[2][0] - f[0][0], f[2][1] - f[0][1], f[2][2] - f[0][2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 0.0 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}

/// Encodes facets as a binary STL with an empty header.
pub fn to_binary_stl(facets: &[Facet]) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out.write_u32::<LittleEndian>(facets.len() as u32).unwrap();
    for f in facets {
        for c in normal(f).iter().chain(f.iter().flatten()) {
            out.write_f32::<LittleEndian>(*c).unwrap();
        }
        out.write_u16::<LittleEndian>(0).unwrap();
    }
    out
}

pub fn to_ascii_stl(name: &str, facets: &[Facet]) -> String {
    let mut out = format!("solid {}\n", name);
    for f in facets {
        let n = normal(f);
        out.push_str(&format!("  facet normal {} {} {}\n", n[0], n[1], n[2]));
        out.push_str("    outer loop\n");
        for p in f {
            out.push_str(&format!("      vertex {} {} {}\n", p[0], p[1], p[2]));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {}\n", name));
    out
}
