use cgmath::{Deg, InnerSpace, Matrix3};

pub type Vector3 = cgmath::Vector3<f32>;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    /// Unnormalized normal; its length is twice the triangle area.
    pub fn scaled_normal(&self) -> Vector3 {
        (self.p1 - self.p0).cross(self.p2 - self.p0)
    }

    /// Unit normal following the counter-clockwise winding, `None` for
    /// degenerate triangles.
    pub fn normal(&self) -> Option<Vector3> {
        let n = self.scaled_normal();
        let len = n.magnitude();
        if len > 0.0 {
            Some(n / len)
        } else {
            None
        }
    }

    pub fn area(&self) -> f32 {
        self.scaled_normal().magnitude() * 0.5
    }
}

impl std::default::Default for Triangle {
    fn default() -> Self {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        Self {
            p0: origin,
            p1: origin,
            p2: origin,
        }
    }
}

impl From<[[f32; 3]; 3]> for Triangle {
    fn from(p: [[f32; 3]; 3]) -> Self {
        Self {
            p0: p[0].into(),
            p1: p[1].into(),
            p2: p[2].into(),
        }
    }
}

/// One of the coordinate axes a mesh can be rotated about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Right-handed rotation of `degrees` about this axis through the origin.
    pub fn rotation(&self, degrees: f32) -> Matrix3<f32> {
        match self {
            Axis::X => Matrix3::from_angle_x(Deg(degrees)),
            Axis::Y => Matrix3::from_angle_y(Deg(degrees)),
            Axis::Z => Matrix3::from_angle_z(Deg(degrees)),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis aligned bounding box.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Bounds {
    pub min: Vector3,
    pub max: Vector3,
}

impl Bounds {
    pub fn from_points<'a, I: IntoIterator<Item = &'a Vector3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: Vector3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
                max: Vector3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
            },
        ))
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Radius of the sphere through the box corners.
    pub fn radius(&self) -> f32 {
        self.extent().magnitude() * 0.5
    }
}
