use serde::Deserialize;

/// The per-point quantity a set of images visualises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Transformation {
    /// Bare geometry, no scalar coloring.
    Raw,
    /// Mean curvature computed from the geometry.
    Curvature,
    /// Time averaged wall shear stress.
    Tawss,
    /// Endothelial cell activation potential.
    Ecap,
    /// Oscillatory shear index.
    Osi,
    /// Relative residence time.
    Rrt,
}

/// Lower bound applied to curvature before color mapping.
pub const CURVATURE_FLOOR: f32 = 0.001;

impl Transformation {
    pub const ALL: [Transformation; 6] = [
        Transformation::Raw,
        Transformation::Curvature,
        Transformation::Tawss,
        Transformation::Ecap,
        Transformation::Osi,
        Transformation::Rrt,
    ];

    /// Display name, also used as the output directory and point field name.
    pub fn name(&self) -> &'static str {
        match self {
            Transformation::Raw => "Raw",
            Transformation::Curvature => "Curvature",
            Transformation::Tawss => "TAWSS",
            Transformation::Ecap => "ECAP",
            Transformation::Osi => "OSI",
            Transformation::Rrt => "RRT",
        }
    }

    /// Scalar range mapped onto the color map; values outside are clamped.
    pub fn clim(&self) -> (f32, f32) {
        match self {
            Transformation::Raw => (0.0, 0.0),
            Transformation::Curvature => (0.0, 150.0),
            Transformation::Tawss => (-1.0, 1.0),
            Transformation::Ecap => (0.0, 2.0),
            Transformation::Osi => (0.0, 0.5),
            Transformation::Rrt => (0.0, 10.0),
        }
    }

    /// Ambient light coefficient. Uncolored geometry is lit darker so the
    /// silhouette stays visible against the white background.
    pub fn ambient(&self) -> f32 {
        match self {
            Transformation::Raw => 0.1,
            _ => 0.3,
        }
    }

    /// Substring identifying the CFD column carrying this field, if the field
    /// comes from the CFD results at all.
    pub fn cfd_column(&self) -> Option<&'static str> {
        match self {
            Transformation::Raw | Transformation::Curvature => None,
            _ => Some(self.name()),
        }
    }

    /// TAWSS spans several orders of magnitude and is compressed with a
    /// natural log before color mapping.
    pub fn log_scaled(&self) -> bool {
        matches!(self, Transformation::Tawss)
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Transformation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transformation::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown transformation '{}', expected one of: {}",
                    s,
                    Transformation::ALL.map(|t| t.name()).join(", ")
                )
            })
    }
}

impl TryFrom<String> for Transformation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Ok(Transformation::Tawss), "tawss".parse());
        assert_eq!(Ok(Transformation::Curvature), "Curvature".parse());
        assert!("pressure".parse::<Transformation>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for t in Transformation::ALL {
            assert_eq!(Ok(t), t.to_string().parse());
        }
    }

    #[test]
    fn raw_is_uncolored_and_dim() {
        assert_eq!((0.0, 0.0), Transformation::Raw.clim());
        assert_eq!(0.1, Transformation::Raw.ambient());
        assert_eq!(None, Transformation::Raw.cfd_column());
    }

    #[test]
    fn colored_transformations_share_ambient() {
        for t in Transformation::ALL.into_iter().skip(1) {
            assert_eq!(0.3, t.ambient());
            let (lo, hi) = t.clim();
            assert!(lo < hi, "{} has an empty clim", t);
        }
    }

    #[test]
    fn only_cfd_fields_need_a_table() {
        assert_eq!(None, Transformation::Curvature.cfd_column());
        assert_eq!(Some("TAWSS"), Transformation::Tawss.cfd_column());
        assert_eq!(Some("RRT"), Transformation::Rrt.cfd_column());
        assert!(Transformation::Tawss.log_scaled());
        assert!(!Transformation::Ecap.log_scaled());
    }
}
