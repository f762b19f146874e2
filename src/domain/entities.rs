//! Domain entities: weights, masses and attachments

use std::fmt;

use generational_arena::Index;

use crate::domain::error::{DomainError, DomainResult};

/// Arena handle of a beam shape.
pub type BeamId = Index;

/// Load carried by a pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mass {
    Known(f64),
    /// Placeholder to be solved via the equilibrium constraint
    Unknown,
}

impl Mass {
    /// Marker used in puzzle files for a pan whose mass must be inferred.
    pub const UNKNOWN_MARKER: f64 = -1.0;

    /// Mass value, with `Unknown` counting as zero.
    pub fn value_or_zero(&self) -> f64 {
        match self {
            Mass::Known(m) => *m,
            Mass::Unknown => 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Mass::Unknown)
    }
}

impl fmt::Display for Mass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mass::Known(m) => write!(f, "{}", m),
            Mass::Unknown => write!(f, "?"),
        }
    }
}

/// Which side of the pivot something hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Negative offsets hang left; everything else (including 0) hangs right.
    pub fn of(distance: f64) -> Self {
        if distance < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// A leaf load at a fixed signed offset from a pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    distance: f64,
    mass: Mass,
}

impl Weight {
    /// Create a weight, rejecting pivot placement and negative or non-finite masses.
    pub fn new(distance: f64, mass: Mass) -> DomainResult<Self> {
        if distance == 0.0 || !distance.is_finite() {
            return Err(DomainError::ZeroDistance);
        }
        if let Mass::Known(m) = mass {
            if !m.is_finite() || m < 0.0 {
                return Err(DomainError::InvalidMass { distance, mass: m });
            }
        }
        Ok(Self { distance, mass })
    }

    pub fn known(distance: f64, mass: f64) -> DomainResult<Self> {
        Self::new(distance, Mass::Known(mass))
    }

    pub fn unknown(distance: f64) -> DomainResult<Self> {
        Self::new(distance, Mass::Unknown)
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    pub fn side(&self) -> Side {
        Side::of(self.distance)
    }

    /// `distance * mass`; an unresolved weight contributes no torque.
    pub fn torque(&self) -> f64 {
        match self.mass {
            Mass::Known(m) => self.distance * m,
            Mass::Unknown => 0.0,
        }
    }

    /// Copy of this weight carrying a known mass.
    pub fn resolve(&self, mass: f64) -> DomainResult<Self> {
        Self::known(self.distance, mass)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dist: {} wt: {}", self.distance, self.mass)
    }
}

/// A child beam hung from its parent at a signed distance.
///
/// The position belongs to the attachment, not to the beam, so one beam shape
/// can hang at several places without its offsets interfering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub beam: BeamId,
    pub distance: f64,
}

impl Attachment {
    pub fn side(&self) -> Side {
        Side::of(self.distance)
    }
}

/// Left and right torque sums of one beam.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TorqueSplit {
    pub left: f64,
    pub right: f64,
}

impl TorqueSplit {
    /// Net torque; zero means the beam is in equilibrium.
    pub fn net(&self) -> f64 {
        self.left + self.right
    }

    pub fn is_balanced(&self, tolerance: f64) -> bool {
        self.net().abs() <= tolerance
    }
}
