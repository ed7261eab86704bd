use std::fmt;

use stepstar_core::Point;

/// Movement costs between adjacent cells.
///
/// Diagonal moves must cost more than straight ones; the defaults (10 and
/// 14) approximate the 1 : √2 Euclidean ratio in integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawStepCosts")
)]
pub struct StepCosts {
    straight: i32,
    diagonal: i32,
}

impl Default for StepCosts {
    fn default() -> Self {
        Self {
            straight: 10,
            diagonal: 14,
        }
    }
}

impl StepCosts {
    /// Costs for a straight and a diagonal move. The straight cost must be
    /// positive and the diagonal one larger.
    pub const fn new(straight: i32, diagonal: i32) -> Result<Self, CostError> {
        if straight <= 0 || diagonal <= straight {
            return Err(CostError { straight, diagonal });
        }
        Ok(Self { straight, diagonal })
    }

    #[inline]
    pub const fn straight(self) -> i32 {
        self.straight
    }

    #[inline]
    pub const fn diagonal(self) -> i32 {
        self.diagonal
    }

    /// Cost of moving from `from` to the adjacent `to`.
    #[inline]
    pub fn step(self, from: Point, to: Point) -> i32 {
        if from.is_aligned_with(to) {
            self.straight
        } else {
            self.diagonal
        }
    }

    /// Heuristic estimate from `from` to `to`: straight-line distance in
    /// straight-cost units.
    #[inline]
    pub fn estimate(self, from: Point, to: Point) -> f64 {
        euclidean(from, to) * f64::from(self.straight)
    }
}

/// Rejected [`StepCosts`] values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CostError {
    pub straight: i32,
    pub diagonal: i32,
}

impl fmt::Display for CostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "costs: diagonal {} must exceed a positive straight cost, got straight {}",
            self.diagonal, self.straight
        )
    }
}

impl std::error::Error for CostError {}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawStepCosts {
    straight: i32,
    diagonal: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawStepCosts> for StepCosts {
    type Error = CostError;

    fn try_from(raw: RawStepCosts) -> Result<Self, CostError> {
        Self::new(raw.straight, raw.diagonal)
    }
}

/// Euclidean (L2) distance between two points.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy)
}
