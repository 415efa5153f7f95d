//! Voronoi diagrams of planar point sets, computed with Fortune's sweep-line algorithm.
//!
//! The sweep keeps a *beach line* of parabolic arcs ordered left to right in a balanced tree,
//! and a priority queue of site events and (speculative, lazily deleted) circle events. Each
//! breakpoint between two arcs traces a half edge of the diagram; each circle event squeezes an
//! arc out of the beach line and marks a Voronoi vertex.
//!
//! ```
//! use voronoi_beachline::{voronoi, Point};
//!
//! let sites = [Point::new(0.0, 0.0), Point::new(4.0, 1.0), Point::new(2.0, 3.0)];
//! let diagram = voronoi(&sites).unwrap();
//!
//! assert_eq!(diagram.vertices().len(), 1);
//! assert_eq!(diagram.delaunay_edges().len(), 3);
//! ```
//!
//! The output is only the edge table: every half edge has the pair of sites it separates, a
//! start point, and an end point that stays unresolved for rays. Clipping the rays to a bounding
//! box and assembling cell polygons is left to the caller.

use std::cmp::Ordering;

/// Trace-level logging of the sweep internals.
macro_rules! debugln {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Debug-only assertion, for invariants that are too expensive or too noisy to check in release
/// builds.
macro_rules! test_assert {
    ($cond:expr) => {
        #[cfg(all(debug_assertions, not(coverage)))]
        {
            assert!($cond);
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        #[cfg(all(debug_assertions, not(coverage)))]
        {
            assert!($cond, $($arg)*);
        }
    };
}

pub mod beachline;
mod builder;
mod diagram;
mod error;
pub mod events;
pub mod geometry;
mod tables;

#[cfg(test)]
mod test;

pub use builder::Sweep;
pub use diagram::{Diagram, Edge};
pub use error::{Arena, Trigger, VoronoiError};
pub use events::{CircleEvent, Event, EventId};

/// Index of a site in the input slice. A site's index is its identity.
pub type SiteIdx = u32;

/// Index of a half edge in the [`Diagram`].
pub type EdgeIdx = u32;

/// A point in 2D space. It is ordered by `y` first, then by `x`, which is the order the sweep
/// line visits the plane in.
#[derive(PartialEq, Clone, Copy, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}
impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
impl Point {
    /// A Point whose x and y are both NaN. Marks an edge end that was never resolved.
    pub const NAN: Self = Self::new(f32::NAN, f32::NAN);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Check if both coordinates are NaN.
    pub fn is_nan(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn perp_dot(&self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn dist(&self, other: Self) -> f32 {
        (*self - other).length_squared().sqrt()
    }
}
impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Point")
            .field(&self.x)
            .field(&self.y)
            .finish()
    }
}
impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}
impl Eq for Point {}
impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

/// Compute the Voronoi diagram of `sites`.
///
/// Coincident sites are allowed; each extra copy of a site only contributes a pair of
/// zero-length edges. Sites with non-finite coordinates are rejected.
pub fn voronoi(sites: &[Point]) -> Result<Diagram, VoronoiError> {
    fortune_algorithm(sites, &mut |_, _, _| {})
}

/// Fortune's algorithm, reporting progress.
///
/// `on_progress` is called after every event is dispatched, with the state of the sweep and the
/// event that was just handled. The sweep is strictly sequential, so the callback always sees a
/// consistent beach line.
///
/// References:
/// - S.J. Fortune, A sweepline algorithm for Voronoi diagrams, Algorithmica 2 (1987), 153–174.
pub fn fortune_algorithm(
    sites: &[Point],
    on_progress: &mut impl FnMut(&Sweep, EventId, &Event),
) -> Result<Diagram, VoronoiError> {
    if let Some((site, &point)) = sites.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(VoronoiError::NonFiniteSite {
            site: site as SiteIdx,
            point,
        });
    }

    let mut sweep = Sweep::new(sites)?;

    while let Some((id, event)) = sweep.pop_event() {
        if !sweep.dispatch(id, event)? {
            continue;
        }

        #[cfg(any(test, feature = "slow-asserts"))]
        sweep.check_invariants();

        on_progress(&sweep, id, &event);
    }

    Ok(sweep.finish())
}
