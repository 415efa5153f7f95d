use crate::beachline::NodeIdx;
use crate::events::EventId;
use crate::{Point, SiteIdx};
use std::fmt;
use thiserror::Error;

/// Errors that abort the construction of a [`Diagram`](crate::Diagram).
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum VoronoiError {
    /// One of the pre-sized arenas ran out of room.
    #[error("{arena} arena exceeded its capacity of {capacity} while processing {trigger}")]
    CapacityExceeded {
        /// The arena that overflowed.
        arena: Arena,
        /// The capacity it was sized with.
        capacity: usize,
        /// The event being processed.
        trigger: Trigger,
    },

    /// A site has a NaN or infinite coordinate.
    #[error("site {site} is not finite: {point:?}")]
    NonFiniteSite {
        /// Index of the offending site.
        site: SiteIdx,
        /// Its coordinates.
        point: Point,
    },

    /// The sweep reached a state that violates its own invariants.
    #[error("inconsistent sweep state while processing {trigger}: {details}")]
    Inconsistent {
        /// The event being processed.
        trigger: Trigger,
        /// What went wrong.
        details: &'static str,
    },
}

/// The fixed-capacity tables of the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arena {
    Arcs,
    Edges,
}
impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arena::Arcs => write!(f, "arc"),
            Arena::Edges => write!(f, "edge"),
        }
    }
}

/// The event that was being processed when an error was detected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// The sweep line reached this site.
    Site(SiteIdx),
    /// A circle event removing the arc at `node` fired, at `vertex`.
    Circle {
        id: EventId,
        node: NodeIdx,
        vertex: Point,
    },
}
impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Site(site) => write!(f, "site {}", site),
            Trigger::Circle { id, node, vertex } => {
                write!(
                    f,
                    "circle event {} of {:?} at ({}, {})",
                    id, node, vertex.x, vertex.y
                )
            }
        }
    }
}
