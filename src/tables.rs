//! Fixed-capacity arenas for the arcs of the beach line and the half edges of the diagram.

use crate::diagram::Edge;
use crate::error::Arena;
use crate::events::EventId;
use crate::{EdgeIdx, Point, SiteIdx};

pub(crate) type ArcIdx = u32;

/// A circle event queued for an arc. Keeps the vertex around so simultaneous convergences can be
/// matched without looking into the queue.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingCircle {
    pub id: EventId,
    pub x: f32,
    pub y_center: f32,
}
impl PendingCircle {
    pub fn vertex(&self) -> Point {
        Point::new(self.x, self.y_center)
    }
}

/// Parallel arrays indexed by [`ArcIdx`].
pub(crate) struct ArcTable {
    site: Vec<SiteIdx>,
    /// The edge traced by the breakpoint on the left of the arc.
    edge: Vec<Option<EdgeIdx>>,
    event: Vec<Option<PendingCircle>>,
    capacity: usize,
}
impl ArcTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            site: Vec::with_capacity(capacity),
            edge: Vec::with_capacity(capacity),
            event: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `Err(Arena::Arcs)` if the table is full.
    pub fn push(&mut self, site: SiteIdx) -> Result<ArcIdx, Arena> {
        if self.site.len() == self.capacity {
            return Err(Arena::Arcs);
        }
        let idx = self.site.len() as ArcIdx;
        self.site.push(site);
        self.edge.push(None);
        self.event.push(None);
        Ok(idx)
    }

    pub fn site(&self, arc: ArcIdx) -> SiteIdx {
        self.site[arc as usize]
    }

    pub fn edge(&self, arc: ArcIdx) -> Option<EdgeIdx> {
        self.edge[arc as usize]
    }

    pub fn set_edge(&mut self, arc: ArcIdx, edge: EdgeIdx) {
        self.edge[arc as usize] = Some(edge);
    }

    pub fn event(&self, arc: ArcIdx) -> Option<PendingCircle> {
        self.event[arc as usize]
    }

    pub fn set_event(&mut self, arc: ArcIdx, event: PendingCircle) {
        self.event[arc as usize] = Some(event);
    }

    pub fn take_event(&mut self, arc: ArcIdx) -> Option<PendingCircle> {
        self.event[arc as usize].take()
    }
}

/// The half edges, with their end points kept apart: starts are known when an edge is created,
/// ends only once a vertex resolves them.
pub(crate) struct EdgeTable {
    edges: Vec<Edge>,
    /// [`Point::NAN`] while unresolved.
    ends: Vec<Point>,
    capacity: usize,
}
impl EdgeTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
            ends: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn ends(&self) -> &[Point] {
        &self.ends
    }

    /// Push an edge with no twin and an unresolved end.
    pub fn push(&mut self, start: Point, left: SiteIdx, right: SiteIdx) -> Result<EdgeIdx, Arena> {
        if self.edges.len() == self.capacity {
            return Err(Arena::Edges);
        }
        let idx = self.edges.len() as EdgeIdx;
        self.edges.push(Edge {
            start,
            left,
            right,
            twin: None,
        });
        self.ends.push(Point::NAN);
        Ok(idx)
    }

    /// Push the two half edges of a bisector, linked as twins. The first one has `left` on its
    /// left, the second is the reverse.
    pub fn push_twins(
        &mut self,
        start: Point,
        left: SiteIdx,
        right: SiteIdx,
    ) -> Result<(EdgeIdx, EdgeIdx), Arena> {
        if self.edges.len() + 2 > self.capacity {
            return Err(Arena::Edges);
        }
        let a = self.push(start, left, right)?;
        let b = self.push(start, right, left)?;
        self.edges[a as usize].twin = Some(b);
        self.edges[b as usize].twin = Some(a);
        Ok((a, b))
    }

    /// Set the end point of `edge`.
    ///
    /// Writing the same vertex again is accepted; a simultaneous convergence reaches some edges
    /// from more than one collapsing arc.
    pub fn resolve(&mut self, edge: EdgeIdx, end: Point) {
        let slot = &mut self.ends[edge as usize];
        test_assert!(
            slot.is_nan() || slot.dist(end) <= 1e-3 * (1.0 + end.x.abs() + end.y.abs()),
            "edge {} resolved twice: {:?} and {:?}",
            edge,
            slot,
            end
        );
        debugln!("resolve edge {} at {:?}", edge, end);
        *slot = end;
    }

    /// Push a zero-length twin pair at `at`, used for coincident sites.
    pub fn push_collapsed(&mut self, at: Point, left: SiteIdx, right: SiteIdx) -> Result<(), Arena> {
        let (a, b) = self.push_twins(at, left, right)?;
        self.resolve(a, at);
        self.resolve(b, at);
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<Edge>, Vec<Point>) {
        (self.edges, self.ends)
    }
}
