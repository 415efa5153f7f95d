use crate::{EdgeIdx, Point, SiteIdx};

/// A half edge of the diagram: a piece of the bisector between the sites `left` and `right`.
///
/// Walking from `start` along [`Edge::direction`], `left` is on the left hand side (with `y`
/// growing downwards, as the sweep goes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Where the edge starts. A `y` of negative infinity means the edge comes from infinitely
    /// far away, with `x` being the horizontal position of the bisector.
    pub start: Point,
    pub left: SiteIdx,
    pub right: SiteIdx,
    /// The half edge traced by the other breakpoint of the same bisector, if the two were born
    /// together.
    pub twin: Option<EdgeIdx>,
}
impl Edge {
    /// Check if `start` is an actual point of the plane.
    pub fn has_bounded_start(&self) -> bool {
        self.start.is_finite()
    }

    /// The direction the edge travels from its start, not normalized.
    pub fn direction(&self, sites: &[Point]) -> Point {
        let l = sites[self.left as usize];
        let r = sites[self.right as usize];
        Point::new(l.y - r.y, r.x - l.x)
    }
}

/// The output of the sweep: the half edges, and the end point of each of them.
///
/// An edge without an end is a ray. Clipping it is up to the caller.
#[derive(Clone, Debug)]
pub struct Diagram {
    sites: Vec<Point>,
    edges: Vec<Edge>,
    ends: Vec<Point>,
}
impl Diagram {
    pub(crate) fn new(sites: Vec<Point>, edges: Vec<Edge>, ends: Vec<Point>) -> Self {
        test_assert!(edges.len() == ends.len());
        Self { sites, edges, ends }
    }

    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx as usize]
    }

    /// The end point of an edge, or `None` if the edge is a ray.
    pub fn edge_end(&self, idx: EdgeIdx) -> Option<Point> {
        let end = self.ends[idx as usize];
        (!end.is_nan()).then_some(end)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every distinct resolved end point, sorted. These are the Voronoi vertices.
    ///
    /// Points are compared exactly, so a vertex computed twice with different rounding shows up
    /// twice.
    pub fn vertices(&self) -> Vec<Point> {
        let mut vertices: Vec<Point> = self.ends.iter().copied().filter(|p| !p.is_nan()).collect();
        vertices.sort();
        vertices.dedup();
        vertices
    }

    /// Check if the edge ends where it starts. This happens between coincident sites, and when a
    /// site reaches the sweep line exactly on a vertex that is closing at that moment.
    pub fn is_zero_length(&self, idx: EdgeIdx) -> bool {
        self.edge_end(idx) == Some(self.edge(idx).start)
    }

    /// The pairs of sites that share an edge, each pair once, smallest index first. These are the
    /// edges of the Delaunay triangulation.
    ///
    /// Zero-length edges are not included, so four or more co-circular sites get no diagonal.
    pub fn delaunay_edges(&self) -> Vec<(SiteIdx, SiteIdx)> {
        let mut pairs: Vec<_> = (0..self.edges.len() as EdgeIdx)
            .filter(|&i| !self.is_zero_length(i))
            .map(|i| {
                let e = self.edge(i);
                (e.left.min(e.right), e.left.max(e.right))
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Returns the edges and their end points, unresolved ends being [`Point::NAN`].
    pub fn into_parts(self) -> (Vec<Edge>, Vec<Point>) {
        (self.edges, self.ends)
    }
}
