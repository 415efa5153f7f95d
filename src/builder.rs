//! The sweep itself: drains the event queue, growing and shrinking the beach line and recording
//! the edges its breakpoints trace.

use crate::beachline::{BeachLine, NodeIdx};
use crate::diagram::{Diagram, Edge};
use crate::error::{Arena, Trigger, VoronoiError};
use crate::events::{CircleEvent, Event, EventId, EventQueue};
use crate::geometry::{approx_eq, approx_ge, circumcenter_offset, eval_parabola};
use crate::tables::{ArcIdx, ArcTable, EdgeTable, PendingCircle};
use crate::{EdgeIdx, Point, SiteIdx};

/// The state of Fortune's algorithm between two events.
///
/// The sweep line moves towards increasing `y`. The beach line is made of parabolic arcs opening
/// towards decreasing `y`; each breakpoint between two arcs traces an edge of the diagram.
pub struct Sweep<'a> {
    sites: &'a [Point],
    beachline: BeachLine<ArcIdx>,
    arcs: ArcTable,
    edges: EdgeTable,
    events: EventQueue,
    directrix: f32,
    /// Scratch space for the arcs collapsing on the same vertex.
    collapsing: Vec<NodeIdx>,
}

impl<'a> Sweep<'a> {
    /// Size the tables for `sites`, record coincident sites and queue a site event for every
    /// other one.
    pub(crate) fn new(sites: &'a [Point]) -> Result<Self, VoronoiError> {
        let n = sites.len();
        let arc_capacity = (2 * n).saturating_sub(1);
        let edge_capacity = (2 * (3 * n).saturating_sub(6)).max(4 * n);

        let mut sweep = Sweep {
            sites,
            beachline: BeachLine::with_capacity(arc_capacity),
            arcs: ArcTable::with_capacity(arc_capacity),
            edges: EdgeTable::with_capacity(edge_capacity),
            events: EventQueue::with_capacity(2 * n),
            directrix: f32::NEG_INFINITY,
            collapsing: Vec::new(),
        };

        // visit the sites in sweep order, so coincident sites end up next to each other
        let mut order: Vec<SiteIdx> = (0..n as SiteIdx).collect();
        order.sort_by(|&a, &b| sites[a as usize].cmp(&sites[b as usize]).then(a.cmp(&b)));

        let mut canonical: Vec<SiteIdx> = Vec::with_capacity(n);
        for &site in &order {
            let p = sites[site as usize];
            let coincident = canonical.last().copied().filter(|&c| {
                let q = sites[c as usize];
                approx_eq(p.x - q.x, 0.0) && approx_eq(p.y - q.y, 0.0)
            });
            let Some(c) = coincident else {
                canonical.push(site);
                continue;
            };

            tracing::debug!("site {} coincides with site {}", site, c);
            sweep
                .edges
                .push_collapsed(sites[c as usize], c, site)
                .map_err(|arena| sweep.overflow(arena, Trigger::Site(site)))?;
        }

        canonical.sort_unstable();
        for site in canonical {
            sweep
                .events
                .insert(Event::Site(site), sites[site as usize]);
        }

        Ok(sweep)
    }

    /// The current position of the sweep line.
    pub fn directrix(&self) -> f32 {
        self.directrix
    }

    /// The sites of the arcs of the beach line, from left to right.
    pub fn arcs(&self) -> impl Iterator<Item = SiteIdx> + '_ {
        self.beachline.values().map(|arc| self.arcs.site(arc))
    }

    /// The edges found so far.
    pub fn edges(&self) -> &[Edge] {
        self.edges.edges()
    }

    /// End point of each edge so far, [`Point::NAN`] while unresolved.
    pub fn edge_ends(&self) -> &[Point] {
        self.edges.ends()
    }

    /// The event queue, tombstoned entries included.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// The queued circle event of each arc that has one, from left to right.
    pub fn circles(&self) -> impl Iterator<Item = (NodeIdx, EventId)> + '_ {
        self.beachline.iter().filter_map(|node| {
            self.arcs
                .event(self.beachline.value(node))
                .map(|pending| (node, pending.id))
        })
    }

    pub(crate) fn pop_event(&mut self) -> Option<(EventId, Event)> {
        self.events.pop_min()
    }

    /// Process one event. Returns `false` if the event turned out to be stale.
    pub(crate) fn dispatch(&mut self, id: EventId, event: Event) -> Result<bool, VoronoiError> {
        debugln!("event {} {:?} at directrix {}", id, event, self.directrix);
        match event {
            Event::Site(site) => {
                self.directrix = self.sites[site as usize].y;
                self.add_arc(site)?;
            }
            Event::Circle(circle) => {
                let pending = self
                    .beachline
                    .contains(circle.node)
                    .then(|| self.arcs.event(self.beachline.value(circle.node)))
                    .flatten();
                if pending.map(|p| p.id) != Some(id) {
                    tracing::debug!("circle event {} no longer matches its arc", id);
                    return Ok(false);
                }
                self.directrix = circle.y;
                self.remove_arc(id, circle)?;
            }
        }
        Ok(true)
    }

    pub(crate) fn finish(self) -> Diagram {
        let (edges, ends) = self.edges.into_parts();
        Diagram::new(self.sites.to_vec(), edges, ends)
    }

    fn arc_site(&self, arc: ArcIdx) -> Point {
        self.sites[self.arcs.site(arc) as usize]
    }

    fn node_site(&self, node: NodeIdx) -> SiteIdx {
        self.arcs.site(self.beachline.value(node))
    }

    fn overflow(&self, arena: Arena, trigger: Trigger) -> VoronoiError {
        let capacity = match arena {
            Arena::Arcs => self.arcs.capacity(),
            Arena::Edges => self.edges.capacity(),
        };
        VoronoiError::CapacityExceeded {
            arena,
            capacity,
            trigger,
        }
    }

    fn push_arc(&mut self, site: SiteIdx, trigger: Trigger) -> Result<ArcIdx, VoronoiError> {
        self.arcs
            .push(site)
            .map_err(|arena| self.overflow(arena, trigger))
    }

    fn push_edge(
        &mut self,
        start: Point,
        left: SiteIdx,
        right: SiteIdx,
        trigger: Trigger,
    ) -> Result<EdgeIdx, VoronoiError> {
        self.edges
            .push(start, left, right)
            .map_err(|arena| self.overflow(arena, trigger))
    }

    fn push_twins(
        &mut self,
        start: Point,
        left: SiteIdx,
        right: SiteIdx,
        trigger: Trigger,
    ) -> Result<(EdgeIdx, EdgeIdx), VoronoiError> {
        self.edges
            .push_twins(start, left, right)
            .map_err(|arena| self.overflow(arena, trigger))
    }

    /// Find the arcs above `p`: `(Some(n), Some(n))` if `p` is strictly inside the arc of `n`,
    /// `(left, right)` if it is on the breakpoint between two arcs, with `None` meaning there is
    /// no arc on that side.
    fn locate(&self, p: Point) -> (Option<NodeIdx>, Option<NodeIdx>) {
        let focus = |arc| self.arc_site(arc);
        let mut node = self.beachline.root();
        while let Some(n) = node {
            let dl = self.beachline.left_breakpoint(n, self.directrix, focus) - p.x;
            if dl > 0.0 {
                match self.beachline.left(n) {
                    Some(left) => {
                        node = Some(left);
                        continue;
                    }
                    None => return (None, Some(n)),
                }
            }

            let dr = p.x - self.beachline.right_breakpoint(n, self.directrix, focus);
            if dr > 0.0 {
                match self.beachline.right(n) {
                    Some(right) => {
                        node = Some(right);
                        continue;
                    }
                    None => return (Some(n), None),
                }
            }

            if approx_eq(dl, 0.0) {
                return (self.beachline.prev(n), Some(n));
            }
            if approx_eq(dr, 0.0) {
                return (Some(n), self.beachline.next(n));
            }
            return (Some(n), Some(n));
        }
        (None, None)
    }

    fn add_arc(&mut self, site: SiteIdx) -> Result<(), VoronoiError> {
        let p = self.sites[site as usize];
        let located = self.locate(p);
        debugln!("site {} at {:?} is below {:?}", site, p, located);

        match located {
            (None, None) => {
                let arc = self.push_arc(site, Trigger::Site(site))?;
                self.beachline.insert_after(None, arc);
                Ok(())
            }
            (Some(l), Some(r)) if l == r => self.split(l, site),
            (Some(l), None) => match self.beachline.next(l) {
                Some(r) => self.straddle(l, r, site),
                None => self.append_colinear(l, site),
            },
            (None, Some(r)) => match self.beachline.prev(r) {
                Some(l) => self.straddle(l, r, site),
                None => self.prepend_colinear(r, site),
            },
            (Some(l), Some(r)) => self.straddle(l, r, site),
        }
    }

    /// Insert the arc of `site` in the middle of the arc of `node`.
    fn split(&mut self, node: NodeIdx, site: SiteIdx) -> Result<(), VoronoiError> {
        let trigger = Trigger::Site(site);
        let q = self.node_site(node);
        let qp = self.sites[q as usize];
        let p = self.sites[site as usize];

        self.cancel_circle(node);

        let start = Point::new(p.x, eval_parabola(qp.x, qp.y, self.directrix, p.x));
        debugln!("split arc of {} at {:?}", q, start);

        let new_arc = self.push_arc(site, trigger)?;
        let copy_arc = self.push_arc(q, trigger)?;
        let (left_edge, right_edge) = self.push_twins(start, q, site, trigger)?;
        self.arcs.set_edge(new_arc, left_edge);
        self.arcs.set_edge(copy_arc, right_edge);

        let new = self.beachline.insert_after(Some(node), new_arc);
        let copy = self.beachline.insert_after(Some(new), copy_arc);

        self.check_circle(node);
        self.check_circle(copy);
        Ok(())
    }

    /// Insert the arc of `site` exactly on the breakpoint between `l` and `r`.
    fn straddle(&mut self, l: NodeIdx, r: NodeIdx, site: SiteIdx) -> Result<(), VoronoiError> {
        let trigger = Trigger::Site(site);
        let ls = self.node_site(l);
        let rs = self.node_site(r);
        let lp = self.sites[ls as usize];
        let rp = self.sites[rs as usize];
        let p = self.sites[site as usize];

        self.cancel_circle(l);
        self.cancel_circle(r);

        let Some(offset) = circumcenter_offset(lp, p, rp) else {
            return Err(VoronoiError::Inconsistent {
                trigger,
                details: "site on a breakpoint between collinear sites",
            });
        };
        let vertex = lp + offset;
        debugln!("site {} on breakpoint {}-{}, vertex {:?}", site, ls, rs, vertex);

        let r_arc = self.beachline.value(r);
        if let Some(edge) = self.arcs.edge(r_arc) {
            self.edges.resolve(edge, vertex);
        }

        let new_arc = self.push_arc(site, trigger)?;
        let left_edge = self.push_edge(vertex, ls, site, trigger)?;
        let right_edge = self.push_edge(vertex, site, rs, trigger)?;
        self.arcs.set_edge(new_arc, left_edge);
        self.arcs.set_edge(r_arc, right_edge);

        self.beachline.insert_after(Some(l), new_arc);

        self.check_circle(l);
        self.check_circle(r);
        Ok(())
    }

    /// Append the arc of `site` to the right of a beach line made of vertical rays.
    fn append_colinear(&mut self, l: NodeIdx, site: SiteIdx) -> Result<(), VoronoiError> {
        let trigger = Trigger::Site(site);
        let ls = self.node_site(l);
        let lp = self.sites[ls as usize];
        let p = self.sites[site as usize];

        let start = Point::new((lp.x + p.x) / 2.0, f32::NEG_INFINITY);
        debugln!("site {} right of {}, bisector at x = {}", site, ls, start.x);

        let new_arc = self.push_arc(site, trigger)?;
        let (edge, _) = self.push_twins(start, ls, site, trigger)?;
        self.arcs.set_edge(new_arc, edge);
        self.beachline.insert_after(Some(l), new_arc);
        Ok(())
    }

    /// Mirror of [`Sweep::append_colinear`], for a site left of a degenerate first arc.
    fn prepend_colinear(&mut self, r: NodeIdx, site: SiteIdx) -> Result<(), VoronoiError> {
        let trigger = Trigger::Site(site);
        let rs = self.node_site(r);
        let rp = self.sites[rs as usize];
        let p = self.sites[site as usize];

        let start = Point::new((p.x + rp.x) / 2.0, f32::NEG_INFINITY);
        debugln!("site {} left of {}, bisector at x = {}", site, rs, start.x);

        let new_arc = self.push_arc(site, trigger)?;
        let (edge, _) = self.push_twins(start, site, rs, trigger)?;
        self.arcs.set_edge(self.beachline.value(r), edge);
        self.beachline.insert_after(None, new_arc);
        Ok(())
    }

    /// Remove the arc of `circle.node`, together with any neighbor collapsing on the same vertex.
    fn remove_arc(&mut self, id: EventId, circle: CircleEvent) -> Result<(), VoronoiError> {
        let node = circle.node;
        let vertex = circle.vertex();
        let trigger = Trigger::Circle { id, node, vertex };
        let inconsistent = |details| VoronoiError::Inconsistent { trigger, details };

        self.arcs.take_event(self.beachline.value(node));

        let mut prev = self
            .beachline
            .prev(node)
            .ok_or_else(|| inconsistent("collapsing arc has no predecessor"))?;
        let mut next = self
            .beachline
            .next(node)
            .ok_or_else(|| inconsistent("collapsing arc has no successor"))?;

        let mut collapsing = std::mem::take(&mut self.collapsing);
        collapsing.clear();
        collapsing.push(node);
        while self.converges_at(prev, vertex) {
            collapsing.push(prev);
            prev = self
                .beachline
                .prev(prev)
                .ok_or_else(|| inconsistent("collapsing arc has no predecessor"))?;
        }
        while self.converges_at(next, vertex) {
            collapsing.push(next);
            next = self
                .beachline
                .next(next)
                .ok_or_else(|| inconsistent("collapsing arc has no successor"))?;
        }
        if collapsing.len() > 1 {
            debugln!("{} arcs collapse at {:?}", collapsing.len(), vertex);
        }

        for &c in &collapsing {
            let arc = self.beachline.value(c);
            if let Some(edge) = self.arcs.edge(arc) {
                self.edges.resolve(edge, vertex);
            }
            if let Some(after) = self.beachline.next(c) {
                if let Some(edge) = self.arcs.edge(self.beachline.value(after)) {
                    self.edges.resolve(edge, vertex);
                }
            }
            self.cancel_circle(c);
        }
        self.cancel_circle(prev);
        self.cancel_circle(next);

        let ls = self.node_site(prev);
        let rs = self.node_site(next);
        let next = if ls == rs {
            // both sides are pieces of the same arc, which closes over the vertex
            collapsing.push(next);
            let after = self.beachline.next(next);
            if let Some(after) = after {
                self.cancel_circle(after);
            }
            after
        } else {
            let edge = self.push_edge(vertex, ls, rs, trigger)?;
            self.arcs.set_edge(self.beachline.value(next), edge);
            Some(next)
        };

        for &c in &collapsing {
            self.beachline.remove(c);
        }
        self.collapsing = collapsing;

        self.check_circle(prev);
        if let Some(next) = next {
            self.check_circle(next);
        }
        Ok(())
    }

    /// Check if the pending circle event of `node` predicts its disappearance at `vertex`.
    fn converges_at(&self, node: NodeIdx, vertex: Point) -> bool {
        self.arcs
            .event(self.beachline.value(node))
            .is_some_and(|p| {
                let v = p.vertex();
                approx_eq(v.x - vertex.x, 0.0) && approx_eq(v.y - vertex.y, 0.0)
            })
    }

    fn cancel_circle(&mut self, node: NodeIdx) {
        if let Some(pending) = self.arcs.take_event(self.beachline.value(node)) {
            debugln!("tombstone circle event {}", pending.id);
            self.events.tombstone(pending.id);
        }
    }

    /// Predict when the arc of `node` is squeezed out by its neighbors, if ever.
    fn check_circle(&mut self, node: NodeIdx) {
        let (Some(prev), Some(next)) = (self.beachline.prev(node), self.beachline.next(node))
        else {
            return;
        };
        let ls = self.node_site(prev);
        let rs = self.node_site(next);
        if ls == rs {
            return;
        }

        let c = self.sites[self.node_site(node) as usize];
        let l = self.sites[ls as usize];
        let r = self.sites[rs as usize];

        // the breakpoints only converge if the three sites turn clockwise
        if approx_ge((l - c).perp_dot(r - c), 0.0) {
            return;
        }
        let Some(offset) = circumcenter_offset(c, l, r) else {
            return;
        };
        let center = c + offset;
        let y = center.y + offset.length_squared().sqrt();

        self.cancel_circle(node);
        let event = CircleEvent {
            node,
            x: center.x,
            y,
            y_center: center.y,
        };
        let id = self
            .events
            .insert(Event::Circle(event), Point::new(center.x, y));
        debugln!("circle event {} for {:?}: {:?}", id, node, event);

        self.arcs.set_event(
            self.beachline.value(node),
            PendingCircle {
                id,
                x: center.x,
                y_center: center.y,
            },
        );
    }

    /// Validate the beach line and its side tables. Panics on failure.
    #[cfg(any(test, feature = "slow-asserts"))]
    pub(crate) fn check_invariants(&self) {
        self.beachline.check_invariants();

        for node in self.beachline.iter() {
            let arc = self.beachline.value(node);
            if let Some(next) = self.beachline.next(node) {
                assert_ne!(
                    self.arcs.site(arc),
                    self.node_site(next),
                    "two adjacent arcs of the same site"
                );
            }
            if self.beachline.prev(node).is_some() {
                assert!(self.arcs.edge(arc).is_some(), "inner arc without edge");
            }
            if let Some(pending) = self.arcs.event(arc) {
                assert!(
                    self.events.is_live(pending.id),
                    "pending circle event {} was tombstoned",
                    pending.id
                );
            }
        }
    }
}
