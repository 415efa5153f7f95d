//! The event schedule: a min-heap of site and circle events ordered by sweep position, with lazy
//! deletion.
//!
//! Circle events are predictions; a later site or circle event can prove one wrong. Instead of
//! searching the heap for the stale entry, its id is tombstoned and [`EventQueue::pop_min`]
//! silently drops it when it surfaces.

use crate::beachline::NodeIdx;
use crate::{Point, SiteIdx};
use std::cmp::Ordering;
use std::fmt;

/// Identity of a queued event. Ids are handed out in insertion order, so they also serve as the
/// final tie-break between events at the same position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventId(u32);
impl EventId {
    fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Event {
    /// The sweep line reaches a site.
    Site(SiteIdx),
    /// The arc held by a beach line node is predicted to shrink to a point.
    Circle(CircleEvent),
}

/// A predicted disappearance of an arc.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CircleEvent {
    /// The beach line node whose arc disappears.
    pub node: NodeIdx,
    /// The x coordinate of the circle center, which is also the x of its lowest point.
    pub x: f32,
    /// The sweep position of the event: the bottom of the circle.
    pub y: f32,
    /// The y coordinate of the circle center. `(x, y_center)` is the Voronoi vertex.
    pub y_center: f32,
}
impl CircleEvent {
    pub fn vertex(&self) -> Point {
        Point::new(self.x, self.y_center)
    }
}

impl Event {
    /// Return the position where this event happens.
    pub fn pos(&self, sites: &[Point]) -> Point {
        match self {
            Event::Site(s) => sites[*s as usize],
            Event::Circle(c) => Point::new(c.x, c.y),
        }
    }
}

struct Entry {
    pos: Point,
    id: EventId,
    event: Event,
}
impl Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pos.cmp(&other.pos).then(self.id.cmp(&other.id))
    }
}

/// Min-heap of events, ordered by `(y, x, id)`.
pub struct EventQueue {
    heap: Vec<Entry>,
    /// Indexed by event id.
    tombstones: Vec<bool>,
}
impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        EventQueue {
            heap: Vec::with_capacity(capacity),
            tombstones: Vec::with_capacity(capacity),
        }
    }

    /// Queue `event`, to happen at `pos`.
    pub fn insert(&mut self, event: Event, pos: Point) -> EventId {
        let id = EventId(self.tombstones.len() as u32);
        self.tombstones.push(false);

        self.heap.push(Entry { pos, id, event });
        self.sift_up(self.heap.len() - 1);
        id
    }

    /// Pop the live event with the smallest sweep position. Returns `None` when the schedule is
    /// exhausted, which ends the sweep.
    pub fn pop_min(&mut self) -> Option<(EventId, Event)> {
        while !self.heap.is_empty() {
            let entry = self.heap.swap_remove(0);
            self.sift_down(0);

            if self.tombstones[entry.id.index()] {
                debugln!("dropping tombstoned event {}", entry.id);
                continue;
            }
            return Some((entry.id, entry.event));
        }
        None
    }

    /// Invalidate a queued event. It stays in the heap until it reaches the top.
    pub fn tombstone(&mut self, id: EventId) {
        self.tombstones[id.index()] = true;
    }

    pub fn is_live(&self, id: EventId) -> bool {
        !self.tombstones[id.index()]
    }

    /// Number of queued entries, tombstoned ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = (i - 1) / 2;
            if self.heap[i].cmp(&self.heap[p]) == Ordering::Less {
                self.heap.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        while 2 * i + 1 < len {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut j = l;
            if r < len && self.heap[r].cmp(&self.heap[l]) == Ordering::Less {
                j = r;
            }
            if self.heap[j].cmp(&self.heap[i]) == Ordering::Less {
                self.heap.swap(i, j);
                i = j;
            } else {
                break;
            }
        }
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(
                self.heap
                    .iter()
                    .filter(|e| !self.tombstones[e.id.index()])
                    .map(|e| (e.id, e.event)),
            )
            .finish()
    }
}
