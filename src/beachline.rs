//! The beach line: a red-black tree over the arcs, threaded with a doubly linked list in sequence
//! order.
//!
//! The tree is never searched by key. Positions are given explicitly (`insert_after`), and the
//! caller walks it from [`BeachLine::root`] comparing against breakpoints, which move with the
//! sweep line and so cannot be stored in the nodes.
//!
//! Nodes live in an arena and are referenced by [`NodeIdx`]. A removed node is never reused, so a
//! stale index held by a queued event stays harmless: it just reads as detached.

use crate::geometry::{approx_eq, intersect_parabola_x};
use crate::Point;


mod debug;

/// Stable index of a node in a [`BeachLine`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeIdx(u32);
impl NodeIdx {
    fn index(self) -> usize {
        self.0 as usize
    }
}

struct Node<T> {
    value: T,
    parent: Option<NodeIdx>,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
    red: bool,
    attached: bool,
}

pub struct BeachLine<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeIdx>,
    len: usize,
}

impl<T: Copy> BeachLine<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeIdx> {
        self.root
    }

    pub fn value(&self, node: NodeIdx) -> T {
        self.node(node).value
    }

    /// Left child in the tree.
    pub fn left(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node).left
    }

    /// Right child in the tree.
    pub fn right(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node).right
    }

    /// Predecessor in sequence order.
    pub fn prev(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node).prev
    }

    /// Successor in sequence order.
    pub fn next(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node).next
    }

    /// Check if `node` is still part of the beach line.
    pub fn contains(&self, node: NodeIdx) -> bool {
        self.nodes.get(node.index()).is_some_and(|n| n.attached)
    }

    pub fn first(&self) -> Option<NodeIdx> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Iterate over the nodes in sequence order, following the `next` links.
    pub fn iter(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        std::iter::successors(self.first(), |&n| self.next(n))
    }

    /// Iterate over the values in sequence order.
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().map(|n| self.value(n))
    }

    /// Insert `value` right after `after` in sequence order, or as the first element if `after`
    /// is `None`.
    pub fn insert_after(&mut self, after: Option<NodeIdx>, value: T) -> NodeIdx {
        let new = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            value,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            red: true,
            attached: true,
        });
        self.len += 1;

        let parent = match after {
            Some(after) => {
                test_assert!(self.contains(after), "inserting after a detached node");
                let next = self.node(after).next;
                self.node_mut(new).prev = Some(after);
                self.node_mut(new).next = next;
                if let Some(next) = next {
                    self.node_mut(next).prev = Some(new);
                }
                self.node_mut(after).next = Some(new);

                // the in-order successor slot of `after`
                match self.node(after).right {
                    Some(right) => {
                        let parent = self.leftmost(right);
                        self.node_mut(parent).left = Some(new);
                        Some(parent)
                    }
                    None => {
                        self.node_mut(after).right = Some(new);
                        Some(after)
                    }
                }
            }
            None => match self.root {
                Some(root) => {
                    let first = self.leftmost(root);
                    self.node_mut(new).next = Some(first);
                    self.node_mut(first).prev = Some(new);
                    self.node_mut(first).left = Some(new);
                    Some(first)
                }
                None => {
                    self.root = Some(new);
                    None
                }
            },
        };
        self.node_mut(new).parent = parent;

        self.insert_fixup(new);

        #[cfg(feature = "slow-asserts")]
        self.check_invariants();

        new
    }

    /// Detach `node` from the beach line, linking its predecessor and successor to each other.
    pub fn remove(&mut self, node: NodeIdx) {
        test_assert!(self.contains(node), "removing a detached node");
        if !self.contains(node) {
            return;
        }

        let Node {
            parent,
            left,
            right,
            prev,
            next,
            red,
            ..
        } = *self.node(node);

        if let Some(next) = next {
            self.node_mut(next).prev = prev;
        }
        if let Some(prev) = prev {
            self.node_mut(prev).next = next;
        }
        {
            let n = self.node_mut(node);
            n.parent = None;
            n.left = None;
            n.right = None;
            n.prev = None;
            n.next = None;
            n.attached = false;
        }
        self.len -= 1;

        let successor = match (left, right) {
            (None, _) => right,
            (_, None) => left,
            (Some(_), Some(right)) => Some(self.leftmost(right)),
        };
        self.replace_child(parent, node, successor);

        // `x` takes the place of the node that actually left the tree, `x_parent` is its parent.
        let removed_red;
        let x;
        let mut x_parent = parent;
        match (left, right, successor) {
            (Some(left), Some(right), Some(succ)) => {
                removed_red = self.node(succ).red;
                self.node_mut(succ).red = red;
                self.node_mut(succ).left = Some(left);
                self.node_mut(left).parent = Some(succ);
                if succ != right {
                    x_parent = self.node(succ).parent;
                    self.node_mut(succ).parent = parent;
                    x = self.node(succ).right;
                    if let Some(p) = x_parent {
                        self.node_mut(p).left = x;
                    }
                    self.node_mut(succ).right = Some(right);
                    self.node_mut(right).parent = Some(succ);
                } else {
                    self.node_mut(succ).parent = parent;
                    x_parent = Some(succ);
                    x = self.node(succ).right;
                }
            }
            _ => {
                removed_red = red;
                x = successor;
            }
        }
        if let Some(x) = x {
            self.node_mut(x).parent = x_parent;
        }

        if !removed_red {
            if let Some(x) = self.red_node(x) {
                self.node_mut(x).red = false;
            } else {
                self.remove_fixup(x, x_parent);
            }
        }

        #[cfg(feature = "slow-asserts")]
        self.check_invariants();
    }

    /// The x coordinate of the boundary between the arc of `node` and the arc before it.
    ///
    /// `focus` maps a node value to the site that owns the arc.
    pub fn left_breakpoint(
        &self,
        node: NodeIdx,
        directrix: f32,
        focus: impl Fn(T) -> Point,
    ) -> f32 {
        let site = focus(self.value(node));
        if approx_eq(site.y - directrix, 0.0) {
            return site.x;
        }
        let Some(prev) = self.prev(node) else {
            return f32::NEG_INFINITY;
        };
        let left = focus(self.value(prev));
        if approx_eq(left.y - directrix, 0.0) {
            return left.x;
        }
        intersect_parabola_x(left, site, directrix)
    }

    /// The x coordinate of the boundary between the arc of `node` and the arc after it.
    pub fn right_breakpoint(
        &self,
        node: NodeIdx,
        directrix: f32,
        focus: impl Fn(T) -> Point,
    ) -> f32 {
        let site = focus(self.value(node));
        if approx_eq(site.y - directrix, 0.0) {
            return site.x;
        }
        let Some(next) = self.next(node) else {
            return f32::INFINITY;
        };
        let right = focus(self.value(next));
        if approx_eq(right.y - directrix, 0.0) {
            return right.x;
        }
        intersect_parabola_x(site, right, directrix)
    }

    fn node(&self, idx: NodeIdx) -> &Node<T> {
        &self.nodes[idx.index()]
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        &mut self.nodes[idx.index()]
    }

    fn red_node(&self, idx: Option<NodeIdx>) -> Option<NodeIdx> {
        idx.filter(|&i| self.node(i).red)
    }

    fn leftmost(&self, mut node: NodeIdx) -> NodeIdx {
        while let Some(left) = self.node(node).left {
            node = left;
        }
        node
    }

    /// Make `new` take the place of `old` as a child of `parent`, or as the root.
    fn replace_child(&mut self, parent: Option<NodeIdx>, old: NodeIdx, new: Option<NodeIdx>) {
        match parent {
            None => self.root = new,
            Some(p) if self.node(p).left == Some(old) => self.node_mut(p).left = new,
            Some(p) => self.node_mut(p).right = new,
        }
    }

    fn rotate_left(&mut self, x: NodeIdx) {
        let Some(y) = self.node(x).right else {
            return;
        };
        let inner = self.node(y).left;
        self.node_mut(x).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeIdx) {
        let Some(y) = self.node(x).left else {
            return;
        };
        let inner = self.node(y).right;
        self.node_mut(x).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    fn insert_fixup(&mut self, mut node: NodeIdx) {
        while let Some(mut parent) = self.red_node(self.node(node).parent) {
            // a red node is never the root
            let Some(grandma) = self.node(parent).parent else {
                break;
            };

            if self.node(grandma).left == Some(parent) {
                if let Some(uncle) = self.red_node(self.node(grandma).right) {
                    self.node_mut(parent).red = false;
                    self.node_mut(uncle).red = false;
                    self.node_mut(grandma).red = true;
                    node = grandma;
                } else {
                    if self.node(parent).right == Some(node) {
                        self.rotate_left(parent);
                        std::mem::swap(&mut node, &mut parent);
                    }
                    self.node_mut(parent).red = false;
                    self.node_mut(grandma).red = true;
                    self.rotate_right(grandma);
                }
            } else if let Some(uncle) = self.red_node(self.node(grandma).left) {
                self.node_mut(parent).red = false;
                self.node_mut(uncle).red = false;
                self.node_mut(grandma).red = true;
                node = grandma;
            } else {
                if self.node(parent).left == Some(node) {
                    self.rotate_right(parent);
                    std::mem::swap(&mut node, &mut parent);
                }
                self.node_mut(parent).red = false;
                self.node_mut(grandma).red = true;
                self.rotate_left(grandma);
            }
        }

        if let Some(root) = self.root {
            self.node_mut(root).red = false;
        }
    }

    /// Restore the black height after a black node left the tree. `x` (possibly empty) carries an
    /// extra black, and `parent` is its parent.
    fn remove_fixup(&mut self, mut x: Option<NodeIdx>, mut parent: Option<NodeIdx>) {
        while x != self.root {
            let Some(p) = parent else {
                break;
            };

            if self.node(p).left == x {
                // the sibling of a doubly black node always exists
                let Some(mut sibling) = self.node(p).right else {
                    break;
                };
                if self.node(sibling).red {
                    self.node_mut(sibling).red = false;
                    self.node_mut(p).red = true;
                    self.rotate_left(p);
                    let Some(s) = self.node(p).right else {
                        break;
                    };
                    sibling = s;
                }
                let near = self.red_node(self.node(sibling).left);
                let far = self.red_node(self.node(sibling).right);
                if near.is_some() || far.is_some() {
                    if far.is_none() {
                        if let Some(near) = near {
                            self.node_mut(near).red = false;
                        }
                        self.node_mut(sibling).red = true;
                        self.rotate_right(sibling);
                        let Some(s) = self.node(p).right else {
                            break;
                        };
                        sibling = s;
                    }
                    let parent_red = self.node(p).red;
                    self.node_mut(sibling).red = parent_red;
                    self.node_mut(p).red = false;
                    if let Some(far) = self.node(sibling).right {
                        self.node_mut(far).red = false;
                    }
                    self.rotate_left(p);
                    x = self.root;
                    break;
                }
                self.node_mut(sibling).red = true;
            } else {
                let Some(mut sibling) = self.node(p).left else {
                    break;
                };
                if self.node(sibling).red {
                    self.node_mut(sibling).red = false;
                    self.node_mut(p).red = true;
                    self.rotate_right(p);
                    let Some(s) = self.node(p).left else {
                        break;
                    };
                    sibling = s;
                }
                let near = self.red_node(self.node(sibling).right);
                let far = self.red_node(self.node(sibling).left);
                if near.is_some() || far.is_some() {
                    if far.is_none() {
                        if let Some(near) = near {
                            self.node_mut(near).red = false;
                        }
                        self.node_mut(sibling).red = true;
                        self.rotate_left(sibling);
                        let Some(s) = self.node(p).left else {
                            break;
                        };
                        sibling = s;
                    }
                    let parent_red = self.node(p).red;
                    self.node_mut(sibling).red = parent_red;
                    self.node_mut(p).red = false;
                    if let Some(far) = self.node(sibling).left {
                        self.node_mut(far).red = false;
                    }
                    self.rotate_right(p);
                    x = self.root;
                    break;
                }
                self.node_mut(sibling).red = true;
            }

            x = Some(p);
            parent = self.node(p).parent;
            if self.node(p).red {
                break;
            }
        }

        if let Some(x) = x {
            self.node_mut(x).red = false;
        }
    }

    /// Check the whole structure: the in-order traversal matches the linked list, links are
    /// symmetric, and the red-black rules hold.
    #[cfg(any(test, feature = "slow-asserts"))]
    pub fn check_invariants(&self) {
        let mut in_order = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            assert_eq!(self.node(root).parent, None, "root has a parent");
            assert!(!self.node(root).red, "root is red");
            self.check_subtree(root, &mut in_order);
        }
        let linked: Vec<_> = self.iter().collect();
        assert_eq!(in_order, linked, "tree order differs from the linked order");
        assert_eq!(linked.len(), self.len);

        let mut prev = None;
        for &n in &linked {
            assert!(self.node(n).attached);
            assert_eq!(self.node(n).prev, prev, "broken prev link at {:?}", n);
            prev = Some(n);
        }
    }

    /// Returns the black height of the subtree.
    #[cfg(any(test, feature = "slow-asserts"))]
    fn check_subtree(&self, node: NodeIdx, in_order: &mut Vec<NodeIdx>) -> usize {
        let n = self.node(node);
        let mut heights = [0; 2];
        for (i, child) in [n.left, n.right].into_iter().enumerate() {
            let Some(child) = child else {
                if i == 1 {
                    in_order.push(node);
                }
                continue;
            };
            assert_eq!(self.node(child).parent, Some(node), "broken parent link");
            assert!(!(n.red && self.node(child).red), "red node with red child");
            if i == 1 {
                in_order.push(node);
            }
            heights[i] = self.check_subtree(child, in_order);
        }
        assert_eq!(heights[0], heights[1], "unbalanced black height at {:?}", node);
        heights[0] + !n.red as usize
    }
}

impl<T: Copy> Default for BeachLine<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
