use super::{BeachLine, NodeIdx};
use std::fmt::Debug;

impl<T: Copy + Debug> Debug for BeachLine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BeachLine(")?;
        write!(f, "len: {}, ", self.len)?;
        match self.root {
            Some(root) => self.format(f, root)?,
            None => write!(f, "[]")?,
        }
        write!(f, ")")
    }
}

impl<T: Copy + Debug> BeachLine<T> {
    /// Nested `[left value right]` form; red nodes are marked with a `*`.
    fn format(&self, f: &mut std::fmt::Formatter<'_>, node: NodeIdx) -> std::fmt::Result {
        let n = self.node(node);
        write!(f, "[")?;
        if let Some(left) = n.left {
            self.format(f, left)?;
            write!(f, " ")?;
        }
        if n.red {
            write!(f, "*")?;
        }
        write!(f, "{:?}", n.value)?;
        if let Some(right) = n.right {
            write!(f, " ")?;
            self.format(f, right)?;
        }
        write!(f, "]")
    }
}
