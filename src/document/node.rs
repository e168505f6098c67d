//! Stable identity of body elements
//!
//! Every top-level element read from or appended to a [`Document`] carries a
//! [`NodeId`]. Detached copies keep the id, which is how
//! [`Document::update`] finds the node to overwrite.
//!
//! [`Document`]: crate::Document
//! [`Document::update`]: crate::Document::update

use crate::document::{BlockContent, Image, Paragraph, Shape, Table};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Identity of a body element within one document instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    document: u64,
    index: u64,
}

/// Allocates node ids for a single document instance
#[derive(Debug)]
pub(crate) struct NodeAllocator {
    document: u64,
    next: u64,
}

impl NodeAllocator {
    pub(crate) fn new() -> Self {
        Self {
            document: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
            next: 0,
        }
    }

    pub(crate) fn allocate(&mut self) -> NodeId {
        let id = NodeId {
            document: self.document,
            index: self.next,
        };
        self.next += 1;
        id
    }

    pub(crate) fn owns(&self, id: NodeId) -> bool {
        id.document == self.document && id.index < self.next
    }
}

/// Kind of a body element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Table,
    Image,
    Shape,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::Table => "table",
            ElementKind::Image => "image",
            ElementKind::Shape => "shape",
        };
        f.write_str(name)
    }
}

/// A top-level body element that can be appended to and updated in a document
pub trait Element: Clone + 'static {
    /// Kind of this element
    const KIND: ElementKind;

    /// Identity assigned by the owning document, if any
    fn node_id(&self) -> Option<NodeId>;

    #[doc(hidden)]
    fn set_node_id(&mut self, id: NodeId);

    #[doc(hidden)]
    fn into_block(self) -> BlockContent;

    #[doc(hidden)]
    fn from_block(block: &BlockContent) -> Option<&Self>;
}

macro_rules! impl_element {
    ($ty:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$ty;

            fn node_id(&self) -> Option<NodeId> {
                self.node
            }

            fn set_node_id(&mut self, id: NodeId) {
                self.node = Some(id);
            }

            fn into_block(self) -> BlockContent {
                BlockContent::$ty(self)
            }

            fn from_block(block: &BlockContent) -> Option<&Self> {
                match block {
                    BlockContent::$ty(e) => Some(e),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(Paragraph);
impl_element!(Table);
impl_element!(Image);
impl_element!(Shape);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocators_are_disjoint() {
        let mut a = NodeAllocator::new();
        let mut b = NodeAllocator::new();

        let ida = a.allocate();
        let idb = b.allocate();
        assert_ne!(ida, idb);
        assert!(a.owns(ida));
        assert!(!a.owns(idb));
        assert!(!b.owns(ida));
    }

    #[test]
    fn test_unallocated_index_not_owned() {
        let mut a = NodeAllocator::new();
        let id = a.allocate();
        let forged = NodeId {
            index: id.index + 5,
            ..id
        };
        assert!(!a.owns(forged));
    }
}
