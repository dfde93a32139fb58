//! Fixed-capacity storage for everything the registry holds.
//!
//! A byte budget is split evenly across five regions. Each region is a typed
//! slab whose capacity is `budget / (5 * size_of::<T>())`, reserved once at
//! construction. Slabs never grow: a push that would exceed capacity fails
//! and the caller reports *insufficient memory*. Nothing is freed
//! individually; dropping the arena (re-initialization) discards it all.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use crate::matcher::Matcher;
use crate::responder::Responder;

/// Number of regions the budget is divided across.
pub const REGIONS: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════════
// Regions
// ═══════════════════════════════════════════════════════════════════════════════

/// One of the five arena regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Functions,
    Mappings,
    Matchers,
    Responders,
    ListNodes,
}

impl Region {
    /// Every region, in check order.
    pub const ALL: [Region; REGIONS] = [
        Region::Functions,
        Region::Mappings,
        Region::Matchers,
        Region::Responders,
        Region::ListNodes,
    ];

    /// Plural noun used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Region::Functions => "functions",
            Region::Mappings => "mappings",
            Region::Matchers => "matchers",
            Region::Responders => "responders",
            Region::ListNodes => "list nodes",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Occupancy of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionUsage {
    pub region: Region,
    pub used: usize,
    pub capacity: usize,
}

impl RegionUsage {
    /// Slots still free.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

impl fmt::Display for RegionUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.region, self.used, self.capacity)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Handles and slabs
// ═══════════════════════════════════════════════════════════════════════════════

/// Index newtype into a [`Slab`].
pub(crate) trait Handle: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

impl Handle for usize {
    fn from_index(index: usize) -> Self {
        index
    }

    fn index(self) -> usize {
        self
    }
}

macro_rules! handles {
    ($($name:ident),*) => {$(
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub(crate) struct $name(usize);

        impl Handle for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    )*};
}

handles!(FunctionId, MappingId, NodeId);

/// A run of consecutive slots in a slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn range(self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Bump-allocated typed storage with a capacity fixed at construction.
pub(crate) struct Slab<H, T> {
    items: Vec<T>,
    capacity: usize,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Slab<H, T> {
    fn with_budget(budget: usize) -> Self {
        Self::with_capacity(budget / (REGIONS * size_of::<T>().max(1)))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            _handle: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `n` more items fit.
    pub fn has_room(&self, n: usize) -> bool {
        self.capacity - self.items.len() >= n
    }

    /// Append one item, or `None` when full.
    pub fn push(&mut self, item: T) -> Option<H> {
        if !self.has_room(1) {
            return None;
        }
        self.items.push(item);
        Some(H::from_index(self.items.len() - 1))
    }

    /// Append a run of items, or `None` (and nothing appended) when they do
    /// not all fit. The run's length is taken from the iterator's upper
    /// size bound.
    pub fn extend<I>(&mut self, items: I) -> Option<Span>
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        let len = items.size_hint().1?;
        if !self.has_room(len) {
            return None;
        }
        let start = self.items.len();
        self.items.extend(items.take(len));
        Some(Span {
            start,
            len: self.items.len() - start,
        })
    }

    pub fn get(&self, handle: H) -> &T {
        &self.items[handle.index()]
    }

    pub fn get_mut(&mut self, handle: H) -> &mut T {
        &mut self.items[handle.index()]
    }

    pub fn span(&self, span: Span) -> &[T] {
        &self.items[span.range()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (H::from_index(i), item))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Linked lists over the node slab
// ═══════════════════════════════════════════════════════════════════════════════

/// A singly linked list node holding a span of some other slab.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListNode {
    pub item: Span,
    pub next: Option<NodeId>,
}

/// Head and tail of a list whose nodes live in the node slab.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct List {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl List {
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Returns `true` if the list has more than one node.
    pub fn has_many(&self) -> bool {
        self.head.is_some() && self.head != self.tail
    }

    /// Allocate a node for `item` and link it at the end.
    ///
    /// Callers check node capacity up front, so exhaustion here is reported
    /// as `None` rather than panicking.
    pub fn append(&mut self, nodes: &mut Slab<NodeId, ListNode>, item: Span) -> Option<NodeId> {
        let node = nodes.push(ListNode { item, next: None })?;
        self.push_back(nodes, node);
        Some(node)
    }

    /// Link an already allocated node at the end.
    fn push_back(&mut self, nodes: &mut Slab<NodeId, ListNode>, node: NodeId) {
        nodes.get_mut(node).next = None;
        match self.tail {
            Some(tail) => nodes.get_mut(tail).next = Some(node),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    /// Move the head node to the tail.
    pub fn rotate(&mut self, nodes: &mut Slab<NodeId, ListNode>) {
        if !self.has_many() {
            return;
        }
        if let Some(head) = self.head {
            self.head = nodes.get(head).next;
            self.push_back(nodes, head);
        }
    }

    /// Items in list order.
    pub fn iter<'n>(&self, nodes: &'n Slab<NodeId, ListNode>) -> impl Iterator<Item = Span> + 'n {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = nodes.get(cursor?);
            cursor = node.next;
            Some(node.item)
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Stored records
// ═══════════════════════════════════════════════════════════════════════════════

/// A mocked function, identified by name and arity.
#[derive(Debug)]
pub(crate) struct FunctionEntry<'a> {
    pub name: &'a str,
    pub arity: usize,
    /// Nodes whose item is a one-element span of the mapping slab.
    pub mappings: List,
}

/// A matcher run plus its rotating responder groups.
#[derive(Debug)]
pub(crate) struct Mapping {
    /// Ordinary matchers followed by extra matchers.
    pub matchers: Span,
    pub extra: usize,
    /// Nodes whose item is a span of the responder slab.
    pub groups: List,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Arena
// ═══════════════════════════════════════════════════════════════════════════════

/// The five slabs behind a registry.
pub(crate) struct Arena<'a> {
    pub functions: Slab<FunctionId, FunctionEntry<'a>>,
    pub mappings: Slab<MappingId, Mapping>,
    pub matchers: Slab<usize, Matcher<'a>>,
    pub responders: Slab<usize, Responder<'a>>,
    pub nodes: Slab<NodeId, ListNode>,
    budget: usize,
}

impl<'a> Arena<'a> {
    /// Carve `budget` bytes into the five regions.
    pub fn new(budget: usize) -> Self {
        let arena = Self {
            functions: Slab::with_budget(budget),
            mappings: Slab::with_budget(budget),
            matchers: Slab::with_budget(budget),
            responders: Slab::with_budget(budget),
            nodes: Slab::with_budget(budget),
            budget,
        };
        log::debug!(
            "arena initialized with {budget} bytes: {}",
            arena
                .usage()
                .iter()
                .map(|u| format!("{} {}", u.capacity, u.region))
                .collect::<Vec<_>>()
                .join(", ")
        );
        arena
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Used and total slots of one region.
    pub fn region(&self, region: Region) -> RegionUsage {
        let (used, capacity) = match region {
            Region::Functions => (self.functions.len(), self.functions.capacity()),
            Region::Mappings => (self.mappings.len(), self.mappings.capacity()),
            Region::Matchers => (self.matchers.len(), self.matchers.capacity()),
            Region::Responders => (self.responders.len(), self.responders.capacity()),
            Region::ListNodes => (self.nodes.len(), self.nodes.capacity()),
        };
        RegionUsage {
            region,
            used,
            capacity,
        }
    }

    pub fn usage(&self) -> [RegionUsage; REGIONS] {
        Region::ALL.map(|region| self.region(region))
    }
}
