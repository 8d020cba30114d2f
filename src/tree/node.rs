use crate::alphabet::LABEL_SLOTS;
use crate::tree::DomainId;

/// Stable arena index of a [`TrieNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Child-dispatch table, one slot per character code.
pub(crate) type ChildTable = [Option<NodeId>; LABEL_SLOTS];

/// One node of the compressed trie.
///
/// A node owns a contiguous run of characters shared by everything below it.
/// The run is stored reversed relative to the domain text: names are matched
/// suffix-first (TLD first), so the byte compared first sits at index 0.
#[derive(Debug)]
pub struct TrieNode {
    /// Label segment, reversed; empty only at the root and at the dispatch
    /// node directly below a domain boundary.
    pub(crate) segment: Vec<u8>,
    /// Child table, allocated on first branch.
    pub(crate) children: Option<Box<ChildTable>>,
    /// Parent node; `None` at the root and at dispatch nodes below a domain.
    pub(crate) parent: Option<NodeId>,
    /// Set iff this node is the dispatch root of the label subtree below a
    /// domain boundary. Mutually exclusive with `parent`.
    pub(crate) parent_domain: Option<DomainId>,
    /// Domain record terminating at this node, if its position is a `.`
    /// boundary (or end of name) for some inserted name.
    pub(crate) domain: Option<DomainId>,
}

impl TrieNode {
    /// Fresh node with an empty segment, to be filled by the caller.
    pub(crate) fn detached() -> Self {
        Self {
            segment: Vec::new(),
            children: None,
            parent: None,
            parent_domain: None,
            domain: None,
        }
    }

    #[inline]
    pub(crate) fn child(&self, slot: usize) -> Option<NodeId> {
        self.children.as_ref().and_then(|table| table[slot])
    }

    /// Child table, allocating the full slot array on first use.
    pub(crate) fn children_mut(&mut self) -> &mut ChildTable {
        self.children.get_or_insert_with(|| Box::new([None; LABEL_SLOTS]))
    }
}
