use crate::tree::NodeId;

/// Stable arena index of a [`DomainRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainId(pub(crate) u32);

impl DomainId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-domain statistics and hierarchy links for one complete dot-delimited
/// name.
///
/// The two `freq_*` links serve both frequency lists: the singly-seen bag
/// (match count below [`SINGLE_SEEN_LIMIT`]) and the most-matched list
/// (match count above [`MATCH_LIST_THRESHOLD`]). The thresholds keep the two
/// memberships disjoint, so one link pair is enough.
///
/// [`SINGLE_SEEN_LIMIT`]: crate::tree::SINGLE_SEEN_LIMIT
/// [`MATCH_LIST_THRESHOLD`]: crate::tree::MATCH_LIST_THRESHOLD
#[derive(Debug)]
pub struct DomainRecord {
    /// Labels between the root and this domain; the root record is 0, a TLD
    /// record 1.
    pub(crate) depth: u8,
    /// Times this exact name was inserted.
    pub(crate) match_count: u32,
    /// Distinct strictly-more-specific domains below this one.
    pub(crate) descendant_count: u32,
    /// Distinct characters of the name, recorded on first match when the
    /// caller supplied statistics.
    pub(crate) distinct_chars: u8,
    /// Whitelist marker; permanent once set.
    pub(crate) exception: bool,
    /// Node terminating this domain's own label.
    pub(crate) parent_node: NodeId,
    /// Domain one label up; `None` only for the root record.
    pub(crate) parent_domain: Option<DomainId>,
    /// Dispatch root of the label subtree below this domain, if any name
    /// more specific than this one was inserted.
    pub(crate) child_root: Option<NodeId>,

    // Non-owning neighbor links for the order-statistics lists ("more" points
    // toward the head, i.e. toward higher counts).
    pub(crate) freq_more: Option<DomainId>,
    pub(crate) freq_less: Option<DomainId>,
    pub(crate) fanout_more: Option<DomainId>,
    pub(crate) fanout_less: Option<DomainId>,
}

impl DomainRecord {
    pub(crate) fn new(parent_node: NodeId, parent_domain: Option<DomainId>, depth: u8) -> Self {
        Self {
            depth,
            match_count: 0,
            descendant_count: 0,
            distinct_chars: 0,
            exception: false,
            parent_node,
            parent_domain,
            child_root: None,
            freq_more: None,
            freq_less: None,
            fanout_more: None,
            fanout_less: None,
        }
    }

    /// Times this exact name was inserted.
    pub fn match_count(&self) -> u32 {
        self.match_count
    }

    /// Distinct strictly-more-specific domains below this one.
    pub fn descendant_count(&self) -> u32 {
        self.descendant_count
    }

    /// Labels between the root and this domain (root record is 0).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Distinct characters recorded on the first match, 0 when no statistics
    /// were supplied.
    pub fn distinct_chars(&self) -> u8 {
        self.distinct_chars
    }

    /// Whether this domain is whitelisted.
    pub fn is_exception(&self) -> bool {
        self.exception
    }

    /// Domain one label up; `None` only for the root record.
    pub fn parent_domain(&self) -> Option<DomainId> {
        self.parent_domain
    }
}
