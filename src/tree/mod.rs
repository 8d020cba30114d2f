//! Compressed trie over dot-delimited names with per-domain statistics.
//!
//! The tree stores every observed fully-qualified name label-by-label,
//! suffix-first: `mail.example.com` is matched starting from the `m` of
//! `com`, so unrelated subdomains share their TLD and registrable-domain
//! bytes in one radix chain. Each `.` boundary that some inserted name ends
//! on carries a [`DomainRecord`] with match/fan-out counters, and three
//! order-statistics lists keep the "interesting" records reachable in O(1)
//! without rescanning the tree.
//!
//! Nodes and records live in two arenas owned by [`DomainTree`]; all links
//! between them are stable `u32` indices. Nothing is ever deleted below the
//! tree level, so teardown is simply dropping the arenas.

mod domain;
mod node;
mod rank;

pub use domain::{DomainId, DomainRecord};
pub use node::{NodeId, TrieNode};

use serde::{Deserialize, Serialize};

use crate::alphabet::slot_of;
use crate::error::{Result, TrieError};
use crate::stats::CharStats;
use node::TrieNode as Node;
use rank::{promote, push_single, remove_single, ByFanout, ByMatches, RankList};

/// Longest accepted name, in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Number of depth buckets for the most-descendants lists; deeper records
/// share the last bucket.
pub const DEPTH_BUCKETS: usize = 5;

/// A record enters the most-matched list once its match count exceeds this.
pub const MATCH_LIST_THRESHOLD: u32 = 20;

/// A record enters its depth bucket's most-descendants list once its
/// descendant count exceeds this.
pub const FANOUT_LIST_THRESHOLD: u32 = 10;

/// A record leaves the singly-seen bag once its match count reaches this.
pub const SINGLE_SEEN_LIMIT: u32 = 10;

/// Whether a descent refuses to continue below a whitelisted domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExceptionPolicy {
    /// Inserts stop at whitelisted hierarchies and report "no result".
    Block,
    /// Whitelist marking itself descends regardless, so marks are
    /// order-independent.
    Ignore,
}

/// Serializable snapshot of the tree's global counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    /// Total accepted insertions.
    pub insert_total: u64,
    /// Distinct names ever returned by insert.
    pub distinct_domains: u64,
    /// Distinct names still below the singly-seen limit.
    pub singly_seen: u64,
    /// Trie nodes allocated.
    pub node_count: usize,
    /// Domain records allocated (root included).
    pub record_count: usize,
}

/// The domain-name index: radix trie, domain records, counters, and the
/// three order-statistics lists.
pub struct DomainTree {
    nodes: Vec<Node>,
    domains: Vec<DomainRecord>,
    root_node: NodeId,
    root_domain: DomainId,

    insert_total: u64,
    distinct_domains: u64,
    singly_seen_count: u64,

    most_matched: RankList,
    singly_seen_head: Option<DomainId>,
    fanout: [RankList; DEPTH_BUCKETS],
}

impl Default for DomainTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainTree {
    /// Empty tree: a root node with an empty segment owning the root record.
    pub fn new() -> Self {
        let root_node = NodeId(0);
        let root_domain = DomainId(0);

        let mut root = Node::detached();
        root.domain = Some(root_domain);

        // The root record stands for the empty top context; it starts at one
        // match so it never counts as newly seen.
        let mut root_record = DomainRecord::new(root_node, None, 0);
        root_record.match_count = 1;

        Self {
            nodes: vec![root],
            domains: vec![root_record],
            root_node,
            root_domain,
            insert_total: 0,
            distinct_domains: 0,
            singly_seen_count: 0,
            most_matched: RankList::default(),
            singly_seen_head: None,
            fanout: [RankList::default(); DEPTH_BUCKETS],
        }
    }

    /// Index one observed name.
    ///
    /// Returns the record for the name, or `Ok(None)` when the name lies
    /// strictly below a whitelisted domain — such names are deliberately
    /// left unindexed and nothing is mutated. Re-inserting the whitelisted
    /// name itself still counts normally.
    ///
    /// When `stats` is given on a name's first insertion, the distinct
    /// character count is remembered on the record.
    pub fn insert(&mut self, name: &str, stats: Option<&CharStats>) -> Result<Option<DomainId>> {
        let raw = validate(name)?;
        let Some(id) = self.descend_create(raw, ExceptionPolicy::Block) else {
            return Ok(None);
        };
        self.note_match(id, stats);
        Ok(Some(id))
    }

    /// Whitelist a name, creating its record if needed. Permanent and
    /// idempotent; does not count as a match.
    pub fn mark_exception(&mut self, name: &str) -> Result<DomainId> {
        let raw = validate(name)?;
        let id = self
            .descend_create(raw, ExceptionPolicy::Ignore)
            .expect("descent without whitelist blocking always lands on a record");
        self.domains[id.index()].exception = true;
        Ok(id)
    }

    /// Whether exactly this name is whitelisted. Read-only; `false` when the
    /// name was never stored. Ancestor flags are not consulted.
    pub fn is_exception(&self, name: &str) -> Result<bool> {
        let raw = validate(name)?;
        Ok(self
            .find_domain(raw)
            .is_some_and(|id| self.domains[id.index()].exception))
    }

    /// Record with the highest match count, if any crossed the threshold.
    pub fn most_matched_head(&self) -> Option<DomainId> {
        self.most_matched.head
    }

    /// Most-matched list, best first.
    pub fn most_matched_domains(&self) -> impl Iterator<Item = DomainId> + '_ {
        std::iter::successors(self.most_matched.head, move |id| {
            self.domains[id.index()].freq_less
        })
    }

    /// Singly-seen bag, most recently seen first.
    pub fn singly_seen_domains(&self) -> impl Iterator<Item = DomainId> + '_ {
        std::iter::successors(self.singly_seen_head, move |id| {
            self.domains[id.index()].freq_less
        })
    }

    /// A depth bucket's most-descendants list, heaviest first; empty for an
    /// out-of-range bucket.
    pub fn most_descendants_domains(&self, bucket: usize) -> impl Iterator<Item = DomainId> + '_ {
        let head = if bucket < DEPTH_BUCKETS {
            self.fanout[bucket].head
        } else {
            None
        };
        std::iter::successors(head, move |id| self.domains[id.index()].fanout_less)
    }

    /// Record with the most distinct descendants in a depth bucket.
    pub fn most_descendants_head(&self, bucket: usize) -> Option<DomainId> {
        if bucket >= DEPTH_BUCKETS {
            return None;
        }
        self.fanout[bucket].head
    }

    /// Match share of the best most-matched entry whose depth falls in
    /// `bucket`, over all insertions. 0 when the bucket has no entry.
    pub fn most_matched_fraction(&self, bucket: usize) -> f64 {
        if bucket >= DEPTH_BUCKETS || self.insert_total == 0 {
            return 0.0;
        }
        let mut cur = self.most_matched.head;
        while let Some(id) = cur {
            let rec = &self.domains[id.index()];
            if bucket_of(rec.depth) == bucket {
                return f64::from(rec.match_count) / self.insert_total as f64;
            }
            cur = rec.freq_less;
        }
        0.0
    }

    /// Share of all distinct records that sit below the bucket's heaviest
    /// fan-out domain. High values at shallow depth are the tunnel signal.
    pub fn most_descendants_fraction(&self, bucket: usize) -> f64 {
        if bucket >= DEPTH_BUCKETS {
            return 0.0;
        }
        let Some(head) = self.fanout[bucket].head else {
            return 0.0;
        };
        let total = self.domains[self.root_domain.index()].descendant_count;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.domains[head.index()].descendant_count) / f64::from(total)
    }

    /// Rebuild the original inserted text for a record: walk the node chain
    /// of each label group (segments are stored reversed), joining groups
    /// with `.` across domain boundaries.
    pub fn reconstruct(&self, id: DomainId) -> String {
        let mut out: Vec<u8> = Vec::new();
        let mut dom = id;
        while dom != self.root_domain {
            let mut node = self.domains[dom.index()].parent_node;
            loop {
                let n = &self.nodes[node.index()];
                match n.parent {
                    Some(up) => {
                        out.extend(n.segment.iter().rev());
                        node = up;
                    }
                    None => break,
                }
            }
            match self.nodes[node.index()].parent_domain {
                Some(up) => {
                    out.push(b'.');
                    dom = up;
                }
                None => break,
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Record accessor.
    pub fn domain(&self, id: DomainId) -> &DomainRecord {
        &self.domains[id.index()]
    }

    /// The root record (empty top context, depth 0).
    pub fn root(&self) -> DomainId {
        self.root_domain
    }

    /// All records, root included, in allocation order.
    pub fn records(&self) -> impl Iterator<Item = (DomainId, &DomainRecord)> {
        self.domains
            .iter()
            .enumerate()
            .map(|(i, rec)| (DomainId(i as u32), rec))
    }

    /// Counter snapshot for periodic export.
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            insert_total: self.insert_total,
            distinct_domains: self.distinct_domains,
            singly_seen: self.singly_seen_count,
            node_count: self.nodes.len(),
            record_count: self.domains.len(),
        }
    }

    // ---- descent ----------------------------------------------------------

    /// Walk the trie for `input`, creating nodes and records as needed, and
    /// return the terminal record. `None` only under
    /// [`ExceptionPolicy::Block`] when the walk would continue below a
    /// whitelisted domain; in that case nothing has been mutated.
    fn descend_create(&mut self, input: &[u8], policy: ExceptionPolicy) -> Option<DomainId> {
        let mut node = self.root_node;
        let mut parent_dom = self.root_domain;
        let mut rem = input.len();

        loop {
            let seg_len = self.nodes[node.index()].segment.len();
            let mut matched = 0;
            while matched < seg_len
                && rem > 0
                && self.nodes[node.index()].segment[matched] == input[rem - 1]
            {
                matched += 1;
                rem -= 1;
            }

            if matched == 0 {
                // Nothing shared with this node's segment (or no segment to
                // share): branch through the child table. Out-of-alphabet
                // bytes all dispatch through the overflow slot and are told
                // apart one level further down.
                if rem == 0 {
                    return Some(self.ensure_domain(node, parent_dom));
                }
                let slot = slot_of(input[rem - 1]);
                match self.nodes[node.index()].child(slot) {
                    Some(next) => node = next,
                    None => {
                        let fresh = self.new_child(node, slot);
                        return Some(self.grow_chain(fresh, parent_dom, &input[..rem]));
                    }
                }
            } else if matched < seg_len {
                // Partial overlap: split this node at the first mismatch,
                // then continue from the split point.
                let upper = self.split_node(node, matched);
                if rem == 0 || input[rem - 1] == b'.' {
                    let dom = self.ensure_domain(upper, parent_dom);
                    if rem <= 1 {
                        return Some(dom);
                    }
                    // A split always yields a fresh record here, so it cannot
                    // be whitelisted yet.
                    node = self.ensure_child_root(dom);
                    parent_dom = dom;
                    rem -= 1;
                } else {
                    let slot = slot_of(input[rem - 1]);
                    match self.nodes[upper.index()].child(slot) {
                        Some(next) => node = next,
                        None => {
                            let fresh = self.new_child(upper, slot);
                            return Some(self.grow_chain(fresh, parent_dom, &input[..rem]));
                        }
                    }
                }
            } else {
                // Segment fully consumed.
                if rem == 0 {
                    return Some(self.ensure_domain(node, parent_dom));
                }
                if input[rem - 1] == b'.' {
                    let dom = self.ensure_domain(node, parent_dom);
                    if rem == 1 {
                        return Some(dom);
                    }
                    if policy == ExceptionPolicy::Block && self.domains[dom.index()].exception {
                        return None;
                    }
                    node = self.ensure_child_root(dom);
                    parent_dom = dom;
                    rem -= 1;
                } else {
                    let slot = slot_of(input[rem - 1]);
                    match self.nodes[node.index()].child(slot) {
                        Some(next) => node = next,
                        None => {
                            let fresh = self.new_child(node, slot);
                            return Some(self.grow_chain(fresh, parent_dom, &input[..rem]));
                        }
                    }
                }
            }
        }
    }

    /// Read-only twin of [`Self::descend_create`]: follow exactly the path
    /// an insert would take, creating nothing; `None` as soon as the path is
    /// missing.
    fn find_domain(&self, input: &[u8]) -> Option<DomainId> {
        let mut node = self.root_node;
        let mut rem = input.len();

        loop {
            let n = &self.nodes[node.index()];
            let seg_len = n.segment.len();
            let mut matched = 0;
            while matched < seg_len && rem > 0 && n.segment[matched] == input[rem - 1] {
                matched += 1;
                rem -= 1;
            }

            if matched == 0 {
                if rem == 0 {
                    return n.domain;
                }
                node = n.child(slot_of(input[rem - 1]))?;
            } else if matched < seg_len {
                // An insert would have to split here, so this exact name was
                // never stored.
                return None;
            } else {
                if rem == 0 {
                    return n.domain;
                }
                if input[rem - 1] == b'.' {
                    let dom = n.domain?;
                    if rem == 1 {
                        return Some(dom);
                    }
                    node = self.domains[dom.index()].child_root?;
                    rem -= 1;
                } else {
                    node = n.child(slot_of(input[rem - 1]))?;
                }
            }
        }
    }

    // ---- structure edits --------------------------------------------------

    /// Allocate an empty node under `parent` at `slot`.
    fn new_child(&mut self, parent: NodeId, slot: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut fresh = Node::detached();
        fresh.parent = Some(parent);
        self.nodes.push(fresh);
        self.nodes[parent.index()].children_mut()[slot] = Some(id);
        id
    }

    /// Fill a fresh node chain for the whole remaining `input`, one node and
    /// one record per label, and return the terminal record.
    fn grow_chain(&mut self, node: NodeId, parent_dom: DomainId, input: &[u8]) -> DomainId {
        let mut node = node;
        let mut parent = parent_dom;
        let mut rem = input.len();
        loop {
            let label = label_len(&input[..rem]);
            self.nodes[node.index()].segment =
                input[rem - label..rem].iter().rev().copied().collect();
            let dom = self.create_domain(node, parent);
            if rem == label {
                return dom;
            }
            rem -= label + 1; // consume the dot too
            if rem == 0 {
                // Name ended in a lone leading dot; the boundary record is
                // the best terminal there is.
                return dom;
            }
            let sub = self.ensure_child_root(dom);
            node = self.new_child(sub, slot_of(input[rem - 1]));
            parent = dom;
        }
    }

    /// Split `node` at `at`: a new node takes the matched prefix and the
    /// original keeps the remainder, re-parented below it. The replacement
    /// is fully built before any link changes, so the trie never holds a
    /// half-split node.
    fn split_node(&mut self, node: NodeId, at: usize) -> NodeId {
        let parent = self.nodes[node.index()]
            .parent
            .expect("split target always hangs below a parent node");
        let prefix = self.nodes[node.index()].segment[..at].to_vec();
        let rest = self.nodes[node.index()].segment[at..].to_vec();
        let prefix_slot = slot_of(prefix[0]);
        let rest_slot = slot_of(rest[0]);

        let upper = NodeId(self.nodes.len() as u32);
        let mut fresh = Node::detached();
        fresh.segment = prefix;
        fresh.parent = Some(parent);
        self.nodes.push(fresh);
        self.nodes[upper.index()].children_mut()[rest_slot] = Some(node);

        self.nodes[parent.index()].children_mut()[prefix_slot] = Some(upper);
        let lower = &mut self.nodes[node.index()];
        lower.segment = rest;
        lower.parent = Some(upper);
        upper
    }

    /// Record terminating at `node`, created (with ancestor bookkeeping) on
    /// first need.
    fn ensure_domain(&mut self, node: NodeId, parent_dom: DomainId) -> DomainId {
        if let Some(existing) = self.nodes[node.index()].domain {
            return existing;
        }
        self.create_domain(node, parent_dom)
    }

    fn create_domain(&mut self, node: NodeId, parent_dom: DomainId) -> DomainId {
        let depth = self.domains[parent_dom.index()].depth.saturating_add(1);
        let id = DomainId(self.domains.len() as u32);
        self.domains
            .push(DomainRecord::new(node, Some(parent_dom), depth));
        self.nodes[node.index()].domain = Some(id);
        self.note_new_descendant(parent_dom);
        id
    }

    /// Dispatch node below a domain boundary, created on first descent past
    /// that boundary.
    fn ensure_child_root(&mut self, dom: DomainId) -> NodeId {
        if let Some(existing) = self.domains[dom.index()].child_root {
            return existing;
        }
        let id = NodeId(self.nodes.len() as u32);
        let mut fresh = Node::detached();
        fresh.parent_domain = Some(dom);
        self.nodes.push(fresh);
        self.domains[dom.index()].child_root = Some(id);
        id
    }

    // ---- statistics -------------------------------------------------------

    /// Every ancestor gained one distinct descendant; promote the ones whose
    /// fan-out got interesting in their depth bucket's list.
    fn note_new_descendant(&mut self, start: DomainId) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let rec = &mut self.domains[id.index()];
            rec.descendant_count += 1;
            let count = rec.descendant_count;
            let bucket = bucket_of(rec.depth);
            let next = rec.parent_domain;
            if count > FANOUT_LIST_THRESHOLD {
                promote::<ByFanout>(&mut self.domains, &mut self.fanout[bucket], id);
            }
            cur = next;
        }
    }

    /// One more match for `id`: counters, singly-seen membership, and the
    /// most-matched list.
    fn note_match(&mut self, id: DomainId, stats: Option<&CharStats>) {
        self.insert_total += 1;
        self.domains[id.index()].match_count += 1;

        let count = self.domains[id.index()].match_count;
        if count == 1 {
            if let Some(stats) = stats {
                self.domains[id.index()].distinct_chars = stats.distinct_chars.min(255) as u8;
            }
            self.distinct_domains += 1;
            self.singly_seen_count += 1;
            push_single(&mut self.domains, &mut self.singly_seen_head, id);
        } else if count == SINGLE_SEEN_LIMIT {
            self.singly_seen_count -= 1;
            remove_single(&mut self.domains, &mut self.singly_seen_head, id);
        }

        if count > MATCH_LIST_THRESHOLD {
            promote::<ByMatches>(&mut self.domains, &mut self.most_matched, id);
        }
    }
}

/// Depth bucket for the most-descendants lists.
#[inline]
fn bucket_of(depth: u8) -> usize {
    (depth as usize).min(DEPTH_BUCKETS - 1)
}

/// Label length at the end of `input`: bytes after the last `.`, or the
/// whole input when it holds a single label.
#[inline]
fn label_len(input: &[u8]) -> usize {
    input
        .iter()
        .rev()
        .position(|&b| b == b'.')
        .unwrap_or(input.len())
}

fn validate(name: &str) -> Result<&[u8]> {
    if name.is_empty() {
        return Err(TrieError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(TrieError::NameTooLong { length: name.len() });
    }
    Ok(name.as_bytes())
}
