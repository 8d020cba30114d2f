//! Domain Trie - a radix-tree domain-name index for DNS tunnel detection
//!
//! This library stores every observed DNS query name in a compressed trie,
//! label by label and suffix-first, and keeps per-domain statistics that a
//! streaming detector can read in O(1):
//! - match counts (how often was exactly this name queried)
//! - fan-out counts (how many distinct subdomains appeared below a name)
//! - three incrementally maintained order-statistics lists over those
//!   counters (most matched, singly seen, most descendants per depth)
//! - a permanent whitelist (exception) marker per name, with file loading
//!
//! A hierarchy with very high fan-out at shallow depth, queried mostly by
//! never-repeating names, is the classic shape of a DNS tunnel; the fraction
//! queries expose exactly that signal without rescanning the tree.
//!
//! # Example
//!
//! ```rust
//! use domain_trie_r::{CharStats, DomainTree};
//!
//! let mut tree = DomainTree::new();
//!
//! // Whitelisted hierarchies are never indexed below the marked name.
//! tree.mark_exception("telemetry.vendor.example").unwrap();
//! assert!(tree
//!     .insert("x9f2.telemetry.vendor.example", None)
//!     .unwrap()
//!     .is_none());
//!
//! // Ordinary traffic is counted per exact name.
//! for _ in 0..3 {
//!     let stats = CharStats::of("mail.example.com");
//!     tree.insert("mail.example.com", Some(&stats)).unwrap();
//! }
//! let id = tree.insert("mail.example.com", None).unwrap().unwrap();
//! assert_eq!(tree.domain(id).match_count(), 4);
//! assert_eq!(tree.reconstruct(id), "mail.example.com");
//! ```
//!
//! # Matching order
//!
//! Names are consumed from their last character toward the first, so the
//! most general label (the TLD) is matched first and unrelated subdomains
//! share their common suffix bytes in one radix chain. Segments are stored
//! reversed for the same reason; [`DomainTree::reconstruct`] is the exact
//! inverse of [`DomainTree::insert`].

pub mod alphabet;
pub mod error;
pub mod shared;
pub mod stats;
pub mod tree;
pub mod whitelist;

// Re-export commonly used items
pub use alphabet::LABEL_SLOTS;
pub use error::{Result, TrieError};
pub use shared::{SharedDomainTree, DEFAULT_EXCEPTION_CACHE_SIZE};
pub use stats::CharStats;
pub use tree::{
    DomainId, DomainRecord, DomainTree, NodeId, TreeSummary, TrieNode, DEPTH_BUCKETS,
    FANOUT_LIST_THRESHOLD, MATCH_LIST_THRESHOLD, MAX_NAME_LEN, SINGLE_SEEN_LIMIT,
};
pub use whitelist::{load_exceptions, load_exceptions_file};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_workflow() {
        let mut tree = DomainTree::new();

        // Startup: apply the whitelist.
        let whitelist = "
# content delivery, never tunnel candidates
cdn.example.com
static.assets.example.net
";
        assert_eq!(load_exceptions(&mut tree, whitelist).unwrap(), 2);

        // Window: a burst of tunnel-looking traffic below one name plus
        // some ordinary repeat queries.
        for i in 0..12 {
            let name = format!("chunk{i:02x}.exfil.example.org");
            let stats = CharStats::of(&name);
            assert!(tree.insert(&name, Some(&stats)).unwrap().is_some());
        }
        for _ in 0..25 {
            tree.insert("mail.example.org", None).unwrap();
        }

        // Whitelisted hierarchy stays unindexed.
        assert!(tree.insert("deep.cdn.example.com", None).unwrap().is_none());

        // The fan-out signal points at the staging domain.
        let fanout_head = tree.most_descendants_head(3).expect("bucket 3 head");
        assert_eq!(tree.reconstruct(fanout_head), "exfil.example.org");
        assert!(tree.most_descendants_fraction(3) > 0.0);

        // The match signal points at the repeat name.
        let matched_head = tree.most_matched_head().expect("most matched head");
        assert_eq!(tree.reconstruct(matched_head), "mail.example.org");

        // Counters add up: 12 distinct one-shot names plus one busy name.
        let summary = tree.summary();
        assert_eq!(summary.insert_total, 37);
        assert_eq!(summary.distinct_domains, 13);
        assert_eq!(summary.singly_seen, 12);
    }
}
