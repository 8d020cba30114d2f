//! Integration tests for the domain index: round trips, counter integrity,
//! whitelist semantics, and the order-statistics lists under realistic
//! insert patterns.

use std::collections::HashMap;

use domain_trie_r::{
    CharStats, DomainId, DomainTree, DEPTH_BUCKETS, FANOUT_LIST_THRESHOLD, MATCH_LIST_THRESHOLD,
    SINGLE_SEEN_LIMIT,
};

fn insert(tree: &mut DomainTree, name: &str) -> DomainId {
    tree.insert(name, None)
        .expect("valid name")
        .expect("not whitelisted")
}

/// Locate a record by its reconstructed name, without touching counters.
fn find_by_name(tree: &DomainTree, name: &str) -> Option<DomainId> {
    tree.records()
        .map(|(id, _)| id)
        .find(|&id| tree.reconstruct(id) == name)
}

#[test]
fn test_round_trip_reconstruction() {
    let mut tree = DomainTree::new();
    let names = [
        "com",
        "example.com",
        "mail.example.com",
        "a.b.c.d.e.f.example.org",
        "xn--80ak6aa92e.com",
        "chunk-00_11.tunnel.example.net",
        "UPPER.Case.Example",
    ];
    for name in names {
        let id = insert(&mut tree, name);
        assert_eq!(tree.reconstruct(id), name, "round trip of {name}");
    }
    // Reconstruction still holds after later inserts reshaped the trie.
    for name in names {
        let id = insert(&mut tree, name);
        assert_eq!(tree.reconstruct(id), name, "second round trip of {name}");
    }
}

#[test]
fn test_idempotent_counting() {
    let mut tree = DomainTree::new();
    let first = insert(&mut tree, "repeat.example.com");
    assert_eq!(tree.domain(first).match_count(), 1);

    let second = insert(&mut tree, "repeat.example.com");
    assert_eq!(first, second, "no second record for the same name");
    assert_eq!(tree.domain(first).match_count(), 2);
    assert_eq!(tree.summary().distinct_domains, 1);
}

#[test]
fn test_hierarchy_integrity() {
    let mut tree = DomainTree::new();
    for name in [
        "a.b.com",
        "c.b.com",
        "b.com",
        "x.y.net",
        "y.net",
        "deep.a.b.com",
        "other.example.org",
    ] {
        insert(&mut tree, name);
    }

    // Depth is always parent depth + 1 (root record is 0).
    for (id, rec) in tree.records() {
        match rec.parent_domain() {
            Some(parent) => {
                assert_eq!(rec.depth(), tree.domain(parent).depth() + 1);
            }
            None => {
                assert_eq!(id, tree.root());
                assert_eq!(rec.depth(), 0);
            }
        }
    }

    // Descendant counts equal the number of records whose parent chain
    // passes through the ancestor.
    let mut expected: HashMap<DomainId, u32> = HashMap::new();
    for (id, _) in tree.records() {
        if id == tree.root() {
            continue;
        }
        let mut cur = tree.domain(id).parent_domain();
        while let Some(ancestor) = cur {
            *expected.entry(ancestor).or_default() += 1;
            cur = tree.domain(ancestor).parent_domain();
        }
    }
    for (id, rec) in tree.records() {
        assert_eq!(
            rec.descendant_count(),
            expected.get(&id).copied().unwrap_or(0),
            "descendant count of {}",
            tree.reconstruct(id)
        );
    }
}

#[test]
fn test_eleven_subdomains_promote_their_parent() {
    let mut tree = DomainTree::new();
    for label in ["a", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"] {
        insert(&mut tree, &format!("{label}.b.com"));
    }

    let bcom = find_by_name(&tree, "b.com").expect("b.com record");
    assert_eq!(tree.domain(bcom).descendant_count(), 11);
    assert!(tree.domain(bcom).descendant_count() > FANOUT_LIST_THRESHOLD);

    // Depth 2 record: bucket 2 of the most-descendants lists.
    assert_eq!(tree.domain(bcom).depth(), 2);
    assert_eq!(tree.most_descendants_head(2), Some(bcom));
    assert!(tree.most_descendants_fraction(2) > 0.0);
}

#[test]
fn test_twenty_one_matches_promote_the_name() {
    let mut tree = DomainTree::new();
    for _ in 0..21 {
        insert(&mut tree, "x.com");
    }
    let xcom = find_by_name(&tree, "x.com").expect("x.com record");
    assert_eq!(tree.domain(xcom).match_count(), 21);
    assert!(tree.domain(xcom).match_count() > MATCH_LIST_THRESHOLD);
    assert_eq!(tree.most_matched_head(), Some(xcom));

    // Twenty matches are not enough for the list.
    let mut tree = DomainTree::new();
    for _ in 0..20 {
        insert(&mut tree, "x.com");
    }
    assert_eq!(tree.most_matched_head(), None);
}

#[test]
fn test_exception_permanence_and_blocking() {
    let mut tree = DomainTree::new();
    tree.mark_exception("cdn.example.com").unwrap();
    assert!(tree.is_exception("cdn.example.com").unwrap());

    // Inserting below the whitelisted name yields no result.
    assert!(tree.insert("a.cdn.example.com", None).unwrap().is_none());
    assert!(tree
        .insert("deep.chain.cdn.example.com", None)
        .unwrap()
        .is_none());

    // The whitelisted name itself keeps counting.
    let id = tree.insert("cdn.example.com", None).unwrap().unwrap();
    let id2 = tree.insert("cdn.example.com", None).unwrap().unwrap();
    assert_eq!(id, id2);
    assert_eq!(tree.domain(id).match_count(), 2);

    // Still flagged after arbitrary other traffic.
    for i in 0..50 {
        insert(&mut tree, &format!("host{i}.example.net"));
    }
    assert!(tree.is_exception("cdn.example.com").unwrap());

    // Ancestors and siblings are unaffected.
    assert!(!tree.is_exception("example.com").unwrap());
    assert!(tree.insert("www.example.com", None).unwrap().is_some());
}

#[test]
fn test_list_soundness_under_mixed_load() {
    let mut tree = DomainTree::new();

    // 40 one-shot names, one name at exactly the singly-seen limit, one hot
    // name, and a fan-out heavy hierarchy.
    for i in 0..40 {
        insert(&mut tree, &format!("once{i}.example.com"));
    }
    for _ in 0..SINGLE_SEEN_LIMIT {
        insert(&mut tree, "warm.example.com");
    }
    for _ in 0..30 {
        insert(&mut tree, "hot.example.com");
    }
    for i in 0..15 {
        insert(&mut tree, &format!("s{i}.fanout.example.net"));
    }

    // Most-matched: every member is above the threshold.
    let matched: Vec<DomainId> = tree.most_matched_domains().collect();
    assert!(!matched.is_empty());
    for id in &matched {
        assert!(tree.domain(*id).match_count() > MATCH_LIST_THRESHOLD);
    }
    assert_eq!(tree.reconstruct(matched[0]), "hot.example.com");

    // Warm (exactly at the limit) and hot (past it) left the singly-seen
    // bag; the 40 + 15 one-shot names remain.
    let singles: Vec<DomainId> = tree.singly_seen_domains().collect();
    assert_eq!(singles.len(), 55);
    for id in &singles {
        let count = tree.domain(*id).match_count();
        assert!(count >= 1 && count < SINGLE_SEEN_LIMIT);
    }

    // Most-descendants buckets: membership implies both threshold and
    // bucket assignment.
    for bucket in 0..DEPTH_BUCKETS {
        for id in tree.most_descendants_domains(bucket) {
            let rec = tree.domain(id);
            assert!(rec.descendant_count() > FANOUT_LIST_THRESHOLD);
            assert_eq!((rec.depth() as usize).min(DEPTH_BUCKETS - 1), bucket);
        }
    }
    let fanout = find_by_name(&tree, "fanout.example.net").unwrap();
    assert_eq!(tree.most_descendants_head(3), Some(fanout));
}

#[test]
fn test_char_stats_recorded_on_first_match_only() {
    let mut tree = DomainTree::new();
    let stats = CharStats::of("ab12.example.com");
    let id = tree.insert("ab12.example.com", Some(&stats)).unwrap().unwrap();
    let recorded = tree.domain(id).distinct_chars();
    assert_eq!(u32::from(recorded), stats.distinct_chars);

    // Later stats do not overwrite the first observation.
    let other = CharStats::of("zzzz");
    tree.insert("ab12.example.com", Some(&other)).unwrap();
    assert_eq!(tree.domain(id).distinct_chars(), recorded);
}

#[test]
fn test_summary_serializes() {
    let mut tree = DomainTree::new();
    insert(&mut tree, "a.example.com");
    insert(&mut tree, "b.example.com");

    let summary = tree.summary();
    let json = serde_json::to_string(&summary).unwrap();
    let back: domain_trie_r::TreeSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
    assert_eq!(back.distinct_domains, 2);
}

#[test]
fn test_teardown_after_heavy_use() {
    // Everything lives in two arenas; dropping the tree releases every node
    // and record exactly once. Build something non-trivial and drop it.
    let mut tree = DomainTree::new();
    for i in 0..1000 {
        let name = format!("h{i:03}.t{}.example.com", i % 7);
        insert(&mut tree, &name);
    }
    let summary = tree.summary();
    assert_eq!(summary.insert_total, 1000);
    assert_eq!(summary.distinct_domains, 1000);
    drop(tree);
}
