//! Incrementally maintained order-statistics lists.
//!
//! The detector only ever needs the few "interesting" domains of a window:
//! the most frequently matched names and the heaviest fan-out per depth.
//! Instead of sorting anything globally, each list is an intrusive doubly
//! linked list over the record arena, corrected by one bounded bubble pass
//! per counter event. Between events a list is only approximately sorted;
//! it converges as counters keep arriving, which is all the consumer needs.

use crate::tree::{DomainId, DomainRecord};

/// Head/tail slots of one approximately-sorted list. The head is the entry
/// with the highest key.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RankList {
    pub(crate) head: Option<DomainId>,
    pub(crate) tail: Option<DomainId>,
}

/// Which neighbor-link pair and counter a list ranks by.
pub(crate) trait RankAxis {
    fn key(rec: &DomainRecord) -> u32;
    fn more(rec: &DomainRecord) -> Option<DomainId>;
    fn less(rec: &DomainRecord) -> Option<DomainId>;
    fn set_more(rec: &mut DomainRecord, v: Option<DomainId>);
    fn set_less(rec: &mut DomainRecord, v: Option<DomainId>);
}

/// Most-matched list axis, keyed by `match_count`.
pub(crate) struct ByMatches;

impl RankAxis for ByMatches {
    fn key(rec: &DomainRecord) -> u32 {
        rec.match_count
    }
    fn more(rec: &DomainRecord) -> Option<DomainId> {
        rec.freq_more
    }
    fn less(rec: &DomainRecord) -> Option<DomainId> {
        rec.freq_less
    }
    fn set_more(rec: &mut DomainRecord, v: Option<DomainId>) {
        rec.freq_more = v;
    }
    fn set_less(rec: &mut DomainRecord, v: Option<DomainId>) {
        rec.freq_less = v;
    }
}

/// Most-descendants list axis, keyed by `descendant_count`.
pub(crate) struct ByFanout;

impl RankAxis for ByFanout {
    fn key(rec: &DomainRecord) -> u32 {
        rec.descendant_count
    }
    fn more(rec: &DomainRecord) -> Option<DomainId> {
        rec.fanout_more
    }
    fn less(rec: &DomainRecord) -> Option<DomainId> {
        rec.fanout_less
    }
    fn set_more(rec: &mut DomainRecord, v: Option<DomainId>) {
        rec.fanout_more = v;
    }
    fn set_less(rec: &mut DomainRecord, v: Option<DomainId>) {
        rec.fanout_less = v;
    }
}

/// Note that `id`'s key grew: enter the list at the tail if detached, then
/// bubble toward the head while the head-side neighbor has a strictly
/// smaller key.
///
/// Keys grow by 1 per event, so the loop almost always swaps at most once;
/// it is a local correction, not a resort.
pub(crate) fn promote<A: RankAxis>(domains: &mut [DomainRecord], list: &mut RankList, id: DomainId) {
    if list.head.is_none() && list.tail.is_none() {
        list.head = Some(id);
        list.tail = Some(id);
        return;
    }

    // A record with no neighbors that is not the tail is new here; append it
    // at the low end.
    let rec = &domains[id.index()];
    if A::more(rec).is_none() && A::less(rec).is_none() && list.tail != Some(id) {
        let tail = list.tail.expect("non-empty rank list has a tail");
        A::set_less(&mut domains[tail.index()], Some(id));
        A::set_more(&mut domains[id.index()], Some(tail));
        list.tail = Some(id);
    }

    while let Some(above) = A::more(&domains[id.index()]) {
        if A::key(&domains[above.index()]) >= A::key(&domains[id.index()]) {
            break;
        }
        // Swap `id` with its head-side neighbor.
        let above_more = A::more(&domains[above.index()]);
        let below = A::less(&domains[id.index()]);
        A::set_more(&mut domains[id.index()], above_more);
        A::set_less(&mut domains[above.index()], below);
        A::set_more(&mut domains[above.index()], Some(id));
        A::set_less(&mut domains[id.index()], Some(above));

        match A::more(&domains[id.index()]) {
            Some(m) => A::set_less(&mut domains[m.index()], Some(id)),
            None => list.head = Some(id),
        }
        match A::less(&domains[above.index()]) {
            Some(l) => A::set_more(&mut domains[l.index()], Some(above)),
            None => list.tail = Some(above),
        }
    }
}

/// Push a first-seen record onto the singly-seen bag (unsorted, head
/// insertion, shares the `freq_*` links with the most-matched list).
pub(crate) fn push_single(
    domains: &mut [DomainRecord],
    head: &mut Option<DomainId>,
    id: DomainId,
) {
    match *head {
        None => *head = Some(id),
        Some(old) => {
            domains[id.index()].freq_less = Some(old);
            domains[old.index()].freq_more = Some(id);
            *head = Some(id);
        }
    }
}

/// Unlink a record from the singly-seen bag once it stops being "new".
pub(crate) fn remove_single(
    domains: &mut [DomainRecord],
    head: &mut Option<DomainId>,
    id: DomainId,
) {
    let (more, less) = {
        let rec = &domains[id.index()];
        (rec.freq_more, rec.freq_less)
    };
    match more {
        Some(m) => domains[m.index()].freq_less = less,
        None => *head = less,
    }
    if let Some(l) = less {
        domains[l.index()].freq_more = more;
    }
    let rec = &mut domains[id.index()];
    rec.freq_more = None;
    rec.freq_less = None;
}
