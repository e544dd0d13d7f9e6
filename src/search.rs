//! Binary-search refinement of suffix-array intervals, one query
//! character at a time.

use crate::{Index, index::ReferenceIndex};

/// A contiguous range `[from, to]` of sparse ranks whose suffixes all
/// share the same first `matched` characters with the current query
/// fragment. `matched == -1` marks a failed search; `from > to` marks an
/// empty interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInterval {
    pub matched: Index,
    pub from: Index,
    pub to: Index,
}

impl MatchInterval {
    pub fn new(matched: Index, from: Index, to: Index) -> Self {
        Self { matched, from, to }
    }

    /// The zero-depth interval spanning every sparse rank.
    pub fn full(index: &ReferenceIndex) -> Self {
        Self::new(0, 0, index.sparse_len() - 1)
    }

    /// The "no match at this depth" sentinel.
    pub fn failed() -> Self {
        Self::new(-1, 0, 0)
    }

    pub fn is_failed(&self) -> bool {
        self.matched < 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Locate one boundary of the sub-interval of `prev` whose suffixes carry
/// `c` at offset `prev.matched`. Two-pointer binary search, biased by a
/// less-than-or-equal comparison for the left boundary and a strict
/// less-than for the right.
fn boundary(index: &ReferenceIndex, c: u8, prev: &MatchInterval, side: Side) -> Index {
    let (mut l, mut r) = (prev.from, prev.to);
    let (probe, lessequal) = match side {
        Side::Left => (l, 1),
        Side::Right => (r, 0),
    };

    // The boundary element may already carry `c`.
    if c == index.symbol(index.suffix(probe) + prev.matched) {
        return probe;
    }

    while r - l > 1 {
        let m = (l + r) / 2;
        if (c as Index) < index.symbol(index.suffix(m) + prev.matched) as Index + lessequal {
            r = m;
        } else {
            l = m;
        }
    }

    match side {
        Side::Left => r,
        Side::Right => l,
    }
}

/// Extend `prev` by the query character at offset `prev.matched`. Returns
/// the failed interval if that character falls outside the character range
/// spanned by the interval's extreme elements, or if no suffix in the
/// interval carries it.
pub fn match_next_char(
    index: &ReferenceIndex,
    query: &[u8],
    query_pos: Index,
    prev: &MatchInterval,
) -> MatchInterval {
    let c = query[(query_pos + prev.matched) as usize];

    // Cheap rejection against the interval's extreme elements.
    if c < index.symbol(index.suffix(prev.from) + prev.matched)
        || c > index.symbol(index.suffix(prev.to) + prev.matched)
    {
        return MatchInterval::failed();
    }

    let from = boundary(index, c, prev, Side::Left);
    let to = boundary(index, c, prev, Side::Right);

    if from <= to {
        MatchInterval::new(prev.matched + 1, from, to)
    } else {
        MatchInterval::failed()
    }
}

/// Repeatedly extend `prev` until the query is exhausted, the interval
/// would become empty (the last non-empty interval is returned), or the
/// match depth reaches `target_length`.
pub fn find_match_interval(
    index: &ReferenceIndex,
    query: &[u8],
    query_pos: Index,
    prev: &MatchInterval,
    target_length: Index,
) -> MatchInterval {
    let qlen = query.len() as Index;
    let mut cur = *prev;
    while cur.matched < target_length && query_pos + cur.matched < qlen {
        let next = match_next_char(index, query, query_pos, &cur);
        if next.is_failed() {
            break;
        }
        cur = next;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ReferenceIndex;

    fn index(text: &[u8], factor: Index) -> ReferenceIndex {
        ReferenceIndex::new(text, factor).unwrap()
    }

    #[test]
    fn single_char_refinement() {
        // banana: sparse ranks $, a$, ana$, anana$, banana$, na$, nana$.
        let idx = index(b"banana", 1);
        let full = MatchInterval::full(&idx);

        let a = match_next_char(&idx, b"a", 0, &full);
        assert_eq!(a, MatchInterval::new(1, 1, 3));

        let b = match_next_char(&idx, b"b", 0, &full);
        assert_eq!(b, MatchInterval::new(1, 4, 4));

        let n = match_next_char(&idx, b"n", 0, &full);
        assert_eq!(n, MatchInterval::new(1, 5, 6));

        // 'z' is above every first character.
        assert!(match_next_char(&idx, b"z", 0, &full).is_failed());
        // 'c' is inside the extreme range but occurs nowhere.
        assert!(match_next_char(&idx, b"c", 0, &full).is_failed());
    }

    #[test]
    fn iterated_refinement_stops_at_target() {
        let idx = index(b"banana", 1);
        let full = MatchInterval::full(&idx);

        let ana = find_match_interval(&idx, b"ana", 0, &full, 3);
        assert_eq!(ana, MatchInterval::new(3, 2, 3));

        // Target below the query length stops early.
        let an = find_match_interval(&idx, b"ana", 0, &full, 2);
        assert_eq!(an, MatchInterval::new(2, 2, 3));
    }

    #[test]
    fn failed_extension_returns_last_interval() {
        let idx = index(b"banana", 1);
        let full = MatchInterval::full(&idx);

        // "anz" matches "an" and then fails; the depth-2 interval remains.
        let m = find_match_interval(&idx, b"anz", 0, &full, 3);
        assert_eq!(m, MatchInterval::new(2, 2, 3));

        // No match at all: the zero-depth full interval comes back.
        let none = find_match_interval(&idx, b"zzz", 0, &full, 3);
        assert_eq!(none, full);
    }

    #[test]
    fn refinement_over_sparse_index() {
        let idx = index(b"banana", 2);
        let full = MatchInterval::full(&idx);

        // Sampled suffixes in rank order: $(6), banana$(0), na$(4), nana$(2).
        let m = find_match_interval(&idx, b"na", 0, &full, 2);
        assert_eq!(m.matched, 2);
        assert_eq!((m.from, m.to), (2, 3));
    }
}
