//! Suffix-link simulation over the sparse index.
//!
//! A sparse suffix array carries no explicit suffix-link structure, so the
//! effect of dropping the first `factor` matched characters is emulated
//! arithmetically: both interval endpoints are advanced by one sample via
//! SA and ISA, and the resulting candidate interval is re-expanded with
//! LCP walks until it covers every suffix matching the shallower depth.

use crate::{Index, index::ReferenceIndex, search::MatchInterval};

/// Floor of log2; `x` must be positive.
fn log2i(mut x: Index) -> Index {
    let mut res = -1;
    while x > 0 {
        x >>= 1;
        res += 1;
    }
    res
}

/// Walk the interval bounds outward while adjacent LCP entries stay at or
/// above the interval depth. The walk is capped at `2 * depth * log2(salen)`
/// total steps; past that the link is declared unavailable rather than
/// paying unbounded cost, and the caller rebuilds from the full interval.
fn expand_link(index: &ReferenceIndex, interval: &MatchInterval) -> MatchInterval {
    let depth = interval.matched;
    let salen = index.sparse_len();
    if depth == 0 {
        return MatchInterval::new(0, 0, salen - 1);
    }

    let budget = 2 * depth * log2i(salen);
    let mut spent = 0;
    let mut from = interval.from;
    let mut to = interval.to;

    while from > 0 && index.lcp(from) >= depth {
        spent += 1;
        if spent >= budget {
            return MatchInterval::failed();
        }
        from -= 1;
    }
    while to + 1 < salen && index.lcp(to + 1) >= depth {
        spent += 1;
        if spent >= budget {
            return MatchInterval::failed();
        }
        to += 1;
    }

    MatchInterval::new(depth, from, to)
}

/// Map `interval` at depth `matched` to the interval at depth
/// `matched - factor`, i.e. the interval of the fragment with its first
/// `factor` characters dropped. Returns the failed interval when the link
/// is undefined at this depth or its expansion budget runs out.
pub fn find_suffix_link(index: &ReferenceIndex, interval: &MatchInterval) -> MatchInterval {
    let factor = index.factor();
    let depth = interval.matched - factor;
    if depth <= 0 {
        return MatchInterval::failed();
    }

    // Each endpoint's suffix start is a sparse sample, so advancing by
    // `factor` characters lands exactly on the next sample.
    let from_slot = index.suffix(interval.from) / factor + 1;
    let to_slot = index.suffix(interval.to) / factor + 1;
    if from_slot >= index.sparse_len() || to_slot >= index.sparse_len() {
        return MatchInterval::failed();
    }

    let link = MatchInterval::new(depth, index.inverse(from_slot), index.inverse(to_slot));
    expand_link(index, &link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::find_match_interval;

    #[test]
    fn log2_floor() {
        assert_eq!(log2i(1), 0);
        assert_eq!(log2i(2), 1);
        assert_eq!(log2i(7), 2);
        assert_eq!(log2i(8), 3);
    }

    /// A link followed from the depth-q interval must agree with a direct
    /// search for the fragment at depth q - factor.
    fn assert_link_matches_direct_search(text: &[u8], factor: Index, query: &[u8]) {
        let index = ReferenceIndex::new(text, factor).unwrap();
        let full = MatchInterval::full(&index);

        let deep = find_match_interval(&index, query, 0, &full, query.len() as Index);
        assert_eq!(deep.matched, query.len() as Index, "query must fully match");

        let link = find_suffix_link(&index, &deep);
        let direct = find_match_interval(
            &index,
            &query[factor as usize..],
            0,
            &full,
            query.len() as Index - factor,
        );

        assert_eq!(link, direct);
    }

    #[test]
    fn link_agrees_with_direct_search_dense() {
        assert_link_matches_direct_search(b"banana", 1, b"ana");
        assert_link_matches_direct_search(b"banana", 1, b"nan");
    }

    #[test]
    fn link_agrees_with_direct_search_sparse() {
        assert_link_matches_direct_search(b"AGCTTAGCTAGCT", 2, b"AGCT");
        assert_link_matches_direct_search(b"AGCTTAGCTAGCT", 2, b"GCT");
    }

    #[test]
    fn link_undefined_at_shallow_depth() {
        let index = ReferenceIndex::new(b"banana", 2).unwrap();
        let shallow = MatchInterval::new(2, 1, 1);
        assert!(find_suffix_link(&index, &shallow).is_failed());
    }
}
