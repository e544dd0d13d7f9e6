//! Maximal exact match (MEM) enumeration.
//!
//! Each residue class of the sparsification factor is scanned
//! independently: the scan keeps a minimum-length interval and a greedily
//! extended interval, advances through the query `factor` characters per
//! round via simulated suffix links, and collects candidates by walking
//! the LCP array outward and extending anchors leftward. The residue
//! scans share nothing but the immutable index and are merged
//! deterministically afterwards.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    Error, Index,
    index::ReferenceIndex,
    link::find_suffix_link,
    search::{MatchInterval, find_match_interval},
};

/// A maximal exact match: an exact match between query and reference that
/// cannot be extended in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mem {
    pub ref_pos: Index,
    pub query_pos: Index,
    pub length: Index,
}

/// The outcome of a MEM search. When `complete` is false at least one
/// residue scan failed; `mems` still holds everything the surviving scans
/// collected, and it is up to the caller whether to trust the partial set.
#[derive(Debug)]
pub struct MemSearch {
    pub mems: Vec<Mem>,
    pub complete: bool,
}

/// Validated search parameters.
pub struct SearchParams {
    min_len: Index,
    num_threads: Option<usize>,
}

impl SearchParams {
    /// Construct search params for a minimum MEM length and check validity.
    pub fn new(min_len: Index) -> Result<Self, Error> {
        Self::with_threads(min_len, None)
    }

    /// Like `new`, but also caps the number of threads used for the
    /// parallel residue scans. `None` uses all available cores.
    pub fn with_threads(min_len: Index, num_threads: Option<usize>) -> Result<Self, Error> {
        if min_len < 1 {
            return Err(Error::InvalidInput("minimum MEM length must be positive"));
        }
        if num_threads.is_some_and(|n| n < 1) {
            return Err(Error::InvalidInput("thread count must be positive"));
        }
        Ok(Self { min_len, num_threads })
    }

    pub fn min_len(&self) -> Index {
        self.min_len
    }
}

/// Find all MEMs of `query` in the indexed reference with length at least
/// `params.min_len()`. The result set is deduplicated and sorted by
/// (length, reference position, query position), independent of
/// scheduling.
pub fn find_mems(
    index: &ReferenceIndex,
    query: &[u8],
    params: &SearchParams,
) -> Result<MemSearch, Error> {
    if query.is_empty() {
        return Err(Error::InvalidInput("query must not be empty"));
    }
    if query.contains(&0) {
        return Err(Error::InvalidInput("query must not contain the 0 byte"));
    }

    let factor = index.factor();
    let min_len = params.min_len;

    let scan = || {
        (0..factor)
            .into_par_iter()
            .map(|residue| scan_residue(index, query, residue, min_len))
            .collect::<Vec<_>>()
    };
    let results = match params.num_threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|_| Error::Internal("failed to build thread pool"))?
            .install(scan),
        None => scan(),
    };

    let mut mems = Vec::new();
    let mut complete = true;
    for result in results {
        match result {
            Ok(part) => mems.extend(part),
            Err(e) => {
                warn!(error = %e, "residue scan failed, result will be partial");
                complete = false;
            }
        }
    }

    mems.sort_unstable_by_key(|m| (m.length, m.ref_pos, m.query_pos));
    mems.dedup();
    debug!(count = mems.len(), complete, "merged residue scans");

    Ok(MemSearch { mems, complete })
}

fn check_interval(index: &ReferenceIndex, interval: &MatchInterval) -> Result<(), Error> {
    if interval.from < 0 || interval.to >= index.sparse_len() || interval.from > interval.to {
        return Err(Error::Internal("match interval out of bounds"));
    }
    Ok(())
}

/// One residue's scan: `query_pos` starts at `residue` and advances by
/// `factor` each round.
fn scan_residue(
    index: &ReferenceIndex,
    query: &[u8],
    residue: Index,
    min_len: Index,
) -> Result<Vec<Mem>, Error> {
    let factor = index.factor();
    let qlen = query.len() as Index;
    // Anything shorter can no longer reach min_len even with the maximal
    // left extension of factor - 1 characters.
    let min_sparse = min_len - (factor - 1);

    let full = MatchInterval::full(index);
    let mut min_match = full;
    let mut max_match = full;
    let mut out = Vec::new();
    let mut query_pos = residue;

    while query_pos < qlen {
        min_match = find_match_interval(index, query, query_pos, &min_match, min_sparse);
        if min_match.matched > max_match.matched {
            max_match = min_match;
        }

        if min_match.matched <= 1 {
            // Match chain broken; start over at the next offset.
            min_match = full;
            max_match = full;
            query_pos += factor;
            continue;
        }
        check_interval(index, &min_match)?;

        if min_match.matched >= min_sparse {
            max_match = find_match_interval(index, query, query_pos, &max_match, qlen - query_pos);
            check_interval(index, &max_match)?;
            collect_mems(index, query, query_pos, &min_match, &max_match, min_len, &mut out);
        }

        query_pos += factor;
        let min_link = find_suffix_link(index, &min_match);
        let max_link = find_suffix_link(index, &max_match);
        if min_link.is_failed() || max_link.is_failed() {
            min_match = full;
            max_match = full;
        } else {
            min_match = min_link;
            max_match = max_link;
        }
    }

    Ok(out)
}

/// Collect every candidate reachable from the current pair of intervals:
/// all ranks of the deep interval first, then ranks joining at shallower
/// depths as the interval is widened along the LCP array, down to the
/// minimum interval's depth.
fn collect_mems(
    index: &ReferenceIndex,
    query: &[u8],
    query_pos: Index,
    min_match: &MatchInterval,
    max_match: &MatchInterval,
    min_len: Index,
    out: &mut Vec<Mem>,
) {
    for rank in max_match.from..=max_match.to {
        extend_left(index, query, index.suffix(rank), query_pos, max_match.matched, min_len, out);
    }

    let salen = index.sparse_len();
    let mut cur = *max_match;
    while cur.matched >= min_match.matched {
        // Depth at which the interval can next be widened.
        cur.matched = if cur.to + 1 < salen {
            index.lcp(cur.from).max(index.lcp(cur.to + 1))
        } else {
            index.lcp(cur.from)
        };
        if cur.matched >= min_match.matched {
            // Newly joining ranks mismatch the query right after this
            // depth, so they are right-maximal here.
            while index.lcp(cur.from) >= cur.matched {
                cur.from -= 1;
                extend_left(index, query, index.suffix(cur.from), query_pos, cur.matched, min_len, out);
            }
            while cur.to + 1 < salen && index.lcp(cur.to + 1) >= cur.matched {
                cur.to += 1;
                extend_left(index, query, index.suffix(cur.to), query_pos, cur.matched, min_len, out);
            }
        }
    }
}

/// Extend a tentative match leftward up to `factor - 1` characters and
/// record it if it reaches `min_len`. An anchor whose left context matches
/// a full factor of characters is skipped: that match is found by the
/// residue scan anchored one sample to the left.
fn extend_left(
    index: &ReferenceIndex,
    query: &[u8],
    ref_pos: Index,
    query_pos: Index,
    length: Index,
    min_len: Index,
    out: &mut Vec<Mem>,
) {
    let (mut rp, mut qp, mut len) = (ref_pos, query_pos, length);
    for _ in 0..index.factor() {
        let at_boundary = rp == 0 || qp == 0;
        if at_boundary || query[qp as usize - 1] != index.symbol(rp - 1) {
            if len >= min_len {
                out.push(Mem { ref_pos: rp, query_pos: qp, length: len });
            }
            return;
        }
        rp -= 1;
        qp -= 1;
        len += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mems(text: &[u8], factor: Index, query: &[u8], min_len: Index) -> Vec<Mem> {
        let index = ReferenceIndex::new(text, factor).unwrap();
        let params = SearchParams::new(min_len).unwrap();
        let result = find_mems(&index, query, &params).unwrap();
        assert!(result.complete);
        result.mems
    }

    #[test]
    fn finds_every_occurrence() {
        let found = mems(b"AGCTTAGCTAGCT", 1, b"AGCT", 4);
        let expected: Vec<Mem> = [0, 5, 9]
            .iter()
            .map(|&p| Mem { ref_pos: p, query_pos: 0, length: 4 })
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn sparse_results_match_dense_results() {
        let dense = mems(b"AGCTTAGCTAGCT", 1, b"AGCT", 4);
        for factor in 2..4 {
            assert_eq!(mems(b"AGCTTAGCTAGCT", factor, b"AGCT", 4), dense);
        }
    }

    #[test]
    fn interior_match_is_maximal_in_both_directions() {
        // "GATTACA" inside a longer query: the MEM must cover the whole
        // shared region, not just the minimum length.
        let reference = b"TTTTGATTACATTTT";
        let found = mems(reference, 1, b"CGATTACAG", 5);
        assert_eq!(found, vec![Mem { ref_pos: 4, query_pos: 1, length: 7 }]);

        let found_sparse = mems(reference, 2, b"CGATTACAG", 5);
        assert_eq!(found_sparse, vec![Mem { ref_pos: 4, query_pos: 1, length: 7 }]);
    }

    #[test]
    fn min_len_filters_short_matches() {
        let found = mems(b"AGCTTAGCTAGCT", 1, b"AGCT", 5);
        assert!(found.is_empty());
    }

    #[test]
    fn degenerate_inputs_yield_empty_results() {
        // Minimum length longer than the reference.
        assert!(mems(b"ACGT", 1, b"ACGTACGT", 6).is_empty());
        // Query shorter than the minimum length.
        assert!(mems(b"AGCTTAGCTAGCT", 2, b"AG", 4).is_empty());
        // Terminator-only reference.
        assert!(mems(b"", 1, b"ACGT", 2).is_empty());
    }

    #[test]
    fn rejects_invalid_search_input() {
        let index = ReferenceIndex::new(b"ACGT", 1).unwrap();
        assert!(SearchParams::new(0).is_err());
        assert!(SearchParams::with_threads(4, Some(0)).is_err());
        let params = SearchParams::new(2).unwrap();
        assert!(find_mems(&index, b"", &params).is_err());
        assert!(find_mems(&index, b"AC\0GT", &params).is_err());
    }

    #[test]
    fn thread_cap_is_respected() {
        let index = ReferenceIndex::new(b"AGCTTAGCTAGCT", 2).unwrap();
        let params = SearchParams::with_threads(4, Some(1)).unwrap();
        let result = find_mems(&index, b"AGCT", &params).unwrap();
        assert!(result.complete);
        assert_eq!(result.mems.len(), 3);
    }
}
