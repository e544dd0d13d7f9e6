//! Sparse suffix-array index and maximal exact match (MEM) finder.
//!
//! The index is built once over a reference sequence by linear-time
//! induced sorting ([`sais`]), sparsified to positions that are multiples
//! of a factor ([`sparse`]), and then queried for all MEMs of a query
//! string ([`mem`]). Search walks suffix-array intervals by binary search
//! ([`search`]) and simulates the suffix links a sparse index does not
//! have ([`link`]), scanning the factor's residue classes in parallel.

use std::{error, fmt};

pub mod index;
pub mod io;
pub mod link;
pub mod mem;
pub mod sais;
pub mod search;
pub mod sparse;

pub use index::ReferenceIndex;
pub use mem::{Mem, MemSearch, SearchParams, find_mems};
pub use search::{MatchInterval, find_match_interval, match_next_char};

/// Signed index wide enough to address any reference position; -1 is the
/// "no value" sentinel throughout.
pub type Index = i64;

#[derive(Debug)]
pub enum Error {
    /// Rejected caller input; no partial structure is exposed.
    InvalidInput(&'static str),
    /// A broken invariant in the construction or search pipeline;
    /// surfaced as a hard failure, never silently truncated.
    Internal(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Internal(msg) => write!(f, "internal consistency error: {msg}"),
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference MEM enumeration straight from the definition: every
    /// left-maximal match start, extended right as far as it goes.
    fn naive_mems(reference: &[u8], query: &[u8], min_len: usize) -> Vec<Mem> {
        let mut out = Vec::new();
        for i in 0..reference.len() {
            for j in 0..query.len() {
                if reference[i] != query[j] {
                    continue;
                }
                if i > 0 && j > 0 && reference[i - 1] == query[j - 1] {
                    continue;
                }
                let mut len = 0;
                while i + len < reference.len()
                    && j + len < query.len()
                    && reference[i + len] == query[j + len]
                {
                    len += 1;
                }
                if len >= min_len {
                    out.push(Mem {
                        ref_pos: i as Index,
                        query_pos: j as Index,
                        length: len as Index,
                    });
                }
            }
        }
        out.sort_unstable_by_key(|m| (m.length, m.ref_pos, m.query_pos));
        out
    }

    fn search(reference: &[u8], query: &[u8], factor: Index, min_len: Index) -> Vec<Mem> {
        let index = ReferenceIndex::new(reference, factor).unwrap();
        let params = SearchParams::new(min_len).unwrap();
        let result = find_mems(&index, query, &params).unwrap();
        assert!(result.complete);
        result.mems
    }

    #[test]
    fn end_to_end_against_naive_reference() {
        let reference = b"AGCTTAGCTAGCT";
        let query = b"AGCT";
        let expected = naive_mems(reference, query, 4);
        for factor in 1..4 {
            assert_eq!(search(reference, query, factor, 4), expected);
        }
    }

    fn dna(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(prop::sample::select(b"ACGT".to_vec()), len)
    }

    proptest! {
        /// The sparsification factor changes the index, never the MEM set.
        #[test]
        fn factor_does_not_change_results(
            reference in dna(8..48),
            query in dna(4..24),
        ) {
            let expected = naive_mems(&reference, &query, 4);
            for factor in 1..4 {
                prop_assert_eq!(search(&reference, &query, factor, 4), expected.clone());
            }
        }

        /// Queries cut from the reference itself exercise repeat-heavy
        /// match structure.
        #[test]
        fn embedded_query_fragments(
            reference in dna(16..48),
            start in 0usize..8,
            len in 5usize..16,
        ) {
            let end = (start + len).min(reference.len());
            let query = reference[start..end].to_vec();
            if query.len() >= 5 {
                let expected = naive_mems(&reference, &query, 5);
                prop_assert!(!expected.is_empty());
                for factor in 1..4 {
                    prop_assert_eq!(search(&reference, &query, factor, 5), expected.clone());
                }
            }
        }
    }
}
