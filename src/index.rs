//! The immutable reference index: the terminator-appended sequence plus
//! the sparse suffix array, its inverse, and the LCP array.
//!
//! Constructed once, read-only afterwards, and therefore safe for
//! unsynchronized concurrent reads during parallel search.

use std::time::Instant;

use tracing::debug;

use crate::{Error, Index, sais, sparse};

/// Alphabet size at the byte level; symbol 0 is the terminator.
pub const ALPHABET: Index = 256;

pub struct ReferenceIndex {
    seq: Vec<u8>,
    factor: Index,
    sparse: Vec<Index>,
    inverse: Vec<Index>,
    lcp: Vec<Index>,
}

impl ReferenceIndex {
    /// Build an index over `text` with the given sparsification factor.
    /// The terminator is appended internally; `text` must not contain the
    /// 0 byte.
    pub fn new(text: &[u8], factor: Index) -> Result<Self, Error> {
        let seq = Self::terminated(text)?;

        let start = Instant::now();
        let symbols: Vec<Index> = seq.iter().map(|&b| b as Index).collect();
        let sa = sais::suffix_array(&symbols, ALPHABET)?;
        debug!(n = seq.len(), elapsed = ?start.elapsed(), "suffix array built");

        Self::from_parts(seq, sa, factor)
    }

    /// Build an index from a precomputed full suffix array, skipping
    /// construction. The array must be the suffix array of `text` with the
    /// terminator appended; being a permutation of `[0, n)` is verified
    /// here, the suffix ordering is trusted.
    pub fn with_suffix_array(text: &[u8], sa: Vec<Index>, factor: Index) -> Result<Self, Error> {
        let seq = Self::terminated(text)?;

        if sa.len() != seq.len() {
            return Err(Error::Internal("suffix array length does not match sequence"));
        }
        let mut seen = vec![false; sa.len()];
        for &p in &sa {
            if p < 0 || p as usize >= seen.len() || seen[p as usize] {
                return Err(Error::Internal("suffix array is not a permutation"));
            }
            seen[p as usize] = true;
        }

        Self::from_parts(seq, sa, factor)
    }

    fn terminated(text: &[u8]) -> Result<Vec<u8>, Error> {
        if text.contains(&0) {
            return Err(Error::InvalidInput("sequence must not contain the 0 byte"));
        }
        let mut seq = text.to_vec();
        seq.push(0);
        Ok(seq)
    }

    fn from_parts(seq: Vec<u8>, sa: Vec<Index>, factor: Index) -> Result<Self, Error> {
        if factor < 1 {
            return Err(Error::InvalidInput("sparsification factor must be positive"));
        }

        let start = Instant::now();
        let sparse = if factor == 1 {
            sa
        } else {
            sparse::to_sparse(&sa, factor)?
        };
        let inverse = sparse::to_inverse(&sparse, factor)?;
        let lcp = sparse::to_lcp(&seq, &sparse, &inverse, factor)?;
        debug!(
            sparse_len = sparse.len(),
            factor,
            elapsed = ?start.elapsed(),
            "sparse index derived"
        );

        Ok(Self { seq, factor, sparse, inverse, lcp })
    }

    /// Reference length, not counting the terminator.
    pub fn len(&self) -> Index {
        self.seq.len() as Index - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sparsification factor.
    pub fn factor(&self) -> Index {
        self.factor
    }

    /// Symbol at `pos`; the terminator 0 sits at `len()`.
    pub fn symbol(&self, pos: Index) -> u8 {
        self.seq[pos as usize]
    }

    /// Length of the sparse suffix, inverse, and LCP arrays.
    pub fn sparse_len(&self) -> Index {
        self.sparse.len() as Index
    }

    /// Start position of the suffix at sparse rank `rank`.
    pub fn suffix(&self, rank: Index) -> Index {
        self.sparse[rank as usize]
    }

    /// Sparse rank of the suffix starting at position `i * factor`.
    pub fn inverse(&self, i: Index) -> Index {
        self.inverse[i as usize]
    }

    /// Shared prefix length (in full characters) between the suffixes at
    /// sparse ranks `rank - 1` and `rank`; -1 at rank 0.
    pub fn lcp(&self, rank: Index) -> Index {
        self.lcp[rank as usize]
    }

    /// The sparse suffix array as a slice.
    pub fn suffixes(&self) -> &[Index] {
        &self.sparse
    }
}
