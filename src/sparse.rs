//! Derivation of the sparse suffix array, its inverse, and the LCP array
//! over sparse ranks.
//!
//! The sparse suffix array keeps only suffixes starting at multiples of the
//! sparsification factor. Its inverse maps `position / factor` back to the
//! sparse rank, and the LCP array stores shared-prefix lengths (in full
//! characters) between rank-adjacent sparse suffixes.

use crate::{Error, Index};

fn check_factor(factor: Index) -> Result<(), Error> {
    if factor < 1 {
        return Err(Error::InvalidInput("sparsification factor must be positive"));
    }
    Ok(())
}

/// Filter a full suffix array down to the suffixes starting at multiples
/// of `factor`, preserving rank order. The result has exactly
/// `(n - 1) / factor + 1` entries.
pub fn to_sparse(sa: &[Index], factor: Index) -> Result<Vec<Index>, Error> {
    if sa.is_empty() {
        return Err(Error::InvalidInput("suffix array must not be empty"));
    }
    check_factor(factor)?;

    let n = sa.len() as Index;
    let capacity = ((n - 1) / factor + 1) as usize;
    let mut sparse = Vec::with_capacity(capacity);
    for &p in sa {
        if p % factor == 0 {
            if sparse.len() == capacity {
                return Err(Error::Internal("sparse suffix array exceeds expected capacity"));
            }
            sparse.push(p);
        }
    }
    Ok(sparse)
}

/// Invert a sparse suffix array: `inverse[p / factor]` is the sparse rank
/// of the suffix starting at position `p`.
pub fn to_inverse(sparse: &[Index], factor: Index) -> Result<Vec<Index>, Error> {
    if sparse.is_empty() {
        return Err(Error::InvalidInput("sparse suffix array must not be empty"));
    }
    check_factor(factor)?;

    let mut inverse = vec![-1 as Index; sparse.len()];
    for (rank, &p) in sparse.iter().enumerate() {
        let slot = (p / factor) as usize;
        if slot >= inverse.len() {
            return Err(Error::Internal("sparse suffix array entry out of range"));
        }
        inverse[slot] = rank as Index;
    }
    Ok(inverse)
}

/// Kasai-style linear LCP pass adapted for sparsity: positions are scanned
/// in text order (0, factor, 2*factor, ..) and the running match length is
/// carried over, decremented by `factor` between positions. This costs up
/// to `factor - 1` extra comparisons per element, which over `n / factor`
/// elements still sums to O(n).
///
/// `lcp[0]` is -1 by convention (rank 0 has no predecessor).
pub fn to_lcp(
    seq: &[u8],
    sparse: &[Index],
    inverse: &[Index],
    factor: Index,
) -> Result<Vec<Index>, Error> {
    if seq.is_empty() {
        return Err(Error::InvalidInput("sequence must not be empty"));
    }
    check_factor(factor)?;
    if sparse.len() != inverse.len() {
        return Err(Error::Internal("sparse and inverse arrays differ in length"));
    }

    let n = seq.len() as Index;
    let mut lcp = vec![0 as Index; sparse.len()];
    lcp[0] = -1;

    let mut run = 0 as Index;
    for i in 0..sparse.len() {
        let p = i as Index * factor;
        let rank = inverse[i];
        if rank == 0 {
            // Smallest suffix, no predecessor; the carried length does not
            // transfer across it.
            run = 0;
            continue;
        }
        let prev = sparse[rank as usize - 1];
        while p + run < n && prev + run < n && seq[(p + run) as usize] == seq[(prev + run) as usize]
        {
            run += 1;
        }
        lcp[rank as usize] = run;
        run = if run > factor - 1 { run - factor } else { 0 };
    }
    Ok(lcp)
}
