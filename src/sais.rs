//! Linear-time suffix array construction by induced sorting (SA-IS).
//!
//! The input is a symbol sequence over the alphabet `{0, .., alphabet-1}`,
//! where 0 is the sequence terminator and must appear exactly once, at the
//! end. Every recursion level operates on the same `Index`-valued symbol
//! representation; callers widen raw bytes once at the top level.

use std::cmp::Ordering;

use tracing::debug;

use crate::{Error, Index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuffixKind {
    S,
    L,
}

/// A left-most S position: S-type with an L-type predecessor.
fn is_lms(kinds: &[SuffixKind], idx: usize) -> bool {
    idx > 0 && kinds[idx] == SuffixKind::S && kinds[idx - 1] == SuffixKind::L
}

/// Classify every position as S (suffix smaller than its successor, or
/// equal and the successor is S) or L, scanning right to left. The
/// terminator has no successor and is S by definition.
fn classify(seq: &[Index]) -> Vec<SuffixKind> {
    let n = seq.len();
    let mut kinds = vec![SuffixKind::S; n];
    for i in (0..n - 1).rev() {
        kinds[i] = match seq[i].cmp(&seq[i + 1]) {
            Ordering::Less => SuffixKind::S,
            Ordering::Greater => SuffixKind::L,
            Ordering::Equal => kinds[i + 1],
        };
    }
    kinds
}

/// Per-symbol bucket cursors derived from symbol frequency prefix sums.
/// `begin` selects the first slot of each bucket, otherwise the last
/// (both inclusive).
fn symbol_buckets(seq: &[Index], alphabet: usize, begin: bool) -> Vec<Index> {
    let mut buckets = vec![0 as Index; alphabet];
    for &c in seq {
        buckets[c as usize] += 1;
    }
    let mut count = 0;
    for b in buckets.iter_mut() {
        count += *b;
        *b = if begin { count - *b } else { count - 1 };
    }
    buckets
}

/// First sweep: place LMS positions at the right end of their symbol's
/// bucket, scanning in original order.
fn place_lms(seq: &[Index], sa: &mut [Index], kinds: &[SuffixKind], alphabet: usize) {
    let mut tail = symbol_buckets(seq, alphabet, false);
    for i in 0..seq.len() {
        if is_lms(kinds, i) {
            let c = seq[i] as usize;
            sa[tail[c] as usize] = i as Index;
            tail[c] -= 1;
        }
    }
}

/// Second sweep: induce L-type positions left to right from already
/// placed entries.
fn induce_l(seq: &[Index], sa: &mut [Index], kinds: &[SuffixKind], alphabet: usize) {
    let mut head = symbol_buckets(seq, alphabet, true);
    for i in 0..seq.len() {
        let p = sa[i];
        if p > 0 && kinds[p as usize - 1] == SuffixKind::L {
            let c = seq[p as usize - 1] as usize;
            sa[head[c] as usize] = p - 1;
            head[c] += 1;
        }
    }
}

/// Third sweep: induce S-type positions right to left.
fn induce_s(seq: &[Index], sa: &mut [Index], kinds: &[SuffixKind], alphabet: usize) {
    let mut tail = symbol_buckets(seq, alphabet, false);
    for i in (0..seq.len()).rev() {
        let p = sa[i];
        if p > 0 && kinds[p as usize - 1] == SuffixKind::S {
            let c = seq[p as usize - 1] as usize;
            sa[tail[c] as usize] = p - 1;
            tail[c] -= 1;
        }
    }
}

/// Compare the LMS substrings starting at `first` and `second`: symbol by
/// symbol first, then by kind with S sorting after L, stopping where one
/// substring reaches its closing LMS boundary.
fn compare_lms(seq: &[Index], kinds: &[SuffixKind], first: usize, second: usize) -> Ordering {
    let mut i = 0;
    loop {
        match seq[first + i].cmp(&seq[second + i]) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (kinds[first + i], kinds[second + i]) {
            (SuffixKind::L, SuffixKind::S) => return Ordering::Less,
            (SuffixKind::S, SuffixKind::L) => return Ordering::Greater,
            _ => {}
        }
        if i > 0 {
            match (is_lms(kinds, first + i), is_lms(kinds, second + i)) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                (false, false) => {}
            }
        }
        i += 1;
    }
}

fn sa_is(seq: &[Index], alphabet: usize) -> Vec<Index> {
    let n = seq.len();
    if n == 1 {
        return vec![0];
    }

    let kinds = classify(seq);
    let mut sa = vec![-1 as Index; n];

    // Approximate LMS order via the three bucket sweeps; this fixes the
    // exact relative order of LMS substrings.
    place_lms(seq, &mut sa, &kinds, alphabet);
    induce_l(seq, &mut sa, &kinds, alphabet);
    induce_s(seq, &mut sa, &kinds, alphabet);

    let sorted_lms: Vec<Index> = sa
        .iter()
        .copied()
        .filter(|&p| p > 0 && is_lms(&kinds, p as usize))
        .collect();
    let lms_count = sorted_lms.len();

    // Name LMS substrings in their sorted order; equal substrings share
    // a name.
    let mut name_at = vec![-1 as Index; n];
    let mut current_name = 0 as Index;
    name_at[sorted_lms[0] as usize] = 0;
    for pair in sorted_lms.windows(2) {
        if compare_lms(seq, &kinds, pair[0] as usize, pair[1] as usize) != Ordering::Equal {
            current_name += 1;
        }
        name_at[pair[1] as usize] = current_name;
    }

    // The reduced problem: names in position order, at most n/2 long.
    let lms_positions: Vec<Index> = (0..n)
        .filter(|&i| is_lms(&kinds, i))
        .map(|i| i as Index)
        .collect();
    let reduced: Vec<Index> = lms_positions.iter().map(|&p| name_at[p as usize]).collect();

    let reduced_sa = if (current_name + 1) < lms_count as Index {
        sa_is(&reduced, current_name as usize + 1)
    } else {
        // Names are unique, so each name is already its rank.
        let mut rsa = vec![0 as Index; lms_count];
        for (i, &name) in reduced.iter().enumerate() {
            rsa[name as usize] = i as Index;
        }
        rsa
    };

    // Seed the buckets with the now exactly ordered LMS positions and
    // repeat the two induction sweeps to obtain the final array.
    sa.fill(-1);
    let mut tail = symbol_buckets(seq, alphabet, false);
    for &rank in reduced_sa.iter().rev() {
        let p = lms_positions[rank as usize];
        let c = seq[p as usize] as usize;
        sa[tail[c] as usize] = p;
        tail[c] -= 1;
    }
    induce_l(seq, &mut sa, &kinds, alphabet);
    induce_s(seq, &mut sa, &kinds, alphabet);

    sa
}

/// Build the suffix array of `seq` over alphabet `{0, .., alphabet-1}`.
///
/// The terminator 0 must be the last symbol and occur nowhere else, which
/// guarantees SA[0] is the terminator position.
pub fn suffix_array(seq: &[Index], alphabet: Index) -> Result<Vec<Index>, Error> {
    let n = seq.len();
    if n < 1 {
        return Err(Error::InvalidInput("sequence must not be empty"));
    }
    if alphabet < 1 {
        return Err(Error::InvalidInput("alphabet size must be positive"));
    }
    if seq[n - 1] != 0 || seq[..n - 1].contains(&0) {
        return Err(Error::InvalidInput(
            "terminator symbol 0 must appear exactly once, at the end",
        ));
    }
    if seq.iter().any(|&c| c < 0 || c >= alphabet) {
        return Err(Error::InvalidInput("symbol outside of alphabet range"));
    }

    debug!(n, alphabet, "building suffix array");
    Ok(sa_is(seq, alphabet as usize))
}
