//! Nucleotide alphabet used by aligned allele sequences

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Symbol meaning no base was determined at a position
pub const NOT_SEQUENCED: char = '*';

/// Standard DNA bases
pub const STANDARD_BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Ambiguous IUPAC bases
pub const AMBIGUOUS_BASES: [char; 11] = ['R', 'Y', 'S', 'W', 'K', 'M', 'B', 'D', 'H', 'V', 'N'];

/// Every symbol an aligned sequence may contain after normalization
pub static ALIGNMENT_SYMBOLS: Lazy<HashSet<char>> = Lazy::new(|| {
    STANDARD_BASES
        .iter()
        .chain(AMBIGUOUS_BASES.iter())
        .copied()
        .chain(['-', NOT_SEQUENCED])
        .collect()
});

/// Check if a character is a gap
pub fn is_gap(c: char) -> bool {
    matches!(c, '-' | '.')
}

/// Uppercase a raw symbol and fold '.' gaps into '-'.
/// Returns None for characters that cannot appear in an alignment.
pub fn normalize_symbol(c: char) -> Option<char> {
    let c = c.to_ascii_uppercase();
    if is_gap(c) {
        return Some('-');
    }
    ALIGNMENT_SYMBOLS.contains(&c).then_some(c)
}
