//! Group partitioning, common-mutation extraction and uniqueness validation

use super::collection::Collection;
use super::error::{HaplotypeError, Result};
use super::types::{Allele, Mutation, Signature};

/// Split the collection into alleles whose name starts with `prefix` and the rest.
/// Both halves keep collection order.
pub fn partition<'a>(
    collection: &'a Collection,
    prefix: &str,
) -> Result<(Vec<&'a Allele>, Vec<&'a Allele>)> {
    let (group, others): (Vec<&Allele>, Vec<&Allele>) = collection
        .alleles()
        .iter()
        .partition(|allele| allele.name().starts_with(prefix));

    if group.is_empty() {
        return Err(HaplotypeError::EmptyGroup {
            prefix: prefix.to_string(),
        });
    }
    Ok((group, others))
}

/// Mutations every allele in `group` shares, restricted to `positions`
/// (ascending). A position qualifies when all alleles are sequenced there
/// and carry the same symbol.
pub fn extract_common(group: &[&Allele], positions: &[usize]) -> Result<Signature> {
    let Some(first) = group.first() else {
        return Ok(Signature::new());
    };

    let mut common = Signature::new();
    'positions: for &position in positions {
        if !first.is_sequenced(position)? {
            continue;
        }
        let base = first.base_at(position)?;
        for allele in &group[1..] {
            if allele.base_at(position)? != base {
                continue 'positions;
            }
        }
        common.push(Mutation::new(position, base));
    }
    Ok(common)
}

/// Alleles in `others` that satisfy every mutation of `signature`
pub fn also_matching<'a>(signature: &Signature, others: &[&'a Allele]) -> Vec<&'a Allele> {
    others
        .iter()
        .copied()
        .filter(|allele| allele.matches_signature(signature))
        .collect()
}

/// Fail with `AmbiguousGroup` if any allele outside the group matches `signature`.
pub fn validate_unique(prefix: &str, signature: &Signature, others: &[&Allele]) -> Result<()> {
    let matches = also_matching(signature, others);
    if matches.is_empty() {
        return Ok(());
    }
    Err(HaplotypeError::AmbiguousGroup {
        prefix: prefix.to_string(),
        matches: matches.iter().map(|a| a.name().to_string()).collect(),
    })
}
