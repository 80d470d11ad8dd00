//! Greedy signature selection
//!
//! Repeatedly takes the common mutation carried by the fewest remaining
//! outside alleles, then drops every outside allele the signature no
//! longer matches. Small, but not guaranteed minimum.

use tracing::debug;

use super::error::{HaplotypeError, Result};
use super::ranker::rank_by_frequency;
use super::types::{Allele, Mutation, Signature};

/// Select a subset of `common` that no allele in `others` matches.
///
/// `common` must already have passed uniqueness validation against `others`;
/// running out of mutations before every outside allele is eliminated is
/// reported as `Inconsistent`.
pub fn select_signature(common: &Signature, others: &[&Allele]) -> Result<Signature> {
    let mut remaining: Vec<Mutation> = common.mutations().to_vec();
    let mut survivors: Vec<&Allele> = others.to_vec();
    let mut signature = Signature::new();

    while !survivors.is_empty() && !remaining.is_empty() {
        let ranked = rank_by_frequency(&remaining, &survivors);
        let pick = ranked[0];
        remaining.retain(|m| *m != pick.mutation);
        signature.push(pick.mutation);

        survivors.retain(|allele| allele.matches_signature(&signature));
        debug!(
            "Picked {} (carried by {}), {} alleles left",
            pick.mutation,
            pick.frequency,
            survivors.len()
        );
    }

    if !survivors.is_empty() {
        let names: Vec<&str> = survivors.iter().map(|a| a.name()).collect();
        return Err(HaplotypeError::Inconsistent(format!(
            "common mutations exhausted with {} alleles still matching: {}",
            survivors.len(),
            names.join(", ")
        )));
    }
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haplotyping::collection::Collection;
    use crate::haplotyping::extractor::{extract_common, partition, validate_unique};
    use proptest::prelude::*;

    fn refs(alleles: &[Allele]) -> Vec<&Allele> {
        alleles.iter().collect()
    }

    #[test]
    fn test_single_mutation_already_discriminates() {
        let others = [Allele::new("C", "TTCGT")];
        let common: Signature = [Mutation::new(0, 'A')].into_iter().collect();
        let signature = select_signature(&common, &refs(&others)).unwrap();
        assert_eq!(signature, common);
    }

    #[test]
    fn test_picks_rarest_first() {
        // target carries A at 0..4
        let others = [
            Allele::new("o1", "AAAT"),
            Allele::new("o2", "TTTA"),
            Allele::new("o3", "TAAT"),
        ];
        let common: Signature = (0..4).map(|p| Mutation::new(p, 'A')).collect();
        let signature = select_signature(&common, &refs(&others)).unwrap();

        // 0 and 3 tie at one carrier, 0 wins on position; only o1 survives it
        assert_eq!(signature.positions(), vec![0, 3]);
        for allele in &others {
            assert!(!allele.matches_signature(&signature));
        }
    }

    #[test]
    fn test_no_outside_alleles() {
        let common: Signature = [Mutation::new(1, 'C')].into_iter().collect();
        assert!(select_signature(&common, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_inconsistent_input() {
        let others = [Allele::new("o1", "ACGT")];
        let common: Signature = [Mutation::new(0, 'A')].into_iter().collect();
        assert!(matches!(
            select_signature(&common, &refs(&others)),
            Err(HaplotypeError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let others = [
            Allele::new("o1", "AAAT"),
            Allele::new("o2", "AATA"),
            Allele::new("o3", "ATAA"),
        ];
        let common: Signature = (0..4).map(|p| Mutation::new(p, 'A')).collect();
        let first = select_signature(&common, &refs(&others)).unwrap();
        for _ in 0..5 {
            assert_eq!(select_signature(&common, &refs(&others)).unwrap(), first);
        }
    }

    proptest! {
        #[test]
        fn prop_greedy_excludes_all_others(
            seqs in prop::collection::vec(prop::collection::vec(prop::sample::select(vec!['A', 'C', 'G', 'T']), 6), 2..8),
            group_size in 1usize..3,
        ) {
            let alleles: Vec<Allele> = seqs
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let prefix = if i < group_size { "g" } else { "o" };
                    Allele::new(format!("{}{}", prefix, i), s.iter().collect::<String>())
                })
                .collect();
            let collection = Collection::new(alleles).unwrap();
            let (group, others) = partition(&collection, "g").unwrap();
            let common = extract_common(&group, &collection.variable_positions()).unwrap();
            prop_assume!(validate_unique("g", &common, &others).is_ok());

            let signature = select_signature(&common, &others).unwrap();
            prop_assert!(signature.len() <= common.len());
            for allele in &others {
                prop_assert!(!allele.matches_signature(&signature));
            }
            for allele in &group {
                prop_assert!(allele.matches_signature(&signature));
            }
        }
    }
}
