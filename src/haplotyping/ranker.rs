//! Mutation frequency ranking

use std::collections::HashMap;

use super::types::{Allele, Mutation, RankedMutation};

fn frequency(mutation: &Mutation, alleles: &[&Allele]) -> usize {
    alleles
        .iter()
        .filter(|allele| allele.matches_mutation(mutation))
        .count()
}

/// How many of `alleles` carry each mutation
pub fn mutation_frequencies(mutations: &[Mutation], alleles: &[&Allele]) -> HashMap<Mutation, usize> {
    mutations
        .iter()
        .map(|m| (*m, frequency(m, alleles)))
        .collect()
}

/// Mutations ordered from rarest to most common among `alleles`.
/// The sort is stable, so equal counts keep their input order.
pub fn rank_by_frequency(mutations: &[Mutation], alleles: &[&Allele]) -> Vec<RankedMutation> {
    let mut ranked: Vec<RankedMutation> = mutations
        .iter()
        .map(|m| RankedMutation {
            mutation: *m,
            frequency: frequency(m, alleles),
        })
        .collect();
    ranked.sort_by_key(|r| r.frequency);
    ranked
}
