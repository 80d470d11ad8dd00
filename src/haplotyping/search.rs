//! Exhaustive bounded-depth signature search
//!
//! Enumerates every minimal set of a target allele's mutations, up to a
//! size bound, that no other allele in the collection carries in full.
//! One independent backtracking search is started per seed mutation and the
//! seeds run in parallel on the current rayon pool.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;

use super::types::{Allele, Mutation, SearchProgress, Signature};

/// Signatures found by an exhaustive search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Minimal discriminating signatures, each in ascending position order
    pub signatures: BTreeSet<Signature>,
    /// Search nodes expanded across all seeds
    pub nodes_visited: usize,
}

/// Find all minimal signatures of at most `max_size` mutations drawn from
/// `mutations` (the target's own, ascending by position) that match no
/// allele in `others`.
///
/// Each seed only extends with mutations at larger positions, so every
/// subset is visited at most once. A branch is cut as soon as an added
/// mutation eliminates no remaining allele, since such a set can never be
/// minimal.
pub fn find_minimal_signatures(
    mutations: &[Mutation],
    others: &[&Allele],
    max_size: usize,
    progress_tx: Option<&Sender<SearchProgress>>,
) -> SearchOutcome {
    if max_size == 0 || mutations.is_empty() {
        return SearchOutcome::default();
    }

    let total_seeds = mutations.len();
    let nodes_visited = AtomicUsize::new(0);
    let completed_count = AtomicUsize::new(0);

    let recorded: BTreeSet<Signature> = (0..total_seeds)
        .into_par_iter()
        .map(|seed| {
            let mut found = Vec::new();
            let mut handled = vec![mutations[seed]];
            explore(
                mutations,
                &mut handled,
                seed + 1,
                others,
                max_size,
                &mut found,
                &nodes_visited,
            );

            let completed = completed_count.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(tx) = progress_tx {
                let _ = tx.send(SearchProgress {
                    seeds_completed: completed,
                    total_seeds,
                    nodes_visited: nodes_visited.load(Ordering::Relaxed),
                    message: format!("Seed {} done ({}/{})", mutations[seed], completed, total_seeds),
                });
            }

            found.into_iter().collect::<BTreeSet<Signature>>()
        })
        .reduce(BTreeSet::new, |mut acc, part| {
            acc.extend(part);
            acc
        });

    let signatures = recorded
        .into_iter()
        .filter(|signature| is_minimal(signature, others))
        .collect();

    SearchOutcome {
        signatures,
        nodes_visited: nodes_visited.into_inner(),
    }
}

/// `handled` is the current frame; `candidates` are the alleles matching
/// every mutation in it except the last one pushed.
fn explore(
    mutations: &[Mutation],
    handled: &mut Vec<Mutation>,
    start: usize,
    candidates: &[&Allele],
    max_size: usize,
    found: &mut Vec<Signature>,
    nodes_visited: &AtomicUsize,
) {
    nodes_visited.fetch_add(1, Ordering::Relaxed);
    if handled.len() > max_size {
        return;
    }

    let Some(last) = handled.last() else {
        return;
    };
    let filtered: Vec<&Allele> = candidates
        .iter()
        .copied()
        .filter(|allele| allele.matches_mutation(last))
        .collect();

    if filtered.is_empty() {
        found.push(handled.iter().copied().collect::<Signature>().sorted());
        return;
    }
    if filtered.len() == candidates.len() || handled.len() == max_size {
        return;
    }

    for next in start..mutations.len() {
        handled.push(mutations[next]);
        explore(
            mutations,
            handled,
            next + 1,
            &filtered,
            max_size,
            found,
            nodes_visited,
        );
        handled.pop();
    }
}

/// No signature obtained by dropping a single mutation still discriminates.
/// Single mutations are always minimal.
fn is_minimal(signature: &Signature, others: &[&Allele]) -> bool {
    if signature.len() < 2 {
        return true;
    }
    let mutations = signature.mutations();
    (0..mutations.len()).all(|skip| {
        let reduced: Vec<Mutation> = mutations
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, m)| *m)
            .collect();
        others.iter().any(|allele| allele.matches_all(&reduced))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haplotyping::collection::Collection;
    use crate::haplotyping::extractor::extract_common;
    use proptest::prelude::*;
    use std::sync::mpsc::channel;

    /// Every subset of the target's sequenced positions up to `max_size`
    /// that discriminates and has no discriminating proper subset.
    fn brute_force(target: &Allele, others: &[&Allele], max_size: usize) -> BTreeSet<Signature> {
        let mutations: Vec<Mutation> = (0..target.len())
            .filter(|&p| target.is_sequenced(p).unwrap())
            .map(|p| Mutation::new(p, target.base_at(p).unwrap()))
            .collect();
        let discriminates = |set: &[Mutation]| !others.iter().any(|a| a.matches_all(set));

        let n = mutations.len();
        let mut answers = BTreeSet::new();
        for mask in 1u32..(1 << n) {
            if mask.count_ones() as usize > max_size {
                continue;
            }
            let set: Vec<Mutation> = (0..n).filter(|i| mask & (1 << i) != 0).map(|i| mutations[i]).collect();
            if !discriminates(&set) {
                continue;
            }
            let has_smaller = (1u32..mask)
                .filter(|sub| sub & mask == *sub)
                .any(|sub| {
                    let subset: Vec<Mutation> =
                        (0..n).filter(|i| sub & (1 << i) != 0).map(|i| mutations[i]).collect();
                    discriminates(&subset)
                });
            if !has_smaller {
                answers.insert(set.into_iter().collect::<Signature>());
            }
        }
        answers
    }

    fn search(collection: &Collection, target: &str, max_size: usize) -> SearchOutcome {
        let allele = collection.get(target).unwrap();
        let others: Vec<&Allele> = collection
            .alleles()
            .iter()
            .filter(|a| a.name() != target)
            .collect();
        let mutations = extract_common(&[allele], &collection.variable_positions()).unwrap();
        find_minimal_signatures(mutations.mutations(), &others, max_size, None)
    }

    fn fixture() -> Collection {
        Collection::new(vec![
            Allele::new("t", "ACGTACGT"),
            Allele::new("a", "ACGTTCGA"),
            Allele::new("b", "TCGAACGT"),
            Allele::new("c", "ACCTACGA"),
            Allele::new("d", "AGGTAC*T"),
            Allele::new("e", "ACGTACTT"),
        ])
        .unwrap()
    }

    #[test]
    fn test_matches_brute_force_on_fixture() {
        let collection = fixture();
        for target in ["t", "a", "b", "c", "d", "e"] {
            let outcome = search(&collection, target, 3);
            let allele = collection.get(target).unwrap();
            let others: Vec<&Allele> = collection
                .alleles()
                .iter()
                .filter(|a| a.name() != target)
                .collect();
            assert_eq!(outcome.signatures, brute_force(allele, &others, 3), "target {}", target);
        }
    }

    #[test]
    fn test_signatures_are_unique_to_target() {
        let collection = fixture();
        let outcome = search(&collection, "t", 5);
        assert!(!outcome.signatures.is_empty());
        for signature in &outcome.signatures {
            assert!(signature.len() <= 5);
            assert!(collection.get("t").unwrap().matches_signature(signature));
            for allele in collection.alleles().iter().filter(|a| a.name() != "t") {
                assert!(!allele.matches_signature(signature));
            }
            let positions = signature.positions();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_single_mutation_signature() {
        let collection = Collection::new(vec![
            Allele::new("x", "AAAA"),
            Allele::new("y", "AAAT"),
            Allele::new("z", "TAAT"),
        ])
        .unwrap();
        let outcome = search(&collection, "x", 5);
        let expected = BTreeSet::from([Signature::from_iter([Mutation::new(3, 'A')])]);
        assert_eq!(outcome.signatures, expected);
        assert!(outcome.nodes_visited >= 2);
    }

    #[test]
    fn test_bound_limits_signature_size() {
        // x differs from each of the others at exactly one distinct position
        let collection = Collection::new(vec![
            Allele::new("x", "AAA"),
            Allele::new("y", "TAA"),
            Allele::new("z", "ATA"),
            Allele::new("w", "AAT"),
        ])
        .unwrap();
        assert_eq!(search(&collection, "x", 3).signatures.len(), 1);
        assert!(search(&collection, "x", 2).signatures.is_empty());
    }

    #[test]
    fn test_identical_sequence_has_no_signature() {
        let collection = Collection::new(vec![
            Allele::new("x", "ACGT"),
            Allele::new("y", "ACGT"),
            Allele::new("z", "TCGA"),
        ])
        .unwrap();
        assert!(search(&collection, "x", 5).signatures.is_empty());
    }

    #[test]
    fn test_progress_reports_each_seed() {
        let collection = fixture();
        let allele = collection.get("t").unwrap();
        let others: Vec<&Allele> = collection.alleles()[1..].iter().collect();
        let mutations = extract_common(&[allele], &collection.variable_positions()).unwrap();
        let (tx, rx) = channel();
        find_minimal_signatures(mutations.mutations(), &others, 3, Some(&tx));
        drop(tx);
        let updates: Vec<SearchProgress> = rx.iter().collect();
        assert_eq!(updates.len(), mutations.len());
        assert!(updates.iter().any(|u| u.seeds_completed == mutations.len()));
    }

    #[test]
    fn test_deterministic() {
        let collection = fixture();
        let first = search(&collection, "c", 4);
        for _ in 0..3 {
            assert_eq!(search(&collection, "c", 4).signatures, first.signatures);
        }
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            seqs in prop::collection::vec(prop::collection::vec(prop::sample::select(vec!['A', 'C', 'T', '*']), 7), 2..7),
        ) {
            let alleles: Vec<Allele> = seqs
                .iter()
                .enumerate()
                .map(|(i, s)| Allele::new(format!("v{}", i), s.iter().collect::<String>()))
                .collect();
            let collection = Collection::new(alleles).unwrap();
            let outcome = search(&collection, "v0", 3);
            let others: Vec<&Allele> = collection.alleles()[1..].iter().collect();
            prop_assert_eq!(outcome.signatures, brute_force(&collection.alleles()[0], &others, 3));
        }
    }
}
