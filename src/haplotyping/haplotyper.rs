//! Signature search engine
//!
//! Ties the collection to the two search modes: a greedy signature for a
//! group of alleles sharing a name prefix, and an exhaustive enumeration of
//! minimal signatures for one allele.

use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use super::collection::Collection;
use super::error::{HaplotypeError, Result};
use super::extractor::{extract_common, partition, validate_unique};
use super::greedy::select_signature;
use super::ranker::rank_by_frequency;
use super::search::find_minimal_signatures;
use super::types::{
    Allele, GroupReport, HaplotypeReport, SearchParams, SearchProgress, SearchStrategy,
    UniqueReport,
};

pub struct Haplotyper {
    collection: Collection,
    positions: Vec<usize>,
}

impl Haplotyper {
    pub fn new(collection: Collection) -> Self {
        for duplicate in collection.find_duplicates() {
            warn!("Identical sequences: {}", duplicate.names.join(", "));
        }
        for (name, count) in collection.unsequenced_counts() {
            debug!("{}: {} unsequenced positions", name, count);
        }

        let positions = collection.variable_positions();
        info!(
            "Loaded {} alleles of length {}, {} variable positions",
            collection.len(),
            collection.sequence_length(),
            positions.len()
        );
        Self {
            collection,
            positions,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Run the search selected by `params.strategy`. `target` is a name
    /// prefix for the group search and an allele name for the exhaustive one.
    pub fn run(
        &self,
        target: &str,
        params: &SearchParams,
        progress_tx: Option<Sender<SearchProgress>>,
    ) -> Result<HaplotypeReport> {
        match params.strategy {
            SearchStrategy::GreedyGroup => self
                .find_group_signature(target, params)
                .map(HaplotypeReport::Group),
            SearchStrategy::ExhaustiveUnique => self
                .find_unique_signatures(target, params, progress_tx)
                .map(HaplotypeReport::Unique),
        }
    }

    /// Greedy signature separating every allele named `prefix*` from the rest
    pub fn find_group_signature(&self, prefix: &str, params: &SearchParams) -> Result<GroupReport> {
        let (group, others) = partition(&self.collection, prefix)?;
        info!("Group \"{}\": {} alleles, {} others", prefix, group.len(), others.len());

        let common = extract_common(&group, &self.positions)?;
        info!("{} common mutations", common.len());

        validate_unique(prefix, &common, &others)?;

        let least_frequent: Vec<_> = rank_by_frequency(common.mutations(), &others)
            .into_iter()
            .take(params.report_top)
            .collect();
        for ranked in &least_frequent {
            debug!("\t{} - {}", ranked.mutation, ranked.frequency);
        }

        let signature = select_signature(&common, &others)?;
        info!("Signature ({}): {}", signature.len(), signature);

        Ok(GroupReport {
            prefix: prefix.to_string(),
            group: group.iter().map(|a| a.name().to_string()).collect(),
            other_count: others.len(),
            common_mutations: common,
            least_frequent,
            signature,
        })
    }

    /// Every minimal signature, up to `params.max_signature_size` mutations,
    /// that only allele `name` matches
    pub fn find_unique_signatures(
        &self,
        name: &str,
        params: &SearchParams,
        progress_tx: Option<Sender<SearchProgress>>,
    ) -> Result<UniqueReport> {
        let target = self
            .collection
            .get(name)
            .ok_or_else(|| HaplotypeError::UnknownAllele(name.to_string()))?;
        let others: Vec<&Allele> = self
            .collection
            .alleles()
            .iter()
            .filter(|allele| allele.name() != name)
            .collect();

        let twins: Vec<&str> = others
            .iter()
            .filter(|allele| allele.sequence() == target.sequence())
            .map(|allele| allele.name())
            .collect();
        if !twins.is_empty() {
            warn!("{} shares its sequence with {}; no signature can exist", name, twins.join(", "));
        }

        let mutations = extract_common(&[target], &self.positions)?;
        info!(
            "{}: {} candidate mutations, signatures up to {}",
            name,
            mutations.len(),
            params.max_signature_size
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.thread_count.get_count())
            .build()?;
        let outcome = pool.install(|| {
            find_minimal_signatures(
                mutations.mutations(),
                &others,
                params.max_signature_size,
                progress_tx.as_ref(),
            )
        });
        info!(
            "{} signatures found, {} nodes visited",
            outcome.signatures.len(),
            outcome.nodes_visited
        );

        Ok(UniqueReport {
            allele: name.to_string(),
            candidate_mutations: mutations.len(),
            max_signature_size: params.max_signature_size,
            nodes_visited: outcome.nodes_visited,
            signatures: outcome.signatures.into_iter().collect(),
        })
    }
}
