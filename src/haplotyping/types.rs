//! Data types for allele signature discovery

use serde::{Deserialize, Serialize};
use std::fmt;

use super::alphabet::NOT_SEQUENCED;
use super::error::{HaplotypeError, Result};

/// Default upper bound on the size of an exhaustively searched signature
pub const DEFAULT_MAX_SIGNATURE_SIZE: usize = 5;

/// Default number of least frequent mutations listed in a group report
pub const DEFAULT_REPORT_TOP: usize = 10;

/// A named aligned sequence from the reference collection.
///
/// Sequences are normalized alignment symbols (ASCII only), so a byte
/// index is a position index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allele {
    name: String,
    sequence: String,
}

impl Allele {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Symbol at `position`, or `OutOfRange` past the end of the sequence
    pub fn base_at(&self, position: usize) -> Result<char> {
        self.sequence
            .as_bytes()
            .get(position)
            .map(|&b| b as char)
            .ok_or_else(|| HaplotypeError::OutOfRange {
                name: self.name.clone(),
                position,
                length: self.sequence.len(),
            })
    }

    /// Whether a base was determined at `position`
    pub fn is_sequenced(&self, position: usize) -> Result<bool> {
        Ok(self.base_at(position)? != NOT_SEQUENCED)
    }

    pub fn matches_mutation(&self, mutation: &Mutation) -> bool {
        mutation.matches(&self.sequence)
    }

    /// True iff every mutation matches; stops at the first mismatch.
    pub fn matches_all(&self, mutations: &[Mutation]) -> bool {
        mutations.iter().all(|m| self.matches_mutation(m))
    }

    pub fn matches_signature(&self, signature: &Signature) -> bool {
        self.matches_all(signature.mutations())
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A position paired with the base an allele must carry there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mutation {
    pub position: usize,
    pub base: char,
}

impl Mutation {
    pub fn new(position: usize, base: char) -> Self {
        Self { position, base }
    }

    /// Positions past the end of `sequence` never match.
    pub fn matches(&self, sequence: &str) -> bool {
        self.base.is_ascii() && sequence.as_bytes().get(self.position) == Some(&(self.base as u8))
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.position, self.base)
    }
}

/// Conjunction of mutations with no repeated position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Vec<Mutation>);

impl Signature {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a mutation. Returns false (and leaves the signature unchanged)
    /// if its position is already constrained.
    pub fn push(&mut self, mutation: Mutation) -> bool {
        if self.0.iter().any(|m| m.position == mutation.position) {
            return false;
        }
        self.0.push(mutation);
        true
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mutation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.0.iter().map(|m| m.position).collect()
    }

    /// Same mutations in ascending position order
    pub fn sorted(mut self) -> Self {
        self.0.sort();
        self
    }
}

impl FromIterator<Mutation> for Signature {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        let mut signature = Signature::new();
        for mutation in iter {
            signature.push(mutation);
        }
        signature
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Mutation;
    type IntoIter = std::slice::Iter<'a, Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// A mutation together with how many reference alleles carry it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMutation {
    pub mutation: Mutation,
    pub frequency: usize,
}

/// Which signature search to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Greedy minimal signature for every allele sharing a name prefix
    GreedyGroup,
    /// All minimal signatures of one allele against the rest of the collection
    ExhaustiveUnique,
}

impl Default for SearchStrategy {
    fn default() -> Self {
        Self::GreedyGroup
    }
}

impl SearchStrategy {
    pub fn description(&self) -> String {
        match self {
            Self::GreedyGroup => "Greedy group signature".to_string(),
            Self::ExhaustiveUnique => "Exhaustive unique signatures".to_string(),
        }
    }
}

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => (*n).max(1),
        }
    }
}

/// Search parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub strategy: SearchStrategy,
    pub max_signature_size: usize,
    pub report_top: usize,
    pub thread_count: ThreadCount,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::GreedyGroup,
            max_signature_size: DEFAULT_MAX_SIGNATURE_SIZE,
            report_top: DEFAULT_REPORT_TOP,
            thread_count: ThreadCount::Auto,
        }
    }
}

/// Progress update sent after each seed of an exhaustive search finishes
#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub seeds_completed: usize,
    pub total_seeds: usize,
    pub nodes_visited: usize,
    pub message: String,
}

/// Result of the greedy group search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub prefix: String,
    pub group: Vec<String>,
    pub other_count: usize,
    pub common_mutations: Signature,
    pub least_frequent: Vec<RankedMutation>,
    pub signature: Signature,
}

/// Result of the exhaustive single-allele search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueReport {
    pub allele: String,
    pub candidate_mutations: usize,
    pub max_signature_size: usize,
    pub nodes_visited: usize,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HaplotypeReport {
    Group(GroupReport),
    Unique(UniqueReport),
}

/// Alleles sharing one identical sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub names: Vec<String>,
}
