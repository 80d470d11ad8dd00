//! Aligned allele collection and FASTA loading

use bio::io::fasta;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::alphabet::{normalize_symbol, NOT_SEQUENCED};
use super::error::{HaplotypeError, Result};
use super::types::{Allele, DuplicateGroup};

/// Read-only reference collection of equal-length aligned alleles.
#[derive(Debug, Clone)]
pub struct Collection {
    alleles: Vec<Allele>,
    index: HashMap<String, usize>,
    sequence_length: usize,
    /// Symbols observed at every position where more than one occurs
    variable: BTreeMap<usize, BTreeSet<char>>,
}

impl Collection {
    /// Build a collection and derive its variable positions from the data.
    pub fn new(alleles: Vec<Allele>) -> Result<Self> {
        let mut collection = Self::validated(alleles)?;
        let mut observed: Vec<BTreeSet<char>> = vec![BTreeSet::new(); collection.sequence_length];
        for allele in &collection.alleles {
            for (pos, b) in allele.sequence().bytes().enumerate() {
                observed[pos].insert(b as char);
            }
        }
        collection.variable = observed
            .into_iter()
            .enumerate()
            .filter(|(_, symbols)| symbols.len() > 1)
            .collect();
        Ok(collection)
    }

    /// Build a collection using a position -> observed symbols map computed elsewhere.
    /// Positions with a single observed symbol are dropped.
    pub fn with_variable_positions(
        alleles: Vec<Allele>,
        observed: BTreeMap<usize, BTreeSet<char>>,
    ) -> Result<Self> {
        let mut collection = Self::validated(alleles)?;
        if let Some((&pos, _)) = observed.range(collection.sequence_length..).next() {
            return Err(HaplotypeError::OutOfRange {
                name: "variable positions".to_string(),
                position: pos,
                length: collection.sequence_length,
            });
        }
        collection.variable = observed
            .into_iter()
            .filter(|(_, symbols)| symbols.len() > 1)
            .collect();
        Ok(collection)
    }

    fn validated(alleles: Vec<Allele>) -> Result<Self> {
        let first = alleles.first().ok_or(HaplotypeError::EmptyCollection)?;
        let sequence_length = first.len();

        let mut index = HashMap::with_capacity(alleles.len());
        for (i, allele) in alleles.iter().enumerate() {
            if allele.len() != sequence_length {
                return Err(HaplotypeError::UnequalLength {
                    name: allele.name().to_string(),
                    expected: sequence_length,
                    found: allele.len(),
                });
            }
            if let Some((position, symbol)) = allele
                .sequence()
                .chars()
                .enumerate()
                .find(|&(_, c)| normalize_symbol(c) != Some(c))
            {
                return Err(HaplotypeError::InvalidSymbol {
                    name: allele.name().to_string(),
                    position,
                    symbol,
                });
            }
            if index.insert(allele.name().to_string(), i).is_some() {
                return Err(HaplotypeError::DuplicateName(allele.name().to_string()));
            }
        }

        Ok(Self {
            alleles,
            index,
            sequence_length,
            variable: BTreeMap::new(),
        })
    }

    /// Parse an aligned multi-FASTA. Symbols are uppercased and '.' gaps become '-'.
    pub fn from_fasta<R: Read>(reader: R) -> Result<Self> {
        let mut alleles = Vec::new();
        for record in fasta::Reader::new(reader).records() {
            let record = record?;
            let name = record.id().to_string();
            let mut sequence = String::with_capacity(record.seq().len());
            for (position, &b) in record.seq().iter().enumerate() {
                let symbol = normalize_symbol(b as char).ok_or_else(|| {
                    HaplotypeError::InvalidSymbol {
                        name: name.clone(),
                        position,
                        symbol: b as char,
                    }
                })?;
                sequence.push(symbol);
            }
            alleles.push(Allele::new(name, sequence));
        }
        Self::new(alleles)
    }

    pub fn from_fasta_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_fasta(File::open(path)?)
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Alleles in load order
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn get(&self, name: &str) -> Option<&Allele> {
        self.index.get(name).map(|&i| &self.alleles[i])
    }

    /// Positions where more than one symbol is observed, ascending
    pub fn variable_positions(&self) -> Vec<usize> {
        self.variable.keys().copied().collect()
    }

    pub fn observed_symbols(&self, position: usize) -> Option<&BTreeSet<char>> {
        self.variable.get(&position)
    }

    /// Groups of alleles sharing an identical sequence, in order of first appearance
    pub fn find_duplicates(&self) -> Vec<DuplicateGroup> {
        let mut by_sequence: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        for allele in &self.alleles {
            match by_sequence.get(allele.sequence()) {
                Some(&g) => groups[g].names.push(allele.name().to_string()),
                None => {
                    by_sequence.insert(allele.sequence(), groups.len());
                    groups.push(DuplicateGroup {
                        names: vec![allele.name().to_string()],
                    });
                }
            }
        }
        groups.retain(|g| g.names.len() > 1);
        groups
    }

    /// Number of unsequenced symbols per allele, for alleles that have any
    pub fn unsequenced_counts(&self) -> Vec<(String, usize)> {
        self.alleles
            .iter()
            .filter_map(|allele| {
                let count = allele.sequence().chars().filter(|&c| c == NOT_SEQUENCED).count();
                (count > 0).then(|| (allele.name().to_string(), count))
            })
            .collect()
    }
}
