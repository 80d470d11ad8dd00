use thiserror::Error;

#[derive(Error, Debug)]
pub enum HaplotypeError {
    /// The group prefix matches no allele
    #[error("No alleles start with prefix: {prefix}")]
    EmptyGroup { prefix: String },
    /// Alleles outside the group carry every common mutation
    #[error("Common mutations for group \"{prefix}\" also match {}", .matches.join(", "))]
    AmbiguousGroup { prefix: String, matches: Vec<String> },
    /// A position lookup past the end of a sequence
    #[error("{name} sequence out of bounds: {position}, length: {length}")]
    OutOfRange {
        name: String,
        position: usize,
        length: usize,
    },
    /// Sequences in one collection differ in length
    #[error("{name} has sequence length {found}, expected {expected}")]
    UnequalLength {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A character outside the alignment alphabet
    #[error("Invalid symbol '{symbol}' in {name} at position {position}")]
    InvalidSymbol {
        name: String,
        position: usize,
        symbol: char,
    },
    /// No allele with this name in the collection
    #[error("Unknown allele: {0}")]
    UnknownAllele(String),
    /// Two records share a name
    #[error("Allele name appears more than once: {0}")]
    DuplicateName(String),
    /// Nothing was loaded
    #[error("Collection contains no alleles")]
    EmptyCollection,
    /// Greedy selection could not reproduce a validated signature
    #[error("Internal consistency fault: {0}")]
    Inconsistent(String),
    /// The rayon pool for the exhaustive search could not be built
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Reading the alignment failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HaplotypeError>;
