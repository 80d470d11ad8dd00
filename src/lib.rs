//! Haplosig - Allele Signature Finder
//!
//! Finds small sets of alignment positions, each paired with a required base,
//! that tell a group of alleles (or a single allele) apart from every other
//! allele in an aligned reference collection. Intended for designing assays
//! that must detect one allele group without cross-reacting with the rest.

pub mod haplotyping;

pub use haplotyping::*;
