mod alphabet;
mod collection;
mod error;
mod extractor;
mod greedy;
mod haplotyper;
mod ranker;
mod search;
mod types;

pub use alphabet::*;
pub use collection::*;
pub use error::*;
pub use extractor::*;
pub use greedy::*;
pub use haplotyper::*;
pub use ranker::*;
pub use search::*;
pub use types::*;
