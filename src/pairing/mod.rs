pub mod pair_key;
pub mod random;
mod selector;

pub use pair_key::{pair_key, total_pairs, CompletedPairs};
pub use random::{RandomSource, RngSource, SequenceSource};
pub use selector::{select_pair, select_pair_indexed};
