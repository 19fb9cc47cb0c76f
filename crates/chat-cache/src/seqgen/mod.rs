//! Gap-free per-guild message sequence numbers.

mod generator;

pub use generator::SeqGen;
