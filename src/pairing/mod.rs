//! Pairing of movies for comparison

pub mod policy;

pub use policy::{PairSelection, PairingConfig, PairingPolicy};
