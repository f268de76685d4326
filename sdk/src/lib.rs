//! Stake pool SDK — instruction builders, PDA helpers, and account decoding.

pub mod constants;
pub mod instructions;
pub mod state;
