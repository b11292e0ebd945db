//! Utility library for the AMACAD analysis tools: reading OMNeT++ result files and serde helpers.

pub mod omnet;
pub mod serde;
