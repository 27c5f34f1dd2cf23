//! Feature assembly: raw market data -> fixed-schema model input.

pub mod assembler;
pub mod frame;

pub use assembler::FeatureAssembler;
pub use frame::{FeatureFrame, FeatureRecord, FeatureTable, RawTable, COLUMN_NAMES};
