//! ColorChanger: recolor `Neutral` actor definitions in XML map documents.
//!
//! Every `Neutral` element that contains an `Origin` gets its `Actor.Color`
//! children replaced by a single one carrying the configured RGB color.

pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod mutator;
pub mod report;
pub mod run;

pub use error::ColorChangerError;
