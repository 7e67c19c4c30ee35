//! Race card parsing, feature composition and export

pub mod export;
pub mod features;
pub mod form;
pub mod identity;
pub mod loader;
pub mod parser;
pub mod pedigree;
pub mod segment;
pub mod wagering;

// Re-export commonly used types
pub use export::{columns, write_csv, write_json};
pub use features::FeatureComposer;
pub use loader::{collect_inputs, read_document, split_pages};
pub use parser::RaceCardParser;
pub use segment::{Block, BlockShape};
