//! Racecard - German race card text parser
//!
//! This library provides:
//! - Segmentation of extracted race card pages into per-starter blocks
//! - Field recovery (identity, yearly stats, pedigree, connections, odds, form)
//! - Derived handicapping features per starter
//! - Flat CSV/JSON export with a fixed column set
//!
//! # Example
//!
//! ```no_run
//! use racecard::data::{read_document, split_pages, RaceCardParser};
//! use racecard::models::MeetingDate;
//! use std::path::Path;
//!
//! let text = read_document(Path::new("card_2026-02-01.txt")).unwrap();
//! let meeting: MeetingDate = "2026-02-01".parse().unwrap();
//!
//! let parser = RaceCardParser::new();
//! let starters = parser.parse_document(&split_pages(&text), &meeting);
//! println!("{} starters", starters.len());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{JockeyStrategy, ParserConfig, ReferenceYears, WagerLayout};
pub use data::parser::parse_page;
pub use data::RaceCardParser;
pub use error::{ExtractIssue, RaceCardError};
pub use models::{MeetingDate, RaceHeader, StarterRecord};
