//! Race card page parser
//!
//! Parses the linearized text of one race card page into starter records.
//!
//! # Example
//!
//! ```no_run
//! use racecard::data::parser::RaceCardParser;
//! use racecard::models::MeetingDate;
//!
//! let parser = RaceCardParser::new();
//! let meeting: MeetingDate = "2026-02-01".parse().unwrap();
//! let page = vec!["01.02.2026 - Dortmund Rennen # 3", "3 1600 m Preis der Sparkasse"];
//! for starter in parser.parse_page(&page, &meeting) {
//!     println!("{} {}", starter.start_nr, starter.horse_name);
//! }
//! ```

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::sync::Arc;

use super::features::{FeatureComposer, TodayContext};
use super::form::FormExtractor;
use super::identity::IdentityExtractor;
use super::pedigree::PedigreeExtractor;
use super::segment::{Block, BlockSegmenter};
use super::wagering::WageringDecoder;
use crate::config::ParserConfig;
use crate::error::{ExtractIssue, RaceCardError};
use crate::models::{CareerStats, MeetingDate, RaceHeader, StarterRecord};

/// Surface assumed when the header has no surface line
const DEFAULT_SURFACE: &str = "Flach";

static DEFAULT_PARSER: Lazy<RaceCardParser> = Lazy::new(RaceCardParser::new);

/// Parse one page with the default configuration.
///
/// `meeting_date` must be `YYYY-MM-DD`.
pub fn parse_page(lines: &[&str], meeting_date: &str) -> Result<Vec<StarterRecord>, RaceCardError> {
    let meeting: MeetingDate = meeting_date.parse()?;
    Ok(DEFAULT_PARSER.parse_page(lines, &meeting))
}

/// Race card parser
pub struct RaceCardParser {
    config: ParserConfig,
    segmenter: BlockSegmenter,
    identity: IdentityExtractor,
    pedigree: PedigreeExtractor,
    wagering: WageringDecoder,
    form: FormExtractor,
    header_pattern: Regex,
    distance_pattern: Regex,
    prize_pattern: Regex,
    race_name_prefix: Regex,
}

impl Default for RaceCardParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceCardParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            segmenter: BlockSegmenter::new(),
            identity: IdentityExtractor::new(),
            pedigree: PedigreeExtractor::new(),
            wagering: WageringDecoder::new(),
            form: FormExtractor::new(),
            header_pattern: Regex::new(
                r"^(\d{2}\.\d{2}\.\d{4})\s*-\s*([\p{L}\-]+)\s+Rennen\s*#\s*(\d+)",
            )
            .unwrap(),
            distance_pattern: Regex::new(r"(\d{3,4})\s*m").unwrap(),
            prize_pattern: Regex::new(r"([\d.]+)\s*€").unwrap(),
            race_name_prefix: Regex::new(r"^\d+\s+\d+\s*m\s*").unwrap(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Race header from the first six page lines.
    ///
    /// Line 0 carries date, venue and race number; the rest are positional
    /// (1: distance and name, 2: prize, 4: surface, 5: time).
    pub fn parse_header(&self, lines: &[&str]) -> Option<RaceHeader> {
        let first = lines.first()?;
        let caps = match self.header_pattern.captures(first) {
            Some(caps) => caps,
            None => {
                tracing::debug!("{}", ExtractIssue::mismatch("race_header", first));
                return None;
            }
        };
        let race_nr: u8 = caps[3].parse().ok()?;

        let name_line = lines.get(1).copied().unwrap_or_default();
        let distance_m = self
            .distance_pattern
            .captures(name_line)
            .and_then(|c| c[1].parse().ok());
        let race_name = self
            .race_name_prefix
            .replace(name_line, "")
            .trim()
            .to_string();

        let prize_eur = lines
            .get(2)
            .and_then(|line| self.prize_pattern.captures(line))
            .and_then(|c| c[1].replace('.', "").parse().ok());

        let surface = lines
            .get(4)
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SURFACE.to_string());
        let race_time = lines
            .get(5)
            .map(|line| line.trim().to_string())
            .unwrap_or_default();

        Some(RaceHeader {
            card_date: caps[1].to_string(),
            venue: caps[2].trim().to_string(),
            race_nr,
            distance_m,
            prize_eur,
            surface,
            race_time,
            race_name,
        })
    }

    /// Starter blocks of one page
    pub fn segment(&self, lines: &[&str]) -> Vec<Block> {
        self.segmenter.segment(lines)
    }

    /// Parse one page. A page without a race header yields nothing.
    pub fn parse_page(&self, lines: &[&str], meeting: &MeetingDate) -> Vec<StarterRecord> {
        let Some(header) = self.parse_header(lines) else {
            return Vec::new();
        };
        let race = Arc::new(header);

        let blocks = self.segment(lines);
        let field_size = blocks.len();

        let starters: Vec<StarterRecord> = blocks
            .iter()
            .filter_map(|block| self.parse_starter(block, &race, field_size, meeting))
            .collect();

        tracing::debug!(
            "{} race {}: {} starters from {} blocks",
            race.venue,
            race.race_nr,
            starters.len(),
            field_size
        );

        starters
    }

    /// Parse pages independently and concatenate in page order
    pub fn parse_document(&self, pages: &[Vec<&str>], meeting: &MeetingDate) -> Vec<StarterRecord> {
        pages
            .par_iter()
            .filter(|page| !page.is_empty())
            .map(|page| self.parse_page(page, meeting))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Build one record from a block; `None` when the header line is not
    /// an identity line
    pub fn parse_starter(
        &self,
        block: &Block,
        race: &Arc<RaceHeader>,
        field_size: usize,
        meeting: &MeetingDate,
    ) -> Option<StarterRecord> {
        let identity = self.identity.extract(block.header(), self.config.years)?;

        let pedigree = self
            .pedigree
            .pedigree(&block.lines, self.config.pedigree_search_lines);
        let connections = self.pedigree.connections(&block.text());
        let wagering = self.wagering.decode(&block.lines, &self.config.wager_layouts);
        let history = self
            .form
            .extract(&block.lines, meeting, self.config.jockey_strategy);

        let jockey = history
            .today_jockey
            .clone()
            .or_else(|| wagering.jockey.clone())
            .or_else(|| history.entries.first().map(|e| e.jockey.clone()))
            .unwrap_or_default();

        let features = FeatureComposer::compose(
            &TodayContext {
                meeting,
                race,
                weight_kg: connections.weight_kg,
                trainer: &connections.trainer,
                jockey: &jockey,
            },
            &history.entries,
        );

        Some(StarterRecord {
            meeting_date: *meeting,
            race: Arc::clone(race),
            field_size,
            start_nr: identity.start_nr,
            horse_name: identity.horse_name,
            career: CareerStats::from_years(&identity.current, &identity.previous),
            current: identity.current,
            previous: identity.previous,
            pedigree,
            connections,
            wagering,
            jockey,
            form: history.entries,
            features,
        })
    }
}
