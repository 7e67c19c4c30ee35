//! Decoder for the scrambled Box/ML/Jockey line
//!
//! Overlapping columns turn the "Box / ML / Jockey" header row into a line
//! like `B M o L x : : 12 5 ,5 0`: the odds integer, the box digits, the
//! odds decimal and an optional extra box digit. Later card revisions also
//! carry the jockey name after those numbers.

use regex::{Captures, Regex};

use crate::config::WagerLayout;
use crate::error::ExtractIssue;
use crate::models::Wagering;

/// Maximum tokens kept from a wagering-line jockey name
const JOCKEY_MAX_TOKENS: usize = 3;

pub struct WageringDecoder {
    marker: Regex,
    odds_and_box: Regex,
    with_jockey: Regex,
}

impl Default for WageringDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WageringDecoder {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"B\s+M\s+o\s+L").unwrap(),
            odds_and_box: Regex::new(r":\s*(\d+)\s+(\d+)\s*,(\d)\s*(\d*)").unwrap(),
            with_jockey: Regex::new(
                r":\s*(\d+)\s+(\d+)\s*,(\d)\s*(\d*)\s+(\p{Lu}.*?)\s*(?:\d{2}\.\d{2}|$)",
            )
            .unwrap(),
        }
    }

    /// First block line carrying the Box/ML marker
    pub fn find_line<'a>(&self, lines: &'a [String]) -> Option<&'a str> {
        lines
            .iter()
            .map(String::as_str)
            .find(|line| self.marker.is_match(line))
    }

    /// Decode the block's wagering line, trying layouts in order
    pub fn decode(&self, lines: &[String], layouts: &[WagerLayout]) -> Wagering {
        let Some(line) = self.find_line(lines) else {
            return Wagering::default();
        };

        for layout in layouts {
            if let Some(wagering) = self.decode_line(line, *layout) {
                return wagering;
            }
        }

        tracing::trace!("{}", ExtractIssue::mismatch("wagering", line));
        Wagering::default()
    }

    /// Decode one line with one layout
    pub fn decode_line(&self, line: &str, layout: WagerLayout) -> Option<Wagering> {
        match layout {
            WagerLayout::OddsAndBox => {
                let caps = self.odds_and_box.captures(line)?;
                Some(odds_and_box(&caps))
            }
            WagerLayout::WithJockey => {
                let caps = self.with_jockey.captures(line)?;
                let mut wagering = odds_and_box(&caps);
                wagering.jockey = Some(first_tokens(&caps[5], JOCKEY_MAX_TOKENS))
                    .filter(|name| !name.is_empty());
                Some(wagering)
            }
        }
    }
}

/// Odds = integer "." decimal; box = primary digits plus the extra digit
/// fragment when present.
///
/// A box whose trailing zero was dropped by extraction cannot be told
/// apart from a single-digit box.
fn odds_and_box(caps: &Captures) -> Wagering {
    let odds_raw = format!("{}.{}", &caps[1], &caps[3]);
    let box_raw = match caps.get(4).map(|m| m.as_str()) {
        Some(extra) if !extra.is_empty() => format!("{}{}", &caps[2], extra),
        _ => caps[2].to_string(),
    };

    Wagering {
        box_nr: parse_or_trace(&box_raw, "box_nr"),
        ml_odds: parse_or_trace(&odds_raw, "ml_odds"),
        jockey: None,
    }
}

fn parse_or_trace<T: std::str::FromStr>(raw: &str, field: &'static str) -> Option<T> {
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::trace!(
                "{}",
                ExtractIssue::NumericConversion {
                    field,
                    raw: raw.to_string(),
                }
            );
            None
        }
    }
}

/// Up to `n` whitespace-separated tokens, joined by single spaces
pub fn first_tokens(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}
