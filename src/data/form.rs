//! Prior-race (form) history
//!
//! Form entries appear anywhere in a block, several per physical line:
//!
//! ```text
//! 15.01Dortmund 358.5 1800 1.200 12,5 Bauyrzhan Murzabayev Horse A, Horse B 02.01Neuss ...
//! ^date^venue   ^place+weight    ^prize ^odds  ^trailing text (jockey, rivals)
//! ```
//!
//! The trailing text of an entry runs up to the next `DD.MMVenue` token or
//! the end of the line.

use regex::Regex;

use crate::config::JockeyStrategy;
use crate::error::ExtractIssue;
use crate::models::{FormEntry, MeetingDate, FORM_SLOTS};

/// Form history of one block plus today's entry, if printed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormHistory {
    /// Newest first, at most `FORM_SLOTS`, today's race excluded
    pub entries: Vec<FormEntry>,
    /// Jockey taken from the entry dated on the meeting day
    pub today_jockey: Option<String>,
}

pub struct FormExtractor {
    entry_head: Regex,
    next_entry: Regex,
}

impl Default for FormExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormExtractor {
    pub fn new() -> Self {
        Self {
            entry_head: Regex::new(
                r"(\d{2}\.\d{2})([\p{L}\-]+)\s+(\d{1,2})(\d{2}\.\d+)\s+(\d{3,4})\s+([\d.]+)\s*([\d,]+)\s+",
            )
            .unwrap(),
            next_entry: Regex::new(r"\d{2}\.\d{2}\p{L}").unwrap(),
        }
    }

    /// All form entries on one line, in document order
    pub fn entries_on_line(&self, line: &str, strategy: JockeyStrategy) -> Vec<FormEntry> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.entry_head.captures_at(line, pos) {
            let head_end = caps.get(0).map(|m| m.end()).unwrap_or(line.len());
            let rest_end = self
                .next_entry
                .find_at(line, head_end)
                .map(|m| m.start())
                .unwrap_or(line.len());
            let rest = line[head_end..rest_end].trim();
            pos = rest_end.max(head_end);

            if rest.is_empty() {
                tracing::trace!("{}", ExtractIssue::PartialData { field: "form_rest" });
                continue;
            }

            let (Ok(place), Ok(weight), Ok(distance)) = (
                caps[3].parse::<u8>(),
                caps[4].parse::<f64>(),
                caps[5].parse::<u32>(),
            ) else {
                tracing::trace!(
                    "{}",
                    ExtractIssue::NumericConversion {
                        field: "form_entry",
                        raw: caps[0].to_string(),
                    }
                );
                continue;
            };

            entries.push(FormEntry {
                date: caps[1].to_string(),
                venue: caps[2].to_string(),
                place,
                weight,
                distance,
                prize: caps[6].replace('.', "").parse().ok(),
                odds: caps[7].replace(',', ".").parse().ok(),
                jockey: jockey_from_rest(rest, strategy),
            });
        }

        entries
    }

    /// Collect the block's form history (header line excluded).
    ///
    /// An entry dated on the meeting day supplies today's jockey instead of a
    /// history slot. Only the first `FORM_SLOTS` other entries are kept.
    pub fn extract(
        &self,
        lines: &[String],
        meeting: &MeetingDate,
        strategy: JockeyStrategy,
    ) -> FormHistory {
        let today = meeting.today_key();
        let mut history = FormHistory::default();

        for line in lines.iter().skip(1) {
            for entry in self.entries_on_line(line, strategy) {
                if entry.date == today {
                    history.today_jockey = Some(entry.jockey).filter(|j| !j.is_empty());
                    continue;
                }
                if history.entries.len() < FORM_SLOTS {
                    history.entries.push(entry);
                }
            }
        }

        history
    }
}

/// Cut the jockey name out of an entry's trailing text
pub fn jockey_from_rest(rest: &str, strategy: JockeyStrategy) -> String {
    match strategy {
        JockeyStrategy::TwoToken => two_token_jockey(rest),
        JockeyStrategy::CommaThreeToken => comma_three_token_jockey(rest),
    }
}

/// "Vorname Nachname Horse1, Horse2" -> "Vorname Nachname"
pub fn two_token_jockey(rest: &str) -> String {
    rest.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Text before the first comma, at most three tokens
pub fn comma_three_token_jockey(rest: &str) -> String {
    let head = rest.split(',').next().unwrap_or_default();
    head.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}
