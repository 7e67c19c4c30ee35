//! Pedigree (age, color, gender, sire, dam) and connections
//! (trainer, owner, breeder, weight)

use regex::Regex;

use crate::error::ExtractIssue;
use crate::models::{Connections, Pedigree};

/// Layout rule: the declared weight is printed at the start of the owner
/// line (`58.00 Besitzer: ...`). This is an artifact of the card's column
/// layout, not a relation between weight and owner. Revisit if the layout
/// changes.
pub const WEIGHT_ON_OWNER_LINE: &str = r"(?m)^(\d{2}\.\d{2})\s+Besitzer:";

pub struct PedigreeExtractor {
    pedigree_pattern: Regex,
    trainer_pattern: Regex,
    owner_pattern: Regex,
    breeder_pattern: Regex,
    weight_pattern: Regex,
}

impl Default for PedigreeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PedigreeExtractor {
    pub fn new() -> Self {
        Self {
            pedigree_pattern: Regex::new(
                r"^(\d+)j\.\s+(\w+)\s+([A-Z])\s+\(([^-]+)\s*-\s*([^)]+)\)",
            )
            .unwrap(),
            trainer_pattern: label_pattern("Trainer"),
            owner_pattern: label_pattern("Besitzer"),
            breeder_pattern: label_pattern("Züchter"),
            weight_pattern: Regex::new(WEIGHT_ON_OWNER_LINE).unwrap(),
        }
    }

    /// Search block lines `1..=search_lines` for the pedigree; first match wins
    pub fn pedigree(&self, lines: &[String], search_lines: usize) -> Pedigree {
        lines
            .iter()
            .skip(1)
            .take(search_lines)
            .find_map(|line| self.parse_pedigree_line(line))
            .unwrap_or_default()
    }

    fn parse_pedigree_line(&self, line: &str) -> Option<Pedigree> {
        let caps = self.pedigree_pattern.captures(line)?;

        let age = caps[1].parse::<u8>().ok();
        if age.is_none() {
            tracing::trace!(
                "{}",
                ExtractIssue::NumericConversion {
                    field: "age",
                    raw: caps[1].to_string(),
                }
            );
        }

        Some(Pedigree {
            age,
            color: Some(caps[2].to_string()),
            gender: Some(caps[3].to_string()),
            sire: Some(caps[4].trim().to_string()),
            dam: Some(caps[5].trim().to_string()),
        })
    }

    /// Labelled fields anywhere in the block text
    pub fn connections(&self, text: &str) -> Connections {
        Connections {
            trainer: label_value(&self.trainer_pattern, text),
            owner: label_value(&self.owner_pattern, text),
            breeder: label_value(&self.breeder_pattern, text),
            weight_kg: self.weight(text),
        }
    }

    fn weight(&self, text: &str) -> Option<f64> {
        let caps = self.weight_pattern.captures(text)?;
        caps[1].parse::<f64>().ok()
    }
}

fn label_pattern(label: &str) -> Regex {
    Regex::new(&format!(r"{}:\s*(.+)", regex::escape(label))).unwrap()
}

/// Rest of the line after the label, trimmed; empty when absent
fn label_value(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}
