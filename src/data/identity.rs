//! Start number, horse name and yearly stats from a block's header line

use regex::Regex;

use crate::config::ReferenceYears;
use crate::error::ExtractIssue;
use crate::models::YearlyStats;

/// Identity fields of one starter
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub start_nr: u8,
    pub horse_name: String,
    pub current: YearlyStats,
    pub previous: YearlyStats,
}

pub struct IdentityExtractor {
    identity_pattern: Regex,
    stats_pattern: Regex,
}

impl Default for IdentityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityExtractor {
    pub fn new() -> Self {
        Self {
            identity_pattern: Regex::new(r"^(\d{1,2})\s+(\p{Lu}[\p{L}\s'\-]+)").unwrap(),
            // Platz/Plätze and Sieg/Siege both occur
            stats_pattern: Regex::new(
                r"(\d{4}):\s*(\d+)\s+Starts?\s*-\s*(\d+)\s+Siege?\s*-\s*(\d+)\s+(?:Plätze|Platz)\s*([\d.]+)\s*€",
            )
            .unwrap(),
        }
    }

    /// Extract identity and stats. `None` rejects the whole block.
    pub fn extract(&self, header: &str, years: ReferenceYears) -> Option<Identity> {
        let caps = match self.identity_pattern.captures(header) {
            Some(caps) => caps,
            None => {
                tracing::debug!("{}", ExtractIssue::mismatch("identity", header));
                return None;
            }
        };

        let start_nr: u8 = caps[1].parse().ok()?;
        let horse_name = caps[2].trim().to_string();

        let mut current = YearlyStats::empty(years.current);
        let mut previous = YearlyStats::empty(years.previous);

        for stats in self.yearly_stats(header) {
            if stats.year == years.current {
                current = stats;
            } else if stats.year == years.previous {
                previous = stats;
            }
        }

        Some(Identity {
            start_nr,
            horse_name,
            current,
            previous,
        })
    }

    /// Every yearly-stats occurrence on the line, in order
    pub fn yearly_stats(&self, line: &str) -> Vec<YearlyStats> {
        self.stats_pattern
            .captures_iter(line)
            .filter_map(|caps| {
                let prize_raw = caps[5].replace('.', "");
                let parsed = (
                    caps[1].parse::<u16>(),
                    caps[2].parse::<u32>(),
                    caps[3].parse::<u32>(),
                    caps[4].parse::<u32>(),
                    prize_raw.parse::<u64>(),
                );

                match parsed {
                    (Ok(year), Ok(starts), Ok(wins), Ok(places), Ok(prize)) => Some(YearlyStats {
                        year,
                        starts,
                        wins,
                        places,
                        prize,
                    }),
                    _ => {
                        tracing::trace!(
                            "{}",
                            ExtractIssue::NumericConversion {
                                field: "yearly_stats",
                                raw: caps[0].to_string(),
                            }
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
