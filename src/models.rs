use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RaceCardError;

/// Number of prior-race slots on a starter record
pub const FORM_SLOTS: usize = 5;

/// Finish places at or above this value are non-finish markers
pub const NON_FINISH_PLACE: u8 = 20;

/// Calendar date of the meeting being parsed (`YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeetingDate(NaiveDate);

impl MeetingDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// `DD.MM` key used by form lines, e.g. "01.02" for 2026-02-01
    pub fn today_key(&self) -> String {
        format!("{:02}.{:02}", self.0.day(), self.0.month())
    }
}

impl FromStr for MeetingDate {
    type Err = RaceCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(MeetingDate)
            .map_err(|_| RaceCardError::InvalidMeetingDate(s.to_string()))
    }
}

impl fmt::Display for MeetingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Race-level fields parsed once per page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceHeader {
    /// Date as printed in the header line (`DD.MM.YYYY`)
    pub card_date: String,
    pub venue: String,
    pub race_nr: u8,
    pub distance_m: Option<u32>,
    pub prize_eur: Option<u64>,
    pub surface: String,
    pub race_time: String,
    pub race_name: String,
}

/// Aggregate performance for one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub year: u16,
    pub starts: u32,
    pub wins: u32,
    pub places: u32,
    pub prize: u64,
}

impl YearlyStats {
    pub fn empty(year: u16) -> Self {
        Self {
            year,
            starts: 0,
            wins: 0,
            places: 0,
            prize: 0,
        }
    }

    pub fn win_pct(&self) -> f64 {
        ratio(self.wins as f64, self.starts as f64, 4)
    }

    pub fn place_pct(&self) -> f64 {
        ratio(self.places as f64, self.starts as f64, 4)
    }
}

/// Career aggregates over both reference years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    pub total_starts: u32,
    pub total_wins: u32,
    pub career_win_pct: f64,
    pub career_roi_approx: f64,
}

impl CareerStats {
    pub fn from_years(current: &YearlyStats, previous: &YearlyStats) -> Self {
        let starts = current.starts.saturating_add(previous.starts);
        let wins = current.wins.saturating_add(previous.wins);
        let prize = current.prize.saturating_add(previous.prize);

        Self {
            total_starts: starts,
            total_wins: wins,
            career_win_pct: ratio(wins as f64, starts as f64, 4),
            career_roi_approx: ratio(prize as f64, starts as f64, 2),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pedigree {
    pub age: Option<u8>,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub sire: Option<String>,
    pub dam: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    pub trainer: String,
    pub owner: String,
    pub breeder: String,
    pub weight_kg: Option<f64>,
}

/// Decoded Box/ML(/Jockey) line. Unset fields stay `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wagering {
    pub box_nr: Option<u32>,
    pub ml_odds: Option<f64>,
    pub jockey: Option<String>,
}

/// One prior race result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormEntry {
    /// `DD.MM`
    pub date: String,
    pub venue: String,
    pub place: u8,
    pub weight: f64,
    pub distance: u32,
    pub prize: Option<u64>,
    pub odds: Option<f64>,
    pub jockey: String,
}

impl FormEntry {
    /// Whether the place is a real finish (not a non-finish marker)
    pub fn finished(&self) -> bool {
        self.place < NON_FINISH_PLACE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub days_since_last_run: Option<i64>,
    pub avg_place_last5: Option<f64>,
    pub distance_diff_m: Option<i64>,
    pub weight_diff_kg: Option<f64>,
    pub venue_repeat: u8,
    pub jockey_change: Option<u8>,
    pub trainer_jockey_combo: String,
}

/// One entrant, fully populated by a single page parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarterRecord {
    pub meeting_date: MeetingDate,
    pub race: Arc<RaceHeader>,
    pub field_size: usize,
    pub start_nr: u8,
    pub horse_name: String,
    pub current: YearlyStats,
    pub previous: YearlyStats,
    pub career: CareerStats,
    pub pedigree: Pedigree,
    pub connections: Connections,
    pub wagering: Wagering,
    /// Today's jockey
    pub jockey: String,
    /// Newest first, at most `FORM_SLOTS`
    pub form: Vec<FormEntry>,
    pub features: DerivedFeatures,
}

impl StarterRecord {
    /// Most recent prior race, if any
    pub fn last_run(&self) -> Option<&FormEntry> {
        self.form.first()
    }
}

/// `num / den` rounded to `places` decimals, 0 when `den` is 0
pub fn ratio(num: f64, den: f64, places: i32) -> f64 {
    if den > 0.0 {
        round_to(num / den, places)
    } else {
        0.0
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_date_parse() {
        let date: MeetingDate = "2026-02-01".parse().unwrap();
        assert_eq!(date.year(), 2026);
        assert_eq!(date.month(), 2);
        assert_eq!(date.today_key(), "01.02");
        assert_eq!(date.to_string(), "2026-02-01");
    }

    #[test]
    fn test_meeting_date_invalid() {
        assert!("01.02.2026".parse::<MeetingDate>().is_err());
        assert!("2026-02-30".parse::<MeetingDate>().is_err());
        assert!("".parse::<MeetingDate>().is_err());
    }

    #[test]
    fn test_yearly_stats_pct() {
        let stats = YearlyStats {
            year: 2025,
            starts: 10,
            wins: 3,
            places: 2,
            prize: 15000,
        };
        assert_eq!(stats.win_pct(), 0.3);
        assert_eq!(stats.place_pct(), 0.2);

        let empty = YearlyStats::empty(2024);
        assert_eq!(empty.win_pct(), 0.0);
        assert_eq!(empty.place_pct(), 0.0);
    }

    #[test]
    fn test_career_stats() {
        let current = YearlyStats {
            year: 2025,
            starts: 10,
            wins: 3,
            places: 2,
            prize: 15000,
        };
        let previous = YearlyStats {
            year: 2024,
            starts: 6,
            wins: 1,
            places: 1,
            prize: 3200,
        };

        let career = CareerStats::from_years(&current, &previous);
        assert_eq!(career.total_starts, 16);
        assert_eq!(career.total_wins, 4);
        assert_eq!(career.career_win_pct, 0.25);
        assert_eq!(career.career_roi_approx, 1137.5);
    }

    #[test]
    fn test_career_stats_no_starts() {
        let career = CareerStats::from_years(&YearlyStats::empty(2025), &YearlyStats::empty(2024));
        assert_eq!(career.total_starts, 0);
        assert_eq!(career.career_win_pct, 0.0);
        assert_eq!(career.career_roi_approx, 0.0);
    }

    #[test]
    fn test_career_stats_saturate() {
        let current = YearlyStats {
            year: 2025,
            starts: u32::MAX,
            wins: u32::MAX,
            places: 0,
            prize: u64::MAX,
        };
        let previous = YearlyStats {
            year: 2024,
            starts: 1,
            wins: 1,
            places: 0,
            prize: 1,
        };

        let career = CareerStats::from_years(&current, &previous);
        assert_eq!(career.total_starts, u32::MAX);
        assert_eq!(career.total_wins, u32::MAX);
        assert_eq!(career.career_win_pct, 1.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.0 / 6.0, 4), 0.1667);
        assert_eq!(round_to(-0.5000001, 1), -0.5);
        assert_eq!(ratio(1.0, 0.0, 2), 0.0);
    }
}
