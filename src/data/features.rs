//! Feature Engineering
//!
//! Derived features from a starter's form history and today's race

use chrono::NaiveDate;

use crate::models::{round_to, DerivedFeatures, FormEntry, MeetingDate, RaceHeader};

/// Inputs the composer needs besides the form history
#[derive(Debug, Clone, Copy)]
pub struct TodayContext<'a> {
    pub meeting: &'a MeetingDate,
    pub race: &'a RaceHeader,
    pub weight_kg: Option<f64>,
    pub trainer: &'a str,
    pub jockey: &'a str,
}

/// Feature composition for a single starter
pub struct FeatureComposer;

impl FeatureComposer {
    /// Compute all derived features
    pub fn compose(today: &TodayContext, form: &[FormEntry]) -> DerivedFeatures {
        let last = form.first();

        DerivedFeatures {
            days_since_last_run: last.and_then(|e| Self::days_since(&e.date, today.meeting)),
            avg_place_last5: Self::avg_place(form),
            distance_diff_m: last.and_then(|e| {
                today
                    .race
                    .distance_m
                    .map(|d| d as i64 - e.distance as i64)
            }),
            weight_diff_kg: last
                .and_then(|e| today.weight_kg.map(|w| round_to(w - e.weight, 1))),
            venue_repeat: Self::venue_repeat(form, &today.race.venue),
            jockey_change: last.and_then(|e| Self::jockey_change(today.jockey, &e.jockey)),
            trainer_jockey_combo: format!("{}|{}", today.trainer, today.jockey),
        }
    }

    /// Resolve the year of a `DD.MM` form date relative to the meeting.
    ///
    /// Same year when the entry month is not after the meeting month,
    /// otherwise the year before. A date that would still land after the
    /// meeting (same month, later day) moves back one more year.
    pub fn infer_form_date(ddmm: &str, meeting: &MeetingDate) -> Option<NaiveDate> {
        let (dd, mm) = ddmm.split_once('.')?;
        let day: u32 = dd.parse().ok()?;
        let month: u32 = mm.parse().ok()?;

        let year = if month <= meeting.month() {
            meeting.year()
        } else {
            meeting.year() - 1
        };

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if date > meeting.date() {
            NaiveDate::from_ymd_opt(year - 1, month, day)
        } else {
            Some(date)
        }
    }

    pub fn days_since(ddmm: &str, meeting: &MeetingDate) -> Option<i64> {
        let last = Self::infer_form_date(ddmm, meeting)?;
        Some((meeting.date() - last).num_days())
    }

    /// Mean finish place, non-finish markers excluded
    pub fn avg_place(form: &[FormEntry]) -> Option<f64> {
        let places: Vec<f64> = form
            .iter()
            .filter(|e| e.finished())
            .map(|e| e.place as f64)
            .collect();

        if places.is_empty() {
            None
        } else {
            Some(round_to(places.iter().sum::<f64>() / places.len() as f64, 2))
        }
    }

    pub fn venue_repeat(form: &[FormEntry], venue: &str) -> u8 {
        u8::from(form.iter().any(|e| e.venue == venue))
    }

    /// 0 when the last-name tokens match exactly, 1 when they differ,
    /// `None` when either jockey is unknown
    pub fn jockey_change(current: &str, previous: &str) -> Option<u8> {
        let current_last = current.split_whitespace().last()?;
        let previous_last = previous.split_whitespace().last()?;
        Some(u8::from(current_last != previous_last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting() -> MeetingDate {
        "2026-02-01".parse().unwrap()
    }

    fn race() -> RaceHeader {
        RaceHeader {
            card_date: "01.02.2026".to_string(),
            venue: "Dortmund".to_string(),
            race_nr: 3,
            distance_m: Some(1600),
            prize_eur: Some(5100),
            surface: "Sand".to_string(),
            race_time: "13:45".to_string(),
            race_name: "Preis der Sparkasse".to_string(),
        }
    }

    fn entry(date: &str, venue: &str, place: u8, weight: f64, distance: u32, jockey: &str) -> FormEntry {
        FormEntry {
            date: date.to_string(),
            venue: venue.to_string(),
            place,
            weight,
            distance,
            prize: Some(1000),
            odds: Some(5.0),
            jockey: jockey.to_string(),
        }
    }

    #[test]
    fn test_days_since_same_year() {
        assert_eq!(FeatureComposer::days_since("15.01", &meeting()), Some(17));
    }

    #[test]
    fn test_days_since_previous_year() {
        assert_eq!(FeatureComposer::days_since("20.12", &meeting()), Some(43));
    }

    #[test]
    fn test_days_since_never_negative() {
        // Same month, later day: must be last year's race
        let days = FeatureComposer::days_since("15.02", &meeting()).unwrap();
        assert!(days >= 0);
        assert_eq!(days, 365 - 14);
    }

    #[test]
    fn test_days_since_invalid_date() {
        assert_eq!(FeatureComposer::days_since("30.02", &meeting()), None);
        assert_eq!(FeatureComposer::days_since("garbage", &meeting()), None);
    }

    #[test]
    fn test_avg_place_excludes_non_finish() {
        let form = vec![
            entry("15.01", "Köln", 3, 58.0, 1600, "A B"),
            entry("02.01", "Köln", 25, 58.0, 1600, "A B"),
            entry("20.12", "Köln", 2, 58.0, 1600, "A B"),
        ];
        assert_eq!(FeatureComposer::avg_place(&form), Some(2.5));
    }

    #[test]
    fn test_avg_place_empty_when_no_finish() {
        let form = vec![entry("15.01", "Köln", 20, 58.0, 1600, "A B")];
        assert_eq!(FeatureComposer::avg_place(&form), None);
        assert_eq!(FeatureComposer::avg_place(&[]), None);
    }

    #[test]
    fn test_jockey_change_truth_table() {
        assert_eq!(FeatureComposer::jockey_change("Anna Schmidt", "Lea Schmidt"), Some(0));
        assert_eq!(FeatureComposer::jockey_change("Anna Schmidt", "Anna Meier"), Some(1));
        assert_eq!(FeatureComposer::jockey_change("Anna Schmidt", "anna schmidt"), Some(1));
        assert_eq!(FeatureComposer::jockey_change("", "Anna Meier"), None);
        assert_eq!(FeatureComposer::jockey_change("Anna Schmidt", ""), None);
    }

    #[test]
    fn test_compose_full() {
        let meeting = meeting();
        let race = race();
        let today = TodayContext {
            meeting: &meeting,
            race: &race,
            weight_kg: Some(58.0),
            trainer: "Markus Klug",
            jockey: "Anna Schmidt",
        };
        let form = vec![
            entry("15.01", "Dortmund", 3, 58.5, 1800, "Bauyrzhan Murzabayev"),
            entry("02.01", "Neuss", 2, 61.0, 1600, "Max Meier"),
        ];

        let f = FeatureComposer::compose(&today, &form);
        assert_eq!(f.days_since_last_run, Some(17));
        assert_eq!(f.avg_place_last5, Some(2.5));
        assert_eq!(f.distance_diff_m, Some(-200));
        assert_eq!(f.weight_diff_kg, Some(-0.5));
        assert_eq!(f.venue_repeat, 1);
        assert_eq!(f.jockey_change, Some(1));
        assert_eq!(f.trainer_jockey_combo, "Markus Klug|Anna Schmidt");
    }

    #[test]
    fn test_compose_without_history() {
        let meeting = meeting();
        let race = race();
        let today = TodayContext {
            meeting: &meeting,
            race: &race,
            weight_kg: Some(58.0),
            trainer: "",
            jockey: "",
        };

        let f = FeatureComposer::compose(&today, &[]);
        assert_eq!(f.days_since_last_run, None);
        assert_eq!(f.avg_place_last5, None);
        assert_eq!(f.distance_diff_m, None);
        assert_eq!(f.weight_diff_kg, None);
        assert_eq!(f.venue_repeat, 0);
        assert_eq!(f.jockey_change, None);
        assert_eq!(f.trainer_jockey_combo, "|");
    }

    #[test]
    fn test_compose_missing_operands() {
        let meeting = meeting();
        let mut race = race();
        race.distance_m = None;
        let today = TodayContext {
            meeting: &meeting,
            race: &race,
            weight_kg: None,
            trainer: "T",
            jockey: "J K",
        };
        let form = vec![entry("15.01", "Köln", 3, 58.5, 1800, "X K")];

        let f = FeatureComposer::compose(&today, &form);
        assert_eq!(f.distance_diff_m, None);
        assert_eq!(f.weight_diff_kg, None);
        assert_eq!(f.jockey_change, Some(0));
    }
}
