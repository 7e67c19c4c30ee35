//! Flat export of starter records
//!
//! One row per starter with a fixed, ordered column set. Absent values are
//! written as empty cells.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ReferenceYears;
use crate::error::RaceCardError;
use crate::models::{StarterRecord, YearlyStats, FORM_SLOTS};

const RACE_COLUMNS: [&str; 9] = [
    "meeting_date",
    "venue",
    "race_nr",
    "race_time",
    "race_name",
    "distance_m",
    "prize_eur",
    "surface",
    "field_size",
];

const STARTER_COLUMNS: [&str; 14] = [
    "start_nr",
    "horse_name",
    "age",
    "gender",
    "color",
    "sire",
    "dam",
    "trainer",
    "owner",
    "breeder",
    "jockey",
    "weight_kg",
    "box_nr",
    "ml_odds",
];

const YEAR_COLUMNS: [&str; 6] = ["starts", "wins", "places", "prize", "win_pct", "place_pct"];

const CAREER_COLUMNS: [&str; 4] = [
    "total_starts",
    "total_wins",
    "career_win_pct",
    "career_roi_approx",
];

const FORM_COLUMNS: [&str; 8] = [
    "date", "venue", "place", "weight", "distance", "prize", "odds", "jockey",
];

const FEATURE_COLUMNS: [&str; 7] = [
    "days_since_last_run",
    "avg_place_last5",
    "distance_diff_m",
    "weight_diff_kg",
    "venue_repeat",
    "jockey_change",
    "trainer_jockey_combo",
];

/// Ordered export columns; year-specific names follow `years`
pub fn columns(years: ReferenceYears) -> Vec<String> {
    let mut cols: Vec<String> = RACE_COLUMNS.iter().map(|c| c.to_string()).collect();
    cols.extend(STARTER_COLUMNS.iter().map(|c| c.to_string()));

    for year in [years.current, years.previous] {
        cols.extend(YEAR_COLUMNS.iter().map(|c| format!("{}_{}", c, year)));
    }

    cols.extend(CAREER_COLUMNS.iter().map(|c| c.to_string()));

    for slot in 1..=FORM_SLOTS {
        cols.extend(FORM_COLUMNS.iter().map(|c| format!("r{}_{}", slot, c)));
    }

    cols.extend(FEATURE_COLUMNS.iter().map(|c| c.to_string()));
    cols
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn year_cells(stats: &YearlyStats) -> [String; 6] {
    [
        stats.starts.to_string(),
        stats.wins.to_string(),
        stats.places.to_string(),
        stats.prize.to_string(),
        stats.win_pct().to_string(),
        stats.place_pct().to_string(),
    ]
}

impl StarterRecord {
    /// Cells in `columns()` order
    pub fn to_row(&self) -> Vec<String> {
        let race = &self.race;
        let ped = &self.pedigree;
        let conn = &self.connections;
        let feat = &self.features;

        let mut row = vec![
            self.meeting_date.to_string(),
            race.venue.clone(),
            race.race_nr.to_string(),
            race.race_time.clone(),
            race.race_name.clone(),
            cell(race.distance_m),
            cell(race.prize_eur),
            race.surface.clone(),
            self.field_size.to_string(),
            self.start_nr.to_string(),
            self.horse_name.clone(),
            cell(ped.age),
            cell(ped.gender.as_deref()),
            cell(ped.color.as_deref()),
            cell(ped.sire.as_deref()),
            cell(ped.dam.as_deref()),
            conn.trainer.clone(),
            conn.owner.clone(),
            conn.breeder.clone(),
            self.jockey.clone(),
            cell(conn.weight_kg),
            cell(self.wagering.box_nr),
            cell(self.wagering.ml_odds),
        ];

        row.extend(year_cells(&self.current));
        row.extend(year_cells(&self.previous));

        row.extend([
            self.career.total_starts.to_string(),
            self.career.total_wins.to_string(),
            self.career.career_win_pct.to_string(),
            self.career.career_roi_approx.to_string(),
        ]);

        for slot in 0..FORM_SLOTS {
            match self.form.get(slot) {
                Some(entry) => row.extend([
                    entry.date.clone(),
                    entry.venue.clone(),
                    entry.place.to_string(),
                    entry.weight.to_string(),
                    entry.distance.to_string(),
                    cell(entry.prize),
                    cell(entry.odds),
                    entry.jockey.clone(),
                ]),
                None => row.extend(std::iter::repeat(String::new()).take(FORM_COLUMNS.len())),
            }
        }

        row.extend([
            cell(feat.days_since_last_run),
            cell(feat.avg_place_last5),
            cell(feat.distance_diff_m),
            cell(feat.weight_diff_kg),
            feat.venue_repeat.to_string(),
            cell(feat.jockey_change),
            feat.trainer_jockey_combo.clone(),
        ]);

        row
    }
}

/// Quote a CSV cell if it contains a separator, quote or line break
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write records as CSV with a header row
pub fn write_csv_to<W: Write>(
    writer: &mut W,
    years: ReferenceYears,
    records: &[StarterRecord],
) -> std::io::Result<()> {
    writeln!(writer, "{}", columns(years).join(","))?;

    for record in records {
        let values: Vec<String> = record.to_row().iter().map(|v| escape_csv(v)).collect();
        writeln!(writer, "{}", values.join(","))?;
    }

    writer.flush()
}

pub fn write_csv(path: &Path, years: ReferenceYears, records: &[StarterRecord]) -> Result<(), RaceCardError> {
    let io_err = |source| RaceCardError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_csv_to(&mut writer, years, records).map_err(io_err)
}

/// Write records as a pretty-printed JSON array
pub fn write_json(path: &Path, records: &[StarterRecord]) -> Result<(), RaceCardError> {
    let file = File::create(path).map_err(|source| RaceCardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}
