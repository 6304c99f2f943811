use super::PersistenceResult;
use crate::timetable::{Timetable, TimetableData};
use crate::view::{EntryRow, ViewFilter};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

pub fn save_timetable_to_json<P: AsRef<Path>>(
    timetable: &Timetable,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &timetable.to_data())?;
    Ok(())
}

/// Loads a saved timetable. The stored entries are re-checked, so a file with
/// clashing or dangling entries is rejected as invalid data.
pub fn load_timetable_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Timetable> {
    let file = File::open(path)?;
    let data: TimetableData = serde_json::from_reader(file)?;
    Ok(Timetable::from_data(data)?)
}

#[derive(Serialize)]
struct EntryCsvRecord<'a> {
    day: &'a str,
    start: &'a str,
    end: &'a str,
    subject: &'a str,
    subject_code: &'a str,
    teacher: &'a str,
    class: &'a str,
    batch: &'a str,
    lab_room: &'a str,
    is_lab: bool,
}

impl<'a> From<&'a EntryRow> for EntryCsvRecord<'a> {
    fn from(row: &'a EntryRow) -> Self {
        Self {
            day: &row.day,
            start: &row.start,
            end: &row.end,
            subject: &row.subject,
            subject_code: &row.subject_code,
            teacher: &row.teacher,
            class: &row.class,
            batch: &row.batch,
            lab_room: &row.lab_room,
            is_lab: row.is_lab,
        }
    }
}

/// Writes the rows selected by `filter` as CSV, one line per entry.
/// Returns the number of rows written.
pub fn export_rows_to_csv<P: AsRef<Path>>(
    timetable: &Timetable,
    filter: &ViewFilter,
    path: P,
) -> PersistenceResult<usize> {
    let rows = timetable.rows(filter);
    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(EntryCsvRecord::from(row))?;
    }
    writer.flush()?;
    Ok(rows.len())
}
