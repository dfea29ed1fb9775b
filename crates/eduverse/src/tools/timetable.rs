//! Weekly timetable grid layout
use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::store::{parse_time, TimetableEntry};

pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 17;
pub const DAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridWindow {
    pub start_hour: u32,
    /// Exclusive. May be 24 when an entry runs up to midnight.
    pub end_hour: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridCell {
    pub entry_id: i64,
    pub subject: String,
    pub room_number: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridRow {
    pub time: String,
    /// Indexed by day of week, Sunday first
    pub cells: Vec<Option<GridCell>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimetableGrid {
    pub window: GridWindow,
    pub days: [&'static str; 7],
    pub rows: Vec<GridRow>,
}

fn entry_span(entry: &TimetableEntry) -> Option<(NaiveTime, NaiveTime)> {
    Some((parse_time(&entry.start_time)?, parse_time(&entry.end_time)?))
}

fn ceil_hour(t: NaiveTime) -> u32 {
    if t.minute() > 0 || t.second() > 0 {
        t.hour() + 1
    } else {
        t.hour()
    }
}

/// Earliest start rounded down, latest end rounded up, never narrower than 08:00 to 17:00.
pub fn grid_window(entries: &[TimetableEntry]) -> GridWindow {
    let spans: Vec<_> = entries.iter().filter_map(entry_span).collect();
    let earliest = spans.iter().map(|(s, _)| s.hour()).min();
    let latest = spans.iter().map(|(_, e)| ceil_hour(*e)).max();

    GridWindow {
        start_hour: earliest.map_or(DEFAULT_START_HOUR, |h| h.min(DEFAULT_START_HOUR)),
        end_hour: latest.map_or(DEFAULT_END_HOUR, |h| h.max(DEFAULT_END_HOUR)),
    }
}

/// One row per hour. A cell holds the entry whose `[start, end)` contains the slot.
pub fn build_grid(entries: &[TimetableEntry]) -> TimetableGrid {
    let window = grid_window(entries);
    let spans: Vec<(&TimetableEntry, NaiveTime, NaiveTime)> = entries
        .iter()
        .filter_map(|e| entry_span(e).map(|(s, end)| (e, s, end)))
        .collect();

    let rows = (window.start_hour..window.end_hour)
        .map(|hour| {
            let slot = NaiveTime::from_hms_opt(hour, 0, 0);
            let cells = (0..7i64)
                .map(|day| {
                    let slot = slot?;
                    spans
                        .iter()
                        .find(|(e, start, end)| e.day_of_week == day && *start <= slot && slot < *end)
                        .map(|(e, _, _)| GridCell {
                            entry_id: e.id,
                            subject: e.subject.clone(),
                            room_number: e.room_number.clone(),
                            start_time: e.start_time.clone(),
                            end_time: e.end_time.clone(),
                        })
                })
                .collect();
            GridRow {
                time: format!("{:02}:00", hour),
                cells,
            }
        })
        .collect();

    TimetableGrid {
        window,
        days: DAY_NAMES,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: i64, day: i64, start: &str, end: &str) -> TimetableEntry {
        TimetableEntry {
            id,
            class_id: 1,
            subject: format!("Subject {}", id),
            day_of_week: day,
            start_time: start.into(),
            end_time: end.into(),
            room_number: None,
            is_recurring: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_window_when_empty_or_inside() {
        assert_eq!(grid_window(&[]), GridWindow { start_hour: 8, end_hour: 17 });
        let inside = [entry(1, 1, "09:15", "10:00")];
        assert_eq!(grid_window(&inside), GridWindow { start_hour: 8, end_hour: 17 });
    }

    #[test]
    fn test_window_rounds_outward() {
        let entries = [entry(1, 1, "07:30", "08:30"), entry(2, 3, "16:00", "18:10")];
        assert_eq!(grid_window(&entries), GridWindow { start_hour: 7, end_hour: 19 });
    }

    #[test]
    fn test_cells_use_half_open_intervals() {
        let entries = [entry(1, 1, "09:00", "11:00"), entry(2, 1, "11:00", "12:00")];
        let grid = build_grid(&entries);
        assert_eq!(grid.rows.len(), 9);

        let at = |time: &str| {
            grid.rows
                .iter()
                .find(|r| r.time == time)
                .and_then(|r| r.cells[1].as_ref())
                .map(|c| c.entry_id)
        };
        assert_eq!(at("08:00"), None);
        assert_eq!(at("09:00"), Some(1));
        assert_eq!(at("10:00"), Some(1));
        assert_eq!(at("11:00"), Some(2));
        assert_eq!(at("12:00"), None);
        assert!(grid.rows.iter().all(|r| r.cells[0].is_none()));
    }

    #[test]
    fn test_unparseable_times_are_skipped() {
        let entries = [entry(1, 2, "noon", "13:00")];
        let grid = build_grid(&entries);
        assert_eq!(grid.window, GridWindow { start_hour: 8, end_hour: 17 });
        assert!(grid.rows.iter().all(|r| r.cells.iter().all(Option::is_none)));
    }
}
