//! Projection of a flat entry list into a `[day][slot]` presentation grid.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ScheduleEntry;
use crate::time::{DayOfWeek, SlotTable, TimeSlot};

pub const EMPTY_CELL: &str = "-";
pub const PARALLEL_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScheduleGrid {
    pub days: Vec<DayOfWeek>,
    pub slots: Vec<TimeSlot>,
    /// `cells[day_index][slot_index]`, each cell ordered by start time.
    pub cells: Vec<Vec<Vec<ScheduleEntry>>>,
    /// Entries on a requested day whose start time matches no slot.
    pub unplaced: Vec<ScheduleEntry>,
}

impl ScheduleGrid {
    pub fn cell(&self, day: DayOfWeek, slot_index: usize) -> &[ScheduleEntry] {
        self.days
            .iter()
            .position(|d| *d == day)
            .and_then(|day_index| self.cells.get(day_index))
            .and_then(|column| column.get(slot_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn placed_count(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    /// Header row followed by one row per slot, as consumed by print renderers.
    /// Each cell lists subject, class, teacher and classroom of every lesson in it.
    pub fn to_table(&self, teacher_names: &HashMap<Uuid, String>) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.slots.len() + 1);

        let mut header = vec!["Time".to_string()];
        header.extend(self.days.iter().map(|d| d.name().to_string()));
        rows.push(header);

        for (slot_index, slot) in self.slots.iter().enumerate() {
            let mut row = vec![slot.label()];
            for column in &self.cells {
                let lessons: Vec<String> = column
                    .get(slot_index)
                    .into_iter()
                    .flatten()
                    .map(|entry| describe(entry, teacher_names))
                    .collect();
                if lessons.is_empty() {
                    row.push(EMPTY_CELL.to_string());
                } else {
                    row.push(lessons.join(PARALLEL_SEPARATOR));
                }
            }
            rows.push(row);
        }
        rows
    }
}

fn describe(entry: &ScheduleEntry, teacher_names: &HashMap<Uuid, String>) -> String {
    let teacher = entry
        .teacher_id
        .and_then(|id| teacher_names.get(&id))
        .map(String::as_str)
        .unwrap_or("");
    format!(
        "{}\n{}\n{}\n{}",
        entry.subject,
        entry.class_name,
        teacher,
        entry.classroom.as_deref().unwrap_or("")
    )
}

fn by_start(a: &ScheduleEntry, b: &ScheduleEntry) -> std::cmp::Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| a.class_name.cmp(&b.class_name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Places each entry into the slot chosen by the table's bucketing rule.
/// Entries on days not listed in `days` are ignored.
pub fn build_grid(entries: &[ScheduleEntry], days: &[DayOfWeek], slots: &SlotTable) -> ScheduleGrid {
    let mut cells = vec![vec![Vec::new(); slots.len()]; days.len()];
    let mut unplaced = Vec::new();

    for entry in entries {
        let Some(day_index) = days.iter().position(|d| *d == entry.day_of_week) else {
            continue;
        };
        match slots.bucket_for(entry.start_time) {
            Some(slot_index) => cells[day_index][slot_index].push(entry.clone()),
            None => unplaced.push(entry.clone()),
        }
    }

    for cell in cells.iter_mut().flatten() {
        cell.sort_by(by_start);
    }
    unplaced.sort_by(|a, b| a.day_of_week.cmp(&b.day_of_week).then_with(|| by_start(a, b)));

    ScheduleGrid {
        days: days.to_vec(),
        slots: slots.slots().to_vec(),
        cells,
        unplaced,
    }
}

/// Entries per weekday (all seven present), each list ordered by start time.
pub fn group_by_day(entries: &[ScheduleEntry]) -> BTreeMap<DayOfWeek, Vec<ScheduleEntry>> {
    let mut by_day: BTreeMap<DayOfWeek, Vec<ScheduleEntry>> =
        DayOfWeek::week().map(|d| (d, Vec::new())).collect();
    for entry in entries {
        by_day
            .entry(entry.day_of_week)
            .or_default()
            .push(entry.clone());
    }
    for list in by_day.values_mut() {
        list.sort_by(by_start);
    }
    by_day
}

pub fn filter_by_class(entries: &[ScheduleEntry], class_name: &str) -> Vec<ScheduleEntry> {
    entries
        .iter()
        .filter(|e| e.class_name == class_name)
        .cloned()
        .collect()
}

pub fn filter_by_teacher(entries: &[ScheduleEntry], teacher_id: Uuid) -> Vec<ScheduleEntry> {
    entries
        .iter()
        .filter(|e| e.teacher_id == Some(teacher_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::models::NewScheduleEntry;
    use crate::time::SlotBucketing;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(class_name: &str, day: u8, start: NaiveTime, end: NaiveTime) -> ScheduleEntry {
        ScheduleEntry::from_new(
            Uuid::new_v4(),
            NewScheduleEntry::new(
                Uuid::nil(),
                class_name,
                "History",
                DayOfWeek::new(day).unwrap(),
                start,
                end,
            ),
        )
    }

    fn week() -> Vec<DayOfWeek> {
        DayOfWeek::week().collect()
    }

    #[test]
    fn test_places_entries_by_hour() {
        let entries = vec![
            entry("A", 1, t(9, 0), t(9, 40)),
            entry("B", 1, t(9, 50), t(10, 30)),
            entry("A", 3, t(14, 30), t(15, 10)),
        ];
        let grid = build_grid(&entries, &week(), &SlotTable::standard());

        assert_eq!(grid.cell(DayOfWeek::MONDAY, 4).len(), 2);
        assert!(grid.cell(DayOfWeek::MONDAY, 5).is_empty());
        // 14:30 shares the hour with the 14:00 slot
        assert_eq!(grid.cell(DayOfWeek::new(3).unwrap(), 14).len(), 1);
        assert_eq!(grid.placed_count(), 3);
        assert!(grid.unplaced.is_empty());
    }

    #[test]
    fn test_containing_bucketing() {
        let slots = SlotTable::uniform(t(7, 0), t(18, 30), 30, SlotBucketing::Containing).unwrap();
        let entries = vec![entry("A", 1, t(9, 50), t(10, 30))];
        let grid = build_grid(&entries, &week(), &slots);
        assert_eq!(grid.cell(DayOfWeek::MONDAY, 5).len(), 1);
    }

    #[test]
    fn test_parallel_lessons_share_a_cell() {
        let entries = vec![
            entry("B", 2, t(10, 0), t(10, 40)),
            entry("A", 2, t(10, 0), t(10, 40)),
        ];
        let grid = build_grid(&entries, &week(), &SlotTable::standard());
        let cell = grid.cell(DayOfWeek::new(2).unwrap(), 6);
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[0].class_name, "A");
    }

    #[test]
    fn test_out_of_hours_entries_are_unplaced() {
        let entries = vec![entry("A", 5, t(20, 0), t(20, 40))];
        let grid = build_grid(&entries, &week(), &SlotTable::standard());
        assert_eq!(grid.placed_count(), 0);
        assert_eq!(grid.unplaced.len(), 1);
    }

    #[test]
    fn test_days_outside_selection_are_skipped() {
        let entries = vec![entry("A", 6, t(9, 0), t(9, 40))];
        let weekdays: Vec<DayOfWeek> = (1..=5).map(|d| DayOfWeek::new(d).unwrap()).collect();
        let grid = build_grid(&entries, &weekdays, &SlotTable::standard());
        assert_eq!(grid.placed_count(), 0);
        assert!(grid.unplaced.is_empty());
    }

    #[test]
    fn test_build_grid_is_idempotent() {
        let entries = vec![
            entry("A", 1, t(8, 0), t(8, 40)),
            entry("B", 4, t(11, 15), t(11, 55)),
            entry("C", 7, t(6, 0), t(6, 40)),
        ];
        let before = entries.clone();
        let first = build_grid(&entries, &week(), &SlotTable::standard());
        let second = build_grid(&entries, &week(), &SlotTable::standard());
        assert_eq!(first, second);
        assert_eq!(entries, before);
    }

    #[test]
    fn test_to_table_rows() {
        let teacher = Uuid::new_v4();
        let mut lesson = entry("9-A", 1, t(8, 0), t(8, 40));
        lesson.teacher_id = Some(teacher);
        lesson.classroom = Some("101".into());
        let grid = build_grid(&[lesson], &week(), &SlotTable::standard());
        let names = HashMap::from([(teacher, "Ada Lovelace".to_string())]);

        let table = grid.to_table(&names);
        assert_eq!(table.len(), 25);
        assert_eq!(table[0][0], "Time");
        assert_eq!(table[0][1], "Monday");
        assert_eq!(table[3][0], "08:00");
        assert_eq!(table[3][1], "History\n9-A\nAda Lovelace\n101");
        assert_eq!(table[3][2], EMPTY_CELL);
    }

    #[test]
    fn test_group_by_day_sorts_and_fills_week() {
        let entries = vec![
            entry("A", 2, t(11, 0), t(11, 40)),
            entry("A", 2, t(8, 0), t(8, 40)),
        ];
        let grouped = group_by_day(&entries);
        assert_eq!(grouped.len(), 7);
        let tuesday = &grouped[&DayOfWeek::new(2).unwrap()];
        assert_eq!(tuesday[0].start_time, t(8, 0));
        assert!(grouped[&DayOfWeek::MONDAY].is_empty());
    }

    #[test]
    fn test_filters() {
        let teacher = Uuid::new_v4();
        let mut taught = entry("A", 1, t(8, 0), t(8, 40));
        taught.teacher_id = Some(teacher);
        let entries = vec![taught, entry("B", 1, t(8, 0), t(8, 40))];
        assert_eq!(filter_by_class(&entries, "B").len(), 1);
        assert_eq!(filter_by_teacher(&entries, teacher).len(), 1);
        assert!(filter_by_class(&entries, "Z").is_empty());
    }
}
