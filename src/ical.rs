use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::{Calendar, Component, Event, EventLike};
use uuid::Uuid;

use crate::models::ScheduleEntry;

#[derive(Clone)]
pub struct ICalExporter {
    calendar_name: String,
}

impl Default for ICalExporter {
    fn default() -> Self {
        Self::new("Weekly Class Timetable")
    }
}

impl ICalExporter {
    pub fn new(calendar_name: impl Into<String>) -> Self {
        Self {
            calendar_name: calendar_name.into(),
        }
    }

    /// One event per entry for each of `weeks` consecutive weeks starting at `monday`.
    pub fn generate(
        &self,
        entries: &[ScheduleEntry],
        monday: NaiveDate,
        weeks: u8,
        teacher_names: &HashMap<Uuid, String>,
    ) -> Vec<u8> {
        if entries.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&self.calendar_name);

        for week in 0..weeks {
            let week_start = monday + Duration::weeks(i64::from(week));
            for entry in entries {
                let date = week_start + Duration::days(entry.day_of_week.offset_from_monday());
                let start = NaiveDateTime::new(date, entry.start_time);
                let end = NaiveDateTime::new(date, entry.end_time);

                let mut event = Event::new();
                event.summary(&format!("{} ({})", entry.subject, entry.class_name));
                event.starts(start);
                event.ends(end);
                if let Some(classroom) = &entry.classroom {
                    event.location(classroom);
                }

                let mut description = format!("Class: {}", entry.class_name);
                if let Some(teacher) = entry.teacher_id.and_then(|id| teacher_names.get(&id)) {
                    description.push_str(&format!("\nTeacher: {teacher}"));
                }
                if let Some(notes) = &entry.notes {
                    description.push_str(&format!("\nNotes: {notes}"));
                }
                event.description(&description);
                event.uid(&format!(
                    "{}-{}-class-timetable",
                    entry.id,
                    date.format("%Y%m%d")
                ));
                calendar.push(event);
            }
        }

        calendar.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::models::NewScheduleEntry;
    use crate::time::DayOfWeek;

    fn entry(day: u8) -> ScheduleEntry {
        ScheduleEntry::from_new(
            Uuid::new_v4(),
            NewScheduleEntry::new(
                Uuid::nil(),
                "9-A",
                "Geometry",
                DayOfWeek::new(day).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(10, 40, 0).unwrap(),
            )
            .with_classroom("Lab 2"),
        )
    }

    #[test]
    fn test_generate_places_event_on_weekday() {
        let exporter = ICalExporter::default();
        let monday = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        let bytes = exporter.generate(&[entry(3)], monday, 1, &HashMap::new());
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("BEGIN:VEVENT"));
        assert!(body.contains("Geometry (9-A)"));
        assert!(body.contains("20251126T100000"));
        assert!(body.contains("Lab 2"));
    }

    #[test]
    fn test_generate_repeats_per_week() {
        let exporter = ICalExporter::new("Test");
        let monday = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        let body = String::from_utf8(exporter.generate(&[entry(1)], monday, 3, &HashMap::new()))
            .unwrap();
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 3);
        assert!(body.contains("20251208T100000"));
    }

    #[test]
    fn test_generate_names_teacher() {
        let teacher = Uuid::new_v4();
        let mut lesson = entry(2);
        lesson.teacher_id = Some(teacher);
        let names = HashMap::from([(teacher, "Marie Curie".to_string())]);
        let monday = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        let body = String::from_utf8(ICalExporter::default().generate(&[lesson], monday, 1, &names))
            .unwrap();
        assert!(body.contains("Teacher: Marie Curie"));
    }

    #[test]
    fn test_generate_empty() {
        let exporter = ICalExporter::default();
        let monday = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        assert!(exporter.generate(&[], monday, 2, &HashMap::new()).is_empty());
    }
}
