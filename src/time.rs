use std::fmt;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("day_of_week must be between 1 and 7, got {0}")]
    InvalidDay(u8),
    #[error("start time {start} must be before end time {end}")]
    EmptyRange { start: String, end: String },
    #[error("invalid slot table: {0}")]
    InvalidSlotTable(String),
}

/// Day of the week, 1 = Monday through 7 = Sunday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(1);

    pub fn new(value: u8) -> Result<Self, TimeError> {
        if (1..=7).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TimeError::InvalidDay(value))
        }
    }

    /// Monday through Sunday, in order.
    pub fn week() -> impl Iterator<Item = DayOfWeek> {
        (1..=7).map(DayOfWeek)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based offset from Monday.
    pub fn offset_from_monday(self) -> i64 {
        i64::from(self.0 - 1)
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Sunday",
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = TimeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(value: DayOfWeek) -> Self {
        value.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Half-open wall-clock interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(TimeError::EmptyRange {
                start: format_hhmm(start),
                end: format_hhmm(end),
            })
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// How an entry's start time is matched to a display slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotBucketing {
    /// First slot whose label shares the entry's start hour.
    #[default]
    HourPrefix,
    /// Slot whose `[start, end)` contains the entry's start.
    Containing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "08:00")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "08:30")]
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        format_hhmm(self.start)
    }

    fn matches(&self, time: NaiveTime, bucketing: SlotBucketing) -> bool {
        match bucketing {
            SlotBucketing::HourPrefix => self.start.hour() == time.hour(),
            SlotBucketing::Containing => self.start <= time && time < self.end,
        }
    }
}

/// Fixed, ordered list of display buckets spanning the operating day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<TimeSlot>,
    bucketing: SlotBucketing,
}

impl SlotTable {
    /// 07:00 through 18:30 in 30 minute steps.
    pub fn standard() -> Self {
        Self::uniform(
            NaiveTime::from_hms_opt(7, 0, 0).expect("valid time"),
            NaiveTime::from_hms_opt(18, 30, 0).expect("valid time"),
            30,
            SlotBucketing::default(),
        )
        .expect("standard slot table is valid")
    }

    /// Slots starting at `first` every `step_minutes`, the last one starting at or before `last`.
    pub fn uniform(
        first: NaiveTime,
        last: NaiveTime,
        step_minutes: u32,
        bucketing: SlotBucketing,
    ) -> Result<Self, TimeError> {
        if step_minutes == 0 {
            return Err(TimeError::InvalidSlotTable(
                "slot length must be positive".into(),
            ));
        }
        if last < first {
            return Err(TimeError::InvalidSlotTable(format!(
                "last slot {} starts before first slot {}",
                format_hhmm(last),
                format_hhmm(first)
            )));
        }

        let step = Duration::minutes(i64::from(step_minutes));
        let mut slots = Vec::new();
        let mut start = first;
        loop {
            let (end, wrapped) = start.overflowing_add_signed(step);
            // a slot running past midnight is clamped to the end of the day
            let end = if wrapped != 0 {
                NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(start)
            } else {
                end
            };
            slots.push(TimeSlot { start, end });
            if wrapped != 0 || end > last {
                break;
            }
            start = end;
        }
        Self::from_slots(slots, bucketing)
    }

    /// Explicit slot list; starts must ascend and every slot must have a duration.
    pub fn from_slots(slots: Vec<TimeSlot>, bucketing: SlotBucketing) -> Result<Self, TimeError> {
        for pair in slots.windows(2) {
            if pair[1].start <= pair[0].start {
                return Err(TimeError::InvalidSlotTable(
                    "slots must be in ascending order".into(),
                ));
            }
        }
        if let Some(slot) = slots.iter().find(|s| s.end <= s.start) {
            return Err(TimeError::InvalidSlotTable(format!(
                "slot {} has no duration",
                slot.label()
            )));
        }
        Ok(Self { slots, bucketing })
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn bucketing(&self) -> SlotBucketing {
        self.bucketing
    }

    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(TimeSlot::label).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the slot an entry starting at `time` is rendered in.
    pub fn bucket_for(&self, time: NaiveTime) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.matches(time, self.bucketing))
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serde adapter writing `HH:MM` and reading `HH:MM[:SS]`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, de::Error};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|raw| {
                super::super::parse_hhmm(&raw).ok_or_else(|| {
                    D::Error::custom(format!("invalid time '{raw}', expected HH:MM"))
                })
            })
            .transpose()
        }
    }
}
