use chrono::NaiveTime;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::time::{SlotBucketing, SlotTable, TimeError, parse_hhmm};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    pub calendar_name: String,
    /// Start of the first display slot, `HH:MM`.
    pub slot_first: String,
    /// Start of the last display slot, `HH:MM`.
    pub slot_last: String,
    pub slot_minutes: u32,
    pub slot_bucketing: SlotBucketing,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("calendar_name", "Weekly Class Timetable")?
            .set_default("slot_first", "07:00")?
            .set_default("slot_last", "18:30")?
            .set_default("slot_minutes", 30)?
            .set_default("slot_bucketing", "hour_prefix")?
            .build()?;

        config.try_deserialize()
    }

    pub fn slot_table(&self) -> Result<SlotTable, TimeError> {
        let first = parse_slot(&self.slot_first)?;
        let last = parse_slot(&self.slot_last)?;
        SlotTable::uniform(first, last, self.slot_minutes, self.slot_bucketing)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            auth_token: "default-token-change-me".to_string(),
            enable_swagger: true,
            port: 8080,
            calendar_name: "Weekly Class Timetable".to_string(),
            slot_first: "07:00".to_string(),
            slot_last: "18:30".to_string(),
            slot_minutes: 30,
            slot_bucketing: SlotBucketing::HourPrefix,
        }
    }
}

fn parse_slot(value: &str) -> Result<NaiveTime, TimeError> {
    parse_hhmm(value).ok_or_else(|| TimeError::InvalidSlotTable(format!("bad slot time '{value}'")))
}
