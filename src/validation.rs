use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{NewInstitutionClass, NewPersonalBlock, NewScheduleEntry};
use crate::time::{TimeError, TimeRange};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("regex compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("class_name must not be empty")]
    MissingClassName,
    #[error("subject must not be empty")]
    MissingSubject,
    #[error("title must not be empty")]
    MissingTitle,
    #[error("color must be a #RRGGBB hex value, got '{0}'")]
    InvalidColor(String),
    #[error("weeks must be between 1 and 6")]
    WeeksOutOfRange,
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Field-level checks run before conflict detection. Expects a normalized entry.
pub fn validate_entry(entry: &NewScheduleEntry) -> Result<TimeRange, ValidationError> {
    if entry.class_name.trim().is_empty() {
        return Err(ValidationError::MissingClassName);
    }
    if entry.subject.trim().is_empty() {
        return Err(ValidationError::MissingSubject);
    }
    if !HEX_COLOR.is_match(&entry.color) {
        return Err(ValidationError::InvalidColor(entry.color.clone()));
    }
    Ok(TimeRange::new(entry.start_time, entry.end_time)?)
}

pub fn validate_block(block: &NewPersonalBlock) -> Result<TimeRange, ValidationError> {
    if block.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if !HEX_COLOR.is_match(&block.color) {
        return Err(ValidationError::InvalidColor(block.color.clone()));
    }
    Ok(TimeRange::new(block.start_time, block.end_time)?)
}

pub fn validate_class(class: &NewInstitutionClass) -> Result<(), ValidationError> {
    if class.class_name.trim().is_empty() {
        return Err(ValidationError::MissingClassName);
    }
    Ok(())
}

pub fn validate_weeks(value: u8) -> Result<u8, ValidationError> {
    if (1..=6).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::WeeksOutOfRange)
    }
}
