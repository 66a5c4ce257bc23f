use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::time::{DayOfWeek, hhmm};

pub const DEFAULT_COLOR: &str = "#3B82F6";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Lets a patch tell an explicit `null` apart from a missing field.
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A single lesson placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub institution_id: Uuid,
    #[schema(example = "9-A")]
    pub class_name: String,
    #[schema(example = "Mathematics")]
    pub subject: String,
    pub teacher_id: Option<Uuid>,
    #[schema(example = "101")]
    pub classroom: Option<String>,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:40")]
    pub end_time: NaiveTime,
    #[schema(example = "#3B82F6")]
    pub color: String,
    pub notes: Option<String>,
}

impl ScheduleEntry {
    pub fn from_new(id: Uuid, entry: NewScheduleEntry) -> Self {
        Self {
            id,
            institution_id: entry.institution_id,
            class_name: entry.class_name,
            subject: entry.subject,
            teacher_id: entry.teacher_id,
            classroom: entry.classroom,
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
            color: entry.color,
            notes: entry.notes,
        }
    }
}

/// Candidate placement: every entry field except the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NewScheduleEntry {
    #[serde(default)]
    pub institution_id: Uuid,
    pub class_name: String,
    pub subject: String,
    #[serde(default)]
    pub teacher_id: Option<Uuid>,
    #[serde(default)]
    pub classroom: Option<String>,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:40")]
    pub end_time: NaiveTime,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewScheduleEntry {
    pub fn new(
        institution_id: Uuid,
        class_name: impl Into<String>,
        subject: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            institution_id,
            class_name: class_name.into(),
            subject: subject.into(),
            teacher_id: None,
            classroom: None,
            day_of_week,
            start_time,
            end_time,
            color: default_color(),
            notes: None,
        }
    }

    pub fn with_teacher(mut self, teacher_id: Uuid) -> Self {
        self.teacher_id = Some(teacher_id);
        self
    }

    pub fn with_classroom(mut self, classroom: impl Into<String>) -> Self {
        self.classroom = Some(classroom.into());
        self
    }

    /// Trims text fields and turns blank optional fields into `None`.
    pub fn normalized(mut self) -> Self {
        self.class_name = self.class_name.trim().to_string();
        self.subject = self.subject.trim().to_string();
        self.color = self.color.trim().to_string();
        self.classroom = non_blank(self.classroom);
        self.notes = non_blank(self.notes);
        self
    }
}

impl From<&ScheduleEntry> for NewScheduleEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            institution_id: entry.institution_id,
            class_name: entry.class_name.clone(),
            subject: entry.subject.clone(),
            teacher_id: entry.teacher_id,
            classroom: entry.classroom.clone(),
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
            color: entry.color.clone(),
            notes: entry.notes.clone(),
        }
    }
}

/// Partial update of a stored entry. For `teacher_id`, `classroom` and `notes`
/// an explicit `null` clears the value while a missing field keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ScheduleEntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub teacher_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub classroom: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(
        default,
        deserialize_with = "hhmm::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "10:00")]
    pub start_time: Option<NaiveTime>,
    #[serde(
        default,
        deserialize_with = "hhmm::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "10:40")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl ScheduleEntryPatch {
    /// The candidate an entry becomes once this patch is applied.
    pub fn apply_to(&self, mut candidate: NewScheduleEntry) -> NewScheduleEntry {
        if let Some(class_name) = &self.class_name {
            candidate.class_name = class_name.clone();
        }
        if let Some(subject) = &self.subject {
            candidate.subject = subject.clone();
        }
        if let Some(teacher_id) = self.teacher_id {
            candidate.teacher_id = teacher_id;
        }
        if let Some(classroom) = &self.classroom {
            candidate.classroom = classroom.clone();
        }
        if let Some(day) = self.day_of_week {
            candidate.day_of_week = day;
        }
        if let Some(start) = self.start_time {
            candidate.start_time = start;
        }
        if let Some(end) = self.end_time {
            candidate.end_time = end;
        }
        if let Some(color) = &self.color {
            candidate.color = color.clone();
        }
        if let Some(notes) = &self.notes {
            candidate.notes = notes.clone();
        }
        candidate
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct InstitutionClass {
    pub id: Uuid,
    pub institution_id: Uuid,
    #[schema(example = "9-A")]
    pub class_name: String,
    pub grade_level: Option<String>,
    pub branch: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NewInstitutionClass {
    pub class_name: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewInstitutionClass {
    pub fn named(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            grade_level: None,
            branch: None,
            description: None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.class_name = self.class_name.trim().to_string();
        self.grade_level = non_blank(self.grade_level);
        self.branch = non_blank(self.branch);
        self.description = non_blank(self.description);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    #[schema(example = "Ayşe Yılmaz")]
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    #[default]
    Personal,
    Meeting,
    Preparation,
    Tutoring,
    Other,
}

/// Teacher time held outside of lessons. It only ever occupies the teacher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PersonalBlock {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub teacher_id: Uuid,
    #[schema(example = "Department meeting")]
    pub title: String,
    pub description: Option<String>,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "12:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "12:40")]
    pub end_time: NaiveTime,
    #[schema(example = "Staff room")]
    pub location: Option<String>,
    pub category: BlockCategory,
    pub color: String,
}

impl PersonalBlock {
    pub fn from_new(id: Uuid, block: NewPersonalBlock) -> Self {
        Self {
            id,
            institution_id: block.institution_id,
            teacher_id: block.teacher_id,
            title: block.title,
            description: block.description,
            day_of_week: block.day_of_week,
            start_time: block.start_time,
            end_time: block.end_time,
            location: block.location,
            category: block.category,
            color: block.color,
        }
    }
}

/// Candidate personal block. Institution and teacher come from the route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NewPersonalBlock {
    #[serde(default)]
    pub institution_id: Uuid,
    #[serde(default)]
    pub teacher_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "12:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "12:40")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: BlockCategory,
    #[serde(default = "default_color")]
    pub color: String,
}

impl NewPersonalBlock {
    pub fn new(
        institution_id: Uuid,
        teacher_id: Uuid,
        title: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            institution_id,
            teacher_id,
            title: title.into(),
            description: None,
            day_of_week,
            start_time,
            end_time,
            location: None,
            category: BlockCategory::default(),
            color: default_color(),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.color = self.color.trim().to_string();
        self.description = non_blank(self.description);
        self.location = non_blank(self.location);
        self
    }
}

impl From<&PersonalBlock> for NewPersonalBlock {
    fn from(block: &PersonalBlock) -> Self {
        Self {
            institution_id: block.institution_id,
            teacher_id: block.teacher_id,
            title: block.title.clone(),
            description: block.description.clone(),
            day_of_week: block.day_of_week,
            start_time: block.start_time,
            end_time: block.end_time,
            location: block.location.clone(),
            category: block.category,
            color: block.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PersonalBlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(
        default,
        deserialize_with = "hhmm::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "13:00")]
    pub start_time: Option<NaiveTime>,
    #[serde(
        default,
        deserialize_with = "hhmm::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "13:40")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BlockCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PersonalBlockPatch {
    pub fn apply_to(&self, mut candidate: NewPersonalBlock) -> NewPersonalBlock {
        if let Some(title) = &self.title {
            candidate.title = title.clone();
        }
        if let Some(description) = &self.description {
            candidate.description = description.clone();
        }
        if let Some(day) = self.day_of_week {
            candidate.day_of_week = day;
        }
        if let Some(start) = self.start_time {
            candidate.start_time = start;
        }
        if let Some(end) = self.end_time {
            candidate.end_time = end;
        }
        if let Some(location) = &self.location {
            candidate.location = location.clone();
        }
        if let Some(category) = self.category {
            candidate.category = category;
        }
        if let Some(color) = &self.color {
            candidate.color = color.clone();
        }
        candidate
    }
}

/// Which kind of booking holds a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    Lesson,
    PersonalBlock,
}

/// One row of a teacher's combined week: a lesson they teach or one of their blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TeacherWeekItem {
    pub id: Uuid,
    pub kind: BookingKind,
    /// Subject for lessons, title for personal blocks.
    pub title: String,
    pub class_name: Option<String>,
    /// Classroom for lessons, free-form location for personal blocks.
    pub location: Option<String>,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:40")]
    pub end_time: NaiveTime,
    pub color: String,
    pub notes: Option<String>,
}

impl From<&ScheduleEntry> for TeacherWeekItem {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            kind: BookingKind::Lesson,
            title: entry.subject.clone(),
            class_name: Some(entry.class_name.clone()),
            location: entry.classroom.clone(),
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
            color: entry.color.clone(),
            notes: entry.notes.clone(),
        }
    }
}

impl From<&PersonalBlock> for TeacherWeekItem {
    fn from(block: &PersonalBlock) -> Self {
        Self {
            id: block.id,
            kind: BookingKind::PersonalBlock,
            title: block.title.clone(),
            class_name: None,
            location: block.location.clone(),
            day_of_week: block.day_of_week,
            start_time: block.start_time,
            end_time: block.end_time,
            color: block.color.clone(),
            notes: block.description.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
