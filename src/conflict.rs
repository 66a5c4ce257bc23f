//! Resource conflict detection between lesson placements.
//!
//! Two placements conflict when they fall on the same day, their `[start, end)`
//! ranges intersect, and they share at least one resource axis: the teacher,
//! the classroom, or the class group. Conflicts are resource-scoped; two
//! lessons in the same grid cell with nothing in common are fine. A teacher's
//! personal blocks hold only the teacher axis.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    BookingKind, NewPersonalBlock, NewScheduleEntry, PersonalBlock, ScheduleEntry,
};
use crate::time::DayOfWeek;

/// Read-only view of the fields the detector looks at.
pub trait Placement {
    fn day_of_week(&self) -> DayOfWeek;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;
    fn teacher_id(&self) -> Option<Uuid>;
    fn class_name(&self) -> Option<&str>;
    fn classroom(&self) -> Option<&str>;
}

/// A stored placement that can block a candidate.
pub trait Booking: Placement {
    fn id(&self) -> Uuid;
    fn kind(&self) -> BookingKind;
}

macro_rules! lesson_placement {
    ($ty:ty) => {
        impl Placement for $ty {
            fn day_of_week(&self) -> DayOfWeek {
                self.day_of_week
            }
            fn start_time(&self) -> NaiveTime {
                self.start_time
            }
            fn end_time(&self) -> NaiveTime {
                self.end_time
            }
            fn teacher_id(&self) -> Option<Uuid> {
                self.teacher_id
            }
            fn class_name(&self) -> Option<&str> {
                Some(self.class_name.as_str())
            }
            fn classroom(&self) -> Option<&str> {
                self.classroom.as_deref()
            }
        }
    };
}

macro_rules! block_placement {
    ($ty:ty) => {
        impl Placement for $ty {
            fn day_of_week(&self) -> DayOfWeek {
                self.day_of_week
            }
            fn start_time(&self) -> NaiveTime {
                self.start_time
            }
            fn end_time(&self) -> NaiveTime {
                self.end_time
            }
            fn teacher_id(&self) -> Option<Uuid> {
                Some(self.teacher_id)
            }
            // location is free text, never a bookable classroom
            fn class_name(&self) -> Option<&str> {
                None
            }
            fn classroom(&self) -> Option<&str> {
                None
            }
        }
    };
}

lesson_placement!(ScheduleEntry);
lesson_placement!(NewScheduleEntry);
block_placement!(PersonalBlock);
block_placement!(NewPersonalBlock);

impl Booking for ScheduleEntry {
    fn id(&self) -> Uuid {
        self.id
    }
    fn kind(&self) -> BookingKind {
        BookingKind::Lesson
    }
}

impl Booking for PersonalBlock {
    fn id(&self) -> Uuid {
        self.id
    }
    fn kind(&self) -> BookingKind {
        BookingKind::PersonalBlock
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAxis {
    Teacher,
    Classroom,
    Class,
}

/// A stored lesson or personal block that blocks a candidate, with the axes they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Conflict {
    pub entry_id: Uuid,
    pub kind: BookingKind,
    pub axes: Vec<ResourceAxis>,
}

/// Strict intersection; ranges that only touch at a boundary do not overlap.
pub fn time_ranges_overlap(a: &impl Placement, b: &impl Placement) -> bool {
    a.start_time() < b.end_time() && b.start_time() < a.end_time()
}

pub fn resources_shared(a: &impl Placement, b: &impl Placement) -> bool {
    !shared_axes(a, b).is_empty()
}

pub fn shared_axes(a: &impl Placement, b: &impl Placement) -> Vec<ResourceAxis> {
    let mut axes = Vec::new();
    if let (Some(x), Some(y)) = (a.teacher_id(), b.teacher_id())
        && x == y
    {
        axes.push(ResourceAxis::Teacher);
    }
    if let (Some(x), Some(y)) = (a.classroom(), b.classroom())
        && x == y
    {
        axes.push(ResourceAxis::Classroom);
    }
    if let (Some(x), Some(y)) = (a.class_name(), b.class_name())
        && x == y
    {
        axes.push(ResourceAxis::Class);
    }
    axes
}

fn colliding<'a, B: Booking, P: Placement>(
    existing: &'a [B],
    candidate: &'a P,
    exclude_entry_id: Option<Uuid>,
) -> impl Iterator<Item = &'a B> + 'a {
    existing.iter().filter(move |booking| {
        Some(booking.id()) != exclude_entry_id
            && booking.day_of_week() == candidate.day_of_week()
            && time_ranges_overlap(*booking, candidate)
            && resources_shared(*booking, candidate)
    })
}

/// Whether `candidate` collides with anything in `existing`. When editing,
/// pass the edited booking's own id as `exclude_entry_id`.
pub fn has_conflict<B: Booking, P: Placement>(
    existing: &[B],
    candidate: &P,
    exclude_entry_id: Option<Uuid>,
) -> bool {
    colliding(existing, candidate, exclude_entry_id)
        .next()
        .is_some()
}

/// Everything in `existing` that collides with `candidate`, in input order.
pub fn find_conflicts<B: Booking, P: Placement>(
    existing: &[B],
    candidate: &P,
    exclude_entry_id: Option<Uuid>,
) -> Vec<Conflict> {
    colliding(existing, candidate, exclude_entry_id)
        .map(|booking| Conflict {
            entry_id: booking.id(),
            kind: booking.kind(),
            axes: shared_axes(booking, candidate),
        })
        .collect()
}

/// Lesson conflicts first, then personal-block conflicts.
pub fn find_schedule_conflicts<P: Placement>(
    entries: &[ScheduleEntry],
    blocks: &[PersonalBlock],
    candidate: &P,
    exclude_id: Option<Uuid>,
) -> Vec<Conflict> {
    let mut conflicts = find_conflicts(entries, candidate, exclude_id);
    conflicts.extend(find_conflicts(blocks, candidate, exclude_id));
    conflicts
}
