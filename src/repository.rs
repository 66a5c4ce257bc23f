//! Persistence collaborators consumed by the schedule service.
//!
//! The service never stores anything itself; it talks to these traits. Any
//! backing store must uphold the same exclusion invariant the detector checks
//! (no overlapping range on a shared teacher, classroom or class within a day,
//! with personal blocks holding their teacher) because the service-side check
//! only sees a snapshot.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::conflict::Conflict;
use crate::models::{
    InstitutionClass, NewInstitutionClass, NewPersonalBlock, NewScheduleEntry, PersonalBlock,
    PersonalBlockPatch, ScheduleEntry, ScheduleEntryPatch, Teacher,
};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("class '{0}' already exists in this institution")]
    DuplicateClassName(String),
    #[error("placement overlaps {} existing entries", .0.len())]
    Overlap(Vec<Conflict>),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait ScheduleEntryRepository: Send + Sync {
    /// Active entries of an institution, ordered by day then start time.
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<ScheduleEntry>>;

    async fn get(&self, id: Uuid) -> RepositoryResult<ScheduleEntry>;

    /// Stores the entry under a freshly assigned id.
    async fn create(&self, entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry>;

    async fn update(&self, id: Uuid, patch: ScheduleEntryPatch) -> RepositoryResult<ScheduleEntry>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ClassRegistry: Send + Sync {
    /// Active classes of an institution, ordered by name.
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<InstitutionClass>>;

    /// Fails with [`RepositoryError::DuplicateClassName`] when an active class
    /// with the same name exists in the institution.
    async fn create(
        &self,
        institution_id: Uuid,
        class: NewInstitutionClass,
    ) -> RepositoryResult<InstitutionClass>;

    /// Soft delete. Entries referencing the class are left in place.
    async fn deactivate(&self, id: Uuid) -> RepositoryResult<InstitutionClass>;
}

#[async_trait]
pub trait TeacherDirectory: Send + Sync {
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<Teacher>>;
}

#[async_trait]
pub trait PersonalScheduleRepository: Send + Sync {
    /// Personal blocks of every teacher in an institution, ordered by day then start time.
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<PersonalBlock>>;

    async fn get(&self, id: Uuid) -> RepositoryResult<PersonalBlock>;

    async fn create(&self, block: NewPersonalBlock) -> RepositoryResult<PersonalBlock>;

    async fn update(&self, id: Uuid, patch: PersonalBlockPatch) -> RepositoryResult<PersonalBlock>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
