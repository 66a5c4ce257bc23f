use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conflict::{Conflict, Placement, find_schedule_conflicts};
use crate::grid::{ScheduleGrid, build_grid, filter_by_class, filter_by_teacher};
use crate::models::{
    InstitutionClass, NewInstitutionClass, NewPersonalBlock, NewScheduleEntry, PersonalBlock,
    PersonalBlockPatch, ScheduleEntry, ScheduleEntryPatch, Teacher, TeacherWeekItem,
};
use crate::repository::{
    ClassRegistry, PersonalScheduleRepository, RepositoryError, ScheduleEntryRepository,
    TeacherDirectory,
};
use crate::time::{DayOfWeek, SlotTable};
use crate::validation::{ValidationError, validate_block, validate_class, validate_entry};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("class '{0}' is not registered for this institution")]
    UnknownClass(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound { kind, id } => ServiceError::NotFound { kind, id },
            other => ServiceError::Repository(other),
        }
    }
}

/// Outcome of a save attempt. A conflict is a normal result, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment<T = ScheduleEntry> {
    Assigned(T),
    Conflicted(Vec<Conflict>),
}

impl<T> Assignment<T> {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Assignment::Assigned(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub class_name: Option<String>,
    pub teacher_id: Option<Uuid>,
}

impl EntryFilter {
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            teacher_id: None,
        }
    }

    fn apply(&self, entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
        let entries = match &self.class_name {
            Some(class_name) => filter_by_class(&entries, class_name),
            None => entries,
        };
        match self.teacher_id {
            Some(teacher_id) => filter_by_teacher(&entries, teacher_id),
            None => entries,
        }
    }
}

/// Entries, classes and personal blocks of one institution, read together.
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub entries: Vec<ScheduleEntry>,
    pub classes: Vec<InstitutionClass>,
    pub blocks: Vec<PersonalBlock>,
}

impl ScheduleSnapshot {
    fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|c| c.class_name == class_name)
    }

    fn conflicts(&self, candidate: &impl Placement, exclude_id: Option<Uuid>) -> Vec<Conflict> {
        find_schedule_conflicts(&self.entries, &self.blocks, candidate, exclude_id)
    }
}

/// Maps a storage-level overlap to a conflicted outcome.
fn settle<T>(
    written: Result<T, RepositoryError>,
    what: &str,
) -> Result<Assignment<T>, ServiceError> {
    match written {
        Ok(saved) => Ok(Assignment::Assigned(saved)),
        Err(RepositoryError::Overlap(conflicts)) => {
            warn!("{what} lost a race with a concurrent write");
            Ok(Assignment::Conflicted(conflicts))
        }
        Err(err) => Err(err.into()),
    }
}

/// Validates, checks and persists placements; derives grids from fresh reads.
#[derive(Clone)]
pub struct ScheduleService {
    entries: Arc<dyn ScheduleEntryRepository>,
    classes: Arc<dyn ClassRegistry>,
    teachers: Arc<dyn TeacherDirectory>,
    blocks: Arc<dyn PersonalScheduleRepository>,
    slots: SlotTable,
}

impl ScheduleService {
    pub fn new(
        entries: Arc<dyn ScheduleEntryRepository>,
        classes: Arc<dyn ClassRegistry>,
        teachers: Arc<dyn TeacherDirectory>,
        blocks: Arc<dyn PersonalScheduleRepository>,
        slots: SlotTable,
    ) -> Self {
        Self {
            entries,
            classes,
            teachers,
            blocks,
            slots,
        }
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub async fn snapshot(&self, institution_id: Uuid) -> Result<ScheduleSnapshot, ServiceError> {
        let (entries, classes, blocks) = futures::try_join!(
            self.entries.list(institution_id),
            self.classes.list(institution_id),
            self.blocks.list(institution_id)
        )?;
        Ok(ScheduleSnapshot {
            entries,
            classes,
            blocks,
        })
    }

    /// Conflicts `candidate` would run into, without saving anything.
    pub async fn check(
        &self,
        candidate: NewScheduleEntry,
        exclude_entry_id: Option<Uuid>,
    ) -> Result<Vec<Conflict>, ServiceError> {
        let candidate = candidate.normalized();
        validate_entry(&candidate)?;
        let snapshot = self.snapshot(candidate.institution_id).await?;
        Ok(snapshot.conflicts(&candidate, exclude_entry_id))
    }

    pub async fn add_entry(&self, candidate: NewScheduleEntry) -> Result<Assignment, ServiceError> {
        let candidate = candidate.normalized();
        let range = validate_entry(&candidate)?;

        let snapshot = self.snapshot(candidate.institution_id).await?;
        if !snapshot.has_class(&candidate.class_name) {
            return Err(ServiceError::UnknownClass(candidate.class_name));
        }

        let conflicts = snapshot.conflicts(&candidate, None);
        if !conflicts.is_empty() {
            info!(
                institution_id = %candidate.institution_id,
                class_name = %candidate.class_name,
                conflicts = conflicts.len(),
                "rejected placement"
            );
            return Ok(Assignment::Conflicted(conflicts));
        }

        let outcome = settle(self.entries.create(candidate).await, "placement")?;
        if let Assignment::Assigned(entry) = &outcome {
            info!(
                entry_id = %entry.id,
                day = %entry.day_of_week,
                minutes = range.duration_minutes(),
                "assigned placement"
            );
        }
        Ok(outcome)
    }

    pub async fn update_entry(
        &self,
        institution_id: Uuid,
        id: Uuid,
        patch: ScheduleEntryPatch,
    ) -> Result<Assignment, ServiceError> {
        let snapshot = self.snapshot(institution_id).await?;
        let current = snapshot
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(ServiceError::NotFound {
                kind: "schedule entry",
                id,
            })?;

        let candidate = patch.apply_to(NewScheduleEntry::from(current)).normalized();
        validate_entry(&candidate)?;
        if candidate.class_name != current.class_name && !snapshot.has_class(&candidate.class_name)
        {
            return Err(ServiceError::UnknownClass(candidate.class_name));
        }

        let conflicts = snapshot.conflicts(&candidate, Some(id));
        if !conflicts.is_empty() {
            info!(entry_id = %id, conflicts = conflicts.len(), "rejected edit");
            return Ok(Assignment::Conflicted(conflicts));
        }

        let normalized = ScheduleEntryPatch {
            class_name: Some(candidate.class_name),
            subject: Some(candidate.subject),
            teacher_id: Some(candidate.teacher_id),
            classroom: Some(candidate.classroom),
            day_of_week: Some(candidate.day_of_week),
            start_time: Some(candidate.start_time),
            end_time: Some(candidate.end_time),
            color: Some(candidate.color),
            notes: Some(candidate.notes),
        };
        let outcome = settle(self.entries.update(id, normalized).await, "edit")?;
        if outcome.is_assigned() {
            info!(entry_id = %id, "updated placement");
        }
        Ok(outcome)
    }

    pub async fn delete_entry(&self, institution_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let entry = self.entries.get(id).await?;
        if entry.institution_id != institution_id {
            return Err(ServiceError::NotFound {
                kind: "schedule entry",
                id,
            });
        }
        self.entries.delete(id).await?;
        info!(entry_id = %id, "deleted placement");
        Ok(())
    }

    pub async fn entries(
        &self,
        institution_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<Vec<ScheduleEntry>, ServiceError> {
        let entries = self.entries.list(institution_id).await?;
        Ok(filter.apply(entries))
    }

    /// Full-week grid over the configured slot table.
    pub async fn grid(
        &self,
        institution_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<ScheduleGrid, ServiceError> {
        let entries = self.entries(institution_id, filter).await?;
        let days: Vec<DayOfWeek> = DayOfWeek::week().collect();
        Ok(build_grid(&entries, &days, &self.slots))
    }

    /// Printable rows for the grid, with teacher names resolved.
    pub async fn table(
        &self,
        institution_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<Vec<Vec<String>>, ServiceError> {
        let (grid, names) = futures::try_join!(
            self.grid(institution_id, filter),
            self.teacher_names(institution_id)
        )?;
        Ok(grid.to_table(&names))
    }

    pub async fn personal_blocks(
        &self,
        institution_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Vec<PersonalBlock>, ServiceError> {
        let blocks = self.blocks.list(institution_id).await?;
        Ok(blocks
            .into_iter()
            .filter(|b| b.teacher_id == teacher_id)
            .collect())
    }

    /// Reserves teacher time outside of lessons. Lessons and other blocks of
    /// the same teacher count as conflicts.
    pub async fn add_personal_block(
        &self,
        institution_id: Uuid,
        teacher_id: Uuid,
        block: NewPersonalBlock,
    ) -> Result<Assignment<PersonalBlock>, ServiceError> {
        let block = NewPersonalBlock {
            institution_id,
            teacher_id,
            ..block
        }
        .normalized();
        validate_block(&block)?;

        let snapshot = self.snapshot(institution_id).await?;
        let conflicts = snapshot.conflicts(&block, None);
        if !conflicts.is_empty() {
            info!(teacher_id = %teacher_id, conflicts = conflicts.len(), "rejected personal block");
            return Ok(Assignment::Conflicted(conflicts));
        }

        let outcome = settle(self.blocks.create(block).await, "personal block")?;
        if let Assignment::Assigned(stored) = &outcome {
            info!(block_id = %stored.id, teacher_id = %teacher_id, "reserved personal block");
        }
        Ok(outcome)
    }

    pub async fn update_personal_block(
        &self,
        institution_id: Uuid,
        teacher_id: Uuid,
        id: Uuid,
        patch: PersonalBlockPatch,
    ) -> Result<Assignment<PersonalBlock>, ServiceError> {
        let snapshot = self.snapshot(institution_id).await?;
        let current = snapshot
            .blocks
            .iter()
            .find(|b| b.id == id && b.teacher_id == teacher_id)
            .ok_or(ServiceError::NotFound {
                kind: "personal block",
                id,
            })?;

        let candidate = patch.apply_to(NewPersonalBlock::from(current)).normalized();
        validate_block(&candidate)?;

        let conflicts = snapshot.conflicts(&candidate, Some(id));
        if !conflicts.is_empty() {
            info!(block_id = %id, conflicts = conflicts.len(), "rejected personal block edit");
            return Ok(Assignment::Conflicted(conflicts));
        }

        let normalized = PersonalBlockPatch {
            title: Some(candidate.title),
            description: Some(candidate.description),
            day_of_week: Some(candidate.day_of_week),
            start_time: Some(candidate.start_time),
            end_time: Some(candidate.end_time),
            location: Some(candidate.location),
            category: Some(candidate.category),
            color: Some(candidate.color),
        };
        settle(self.blocks.update(id, normalized).await, "personal block edit")
    }

    pub async fn delete_personal_block(
        &self,
        institution_id: Uuid,
        teacher_id: Uuid,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let block = self.blocks.get(id).await?;
        if block.institution_id != institution_id || block.teacher_id != teacher_id {
            return Err(ServiceError::NotFound {
                kind: "personal block",
                id,
            });
        }
        self.blocks.delete(id).await?;
        info!(block_id = %id, "released personal block");
        Ok(())
    }

    /// Lessons a teacher gives plus their personal blocks, ordered by day then start.
    pub async fn teacher_week(
        &self,
        institution_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Vec<TeacherWeekItem>, ServiceError> {
        let snapshot = self.snapshot(institution_id).await?;
        let mut items: Vec<TeacherWeekItem> = filter_by_teacher(&snapshot.entries, teacher_id)
            .iter()
            .map(TeacherWeekItem::from)
            .chain(
                snapshot
                    .blocks
                    .iter()
                    .filter(|b| b.teacher_id == teacher_id)
                    .map(TeacherWeekItem::from),
            )
            .collect();
        items.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(items)
    }

    pub async fn teachers(&self, institution_id: Uuid) -> Result<Vec<Teacher>, ServiceError> {
        Ok(self.teachers.list(institution_id).await?)
    }

    pub async fn teacher_names(
        &self,
        institution_id: Uuid,
    ) -> Result<HashMap<Uuid, String>, ServiceError> {
        let teachers = self.teachers(institution_id).await?;
        Ok(teachers.into_iter().map(|t| (t.id, t.full_name)).collect())
    }

    pub async fn classes(&self, institution_id: Uuid) -> Result<Vec<InstitutionClass>, ServiceError> {
        Ok(self.classes.list(institution_id).await?)
    }

    pub async fn add_class(
        &self,
        institution_id: Uuid,
        class: NewInstitutionClass,
    ) -> Result<InstitutionClass, ServiceError> {
        let class = class.normalized();
        validate_class(&class)?;
        let created = self.classes.create(institution_id, class).await?;
        info!(class_id = %created.id, class_name = %created.class_name, "registered class");
        Ok(created)
    }

    /// Deactivates a class. Entries that reference it stay scheduled.
    pub async fn deactivate_class(
        &self,
        institution_id: Uuid,
        id: Uuid,
    ) -> Result<InstitutionClass, ServiceError> {
        let known = self.classes.list(institution_id).await?;
        if !known.iter().any(|c| c.id == id) {
            return Err(ServiceError::NotFound { kind: "class", id });
        }
        let class = self.classes.deactivate(id).await?;
        info!(class_id = %id, "deactivated class");
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveTime;

    use super::*;
    use crate::conflict::ResourceAxis;
    use crate::models::{BlockCategory, BookingKind};
    use crate::repository::RepositoryResult;
    use crate::store::InMemoryStore;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn service(store: &InMemoryStore) -> ScheduleService {
        ScheduleService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            SlotTable::standard(),
        )
    }

    async fn setup() -> (InMemoryStore, ScheduleService, Uuid) {
        let store = InMemoryStore::new();
        let svc = service(&store);
        let institution = Uuid::new_v4();
        for name in ["A", "B", "C"] {
            svc.add_class(institution, NewInstitutionClass::named(name))
                .await
                .unwrap();
        }
        (store, svc, institution)
    }

    fn lesson(
        institution: Uuid,
        class_name: &str,
        teacher: Uuid,
        room: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> NewScheduleEntry {
        NewScheduleEntry::new(institution, class_name, "Maths", DayOfWeek::MONDAY, start, end)
            .with_teacher(teacher)
            .with_classroom(room)
    }

    #[tokio::test]
    async fn test_monday_scenario() {
        let (_, svc, institution) = setup().await;
        let teacher_t = Uuid::new_v4();
        let teacher_u = Uuid::new_v4();

        let first = svc
            .add_entry(lesson(institution, "A", teacher_t, "101", t(9, 0), t(9, 40)))
            .await
            .unwrap();
        assert!(first.is_assigned());

        let teacher_clash = svc
            .add_entry(lesson(institution, "B", teacher_t, "102", t(9, 20), t(10, 0)))
            .await
            .unwrap();
        assert!(matches!(teacher_clash, Assignment::Conflicted(_)));

        let class_clash = svc
            .add_entry(lesson(institution, "A", teacher_u, "103", t(9, 30), t(10, 10)))
            .await
            .unwrap();
        assert!(matches!(class_clash, Assignment::Conflicted(_)));

        let touching = svc
            .add_entry(lesson(institution, "C", teacher_u, "101", t(9, 40), t(10, 20)))
            .await
            .unwrap();
        assert!(touching.is_assigned());

        assert_eq!(
            svc.entries(institution, &EntryFilter::default())
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_unknown_class_rejected() {
        let (store, svc, institution) = setup().await;
        let err = svc
            .add_entry(lesson(institution, "Z", Uuid::new_v4(), "1", t(8, 0), t(8, 40)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownClass(_)));
        assert_eq!(store.entry_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validation_runs_before_detection() {
        let (store, svc, institution) = setup().await;
        let bad = lesson(institution, "A", Uuid::new_v4(), "1", t(9, 0), t(8, 0));
        assert!(matches!(
            svc.add_entry(bad.clone()).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(svc.check(bad, None).await, Err(ServiceError::Validation(_))));
        assert_eq!(store.entry_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_never_conflicts_with_itself() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();
        let Assignment::Assigned(entry) = svc
            .add_entry(lesson(institution, "A", teacher, "101", t(9, 0), t(9, 40)))
            .await
            .unwrap()
        else {
            panic!("expected assignment");
        };

        let patch = ScheduleEntryPatch {
            start_time: Some(t(9, 20)),
            end_time: Some(t(10, 0)),
            ..Default::default()
        };
        let edited = svc.update_entry(institution, entry.id, patch).await.unwrap();
        match edited {
            Assignment::Assigned(updated) => assert_eq!(updated.start_time, t(9, 20)),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let same = svc
            .update_entry(institution, entry.id, ScheduleEntryPatch::default())
            .await
            .unwrap();
        assert!(same.is_assigned());
    }

    #[tokio::test]
    async fn test_edit_into_conflict_keeps_stored_entry() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();
        let Assignment::Assigned(first) = svc
            .add_entry(lesson(institution, "A", teacher, "101", t(9, 0), t(9, 40)))
            .await
            .unwrap()
        else {
            panic!("expected assignment");
        };
        let Assignment::Assigned(second) = svc
            .add_entry(lesson(institution, "B", Uuid::new_v4(), "102", t(10, 0), t(10, 40)))
            .await
            .unwrap()
        else {
            panic!("expected assignment");
        };

        let patch = ScheduleEntryPatch {
            teacher_id: Some(Some(teacher)),
            start_time: Some(t(9, 30)),
            ..Default::default()
        };
        let outcome = svc.update_entry(institution, second.id, patch).await.unwrap();
        match outcome {
            Assignment::Conflicted(conflicts) => assert_eq!(conflicts[0].entry_id, first.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let stored = svc.entries(institution, &EntryFilter::class("B")).await.unwrap();
        assert_eq!(stored[0].start_time, t(10, 0));
    }

    #[tokio::test]
    async fn test_update_unknown_entry() {
        let (_, svc, institution) = setup().await;
        let err = svc
            .update_entry(institution, Uuid::new_v4(), ScheduleEntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_checks_institution() {
        let (_, svc, institution) = setup().await;
        let Assignment::Assigned(entry) = svc
            .add_entry(lesson(institution, "A", Uuid::new_v4(), "1", t(8, 0), t(8, 40)))
            .await
            .unwrap()
        else {
            panic!("expected assignment");
        };
        assert!(svc.delete_entry(Uuid::new_v4(), entry.id).await.is_err());
        svc.delete_entry(institution, entry.id).await.unwrap();
        assert!(svc.delete_entry(institution, entry.id).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivated_class_keeps_entries() {
        let (_, svc, institution) = setup().await;
        svc.add_entry(lesson(institution, "C", Uuid::new_v4(), "1", t(8, 0), t(8, 40)))
            .await
            .unwrap();
        let class_c = svc
            .classes(institution)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.class_name == "C")
            .unwrap();
        svc.deactivate_class(institution, class_c.id).await.unwrap();

        let grid = svc.grid(institution, &EntryFilter::class("C")).await.unwrap();
        assert_eq!(grid.placed_count(), 1);
        let err = svc
            .add_entry(lesson(institution, "C", Uuid::new_v4(), "2", t(10, 0), t(10, 40)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownClass(_)));
    }

    #[tokio::test]
    async fn test_table_resolves_teacher_names() {
        let (store, svc, institution) = setup().await;
        let teacher = store.add_teacher(institution, "Emmy Noether").unwrap();
        svc.add_entry(lesson(institution, "A", teacher.id, "101", t(8, 0), t(8, 40)))
            .await
            .unwrap();
        let table = svc.table(institution, &EntryFilter::default()).await.unwrap();
        assert!(table[3][1].contains("Emmy Noether"));
    }

    /// Entry storage whose writes lose to a concurrent session: `list` shows the
    /// stale view, while `create` and `update` report the winner's overlap.
    struct RacingEntries {
        stale: Vec<ScheduleEntry>,
        winner: Conflict,
    }

    #[async_trait]
    impl ScheduleEntryRepository for RacingEntries {
        async fn list(&self, _institution_id: Uuid) -> RepositoryResult<Vec<ScheduleEntry>> {
            Ok(self.stale.clone())
        }

        async fn get(&self, id: Uuid) -> RepositoryResult<ScheduleEntry> {
            self.stale
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(RepositoryError::NotFound {
                    kind: "schedule entry",
                    id,
                })
        }

        async fn create(&self, _entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry> {
            Err(RepositoryError::Overlap(vec![self.winner.clone()]))
        }

        async fn update(
            &self,
            _id: Uuid,
            _patch: ScheduleEntryPatch,
        ) -> RepositoryResult<ScheduleEntry> {
            Err(RepositoryError::Overlap(vec![self.winner.clone()]))
        }

        async fn delete(&self, _id: Uuid) -> RepositoryResult<()> {
            Ok(())
        }
    }

    /// Reads go to a real store; every write fails.
    struct BrokenWrites {
        store: InMemoryStore,
    }

    #[async_trait]
    impl ScheduleEntryRepository for BrokenWrites {
        async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<ScheduleEntry>> {
            ScheduleEntryRepository::list(&self.store, institution_id).await
        }

        async fn get(&self, id: Uuid) -> RepositoryResult<ScheduleEntry> {
            ScheduleEntryRepository::get(&self.store, id).await
        }

        async fn create(&self, _entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry> {
            Err(RepositoryError::Storage("disk full".into()))
        }

        async fn update(
            &self,
            _id: Uuid,
            _patch: ScheduleEntryPatch,
        ) -> RepositoryResult<ScheduleEntry> {
            Err(RepositoryError::Storage("disk full".into()))
        }

        async fn delete(&self, _id: Uuid) -> RepositoryResult<()> {
            Err(RepositoryError::Storage("disk full".into()))
        }
    }

    fn service_with_entries(
        store: &InMemoryStore,
        entries: Arc<dyn ScheduleEntryRepository>,
    ) -> ScheduleService {
        ScheduleService::new(
            entries,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            SlotTable::standard(),
        )
    }

    async fn store_with_class(institution: Uuid) -> InMemoryStore {
        let store = InMemoryStore::new();
        ClassRegistry::create(&store, institution, NewInstitutionClass::named("A"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_lost_race_on_create_is_conflicted() {
        let institution = Uuid::new_v4();
        let store = store_with_class(institution).await;
        let winner = Conflict {
            entry_id: Uuid::new_v4(),
            kind: BookingKind::Lesson,
            axes: vec![ResourceAxis::Teacher],
        };
        let svc = service_with_entries(
            &store,
            Arc::new(RacingEntries {
                stale: Vec::new(),
                winner: winner.clone(),
            }),
        );

        let outcome = svc
            .add_entry(lesson(institution, "A", Uuid::new_v4(), "101", t(9, 0), t(9, 40)))
            .await
            .unwrap();
        assert_eq!(outcome, Assignment::Conflicted(vec![winner]));
    }

    #[tokio::test]
    async fn test_lost_race_on_update_is_conflicted() {
        let institution = Uuid::new_v4();
        let store = store_with_class(institution).await;
        let edited = ScheduleEntry::from_new(
            Uuid::new_v4(),
            lesson(institution, "A", Uuid::new_v4(), "101", t(9, 0), t(9, 40)),
        );
        let winner = Conflict {
            entry_id: Uuid::new_v4(),
            kind: BookingKind::Lesson,
            axes: vec![ResourceAxis::Classroom],
        };
        let svc = service_with_entries(
            &store,
            Arc::new(RacingEntries {
                stale: vec![edited.clone()],
                winner: winner.clone(),
            }),
        );

        let patch = ScheduleEntryPatch {
            start_time: Some(t(9, 10)),
            end_time: Some(t(9, 50)),
            ..Default::default()
        };
        let outcome = svc.update_entry(institution, edited.id, patch).await.unwrap();
        assert_eq!(outcome, Assignment::Conflicted(vec![winner]));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_without_state() {
        let institution = Uuid::new_v4();
        let store = store_with_class(institution).await;
        let svc = service_with_entries(
            &store,
            Arc::new(BrokenWrites {
                store: store.clone(),
            }),
        );

        let err = svc
            .add_entry(lesson(institution, "A", Uuid::new_v4(), "101", t(9, 0), t(9, 40)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::Storage(_))
        ));
        assert_eq!(store.entry_count().unwrap(), 0);
        assert!(
            svc.entries(institution, &EntryFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    fn meeting(start: NaiveTime, end: NaiveTime) -> NewPersonalBlock {
        let mut block = NewPersonalBlock::new(
            Uuid::nil(),
            Uuid::nil(),
            "Department meeting",
            DayOfWeek::MONDAY,
            start,
            end,
        );
        block.category = BlockCategory::Meeting;
        block
    }

    #[tokio::test]
    async fn test_personal_block_blocks_teacher_lessons() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();

        let Assignment::Assigned(block) = svc
            .add_personal_block(institution, teacher, meeting(t(12, 0), t(12, 40)))
            .await
            .unwrap()
        else {
            panic!("expected reservation");
        };
        assert_eq!(block.teacher_id, teacher);
        assert_eq!(block.institution_id, institution);

        match svc
            .add_entry(lesson(institution, "A", teacher, "101", t(12, 20), t(13, 0)))
            .await
            .unwrap()
        {
            Assignment::Conflicted(conflicts) => {
                assert_eq!(conflicts[0].entry_id, block.id);
                assert_eq!(conflicts[0].kind, BookingKind::PersonalBlock);
                assert_eq!(conflicts[0].axes, vec![ResourceAxis::Teacher]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let conflicts = svc
            .check(lesson(institution, "A", teacher, "101", t(12, 20), t(13, 0)), None)
            .await
            .unwrap();
        assert_eq!(conflicts.len(), 1);

        // a colleague is free at that time
        assert!(
            svc.add_entry(lesson(institution, "A", Uuid::new_v4(), "101", t(12, 20), t(13, 0)))
                .await
                .unwrap()
                .is_assigned()
        );
    }

    #[tokio::test]
    async fn test_personal_block_rejected_during_lesson() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();
        let Assignment::Assigned(entry) = svc
            .add_entry(lesson(institution, "A", teacher, "101", t(9, 0), t(9, 40)))
            .await
            .unwrap()
        else {
            panic!("expected assignment");
        };

        match svc
            .add_personal_block(institution, teacher, meeting(t(9, 30), t(10, 0)))
            .await
            .unwrap()
        {
            Assignment::Conflicted(conflicts) => {
                assert_eq!(conflicts[0].entry_id, entry.id);
                assert_eq!(conflicts[0].kind, BookingKind::Lesson);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(svc.personal_blocks(institution, teacher).await.unwrap().is_empty());

        let mut untitled = meeting(t(10, 0), t(10, 40));
        untitled.title = "  ".into();
        assert!(matches!(
            svc.add_personal_block(institution, teacher, untitled).await,
            Err(ServiceError::Validation(ValidationError::MissingTitle))
        ));
    }

    #[tokio::test]
    async fn test_personal_block_edit_and_delete_are_teacher_scoped() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();
        let Assignment::Assigned(block) = svc
            .add_personal_block(institution, teacher, meeting(t(14, 0), t(14, 40)))
            .await
            .unwrap()
        else {
            panic!("expected reservation");
        };

        let patch = PersonalBlockPatch {
            end_time: Some(t(15, 0)),
            ..Default::default()
        };
        let other_teacher = svc
            .update_personal_block(institution, Uuid::new_v4(), block.id, patch.clone())
            .await;
        assert!(matches!(other_teacher, Err(ServiceError::NotFound { .. })));

        match svc
            .update_personal_block(institution, teacher, block.id, patch)
            .await
            .unwrap()
        {
            Assignment::Assigned(updated) => assert_eq!(updated.end_time, t(15, 0)),
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert!(
            svc.delete_personal_block(institution, Uuid::new_v4(), block.id)
                .await
                .is_err()
        );
        svc.delete_personal_block(institution, teacher, block.id)
            .await
            .unwrap();
        assert!(svc.personal_blocks(institution, teacher).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_teacher_week_merges_lessons_and_blocks() {
        let (_, svc, institution) = setup().await;
        let teacher = Uuid::new_v4();
        svc.add_entry(lesson(institution, "A", teacher, "101", t(10, 0), t(10, 40)))
            .await
            .unwrap();
        svc.add_entry(lesson(institution, "B", Uuid::new_v4(), "102", t(8, 0), t(8, 40)))
            .await
            .unwrap();
        svc.add_personal_block(institution, teacher, meeting(t(8, 0), t(8, 40)))
            .await
            .unwrap();

        let week = svc.teacher_week(institution, teacher).await.unwrap();
        assert_eq!(week.len(), 2);
        assert_eq!(week[0].kind, BookingKind::PersonalBlock);
        assert_eq!(week[0].start_time, t(8, 0));
        assert_eq!(week[1].kind, BookingKind::Lesson);
        assert_eq!(week[1].class_name.as_deref(), Some("A"));
    }
}
