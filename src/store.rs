//! In-memory implementation of the persistence collaborators.
//!
//! Suitable for local runs and tests. Writes re-run the conflict detector
//! while holding the write lock, so two sessions racing on the same slot
//! cannot both commit.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::conflict::{Placement, find_schedule_conflicts};
use crate::models::{
    InstitutionClass, NewInstitutionClass, NewPersonalBlock, NewScheduleEntry, PersonalBlock,
    PersonalBlockPatch, ScheduleEntry, ScheduleEntryPatch, Teacher,
};
use crate::repository::{
    ClassRegistry, PersonalScheduleRepository, RepositoryError, RepositoryResult,
    ScheduleEntryRepository, TeacherDirectory,
};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<StoreData>>,
}

#[derive(Default)]
struct StoreData {
    entries: HashMap<Uuid, ScheduleEntry>,
    blocks: HashMap<Uuid, PersonalBlock>,
    classes: HashMap<Uuid, InstitutionClass>,
    teachers: HashMap<Uuid, Vec<Teacher>>,
}

impl StoreData {
    fn institution_entries(&self, institution_id: Uuid) -> Vec<ScheduleEntry> {
        let mut entries: Vec<ScheduleEntry> = self
            .entries
            .values()
            .filter(|e| e.institution_id == institution_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| a.start_time.cmp(&b.start_time))
                .then_with(|| a.class_name.cmp(&b.class_name))
        });
        entries
    }

    fn institution_blocks(&self, institution_id: Uuid) -> Vec<PersonalBlock> {
        let mut blocks: Vec<PersonalBlock> = self
            .blocks
            .values()
            .filter(|b| b.institution_id == institution_id)
            .cloned()
            .collect();
        blocks.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| a.start_time.cmp(&b.start_time))
                .then_with(|| a.id.cmp(&b.id))
        });
        blocks
    }

    fn check_exclusion(
        &self,
        institution_id: Uuid,
        candidate: &impl Placement,
        exclude: Option<Uuid>,
    ) -> RepositoryResult<()> {
        let conflicts = find_schedule_conflicts(
            &self.institution_entries(institution_id),
            &self.institution_blocks(institution_id),
            candidate,
            exclude,
        );
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::Overlap(conflicts))
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teacher as a member of an institution.
    pub fn add_teacher(
        &self,
        institution_id: Uuid,
        full_name: impl Into<String>,
    ) -> RepositoryResult<Teacher> {
        let teacher = Teacher {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
        };
        self.write()?
            .teachers
            .entry(institution_id)
            .or_default()
            .push(teacher.clone());
        Ok(teacher)
    }

    pub fn entry_count(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.entries.len())
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::Storage("store lock poisoned".into()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::Storage("store lock poisoned".into()))
    }
}

#[async_trait]
impl ScheduleEntryRepository for InMemoryStore {
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<ScheduleEntry>> {
        Ok(self.read()?.institution_entries(institution_id))
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<ScheduleEntry> {
        self.read()?
            .entries
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound {
                kind: "schedule entry",
                id,
            })
    }

    async fn create(&self, entry: NewScheduleEntry) -> RepositoryResult<ScheduleEntry> {
        let mut data = self.write()?;
        data.check_exclusion(entry.institution_id, &entry, None)?;
        let stored = ScheduleEntry::from_new(Uuid::new_v4(), entry);
        data.entries.insert(stored.id, stored.clone());
        debug!(entry_id = %stored.id, "stored schedule entry");
        Ok(stored)
    }

    async fn update(&self, id: Uuid, patch: ScheduleEntryPatch) -> RepositoryResult<ScheduleEntry> {
        let mut data = self.write()?;
        let current = data.entries.get(&id).ok_or(RepositoryError::NotFound {
            kind: "schedule entry",
            id,
        })?;
        let candidate = patch.apply_to(NewScheduleEntry::from(current));
        data.check_exclusion(candidate.institution_id, &candidate, Some(id))?;
        let updated = ScheduleEntry::from_new(id, candidate);
        data.entries.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.write()?
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound {
                kind: "schedule entry",
                id,
            })
    }
}

#[async_trait]
impl PersonalScheduleRepository for InMemoryStore {
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<PersonalBlock>> {
        Ok(self.read()?.institution_blocks(institution_id))
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<PersonalBlock> {
        self.read()?
            .blocks
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound {
                kind: "personal block",
                id,
            })
    }

    async fn create(&self, block: NewPersonalBlock) -> RepositoryResult<PersonalBlock> {
        let mut data = self.write()?;
        data.check_exclusion(block.institution_id, &block, None)?;
        let stored = PersonalBlock::from_new(Uuid::new_v4(), block);
        data.blocks.insert(stored.id, stored.clone());
        debug!(block_id = %stored.id, teacher_id = %stored.teacher_id, "stored personal block");
        Ok(stored)
    }

    async fn update(&self, id: Uuid, patch: PersonalBlockPatch) -> RepositoryResult<PersonalBlock> {
        let mut data = self.write()?;
        let current = data.blocks.get(&id).ok_or(RepositoryError::NotFound {
            kind: "personal block",
            id,
        })?;
        let candidate = patch.apply_to(NewPersonalBlock::from(current));
        data.check_exclusion(candidate.institution_id, &candidate, Some(id))?;
        let updated = PersonalBlock::from_new(id, candidate);
        data.blocks.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.write()?
            .blocks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound {
                kind: "personal block",
                id,
            })
    }
}

#[async_trait]
impl ClassRegistry for InMemoryStore {
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<InstitutionClass>> {
        let data = self.read()?;
        let mut classes: Vec<InstitutionClass> = data
            .classes
            .values()
            .filter(|c| c.institution_id == institution_id && c.is_active)
            .cloned()
            .collect();
        classes.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        Ok(classes)
    }

    async fn create(
        &self,
        institution_id: Uuid,
        class: NewInstitutionClass,
    ) -> RepositoryResult<InstitutionClass> {
        let mut data = self.write()?;
        let taken = data.classes.values().any(|c| {
            c.institution_id == institution_id && c.is_active && c.class_name == class.class_name
        });
        if taken {
            return Err(RepositoryError::DuplicateClassName(class.class_name));
        }
        let stored = InstitutionClass {
            id: Uuid::new_v4(),
            institution_id,
            class_name: class.class_name,
            grade_level: class.grade_level,
            branch: class.branch,
            description: class.description,
            is_active: true,
        };
        data.classes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn deactivate(&self, id: Uuid) -> RepositoryResult<InstitutionClass> {
        let mut data = self.write()?;
        let class = data
            .classes
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound { kind: "class", id })?;
        class.is_active = false;
        Ok(class.clone())
    }
}

#[async_trait]
impl TeacherDirectory for InMemoryStore {
    async fn list(&self, institution_id: Uuid) -> RepositoryResult<Vec<Teacher>> {
        Ok(self
            .read()?
            .teachers
            .get(&institution_id)
            .cloned()
            .unwrap_or_default())
    }
}
