use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::conflict::{Conflict, ResourceAxis};
use crate::grid::ScheduleGrid;
use crate::handlers::{ConflictCheck, DaySchedule};
use crate::models::{
    BlockCategory, BookingKind, InstitutionClass, NewInstitutionClass, NewPersonalBlock,
    NewScheduleEntry, PersonalBlock, PersonalBlockPatch, ScheduleEntry, ScheduleEntryPatch,
    Teacher, TeacherWeekItem,
};
use crate::time::{DayOfWeek, TimeSlot};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_entries,
        crate::handlers::entries_by_day,
        crate::handlers::create_entry,
        crate::handlers::check_entry,
        crate::handlers::update_entry,
        crate::handlers::delete_entry,
        crate::handlers::get_grid,
        crate::handlers::get_grid_table,
        crate::handlers::get_ical,
        crate::handlers::list_classes,
        crate::handlers::create_class,
        crate::handlers::deactivate_class,
        crate::handlers::list_teachers,
        crate::handlers::list_personal_blocks,
        crate::handlers::create_personal_block,
        crate::handlers::update_personal_block,
        crate::handlers::delete_personal_block,
        crate::handlers::teacher_week
    ),
    components(schemas(
        ScheduleEntry,
        NewScheduleEntry,
        ScheduleEntryPatch,
        InstitutionClass,
        NewInstitutionClass,
        Teacher,
        PersonalBlock,
        NewPersonalBlock,
        PersonalBlockPatch,
        BlockCategory,
        BookingKind,
        TeacherWeekItem,
        DayOfWeek,
        TimeSlot,
        ScheduleGrid,
        Conflict,
        ResourceAxis,
        ConflictCheck,
        DaySchedule
    )),
    tags(
        (name = "timetable", description = "Service status"),
        (name = "entries", description = "Schedule entries and conflict checks"),
        (name = "grid", description = "Grid projection and exports"),
        (name = "classes", description = "Class registry"),
        (name = "teachers", description = "Teacher directory, personal blocks and weekly view")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_entry_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/institutions/{institution_id}/entries"));
        assert!(doc.paths.paths.contains_key("/institutions/{institution_id}/grid"));
        assert!(
            doc.paths
                .paths
                .contains_key("/institutions/{institution_id}/teachers/{teacher_id}/blocks/{block_id}")
        );
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("PersonalBlock"));
    }
}
