use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{TypedHeader, WithRejection};
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::{Datelike, Duration, Local};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::conflict::Conflict;
use crate::grid::{ScheduleGrid, group_by_day};
use crate::models::{
    InstitutionClass, NewInstitutionClass, NewPersonalBlock, NewScheduleEntry, PersonalBlock,
    PersonalBlockPatch, ScheduleEntry, ScheduleEntryPatch, Teacher, TeacherWeekItem,
};
use crate::service::{Assignment, EntryFilter};
use crate::time::DayOfWeek;
use crate::{AppState, auth::verify_token, error::ApiError, validation::validate_weeks};

type BearerAuth = Option<TypedHeader<Authorization<Bearer>>>;
type JsonBody<T> = WithRejection<Json<T>, ApiError>;

fn authorize(state: &AppState, auth: BearerAuth, token: Option<&str>) -> Result<(), ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, token)
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub token: Option<String>,
    pub class_name: Option<String>,
    pub teacher_id: Option<Uuid>,
}

impl EntriesQuery {
    fn filter(&self) -> EntryFilter {
        EntryFilter {
            class_name: self.class_name.clone(),
            teacher_id: self.teacher_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub token: Option<String>,
    pub exclude_entry_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_weeks")]
    pub weeks: u8,
    pub token: Option<String>,
    pub class_name: Option<String>,
}

fn default_weeks() -> u8 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConflictCheck {
    pub conflict: bool,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DaySchedule {
    pub day_of_week: DayOfWeek,
    pub name: String,
    pub entries: Vec<ScheduleEntry>,
}

fn assignment_response<T: Serialize>(
    outcome: Assignment<T>,
    status: StatusCode,
) -> Result<impl IntoResponse, ApiError> {
    match outcome {
        Assignment::Assigned(entry) => Ok((status, Json(entry))),
        Assignment::Conflicted(conflicts) => Err(ApiError::Conflict(
            "This time range collides with an existing lesson".into(),
            conflicts,
        )),
    }
}

#[utoipa::path(get, path = "/", tag = "timetable")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Class Timetable API",
        "endpoints": {
            "/institutions/{institution_id}/entries": "List, create and check schedule entries",
            "/institutions/{institution_id}/grid": "Weekly grid by day and time slot",
            "/institutions/{institution_id}/schedule.ical": "Download timetable as iCal file",
            "/institutions/{institution_id}/classes": "Class registry",
            "/institutions/{institution_id}/teachers/{teacher_id}/week": "Lessons and personal blocks of one teacher"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "timetable")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "timetable")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/entries",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("class_name" = Option<String>, Query, description = "Only entries of this class"),
        ("teacher_id" = Option<Uuid>, Query, description = "Only entries taught by this teacher"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Entries ordered by day and start time", body = [ScheduleEntry]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let entries = state.service.entries(institution_id, &query.filter()).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/entries/by-day",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("class_name" = Option<String>, Query, description = "Only entries of this class"),
        ("teacher_id" = Option<Uuid>, Query, description = "Only entries taught by this teacher"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Seven days, Monday first", body = [DaySchedule]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn entries_by_day(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let entries = state.service.entries(institution_id, &query.filter()).await?;
    let days: Vec<DaySchedule> = group_by_day(&entries)
        .into_iter()
        .map(|(day, entries)| DaySchedule {
            day_of_week: day,
            name: day.name().to_string(),
            entries,
        })
        .collect();
    Ok(Json(days))
}

#[utoipa::path(
    post,
    path = "/institutions/{institution_id}/entries",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = NewScheduleEntry,
    responses(
        (status = 201, description = "Entry stored", body = ScheduleEntry),
        (status = 400, description = "Malformed body, invalid entry or unknown class"),
        (status = 401, description = "Invalid authentication token"),
        (status = 409, description = "Collides with an existing lesson")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
    WithRejection(Json(mut candidate), _): JsonBody<NewScheduleEntry>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    candidate.institution_id = institution_id;
    let outcome = state.service.add_entry(candidate).await?;
    assignment_response(outcome, StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/institutions/{institution_id}/entries/check",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("exclude_entry_id" = Option<Uuid>, Query, description = "Entry being edited"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = NewScheduleEntry,
    responses(
        (status = 200, description = "Conflict check result", body = ConflictCheck),
        (status = 400, description = "Malformed body or invalid entry"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn check_entry(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<CheckQuery>,
    WithRejection(Json(mut candidate), _): JsonBody<NewScheduleEntry>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    candidate.institution_id = institution_id;
    let conflicts = state
        .service
        .check(candidate, query.exclude_entry_id)
        .await?;
    Ok(Json(ConflictCheck {
        conflict: !conflicts.is_empty(),
        conflicts,
    }))
}

#[utoipa::path(
    patch,
    path = "/institutions/{institution_id}/entries/{entry_id}",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("entry_id" = Uuid, Path, description = "Entry id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = ScheduleEntryPatch,
    responses(
        (status = 200, description = "Entry updated", body = ScheduleEntry),
        (status = 400, description = "Malformed body, invalid entry or unknown class"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No such entry"),
        (status = 409, description = "Collides with an existing lesson")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn update_entry(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, entry_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
    WithRejection(Json(patch), _): JsonBody<ScheduleEntryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let outcome = state
        .service
        .update_entry(institution_id, entry_id, patch)
        .await?;
    assignment_response(outcome, StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/institutions/{institution_id}/entries/{entry_id}",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("entry_id" = Uuid, Path, description = "Entry id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No such entry")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "entries"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, entry_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    state.service.delete_entry(institution_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/grid",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("class_name" = Option<String>, Query, description = "Only entries of this class"),
        ("teacher_id" = Option<Uuid>, Query, description = "Only entries taught by this teacher"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Grid of days by time slots", body = ScheduleGrid),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "grid"
)]
pub async fn get_grid(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let grid = state.service.grid(institution_id, &query.filter()).await?;
    Ok(Json(grid))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/grid/table",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("class_name" = Option<String>, Query, description = "Only entries of this class"),
        ("teacher_id" = Option<Uuid>, Query, description = "Only entries taught by this teacher"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Header row plus one row per slot", body = Vec<Vec<String>>),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "grid"
)]
pub async fn get_grid_table(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let rows = state.service.table(institution_id, &query.filter()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/schedule.ical",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("weeks" = u8, Query, description = "Number of weeks (1-6)"),
        ("class_name" = Option<String>, Query, description = "Only entries of this class"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 400, description = "Invalid weeks parameter"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No lessons scheduled")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "grid"
)]
pub async fn get_ical(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let weeks = validate_weeks(query.weeks)?;

    let filter = EntryFilter {
        class_name: query.class_name.clone(),
        teacher_id: None,
    };
    let entries = state.service.entries(institution_id, &filter).await?;
    if entries.is_empty() {
        return Err(ApiError::NotFound("No lessons scheduled".into()));
    }
    let names = state.service.teacher_names(institution_id).await?;

    let today = Local::now().date_naive();
    let current_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    let body = state.exporter.generate(&entries, current_monday, weeks, &names);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=class_timetable.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/classes",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Active classes by name", body = [InstitutionClass]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    Ok(Json(state.service.classes(institution_id).await?))
}

#[utoipa::path(
    post,
    path = "/institutions/{institution_id}/classes",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = NewInstitutionClass,
    responses(
        (status = 201, description = "Class registered", body = InstitutionClass),
        (status = 400, description = "Missing class name"),
        (status = 401, description = "Invalid authentication token"),
        (status = 409, description = "Class name already taken")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
    WithRejection(Json(class), _): JsonBody<NewInstitutionClass>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let created = state.service.add_class(institution_id, class).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/institutions/{institution_id}/classes/{class_id}",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("class_id" = Uuid, Path, description = "Class id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Class deactivated; its entries stay scheduled", body = InstitutionClass),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No such class")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn deactivate_class(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, class_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let class = state
        .service
        .deactivate_class(institution_id, class_id)
        .await?;
    Ok(Json(class))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/teachers",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Teachers of the institution", body = [Teacher]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(institution_id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    Ok(Json(state.service.teachers(institution_id).await?))
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/teachers/{teacher_id}/blocks",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("teacher_id" = Uuid, Path, description = "Teacher id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Personal blocks of the teacher", body = [PersonalBlock]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn list_personal_blocks(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, teacher_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let blocks = state
        .service
        .personal_blocks(institution_id, teacher_id)
        .await?;
    Ok(Json(blocks))
}

#[utoipa::path(
    post,
    path = "/institutions/{institution_id}/teachers/{teacher_id}/blocks",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("teacher_id" = Uuid, Path, description = "Teacher id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = NewPersonalBlock,
    responses(
        (status = 201, description = "Block reserved", body = PersonalBlock),
        (status = 400, description = "Malformed body or invalid block"),
        (status = 401, description = "Invalid authentication token"),
        (status = 409, description = "Collides with a lesson or block of the teacher")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn create_personal_block(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, teacher_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
    WithRejection(Json(block), _): JsonBody<NewPersonalBlock>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let outcome = state
        .service
        .add_personal_block(institution_id, teacher_id, block)
        .await?;
    assignment_response(outcome, StatusCode::CREATED)
}

#[utoipa::path(
    patch,
    path = "/institutions/{institution_id}/teachers/{teacher_id}/blocks/{block_id}",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("teacher_id" = Uuid, Path, description = "Teacher id"),
        ("block_id" = Uuid, Path, description = "Personal block id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = PersonalBlockPatch,
    responses(
        (status = 200, description = "Block updated", body = PersonalBlock),
        (status = 400, description = "Malformed body or invalid block"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No such block for this teacher"),
        (status = 409, description = "Collides with a lesson or block of the teacher")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn update_personal_block(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, teacher_id, block_id)): Path<(Uuid, Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
    WithRejection(Json(patch), _): JsonBody<PersonalBlockPatch>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let outcome = state
        .service
        .update_personal_block(institution_id, teacher_id, block_id, patch)
        .await?;
    assignment_response(outcome, StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/institutions/{institution_id}/teachers/{teacher_id}/blocks/{block_id}",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("teacher_id" = Uuid, Path, description = "Teacher id"),
        ("block_id" = Uuid, Path, description = "Personal block id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 204, description = "Block released"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No such block for this teacher")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn delete_personal_block(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, teacher_id, block_id)): Path<(Uuid, Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    state
        .service
        .delete_personal_block(institution_id, teacher_id, block_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/institutions/{institution_id}/teachers/{teacher_id}/week",
    params(
        ("institution_id" = Uuid, Path, description = "Institution id"),
        ("teacher_id" = Uuid, Path, description = "Teacher id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Lessons and personal blocks ordered by day and start", body = [TeacherWeekItem]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "teachers"
)]
pub async fn teacher_week(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path((institution_id, teacher_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let week = state.service.teacher_week(institution_id, teacher_id).await?;
    Ok(Json(week))
}
