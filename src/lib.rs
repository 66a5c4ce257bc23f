pub mod auth;
pub mod conflict;
pub mod error;
pub mod grid;
pub mod handlers;
pub mod ical;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod service;
pub mod settings;
pub mod store;
pub mod time;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use handlers::{
    check_entry, create_class, create_entry, create_personal_block, deactivate_class,
    delete_entry, delete_personal_block, entries_by_day, get_grid, get_grid_table, get_ical,
    healthz_live, healthz_ready, list_classes, list_entries, list_personal_blocks, list_teachers,
    root, teacher_week, update_entry, update_personal_block,
};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ical::ICalExporter;
use crate::openapi::ApiDoc;
use crate::service::ScheduleService;
use crate::settings::Settings;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub service: Arc<ScheduleService>,
    pub exporter: Arc<ICalExporter>,
}

impl AppState {
    /// State backed by a single in-memory store for entries, blocks, classes and teachers.
    pub fn in_memory(settings: Settings, store: InMemoryStore) -> Result<Self, time::TimeError> {
        let slots = settings.slot_table()?;
        let service = ScheduleService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            slots,
        );
        Ok(Self {
            exporter: Arc::new(ICalExporter::new(settings.calendar_name.clone())),
            service: Arc::new(service),
            settings,
        })
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::in_memory(settings, InMemoryStore::new())?;
    info!(
        slots = state.service.slots().len(),
        bucketing = ?state.service.slots().bucketing(),
        "slot table ready"
    );

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Class Timetable API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route(
            "/institutions/{institution_id}/entries",
            get(list_entries).post(create_entry),
        )
        .route(
            "/institutions/{institution_id}/entries/by-day",
            get(entries_by_day),
        )
        .route(
            "/institutions/{institution_id}/entries/check",
            post(check_entry),
        )
        .route(
            "/institutions/{institution_id}/entries/{entry_id}",
            patch(update_entry).delete(delete_entry),
        )
        .route("/institutions/{institution_id}/grid", get(get_grid))
        .route(
            "/institutions/{institution_id}/grid/table",
            get(get_grid_table),
        )
        .route(
            "/institutions/{institution_id}/schedule.ical",
            get(get_ical),
        )
        .route(
            "/institutions/{institution_id}/classes",
            get(list_classes).post(create_class),
        )
        .route(
            "/institutions/{institution_id}/classes/{class_id}",
            delete(deactivate_class),
        )
        .route(
            "/institutions/{institution_id}/teachers",
            get(list_teachers),
        )
        .route(
            "/institutions/{institution_id}/teachers/{teacher_id}/blocks",
            get(list_personal_blocks).post(create_personal_block),
        )
        .route(
            "/institutions/{institution_id}/teachers/{teacher_id}/blocks/{block_id}",
            patch(update_personal_block).delete(delete_personal_block),
        )
        .route(
            "/institutions/{institution_id}/teachers/{teacher_id}/week",
            get(teacher_week),
        )
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(CorsLayer::permissive()).layer(trace_layer)
}
