// [[FLEET]]/apps/fleet-console/src/server/mod.rs
// Purpose: HTTP surface. Builds the router over the shared runtime.
// Architecture: API Layer
// Dependencies: Axum, tower-http

pub mod handlers;

use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::runtime::FleetRuntime;

pub fn router(runtime: Arc<FleetRuntime>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        // locale
        .route("/locale", get(handlers::get_locale).put(handlers::set_locale))
        .route("/i18n/:key", get(handlers::translate))
        // shell
        .route("/shell", get(handlers::get_shell))
        .route("/shell/menu", get(handlers::get_menu))
        .route("/shell/navigate", post(handlers::navigate))
        .route("/shell/sidebar/toggle", post(handlers::toggle_sidebar))
        .route("/shell/sidebar/sections/:id/toggle", post(handlers::toggle_sidebar_section))
        .route("/shell/settings/toggle", post(handlers::toggle_settings))
        .route("/shell/settings/sections/:id/toggle", post(handlers::toggle_settings_section))
        // task templates
        .route(
            "/tasks",
            get(handlers::list_tasks)
                .post(handlers::save_task)
                .delete(handlers::delete_tasks),
        )
        .route("/tasks/new", get(handlers::blank_task).post(handlers::create_task))
        .route("/tasks/import", post(handlers::import_task))
        .route("/tasks/:id", get(handlers::get_task))
        .route("/tasks/:id/name", put(handlers::rename_task))
        .route("/tasks/:id/export", get(handlers::export_task))
        .route("/tasks/:id/parameters", post(handlers::add_task_parameter))
        .route(
            "/tasks/:id/parameters/:key",
            axum::routing::patch(handlers::update_task_parameter).delete(handlers::delete_task_parameter),
        )
        // agents
        .route("/agents", get(handlers::list_agents).post(handlers::create_agent))
        .route("/agents/reload", post(handlers::reload_agents))
        .route("/agents/catalog", get(handlers::get_catalog))
        .route("/agents/:id", put(handlers::update_agent).delete(handlers::delete_agent))
        .route("/agents/:id/toggle", post(handlers::toggle_agent))
        .route("/agents/:id/tasks/:task_id/toggle", post(handlers::toggle_agent_task))
        // runtime configuration
        .route("/runtime", get(handlers::get_runtime_config))
        .route("/runtime/engines", post(handlers::add_engine))
        .route(
            "/runtime/engines/:hostname",
            put(handlers::update_engine).delete(handlers::delete_engine),
        )
        .route("/runtime/video-sources", post(handlers::add_video_source))
        .route(
            "/runtime/video-sources/:id",
            put(handlers::update_video_source).delete(handlers::delete_video_source),
        )
        .route("/runtime/storage", put(handlers::save_storage))
        .route("/runtime/dialog/models/:name", put(handlers::update_dialog_model))
        // monitoring
        .route("/monitoring/logs", get(handlers::get_logs))
        .route("/monitoring/engines", get(handlers::get_engine_performance))
        .route("/monitoring/agents", get(handlers::get_agent_performance))
        .route("/monitoring/results", get(handlers::list_result_agents))
        .route("/monitoring/results/:agent_id", get(handlers::get_results))
        // memory
        .route("/memory/agents/:id/schemas", get(handlers::get_agent_schemas))
        .route("/memory/schemas/:schema", get(handlers::get_schema))
        .route("/memory/query", post(handlers::run_query))
        // copilot
        .route(
            "/chat/:agent_id/messages",
            get(handlers::get_messages).post(handlers::send_message),
        )
        .route("/ws/events", get(handlers::ws_event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(runtime)
}
