use aula_core::AppError;
use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, cors_origin: Option<&str>) -> Result<Router, AppError> {
    let rbac_routes = Router::new()
        .route(
            "/rbac/roles",
            get(handlers::rbac::list_roles_handler).post(handlers::rbac::create_role_handler),
        )
        .route(
            "/rbac/roles/{role_id}",
            delete(handlers::rbac::delete_role_handler),
        )
        .route(
            "/rbac/roles/{role_id}/permissions/{permission_id}",
            post(handlers::rbac::attach_permission_handler)
                .delete(handlers::rbac::detach_permission_handler),
        )
        .route(
            "/rbac/permissions",
            get(handlers::rbac::list_permissions_handler)
                .post(handlers::rbac::create_permission_handler),
        )
        .route(
            "/rbac/audit",
            get(handlers::rbac::list_audit_entries_handler),
        )
        .route(
            "/rbac/users/{user_id}/roles",
            get(handlers::rbac::list_user_roles_handler),
        )
        .route_layer(from_fn(middleware::require_actor));

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(rbac_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_origin {
        router = router.layer(cors::build_cors_layer(origin)?);
    }

    Ok(router.with_state(app_state))
}
