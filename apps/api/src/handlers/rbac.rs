use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use aula_application::{CreatePermissionInput, CreateRoleInput, PermissionGrantInput};
use aula_core::UserIdentity;

use crate::dto::{
    AuditEntryResponse, AuditQuery, CreatePermissionRequest, CreateRoleRequest, OkResponse,
    PermissionResponse, RoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod grants;


pub use grants::{attach_permission_handler, detach_permission_handler};

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .rbac_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .rbac_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                description: payload.description,
                permission_ids: payload.permission_ids,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<OkResponse>> {
    state
        .rbac_service
        .delete_role(&user, role_id.as_str())
        .await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .rbac_service
        .create_permission(
            &user,
            CreatePermissionInput {
                action: payload.action,
                resource: payload.resource,
                description: payload.description,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionResponse::from(permission)),
    ))
}

pub async fn list_audit_entries_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditEntryResponse>>> {
    let entries = state
        .rbac_service
        .audit_entries_for_role(query.role_id.as_str())
        .await?
        .into_iter()
        .map(AuditEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .rbac_service
        .roles_for_user(user_id.as_str())
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}
