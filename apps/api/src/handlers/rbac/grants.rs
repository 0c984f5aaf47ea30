use super::*;

fn grant_input(role_id: String, permission_id: String) -> PermissionGrantInput {
    PermissionGrantInput {
        role_id,
        permission_id,
    }
}

pub async fn attach_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<Json<OkResponse>> {
    state
        .rbac_service
        .attach_permission(&user, grant_input(role_id, permission_id))
        .await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn detach_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<Json<OkResponse>> {
    state
        .rbac_service
        .detach_permission(&user, grant_input(role_id, permission_id))
        .await?;

    Ok(Json(OkResponse::ok()))
}
