use super::*;

pub(super) fn attach(
    state: &mut RbacState,
    role_id: &str,
    permission_id: &str,
) -> AppResult<RoleGrantChange> {
    let before = state.require_role(role_id)?;
    state.require_permission(permission_id)?;

    state
        .role_permissions
        .insert((role_id.to_owned(), permission_id.to_owned()));

    Ok(RoleGrantChange {
        before,
        after: state.require_role(role_id)?,
    })
}

pub(super) fn detach(
    state: &mut RbacState,
    role_id: &str,
    permission_id: &str,
) -> AppResult<RoleGrantChange> {
    let before = state.require_role(role_id)?;
    state.require_permission(permission_id)?;

    // Absent grants are tolerated so retries and races stay successful.
    state
        .role_permissions
        .remove(&(role_id.to_owned(), permission_id.to_owned()));

    Ok(RoleGrantChange {
        before,
        after: state.require_role(role_id)?,
    })
}
