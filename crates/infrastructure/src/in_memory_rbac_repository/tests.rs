use std::sync::Arc;

use aula_application::{
    CreatePermissionInput, CreateRoleInput, PermissionGrantInput, RbacAuthorizationService,
    RbacService, RoleRepository,
};
use aula_core::{AppError, UserIdentity};
use aula_domain::{AuditAction, Permission, Role};

use super::InMemoryRbacRepository;
use crate::InMemoryAuditRepository;

struct Stack {
    store: Arc<InMemoryRbacRepository>,
    service: RbacService,
    admin: UserIdentity,
}

async fn stack() -> Stack {
    let store = Arc::new(InMemoryRbacRepository::new());
    if let Err(error) = store.bootstrap_admin("admin-1").await {
        panic!("failed to bootstrap admin: {error}");
    }

    let service = RbacService::new(
        Arc::new(RbacAuthorizationService::new(store.clone())),
        store.clone(),
        store.clone(),
        Arc::new(InMemoryAuditRepository::new()),
    );

    Stack {
        store,
        service,
        admin: UserIdentity::new("admin-1"),
    }
}

async fn create_role(stack: &Stack, name: &str, permission_ids: Vec<String>) -> Role {
    let input = CreateRoleInput {
        name: name.to_owned(),
        description: None,
        permission_ids,
    };
    match stack.service.create_role(&stack.admin, input).await {
        Ok(role) => role,
        Err(error) => panic!("failed to create role {name}: {error}"),
    }
}

async fn create_permission(stack: &Stack, action: &str, resource: &str) -> Permission {
    let input = CreatePermissionInput {
        action: action.to_owned(),
        resource: resource.to_owned(),
        description: None,
    };
    match stack.service.create_permission(&stack.admin, input).await {
        Ok(permission) => permission,
        Err(error) => panic!("failed to create permission {action}:{resource}: {error}"),
    }
}

fn grant(role: &Role, permission: &Permission) -> PermissionGrantInput {
    PermissionGrantInput {
        role_id: role.id.clone(),
        permission_id: permission.id.clone(),
    }
}

#[tokio::test]
async fn admin_creates_role_with_single_audit_entry() {
    let stack = stack().await;
    let input = CreateRoleInput {
        name: "docente".to_owned(),
        description: Some("Teacher".to_owned()),
        permission_ids: Vec::new(),
    };

    let role = stack.service.create_role(&stack.admin, input).await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(role.name, "docente");
    assert_eq!(role.description.as_deref(), Some("Teacher"));

    let entries = stack.service.audit_entries_for_role(role.id.as_str()).await;
    assert!(entries.is_ok());
    let entries = entries.unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::CreateRole);
    assert_eq!(entries[0].actor_id, "admin-1");
    assert_eq!(entries[0].after, Some(role.snapshot()));
    assert_eq!(entries[0].before, None);
}

#[tokio::test]
async fn missing_permission_leaves_no_role_behind() {
    let stack = stack().await;
    let input = CreateRoleInput {
        name: "docente".to_owned(),
        description: None,
        permission_ids: vec!["p-missing".to_owned()],
    };

    let result = stack.service.create_role(&stack.admin, input).await;
    assert_eq!(
        result,
        Err(AppError::PermissionsNotFound {
            permission_ids: vec!["p-missing".to_owned()],
        })
    );

    let roles = stack.service.list_roles().await.unwrap_or_default();
    assert!(roles.iter().all(|role| role.name != "docente"));
}

#[tokio::test]
async fn missing_permissions_are_reported_once_in_request_order() {
    let stack = stack().await;
    let existing = create_permission(&stack, "read", "courses").await;
    let input = CreateRoleInput {
        name: "docente".to_owned(),
        description: None,
        permission_ids: vec![
            "p-b".to_owned(),
            existing.id.clone(),
            "p-a".to_owned(),
            "p-b".to_owned(),
        ],
    };

    let result = stack.service.create_role(&stack.admin, input).await;
    assert_eq!(
        result,
        Err(AppError::PermissionsNotFound {
            permission_ids: vec!["p-b".to_owned(), "p-a".to_owned()],
        })
    );
}

#[tokio::test]
async fn attaching_twice_grants_permission_once() {
    let stack = stack().await;
    let role = create_role(&stack, "docente", Vec::new()).await;
    let permission = create_permission(&stack, "grade", "submissions").await;

    assert!(
        stack
            .service
            .attach_permission(&stack.admin, grant(&role, &permission))
            .await
            .is_ok()
    );
    assert!(
        stack
            .service
            .attach_permission(&stack.admin, grant(&role, &permission))
            .await
            .is_ok()
    );
    assert!(
        stack
            .store
            .assign_role_to_user("teacher-7", role.id.as_str())
            .await
            .is_ok()
    );

    let granted = stack
        .store
        .permissions_for_user("teacher-7")
        .await
        .unwrap_or_default();
    assert_eq!(granted, vec![permission.clone()]);

    let entries = stack
        .service
        .audit_entries_for_role(role.id.as_str())
        .await
        .unwrap_or_default();
    let attach_count = entries
        .iter()
        .filter(|entry| entry.action == AuditAction::AttachPermission)
        .count();
    assert_eq!(attach_count, 2);
}

#[tokio::test]
async fn permission_granted_through_two_roles_is_listed_once() {
    let stack = stack().await;
    let permission = create_permission(&stack, "read", "courses").await;
    let first = create_role(&stack, "docente", vec![permission.id.clone()]).await;
    let second = create_role(&stack, "tutor", vec![permission.id.clone()]).await;

    for role in [&first, &second] {
        assert!(
            stack
                .store
                .assign_role_to_user("user-3", role.id.as_str())
                .await
                .is_ok()
        );
    }

    let granted = stack
        .store
        .permissions_for_user("user-3")
        .await
        .unwrap_or_default();
    assert_eq!(granted, vec![permission]);
}

#[tokio::test]
async fn detaching_absent_grant_succeeds_and_is_audited() {
    let stack = stack().await;
    let role = create_role(&stack, "docente", Vec::new()).await;
    let permission = create_permission(&stack, "grade", "submissions").await;

    let result = stack
        .service
        .detach_permission(&stack.admin, grant(&role, &permission))
        .await;
    assert!(result.is_ok());

    let entries = stack
        .service
        .audit_entries_for_role(role.id.as_str())
        .await
        .unwrap_or_default();
    assert_eq!(entries[0].action, AuditAction::DetachPermission);
    assert_eq!(entries[0].before, entries[0].after);
}

#[tokio::test]
async fn grant_on_unknown_role_or_permission_is_not_found() {
    let stack = stack().await;
    let role = create_role(&stack, "docente", Vec::new()).await;
    let permission = create_permission(&stack, "grade", "submissions").await;

    let unknown_role = stack
        .service
        .attach_permission(
            &stack.admin,
            PermissionGrantInput {
                role_id: "r-missing".to_owned(),
                permission_id: permission.id.clone(),
            },
        )
        .await;
    assert_eq!(
        unknown_role,
        Err(AppError::RoleNotFound {
            role_id: "r-missing".to_owned(),
        })
    );

    let unknown_permission = stack
        .service
        .detach_permission(
            &stack.admin,
            PermissionGrantInput {
                role_id: role.id.clone(),
                permission_id: "p-missing".to_owned(),
            },
        )
        .await;
    assert_eq!(
        unknown_permission,
        Err(AppError::PermissionNotFound {
            permission_id: "p-missing".to_owned(),
        })
    );
}

#[tokio::test]
async fn manage_roles_holder_may_create_but_reader_is_denied() {
    let stack = stack().await;
    let manage_roles = create_permission(&stack, "manage", "roles").await;
    let manager = create_role(&stack, "role-manager", vec![manage_roles.id.clone()]).await;
    assert!(
        stack
            .store
            .assign_role_to_user("coordinator-2", manager.id.as_str())
            .await
            .is_ok()
    );

    let coordinator = UserIdentity::new("coordinator-2");
    let created = stack
        .service
        .create_role(
            &coordinator,
            CreateRoleInput {
                name: "tutor".to_owned(),
                ..CreateRoleInput::default()
            },
        )
        .await;
    assert!(created.is_ok());

    let denied = stack
        .service
        .create_permission(
            &coordinator,
            CreatePermissionInput {
                action: "read".to_owned(),
                resource: "courses".to_owned(),
                description: None,
            },
        )
        .await;
    assert_eq!(
        denied,
        Err(AppError::MissingRole {
            role: "admin".to_owned(),
        })
    );

    let reader = UserIdentity::new("student-9");
    let result = stack
        .service
        .create_role(
            &reader,
            CreateRoleInput {
                name: "intruder".to_owned(),
                ..CreateRoleInput::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::MissingRole { .. })));
    let found = RoleRepository::find_by_name(stack.store.as_ref(), "intruder").await;
    assert_eq!(found, Ok(None));
}

#[tokio::test]
async fn deleting_role_removes_assignments_but_keeps_history() {
    let stack = stack().await;
    let permission = create_permission(&stack, "read", "courses").await;
    let role = create_role(&stack, "docente", vec![permission.id.clone()]).await;
    assert!(
        stack
            .store
            .assign_role_to_user("teacher-7", role.id.as_str())
            .await
            .is_ok()
    );

    assert!(
        stack
            .service
            .delete_role(&stack.admin, role.id.as_str())
            .await
            .is_ok()
    );

    let roles = stack
        .service
        .roles_for_user("teacher-7")
        .await
        .unwrap_or_default();
    assert!(roles.is_empty());
    let granted = stack
        .store
        .permissions_for_user("teacher-7")
        .await
        .unwrap_or_default();
    assert!(granted.is_empty());

    let entries = stack
        .service
        .audit_entries_for_role(role.id.as_str())
        .await
        .unwrap_or_default();
    let actions: Vec<AuditAction> = entries.iter().map(|entry| entry.action).collect();
    assert_eq!(actions, vec![AuditAction::DeleteRole, AuditAction::CreateRole]);

    let again = stack
        .service
        .delete_role(&stack.admin, role.id.as_str())
        .await;
    assert!(matches!(again, Err(AppError::RoleNotFound { .. })));
}

#[tokio::test]
async fn listings_are_ordered_by_name() {
    let stack = stack().await;
    create_permission(&stack, "read", "courses").await;
    create_permission(&stack, "grade", "submissions").await;
    create_permission(&stack, "read", "assignments").await;
    create_role(&stack, "tutor", Vec::new()).await;
    create_role(&stack, "docente", Vec::new()).await;

    let role_names: Vec<String> = stack
        .service
        .list_roles()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|role| role.name)
        .collect();
    assert_eq!(role_names, vec!["admin", "docente", "tutor"]);

    let permission_names: Vec<String> = stack
        .service
        .list_permissions()
        .await
        .unwrap_or_default()
        .iter()
        .map(Permission::name)
        .collect();
    assert_eq!(
        permission_names,
        vec!["grade:submissions", "read:assignments", "read:courses"]
    );
}

#[tokio::test]
async fn bootstrap_admin_is_idempotent() {
    let stack = stack().await;
    let again = stack.store.bootstrap_admin("admin-1").await;
    assert!(again.is_ok());

    let admins: Vec<Role> = stack
        .service
        .list_roles()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|role| role.name == "admin")
        .collect();
    assert_eq!(admins.len(), 1);

    let roles = stack
        .service
        .roles_for_user("admin-1")
        .await
        .unwrap_or_default();
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn assigning_unknown_role_fails() {
    let stack = stack().await;
    let result = stack.store.assign_role_to_user("user-1", "r-missing").await;
    assert!(matches!(result, Err(AppError::RoleNotFound { .. })));
}
