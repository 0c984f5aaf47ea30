use aula_application::RbacService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rbac_service: RbacService,
}
