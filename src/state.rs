use std::sync::Arc;

use crate::{
    auth::gateway::AuthGateway,
    config::Config,
    leave::LeaveWorkflow,
    store::{DepartmentStore, LeaveStore, PrincipalStore, SalaryStore},
};

/// Everything a handler needs, shared across workers behind `web::Data`.
pub struct AppState {
    pub auth: AuthGateway,
    pub leaves: LeaveWorkflow,
    pub principals: Arc<dyn PrincipalStore>,
    pub departments: Arc<dyn DepartmentStore>,
    pub salaries: Arc<dyn SalaryStore>,
}

impl AppState {
    /// Wires every service onto one backing store.
    pub fn new<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: PrincipalStore + LeaveStore + DepartmentStore + SalaryStore + 'static,
    {
        let principals: Arc<dyn PrincipalStore> = store.clone();
        let leaves: Arc<dyn LeaveStore> = store.clone();

        Self {
            auth: AuthGateway::new(principals.clone(), &config.jwt_secret, config.token_ttl),
            leaves: LeaveWorkflow::new(leaves, principals.clone(), config.allowances),
            principals,
            departments: store.clone(),
            salaries: store,
        }
    }
}
