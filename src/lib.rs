pub mod catalog;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::catalog::QuestionCatalog;
use crate::services::application_service::ApplicationService;
use crate::services::identity_service::IdentityVerifier;
use crate::services::notify_service::NotificationDispatcher;
use crate::store::ApplicationStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<QuestionCatalog>,
    pub application_service: ApplicationService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        verifier: Arc<dyn IdentityVerifier>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let catalog = Arc::new(QuestionCatalog::builtin());
        let application_service =
            ApplicationService::new(catalog.clone(), store, verifier, notifier);

        Self {
            catalog,
            application_service,
        }
    }
}
