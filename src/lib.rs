pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::identity::IdentityVerifier;
use crate::repository::JobBoardRepository;
use crate::services::{
    application_service::ApplicationService, auth_service::AuthService, job_service::JobService,
    profile_service::ProfileService,
};
use crate::storage::DocumentStorage;

/// Settings the HTTP layer needs beyond the injected backends.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub signed_url_ttl: Duration,
}

impl StateSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_ttl_hours: config.jwt_ttl_hours,
            signed_url_ttl: config.signed_url_ttl(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn JobBoardRepository>,
    pub storage: Arc<dyn DocumentStorage>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn JobBoardRepository>,
        storage: Arc<dyn DocumentStorage>,
        identity: Arc<dyn IdentityVerifier>,
        settings: StateSettings,
    ) -> Self {
        let profile_service = ProfileService::new(repo.clone());
        let auth_service = AuthService::new(
            repo.clone(),
            profile_service.clone(),
            settings.jwt_secret,
            settings.jwt_ttl_hours,
        );
        let job_service = JobService::new(repo.clone(), profile_service.clone());
        let application_service = ApplicationService::new(
            repo.clone(),
            storage.clone(),
            profile_service.clone(),
            settings.signed_url_ttl,
        );

        Self {
            repo,
            storage,
            identity,
            auth_service,
            profile_service,
            job_service,
            application_service,
        }
    }
}
