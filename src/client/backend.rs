use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::dto::application_dto::{SubmissionReceipt, UploadedDocument, DOCUMENT_FIELD_PREFIX};
use crate::dto::auth_dto::{AuthResponse, SignInPayload, SignUpPayload};
use crate::dto::job_dto::OwnedJobIdsResponse;
use crate::error::{Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::{Application, ApplicationStatus, Job};
use crate::AppState;

/// Everything a [`SyncSession`](super::SyncSession) needs from the server,
/// scoped to the signed-in actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardBackend: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>>;
    /// Candidate: own applications. Employer: the joined query over owned jobs.
    async fn list_applications(&self) -> Result<Vec<Application>>;
    async fn owned_job_ids(&self) -> Result<Vec<Uuid>>;
    async fn applications_for_jobs(&self, job_ids: Vec<Uuid>) -> Result<Vec<Application>>;
    async fn update_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application>;
    async fn submit_application(
        &self,
        job_id: Uuid,
        documents: Vec<UploadedDocument>,
    ) -> Result<Application>;
}

/// Talks to this crate's HTTP API.
#[derive(Clone)]
pub struct HttpBoardClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBoardClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthResponse> {
        let payload = SignInPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: AuthResponse = self.send(self.post("/api/auth/sign-in").json(&payload)).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn sign_up(&mut self, payload: &SignUpPayload) -> Result<AuthResponse> {
        let session: AuthResponse = self.send(self.post("/api/auth/sign-up").json(payload)).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.post(self.url(path)))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = req.send().await?;
        let res = error_for_status(res).await?;
        Ok(res.json().await?)
    }
}

/// Turns a non-2xx response into [`Error::Backend`] carrying the server's
/// `error` message verbatim.
async fn error_for_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    Err(Error::Backend {
        status: status.as_u16(),
        message: backend_message(&text),
    })
}

pub(crate) fn backend_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl BoardBackend for HttpBoardClient {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.send(self.get("/api/jobs")).await
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.send(self.get("/api/applications")).await
    }

    async fn owned_job_ids(&self) -> Result<Vec<Uuid>> {
        let res: OwnedJobIdsResponse = self.send(self.get("/api/jobs/mine/ids")).await?;
        Ok(res.ids)
    }

    async fn applications_for_jobs(&self, job_ids: Vec<Uuid>) -> Result<Vec<Application>> {
        let ids = job_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.send(self.get("/api/applications/by-jobs").query(&[("ids", ids)]))
            .await
    }

    async fn update_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let path = format!("/api/applications/{}/status", application_id);
        let req = self
            .authorized(self.client.patch(self.url(&path)))
            .json(&json!({ "status": status }));
        self.send(req).await
    }

    async fn submit_application(
        &self,
        job_id: Uuid,
        documents: Vec<UploadedDocument>,
    ) -> Result<Application> {
        let mut form = multipart::Form::new().text("job_id", job_id.to_string());
        for doc in documents {
            let part = multipart::Part::bytes(doc.data.to_vec()).file_name(doc.file_name);
            form = form.part(format!("{}{}", DOCUMENT_FIELD_PREFIX, doc.requirement), part);
        }
        let receipt: SubmissionReceipt = self.send(self.post("/api/applications").multipart(form)).await?;
        Ok(receipt.application)
    }
}

/// Runs the session directly against the services of an in-process
/// [`AppState`]. Used in demo mode and tests.
#[derive(Clone)]
pub struct LocalBoardBackend {
    state: AppState,
    actor: CurrentUser,
}

impl LocalBoardBackend {
    pub fn new(state: AppState, actor: CurrentUser) -> Self {
        Self { state, actor }
    }
}

#[async_trait]
impl BoardBackend for LocalBoardBackend {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.state.job_service.list_active().await
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.state.application_service.list_for_actor(&self.actor).await
    }

    async fn owned_job_ids(&self) -> Result<Vec<Uuid>> {
        self.state.job_service.owned_ids(&self.actor).await
    }

    async fn applications_for_jobs(&self, job_ids: Vec<Uuid>) -> Result<Vec<Application>> {
        self.state
            .application_service
            .for_jobs(&self.actor, &job_ids)
            .await
    }

    async fn update_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        self.state
            .application_service
            .transition(&self.actor, application_id, status)
            .await
    }

    async fn submit_application(
        &self,
        job_id: Uuid,
        documents: Vec<UploadedDocument>,
    ) -> Result<Application> {
        let receipt = self
            .state
            .application_service
            .submit(&self.actor, job_id, documents)
            .await?;
        Ok(receipt.application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_prefers_error_field() {
        assert_eq!(
            backend_message(r#"{"error":"permission denied for table jobs","code":"forbidden"}"#),
            "permission denied for table jobs"
        );
        assert_eq!(backend_message(" rate_limit_exceeded "), "rate_limit_exceeded");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = HttpBoardClient::new("http://127.0.0.1:9/", Client::new());
        let err = client.list_jobs().await.unwrap_err();
        assert!(matches!(err, Error::Reqwest(_)));
        assert!(!err.is_permission_denied());
    }
}
