use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, ClientResult};
use crate::session::{Claims, Role, SessionStore};

use super::dispatch::{ApiResponse, Dispatcher, RequestOptions};
use super::models::{LoginGrant, Message, NewTask, RegisterRequest, Task, User};

/// Typed wrapper around the dashboard REST API. One method per endpoint;
/// this is where non-2xx statuses become `RequestFailed`.
pub struct DashboardApi {
    dispatcher: Dispatcher,
    session: Arc<SessionStore>,
}

impl DashboardApi {
    pub fn new(base: Url, session: Arc<SessionStore>, timeout: Duration) -> ClientResult<Self> {
        let dispatcher = Dispatcher::new(base, session.clone(), timeout)?;
        Ok(Self { dispatcher, session })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn require_success(resp: ApiResponse) -> ClientResult<ApiResponse> {
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(ClientError::request_failed(resp.status, resp.error_text()))
        }
    }

    /// POST /login (form-encoded), then hand the granted token to the
    /// session store. A grant that does not decode never becomes a session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Claims> {
        let form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let resp = self.dispatcher.send_public("/login", RequestOptions::post_form(form)).await?;
        let resp = Self::require_success(resp)?;
        let grant: LoginGrant = resp.json()?;
        self.session.login(&grant.access_token)
    }

    /// POST /register. Unauthenticated; returns the server's message.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<String> {
        let body = serde_json::to_value(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ClientError::io(e.to_string()))?;
        let resp = self.dispatcher.send_public("/register", RequestOptions::post_json(body)).await?;
        let resp = Self::require_success(resp)?;
        let msg: Message = resp.json()?;
        Ok(msg.message)
    }

    /// POST /change-password for the logged-in user.
    pub async fn change_password(&self, old: &str, new: &str) -> ClientResult<String> {
        let body = serde_json::json!({ "old_password": old, "new_password": new });
        let resp = self.dispatcher.send("/change-password", RequestOptions::post_json(body)).await?;
        let resp = Self::require_success(resp)?;
        let msg: Message = resp.json()?;
        Ok(msg.message)
    }

    /// GET /tasks.
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        let resp = self.dispatcher.send("/tasks", RequestOptions::get()).await?;
        Self::require_success(resp)?.json()
    }

    /// POST /tasks; returns the created task with its server-assigned id.
    pub async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        let body = serde_json::to_value(task).map_err(|e| ClientError::io(e.to_string()))?;
        let resp = self.dispatcher.send("/tasks", RequestOptions::post_json(body)).await?;
        Self::require_success(resp)?.json()
    }

    /// DELETE /tasks/{id}.
    pub async fn delete_task(&self, id: i64) -> ClientResult<()> {
        let resp = self.dispatcher.send(&format!("/tasks/{}", id), RequestOptions::delete()).await?;
        Self::require_success(resp)?;
        Ok(())
    }

    /// GET /admin/users (admin only, enforced server-side).
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        let resp = self.dispatcher.send("/admin/users", RequestOptions::get()).await?;
        Self::require_success(resp)?.json()
    }

    /// PUT /admin/users/{id}/role.
    pub async fn update_user_role(&self, id: i64, role: Role) -> ClientResult<()> {
        let body = serde_json::json!({ "role": role });
        let resp = self
            .dispatcher
            .send(&format!("/admin/users/{}/role", id), RequestOptions::put_json(body))
            .await?;
        Self::require_success(resp)?;
        Ok(())
    }

    /// DELETE /admin/users/{id}.
    pub async fn delete_user(&self, id: i64) -> ClientResult<()> {
        let resp = self
            .dispatcher
            .send(&format!("/admin/users/{}", id), RequestOptions::delete())
            .await?;
        Self::require_success(resp)?;
        Ok(())
    }

    /// POST /admin/approve/{id}; activates a pending registration.
    pub async fn approve_user(&self, id: i64) -> ClientResult<String> {
        let resp = self
            .dispatcher
            .send(&format!("/admin/approve/{}", id), RequestOptions::post_empty())
            .await?;
        let resp = Self::require_success(resp)?;
        let msg: Message = resp.json()?;
        Ok(msg.message)
    }
}
