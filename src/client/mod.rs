//! HTTP side of the client: wire models, the authorized request dispatcher,
//! and the typed wrapper around the dashboard REST API.

mod api;
mod dispatch;
mod models;

pub use api::DashboardApi;
pub use dispatch::{ApiResponse, Dispatcher, RequestOptions};
pub use models::{LoginGrant, Message, NewTask, RegisterRequest, ScriptType, Task, User};
