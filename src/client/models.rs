use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Interpreter the backend uses to run a task's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    Python,
    Bash,
}

impl ScriptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Python => "python",
            ScriptType::Bash => "bash",
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScriptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(ScriptType::Python),
            "bash" => Ok(ScriptType::Bash),
            other => Err(format!("unknown script type '{}' (expected python or bash)", other)),
        }
    }
}

/// A scheduled task as the backend returns it. The backend owns these; the
/// client holds a transient copy for rendering only.
// The wire name of the scheduled flag is misspelled upstream; keep the wire
// spelling, expose the clean name in Rust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub taskname: String,
    #[serde(rename = "sheduled")]
    pub scheduled: bool,
    pub runcount: i64,
    pub successful: bool,
    #[serde(default)]
    pub schedule_cron: Option<String>,
    #[serde(default)]
    pub script_path: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
    pub script_type: ScriptType,
}

/// Body for task creation: a task without an id. Counters start at zero on
/// the server side regardless, so they are fixed here.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub taskname: String,
    #[serde(rename = "sheduled")]
    pub scheduled: bool,
    pub runcount: i64,
    pub successful: bool,
    pub schedule_cron: Option<String>,
    pub script_path: Option<String>,
    pub parameters: Option<String>,
    pub script_type: ScriptType,
}

impl NewTask {
    pub fn new(taskname: impl Into<String>, script_type: ScriptType) -> Self {
        Self {
            taskname: taskname.into(),
            scheduled: false,
            runcount: 0,
            successful: false,
            schedule_cron: None,
            script_path: None,
            parameters: None,
            script_type,
        }
    }
}

/// A user row from the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `{"message": ...}` envelope the backend uses for acknowledgements.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Response of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_uses_upstream_wire_spelling() {
        let wire = serde_json::json!({
            "id": 3, "taskname": "nightly backup", "sheduled": true,
            "runcount": 12, "successful": true,
            "schedule_cron": "0 2 * * *", "script_path": "/opt/jobs/backup.sh",
            "parameters": null, "script_type": "bash"
        });
        let task: Task = serde_json::from_value(wire).unwrap();
        assert!(task.scheduled);
        assert_eq!(task.script_type, ScriptType::Bash);
        assert_eq!(task.schedule_cron.as_deref(), Some("0 2 * * *"));

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back.get("sheduled").and_then(|v| v.as_bool()), Some(true));
        assert!(back.get("scheduled").is_none());
    }

    #[test]
    fn new_task_serializes_without_id() {
        let mut t = NewTask::new("report", ScriptType::Python);
        t.scheduled = true;
        t.schedule_cron = Some("*/5 * * * *".into());
        let v = serde_json::to_value(&t).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v.get("sheduled").and_then(|x| x.as_bool()), Some(true));
        assert_eq!(v.get("runcount").and_then(|x| x.as_i64()), Some(0));
        assert_eq!(v.get("script_type").and_then(|x| x.as_str()), Some("python"));
    }

    #[test]
    fn user_role_uses_snake_case() {
        let wire = serde_json::json!({
            "id": 1, "username": "ada", "email": "ada@example.org",
            "is_active": false, "role": "power_user"
        });
        let user: User = serde_json::from_value(wire).unwrap();
        assert_eq!(user.role, Role::PowerUser);
        assert!(!user.is_active);
    }
}
