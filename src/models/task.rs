use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    pub status: TaskStatus,

    /// Optional parent project. Ownership of the project is checked on create.
    pub project_id: Option<Uuid>,
}

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub project_id: Option<Uuid>,
}

/// Query parameters for filtering tasks when listing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Uuid>,
    /// Search term matched against title and description (case-insensitive).
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the creator's `user_id`.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
            project_id: input.project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let input = TaskInput {
            title: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
            priority: Some(TaskPriority::High),
            status: TaskStatus::Todo,
            due_date: Some(Utc::now()),
            project_id: None,
        };

        let task = Task::new(input, 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, 1);
        assert!(task.project_id.is_none());
    }

    #[test]
    fn test_task_validation() {
        let valid_input = TaskInput {
            title: "Valid Task".to_string(),
            description: Some("Valid Description".to_string()),
            priority: Some(TaskPriority::High),
            status: TaskStatus::Todo,
            due_date: Some(Utc::now()),
            project_id: None,
        };
        assert!(valid_input.validate().is_ok());

        let invalid_input = TaskInput {
            title: "".to_string(), // Empty title
            description: Some("Valid Description".to_string()),
            priority: Some(TaskPriority::High),
            status: TaskStatus::Todo,
            due_date: Some(Utc::now()),
            project_id: None,
        };
        assert!(invalid_input.validate().is_err());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(1001)),
            priority: None,
            status: TaskStatus::Todo,
            due_date: None,
            project_id: None,
        };
        assert!(long_description.validate().is_err());
    }
}
