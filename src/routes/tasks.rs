use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, \
     created_at, updated_at, user_id, project_id";

/// Retrieves the authenticated user's tasks, newest first.
///
/// Supports filtering by `status`, `priority`, `project_id`, and a `search`
/// term matched case-insensitively against titles and descriptions.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    // Base query scoped to the authenticated user; filter conditions are
    // appended with positional parameters.
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    if query_params.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query_params.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }
    if query_params.project_id.is_some() {
        sql.push_str(&format!(" AND project_id = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        sql.push_str(&format!(
            " AND (title ILIKE ${} OR description ILIKE ${})",
            param_count,
            param_count + 1
        ));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(user.id);

    if let Some(status) = &query_params.status {
        query_builder = query_builder.bind(status);
    }
    if let Some(priority) = &query_params.priority {
        query_builder = query_builder.bind(priority);
    }
    if let Some(project_id) = query_params.project_id {
        query_builder = query_builder.bind(project_id);
    }
    if let Some(search) = &query_params.search {
        let search_pattern = format!("%{}%", search);
        query_builder = query_builder.bind(search_pattern.clone());
        query_builder = query_builder.bind(search_pattern);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// When `project_id` is supplied the project must exist and belong to the
/// caller; a foreign project is a 403.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    if let Some(project_id) = task_data.project_id {
        assert_project_owned(&pool, project_id, user.id).await?;
    }

    let task = Task::new(task_data.into_inner(), user.id);

    let sql = format!(
        "INSERT INTO tasks (id, title, description, priority, status, due_date, user_id, project_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {}",
        TASK_COLUMNS
    );
    let result = sqlx::query_as::<_, Task>(&sql)
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.user_id)
        .bind(task.project_id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a specific task by its ID. Someone else's task is a 403.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = fetch_owned_task(&pool, task_id.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task owned by the authenticated user.
///
/// `project_id` moves the task between projects (or out of one, when null);
/// the target project must belong to the caller.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let id = task_id.into_inner();

    fetch_owned_task(&pool, id, user.id).await?;
    if let Some(project_id) = task_data.project_id {
        assert_project_owned(&pool, project_id, user.id).await?;
    }

    let sql = format!(
        "UPDATE tasks \
         SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, \
             project_id = $6, updated_at = now() \
         WHERE id = $7 AND user_id = $8 \
         RETURNING {}",
        TASK_COLUMNS
    );
    let result = sqlx::query_as::<_, Task>(&sql)
        .bind(&task_data.title)
        .bind(&task_data.description)
        .bind(&task_data.priority)
        .bind(&task_data.status)
        .bind(task_data.due_date)
        .bind(task_data.project_id)
        .bind(id)
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task owned by the authenticated user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    fetch_owned_task(&pool, id, user.id).await?;

    sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Checks that a project exists and belongs to the user: missing is 404,
/// someone else's is 403.
async fn assert_project_owned(
    pool: &PgPool,
    project_id: Uuid,
    user_id: i32,
) -> Result<(), AppError> {
    let owner = sqlx::query_scalar::<_, i32>("SELECT user_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if owner != user_id {
        return Err(AppError::Forbidden("You do not own this project".into()));
    }
    Ok(())
}

/// Loads a task and enforces ownership: missing row is 404, someone else's
/// row is 403.
async fn fetch_owned_task(pool: &PgPool, task_id: Uuid, user_id: i32) -> Result<Task, AppError> {
    let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if task.user_id != user_id {
        return Err(AppError::Forbidden("You do not own this task".into()));
    }
    Ok(task)
}
