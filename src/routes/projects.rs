use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Project, ProjectInput},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const PROJECT_COLUMNS: &str = "id, name, description, user_id, created_at, updated_at";

/// Lists the authenticated user's projects, newest first.
#[get("")]
pub async fn get_projects(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
        PROJECT_COLUMNS
    );
    let projects = sqlx::query_as::<_, Project>(&sql)
        .bind(user.id)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Creates a new project owned by the authenticated user.
#[post("")]
pub async fn create_project(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let sql = format!(
        "INSERT INTO projects (id, name, description, user_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        PROJECT_COLUMNS
    );
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(Uuid::new_v4())
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(project))
}

/// Retrieves a project by id.
///
/// A project that exists but belongs to someone else is a 403, not a 404:
/// the caller is authenticated, just not the owner.
#[get("/{id}")]
pub async fn get_project(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = fetch_owned_project(&pool, project_id.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Updates a project owned by the authenticated user.
#[put("/{id}")]
pub async fn update_project(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    project_id: web::Path<Uuid>,
    payload: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let id = project_id.into_inner();

    // Ownership first, so the caller gets 403/404 before any mutation.
    fetch_owned_project(&pool, id, user.id).await?;

    let sql = format!(
        "UPDATE projects SET name = $1, description = $2, updated_at = now() \
         WHERE id = $3 AND user_id = $4 \
         RETURNING {}",
        PROJECT_COLUMNS
    );
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(id)
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project owned by the authenticated user.
#[delete("/{id}")]
pub async fn delete_project(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let id = project_id.into_inner();
    fetch_owned_project(&pool, id, user.id).await?;

    sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Loads a project and enforces ownership: missing row is 404, someone
/// else's row is 403.
async fn fetch_owned_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: i32,
) -> Result<Project, AppError> {
    let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if project.user_id != user_id {
        return Err(AppError::Forbidden("You do not own this project".into()));
    }
    Ok(project)
}
