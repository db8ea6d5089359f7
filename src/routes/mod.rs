pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

use actix_web::web;

/// Registers everything that lives under the `/api` scope. The auth endpoints
/// sit at the scope root (`/api/register`, `/api/login`, ...); projects and
/// tasks get their own sub-scopes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::refresh)
        .service(auth::logout_all)
        .service(auth::logout)
        .service(auth::current_user)
        .service(auth::change_password)
        .service(
            web::scope("/projects")
                .service(projects::get_projects)
                .service(projects::create_project)
                .service(projects::get_project)
                .service(projects::update_project)
                .service(projects::delete_project),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
