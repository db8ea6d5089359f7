use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use jsonwebtoken::Algorithm;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use taskhub::auth::{AuthResponse, AuthService};
use taskhub::config::AuthConfig;
use taskhub::models::Project;
use taskhub::routes;
use taskhub::routes::health;

macro_rules! test_app {
    ($pool:expr, $auth:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data($auth.clone())
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(taskhub::auth::AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

async fn setup() -> (PgPool, web::Data<AuthService>) {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    let config = AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        jwt_algorithm: Algorithm::HS256,
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 43200,
        rotate_on_refresh: true,
        prune_after_days: 30,
    };
    let auth = web::Data::new(AuthService::new(pool.clone(), &config));
    (pool, auth)
}

fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, Uuid::new_v4().simple())
}

async fn cleanup(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! register {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({
                "name": "Project Tester",
                "email": $email,
                "password": "Password123!",
                "password_confirmation": "Password123!"
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let session: AuthResponse = test::read_body_json(resp).await;
        session
    }};
}

#[actix_rt::test]
async fn test_cross_tenant_project_access_is_forbidden_not_hidden() {
    let (pool, auth) = setup().await;
    let app = test_app!(pool, auth);
    let email_a = unique_email("owner");
    let email_b = unique_email("intruder");

    let user_a = register!(app, &email_a);
    let user_b = register!(app, &email_b);

    // A creates a project
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .append_header(("Authorization", format!("Bearer {}", user_a.access_token)))
        .set_json(json!({ "name": "A's secret roadmap" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let project: Project = test::read_body_json(resp).await;

    // B can authenticate, but A's project is 403: it exists, B just does not
    // own it. Not 404, not 200.
    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", format!("Bearer {}", user_b.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // Mutations are equally forbidden
    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", format!("Bearer {}", user_b.access_token)))
        .set_json(json!({ "name": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", format!("Bearer {}", user_b.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // The owner still sees it
    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", format!("Bearer {}", user_a.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // A row that does not exist at all is a plain 404
    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", Uuid::new_v4()))
        .append_header(("Authorization", format!("Bearer {}", user_b.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    cleanup(&pool, &email_a).await;
    cleanup(&pool, &email_b).await;
}

#[actix_rt::test]
async fn test_project_crud_flow() {
    let (pool, auth) = setup().await;
    let app = test_app!(pool, auth);
    let email = unique_email("crud");

    let session = register!(app, &email);
    let bearer = format!("Bearer {}", session.access_token);

    // Create
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .append_header(("Authorization", bearer.clone()))
        .set_json(json!({ "name": "Initial name", "description": "First draft" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let project: Project = test::read_body_json(resp).await;
    assert_eq!(project.name, "Initial name");
    assert_eq!(project.user_id, session.user.id);

    // List contains it
    let req = test::TestRequest::get()
        .uri("/api/projects")
        .append_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let projects: Vec<Project> = test::read_body_json(resp).await;
    assert!(projects.iter().any(|p| p.id == project.id));

    // Update
    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", bearer.clone()))
        .set_json(json!({ "name": "Renamed", "description": "Second draft" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let updated: Project = test::read_body_json(resp).await;
    assert_eq!(updated.name, "Renamed");

    // Empty name fails validation
    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", bearer.clone()))
        .set_json(json!({ "name": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
    );

    // Delete, then it is gone
    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", project.id))
        .append_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    cleanup(&pool, &email).await;
}
