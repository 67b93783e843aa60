//! API routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{classes, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/user", user_router())
        .nest("/api/dashboard", dashboard_router())
}

fn user_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/auth/refresh", post(users::refresh))
}

fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/classes/:user_id", get(classes::list_available))
        .route("/applied/:user_id", get(classes::list_applied))
        .route("/studio/:user_id", get(classes::list_by_owner))
        .route("/postClass", post(classes::create_listing))
        .route("/class/apply/:class_id", put(classes::apply))
        .route("/class/withdraw/:class_id", put(classes::withdraw))
        .route("/edit/:class_id", put(classes::edit_listing))
        .route("/class/:class_id", delete(classes::delete_listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use flex_auth::JwtService;
    use flex_db::{MemoryClassDirectory, MemoryUserDirectory};
    use flex_services::{AccountService, ApplicationCoordinator};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let users = Arc::new(MemoryUserDirectory::new());
        let classes = Arc::new(MemoryClassDirectory::new());
        let jwt = Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes", 3600));

        let state = AppState {
            coordinator: ApplicationCoordinator::new(users.clone(), classes),
            accounts: AccountService::new(users, jwt.clone()),
            jwt,
        };

        router().with_state(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn signup(app: &Router, email: &str, role: &str) -> (i64, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/user/signup",
            None,
            Some(json!({
                "type": role,
                "studio": "test studio",
                "firstName": "first",
                "lastName": "last",
                "email": email,
                "password": "password",
                "confirmPass": "password"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["user"]["id"].as_i64().unwrap(),
            body["jwt"].as_str().unwrap().to_string(),
        )
    }

    fn listing() -> Value {
        json!({
            "type": "hatha",
            "length": 75,
            "wage": 25,
            "classDateDay": "sunday",
            "classDateTime": "19:00",
            "startDate": "2024-03-01T18:00:00Z",
            "description": "Qui sit eu laboris occaecat deserunt ipsum."
        })
    }

    #[tokio::test]
    async fn test_signup_response_shape() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/signup",
            None,
            Some(json!({
                "type": "studio",
                "studio": "test studio",
                "firstName": "first",
                "lastName": "last",
                "email": "test@user.com",
                "password": "password",
                "confirmPass": "password"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["firstName"], "first");
        assert_eq!(body["user"]["type"], "studio");
        assert!(body["jwt"].is_string());
    }

    #[tokio::test]
    async fn test_signup_validation_error_body() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/signup",
            None,
            Some(json!({ "type": "studio" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["reason"], "ValidationError");
        assert_eq!(body["location"], "studio");
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let app = test_app();
        signup(&app, "test2@user.com", "instructor").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/login",
            None,
            Some(json!({ "username": "test2@user.com", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Incorrect username or password");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/login",
            None,
            Some(json!({ "username": "test2@user.com", "password": "password" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["jwt"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, Method::POST, "/api/user/auth/refresh", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["type"], "instructor");
    }

    #[tokio::test]
    async fn test_dashboard_requires_token() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/dashboard/classes/1", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/dashboard/classes/1",
            Some("not-a-jwt"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_path_user_must_be_caller() {
        let app = test_app();
        let (id, token) = signup(&app, "test2@user.com", "instructor").await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/applied/{}", id + 1),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_instructor_cannot_post_class() {
        let app = test_app();
        let (_, token) = signup(&app, "test2@user.com", "instructor").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/dashboard/postClass",
            Some(&token),
            Some(listing()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "Forbidden");
    }

    #[tokio::test]
    async fn test_application_scenario() {
        let app = test_app();
        let (studio_id, studio_token) = signup(&app, "test@user.com", "studio").await;
        let (instructor_id, instructor_token) = signup(&app, "test2@user.com", "instructor").await;

        // studio posts a class
        let (status, class) = send(
            &app,
            Method::POST,
            "/api/dashboard/postClass",
            Some(&studio_token),
            Some(listing()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let class_id = class["id"].as_i64().unwrap();
        assert_eq!(class["postedBy"], studio_id);
        assert_eq!(class["userApplied"], json!([]));

        // instructor sees and applies
        let (status, available) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/classes/{instructor_id}?days=Sunday,monday"),
            Some(&instructor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(available.as_array().unwrap().len(), 1);

        let apply_uri = format!("/api/dashboard/class/apply/{class_id}");
        let (status, class) = send(&app, Method::PUT, &apply_uri, Some(&instructor_token), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(class["userApplied"], json!([instructor_id]));

        let (status, body) = send(&app, Method::PUT, &apply_uri, Some(&instructor_token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["reason"], "AlreadyApplied");

        let (_, applied) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/applied/{instructor_id}"),
            Some(&instructor_token),
            None,
        )
        .await;
        assert_eq!(applied[0]["id"], class_id);

        // studio sees who applied
        let (status, owned) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/studio/{studio_id}"),
            Some(&studio_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(owned[0]["userApplied"], json!([instructor_id]));
        assert_eq!(owned[0]["applicants"][0]["firstName"], "first");
        assert_eq!(owned[0]["applicants"][0]["email"], "test2@user.com");

        // withdraw
        let (status, class) = send(
            &app,
            Method::PUT,
            &format!("/api/dashboard/class/withdraw/{class_id}"),
            Some(&instructor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(class["userApplied"], json!([]));

        // edit with a bad wage, then a good one
        let edit_uri = format!("/api/dashboard/edit/{class_id}");
        let mut bad = listing();
        bad["wage"] = json!(0);
        let (status, body) = send(&app, Method::PUT, &edit_uri, Some(&studio_token), Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["location"], "wage");

        let mut good = listing();
        good["wage"] = json!(40);
        let (status, class) =
            send(&app, Method::PUT, &edit_uri, Some(&studio_token), Some(good)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(class["wage"], 40.0);

        // only the owner may delete
        let delete_uri = format!("/api/dashboard/class/{class_id}");
        let (status, _) = send(&app, Method::DELETE, &delete_uri, Some(&instructor_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, &delete_uri, Some(&studio_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(format!("Class {class_id} deleted")));

        let (_, owned) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/studio/{studio_id}"),
            Some(&studio_token),
            None,
        )
        .await;
        assert_eq!(owned, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_validation_error() {
        let app = test_app();
        let (id, token) = signup(&app, "test2@user.com", "instructor").await;

        let (status, body) =
            send(&app, Method::PUT, "/api/dashboard/class/apply/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["reason"], "ValidationError");
        assert_eq!(body["location"], "classId");

        let (status, body) =
            send(&app, Method::GET, "/api/dashboard/applied/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["location"], "userId");

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/dashboard/applied/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let app = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
