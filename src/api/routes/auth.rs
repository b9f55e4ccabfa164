use actix_web::{get, post, web, HttpResponse};

use crate::api::routes::AuthenticatedUser;
use crate::domain::user::{NewUser, UserLogin};
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Endpoint d'inscription
#[post("/auth/register")]
pub async fn register(
    new_user: web::Json<NewUser>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let user = state.users().register(new_user.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Endpoint de connexion (nom d'utilisateur ou email)
#[post("/auth/login")]
pub async fn login(
    credentials: web::Json<UserLogin>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let token = state.users().login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// Profil de l'utilisateur connecté
#[get("/auth/me")]
pub async fn me(user: AuthenticatedUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state.users().get(user.id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::json;

    use crate::api::test_support::test_state;

    #[actix_web::test]
    async fn register_login_and_me() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({"username": "alice", "email": "Alice@Example.com", "password": "motdepasse123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["email"], "alice@example.com");
        assert!(created.get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"login": "alice", "password": "motdepasse123"}))
            .to_request();
        let token: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(token["token_type"], "Bearer");
        let access = token["access_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let me: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["username"], "alice");
    }

    #[actix_web::test]
    async fn bad_password_and_missing_token_are_unauthorized() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({"username": "bob", "email": "bob@example.com", "password": "motdepasse123"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"login": "bob", "password": "mauvais"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn invalid_registration_is_unprocessable() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({"username": "al", "email": "pas-un-email", "password": "court"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 422);
    }
}
