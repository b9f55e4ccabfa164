use actix_web::{delete, get, put, web, HttpResponse};

use crate::api::routes::AuthenticatedUser;
use crate::domain::integration::{Provider, StoreCredential};
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// État des intégrations (Vinted, Superbuy), secrets masqués
#[get("/integrations")]
pub async fn list_integrations(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let status = state.credentials().status(user.id).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[put("/integrations/{provider}")]
pub async fn store_integration(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Json<StoreCredential>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let provider: Provider = path.parse()?;
    let status = state
        .credentials()
        .store(user.id, provider, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(status))
}

#[delete("/integrations/{provider}")]
pub async fn delete_integration(
    user: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let provider: Provider = path.parse()?;
    state.credentials().delete(user.id, provider).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::json;

    use crate::api::test_support::{bearer, test_state};
    use crate::infrastructure::database::test_support::seed_user;

    #[actix_web::test]
    async fn secrets_are_masked_and_deletable() {
        let state = test_state().await;
        let alice = seed_user(&state.db, "alice").await;
        let auth = bearer(&state, alice.id);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/v1/integrations/superbuy")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"secret": "sb-secret-token-1234"}))
            .to_request();
        let stored: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored["configured"], true);
        assert!(!stored["hint"].as_str().unwrap().contains("secret"));

        let req = test::TestRequest::get()
            .uri("/api/v1/integrations")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let list: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["provider"], "vinted");
        assert_eq!(list[0]["configured"], false);
        assert_eq!(list[1]["configured"], true);

        let req = test::TestRequest::delete()
            .uri("/api/v1/integrations/superbuy")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);

        let req = test::TestRequest::delete()
            .uri("/api/v1/integrations/superbuy")
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn unknown_provider_is_bad_request() {
        let state = test_state().await;
        let alice = seed_user(&state.db, "alice").await;
        let auth = bearer(&state, alice.id);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/v1/integrations/ebay")
            .insert_header(("Authorization", auth))
            .set_json(json!({"secret": "x"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
