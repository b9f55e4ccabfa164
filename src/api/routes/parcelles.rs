use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::api::routes::AuthenticatedUser;
use crate::domain::parcelle::{NewParcelle, ParcelleUpdate};
use crate::infrastructure::error::AppResult;
use crate::AppState;

#[get("/parcelles")]
pub async fn list_parcelles(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let parcelles = state.parcelles().list(user.id).await?;
    Ok(HttpResponse::Ok().json(parcelles))
}

#[post("/parcelles")]
pub async fn create_parcelle(
    user: AuthenticatedUser,
    data: web::Json<NewParcelle>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let parcelle = state.parcelles().create(user.id, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(parcelle))
}

#[get("/parcelles/{id}")]
pub async fn get_parcelle(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let parcelle = state.parcelles().get(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(parcelle))
}

#[put("/parcelles/{id}")]
pub async fn update_parcelle(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    update: web::Json<ParcelleUpdate>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let parcelle = state
        .parcelles()
        .update(user.id, path.into_inner(), update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(parcelle))
}

#[delete("/parcelles/{id}")]
pub async fn delete_parcelle(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    state.parcelles().delete(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::json;

    use crate::api::test_support::{bearer, test_state};
    use crate::infrastructure::database::test_support::seed_user;

    #[actix_web::test]
    async fn parcelle_crud_flow() {
        let state = test_state().await;
        let alice = seed_user(&state.db, "alice").await;
        let auth = bearer(&state, alice.id);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/parcelles")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"numero": "LX-001", "transporteur": "Colissimo", "poids_grammes": 2000.0, "prix_total": 40.0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["prix_par_gramme"], 0.02);
        assert_eq!(created["statut"], "en_attente");
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/parcelles/{}", id))
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"prix_total": 60.0, "statut": "livree"}))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["prix_par_gramme"], 0.03);
        assert_eq!(updated["statut"], "livree");

        let req = test::TestRequest::get()
            .uri("/api/v1/parcelles")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let list: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/parcelles/{}", id))
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/parcelles/{}", id))
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn duplicate_numero_and_bad_id() {
        let state = test_state().await;
        let alice = seed_user(&state.db, "alice").await;
        let auth = bearer(&state, alice.id);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let body = json!({"numero": "LX-002", "transporteur": "DHL", "poids_grammes": 500.0, "prix_total": 10.0});
        for expected in [201, 409] {
            let req = test::TestRequest::post()
                .uri("/api/v1/parcelles")
                .insert_header(("Authorization", auth.clone()))
                .set_json(&body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/parcelles/pas-un-uuid")
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
