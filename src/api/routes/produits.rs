use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::api::routes::AuthenticatedUser;
use crate::domain::produit::{NewProduit, ProduitFilter, ProduitUpdate, VenteProduit};
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Liste filtrable par `?vendu=true|false&parcelle_id=<uuid>`
#[get("/produits")]
pub async fn list_produits(
    user: AuthenticatedUser,
    filter: web::Query<ProduitFilter>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produits = state.produits().list(user.id, filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(produits))
}

#[post("/produits")]
pub async fn create_produit(
    user: AuthenticatedUser,
    data: web::Json<NewProduit>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produit = state.produits().create(user.id, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(produit))
}

#[get("/produits/{id}")]
pub async fn get_produit(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produit = state.produits().get(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(produit))
}

#[put("/produits/{id}")]
pub async fn update_produit(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    update: web::Json<ProduitUpdate>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produit = state
        .produits()
        .update(user.id, path.into_inner(), update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(produit))
}

#[delete("/produits/{id}")]
pub async fn delete_produit(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    state.produits().delete(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Enregistre la vente d'un produit
#[post("/produits/{id}/vente")]
pub async fn mark_sold(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    vente: web::Json<VenteProduit>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produit = state
        .produits()
        .mark_sold(user.id, path.into_inner(), vente.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(produit))
}

/// Annule la vente d'un produit
#[delete("/produits/{id}/vente")]
pub async fn mark_unsold(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let produit = state.produits().mark_unsold(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(produit))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::json;

    use crate::api::test_support::{bearer, test_state};
    use crate::infrastructure::database::test_support::seed_user;

    #[actix_web::test]
    async fn sale_lifecycle_computes_profit() {
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
            .set_json(json!({"numero": "LX-10", "transporteur": "EMS", "poids_grammes": 1000.0, "prix_total": 20.0}))
            .to_request();
        let parcelle: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/produits")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"nom": "Sweat", "prix_achat": 10.0, "poids_grammes": 500.0, "parcelle_id": parcelle["id"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let produit: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(produit["cout_livraison"], 10.0);
        assert_eq!(produit["cout_total"], 20.0);
        assert!(produit["benefice"].is_null());
        let id = produit["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/produits/{}/vente", id))
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"prix_vente": 30.0, "plateforme": "Vinted"}))
            .to_request();
        let sold: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sold["vendu"], true);
        assert_eq!(sold["benefice"], 10.0);

        let req = test::TestRequest::get()
            .uri("/api/v1/produits?vendu=true")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let vendus: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(vendus.len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/produits/{}/vente", id))
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let unsold: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(unsold["vendu"], false);
        assert!(unsold["prix_vente"].is_null());

        // La parcelle ne peut pas être supprimée tant que le produit y est rattaché
        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/parcelles/{}", parcelle["id"].as_str().unwrap()))
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/produits/{}", id))
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);
    }

    #[actix_web::test]
    async fn other_users_products_are_invisible() {
        let state = test_state().await;
        let alice = seed_user(&state.db, "alice").await;
        let bob = seed_user(&state.db, "bob").await;
        let alice_auth = bearer(&state, alice.id);
        let bob_auth = bearer(&state, bob.id);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(crate::api::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/produits")
            .insert_header(("Authorization", alice_auth))
            .set_json(json!({"nom": "Jean", "prix_achat": 5.0}))
            .to_request();
        let produit: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/produits/{}", produit["id"].as_str().unwrap()))
            .insert_header(("Authorization", bob_auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::get()
            .uri("/api/v1/produits?vendu=peut-etre")
            .insert_header(("Authorization", bob_auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
