mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App, ResponseError};
use balls_backend::handlers;
use balls_backend::middlewares::{create_cors, AuthMiddleware};
use balls_backend::models::{CreateProgramRequest, Role};
use balls_backend::swagger::swagger_config;
use balls_backend::utils::JwtService;
use common::{admin, customer, setup};
use serde_json::json;

fn jwt() -> JwtService {
    JwtService::new("route-test-secret".to_string())
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

// Builds the App exactly as main.rs wires it: middleware stack, service
// data, swagger and the /api/v1 endpoint groups.
macro_rules! app {
    ($env:expr, $jwt:expr) => {
        test::init_service(
            App::new()
                .wrap(create_cors())
                .wrap(AuthMiddleware::new($jwt.clone()))
                .app_data(web::Data::new($env.audit.clone()))
                .app_data(web::Data::new($env.ledger.clone()))
                .app_data(web::Data::new($env.settings.clone()))
                .app_data(web::Data::new($env.programs.clone()))
                .app_data(web::Data::new($env.uploads.clone()))
                .app_data(web::Data::new($env.redemptions.clone()))
                .app_data(web::Data::new($env.stats.clone()))
                .configure(swagger_config)
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::loyalty_config)
                        .configure(handlers::upload_config)
                        .configure(handlers::redemption_config)
                        .configure(handlers::program_config)
                        .configure(handlers::admin_config)
                        .configure(handlers::super_admin_config),
                ),
        )
        .await
    };
}

#[tokio::test]
async fn every_documented_route_is_reachable() {
    let env = setup().await;
    let jwt = jwt();
    let app = app!(env, jwt);

    // Seed a funded customer and a program so the POST below succeeds.
    let alice = customer(1, "Alice");
    let row = env.ledger.find_or_create(&env.db, &alice).await.unwrap();
    env.ledger
        .credit(&env.db, row.id, 100, "seed".to_string(), None)
        .await
        .unwrap();
    let program = env
        .programs
        .create(
            &admin(100),
            &CreateProgramRequest {
                name: "Free hour".to_string(),
                description: String::new(),
                required_points: 50,
                max_redemptions: None,
            },
        )
        .await
        .unwrap();

    let customer_token = jwt
        .generate_access_token(1, "Alice", Role::Customer)
        .unwrap();
    let admin_token = jwt.generate_access_token(100, "Admin", Role::Admin).unwrap();
    let super_token = jwt
        .generate_access_token(999, "Root", Role::SuperAdmin)
        .unwrap();

    let gets = [
        ("/api/v1/customer/loyalty", &customer_token),
        ("/api/v1/customer/transactions", &customer_token),
        ("/api/v1/customer/uploads", &customer_token),
        ("/api/v1/customer/redemptions", &customer_token),
        ("/api/v1/customer/rewards", &customer_token),
        ("/api/v1/admin/uploads/pending", &admin_token),
        ("/api/v1/admin/redemptions/pending", &admin_token),
        ("/api/v1/admin/programs", &admin_token),
        ("/api/v1/admin/settings", &admin_token),
        ("/api/v1/super-admin/stats", &super_token),
        ("/api/v1/super-admin/audit-logs", &super_token),
    ];
    for (uri, token) in gets {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(token))
            .to_request();
        let resp = test::try_call_service(&app, req)
            .await
            .unwrap_or_else(|e| panic!("GET {uri} failed: {e}"));
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/customer/redemptions")
        .insert_header(bearer(&customer_token))
        .set_json(json!({ "program_id": program.id }))
        .to_request();
    let resp = test::try_call_service(&app, req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "POST /customer/redemptions");
}

#[tokio::test]
async fn missing_tokens_are_rejected_but_docs_stay_public() {
    let env = setup().await;
    let jwt = jwt();
    let app = app!(env, jwt);

    let req = test::TestRequest::get()
        .uri("/api/v1/customer/loyalty")
        .to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let resp = test::try_call_service(&app, req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
