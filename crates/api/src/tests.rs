use std::sync::{Arc, Mutex};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{body::to_bytes, test, web, App};
use chrono::{Duration, Utc};
use serde_json::json;

use streamrich_domain::model::{
    ContentKind, ContentStatus, NewProduct, NewSession, NewUser, PaymentStatus, Reference, Role,
    SessionToken, UserRecord,
};
use streamrich_domain::services::{
    cache::ProductCache,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard},
};
use streamrich_domain::storage::{ContentStore, PaymentStore, ProductStore, SessionStore, UserStore};
use streamrich_gateway::{
    GatewayError, InitializeRequest, InitializedTransaction, PaymentGateway, VerifiedTransaction,
};
use streamrich_storage::SeaOrmStorage;

use crate::handlers::{
    content::{
        delete_content_handler, list_content_handler, moderate_content_handler,
        submit_content_handler, ContentBody, ContentPageBody, ModerateContentRequest,
        SubmitContentRequest,
    },
    payments::{
        initialize_payment_handler, verify_payment_handler, InitializePaymentRequest,
        InitializePaymentResponse, VerifyPaymentResponse,
    },
    sessions::{mint_session_handler, MintSessionRequest, MintSessionResponse},
    users::{update_role_handler, withdraw_handler, UpdateRoleRequest, WithdrawRequest,
        WithdrawResponse,
    },
};
use crate::state::AppState;

struct MockGateway {
    transport_down: bool,
    verify_status: &'static str,
    seen_references: Mutex<Vec<String>>,
}

impl MockGateway {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            transport_down: false,
            verify_status: "success",
            seen_references: Mutex::new(Vec::new()),
        })
    }

    fn failing_payment() -> Arc<Self> {
        Arc::new(Self {
            transport_down: false,
            verify_status: "failed",
            seen_references: Mutex::new(Vec::new()),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            transport_down: true,
            verify_status: "success",
            seen_references: Mutex::new(Vec::new()),
        })
    }

    fn seen_references(&self) -> Vec<String> {
        self.seen_references.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializedTransaction, GatewayError> {
        self.seen_references
            .lock()
            .unwrap()
            .push(request.reference.clone());
        if self.transport_down {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.test/{}", request.reference),
            access_code: "acc_test".into(),
            reference: request.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        if self.transport_down {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(VerifiedTransaction {
            status: self.verify_status.to_owned(),
            reference: reference.to_owned(),
            amount: 0,
            paid_at: None,
            raw: json!({ "status": self.verify_status, "reference": reference }),
        })
    }
}

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::connect("sqlite::memory:")
        .await
        .expect("storage inits")
}

fn telemetry() -> TelemetryGuard {
    let config = TelemetryConfig::from_env("API_TEST");
    init_telemetry(&config).expect("telemetry inits")
}

fn build_state(storage: SeaOrmStorage, gateway: Arc<MockGateway>) -> AppState {
    AppState::new(
        storage,
        gateway,
        Arc::new(ProductCache::default()),
        telemetry(),
        86_400,
    )
}

fn public_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/content", web::get().to(list_content_handler))
        .route("/api/v1/content", web::post().to(submit_content_handler))
        .route(
            "/api/v1/content/{id}",
            web::patch().to(moderate_content_handler),
        )
        .route(
            "/api/v1/content/{id}",
            web::delete().to(delete_content_handler),
        )
        .route(
            "/api/v1/payments/initialize",
            web::post().to(initialize_payment_handler),
        )
        .route(
            "/api/v1/payments/verify",
            web::get().to(verify_payment_handler),
        )
        .route(
            "/api/v1/products",
            web::get().to(crate::handlers::list_products_handler),
        )
        .route(
            "/api/v1/plans",
            web::get().to(crate::handlers::list_plans_handler),
        )
        .route("/api/v1/users/role", web::post().to(update_role_handler))
        .route("/api/v1/user/withdraw", web::post().to(withdraw_handler));
}

async fn seed_user(storage: &SeaOrmStorage, email: &str, role: Role) -> UserRecord {
    storage
        .insert_user(NewUser {
            email: email.into(),
            role,
            display_name: email.split('@').next().unwrap_or("user").to_owned(),
        })
        .await
        .unwrap()
}

async fn session_for(storage: &SeaOrmStorage, user_id: i64) -> String {
    let token = SessionToken::generate().unwrap();
    let now = Utc::now();
    storage
        .insert_session(NewSession {
            fingerprint: token.fingerprint(),
            user_id,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .unwrap();
    token.into_inner()
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed_pending_content(storage: &SeaOrmStorage, creator_id: i64) -> i64 {
    storage
        .insert_content(streamrich_domain::model::NewContent {
            title: "first upload".into(),
            url: "https://youtube.com/watch?v=abc".into(),
            kind: ContentKind::Youtube,
            status: ContentStatus::Pending,
            approved_by: None,
            creator_id,
        })
        .await
        .unwrap()
        .id
}

#[actix_web::test]
async fn content_listing_requires_session() {
    let state = build_state(storage().await, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/content").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_session_is_unauthorized() {
    let storage = storage().await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;
    let token = SessionToken::generate().unwrap();
    let now = Utc::now();
    storage
        .insert_session(NewSession {
            fingerprint: token.fingerprint(),
            user_id: admin.id,
            issued_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
        })
        .await
        .unwrap();

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/content")
            .insert_header(bearer(&token.into_inner()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn moderation_is_denied_for_non_admins_without_mutation() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let content_id = seed_pending_content(&storage, creator.id).await;
    let token = session_for(&storage, creator.id).await;

    let state = build_state(storage.clone(), MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/content/{content_id}"))
            .insert_header(bearer(&token))
            .set_json(&ModerateContentRequest {
                status: ContentStatus::Approved,
                notes: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    let content = storage.find_content(content_id).await.unwrap().unwrap();
    assert_eq!(content.status, ContentStatus::Pending);
    assert!(content.approved_at.is_none());
}

#[actix_web::test]
async fn submission_rejects_unsupported_kind() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let token = session_for(&storage, creator.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/content")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "my podcast",
                "url": "https://pod.test/1",
                "kind": "PODCAST"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn streamers_cannot_submit_content() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let token = session_for(&storage, streamer.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/content")
            .insert_header(bearer(&token))
            .set_json(&SubmitContentRequest {
                title: "clip".into(),
                url: "https://youtube.com/watch?v=clip".into(),
                kind: ContentKind::Youtube,
                status: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approval_stamps_and_rejection_clears_review_fields() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;
    let approved_id = seed_pending_content(&storage, creator.id).await;
    let rejected_id = seed_pending_content(&storage, creator.id).await;
    let token = session_for(&storage, admin.id).await;

    let state = build_state(storage.clone(), MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let approve = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/content/{approved_id}"))
            .insert_header(bearer(&token))
            .set_json(&ModerateContentRequest {
                status: ContentStatus::Approved,
                notes: Some("looks good".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(approve.status(), actix_web::http::StatusCode::OK);
    let body: ContentBody =
        serde_json::from_slice(&to_bytes(approve.into_body()).await.unwrap()).unwrap();
    assert_eq!(body.status, ContentStatus::Approved);
    assert_eq!(body.approved_by, Some(admin.id));
    assert!(body.approved_at.is_some());
    assert_eq!(body.review_notes.as_deref(), Some("looks good"));

    let reject = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/content/{rejected_id}"))
            .insert_header(bearer(&token))
            .set_json(&ModerateContentRequest {
                status: ContentStatus::Rejected,
                notes: Some("off topic".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(reject.status(), actix_web::http::StatusCode::OK);
    let body: ContentBody =
        serde_json::from_slice(&to_bytes(reject.into_body()).await.unwrap()).unwrap();
    assert_eq!(body.status, ContentStatus::Rejected);
    assert!(body.approved_at.is_none());
    assert!(body.approved_by.is_none());

    // Moderation is terminal: a second transition conflicts.
    let again = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/content/{approved_id}"))
            .insert_header(bearer(&token))
            .set_json(&ModerateContentRequest {
                status: ContentStatus::Rejected,
                notes: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), actix_web::http::StatusCode::CONFLICT);
    let content = storage.find_content(approved_id).await.unwrap().unwrap();
    assert_eq!(content.status, ContentStatus::Approved);
}

#[actix_web::test]
async fn moderation_rejects_pending_as_target_status() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;
    let content_id = seed_pending_content(&storage, creator.id).await;
    let token = session_for(&storage, admin.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/content/{content_id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "PENDING" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn content_listing_paginates() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;
    for _ in 0..25 {
        seed_pending_content(&storage, creator.id).await;
    }
    let token = session_for(&storage, admin.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/content?status=PENDING&page=2&limit=10")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let page: ContentPageBody =
        serde_json::from_slice(&to_bytes(resp.into_body()).await.unwrap()).unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.limit, 10);
    assert!(page.items.iter().all(|item| item.creator.is_some()));
}

#[actix_web::test]
async fn initialize_writes_pending_payment_and_returns_redirect() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let product = storage
        .insert_product(NewProduct {
            name: "sticker pack".into(),
            price: 500,
            in_stock: true,
        })
        .await
        .unwrap();
    let token = session_for(&storage, streamer.id).await;

    let gateway = MockGateway::succeeding();
    let state = build_state(storage.clone(), gateway.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest {
                product_id: product.id,
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: InitializePaymentResponse =
        serde_json::from_slice(&to_bytes(resp.into_body()).await.unwrap()).unwrap();
    assert!(body.authorization_url.starts_with("https://checkout.test/"));

    let reference = Reference::parse(&body.reference).unwrap();
    let payment = storage.find_payment(&reference).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    // Amount comes from the product row, never from the request body.
    assert_eq!(payment.amount, 500);
    assert_eq!(payment.user_id, streamer.id);
}

#[actix_web::test]
async fn initialize_leaves_no_rows_when_gateway_is_down() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let product = storage
        .insert_product(NewProduct {
            name: "sticker pack".into(),
            price: 500,
            in_stock: true,
        })
        .await
        .unwrap();
    let token = session_for(&storage, streamer.id).await;

    let gateway = MockGateway::unreachable();
    let state = build_state(storage.clone(), gateway.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest {
                product_id: product.id,
            })
            .to_request(),
    )
    .await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    );

    let seen = gateway.seen_references();
    assert_eq!(seen.len(), 1);
    let reference = Reference::parse(&seen[0]).unwrap();
    assert!(storage.find_payment(&reference).await.unwrap().is_none());
}

#[actix_web::test]
async fn initialize_validates_product_state() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let retired = storage
        .insert_product(NewProduct {
            name: "retired tee".into(),
            price: 2_000,
            in_stock: false,
        })
        .await
        .unwrap();
    let token = session_for(&storage, streamer.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let out_of_stock = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest {
                product_id: retired.id,
            })
            .to_request(),
    )
    .await;
    assert_eq!(out_of_stock.status(), actix_web::http::StatusCode::BAD_REQUEST);

    let missing = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest { product_id: 404 })
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verify_finalizes_once_and_replays_idempotently() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let product = storage
        .insert_product(NewProduct {
            name: "sticker pack".into(),
            price: 500,
            in_stock: true,
        })
        .await
        .unwrap();
    let token = session_for(&storage, streamer.id).await;

    let gateway = MockGateway::succeeding();
    let state = build_state(storage.clone(), gateway.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let init = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest {
                product_id: product.id,
            })
            .to_request(),
    )
    .await;
    let init_body: InitializePaymentResponse =
        serde_json::from_slice(&to_bytes(init.into_body()).await.unwrap()).unwrap();

    let verify_uri = format!("/api/v1/payments/verify?reference={}", init_body.reference);
    let first = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&verify_uri)
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), actix_web::http::StatusCode::OK);
    let first_body: VerifyPaymentResponse =
        serde_json::from_slice(&to_bytes(first.into_body()).await.unwrap()).unwrap();
    assert_eq!(first_body.status, PaymentStatus::Completed);
    assert!(first_body.paid_at.is_some());

    let reference = Reference::parse(&init_body.reference).unwrap();
    let payment = storage.find_payment(&reference).await.unwrap().unwrap();
    assert!(storage
        .find_purchase_by_payment(payment.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        storage
            .find_product(product.id)
            .await
            .unwrap()
            .unwrap()
            .purchase_count,
        1
    );

    // Replay: same report, no second purchase, no second counter bump.
    let second = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&verify_uri)
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), actix_web::http::StatusCode::OK);
    let second_body: VerifyPaymentResponse =
        serde_json::from_slice(&to_bytes(second.into_body()).await.unwrap()).unwrap();
    assert_eq!(second_body.status, PaymentStatus::Completed);
    assert_eq!(
        storage
            .find_product(product.id)
            .await
            .unwrap()
            .unwrap()
            .purchase_count,
        1
    );
}

#[actix_web::test]
async fn verify_of_unknown_reference_is_not_found() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let token = session_for(&storage, streamer.id).await;

    let state = build_state(storage, MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/payments/verify?reference=STRM-1700000000000-1")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn verify_records_failed_payment_without_purchase() {
    let storage = storage().await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let product = storage
        .insert_product(NewProduct {
            name: "sticker pack".into(),
            price: 500,
            in_stock: true,
        })
        .await
        .unwrap();
    let token = session_for(&storage, streamer.id).await;

    let gateway = MockGateway::failing_payment();
    let state = build_state(storage.clone(), gateway);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let init = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments/initialize")
            .insert_header(bearer(&token))
            .set_json(&InitializePaymentRequest {
                product_id: product.id,
            })
            .to_request(),
    )
    .await;
    let init_body: InitializePaymentResponse =
        serde_json::from_slice(&to_bytes(init.into_body()).await.unwrap()).unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/payments/verify?reference={}",
                init_body.reference
            ))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: VerifyPaymentResponse =
        serde_json::from_slice(&to_bytes(resp.into_body()).await.unwrap()).unwrap();
    assert_eq!(body.status, PaymentStatus::Failed);
    assert!(body.paid_at.is_none());

    let reference = Reference::parse(&init_body.reference).unwrap();
    let payment = storage.find_payment(&reference).await.unwrap().unwrap();
    assert!(storage
        .find_purchase_by_payment(payment.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        storage
            .find_product(product.id)
            .await
            .unwrap()
            .unwrap()
            .purchase_count,
        0
    );
}

#[actix_web::test]
async fn product_listing_is_served_from_cache() {
    let storage = storage().await;
    storage
        .insert_product(NewProduct {
            name: "poster".into(),
            price: 1_500,
            in_stock: true,
        })
        .await
        .unwrap();

    let state = build_state(storage.clone(), MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let first = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/products").to_request(),
    )
    .await;
    assert_eq!(first.status(), actix_web::http::StatusCode::OK);
    let listing: Vec<serde_json::Value> =
        serde_json::from_slice(&to_bytes(first.into_body()).await.unwrap()).unwrap();
    assert_eq!(listing.len(), 1);

    // A product added behind the cache's back stays invisible until the TTL
    // or an invalidation drops the entry.
    storage
        .insert_product(NewProduct {
            name: "mug".into(),
            price: 900,
            in_stock: true,
        })
        .await
        .unwrap();
    let second = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/products").to_request(),
    )
    .await;
    let cached: Vec<serde_json::Value> =
        serde_json::from_slice(&to_bytes(second.into_body()).await.unwrap()).unwrap();
    assert_eq!(cached.len(), 1);
}

#[actix_web::test]
async fn role_updates_are_admin_only() {
    let storage = storage().await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    let admin_token = session_for(&storage, admin.id).await;
    let streamer_token = session_for(&storage, streamer.id).await;

    let state = build_state(storage.clone(), MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let denied = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/role")
            .insert_header(bearer(&streamer_token))
            .set_json(&UpdateRoleRequest {
                user_id: streamer.id,
                role: Role::Admin,
            })
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), actix_web::http::StatusCode::FORBIDDEN);

    let promoted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/role")
            .insert_header(bearer(&admin_token))
            .set_json(&UpdateRoleRequest {
                user_id: streamer.id,
                role: Role::Creator,
            })
            .to_request(),
    )
    .await;
    assert_eq!(promoted.status(), actix_web::http::StatusCode::OK);
    let user = storage.find_user(streamer.id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Creator);

    let missing = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/role")
            .insert_header(bearer(&admin_token))
            .set_json(&UpdateRoleRequest {
                user_id: 404,
                role: Role::Creator,
            })
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn withdrawals_enforce_role_and_balance() {
    let storage = storage().await;
    let creator = seed_user(&storage, "creator@test.dev", Role::Creator).await;
    let streamer = seed_user(&storage, "viewer@test.dev", Role::Streamer).await;
    storage.credit_balance(creator.id, 1_000).await.unwrap();
    let creator_token = session_for(&storage, creator.id).await;
    let streamer_token = session_for(&storage, streamer.id).await;

    let state = build_state(storage.clone(), MockGateway::succeeding());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    let denied = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/withdraw")
            .insert_header(bearer(&streamer_token))
            .set_json(&WithdrawRequest { amount: 100 })
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), actix_web::http::StatusCode::FORBIDDEN);

    let accepted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/withdraw")
            .insert_header(bearer(&creator_token))
            .set_json(&WithdrawRequest { amount: 400 })
            .to_request(),
    )
    .await;
    assert_eq!(accepted.status(), actix_web::http::StatusCode::OK);
    let body: WithdrawResponse =
        serde_json::from_slice(&to_bytes(accepted.into_body()).await.unwrap()).unwrap();
    assert_eq!(body.remaining_balance, 600);
    assert_eq!(body.amount, 400);

    let overdraw = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/withdraw")
            .insert_header(bearer(&creator_token))
            .set_json(&WithdrawRequest { amount: 5_000 })
            .to_request(),
    )
    .await;
    assert_eq!(overdraw.status(), actix_web::http::StatusCode::BAD_REQUEST);

    let non_positive = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/withdraw")
            .insert_header(bearer(&creator_token))
            .set_json(&WithdrawRequest { amount: 0 })
            .to_request(),
    )
    .await;
    assert_eq!(non_positive.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn minted_session_token_authenticates_public_requests() {
    let storage = storage().await;
    let admin = seed_user(&storage, "admin@test.dev", Role::Admin).await;

    let state = build_state(storage, MockGateway::succeeding());
    let internal_app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/internal/v1/sessions", web::post().to(mint_session_handler)),
    )
    .await;
    let public_app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(public_routes),
    )
    .await;

    // Session minting is not reachable through the public route table.
    let not_public = test::call_service(
        &public_app,
        test::TestRequest::post()
            .uri("/internal/v1/sessions")
            .set_json(&MintSessionRequest {
                user_id: admin.id,
                ttl_secs: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(not_public.status(), actix_web::http::StatusCode::NOT_FOUND);

    let minted = test::call_service(
        &internal_app,
        test::TestRequest::post()
            .uri("/internal/v1/sessions")
            .set_json(&MintSessionRequest {
                user_id: admin.id,
                ttl_secs: Some(600),
            })
            .to_request(),
    )
    .await;
    assert_eq!(minted.status(), actix_web::http::StatusCode::CREATED);
    let body: MintSessionResponse =
        serde_json::from_slice(&to_bytes(minted.into_body()).await.unwrap()).unwrap();

    let listing = test::call_service(
        &public_app,
        test::TestRequest::get()
            .uri("/api/v1/content")
            .insert_header(bearer(&body.token))
            .to_request(),
    )
    .await;
    assert_eq!(listing.status(), actix_web::http::StatusCode::OK);

    let unknown_user = test::call_service(
        &internal_app,
        test::TestRequest::post()
            .uri("/internal/v1/sessions")
            .set_json(&MintSessionRequest {
                user_id: 404,
                ttl_secs: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(unknown_user.status(), actix_web::http::StatusCode::NOT_FOUND);
}
