use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use sakip::api::{self, AppState};
use sakip::config::{Config, Limit};
use sakip::core::indicator::IndicatorLogic;
use sakip::core::instansi::InstansiLogic;
use sakip::core::rbac::RbacLogic;
use sakip::core::target::TargetLogic;
use sakip::core::users::{UserInput, UserLogic};
use sakip::db::initialize::init_db;
use sakip::db::pool::DbPool;
use sakip::models::indicator::IndicatorInput;
use sakip::models::instansi::InstansiInput;
use sakip::models::target::TargetInput;
use serde_json::{Value, json};
use std::env;
use std::fs;

const PASSWORD: &str = "rahasia-123";

struct Fixture {
    state: web::Data<AppState>,
    admin: String,
    collector: String,
    viewer: String,
}

fn user(pool: &DbPool, email: &str, instansi_id: Option<i64>, role: Option<&str>) -> String {
    let u = UserLogic::create(
        &pool.conn,
        UserInput {
            name: Some(email.split('@').next().unwrap_or("user").to_string()),
            email: Some(email.to_string()),
            password: Some(PASSWORD.to_string()),
            instansi_id,
        },
    )
    .unwrap();
    if let Some(role) = role {
        RbacLogic::assign_role(&pool.conn, u.id, role).unwrap();
    }
    UserLogic::login(&pool.conn, email, PASSWORD, "test").unwrap().0
}

/// Two institutions, an indicator of the first with an approved 2025
/// target, and three users: superadmin, collector of instansi #1 and a
/// user without any permission.
fn fixture(name: &str, tweak: impl FnOnce(&mut Config)) -> Fixture {
    let dir = env::temp_dir().join(format!("{name}_sakip_api"));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).unwrap();

    let mut cfg = Config::with_database(":memory:".into());
    cfg.upload_dir = dir.join("uploads").to_string_lossy().to_string();
    cfg.report_dir = dir.join("reports").to_string_lossy().to_string();
    tweak(&mut cfg);

    let pool = DbPool::in_memory().unwrap();
    init_db(&pool.conn).unwrap();
    RbacLogic::seed(&pool.conn).unwrap();

    for (kode, nama) in [("DINKES", "Dinas Kesehatan"), ("DINSOS", "Dinas Sosial")] {
        InstansiLogic::create(
            &pool.conn,
            InstansiInput {
                kode_instansi: Some(kode.into()),
                nama_instansi: Some(nama.into()),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let ind = IndicatorLogic::create(
        &pool.conn,
        IndicatorInput {
            instansi_id: Some(1),
            code: Some("IKU-01".into()),
            name: Some("Cakupan imunisasi".into()),
            measurement_unit: Some("persen".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let target = TargetLogic::create(
        &pool.conn,
        TargetInput {
            indicator_id: Some(ind.id),
            year: Some(2025),
            target_value: Some(100.0),
            ..Default::default()
        },
    )
    .unwrap();
    TargetLogic::approve(&pool.conn, target.id).unwrap();

    let admin = user(&pool, "admin@pemda.go.id", None, Some("superadmin"));
    let collector = user(&pool, "operator@dinkes.go.id", Some(1), Some("data_collector"));
    let viewer = user(&pool, "tamu@pemda.go.id", None, None);

    Fixture {
        state: web::Data::new(AppState::new(pool, cfg)),
        admin,
        collector,
        viewer,
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(api::json_config())
                .wrap(api::default_headers($state.config.environment))
                .configure(api::routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn health_is_public_and_carries_security_headers() {
    let f = fixture("health", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "SAMEORIGIN");
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert!(headers.contains_key("Content-Security-Policy"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[actix_web::test]
async fn missing_token_and_missing_permission() {
    let f = fixture("auth_guard", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::get().uri("/api/v1/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/instansi")
        .insert_header(bearer("not-a-real-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/instansi")
        .insert_header(bearer(&f.viewer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Unauthorized: missing permission sakip.dashboard.view"
    );
}

#[actix_web::test]
async fn login_and_logout() {
    let f = fixture("login", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "operator@dinkes.go.id", "password": "salah-sekali" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "operator@dinkes.go.id", "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["token_type"], "Bearer");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/user")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["email"], "operator@dinkes.go.id");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/user")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn instansi_crud_is_sanitised_and_guarded() {
    let f = fixture("instansi_api", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/instansi")
        .insert_header(bearer(&f.admin))
        .set_json(json!({
            "kode_instansi": "KOMINFO",
            "nama_instansi": "Dinas Kominfo<iframe src=x></iframe>"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["nama_instansi"], "Dinas Kominfo");
    assert_eq!(body["data"]["status"], "aktif");

    // same code again
    let req = test::TestRequest::post()
        .uri("/api/v1/instansi")
        .insert_header(bearer(&f.admin))
        .set_json(json!({ "kode_instansi": "KOMINFO", "nama_instansi": "Lagi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    // collectors read but never write master data
    let req = test::TestRequest::post()
        .uri("/api/v1/instansi")
        .insert_header(bearer(&f.collector))
        .set_json(json!({ "kode_instansi": "X", "nama_instansi": "X" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // DINKES still owns an indicator
    let req = test::TestRequest::delete()
        .uri("/api/v1/instansi/1")
        .insert_header(bearer(&f.admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/instansi/99")
        .insert_header(bearer(&f.admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/instansi")
        .insert_header(bearer(&f.admin))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn collector_workflow_is_scoped_to_own_instansi() {
    let f = fixture("collector_api", |_| {});
    let app = app!(f.state);

    // instansi_id 2 is overridden by the collector's own instansi
    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.collector))
        .set_json(json!({
            "indicator_id": 1,
            "instansi_id": 2,
            "period": "2025-04",
            "actual_value": 92.5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["instansi_id"], 1);
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/performance-data/{id}/submit"))
        .insert_header(bearer(&f.collector))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "submitted");

    // validation belongs to assessors
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/performance-data/{id}/validate"))
        .insert_header(bearer(&f.collector))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/performance-data/{id}/reject"))
        .insert_header(bearer(&f.admin))
        .set_json(json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/performance-data/{id}/validate"))
        .insert_header(bearer(&f.admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "validated");

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard?year=2025")
        .insert_header(bearer(&f.collector))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["instansi_id"], 1);
    assert_eq!(body["data"]["overall_achievement"], 92.5);
}

#[actix_web::test]
async fn evidence_upload_checks_the_file() {
    let f = fixture("upload_api", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.collector))
        .set_json(json!({ "indicator_id": 1, "period": "2025-05", "actual_value": 70 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let multipart = |file_name: &str, content: &[u8]| {
        let mut body = Vec::new();
        body.extend_from_slice(
            b"--BOUNDARY\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nLaporan bulanan\r\n",
        );
        body.extend_from_slice(
            format!(
                "--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");
        test::TestRequest::post()
            .uri(&format!("/api/v1/performance-data/{id}/evidence"))
            .insert_header(bearer(&f.collector))
            .insert_header(("Content-Type", "multipart/form-data; boundary=BOUNDARY"))
            .set_payload(body)
            .to_request()
    };

    let resp = test::call_service(&app, multipart("bukti.pdf", b"%PDF-1.7\n%%EOF")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["file_type"], "application/pdf");
    assert_eq!(body["data"]["description"], "Laporan bulanan");

    let resp = test::call_service(&app, multipart("shell.php", b"<?php echo 1;")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/performance-data/{id}/evidence"))
        .insert_header(bearer(&f.collector))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn api_limit_answers_429_with_retry_after() {
    let f = fixture("rate_api", |cfg| {
        cfg.rate_limits.api = Limit {
            max: 2,
            per_seconds: 60,
        }
    });
    let app = app!(f.state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/user")
            .insert_header(bearer(&f.admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/user")
        .insert_header(bearer(&f.admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("Retry-After"));
}

#[actix_web::test]
async fn rows_of_another_instansi_look_missing_to_a_collector() {
    let f = fixture("foreign_api", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/performance-indicators")
        .insert_header(bearer(&f.admin))
        .set_json(json!({
            "instansi_id": 2,
            "code": "IKU-02",
            "name": "Penerima bantuan sosial",
            "measurement_unit": "orang"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let indicator = body["data"]["id"].as_i64().unwrap();

    // indicator #1 belongs to DINKES
    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.admin))
        .set_json(json!({ "indicator_id": 1, "instansi_id": 2, "period": "2025-06", "actual_value": 10 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    // the collector is pinned to DINKES, which does not own IKU-02
    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.collector))
        .set_json(json!({ "indicator_id": indicator, "period": "2025-06", "actual_value": 10 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.admin))
        .set_json(json!({ "indicator_id": indicator, "period": "2025-06", "actual_value": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["instansi_id"], 2);
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/performance-data/{id}");

    let requests = vec![
        test::TestRequest::get().uri(&uri),
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "actual_value": 99 })),
        test::TestRequest::post().uri(&format!("{uri}/submit")),
        test::TestRequest::get().uri(&format!("{uri}/evidence")),
        test::TestRequest::get().uri(&format!("{uri}/quality")),
        test::TestRequest::post()
            .uri(&format!("{uri}/evidence"))
            .insert_header(("Content-Type", "multipart/form-data; boundary=BOUNDARY"))
            .set_payload(
                &b"--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n\r\n%PDF-1.7\n%%EOF\r\n--BOUNDARY--\r\n"[..],
            ),
        test::TestRequest::delete().uri(&uri),
    ];
    for req in requests {
        let req = req.insert_header(bearer(&f.collector)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // the row is untouched
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&f.admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["actual_value"], 10.0);
}

#[actix_web::test]
async fn quality_report_flags_percentages_over_100() {
    let f = fixture("quality_api", |_| {});
    let app = app!(f.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/performance-data")
        .insert_header(bearer(&f.collector))
        .set_json(json!({ "indicator_id": 1, "period": "2025-07", "actual_value": 160 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/performance-data/{id}/quality"))
        .insert_header(bearer(&f.collector))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let codes: Vec<_> = body["data"]["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["code"].as_str().unwrap().to_string())
        .collect();
    assert!(codes.contains(&"implausible_achievement".to_string()), "{codes:?}");
    assert!(codes.contains(&"percentage_out_of_range".to_string()), "{codes:?}");
    assert_eq!(body["data"]["severity"], "critical");
    assert_eq!(body["data"]["achievement_percentage"], 160.0);
}
