use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use hrms::database::models::Role;

#[macro_use]
mod common;

use common::{TestContext, bearer};

#[actix_web::test]
async fn test_request_lifecycle_over_http() {
    let mut ctx = TestContext::new().await.unwrap();
    let (manager, employee) = ctx.team().await.unwrap();
    let employee_token = ctx.token_for(&employee);
    let manager_token = ctx.token_for(&manager);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "requestType": "LEAVE",
            "startDate": "2025-03-10",
            "endDate": "2025-03-11",
            "reason": "Moving house"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["processorId"], manager.id.to_string());
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/requests/assigned?status=PENDING")
        .insert_header(bearer(&manager_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // the employee cannot approve their own request
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/requests/{}/approve", request_id))
        .insert_header(bearer(&employee_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Forbidden");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/requests/{}/approve", request_id))
        .insert_header(bearer(&manager_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "APPROVED");
    assert_eq!(body["message"], "Request approved");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/requests/{}/approve", request_id))
        .insert_header(bearer(&manager_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "InvalidState");

    assert_eq!(ctx.drain_events().await, 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications/unread-count")
        .insert_header(bearer(&employee_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["unread"], 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/read-all")
        .insert_header(bearer(&employee_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["updated"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/timesheets?from=2025-03-10&to=2025-03-11")
        .insert_header(bearer(&employee_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["morningStatus"], "LEAVE");
}

#[actix_web::test]
async fn test_malformed_input_uses_error_envelope() {
    let ctx = TestContext::new().await.unwrap();
    let (_, employee) = ctx.team().await.unwrap();
    let token = ctx.token_for(&employee);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/requests")
        .insert_header(bearer(&token))
        .set_json(json!({ "requestType": "HOLIDAY", "startDate": "2025-03-10" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BadRequest");

    let req = test::TestRequest::get()
        .uri("/api/v1/requests/not-a-uuid")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/requests/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_correlation_id_is_echoed() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();
    let token = ctx.token_for(&user);
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&token))
        .insert_header(("X-Correlation-ID", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("x-correlation-id").unwrap(), "trace-42");
}

#[actix_web::test]
async fn test_user_administration_requires_hr_or_admin() {
    let ctx = TestContext::new().await.unwrap();
    let employee = ctx.create_user(Role::Employee).await.unwrap();
    let hr = ctx.create_user(Role::Hr).await.unwrap();
    let employee_token = ctx.token_for(&employee);
    let hr_token = ctx.token_for(&hr);
    let app = init_app!(ctx);

    let payload = json!({
        "email": "new.hire@example.com",
        "fullName": "New Hire",
        "role": "EMPLOYEE"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&employee_token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&hr_token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let temporary = body["data"]["temporaryPassword"].as_str().unwrap();
    assert_eq!(temporary.len(), 12);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&hr_token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer(&employee_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}/profile", employee.id))
        .insert_header(bearer(&employee_token))
        .set_json(json!({ "phone": "+1 555 0100" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["phone"], "+1 555 0100");
    assert_eq!(body["data"]["fullName"], employee.full_name);
}

#[actix_web::test]
async fn test_department_management() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await.unwrap();
    let manager = ctx.create_user(Role::Manager).await.unwrap();
    let employee = ctx.create_user(Role::Employee).await.unwrap();
    let token = ctx.token_for(&admin);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/departments")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Engineering" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let department_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/departments/{}/manager", department_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "managerId": employee.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/departments/{}/manager", department_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "managerId": manager.id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["managerId"], manager.id.to_string());

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}/department", employee.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "departmentId": department_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/departments/{}/members", department_id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], employee.id.to_string());
}

#[actix_web::test]
async fn test_file_upload_and_download() {
    let ctx = TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Employee).await.unwrap();
    let stranger = ctx.create_user(Role::Employee).await.unwrap();
    let hr = ctx.create_user(Role::Hr).await.unwrap();
    let owner_token = ctx.token_for(&owner);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/files?filename=../note.txt")
        .insert_header(bearer(&owner_token))
        .insert_header(("Content-Type", "text/plain"))
        .set_payload("doctor's note")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["originalName"], "note.txt");
    assert!(body["data"].get("storageKey").is_none());
    let file_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/files/{}", file_id))
        .insert_header(bearer(&ctx.token_for(&stranger)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/files/{}", file_id))
        .insert_header(bearer(&ctx.token_for(&hr)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/plain");
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes, "doctor's note");

    // larger than the configured limit
    let req = test::TestRequest::post()
        .uri("/api/v1/files?filename=big.bin")
        .insert_header(bearer(&owner_token))
        .set_payload(vec![0u8; 4096])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn test_notification_stream_registers_connection() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();
    let token = ctx.token_for(&user);
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications/stream")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert!(ctx.state.connections.is_connected(user.id));

    drop(resp);
    assert!(!ctx.state.connections.is_connected(user.id));
}

#[actix_web::test]
async fn test_finalize_requires_hr_or_admin() {
    let ctx = TestContext::new().await.unwrap();
    let (manager, employee) = ctx.team().await.unwrap();
    let hr = ctx.create_user(Role::Hr).await.unwrap();
    let app = init_app!(ctx);

    let uri = format!("/api/v1/timesheets/{}/2025-03-10/finalize", employee.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&ctx.token_for(&manager)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&ctx.token_for(&hr)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["finalized"], true);
    assert_eq!(body["data"]["workDate"], "2025-03-10");
}
