use crate::{
    api::error::ApiError,
    model::leave::{Leave, LeaveStatus, LeaveWithEmployee, NewLeave},
    storage::Storage,
    utils::dates::parse_date,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, error, info};
use utoipa::ToSchema;

/// Leave application. A `status` in the body is ignored; new requests are
/// always pending.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date")]
    pub start_date: String,
    #[schema(example = "2026-01-03", format = "date")]
    pub end_date: String,
    #[schema(example = "Sick")]
    pub leave_type: String,
    #[schema(example = "Flu")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    /// One of Pending, Approved, Rejected (case-insensitive)
    #[schema(example = "Approved")]
    pub status: String,
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Leave),
        (status = 400, description = "Bad dates or unknown employee", body = Object,
         example = json!({
            "error": "startDate cannot be after endDate"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    storage: web::Data<dyn Storage>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let employee_id = payload.employee_id;
    let start_date = parse_date("startDate", &payload.start_date)
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to submit leave request"))?;
    let end_date = parse_date("endDate", &payload.end_date)
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to submit leave request"))?;

    if start_date > end_date {
        error!(employee_id, %start_date, %end_date, "Leave request starts after it ends");
        return Err(ApiError::Validation(
            "startDate cannot be after endDate".to_string(),
        ));
    }

    let leave = storage
        .create_leave(NewLeave {
            employee_id,
            start_date,
            end_date,
            leave_type: payload.leave_type,
            reason: payload.reason,
        })
        .await
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to submit leave request"))?;

    info!(leave_id = leave.id, employee_id = leave.employee_id, "Leave request submitted");
    Ok(HttpResponse::Ok().json(leave))
}

/// List leave requests with their employees
#[utoipa::path(
    get,
    path = "/leaves",
    responses(
        (status = 200, description = "All leave requests", body = [LeaveWithEmployee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn list_leaves(storage: web::Data<dyn Storage>) -> Result<HttpResponse, ApiError> {
    let leaves = storage
        .list_leaves()
        .await
        .inspect_err(|e| error!(error = %e, "Failed to fetch leave requests"))?;
    debug!(count = leaves.len(), "Fetched leave requests");
    Ok(HttpResponse::Ok().json(leaves))
}

/// Approve or reject a leave request
#[utoipa::path(
    put,
    path = "/leaves/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request")
    ),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Leave status updated", body = Leave),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "leave not found"
        })),
        (status = 409, description = "Leave request already processed", body = Object,
         example = json!({
            "error": "leave 1 is Approved and cannot become Rejected"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    storage: web::Data<dyn Storage>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();
    let status: LeaveStatus = payload.status.trim().parse().map_err(|_| {
        error!(leave_id, status = %payload.status, "Unknown leave status");
        ApiError::Validation("status must be one of Pending, Approved, Rejected".to_string())
    })?;

    let leave = storage
        .transition_leave_status(leave_id, status)
        .await
        .inspect_err(|e| error!(error = %e, leave_id, "Failed to update leave status"))?;

    info!(leave_id, status = %leave.status, "Leave status updated");
    Ok(HttpResponse::Ok().json(leave))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{capture_logs, init_app};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn employee_request() -> test::TestRequest {
        test::TestRequest::post().uri("/employees").set_json(json!({
            "name": "Asha",
            "department": "Eng",
            "role": "SWE",
            "email": "a@x.com",
            "phone": "555",
            "joiningDate": "2024-01-15"
        }))
    }

    fn leave_body(employee_id: &Value) -> Value {
        json!({
            "employeeId": employee_id,
            "startDate": "2024-03-01",
            "endDate": "2024-03-02",
            "leaveType": "Sick",
            "reason": "Flu"
        })
    }

    #[actix_web::test]
    async fn new_leave_is_always_pending() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;

        let mut body = leave_body(&employee["id"]);
        body["status"] = json!("Approved");
        let req = test::TestRequest::post().uri("/leaves").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let leave: Value = test::read_body_json(resp).await;
        assert_eq!(leave["status"], "Pending");
        assert_eq!(leave["employeeId"], employee["id"]);
        assert_eq!(leave["startDate"], "2024-03-01");
        assert!(leave["id"].as_u64().is_some());
    }

    #[actix_web::test]
    async fn list_embeds_the_stored_employee() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;

        let req = test::TestRequest::post()
            .uri("/leaves")
            .set_json(leave_body(&employee["id"]))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get().uri("/leaves").to_request();
        let leaves: Vec<Value> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0]["id"], created["id"]);
        assert_eq!(leaves[0]["reason"], "Flu");
        assert_eq!(leaves[0]["employee"], employee);
    }

    #[actix_web::test]
    async fn leave_for_unknown_employee_is_a_bad_request() {
        let app = init_app!().await;

        let req = test::TestRequest::post()
            .uri("/leaves")
            .set_json(leave_body(&json!(404)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn start_after_end_is_a_bad_request() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;

        let mut body = leave_body(&employee["id"]);
        body["startDate"] = json!("2024-03-05");
        let req = test::TestRequest::post().uri("/leaves").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn pending_leave_can_be_approved_once() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;
        let req = test::TestRequest::post()
            .uri("/leaves")
            .set_json(leave_body(&employee["id"]))
            .to_request();
        let leave: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/leaves/{}", leave["id"]);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": "approved" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["status"], "Approved");

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": "Rejected" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn rejected_transition_is_logged_with_the_leave_id() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;
        let req = test::TestRequest::post()
            .uri("/leaves")
            .set_json(leave_body(&employee["id"]))
            .to_request();
        let leave: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/leaves/{}", leave["id"]);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": "Rejected" }))
            .to_request();
        test::call_service(&app, req).await;

        let (logs, _guard) = capture_logs();
        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": "Approved" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let logs = logs.contents();
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("Failed to update leave status"), "{logs}");
        assert!(logs.contains(&format!("leave_id={}", leave["id"])), "{logs}");
    }

    #[actix_web::test]
    async fn unknown_status_or_leave_is_rejected() {
        let app = init_app!().await;
        let employee: Value =
            test::call_and_read_body_json(&app, employee_request().to_request()).await;
        let req = test::TestRequest::post()
            .uri("/leaves")
            .set_json(leave_body(&employee["id"]))
            .to_request();
        let leave: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/leaves/{}", leave["id"]))
            .set_json(json!({ "status": "Cancelled" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/leaves/999")
            .set_json(json!({ "status": "Approved" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
