use crate::{
    api::error::ApiError,
    auth::{
        jwt::TokenIssuer,
        password::{hash_password, verify_password},
    },
    model::user::{NewUser, User},
    storage::{Storage, StoreError},
};
use actix_web::{HttpResponse, web};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

const INVALID_CREDENTIALS: &str = "Invalid Credentials";
const USER_EXISTS: &str = "User already exists";

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Asha")]
    pub name: String,
    #[schema(example = "a@x.com", format = "email")]
    pub email: String,
    #[schema(example = "s3cret", format = "password")]
    pub password: String,
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "a@x.com", format = "email")]
    pub email: String,
    #[schema(example = "s3cret", format = "password")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub data: User,
}

#[derive(Serialize, ToSchema)]
pub struct LoginData {
    pub token: String,
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub data: LoginData,
}

fn register_rejected(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "message": message
    }))
}

/// Same body for unknown email and wrong password.
fn invalid_credentials() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": INVALID_CREDENTIALS }))
}

/// User registration
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Email already registered", body = Object, example = json!({
            "success": false,
            "message": "User already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_register",
    skip(storage, payload),
    fields(email = %payload.email)
)]
pub async fn register(
    storage: web::Data<dyn Storage>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");
    let payload = payload.into_inner();
    let email = payload.email.trim().to_string();

    if email.is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Ok(register_rejected("Email and password must not be empty"));
    }

    debug!("Hashing password");
    let password = payload.password;
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            ApiError::Internal(anyhow!("password hashing task failed: {e}"))
        })?
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::Internal(anyhow!("password hashing failed: {e}"))
        })?;

    let result = storage
        .create_user(NewUser {
            name: payload.name,
            email,
            password_hash,
            role: payload.role,
        })
        .await;

    match result {
        Ok(user) => {
            info!(user_id = user.id, "User registered");
            Ok(HttpResponse::Ok().json(RegisterResponse {
                success: true,
                data: user,
            }))
        }
        Err(StoreError::Conflict(_)) => {
            info!("Registration rejected: email already registered");
            Ok(register_rejected(USER_EXISTS))
        }
        Err(e) => {
            error!(error = %e, "Failed to register user");
            Err(e.into())
        }
    }
}

/// User login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed one-hour bearer token", body = LoginResponse),
        (status = 400, description = "Unknown email or wrong password", body = Object,
         example = json!({
            "error": "Invalid Credentials"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(storage, issuer, payload),
    fields(email = %payload.email)
)]
pub async fn login(
    storage: web::Data<dyn Storage>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");
    let payload = payload.into_inner();

    debug!("Fetching user");
    let user = match storage
        .find_user_by_email(payload.email.trim())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to fetch user"))?
    {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Ok(invalid_credentials());
        }
    };

    debug!(user_id = user.id, "Verifying password");
    let password = payload.password;
    let stored_hash = user.password.clone();
    let verified = web::block(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "Password verification task failed");
            ApiError::Internal(anyhow!("password verification task failed: {e}"))
        })?;

    if let Err(e) = verified {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Ok(invalid_credentials());
    }

    let token = issuer.issue(user.id, &user.role).map_err(|e| {
        error!(error = %e, "Failed to sign token");
        ApiError::Internal(e.into())
    })?;

    info!(user_id = user.id, "Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        data: LoginData {
            token,
            role: user.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::auth::jwt::TokenIssuer;
    use crate::test_support::{TEST_SECRET, init_app};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn registration() -> Value {
        json!({
            "name": "Asha",
            "email": "a@x.com",
            "password": "s3cret",
            "role": "hr"
        })
    }

    #[actix_web::test]
    async fn register_then_login_issues_token_for_that_user() {
        let app = init_app!().await;

        let req = test::TestRequest::post().uri("/register").set_json(registration()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let registered: Value = test::read_body_json(resp).await;
        assert_eq!(registered["success"], true);
        assert_eq!(registered["data"]["email"], "a@x.com");
        assert!(registered["data"].get("password").is_none());
        let user_id = registered["data"]["id"].as_u64().unwrap();

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "s3cret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["role"], "hr");

        let token = body["data"]["token"].as_str().unwrap();
        let claims = TokenIssuer::new(TEST_SECRET, 3600).verify(token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, "hr");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[actix_web::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let app = init_app!().await;

        let req = test::TestRequest::post().uri("/register").set_json(registration()).to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "nope" }))
            .to_request();
        let wrong_password = test::call_service(&app, req).await;
        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        let wrong_password: Value = test::read_body_json(wrong_password).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "ghost@x.com", "password": "s3cret" }))
            .to_request();
        let unknown_email = test::call_service(&app, req).await;
        assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
        let unknown_email: Value = test::read_body_json(unknown_email).await;

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, json!({ "error": "Invalid Credentials" }));
    }

    #[actix_web::test]
    async fn duplicate_registration_is_rejected_and_first_user_survives() {
        let app = init_app!().await;

        let req = test::TestRequest::post().uri("/register").set_json(registration()).to_request();
        let first: Value = test::call_and_read_body_json(&app, req).await;

        let mut again = registration();
        again["password"] = json!("different");
        let req = test::TestRequest::post().uri("/register").set_json(again).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": false, "message": "User already exists" }));

        // the original password still works, the second one never landed
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "s3cret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "different" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let token = {
            let req = test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "a@x.com", "password": "s3cret" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            body["data"]["token"].as_str().unwrap().to_string()
        };
        let claims = TokenIssuer::new(TEST_SECRET, 3600).verify(&token).unwrap();
        assert_eq!(claims.user_id, first["data"]["id"].as_u64().unwrap());
    }

    #[actix_web::test]
    async fn empty_password_is_rejected() {
        let app = init_app!().await;

        let mut body = registration();
        body["password"] = json!("");
        let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn email_is_stored_trimmed() {
        let app = init_app!().await;

        let mut padded = registration();
        padded["email"] = json!("  a@x.com ");
        let req = test::TestRequest::post().uri("/register").set_json(padded).to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(registered["data"]["email"], "a@x.com");

        let req = test::TestRequest::post().uri("/register").set_json(registration()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User already exists");

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com ", "password": "s3cret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
