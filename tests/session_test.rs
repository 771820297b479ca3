mod support;

use agms_client::error::AuthError;
use agms_client::infrastructure::{MemoryTokenStorage, Method, TokenStorage};
use agms_client::models::Role;
use agms_client::services::{LoginForm, ProfileLoader, ProfileSource, SessionState, SessionStore};
use agms_client::{AgmsClient, AppError};
use serde_json::json;
use support::{token_for, FakeBackend};
use tokio_test::assert_ok;

#[tokio::test]
async fn invalid_form_never_reaches_the_backend() {
    let client = AgmsClient::new(FakeBackend::new());
    let mut session = SessionStore::new(MemoryTokenStorage::new());

    let err = session
        .login(&client, &LoginForm::new("not-an-email", "short"))
        .await
        .unwrap_err();

    match err {
        AppError::Validation(fields) => {
            let names: Vec<_> = fields.iter().map(|f| f.field).collect();
            assert!(names.contains(&"email"));
            assert!(names.contains(&"password"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(client.backend().calls().is_empty());
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn login_stores_token_and_attaches_bearer() {
    let token = token_for("ROLE_ADVISOR", 12);
    let backend = FakeBackend::new()
        .json(Method::Post, "/api/auth/login", 200, json!({ "token": token }))
        .json(Method::Get, "/api/users/profile", 200, json!({ "name": "Dr. Kaya" }));
    let client = AgmsClient::new(backend);
    let mut session = SessionStore::new(MemoryTokenStorage::new());

    let claims = session
        .login(&client, &LoginForm::new("kaya@iyte.edu.tr", "Secret#2025"))
        .await
        .unwrap();

    assert_eq!(claims.role(), Some(Role::Advisor));
    assert!(session.is_authenticated());
    assert_eq!(session.storage().peek().as_deref(), Some(token.as_str()));

    let login_call = &client.backend().calls_to(Method::Post, "/api/auth/login")[0];
    assert_eq!(login_call.bearer, None);
    assert_eq!(login_call.json.as_ref().unwrap()["email"], "kaya@iyte.edu.tr");

    client.user_profile().await.unwrap();
    let profile_call = &client.backend().calls_to(Method::Get, "/api/users/profile")[0];
    assert_eq!(profile_call.bearer.as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn rejected_credentials_leave_session_anonymous() {
    let backend = FakeBackend::new().json(
        Method::Post,
        "/api/auth/login",
        401,
        json!({ "message": "Bad credentials" }),
    );
    let client = AgmsClient::new(backend);
    let mut session = SessionStore::new(MemoryTokenStorage::new());

    let err = session
        .login(&client, &LoginForm::new("kaya@iyte.edu.tr", "Secret#2025"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::LoginRejected { .. })));
    assert!(!session.is_authenticated());
    assert_eq!(session.storage().peek(), None);
}

#[tokio::test]
async fn logout_clears_local_state_even_when_backend_fails() {
    let backend = FakeBackend::new().unreachable(Method::Post, "/api/auth/logout");
    let client = AgmsClient::new(backend);
    let mut session = SessionStore::new(MemoryTokenStorage::with_token(token_for("ROLE_STUDENT", 3)));
    let state = assert_ok!(session.initialize());
    assert_eq!(state, SessionState::Authenticated);
    session.attach(&client);

    session.logout(&client).await.unwrap();

    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.storage().load().unwrap(), None);
    assert!(!client.has_token());
    assert_eq!(client.backend().calls_to(Method::Post, "/api/auth/logout").len(), 1);
}

#[tokio::test]
async fn profile_falls_back_to_session_user_on_401() {
    let backend = FakeBackend::new().status(Method::Get, "/api/users/profile", 401);
    let client = AgmsClient::new(backend);
    let mut session = SessionStore::new(MemoryTokenStorage::with_token(token_for("ROLE_DEPARTMENT_SECRETARY", 5)));
    session.initialize().unwrap();
    session.attach(&client);

    let load = ProfileLoader::load(&client, session.claims().unwrap()).await;

    assert_eq!(load.source, ProfileSource::Fallback);
    assert_eq!(load.profile.email(), Some("user5@std.iyte.edu.tr"));
    assert_eq!(load.profile.role(), Some(Role::DepartmentSecretary));
}

#[tokio::test]
async fn student_profile_comes_from_the_student_endpoint() {
    let backend = FakeBackend::new().json(
        Method::Get,
        "/api/students/profile",
        200,
        json!({ "studentNumber": "290201001", "firstName": "Ece", "lastName": "Yilmaz" }),
    );
    let client = AgmsClient::new(backend);
    let mut session = SessionStore::new(MemoryTokenStorage::with_token(token_for("ROLE_STUDENT", 9)));
    session.initialize().unwrap();

    let load = ProfileLoader::load(&client, session.claims().unwrap()).await;

    assert_eq!(load.source, ProfileSource::Fetched);
    assert_eq!(load.profile.display_name(), "Ece Yilmaz");
    assert_eq!(load.profile.scope_id(Role::Student).as_deref(), Some("290201001"));
    assert!(client.backend().calls_to(Method::Get, "/api/users/profile").is_empty());
}
