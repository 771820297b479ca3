use agms_client::config::Config;
use agms_client::infrastructure::{HttpExecutor, MemoryTokenStorage};
use agms_client::services::{LoginForm, ProfileLoader, SessionStore, SubmissionLoader};
use agms_client::utils::logging;
use agms_client::workflow::{ReviewCtx, ReviewFlow};
use agms_client::AgmsClient;

#[tokio::test]
#[ignore] // needs a running backend: AGMS_EMAIL=... AGMS_PASSWORD=... cargo test -- --ignored
async fn test_live_dashboard() {
    logging::init(true);

    let config = Config::from_env().expect("invalid environment configuration");
    let email = config.login_email.clone().expect("AGMS_EMAIL not set");
    let password = config.login_password.clone().expect("AGMS_PASSWORD not set");

    let client = AgmsClient::new(HttpExecutor::new(&config).expect("could not build HTTP client"));
    let mut session = SessionStore::new(MemoryTokenStorage::new());
    let claims = session
        .login(&client, &LoginForm::new(email, password))
        .await
        .expect("login failed");

    let role = claims.role().expect("token carries no known role");
    let profile = ProfileLoader::load(&client, &claims).await;

    let mut flow = ReviewFlow::new(ReviewCtx::from_profile(role, &profile.profile));
    let load = flow
        .load(&client, &SubmissionLoader::new(&config))
        .await
        .expect("loading the list failed");

    assert!(load.enrichment.filled + load.enrichment.failed <= load.enrichment.attempted);
    session.logout(&client).await.expect("logout failed");
}

#[tokio::test]
#[ignore]
async fn test_backend_reachable() {
    let config = Config::from_env().expect("invalid environment configuration");
    let client = AgmsClient::new(HttpExecutor::new(&config).expect("could not build HTTP client"));

    // any HTTP answer is fine, 401 included; only transport failures count
    let result = client.user_profile().await;
    assert!(result.is_ok() || result.unwrap_err().is_unauthorized(), "backend unreachable");
}
