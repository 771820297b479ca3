//! Session store
//!
//! Holds the bearer token and its decoded claims, persisted through a
//! `TokenStorage`. Expiry is judged from the token's own `exp` claim, which is
//! a client-side convenience only: the backend re-validates every request.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clients::AgmsClient;
use crate::error::{AppError, AuthError, Result};
use crate::infrastructure::{Backend, RememberedEmailStore, TokenStorage};
use crate::models::{Role, SessionClaims};
use crate::services::validation::{validate_email, FieldError, LoginForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    /// A stored token was found past its `exp` and purged
    Expired,
}

pub struct SessionStore<S> {
    storage: S,
    remembered: Option<RememberedEmailStore>,
    token: Option<String>,
    claims: Option<SessionClaims>,
    state: SessionState,
}

impl<S: TokenStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            remembered: None,
            token: None,
            claims: None,
            state: SessionState::Anonymous,
        }
    }

    pub fn with_remembered_email(mut self, store: RememberedEmailStore) -> Self {
        self.remembered = Some(store);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        self.claims.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.claims.as_ref().and_then(SessionClaims::role)
    }

    /// Token for requests, or the reason there is none
    pub fn bearer(&self) -> Result<&str> {
        match (self.state, self.token.as_deref()) {
            (SessionState::Authenticated, Some(token)) => Ok(token),
            (SessionState::Expired, _) => Err(AuthError::Expired.into()),
            _ => Err(AuthError::MissingToken.into()),
        }
    }

    /// Persist (`Some`) or clear (`None`) the credential
    pub fn set_token(&mut self, token: Option<String>) -> Result<()> {
        match token {
            Some(token) => {
                let claims = SessionClaims::decode(&token)?;
                self.storage.save(&token, claims.expires_at())?;
                debug!("session token stored, exp={}", claims.exp);
                self.token = Some(token);
                self.claims = Some(claims);
                self.state = SessionState::Authenticated;
            }
            None => {
                self.storage.clear()?;
                self.token = None;
                self.claims = None;
                self.state = SessionState::Anonymous;
            }
        }
        Ok(())
    }

    pub fn initialize(&mut self) -> Result<SessionState> {
        self.initialize_at(Utc::now())
    }

    /// Read the persisted credential and drop it if expired or unreadable.
    /// No server round-trip.
    pub fn initialize_at(&mut self, now: DateTime<Utc>) -> Result<SessionState> {
        self.token = None;
        self.claims = None;
        self.state = SessionState::Anonymous;

        let Some(token) = self.storage.load()? else {
            return Ok(self.state);
        };

        match SessionClaims::decode(&token) {
            Ok(claims) if claims.is_expired_at(now) => {
                info!("stored session expired at {:?}, purging", claims.expires_at());
                self.storage.clear()?;
                self.state = SessionState::Expired;
            }
            Ok(claims) => {
                self.token = Some(token);
                self.claims = Some(claims);
                self.state = SessionState::Authenticated;
            }
            Err(e) => {
                warn!("stored session token unreadable ({}), purging", e);
                self.storage.clear()?;
            }
        }
        Ok(self.state)
    }

    /// Re-check the loaded token against `now`; purges it when expired
    pub fn check_expiry_at(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let expired = self.claims.as_ref().is_some_and(|c| c.is_expired_at(now));
        if expired {
            self.storage.clear()?;
            self.token = None;
            self.claims = None;
            self.state = SessionState::Expired;
        }
        Ok(expired)
    }

    /// Push the current token into the client's request headers
    pub fn attach<B: Backend>(&self, client: &AgmsClient<B>) {
        client.set_token(self.token.clone());
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.remembered
            .as_ref()
            .and_then(|store| store.load().ok().flatten())
    }

    /// Validate, call the backend, store the token
    pub async fn login<B: Backend>(
        &mut self,
        client: &AgmsClient<B>,
        form: &LoginForm,
    ) -> Result<SessionClaims> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let response = client
            .login(form.email.trim(), &form.password)
            .await
            .map_err(|e| match e {
                AppError::Auth(AuthError::Unauthorized { .. }) => AuthError::LoginRejected {
                    message: "invalid email or password".to_string(),
                }
                .into(),
                other => other,
            })?;

        let token = response.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AuthError::LoginRejected {
                message: response
                    .message
                    .clone()
                    .unwrap_or_else(|| "no token in login response".to_string()),
            }
        })?;

        self.set_token(Some(token))?;
        self.attach(client);

        if let Some(store) = &self.remembered {
            if form.remember_me {
                store.save(&form.email)?;
            } else {
                store.clear()?;
            }
        }

        let claims = self.claims.clone().ok_or(AuthError::MissingToken)?;
        info!(
            "logged in as {} ({})",
            claims.sub.as_deref().unwrap_or("?"),
            claims.role().map(Role::label).unwrap_or("unknown role")
        );
        Ok(claims)
    }

    /// Best-effort backend logout; local state is always cleared
    pub async fn logout<B: Backend>(&mut self, client: &AgmsClient<B>) -> Result<()> {
        if self.token.is_some() {
            if let Err(e) = client.logout().await {
                warn!("backend logout failed, clearing local session anyway: {}", e);
            }
        }
        self.set_token(None)?;
        client.set_token(None);
        Ok(())
    }

    pub async fn request_password_reset<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        email: &str,
    ) -> Result<Option<String>> {
        if let Some(msg) = validate_email(email) {
            return Err(AppError::Validation(vec![FieldError::new("email", msg)]));
        }
        client.request_password_reset(email.trim()).await
    }
}
