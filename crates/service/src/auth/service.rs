use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::domain::{Actor, AuthSession, AuthUser, LoginInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    uid: i32,
    iat: usize,
    exp: usize,
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Find or create the user named by the provider and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::LoginInput;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 12 });
    /// let first = tokio_test::block_on(svc.login(LoginInput { username: "dan".into() })).unwrap();
    /// assert!(first.created);
    /// let again = tokio_test::block_on(svc.login(LoginInput { username: "dan".into() })).unwrap();
    /// assert_eq!(again.user.id, first.user.id);
    /// assert_eq!(again.greeting(), "Logged in as returning user dan");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let username = input.username.trim();
        models::user::validate_username(username)?;

        let (user, created) = self.repo.find_or_create_user(username).await?;
        let token = self.issue_token(&user)?;
        info!(user_id = user.id, username = %user.username, created, "user_logged_in");
        Ok(AuthSession { user, token, created })
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp().max(0) as usize;
        let claims = Claims { sub: user.username.clone(), uid: user.id, iat: now.timestamp().max(0) as usize, exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Turn a session token into an actor. Anything that does not verify
    /// (bad signature, expired, malformed) is a guest.
    pub fn resolve(&self, token: &str) -> Actor {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Actor::User(AuthUser { id: data.claims.uid, username: data.claims.sub }),
            Err(e) => {
                debug!(err = %e, "session token rejected; treating request as guest");
                Actor::Guest
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<AuthUser>, AuthError> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: i32) -> Result<AuthUser, AuthError> {
        self.repo.find_user(id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(ttl: i64) -> AuthService {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: ttl })
    }

    #[tokio::test]
    async fn login_creates_then_returns_same_user() {
        let s = svc(12);
        let first = s.login(LoginInput { username: "grace".into() }).await.unwrap();
        assert!(first.created);
        assert_eq!(first.greeting(), "Logged in as new user grace");

        let second = s.login(LoginInput { username: "  grace ".into() }).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user, first.user);
    }

    #[tokio::test]
    async fn login_rejects_blank_username() {
        let err = svc(12).login(LoginInput { username: "   ".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.code(), 1001);
    }

    #[tokio::test]
    async fn token_round_trips_to_actor() {
        let s = svc(12);
        let session = s.login(LoginInput { username: "dan".into() }).await.unwrap();
        assert_eq!(s.resolve(&session.token), Actor::User(session.user.clone()));
    }

    #[tokio::test]
    async fn bad_tokens_resolve_to_guest() {
        let s = svc(12);
        assert_eq!(s.resolve("not-a-jwt"), Actor::Guest);

        let other = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig { jwt_secret: "other".into(), token_ttl_hours: 12 });
        let foreign = other.login(LoginInput { username: "mallory".into() }).await.unwrap();
        assert_eq!(s.resolve(&foreign.token), Actor::Guest);
    }

    #[tokio::test]
    async fn expired_token_resolves_to_guest() {
        let s = svc(-2);
        let session = s.login(LoginInput { username: "dan".into() }).await.unwrap();
        assert_eq!(s.resolve(&session.token), Actor::Guest);
    }

    #[tokio::test]
    async fn get_user_reports_missing() {
        let s = svc(12);
        assert!(matches!(s.get_user(-1).await, Err(AuthError::NotFound)));
        let session = s.login(LoginInput { username: "dan".into() }).await.unwrap();
        assert_eq!(s.get_user(session.user.id).await.unwrap().username, "dan");
        assert_eq!(s.list_users().await.unwrap().len(), 1);
    }
}
