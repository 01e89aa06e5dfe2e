use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use moka::{Expiry, future::Cache};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::{generate_token, verify_token},
        password::{hash_password, verify_against_dummy, verify_password},
    },
    config::MAX_TOKEN_TTL,
    error::AppError,
    model::{
        admin::Admin,
        principal::{Principal, PrincipalSummary},
        role::Role,
    },
    models::{LoginRequest, LoginResponse, ProfileUpdate},
    store::PrincipalStore,
};

/// Credential verification, token issuance and token resolution for both
/// principal kinds.
///
/// Tokens are stateless HS256 JWTs bound to a principal id. Every
/// [`resolve`](AuthGateway::resolve) re-reads the principal from the store, so
/// a deleted account loses access on its next request even though its token
/// still verifies. Explicit logout is covered by an in-process revocation list
/// keyed by token id. The list has no size cap; each entry lives exactly as
/// long as the token it revokes.
pub struct AuthGateway {
    principals: Arc<dyn PrincipalStore>,
    jwt_secret: String,
    token_ttl: i64,
    /// jti -> exp of the revoked token.
    revoked: Cache<String, i64>,
}

/// Keeps a revoked jti until its token would have expired anyway.
struct UntilTokenExpiry;

impl Expiry<String, i64> for UntilTokenExpiry {
    fn expire_after_create(&self, _jti: &String, exp: &i64, _created_at: Instant) -> Option<Duration> {
        let remaining = exp
            .saturating_sub(Utc::now().timestamp())
            .clamp(0, MAX_TOKEN_TTL as i64);
        // One extra second covers the whole-second resolution of `exp`.
        Some(Duration::from_secs(remaining as u64 + 1))
    }
}

impl AuthGateway {
    pub fn new(principals: Arc<dyn PrincipalStore>, jwt_secret: &str, token_ttl: u64) -> Self {
        let token_ttl = i64::try_from(token_ttl.clamp(1, MAX_TOKEN_TTL)).unwrap_or(i64::MAX);
        Self {
            principals,
            jwt_secret: jwt_secret.to_string(),
            token_ttl,
            revoked: Cache::builder().expire_after(UntilTokenExpiry).build(),
        }
    }

    #[instrument(name = "auth_login", skip(self, request), fields(kind = tracing::field::Empty))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let principal = match request {
            LoginRequest::Admin { email, password } => {
                tracing::Span::current().record("kind", "admin");
                let admin = self.principals.find_admin_by_email(&email).await?;
                Principal::Admin(check_password(admin, &password, |a| a.password_hash.as_str())?)
            }
            LoginRequest::Employee {
                employee_id,
                password,
            } => {
                tracing::Span::current().record("kind", "employee");
                let employee = self.principals.find_employee_by_code(&employee_id).await?;
                Principal::Employee(check_password(employee, &password, |e| e.password_hash.as_str())?)
            }
        };

        debug!(principal_id = principal.id(), "Password verified");

        let (token, _) = generate_token(
            principal.id(),
            Utc::now().timestamp(),
            self.token_ttl,
            &self.jwt_secret,
        )?;

        info!(principal_id = principal.id(), role = %principal.role(), "Login successful");

        Ok(LoginResponse {
            token,
            principal: principal.summary(),
        })
    }

    /// Resolves a bearer token to the live principal it names.
    pub async fn resolve(&self, token: &str) -> Result<PrincipalSummary, AppError> {
        let claims = verify_token(token, &self.jwt_secret)?;

        if self.revoked.contains_key(&claims.jti) {
            debug!(jti = %claims.jti, "Rejected revoked token");
            return Err(AppError::TokenInvalid);
        }

        // The token does not say which store issued it.
        let principal = match self.principals.find_admin_by_id(&claims.sub).await? {
            Some(admin) => Principal::Admin(admin),
            None => match self.principals.find_employee_by_id(&claims.sub).await? {
                Some(employee) => Principal::Employee(employee),
                None => {
                    info!(principal_id = %claims.sub, "Token subject no longer exists");
                    return Err(AppError::PrincipalNotFound);
                }
            },
        };

        Ok(principal.summary())
    }

    pub fn require_role(principal: &PrincipalSummary, role: Role) -> Result<(), AppError> {
        if principal.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{role} only")))
        }
    }

    /// Revokes one token until it would have expired anyway.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let claims = verify_token(token, &self.jwt_secret)?;
        self.revoked.insert(claims.jti, claims.exp).await;

        info!(principal_id = %claims.sub, "Token revoked");
        Ok(())
    }

    /// Self-service edit of an employee's own name, email and picture
    /// reference. Blank fields are left as they are.
    #[instrument(name = "auth_update_profile", skip(self, requester, update), fields(employee = %requester.id))]
    pub async fn update_profile(
        &self,
        requester: &PrincipalSummary,
        update: ProfileUpdate,
    ) -> Result<PrincipalSummary, AppError> {
        Self::require_role(requester, Role::Employee)?;

        let mut employee = self
            .principals
            .find_employee_by_id(&requester.id)
            .await?
            .ok_or(AppError::PrincipalNotFound)?;

        if let Some(name) = non_blank(update.name) {
            employee.name = name;
        }
        if let Some(email) = non_blank(update.email) {
            if !email.contains('@') {
                return Err(AppError::InvalidRequest("email is not valid".into()));
            }
            employee.email = email;
        }
        if let Some(image) = non_blank(update.image) {
            employee.image = Some(image);
        }

        if !self.principals.update_employee(&employee).await? {
            return Err(AppError::PrincipalNotFound);
        }

        info!("Profile updated");
        Ok(Principal::Employee(employee).summary())
    }

    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PrincipalSummary, AppError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || password.is_empty() || !email.contains('@') {
            return Err(AppError::InvalidRequest(
                "name, a valid email and password are required".into(),
            ));
        }

        let admin = Admin {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
        };
        self.principals.insert_admin(&admin).await?;

        info!(admin_id = %admin.id, "Admin registered");
        Ok(Principal::Admin(admin).summary())
    }

    /// One-time bootstrap: creates the admin unless that email already exists.
    /// Returns whether an account was created.
    pub async fn seed_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        if self.principals.find_admin_by_email(email).await?.is_some() {
            return Ok(false);
        }
        match self.create_admin(name, email, password).await {
            Ok(_) => Ok(true),
            // Lost a race with another instance seeding the same account.
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Both "no such identity" and "wrong password" surface as the same error.
fn check_password<T>(
    record: Option<T>,
    password: &str,
    hash_of: impl Fn(&T) -> &str,
) -> Result<T, AppError> {
    match record {
        Some(record) if verify_password(password, hash_of(&record)) => Ok(record),
        Some(_) => {
            info!("Invalid credentials: password mismatch");
            Err(AppError::InvalidCredentials)
        }
        None => {
            verify_against_dummy(password);
            info!("Invalid credentials: unknown identity");
            Err(AppError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, JWT_SECRET};

    fn employee_login(code: &str, password: &str) -> LoginRequest {
        LoginRequest::Employee {
            employee_id: code.into(),
            password: password.into(),
        }
    }

    #[actix_web::test]
    async fn employee_logs_in_with_matching_password() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);

        let resp = gateway.login(employee_login("EMP001", "EMP001")).await.unwrap();

        assert_eq!(resp.principal.role, Role::Employee);
        assert_eq!(resp.principal.employee_id.as_deref(), Some("EMP001"));
        assert_eq!(gateway.resolve(&resp.token).await.unwrap(), resp.principal);
    }

    #[actix_web::test]
    async fn wrong_password_and_unknown_identity_look_identical() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);

        let wrong = gateway.login(employee_login("EMP001", "wrong")).await;
        let unknown = gateway.login(employee_login("EMP999", "EMP999")).await;
        let bad_admin = gateway
            .login(LoginRequest::Admin {
                email: "admin@example.com".into(),
                password: "nope".into(),
            })
            .await;

        assert_eq!(wrong.unwrap_err(), AppError::InvalidCredentials);
        assert_eq!(unknown.unwrap_err(), AppError::InvalidCredentials);
        assert_eq!(bad_admin.unwrap_err(), AppError::InvalidCredentials);
    }

    #[actix_web::test]
    async fn login_response_never_carries_a_password() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);

        let admin = gateway
            .login(LoginRequest::Admin {
                email: "admin@example.com".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap();
        let employee = gateway.login(employee_login("EMP002", "EMP002")).await.unwrap();

        for resp in [admin, employee] {
            let json = serde_json::to_string(&resp).unwrap();
            assert!(!json.to_lowercase().contains("password"));
            assert!(!json.contains("$argon2"));
        }
    }

    #[actix_web::test]
    async fn deleted_principal_loses_access_with_a_valid_token() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store.clone(), JWT_SECRET, 86_400);
        let resp = gateway.login(employee_login("EMP003", "EMP003")).await.unwrap();

        store.delete_employee(&resp.principal.id).await.unwrap();

        assert_eq!(
            gateway.resolve(&resp.token).await.unwrap_err(),
            AppError::PrincipalNotFound
        );
    }

    #[actix_web::test]
    async fn logout_revokes_only_that_token() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);
        let first = gateway.login(employee_login("EMP001", "EMP001")).await.unwrap();
        let second = gateway.login(employee_login("EMP001", "EMP001")).await.unwrap();

        gateway.logout(&first.token).await.unwrap();

        assert_eq!(
            gateway.resolve(&first.token).await.unwrap_err(),
            AppError::TokenInvalid
        );
        assert!(gateway.resolve(&second.token).await.is_ok());
    }

    #[actix_web::test]
    async fn revocation_holds_with_a_crowded_revocation_list() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);
        let exp = Utc::now().timestamp() + 86_400;
        for i in 0..120_000 {
            gateway.revoked.insert(format!("jti-{i}"), exp).await;
        }
        gateway.revoked.run_pending_tasks().await;

        let victim = gateway.login(employee_login("EMP001", "EMP001")).await.unwrap();
        gateway.logout(&victim.token).await.unwrap();
        gateway.revoked.run_pending_tasks().await;

        assert_eq!(
            gateway.resolve(&victim.token).await.unwrap_err(),
            AppError::TokenInvalid
        );
        assert!(gateway.revoked.contains_key("jti-0"));
    }

    #[test]
    fn revoked_entries_outlive_only_their_token() {
        let expiry = UntilTokenExpiry;
        let now = Utc::now().timestamp();
        let jti = "jti".to_string();

        assert_eq!(
            expiry.expire_after_create(&jti, &(now - 60), Instant::now()),
            Some(Duration::from_secs(1))
        );
        let live = expiry
            .expire_after_create(&jti, &(now + 600), Instant::now())
            .unwrap();
        assert!(live <= Duration::from_secs(601) && live >= Duration::from_secs(599));
    }

    #[actix_web::test]
    async fn huge_ttl_does_not_wrap() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, u64::MAX);
        assert_eq!(gateway.token_ttl, MAX_TOKEN_TTL as i64);

        let resp = gateway.login(employee_login("EMP002", "EMP002")).await.unwrap();
        assert!(gateway.resolve(&resp.token).await.is_ok());
    }

    #[actix_web::test]
    async fn employees_edit_their_own_profile_only() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store.clone(), JWT_SECRET, 86_400);
        let alice = test_support::summary(&store, test_support::ALICE_ID).await;
        let admin = test_support::summary(&store, test_support::ADMIN_ID).await;

        let updated = gateway
            .update_profile(
                &alice,
                ProfileUpdate {
                    name: Some("Alice Smith".into()),
                    email: Some("  ".into()),
                    image: Some("alice.png".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.email.as_deref(), Some("alice@company.com"));
        assert_eq!(updated.image.as_deref(), Some("alice.png"));
        assert_eq!(updated.employee_id.as_deref(), Some("EMP001"));

        let bad_email = gateway
            .update_profile(
                &alice,
                ProfileUpdate {
                    email: Some("nope".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_email, Err(AppError::InvalidRequest(_))));

        let by_admin = gateway.update_profile(&admin, ProfileUpdate::default()).await;
        assert!(matches!(by_admin, Err(AppError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn expired_and_forged_tokens_are_rejected() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);

        let stale = Utc::now().timestamp() - 3 * 86_400;
        let (expired, _) = generate_token(test_support::ALICE_ID, stale, 86_400, JWT_SECRET).unwrap();
        let (forged, _) =
            generate_token(test_support::ALICE_ID, Utc::now().timestamp(), 60, "other").unwrap();

        assert_eq!(gateway.resolve(&expired).await.unwrap_err(), AppError::TokenExpired);
        assert_eq!(gateway.resolve(&forged).await.unwrap_err(), AppError::TokenInvalid);
    }

    #[actix_web::test]
    async fn role_is_fetched_live_not_from_the_token() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);
        let resp = gateway.login(employee_login("EMP001", "EMP001")).await.unwrap();

        let principal = gateway.resolve(&resp.token).await.unwrap();

        assert!(AuthGateway::require_role(&principal, Role::Employee).is_ok());
        assert!(matches!(
            AuthGateway::require_role(&principal, Role::Admin),
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn seeding_is_idempotent_and_duplicates_conflict() {
        let store = test_support::seeded_store().await;
        let gateway = AuthGateway::new(store, JWT_SECRET, 86_400);

        assert!(!gateway.seed_admin("Admin", "admin@example.com", "x").await.unwrap());
        assert!(gateway.seed_admin("Root", "root@example.com", "rootpw").await.unwrap());
        assert!(matches!(
            gateway.create_admin("Again", "root@example.com", "pw").await,
            Err(AppError::Conflict(_))
        ));

        let resp = gateway
            .login(LoginRequest::Admin {
                email: "root@example.com".into(),
                password: "rootpw".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.principal.role, Role::Admin);
    }
}
