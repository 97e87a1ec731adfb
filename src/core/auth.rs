//! Customer accounts and sessions.
//!
//! Passwords are stored as a hex SHA-256 digest of a per-user random salt
//! followed by the password. Registering or logging in issues an opaque bearer
//! token that stays valid for [`SESSION_DAYS`] days.

use crate::{
    entities::{Session, User, session, user},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use regex::Regex;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::{info, instrument, warn};

/// Lifetime of a session token
pub const SESSION_DAYS: i64 = 30;

#[allow(clippy::unwrap_used)] // Literal pattern, covered by tests
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A logged-in user together with their bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub user: user::Model,
    pub token: String,
    pub expires_at: DateTimeUtc,
}

/// Registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Full profile replacement; `password` is only changed when given.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: Option<String>,
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(Error::Validation {
            message: format!("'{email}' is not a valid e-mail address"),
        })
    }
}

fn clean_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

async fn ensure_email_free(db: &DatabaseConnection, email: &str, except: Option<i64>) -> Result<()> {
    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    match existing {
        Some(found) if Some(found.id) != except => Err(Error::DuplicateEmail {
            email: email.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Creates a session for `user_id` that expires after `ttl`.
pub(crate) async fn issue_session(
    db: &DatabaseConnection,
    user_id: i64,
    ttl: Duration,
) -> Result<session::Model> {
    let session = session::ActiveModel {
        user_id: Set(user_id),
        token: Set(random_string(48)),
        expires_at: Set(Utc::now() + ttl),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(session)
}

async fn start_session(db: &DatabaseConnection, user: user::Model) -> Result<AuthSession> {
    let session = issue_session(db, user.id, Duration::days(SESSION_DAYS)).await?;
    Ok(AuthSession {
        user,
        token: session.token,
        expires_at: session.expires_at,
    })
}

/// Registers a new customer and logs them in.
///
/// # Errors
/// Returns an error if a required field is empty, the e-mail is malformed or
/// already registered, or the insert fails.
#[instrument(skip(db, form), fields(email = %form.email))]
pub async fn register(db: &DatabaseConnection, form: Registration) -> Result<AuthSession> {
    let email = normalize_email(&form.email);
    let full_name = form.full_name.trim().to_string();
    if email.is_empty() || form.password.is_empty() || full_name.is_empty() {
        return Err(Error::Validation {
            message: "E-mail, password, and name are required".to_string(),
        });
    }
    validate_email(&email)?;
    ensure_email_free(db, &email, None).await?;

    let salt = random_string(16);
    let user = user::ActiveModel {
        email: Set(email),
        full_name: Set(full_name),
        phone: Set(clean_phone(form.phone)),
        password_hash: Set(hash_password(&salt, &form.password)),
        password_salt: Set(salt),
        is_admin: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered user {}", user.id);
    start_session(db, user).await
}

/// Checks credentials and issues a new session.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] for an unknown e-mail or wrong password.
#[instrument(skip(db, password))]
pub async fn login(db: &DatabaseConnection, email: &str, password: &str) -> Result<AuthSession> {
    let user = User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if hash_password(&user.password_salt, password) != user.password_hash {
        warn!("Failed login for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    start_session(db, user).await
}

/// Resolves a bearer token to its user.
///
/// Expired sessions are deleted when seen.
///
/// # Errors
/// Returns [`Error::InvalidSession`] if the token is unknown or expired.
pub async fn verify_token(db: &DatabaseConnection, token: &str) -> Result<user::Model> {
    let session = Session::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await?
        .ok_or(Error::InvalidSession)?;

    if session.expires_at <= Utc::now() {
        Session::delete_by_id(session.id).exec(db).await?;
        return Err(Error::InvalidSession);
    }

    User::find_by_id(session.user_id)
        .one(db)
        .await?
        .ok_or(Error::InvalidSession)
}

/// Revokes a session token. Unknown tokens are ignored.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// # Errors
/// Returns [`Error::UserNotFound`] if no user has this id.
pub async fn get_profile(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
}

/// Finds a user by e-mail.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn find_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    Ok(User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

/// Replaces a user's name, e-mail, and phone, and optionally the password.
///
/// # Errors
/// Returns an error if the user does not exist, the name or e-mail is invalid,
/// the e-mail belongs to another user, or the update fails.
#[instrument(skip(db, update))]
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = get_profile(db, user_id).await?;

    let email = normalize_email(&update.email);
    let full_name = update.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(Error::Validation {
            message: "Name is required".to_string(),
        });
    }
    validate_email(&email)?;
    ensure_email_free(db, &email, Some(user_id)).await?;

    let mut active: user::ActiveModel = existing.into();
    active.email = Set(email);
    active.full_name = Set(full_name);
    active.phone = Set(clean_phone(update.phone));
    if let Some(password) = update.password.filter(|p| !p.is_empty()) {
        let salt = random_string(16);
        active.password_hash = Set(hash_password(&salt, &password));
        active.password_salt = Set(salt);
    }

    let updated = active.update(db).await?;
    info!("Updated user {user_id}");
    Ok(updated)
}

/// Grants or revokes staff access for an account.
///
/// # Errors
/// Returns an error if the user does not exist or the update fails.
pub async fn set_admin(db: &DatabaseConnection, user_id: i64, is_admin: bool) -> Result<user::Model> {
    let mut active: user::ActiveModel = get_profile(db, user_id).await?.into();
    active.is_admin = Set(is_admin);
    let updated = active.update(db).await?;
    info!("User {user_id} admin = {is_admin}");
    Ok(updated)
}

/// Lists users, optionally filtered by a case-insensitive match on e-mail,
/// name, or phone.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn search_users(db: &DatabaseConnection, query: Option<&str>) -> Result<Vec<user::Model>> {
    let users = User::find()
        .order_by_asc(user::Column::FullName)
        .all(db)
        .await?;

    let Some(needle) = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty()) else {
        return Ok(users);
    };

    // Filtered here rather than with LIKE so non-ASCII names match case-insensitively
    Ok(users
        .into_iter()
        .filter(|u| {
            u.email.to_lowercase().contains(&needle)
                || u.full_name.to_lowercase().contains(&needle)
                || u.phone
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_register_and_login() -> Result<()> {
        let db = setup_test_db().await?;
        let registered = register_test_user(&db, "Anna@Example.com", "Анна Петрова").await?;
        assert_eq!(registered.user.email, "anna@example.com");
        assert!(!registered.token.is_empty());
        assert_ne!(registered.user.password_hash, TEST_PASSWORD);

        let session = login(&db, "anna@example.com", TEST_PASSWORD).await?;
        assert_eq!(session.user.id, registered.user.id);
        assert_ne!(session.token, registered.token);

        let user = verify_token(&db, &session.token).await?;
        assert_eq!(user.full_name, "Анна Петрова");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;
        register_test_user(&db, "anna@example.com", "Anna").await?;

        let duplicate = register_test_user(&db, "ANNA@example.com", "Other").await;
        assert!(matches!(duplicate, Err(Error::DuplicateEmail { .. })));

        let bad_email = register_test_user(&db, "not-an-email", "Bob").await;
        assert!(matches!(bad_email, Err(Error::Validation { .. })));

        let missing = register(
            &db,
            Registration {
                email: "bob@example.com".into(),
                password: String::new(),
                full_name: "Bob".into(),
                phone: None,
            },
        )
        .await;
        assert!(matches!(missing, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;
        register_test_user(&db, "anna@example.com", "Anna").await?;

        assert!(matches!(
            login(&db, "anna@example.com", "wrong").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, "nobody@example.com", TEST_PASSWORD).await,
            Err(Error::InvalidCredentials)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_and_revoked_sessions() -> Result<()> {
        let db = setup_test_db().await?;
        let registered = register_test_user(&db, "anna@example.com", "Anna").await?;

        let expired = issue_session(&db, registered.user.id, Duration::seconds(-5)).await?;
        assert!(matches!(
            verify_token(&db, &expired.token).await,
            Err(Error::InvalidSession)
        ));

        logout(&db, &registered.token).await?;
        assert!(matches!(
            verify_token(&db, &registered.token).await,
            Err(Error::InvalidSession)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_user_and_password() -> Result<()> {
        let db = setup_test_db().await?;
        let anna = register_test_user(&db, "anna@example.com", "Anna").await?;
        register_test_user(&db, "bob@example.com", "Bob").await?;

        let taken = update_user(
            &db,
            anna.user.id,
            ProfileUpdate {
                full_name: "Anna".into(),
                email: "bob@example.com".into(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(taken, Err(Error::DuplicateEmail { .. })));

        let updated = update_user(
            &db,
            anna.user.id,
            ProfileUpdate {
                full_name: "Anna K".into(),
                email: "anna@example.com".into(),
                phone: Some("+7 900 000-00-00".into()),
                password: Some("new-secret".into()),
            },
        )
        .await?;
        assert_eq!(updated.full_name, "Anna K");
        assert!(login(&db, "anna@example.com", TEST_PASSWORD).await.is_err());
        login(&db, "anna@example.com", "new-secret").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_search_users() -> Result<()> {
        let db = setup_test_db().await?;
        register_test_user(&db, "anna@example.com", "Анна Петрова").await?;
        register_test_user(&db, "bob@example.com", "Bob").await?;

        assert_eq!(search_users(&db, None).await?.len(), 2);
        assert_eq!(search_users(&db, Some("  ")).await?.len(), 2);

        let found = search_users(&db, Some("анна")).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "anna@example.com");

        let by_email = search_users(&db, Some("BOB@")).await?;
        assert_eq!(by_email.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let anna = register_test_user(&db, "anna@example.com", "Anna").await?;
        assert!(!anna.user.is_admin);
        assert!(set_admin(&db, anna.user.id, true).await?.is_admin);
        assert!(matches!(
            set_admin(&db, 999, true).await,
            Err(Error::UserNotFound { .. })
        ));
        Ok(())
    }
}
