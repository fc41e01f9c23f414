//! services/api/src/admin.rs
//!
//! Bootstraps the administrator account used to sign in to the admin dashboard.

use bytegurukul_core::domain::{NewUser, Role, User};
use bytegurukul_core::ports::{DatabaseService, PortError};
use tracing::info;

use crate::password::{hash_password, PasswordError};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Port(#[from] PortError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminBootstrap {
    Created(User),
    /// The account existed; its password was replaced and its role set to admin.
    Updated(User),
}

/// Creates the admin account, or resets the password and role of an existing
/// account with the same email.
pub async fn ensure_admin(
    db: &dyn DatabaseService,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AdminBootstrap, AdminError> {
    let password_hash = hash_password(password)?;

    match db.get_user_by_email(email).await {
        Ok(existing) => {
            let user = db
                .update_user_credentials(existing.user.id, &password_hash, Role::Admin)
                .await?;
            info!(email, "Admin user already exists; password updated");
            Ok(AdminBootstrap::Updated(user))
        }
        Err(PortError::NotFound(_)) => {
            let user = db
                .create_user(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                    role: Role::Admin,
                })
                .await?;
            info!(email, "Admin user created");
            Ok(AdminBootstrap::Created(user))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDb;
    use crate::password::verify_password;

    #[tokio::test]
    async fn creates_then_updates_the_admin() {
        let db = InMemoryDb::new();

        let created = ensure_admin(&db, "AdminUser", "admin@x.com", "first-pass")
            .await
            .unwrap();
        assert!(matches!(created, AdminBootstrap::Created(ref u) if u.role == Role::Admin));

        let updated = ensure_admin(&db, "AdminUser", "admin@x.com", "second-pass")
            .await
            .unwrap();
        assert!(matches!(updated, AdminBootstrap::Updated(_)));

        let creds = db.get_user_by_email("admin@x.com").await.unwrap();
        assert!(verify_password("second-pass", &creds.password_hash).unwrap());
        assert!(!verify_password("first-pass", &creds.password_hash).unwrap());
    }

    #[tokio::test]
    async fn promotes_an_existing_student() {
        let db = InMemoryDb::new();
        db.create_user(NewUser {
            username: "bob".to_string(),
            email: "bob@x.com".to_string(),
            password_hash: hash_password("pw").unwrap(),
            role: Role::Student,
        })
        .await
        .unwrap();

        let outcome = ensure_admin(&db, "ignored", "bob@x.com", "new-pass").await.unwrap();
        match outcome {
            AdminBootstrap::Updated(user) => {
                assert_eq!(user.role, Role::Admin);
                assert_eq!(user.username, "bob");
            }
            other => panic!("expected update, got {:?}", other),
        }
    }
}
