//! First-start provisioning.

use skye_core::{generate_invitation_code, NewUser, Result, SkyeError, User};

use crate::crypto::hash_password_blocking;
use crate::state::AppState;

/// Create the self-invited seed account when the user table is empty.
///
/// Returns the created account, or `None` if users already exist or no seed
/// credentials are configured.
///
/// # Errors
///
/// Returns an error if the store fails or the password cannot be hashed.
pub async fn ensure_seed_account(state: &AppState) -> Result<Option<User>> {
    let Some(seed) = &state.config.seed else {
        tracing::debug!("No seed account configured");
        return Ok(None);
    };

    if state.store.count_users().await? > 0 {
        return Ok(None);
    }

    let password_hash = hash_password_blocking(seed.password.clone(), state.config.password_hash_cost)
        .await
        .map_err(|e| SkyeError::Validation(format!("seed password: {e}")))?;

    let code = seed
        .invitation_code
        .clone()
        .unwrap_or_else(generate_invitation_code);

    let root = NewUser {
        email: seed.email.clone(),
        password_hash,
        name: seed.name.clone(),
    }
    .into_root(Some(code.clone()));

    state.store.create_root_user(&root).await?;
    tracing::info!(user_id = %root.id, email = %root.email, invitation_code = %code, "Seed account created");

    Ok(Some(root))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use skye_store::MemoryStore;

    use super::*;
    use crate::config::{SeedAccount, ServiceConfig};

    fn state(seed: Option<SeedAccount>) -> AppState {
        let config = ServiceConfig {
            password_hash_cost: 4,
            seed,
            ..ServiceConfig::default()
        };
        AppState::new(Arc::new(MemoryStore::new()), config)
    }

    fn seed() -> SeedAccount {
        SeedAccount {
            email: "root@example.com".into(),
            password: "hunter2".into(),
            name: "root".into(),
            invitation_code: Some("SEED-CODE".into()),
        }
    }

    #[tokio::test]
    async fn seeds_once() {
        let state = state(Some(seed()));

        let root = ensure_seed_account(&state).await.unwrap().unwrap();
        assert!(root.is_root());
        assert_eq!(root.invitation_code.as_deref(), Some("SEED-CODE"));

        assert!(ensure_seed_account(&state).await.unwrap().is_none());
        assert_eq!(state.store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn nothing_without_credentials() {
        let state = state(None);
        assert!(ensure_seed_account(&state).await.unwrap().is_none());
        assert_eq!(state.store.count_users().await.unwrap(), 0);
    }
}
