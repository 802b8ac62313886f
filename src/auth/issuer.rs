//! Bearer token issuance and revocation.

use chrono::Utc;

use crate::auth::scopes::ScopeSet;
use crate::auth::types::{Token, generate_token_value};
use crate::errors::{AuthError, StorageError};
use crate::storage::traits::TokenStore;

/// Issue a token for `user_id`, optionally through `client_id`.
///
/// Scopes are normalized before anything is generated. A value that is
/// already taken is regenerated until the store accepts it.
pub async fn issue_token<S>(
    store: &S,
    user_id: &str,
    client_id: Option<&str>,
    raw_scopes: &str,
) -> Result<Token, AuthError>
where
    S: TokenStore + Sync + ?Sized,
{
    let scopes = ScopeSet::normalize(raw_scopes)?;

    loop {
        let token = Token {
            value: generate_token_value(),
            user_id: user_id.to_string(),
            client_id: client_id.map(str::to_string),
            scopes: scopes.clone(),
            created_at: Utc::now(),
        };

        match store.insert_token(&token).await {
            Ok(()) => {
                tracing::debug!(%user_id, ?client_id, scopes = %token.scopes, "issued token");
                return Ok(token);
            }
            Err(StorageError::Conflict(_)) => {
                tracing::debug!(%user_id, "token value collision, regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Revoke a token; later lookups of the value find nothing.
pub async fn revoke_token<S>(store: &S, value: &str) -> Result<(), AuthError>
where
    S: TokenStore + Sync + ?Sized,
{
    store.delete_token(value).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::MemoryStorage;
    use crate::storage::traits::Result as StorageResult;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports a conflict for the first `failures` inserts.
    struct CollidingStore {
        inner: MemoryStorage,
        failures: usize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl TokenStore for CollidingStore {
        async fn get_token(&self, value: &str) -> StorageResult<Option<Token>> {
            self.inner.get_token(value).await
        }

        async fn insert_token(&self, token: &Token) -> StorageResult<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(StorageError::Conflict("tokens.value".to_string()));
            }
            self.inner.insert_token(token).await
        }

        async fn delete_token(&self, value: &str) -> StorageResult<()> {
            self.inner.delete_token(value).await
        }

        async fn list_tokens_for_user(&self, user_id: &str) -> StorageResult<Vec<Token>> {
            self.inner.list_tokens_for_user(user_id).await
        }
    }

    #[tokio::test]
    async fn test_issued_tokens_are_distinct() {
        let store = MemoryStorage::new();
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let token = issue_token(&store, "alice", None, "read").await.unwrap();
            assert_eq!(token.value.len(), 128);
            assert!(
                token
                    .value
                    .chars()
                    .all(|c| matches!(c, '0'..='9' | 'a'..='f'))
            );
            assert!(seen.insert(token.value));
        }
    }

    #[tokio::test]
    async fn test_retry_on_collision() {
        let store = CollidingStore {
            inner: MemoryStorage::new(),
            failures: 5,
            attempts: AtomicUsize::new(0),
        };

        let token = issue_token(&store, "alice", Some("$app"), "write")
            .await
            .unwrap();
        assert_eq!(store.attempts.load(Ordering::SeqCst), 6);
        assert_eq!(token.scopes.to_string(), "read write");
        assert!(store.get_token(&token.value).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_scopes_fail_before_insert() {
        let store = CollidingStore {
            inner: MemoryStorage::new(),
            failures: 0,
            attempts: AtomicUsize::new(0),
        };

        assert!(matches!(
            issue_token(&store, "alice", None, "admin").await,
            Err(AuthError::InvalidScopes)
        ));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = MemoryStorage::new();
        let token = issue_token(&store, "alice", None, "read").await.unwrap();

        revoke_token(&store, &token.value).await.unwrap();
        assert!(store.get_token(&token.value).await.unwrap().is_none());
    }
}
