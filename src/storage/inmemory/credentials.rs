//! In-memory credential and image storage implementation

use crate::auth::types::{Client, Token, User};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// In-memory implementation for all storage traits.
///
/// Cascading deletes take the table locks in the fixed order
/// users, clients, images, tokens.
#[derive(Default)]
pub struct MemoryStorage {
    users: Mutex<BTreeMap<String, User>>,
    clients: Mutex<HashMap<String, Client>>,
    images: Mutex<BTreeMap<i64, Image>>,
    tokens: Mutex<HashMap<String, Token>>,
    next_image_id: Mutex<i64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::QueryFailed(format!("Lock error: {}", e)))
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.get(user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = lock(&self.users)?;
        if users.contains_key(&user.id) {
            return Err(StorageError::Conflict(format!(
                "User already exists: {}",
                user.id
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut users = lock(&self.users)?;
        let mut images = lock(&self.images)?;
        let mut tokens = lock(&self.tokens)?;

        users.remove(user_id);
        images.retain(|_, image| image.owner_id != user_id);
        tokens.retain(|_, token| token.user_id != user_id);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = lock(&self.users)?;
        Ok(users.values().cloned().collect())
    }
}

#[async_trait]
impl ClientStore for MemoryStorage {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        let clients = lock(&self.clients)?;
        Ok(clients.get(client_id).cloned())
    }

    async fn insert_client(&self, client: &Client) -> Result<()> {
        let mut clients = lock(&self.clients)?;
        if clients.contains_key(&client.id) {
            return Err(StorageError::Conflict(format!(
                "Client already exists: {}",
                client.id
            )));
        }
        clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn delete_client(&self, client_id: &str) -> Result<()> {
        let mut clients = lock(&self.clients)?;
        let mut tokens = lock(&self.tokens)?;

        clients.remove(client_id);
        tokens.retain(|_, token| token.client_id.as_deref() != Some(client_id));
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStorage {
    async fn get_token(&self, value: &str) -> Result<Option<Token>> {
        let tokens = lock(&self.tokens)?;
        Ok(tokens.get(value).cloned())
    }

    async fn insert_token(&self, token: &Token) -> Result<()> {
        let mut tokens = lock(&self.tokens)?;
        if tokens.contains_key(&token.value) {
            return Err(StorageError::Conflict("Token value already exists".to_string()));
        }
        tokens.insert(token.value.clone(), token.clone());
        Ok(())
    }

    async fn delete_token(&self, value: &str) -> Result<()> {
        let mut tokens = lock(&self.tokens)?;
        tokens.remove(value);
        Ok(())
    }

    async fn list_tokens_for_user(&self, user_id: &str) -> Result<Vec<Token>> {
        let tokens = lock(&self.tokens)?;
        let mut result: Vec<_> = tokens
            .values()
            .filter(|token| token.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[async_trait]
impl ImageStore for MemoryStorage {
    async fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        let images = lock(&self.images)?;
        Ok(images.get(&image_id).cloned())
    }

    async fn insert_image(&self, title: &str, owner_id: &str) -> Result<Image> {
        let mut images = lock(&self.images)?;
        let mut next_image_id = lock(&self.next_image_id)?;

        *next_image_id += 1;
        let image = Image {
            id: *next_image_id,
            title: title.to_string(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };
        images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn delete_image(&self, image_id: i64) -> Result<()> {
        let mut images = lock(&self.images)?;
        images.remove(&image_id);
        Ok(())
    }

    async fn list_images_for_user(&self, owner_id: &str) -> Result<Vec<Image>> {
        let images = lock(&self.images)?;
        Ok(images
            .values()
            .filter(|image| image.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

impl Storage for MemoryStorage {}
