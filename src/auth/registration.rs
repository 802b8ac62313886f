//! User and OAuth client registration.

use chrono::Utc;
use url::Url;

use crate::auth::passwords::{generate_salt, hash_password};
use crate::auth::types::{Client, User, generate_client_id, generate_client_secret};
use crate::errors::{RegistrationError, StorageError};
use crate::storage::traits::{ClientStore, UserStore};

const MAX_FIELD_LENGTH: usize = 255;

/// `[a-zA-Z0-9_-]{1,255}`
pub fn is_valid_user_id(id: &str) -> bool {
    (1..=MAX_FIELD_LENGTH).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// `[ a-zA-Z0-9_.-]{1,255}`
pub fn is_valid_user_name(name: &str) -> bool {
    (1..=MAX_FIELD_LENGTH).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-'))
}

/// Redirect URIs must be absolute `http`/`https` URLs without a fragment.
pub fn validate_redirect_uri(redirect_uri: &str) -> Result<Url, RegistrationError> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| RegistrationError::InvalidRedirectUri(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RegistrationError::InvalidRedirectUri(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(RegistrationError::InvalidRedirectUri(
            "missing host".to_string(),
        ));
    }
    if url.fragment().is_some() {
        return Err(RegistrationError::InvalidRedirectUri(
            "fragments are not allowed".to_string(),
        ));
    }

    Ok(url)
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, RegistrationError> {
    if value.is_empty() {
        Err(RegistrationError::MissingParameter(name))
    } else {
        Ok(value)
    }
}

/// Register a password user
pub async fn register_user<S>(
    store: &S,
    id: &str,
    name: &str,
    password: &str,
) -> Result<User, RegistrationError>
where
    S: UserStore + Sync + ?Sized,
{
    let id = required(id, "id")?;
    let name = required(name.trim(), "name")?;
    let password = required(password, "password")?;

    if !is_valid_user_id(id) {
        return Err(RegistrationError::InvalidUserId);
    }
    if !is_valid_user_name(name) {
        return Err(RegistrationError::InvalidUserName);
    }

    let password_salt = generate_salt();
    let password_hash = hash_password(&password_salt, password);
    let user = User {
        id: id.to_string(),
        name: name.to_string(),
        password_salt,
        password_hash,
        created_at: Utc::now(),
    };

    store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "registered user");
    Ok(user)
}

/// Register an OAuth client. The returned value carries the secret, which
/// is shown to the caller exactly once.
pub async fn register_client<S>(
    store: &S,
    name: &str,
    redirect_uri: &str,
) -> Result<Client, RegistrationError>
where
    S: ClientStore + Sync + ?Sized,
{
    let name = required(name.trim(), "name")?;
    let redirect_uri = required(redirect_uri.trim(), "redirect_uri")?;
    validate_redirect_uri(redirect_uri)?;

    let secret = generate_client_secret();
    loop {
        let client = Client {
            id: generate_client_id(),
            name: name.to_string(),
            redirect_uri: redirect_uri.to_string(),
            secret: secret.clone(),
            created_at: Utc::now(),
        };

        match store.insert_client(&client).await {
            Ok(()) => {
                tracing::info!(client_id = %client.id, "registered client");
                return Ok(client);
            }
            Err(StorageError::Conflict(_)) => {
                tracing::debug!("client id collision, regenerating");
            }
            Err(err) => return Err(RegistrationError::Storage(err)),
        }
    }
}
