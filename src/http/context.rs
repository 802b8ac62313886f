//! Application state shared by every request handler.

use minijinja::Environment;
use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::storage::{ImageFiles, Storage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Template engine for rendering XML responses.
    pub templates: Arc<Environment<'static>>,
    /// Credential and image metadata storage
    pub storage: Arc<dyn Storage>,
    /// JPEG bytes on disk
    pub image_files: Arc<ImageFiles>,
    /// Resolves `Authorization` headers against `storage`
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        templates: Arc<Environment<'static>>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let image_files = Arc::new(ImageFiles::new(config.upload_path.as_ref()));
        let authenticator = Authenticator::new(storage.clone());
        Self {
            config,
            templates,
            storage,
            image_files,
            authenticator,
        }
    }
}
