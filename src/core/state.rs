use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::media::MediaStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    media: MediaStore,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, media: MediaStore) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, media }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}
