use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::config::Settings;

/// Profile images live on local disk under the configured media root; the
/// database stores only the relative path.
pub(crate) struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self { root: PathBuf::from(&settings.media().root) }
    }

    /// Store avatar bytes under a fresh UUID name, keeping the original
    /// extension. Returns the relative path to persist.
    pub(crate) async fn save_avatar(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        let stored_name = format!("{}.{extension}", Uuid::new_v4());
        let directory = self.root.join("avatars");
        tokio::fs::create_dir_all(&directory).await?;
        tokio::fs::write(directory.join(&stored_name), bytes).await?;

        Ok(format!("avatars/{stored_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_avatar_writes_file_and_returns_relative_path() {
        let root = std::env::temp_dir().join(format!("examdesk-media-{}", Uuid::new_v4()));
        let store = MediaStore { root: root.clone() };

        let relative = store.save_avatar("portrait.PNG", b"not-really-a-png").await.unwrap();
        assert!(relative.starts_with("avatars/"));
        assert!(relative.ends_with(".png"));

        let written = tokio::fs::read(root.join(&relative)).await.unwrap();
        assert_eq!(written, b"not-really-a-png");

        tokio::fs::remove_dir_all(root).await.unwrap();
    }
}
