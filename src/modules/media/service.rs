use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{
    api::error::{self, ChatError},
    modules::{
        media::model::{MediaUploaded, StoredFile, UploadConfig},
        message::schema::MessageType,
    },
};

/// Message type a stored file will be sent as, or `None` when the type is not accepted.
pub fn classify(mime_type: &str) -> Option<MessageType> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    if essence.starts_with("image/") {
        Some(MessageType::Image)
    } else if essence.starts_with("audio/") {
        Some(MessageType::Audio)
    } else if essence == "application/pdf" {
        Some(MessageType::Pdf)
    } else {
        None
    }
}

/// Names produced by the upload path: a UUID plus an optional alphanumeric extension.
fn is_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

#[derive(Clone)]
pub struct MediaService {
    config: UploadConfig,
}

impl MediaService {
    pub fn new(config: UploadConfig) -> Self {
        log::info!("MediaService storing uploads under {}", config.upload_dir);
        Self { config }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    /// Resolve the declared content type, falling back to the file extension.
    pub fn resolve_mime(&self, declared: Option<&str>, original_filename: &str) -> String {
        match declared {
            Some(mime) if mime != mime_guess::mime::APPLICATION_OCTET_STREAM.essence_str() => {
                mime.to_string()
            }
            _ => mime_guess::from_path(original_filename).first_or_octet_stream().to_string(),
        }
    }

    fn generate_filename(original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("");
        let id = Uuid::now_v7();
        if extension.is_empty() { id.to_string() } else { format!("{id}.{extension}") }
    }

    pub async fn store(
        &self,
        original_filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<MediaUploaded, error::SystemError> {
        let message_type = classify(mime_type).ok_or_else(|| {
            ChatError::FileUpload(format!("File type '{mime_type}' is not allowed").into())
        })?;

        if bytes.is_empty() {
            return Err(ChatError::FileUpload("File is empty".into()).into());
        }
        if bytes.len() > self.config.max_file_size {
            return Err(ChatError::FileUpload(
                format!("File exceeds {} bytes", self.config.max_file_size).into(),
            )
            .into());
        }

        let filename = Self::generate_filename(original_filename);
        let path: PathBuf = Path::new(&self.config.upload_dir).join(&filename);

        let written = async {
            tokio::fs::create_dir_all(&self.config.upload_dir).await?;
            tokio::fs::write(&path, bytes).await
        }
        .await;

        if let Err(e) = written {
            log::error!("Failed to write upload {}: {}", path.display(), e);
            return Err(ChatError::FileUpload("Could not store file".into()).into());
        }

        log::info!("Stored {} ({} bytes) as {}", original_filename, bytes.len(), filename);

        Ok(MediaUploaded { url: format!("{}/{}", self.config.base_url, filename), message_type })
    }

    /// Read back a stored upload by the file name its URL ends with.
    pub async fn load(&self, name: &str) -> Result<StoredFile, error::SystemError> {
        if !is_stored_name(name) {
            return Err(error::SystemError::not_found("File not found"));
        }

        let path = Path::new(&self.config.upload_dir).join(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(error::SystemError::not_found("File not found"));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        Ok(StoredFile { bytes, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (MediaService, PathBuf) {
        let dir = std::env::temp_dir().join(format!("chat-media-{}", Uuid::now_v7()));
        let config = UploadConfig {
            max_file_size: 16,
            upload_dir: dir.to_string_lossy().into_owned(),
            base_url: "https://cdn.example.com/media".into(),
        };
        (MediaService::new(config), dir)
    }

    #[test]
    fn classifies_accepted_types() {
        assert_eq!(classify("image/png"), Some(MessageType::Image));
        assert_eq!(classify("audio/webm; codecs=opus"), Some(MessageType::Audio));
        assert_eq!(classify("application/pdf"), Some(MessageType::Pdf));
        assert_eq!(classify("text/plain"), None);
        assert_eq!(classify("application/zip"), None);
    }

    #[test]
    fn octet_stream_falls_back_to_extension() {
        let (svc, _) = service();
        assert_eq!(svc.resolve_mime(Some("application/octet-stream"), "cat.png"), "image/png");
        assert_eq!(svc.resolve_mime(None, "doc.pdf"), "application/pdf");
        assert_eq!(svc.resolve_mime(Some("audio/ogg"), "voice.bin"), "audio/ogg");
    }

    #[actix_web::test]
    async fn stores_file_under_generated_name() {
        let (svc, dir) = service();

        let uploaded = svc.store("cat.png", "image/png", b"\x89PNG....").await.unwrap();
        assert_eq!(uploaded.message_type, MessageType::Image);
        assert!(uploaded.url.starts_with("https://cdn.example.com/media/"));
        assert!(uploaded.url.ends_with(".png"));

        let name = uploaded.url.rsplit('/').next().unwrap();
        let on_disk = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(on_disk, b"\x89PNG....");

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[actix_web::test]
    async fn rejects_wrong_type_and_oversized_files() {
        let (svc, _) = service();

        let err = svc.store("notes.txt", "text/plain", b"hi").await.unwrap_err();
        assert!(matches!(err.chat(), Some(ChatError::FileUpload(_))));

        let err = svc.store("big.pdf", "application/pdf", &[0u8; 17]).await.unwrap_err();
        assert!(matches!(err.chat(), Some(ChatError::FileUpload(_))));
    }

    #[test]
    fn only_generated_names_are_served() {
        assert!(is_stored_name("0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b.png"));
        assert!(is_stored_name("0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b"));
        assert!(!is_stored_name(""));
        assert!(!is_stored_name(".."));
        assert!(!is_stored_name("../secret.png"));
        assert!(!is_stored_name("..%2Fsecret"));
        assert!(!is_stored_name("a/b.png"));
        assert!(!is_stored_name("a\\b.png"));
        assert!(!is_stored_name(".env"));
    }

    #[actix_web::test]
    async fn stored_file_can_be_loaded_by_url_name() {
        let (svc, dir) = service();

        let uploaded = svc.store("doc.pdf", "application/pdf", b"%PDF-1.7").await.unwrap();
        let name = uploaded.url.rsplit('/').next().unwrap();

        let file = svc.load(name).await.unwrap();
        assert_eq!(file.bytes, b"%PDF-1.7");
        assert_eq!(file.content_type, "application/pdf");

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[actix_web::test]
    async fn loading_outside_the_upload_dir_is_not_found() {
        let (svc, dir) = service();
        let outside = dir.with_extension("secret");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(&outside, b"hidden").await.unwrap();

        let escape = format!("../{}", outside.file_name().unwrap().to_string_lossy());
        let err = svc.load(&escape).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));

        let err = svc.load("0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b.png").await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));

        tokio::fs::remove_file(outside).await.ok();
        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
