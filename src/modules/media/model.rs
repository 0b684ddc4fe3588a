use serde::Serialize;

use crate::{constants::Env, modules::message::schema::MessageType};

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Where uploads land on disk and how they are addressed afterwards.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub upload_dir: String,
    pub base_url: String,
}

impl UploadConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            upload_dir: env.upload_dir.clone(),
            base_url: env.media_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            upload_dir: "./uploads".to_string(),
            base_url: "/uploads".to_string(),
        }
    }
}

/// Ready to be sent as the single content element of a media message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaUploaded {
    pub url: String,
    pub message_type: MessageType,
}

/// A previously uploaded file read back from disk.
#[derive(Debug)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
