use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Hard cap on an uploaded file, enforced while draining the multipart
/// stream.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Process-wide configuration, resolved once at startup and injected into the
/// handlers via `web::Data` rather than read from globals.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub bind_address: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let model_path =
            PathBuf::from(env::var("MODEL_PATH").unwrap_or_else(|_| "bloodcell.onnx".to_string()));
        let static_dir =
            PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));
        let upload_dir = static_dir.join("uploads");
        let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        let bind_address = format!("0.0.0.0:{}", port);
        Self {
            model_path,
            static_dir,
            upload_dir,
            bind_address,
        }
    }

    pub fn ensure_upload_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.upload_dir)
    }
}
