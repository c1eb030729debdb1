use std::env;
use std::path::PathBuf;

/// Runtime configuration for the optimization pipeline
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP listener binds to (default: 60031)
    pub port: u16,

    /// Directory staged and optimized files are written to (default: "uploads")
    pub upload_dir: PathBuf,

    /// Name of the external lossy PNG compressor binary (default: "pngquant")
    pub compressor_cmd: String,

    /// Maximum accepted request body size in bytes (default: 64 MB)
    pub max_upload_bytes: usize,

    /// Retain staged and optimized files after the response is sent
    /// (default: false, files are deleted on every exit path)
    pub keep_files: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 60031,
            upload_dir: PathBuf::from("uploads"),
            compressor_cmd: "pngquant".to_string(),
            max_upload_bytes: 64 * 1024 * 1024, // 64 MB
            keep_files: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PIXELPRESS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("PIXELPRESS_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            compressor_cmd: env::var("PIXELPRESS_COMPRESSOR").unwrap_or(default.compressor_cmd),

            max_upload_bytes: env::var("PIXELPRESS_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_bytes),

            keep_files: env::var("PIXELPRESS_KEEP_FILES")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.keep_files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 60031);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.compressor_cmd, "pngquant");
        assert_eq!(config.max_upload_bytes, 64 * 1024 * 1024);
        assert!(!config.keep_files);
    }
}
