use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Suffix appended to the staged path to form the optimized path.
const OPTIMIZED_SUFFIX: &str = "-optimized.png";

/// A staged upload and its derived optimized path, scoped to one request.
///
/// Unless `keep` is set, both files are removed when the value is dropped,
/// on success and failure alike, so the uploads directory never accumulates
/// intermediates.
pub struct StagedImage {
    staged: PathBuf,
    optimized: PathBuf,
    keep: bool,
}

impl StagedImage {
    /// Write `bytes` under `upload_dir` as `<unix-nanos>_<sanitized-name>`,
    /// creating the directory if needed.
    pub async fn create(
        upload_dir: &Path,
        original_name: &str,
        bytes: &[u8],
        keep: bool,
    ) -> io::Result<Self> {
        tokio::fs::create_dir_all(upload_dir).await?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let staged = upload_dir.join(format!("{}_{}", nanos, sanitize_filename(original_name)));
        tokio::fs::write(&staged, bytes).await?;

        let optimized = optimized_path(&staged);
        Ok(Self {
            staged,
            optimized,
            keep,
        })
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    pub fn optimized_path(&self) -> &Path {
        &self.optimized
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for path in [&self.staged, &self.optimized] {
            if let Err(e) = std::fs::remove_file(path) {
                // The optimized file never exists when the pipeline failed
                // before the compressor ran.
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("failed to remove {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn optimized_path(staged: &Path) -> PathBuf {
    let mut os = staged.as_os_str().to_owned();
    os.push(OPTIMIZED_SUFFIX);
    PathBuf::from(os)
}

/// Strip any path components and replace separator or control characters,
/// so a client-supplied filename can never escape the uploads directory.
fn sanitize_filename(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename(""), "unnamed");
    }

    #[test]
    fn test_sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("a:b*c.png"), "a_b_c.png");
    }

    #[test]
    fn test_optimized_path_suffix() {
        let p = optimized_path(Path::new("uploads/123_cat.png"));
        assert_eq!(p, PathBuf::from("uploads/123_cat.png-optimized.png"));
    }

    #[tokio::test]
    async fn test_drop_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();

        let staged = StagedImage::create(dir.path(), "cat.png", b"not a real png", false)
            .await
            .unwrap();
        let staged_path = staged.staged_path().to_path_buf();
        let optimized_path = staged.optimized_path().to_path_buf();
        tokio::fs::write(&optimized_path, b"optimized").await.unwrap();

        assert!(staged_path.exists());
        drop(staged);
        assert!(!staged_path.exists());
        assert!(!optimized_path.exists());
    }

    #[tokio::test]
    async fn test_keep_retains_files() {
        let dir = tempfile::tempdir().unwrap();

        let staged = StagedImage::create(dir.path(), "cat.png", b"bytes", true)
            .await
            .unwrap();
        let staged_path = staged.staged_path().to_path_buf();

        drop(staged);
        assert!(staged_path.exists());
    }
}
