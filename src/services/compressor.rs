use crate::error::{AppError, StartupError};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::error;

/// Seam around the external lossy PNG compressor.
///
/// `probe` runs once at startup; a missing binary is a fatal configuration
/// error, not something to discover on the first request.
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn probe(&self) -> Result<(), StartupError>;

    async fn compress(&self, input: &Path, output: &Path, quality: u8) -> Result<(), AppError>;
}

/// Invokes the `pngquant` binary (or a compatible replacement).
pub struct Pngquant {
    command: String,
}

impl Pngquant {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Compressor for Pngquant {
    async fn probe(&self) -> Result<(), StartupError> {
        let result = Command::new(&self.command).arg("--version").output().await;

        match result {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(StartupError::CompressorUnavailable(self.command.clone())),
        }
    }

    async fn compress(&self, input: &Path, output: &Path, quality: u8) -> Result<(), AppError> {
        let result = Command::new(&self.command)
            .arg(format!("--quality={}", quality))
            .arg("--speed=1")
            .arg("--force")
            .arg(input)
            .arg("--output")
            .arg(output)
            .output()
            .await?;

        if !result.status.success() {
            error!(
                "{} failed with {}: {}{}",
                self.command,
                result.status,
                String::from_utf8_lossy(&result.stdout),
                String::from_utf8_lossy(&result.stderr),
            );
            return Err(AppError::Processing(format!(
                "{} exited with {}",
                self.command, result.status
            )));
        }

        Ok(())
    }
}

/// Copies the input to the output unchanged. Used by the test suite and
/// usable in environments where pngquant is not installed.
pub struct PassthroughCompressor;

#[async_trait]
impl Compressor for PassthroughCompressor {
    async fn probe(&self) -> Result<(), StartupError> {
        Ok(())
    }

    async fn compress(&self, input: &Path, output: &Path, _quality: u8) -> Result<(), AppError> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_fails_for_missing_binary() {
        let compressor = Pngquant::new("definitely-not-a-real-binary");
        let err = compressor.probe().await.unwrap_err();
        assert!(matches!(err, StartupError::CompressorUnavailable(_)));
    }

    #[tokio::test]
    async fn test_passthrough_copies_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        tokio::fs::write(&input, b"payload").await.unwrap();

        PassthroughCompressor
            .compress(&input, &output, 80)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"payload");
    }
}
