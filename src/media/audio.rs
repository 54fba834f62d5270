use crate::config::AudioConfig;
use crate::error::{MemoriaError, Result};
use crate::providers::AudioEncoding;
use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Audio bytes ready for recognition
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAudio {
    pub content: Vec<u8>,
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
}

/// Guess the recognizer encoding from a file extension
///
/// Anything unrecognised is sent as LINEAR16.
pub fn guess_encoding(extension: &str) -> AudioEncoding {
    match extension.trim_start_matches('.').to_lowercase().as_str() {
        "mp3" | "mpeg" => AudioEncoding::Mp3,
        "flac" => AudioEncoding::Flac,
        "ogg" => AudioEncoding::OggOpus,
        _ => AudioEncoding::Linear16,
    }
}

/// Stage an upload on disk and convert it to mono WAV when possible
///
/// The upload is written to a temporary file carrying the original
/// extension. With a converter configured, a mono WAV at the configured
/// sample rate is written to a second temporary file and sent as LINEAR16.
/// Without one, or when conversion fails, the original bytes are sent with an
/// encoding guessed from the extension. Both temporary files are removed when
/// this returns, on success and on error.
pub async fn prepare_audio(
    upload: &[u8],
    file_name: &str,
    config: &AudioConfig,
) -> Result<PreparedAudio> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    let staged = tempfile::Builder::new()
        .prefix("memoria-audio-")
        .suffix(&extension)
        .tempfile()
        .map_err(|e| MemoriaError::Audio(format!("Failed to create temporary file: {}", e)))?;
    tokio::fs::write(staged.path(), upload).await?;
    tracing::debug!(
        "Staged {} bytes of audio at {}",
        upload.len(),
        staged.path().display()
    );

    if let Some(converter) = config.converter.as_deref() {
        match convert_to_wav(converter, &staged, config.sample_rate_hertz).await {
            Ok(content) => {
                return Ok(PreparedAudio {
                    content,
                    encoding: AudioEncoding::Linear16,
                    sample_rate_hertz: config.sample_rate_hertz,
                })
            }
            Err(e) => tracing::warn!("Audio conversion failed: {}. Using original format.", e),
        }
    } else {
        tracing::warn!("No audio converter configured, using original audio format");
    }

    let content = tokio::fs::read(staged.path()).await?;
    Ok(PreparedAudio {
        content,
        encoding: guess_encoding(&extension),
        sample_rate_hertz: config.sample_rate_hertz,
    })
}

async fn convert_to_wav(
    converter: &str,
    input: &NamedTempFile,
    sample_rate_hertz: u32,
) -> Result<Vec<u8>> {
    let converted = tempfile::Builder::new()
        .prefix("memoria-audio-")
        .suffix(".converted.wav")
        .tempfile()
        .map_err(|e| MemoriaError::Audio(format!("Failed to create temporary file: {}", e)))?;

    let output = Command::new(converter)
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input.path())
        .args(["-ac", "1"])
        .args(["-ar", &sample_rate_hertz.to_string()])
        .args(["-f", "wav"])
        .arg(converted.path())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| MemoriaError::Audio(format!("failed to run `{}`: {}", converter, e)))?;

    if !output.status.success() {
        return Err(MemoriaError::Audio(format!(
            "`{}` exited with {}: {}",
            converter,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
        .into());
    }

    let content = tokio::fs::read(converted.path()).await?;
    if content.is_empty() {
        return Err(MemoriaError::Audio("converter produced no audio".to_string()).into());
    }
    Ok(content)
}
