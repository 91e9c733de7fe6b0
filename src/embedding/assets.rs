//! Locating (and, when configured, downloading) the encoder's model artifacts.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::config::EncoderConfig;
use super::error::EmbeddingError;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Optional subdirectory holding a separate response tower (`config.json` + weights).
pub const RESPONSE_TOWER_DIR: &str = "response";

pub const MODEL_FILES: [&str; 3] = [CONFIG_FILE, WEIGHTS_FILE, TOKENIZER_FILE];

/// Files from [`MODEL_FILES`] absent in `dir`.
pub fn missing_files(dir: &Path) -> Vec<&'static str> {
    MODEL_FILES
        .into_iter()
        .filter(|file| !dir.join(file).is_file())
        .collect()
}

/// Returns the response tower directory if one is present next to the model.
pub fn response_tower_dir(model_dir: &Path) -> Option<PathBuf> {
    let dir = model_dir.join(RESPONSE_TOWER_DIR);
    (dir.join(CONFIG_FILE).is_file() && dir.join(WEIGHTS_FILE).is_file()).then_some(dir)
}

/// Ensures every model file exists in `config.model_dir`, fetching missing ones from
/// `config.model_url` when set.
///
/// Uses a blocking HTTP client; call from a blocking context.
pub fn resolve_model_dir(config: &EncoderConfig) -> Result<PathBuf, EmbeddingError> {
    let dir = &config.model_dir;
    let missing = missing_files(dir);
    if missing.is_empty() {
        debug!(model_dir = %dir.display(), "Model artifacts present");
        return Ok(dir.clone());
    }

    let Some(base_url) = config.model_url.as_deref() else {
        return Err(EmbeddingError::ModelNotFound {
            path: dir.join(missing[0]),
        });
    };

    fs::create_dir_all(dir)?;

    let client = reqwest::blocking::Client::builder()
        .timeout(config.download_timeout)
        .build()
        .map_err(|e| EmbeddingError::DownloadFailed {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

    for file in missing {
        download_file(&client, &artifact_url(base_url, file), &dir.join(file))?;
    }

    Ok(dir.clone())
}

/// `{base_url}/{file}` with exactly one slash between them.
pub fn artifact_url(base_url: &str, file: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), file)
}

pub(crate) fn download_file(
    client: &reqwest::blocking::Client,
    url: &str,
    target: &Path,
) -> Result<(), EmbeddingError> {
    info!(url, target = %target.display(), "Downloading model artifact");

    let download_err = |reason: String| EmbeddingError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let mut response = client.get(url).send().map_err(|e| download_err(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_err(format!("unexpected status {status}")));
    }

    // Write beside the target first so an interrupted download never looks complete.
    let partial = partial_path(target);
    let result = stream_to_file(&partial, target, |file| {
        response
            .copy_to(file)
            .map_err(|e| download_err(e.to_string()))
    });

    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            warn!(path = %partial.display(), error = %e, "Failed to remove partial download");
        }
    }

    let bytes = result?;
    debug!(bytes, target = %target.display(), "Model artifact stored");
    Ok(())
}

fn partial_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{file_name}.partial"))
}

/// Streams into `partial` through `copy`, then renames it over `target`.
///
/// Leaves cleanup of `partial` to the caller.
fn stream_to_file<F>(partial: &Path, target: &Path, copy: F) -> Result<u64, EmbeddingError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<u64, EmbeddingError>,
{
    let mut writer = BufWriter::new(File::create(partial)?);
    let bytes = copy(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(partial, target)?;
    Ok(bytes)
}
