// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the all-MiniLM-L6-v2 embedding model.
//!
//! Files land under a `.part` name and are renamed into place only once
//! fully written, so an interrupted download never looks like a model.

use std::path::{Path, PathBuf};

use batsignal_core::BatsignalError;
use tracing::info;

/// INT8-quantized sentence-transformer graph.
pub const MODEL_URL: &str =
    "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
pub const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Locates, and on request fetches, the model files in one directory.
#[derive(Debug, Clone)]
pub struct ModelManager {
    model_dir: PathBuf,
    model_url: String,
    tokenizer_url: String,
}

impl ModelManager {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            model_url: MODEL_URL.to_string(),
            tokenizer_url: TOKENIZER_URL.to_string(),
        }
    }

    /// Fetches from a mirror instead of Hugging Face.
    pub fn with_sources(mut self, model_url: impl Into<String>, tokenizer_url: impl Into<String>) -> Self {
        self.model_url = model_url.into();
        self.tokenizer_url = tokenizer_url.into();
        self
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    /// True when both files are present.
    pub fn is_model_available(&self) -> bool {
        self.model_path().is_file() && self.tokenizer_path().is_file()
    }

    /// Downloads whichever files are missing. A no-op once both exist.
    pub async fn ensure_model(&self) -> Result<(), BatsignalError> {
        if self.is_model_available() {
            return Ok(());
        }

        info!(dir = %self.model_dir.display(), "embedding model not found, downloading");
        tokio::fs::create_dir_all(&self.model_dir)
            .await
            .map_err(BatsignalError::storage)?;

        for (filename, url) in [
            (MODEL_FILE, self.model_url.as_str()),
            (TOKENIZER_FILE, self.tokenizer_url.as_str()),
        ] {
            let dest = self.model_dir.join(filename);
            if dest.is_file() {
                continue;
            }
            let partial = self.model_dir.join(format!("{filename}.part"));
            match download_file(url, &partial).await {
                Ok(size) => {
                    tokio::fs::rename(&partial, &dest)
                        .await
                        .map_err(BatsignalError::storage)?;
                    info!(file = filename, bytes = size, "downloaded model file");
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(e);
                }
            }
        }

        info!(dir = %self.model_dir.display(), "embedding model ready");
        Ok(())
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<usize, BatsignalError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| BatsignalError::Knowledge(format!("failed to download {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BatsignalError::Knowledge(format!(
            "download of {url} failed with status {status}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| BatsignalError::Knowledge(format!("failed to read {url}: {e}")))?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(BatsignalError::storage)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mirrored(server: &MockServer, dir: &Path) -> ModelManager {
        ModelManager::new(dir).with_sources(
            format!("{}/model_quantized.onnx", server.uri()),
            format!("{}/tokenizer.json", server.uri()),
        )
    }

    #[test]
    fn files_live_directly_in_model_dir() {
        let mgr = ModelManager::new("/srv/batsignal/models/all-MiniLM-L6-v2");
        assert_eq!(
            mgr.model_path(),
            PathBuf::from("/srv/batsignal/models/all-MiniLM-L6-v2/model.onnx")
        );
        assert_eq!(
            mgr.tokenizer_path(),
            PathBuf::from("/srv/batsignal/models/all-MiniLM-L6-v2/tokenizer.json")
        );
    }

    #[test]
    fn missing_files_are_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = ModelManager::new(tmp.path());
        assert!(!mgr.is_model_available());

        std::fs::write(mgr.model_path(), b"graph").unwrap();
        assert!(!mgr.is_model_available(), "tokenizer is still missing");
    }

    #[tokio::test]
    async fn downloads_both_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/model_quantized.onnx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"graph".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tokenizer.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let mgr = mirrored(&server, &tmp.path().join("models"));
        mgr.ensure_model().await.unwrap();
        assert!(mgr.is_model_available());
        assert_eq!(std::fs::read(mgr.model_path()).unwrap(), b"graph");

        // A second call finds both files and fetches nothing.
        mgr.ensure_model().await.unwrap();
    }

    #[tokio::test]
    async fn failed_download_leaves_no_partial_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/model_quantized.onnx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"graph".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tokenizer.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let mgr = mirrored(&server, tmp.path());
        let err = mgr.ensure_model().await.unwrap_err();
        assert!(matches!(err, BatsignalError::Knowledge(_)), "got {err:?}");
        assert!(err.to_string().contains("404"));

        assert!(mgr.model_path().is_file());
        assert!(!mgr.tokenizer_path().exists());
        assert!(!tmp.path().join("tokenizer.json.part").exists());
    }
}
