//! File-transfer port (C3) implementation: a plain HTTP multipart upload,
//! shared by all three printer variants (they differ only in the upload
//! URL each one's firmware exposes).

use crate::ports::FileTransfer;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;

pub(super) struct HttpFileTransfer {
    upload_url: String,
    client: reqwest::Client,
}

impl HttpFileTransfer {
    pub(super) fn new(upload_url: String) -> Self {
        Self { upload_url, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl FileTransfer for HttpFileTransfer {
    async fn upload(&self, file_name: &str, data: Bytes) -> anyhow::Result<()> {
        let part = multipart::Part::bytes(data.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("file upload failed with status {}", response.status());
        }
        Ok(())
    }
}
