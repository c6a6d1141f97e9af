//! File-transfer port (C3): an opaque HTTP upload channel whose lifecycle
//! is tied to the owning session. The core neither introspects it nor
//! mediates its traffic.

use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn upload(&self, file_name: &str, data: Bytes) -> anyhow::Result<()>;
}
