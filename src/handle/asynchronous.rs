//! Asynchronous keyset storage over tokio readers and writers.
//!
//! 基于 tokio 读写器的异步 Keyset 存储。

use super::KeysetHandle;
use crate::error::Result;
use crate::primitives::Aead;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

impl KeysetHandle {
    /// Asynchronous counterpart of [`KeysetHandle::read`].
    ///
    /// [`KeysetHandle::read`] 的异步版本。
    pub async fn read_async<R: AsyncRead + Unpin>(
        mut reader: R,
        master_aead: Option<&dyn Aead>,
    ) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Self::from_stored_bytes(&bytes, master_aead, None)
    }

    /// Asynchronous counterpart of [`KeysetHandle::write`].
    pub async fn write_async<W: AsyncWrite + Unpin>(
        &self,
        mut writer: W,
        master_aead: Option<&dyn Aead>,
    ) -> Result<()> {
        let bytes = self.to_stored_bytes(master_aead, &[])?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
