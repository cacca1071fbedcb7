use std::path::PathBuf;

use clap::Args;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Local file to upload
    pub file: PathBuf,
    /// Destination key
    pub key: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Put {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let file = tokio::fs::File::open(&self.file).await?;
        let length = file.metadata().await?.len();

        let uploaded = handle.upload(file, length, &self.key).await;
        or_recover(&handle, uploaded).await?;
        Ok(format!("uploaded {} bytes to {}", length, self.key))
    }
}
