use std::path::PathBuf;

use clap::Args;
use tokio::io::AsyncWriteExt;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Key to download
    pub key: String,
    /// Local destination file (overwritten)
    pub file: PathBuf,
    /// Download this version instead of the latest
    #[arg(long)]
    pub version_id: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let file = tokio::fs::File::create(&self.file).await?;

        let downloaded = handle
            .download(&self.key, self.version_id.as_deref(), file)
            .await;
        let mut file = or_recover(&handle, downloaded).await?;
        file.flush().await?;
        Ok(format!("downloaded {} to {}", self.key, self.file.display()))
    }
}
