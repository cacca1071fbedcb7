use clap::Args;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

/// Rename a key. Copies then deletes; a failed delete leaves both keys behind.
#[derive(Args, Debug, Clone)]
pub struct Mv {
    pub from: String,
    pub to: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mv {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let renamed = handle.rename_object(&self.from, &self.to).await;
        or_recover(&handle, renamed).await?;
        Ok(format!("moved {} -> {}", self.from, self.to))
    }
}
