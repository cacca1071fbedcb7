use clap::Args;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Keys to delete in one batch
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let deleted = handle.delete_objects(&self.keys).await;
        or_recover(&handle, deleted).await?;
        Ok(format!("deleted {} object(s)", self.keys.len()))
    }
}
