use clap::Args;

use crate::cli::op::{BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Url {
    pub key: String,
    /// Link to this version instead of the latest
    #[arg(long)]
    pub version_id: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Url {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let url = handle.generate_url(&self.key, self.version_id.as_deref())?;
        Ok(url.to_string())
    }
}
