use clap::Args;
use common::prelude::folder_key;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Folder to create, e.g. `reports` or `reports/2024`
    pub name: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mkdir {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let created = handle.new_folder(&self.name).await;
        or_recover(&handle, created).await?;
        Ok(format!("created {}", folder_key(&self.name)))
    }
}
