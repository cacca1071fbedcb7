use clap::Args;
use bucketfs_object_store::VersionListingPage;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Versions {
    /// Key (or key prefix) whose history to list
    #[arg(long)]
    pub key: String,

    /// Key marker printed by a previous listing
    #[arg(long)]
    pub key_marker: Option<String>,

    /// Version id marker printed by a previous listing
    #[arg(long, requires = "key_marker")]
    pub version_id_marker: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Versions {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;
        let listed = handle
            .list_object_versions(
                &self.key,
                self.key_marker.clone(),
                self.version_id_marker.clone(),
            )
            .await;
        let page = or_recover(&handle, listed).await?;
        Ok(page
            .map(|page| format_page(&page))
            .unwrap_or_else(|| "No versions found".to_string()))
    }
}

fn format_page(page: &VersionListingPage) -> String {
    let mut lines: Vec<String> = page
        .common_prefixes
        .iter()
        .map(|prefix| format!("{:<34} {:>10}  {}", "", "PRE", prefix))
        .collect();
    for version in &page.versions {
        let flag = match (version.is_latest, version.is_delete_marker) {
            (_, true) => "deleted",
            (true, false) => "latest",
            (false, false) => "",
        };
        let line = format!(
            "{:<34} {:>10}  {} {}",
            version.version_id, version.size, version.key, flag
        );
        lines.push(line.trim_end().to_string());
    }
    if let (Some(key), Some(version)) = (&page.next_key_marker, &page.next_version_id_marker) {
        lines.push(format!(
            "next markers: --key-marker {} --version-id-marker {}",
            key, version
        ));
    }
    lines.join("\n")
}
