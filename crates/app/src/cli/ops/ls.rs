use clap::Args;
use bucketfs_object_store::ListingEntry;
use futures::TryStreamExt;

use crate::cli::op::{or_recover, BucketOpError, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Prefix to list (defaults to the bucket root)
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Continuation token printed by a previous listing
    #[arg(long, conflicts_with = "all")]
    pub token: Option<String>,

    /// Follow continuation tokens to the end of the listing
    #[arg(long)]
    pub all: bool,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = BucketOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let handle = ctx.open_bucket()?;

        if self.all {
            let listed = handle
                .list_all_objects(&self.prefix)
                .try_collect::<Vec<_>>()
                .await;
            let entries = or_recover(&handle, listed).await?;
            return Ok(format_entries(&entries, None));
        }

        let listed = handle.list_objects(&self.prefix, self.token.clone()).await;
        let page = or_recover(&handle, listed).await?;
        Ok(format_entries(
            &page.entries,
            page.next_continuation_token.as_deref(),
        ))
    }
}

fn format_entries(entries: &[ListingEntry], next_token: Option<&str>) -> String {
    if entries.is_empty() {
        return "No objects found".to_string();
    }
    let mut lines: Vec<String> = entries
        .iter()
        .map(|entry| match entry {
            ListingEntry::Prefix(prefix) => format!("{:>10}  {}", "PRE", prefix),
            ListingEntry::Object(object) => format!("{:>10}  {}", object.size, object.key),
        })
        .collect();
    if let Some(token) = next_token {
        lines.push(format!("next token: {}", token));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketfs_object_store::ObjectSummary;

    #[test]
    fn test_format_entries() {
        let entries = vec![
            ListingEntry::Prefix("docs/".to_string()),
            ListingEntry::Object(ObjectSummary {
                key: "a.txt".to_string(),
                size: 12,
                last_modified: None,
                e_tag: None,
            }),
        ];
        assert_eq!(
            format_entries(&entries, Some("tok")),
            "       PRE  docs/\n        12  a.txt\nnext token: tok"
        );
        assert_eq!(format_entries(&[], None), "No objects found");
    }
}
