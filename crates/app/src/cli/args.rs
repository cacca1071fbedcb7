pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bucketfs")]
#[command(about = "Browse and manage an object store bucket as a single file-like view")]
pub struct Args {
    /// Path to the config file (defaults to ~/.bucketfs/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bucket to operate on
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "bucketfs", "ls", "--prefix", "docs/", "--bucket", "photos",
        ])
        .unwrap();
        assert_eq!(args.bucket.as_deref(), Some("photos"));
        assert!(args.config.is_none());
        match args.command {
            Command::Ls(ls) => {
                assert_eq!(ls.prefix, "docs/");
                assert!(ls.token.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_version_id_flags() {
        let args = Args::try_parse_from([
            "bucketfs",
            "--bucket",
            "photos",
            "get",
            "a.jpg",
            "/tmp/a.jpg",
            "--version-id",
            "v1",
        ])
        .unwrap();
        match args.command {
            Command::Get(get) => {
                assert_eq!(get.key, "a.jpg");
                assert_eq!(get.version_id.as_deref(), Some("v1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rm_requires_keys() {
        assert!(Args::try_parse_from(["bucketfs", "--bucket", "photos", "rm"]).is_err());
    }
}
