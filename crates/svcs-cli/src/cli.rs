use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use svcs_types::HashAlgorithm;

#[derive(Parser)]
#[command(
    name = "svcs",
    about = "svcs: content-addressable object store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory
    #[arg(short, long, global = true, default_value = ".svcs")]
    pub root: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or open) a store
    Init(InitArgs),
    /// Print the digest of a file or stdin without storing it
    HashObject(HashObjectArgs),
    /// Store a file or stdin and print its digest
    Write(WriteArgs),
    /// Print the raw bytes of an object
    Cat(CatArgs),
    /// Report whether an object is present
    Exists(ExistsArgs),
    /// Store a message as an object
    Commit(CommitArgs),
    /// List every stored object
    List,
    /// Re-hash every object and report corruption
    Fsck,
}

#[derive(Args)]
pub struct InitArgs {
    /// Hash algorithm for a new store
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
    /// Shard objects into `objects/<2 hex>/<rest>`
    #[arg(long)]
    pub sharded: bool,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// File to hash; reads stdin when omitted
    pub path: Option<PathBuf>,
    /// Override the algorithm (defaults to the store's, or sha1)
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct WriteArgs {
    /// File to store; reads stdin when omitted
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CatArgs {
    pub digest: String,
    /// Re-hash the content and fail if it no longer matches
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args)]
pub struct ExistsArgs {
    pub digest: String,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_defaults() {
        let cli = Cli::try_parse_from(["svcs", "init"]).unwrap();
        assert_eq!(cli.root, PathBuf::from(".svcs"));
        if let Command::Init(args) = cli.command {
            assert!(args.algorithm.is_none());
            assert!(!args.sharded);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_init_with_algorithm() {
        let cli = Cli::try_parse_from(["svcs", "init", "--algorithm", "sha256", "--sharded"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.algorithm, Some(HashAlgorithm::Sha256));
            assert!(args.sharded);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_init_rejects_unknown_algorithm() {
        assert!(Cli::try_parse_from(["svcs", "init", "--algorithm", "md5"]).is_err());
    }

    #[test]
    fn parse_commit() {
        let cli = Cli::try_parse_from(["svcs", "commit", "-m", "Initial commit"]).unwrap();
        if let Command::Commit(args) = cli.command {
            assert_eq!(args.message, "Initial commit");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_commit_requires_message() {
        assert!(Cli::try_parse_from(["svcs", "commit"]).is_err());
    }

    #[test]
    fn parse_hash_object_stdin() {
        let cli = Cli::try_parse_from(["svcs", "hash-object"]).unwrap();
        if let Command::HashObject(args) = cli.command {
            assert!(args.path.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_cat_verify() {
        let cli = Cli::try_parse_from(["svcs", "cat", "--verify", "abc"]).unwrap();
        if let Command::Cat(args) = cli.command {
            assert!(args.verify);
            assert_eq!(args.digest, "abc");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_root_after_subcommand() {
        let cli = Cli::try_parse_from(["svcs", "list", "--root", "/tmp/store"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/tmp/store"));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["svcs", "--verbose", "fsck"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["svcs", "--format", "json", "exists", "abc"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
