use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nametag",
    bin_name = "nametag",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Tag images by renaming them: `sunset @beach @vacation.jpg`", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for the image and tag stores (overrides config)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the default nametag.toml
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the images of a directory with their tags
    #[command(alias = "ls")]
    List {
        /// Directory to load
        dir: PathBuf,

        /// Only show images holding this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List every image that has ever been tagged
    Tracked,

    /// Add tags to an image
    Tag {
        /// Directory holding the image
        dir: PathBuf,

        /// Image file name (tagged or untagged form)
        file: String,

        /// Tags to add (space or comma separated)
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Remove tags from an image
    Untag {
        /// Directory holding the image
        dir: PathBuf,

        /// Image file name (tagged or untagged form)
        file: String,

        /// Tags to remove (space or comma separated)
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Manage the tag table
    #[command(subcommand)]
    Tags(TagsAction),

    /// Show the previous names of an image
    History {
        /// Directory holding the image
        dir: PathBuf,

        /// Image file name (tagged or untagged form)
        file: String,
    },

    /// Rename an image back to one of its previous names
    Revert {
        /// Directory holding the image
        dir: PathBuf,

        /// Image file name (tagged or untagged form)
        file: String,

        /// Previous name, without extension (see `nametag history`)
        old_name: String,
    },

    /// Move an image to another directory
    #[command(alias = "mv")]
    Move {
        /// Directory holding the image
        dir: PathBuf,

        /// Image file name (tagged or untagged form)
        file: String,

        /// Destination directory
        dest: PathBuf,
    },

    /// Show the rename audit log
    Log {
        /// Only show the last N renames
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Check tracked images against the disk
    Doctor {
        /// Forget tracked images that no longer exist
        #[arg(long)]
        fix: bool,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum TagsAction {
    /// List all tags with usage counts
    #[command(alias = "ls")]
    List,

    /// Create a tag
    Create {
        /// Tag name (a leading @ is ignored)
        name: String,
    },

    /// Delete tags, removing them from every image
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tag_command() {
        let cli = Cli::parse_from(["nametag", "tag", "/pics", "vacation.jpg", "beach", "sunset"]);
        match cli.command {
            Commands::Tag { dir, file, tags } => {
                assert_eq!(dir, PathBuf::from("/pics"));
                assert_eq!(file, "vacation.jpg");
                assert_eq!(tags, vec!["beach", "sunset"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn tag_requires_tags() {
        assert!(Cli::try_parse_from(["nametag", "tag", "/pics", "vacation.jpg"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["nametag", "tags", "list", "--data-dir", "/tmp/d", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(matches!(cli.command, Commands::Tags(TagsAction::List)));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
