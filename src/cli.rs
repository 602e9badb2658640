use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(flatten)]
    pub overrides: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Values taking precedence over the config file.
#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the config file
    #[clap(long, global = true, default_value = "urlcard.yaml")]
    pub config: PathBuf,

    /// Site content directory
    #[clap(long, global = true)]
    pub content_root: Option<PathBuf>,

    /// Directory holding the metadata cache
    #[clap(long, global = true)]
    pub cache_root: Option<PathBuf>,

    /// Image used for pages without one (url or path)
    #[clap(long, global = true)]
    pub default_image: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the thumbnail and metadata directories
    Init {},

    /// Replace bare url paragraphs with cards.
    /// Reads stdin and writes stdout when no file is given.
    Render {
        /// Rendered html files
        files: Vec<PathBuf>,

        /// Overwrite each file with its result
        #[clap(short, long, default_value = "false", conflicts_with = "out_dir")]
        in_place: bool,

        /// Write results into this directory, keeping file names
        #[clap(short, long)]
        out_dir: Option<PathBuf>,

        /// Documents rendered concurrently
        #[clap(short = 'j', long)]
        parallelism: Option<usize>,
    },

    /// Print the cache slug of a url
    Slug {
        #[clap(allow_hyphen_values = true)]
        url: String,
    },

    /// Print the cached metadata document of a url
    Show {
        #[clap(allow_hyphen_values = true)]
        url: String,
    },

    /// List the slugs present in the cache
    List {},
}
