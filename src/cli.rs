use clap::Parser;
use std::path::PathBuf;

use crate::manifest;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Build manifest (.json) naming every document to compile
    #[arg(default_value = manifest::FILE_NAME)]
    pub manifest: PathBuf,
}
