use clap::{ArgAction, Parser};

use crate::parsers::ProcessOptions;
use crate::version::Increment;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Increment Product, Assembly, and File versions for specified C# project. \
             Works with both SDK-style .csproj files and legacy AssemblyInfo.cs files. \
             Exit codes: 0 = success, 1 = errors, 78 = warnings",
    bin_name = "avi"
)]
pub struct Arguments {
    /// The file to process
    #[arg(long, short)]
    pub file: String,
    /// Zero-based index of the version segment to increment, e.g. 1 turns '1.2.3' into '1.3.3'
    #[arg(long = "set-increment-position", visible_alias = "sip")]
    pub increment_position: usize,
    /// How much to add to the selected version segment
    #[arg(
        long = "set-increment-by",
        visible_alias = "sib",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub increment_by: i32,
    /// Set a specific version instead of incrementing (e.g. '1.2.3')
    #[arg(long = "set-version", visible_alias = "sv", default_value = "")]
    pub set_version: String,
    /// Keep the old version of the file as a timestamped backup
    #[arg(long, short, action = ArgAction::Set, default_value_t = true)]
    pub backup: bool,
    /// Quiet operation - do not print messages
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,
    #[arg(long, short)]
    pub verbose: bool,
}

impl Arguments {
    pub fn process_options(&self) -> ProcessOptions {
        let mut increment = Increment::new(self.increment_position, self.increment_by);
        if !self.set_version.trim().is_empty() {
            increment = increment.with_set_version(self.set_version.as_str());
        }
        ProcessOptions {
            increment,
            backup: self.backup,
        }
    }
}
