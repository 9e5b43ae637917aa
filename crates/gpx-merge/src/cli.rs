use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPX Merge - Merge GPX files from many devices into one deduplicated document
pub struct Settings {
    /// JSON configuration file (input pattern, encoding, output folder)
    #[clap(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output file name, overriding `outputFile` from the configuration
    #[clap(short, long, value_name = "NAME")]
    pub output_file: Option<String>,

    /// Also write the run statistics as JSON to this path
    #[clap(long, value_name = "PATH")]
    pub stats_json: Option<PathBuf>,

    /// Re-read the written document with a strict GPX parser and log what it contains
    #[clap(long, default_value = "false")]
    pub verify: bool,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}

/// Parses from the command line arguments.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}
