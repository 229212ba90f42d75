use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "geckodriver-install")]
#[command(version, about = "Install the Geckodriver binary")]
pub struct Args {
    /// Release tag to install (defaults to the latest GitHub release)
    #[arg(id = "release", value_name = "VERSION")]
    pub version: Option<String>,

    /// Install a Geckodriver binary for every OS
    #[arg(long)]
    pub all: bool,

    /// The proxy to download the binary through (example: "tcp://127.0.0.1:9000")
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Bypass SSL certificate verification when installing through a proxy
    #[arg(long)]
    pub ssl_no_verify: bool,

    /// Directory path to store binaries in
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}
