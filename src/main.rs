use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};

use geckodriver_install::cli::Args;
use geckodriver_install::install::{self, ArchiveExtractor, HostId, HttpTransport, report};
use geckodriver_install::{InstallerConfig, RunOptions};

fn main() {
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    match rt.block_on(real_main()) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

async fn real_main() -> Result<i32> {
    let args = Args::parse();
    let config = InstallerConfig::load(args.config.as_deref())?;
    let options = RunOptions::from_args(&args, &config);

    let transport = HttpTransport::new(&options).context("Failed to configure HTTP client")?;
    let host = HostId::detect();
    info!("Detected host platform {host}");

    let summary = match install::run(&options, &transport, &ArchiveExtractor, host).await {
        Ok(summary) => summary,
        Err(e) => {
            report::print_fatal(&e);
            return Ok(1);
        }
    };

    summary.print();
    debug!("Run finished: {:?}", summary.status);
    Ok(summary.exit_code)
}
