use assembly_version_incrementer::{arguments::Arguments, parsers::process_file};
use clap::Parser;
use log::{LevelFilter, error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.quiet {
            LevelFilter::Off
        } else if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    info!("{} [{}]: {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), args.file);

    let diagnostics = process_file(&args.file, &args.process_options());
    diagnostics.log();

    if diagnostics.has_errors() {
        error!("Failed with errors ({})", diagnostics.error_count());
    } else {
        info!("Succeeded with ({}) warnings", diagnostics.warning_count());
    }

    ExitCode::from(diagnostics.exit_code())
}
