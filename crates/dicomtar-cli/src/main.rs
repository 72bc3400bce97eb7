use clap::Parser;

mod args;
pub mod exit_codes;

use args::Cli;
use dicomtar_core::{build_archive, dest_path, DicomTimestampSource};

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if cli.tarball_dir.is_some() {
        eprintln!("warning: --tarball-dir is deprecated, use --output-dir");
    }

    anyhow::ensure!(
        cli.input_dir.is_dir(),
        "input directory does not exist or is not a directory: {}",
        cli.input_dir.display()
    );

    let dest = dest_path(&cli.output_base(), &cli.study_id, &cli.visit_id);
    tracing::debug!(dest = %dest.display(), "resolved destination");
    match build_archive(&cli.input_dir, &dest, &DicomTimestampSource) {
        Ok(summary) => {
            eprintln!(
                "archive created: {} ({} entries, {} with DICOM timestamps)",
                summary.archive.display(),
                summary.entries,
                summary.dicom_entries
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("fatal: {e}");
            Ok(exit_codes::for_error(&e))
        }
    }
}
