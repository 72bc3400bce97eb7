//! Command-line arguments for `dicomtar`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "dicomtar",
    version,
    about = "Build a byte-for-byte reproducible tar archive from a DICOM study visit directory"
)]
pub struct Cli {
    /// Directory containing the visit's DICOM and sidecar files
    pub input_dir: PathBuf,

    /// Study identifier (globally unique across the storage tree)
    #[arg(long)]
    pub study_id: String,

    /// Visit identifier (unique within the study)
    #[arg(long)]
    pub visit_id: String,

    /// Base directory for the archive (default: current directory)
    #[arg(short = 'o', long, env = "DICOMTAR_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Deprecated alias for --output-dir
    #[arg(long, conflicts_with = "output_dir")]
    pub tarball_dir: Option<PathBuf>,
}

impl Cli {
    /// Output base directory, honoring the deprecated alias.
    pub fn output_base(&self) -> PathBuf {
        self.tarball_dir
            .clone()
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_base_defaults_to_cwd() {
        let cli = Cli::parse_from(["dicomtar", "/in", "--study-id", "s", "--visit-id", "v"]);
        assert_eq!(cli.output_base(), PathBuf::from("."));
    }

    #[test]
    fn deprecated_alias_wins_when_given() {
        let cli = Cli::parse_from([
            "dicomtar",
            "/in",
            "--study-id",
            "s",
            "--visit-id",
            "v",
            "--tarball-dir",
            "/legacy",
        ]);
        assert_eq!(cli.output_base(), PathBuf::from("/legacy"));
    }

    #[test]
    fn output_dir_forms_are_mutually_exclusive() {
        let res = Cli::try_parse_from([
            "dicomtar",
            "/in",
            "--study-id",
            "s",
            "--visit-id",
            "v",
            "-o",
            "/new",
            "--tarball-dir",
            "/legacy",
        ]);
        assert!(res.is_err());
    }
}
