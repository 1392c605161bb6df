//! Command-line interface

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::config::CliOverrides;
use crate::pipeline::default_output_path;

/// Two-letter short forms kept for compatibility with older scripts
const LEGACY_CROP_OUTLIER: &str = "-co";
const LEGACY_CROP_HEADER: &str = "-ch";
const LEGACY_CROP_FOOTER: &str = "-cf";

/// Crop the blank margins of PDF pages, judged from their rendered images
#[derive(Debug, Parser)]
#[command(name = "pdf-autocrop", about, version)]
pub struct Cli {
    /// Input PDF file
    #[arg(value_name = "INPUT", required_unless_present = "input_flag")]
    pub input: Option<PathBuf>,

    /// Input PDF file (alternative to the positional argument)
    #[arg(short = 'i', long = "input", value_name = "FILE", conflicts_with = "input")]
    pub input_flag: Option<PathBuf>,

    /// Output PDF file [default: INPUT with "-cropped" before the extension]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Remove a recurring header of up to PT points (30 if no value given;
    /// also accepted as -ch)
    #[arg(
        long,
        value_name = "PT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "30"
    )]
    pub crop_header: Option<f64>,

    /// Remove a recurring footer of up to PT points (30 if no value given;
    /// also accepted as -cf)
    #[arg(
        long,
        value_name = "PT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "30"
    )]
    pub crop_footer: Option<f64>,

    /// Pull pages that stick out of their group back to the common extent
    /// (also accepted as -co)
    #[arg(long)]
    pub crop_outlier: bool,

    /// Render resolution in DPI [default: 72]
    #[arg(short, long, value_name = "DPI")]
    pub resolution: Option<f64>,

    /// Anti-aliased rendering (slower)
    #[arg(long)]
    pub high_quality: bool,

    /// Margin on all four edges in points [default: 5]
    #[arg(short, long, value_name = "PT")]
    pub margin: Option<f64>,

    /// Left margin in points
    #[arg(long, value_name = "PT")]
    pub margin_left: Option<f64>,

    /// Right margin in points
    #[arg(long, value_name = "PT")]
    pub margin_right: Option<f64>,

    /// Top margin in points
    #[arg(long, value_name = "PT")]
    pub margin_top: Option<f64>,

    /// Bottom margin in points
    #[arg(long, value_name = "PT")]
    pub margin_bottom: Option<f64>,

    /// Extra margin on the spine side in points [default: 0]
    #[arg(long, value_name = "PT")]
    pub margin_inner: Option<f64>,

    /// Extra margin on the fore-edge side in points [default: 0]
    #[arg(long, value_name = "PT")]
    pub margin_outer: Option<f64>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads [default: number of CPUs]
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Write per-page boxes and group statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print the execution plan without processing
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse from an argument list, accepting the legacy `-co`/`-ch`/`-cf` flags
    pub fn parse_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(rewrite_legacy_args(args))
    }

    /// Fallible variant of [`Cli::parse_args`]
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(rewrite_legacy_args(args))
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref().or(self.input_flag.as_deref())
    }

    /// Explicit output path, else the input with `-cropped` inserted
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .clone()
            .or_else(|| self.input().map(default_output_path))
    }

    /// Values the user set explicitly
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            resolution_dpi: self.resolution,
            high_quality: self.high_quality.then_some(true),
            crop_header_pt: self.crop_header,
            crop_footer_pt: self.crop_footer,
            crop_outlier: self.crop_outlier.then_some(true),
            margin: self.margin,
            margin_top: self.margin_top,
            margin_bottom: self.margin_bottom,
            margin_left: self.margin_left,
            margin_right: self.margin_right,
            margin_inner: self.margin_inner,
            margin_outer: self.margin_outer,
            threads: self.threads,
        }
    }
}

/// Normalize the band and outlier flags before clap sees them.
///
/// `--crop-header`/`--crop-footer` (and `-ch`/`-cf`) take the following token
/// as their size only when it is a number, so `--crop-header book.pdf` keeps
/// `book.pdf` as the input.
fn rewrite_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut rewritten = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            rewritten.push(arg);
            rewritten.extend(args);
            break;
        }

        let band_flag = if arg == LEGACY_CROP_HEADER || arg == "--crop-header" {
            Some("--crop-header")
        } else if arg == LEGACY_CROP_FOOTER || arg == "--crop-footer" {
            Some("--crop-footer")
        } else {
            None
        };

        match band_flag {
            Some(flag) => {
                let size = args
                    .peek()
                    .and_then(|next| next.to_str())
                    .filter(|next| next.parse::<f64>().is_ok_and(f64::is_finite))
                    .map(str::to_string);
                match size {
                    Some(size) => {
                        args.next();
                        rewritten.push(OsString::from(format!("{}={}", flag, size)));
                    }
                    None => rewritten.push(OsString::from(flag)),
                }
            }
            None if arg == LEGACY_CROP_OUTLIER => {
                rewritten.push(OsString::from("--crop-outlier"));
            }
            None => rewritten.push(arg),
        }
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DEFAULT_BAND_SIZE_PT;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_args(std::iter::once("pdf-autocrop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_input() {
        let cli = parse(&["book.pdf"]);
        assert_eq!(cli.input(), Some(Path::new("book.pdf")));
        assert_eq!(cli.output_path(), Some(PathBuf::from("book-cropped.pdf")));
    }

    #[test]
    fn test_flag_input_and_output() {
        let cli = parse(&["-i", "in.pdf", "-o", "out.pdf"]);
        assert_eq!(cli.input(), Some(Path::new("in.pdf")));
        assert_eq!(cli.output_path(), Some(PathBuf::from("out.pdf")));
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_args(["pdf-autocrop"]).is_err());
        assert!(Cli::try_parse_args(["pdf-autocrop", "a.pdf", "-i", "b.pdf"]).is_err());
    }

    #[test]
    fn test_band_flags_optional_value() {
        let cli = parse(&["--crop-header", "--crop-footer", "12", "book.pdf"]);
        assert_eq!(cli.crop_header, Some(DEFAULT_BAND_SIZE_PT));
        assert_eq!(cli.crop_footer, Some(12.0));

        let cli = parse(&["book.pdf"]);
        assert_eq!(cli.crop_header, None);
    }

    #[test]
    fn test_bare_band_flag_keeps_following_input() {
        let cli = parse(&["--crop-header", "book.pdf"]);
        assert_eq!(cli.crop_header, Some(DEFAULT_BAND_SIZE_PT));
        assert_eq!(cli.input(), Some(Path::new("book.pdf")));

        let cli = parse(&["--crop-footer", "-co", "book.pdf"]);
        assert_eq!(cli.crop_footer, Some(DEFAULT_BAND_SIZE_PT));
        assert!(cli.crop_outlier);

        let cli = parse(&["--crop-header=18", "--crop-footer", "book.pdf"]);
        assert_eq!(cli.crop_header, Some(18.0));
        assert_eq!(cli.crop_footer, Some(DEFAULT_BAND_SIZE_PT));
    }

    #[test]
    fn test_legacy_band_flags() {
        let cli = parse(&["-ch", "book.pdf"]);
        assert_eq!(cli.crop_header, Some(DEFAULT_BAND_SIZE_PT));
        assert_eq!(cli.config, None);
        assert_eq!(cli.input(), Some(Path::new("book.pdf")));

        let cli = parse(&["-cf", "15", "-ch", "20", "book.pdf"]);
        assert_eq!(cli.crop_footer, Some(15.0));
        assert_eq!(cli.crop_header, Some(20.0));
        assert_eq!(cli.config, None);

        let cli = parse(&["book.pdf", "-cf"]);
        assert_eq!(cli.crop_footer, Some(DEFAULT_BAND_SIZE_PT));

        let cli = parse(&["--crop-header", "--", "-ch"]);
        assert_eq!(cli.crop_header, Some(DEFAULT_BAND_SIZE_PT));
        assert_eq!(cli.input(), Some(Path::new("-ch")));
    }

    #[test]
    fn test_legacy_crop_outlier() {
        assert!(parse(&["-co", "book.pdf"]).crop_outlier);
        assert!(parse(&["--crop-outlier", "book.pdf"]).crop_outlier);
        assert!(!parse(&["book.pdf"]).crop_outlier);
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["-vv", "book.pdf"]).verbose, 2);
        assert!(parse(&["-q", "book.pdf"]).quiet);
        assert!(Cli::try_parse_args(["pdf-autocrop", "-q", "-v", "book.pdf"]).is_err());
    }

    #[test]
    fn test_invalid_number() {
        assert!(Cli::try_parse_args(["pdf-autocrop", "-r", "fast", "book.pdf"]).is_err());
        assert!(Cli::try_parse_args(["pdf-autocrop", "-t", "-2", "book.pdf"]).is_err());
    }

    #[test]
    fn test_overrides_only_explicit_values() {
        let overrides = parse(&["book.pdf"]).to_overrides();
        assert_eq!(overrides, CliOverrides::new());

        let overrides = parse(&["-m", "0", "--margin-inner", "7", "-co", "-t", "4", "book.pdf"])
            .to_overrides();
        assert_eq!(overrides.margin, Some(0.0));
        assert_eq!(overrides.margin_inner, Some(7.0));
        assert_eq!(overrides.crop_outlier, Some(true));
        assert_eq!(overrides.threads, Some(4));
        assert_eq!(overrides.high_quality, None);
    }
}
