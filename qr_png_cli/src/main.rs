use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use qr_png::matrix::EcLevel;
use qr_png::{write_png, RasterParams};

use crate::error::CliError;

mod error;

/// Encode text as a QR code and save it as a grayscale PNG
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Text to encode, passed to the encoder byte for byte
    text: OsString,

    /// Destination PNG file
    output: PathBuf,

    /// Pixels per module [default: 10], read like C atoi, values below 1 are raised to 1
    #[arg(allow_negative_numbers = true)]
    scale: Option<String>,

    /// Quiet zone width in modules [default: 4], read like C atoi, negative values are raised to 0
    #[arg(allow_negative_numbers = true)]
    margin: Option<String>,

    /// Ignored
    #[arg(hide = true)]
    _extra: Vec<OsString>,

    /// Error correction level (L, M, Q or H)
    #[arg(long, default_value_t = EcLevel::M)]
    ec_level: EcLevel,
}

impl Args {
    fn params(&self) -> RasterParams {
        let scale = self
            .scale
            .as_deref()
            .map_or(i64::from(RasterParams::DEFAULT_SCALE), leading_int);
        let margin = self
            .margin
            .as_deref()
            .map_or(i64::from(RasterParams::DEFAULT_MARGIN), leading_int);

        RasterParams::clamped(scale, margin)
    }
}

/// Reads a number the way C `atoi` does: leading whitespace, an optional
/// sign, then as many digits as follow. No digits reads as 0.
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[derive(Debug)]
struct Saved {
    path: PathBuf,
    side: u32,
}

impl fmt::Display for Saved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QR code saved to {} ({}x{} pixels)",
            self.path.display(),
            self.side,
            self.side
        )
    }
}

fn run<I, T>(argv: I) -> Result<Saved, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::try_parse_from(argv)?;
    let params = args.params();

    info!("Settings: {:?}, level {}", params, args.ec_level);

    let side = write_png(args.text.as_encoded_bytes(), &args.output, args.ec_level, params)?;

    Ok(Saved {
        path: args.output,
        side,
    })
}

fn main() -> ExitCode {
    env_logger::init();

    match run(std::env::args_os()) {
        Ok(saved) => {
            println!("{saved}");
            ExitCode::SUCCESS
        }
        Err(CliError::Usage(err)) => {
            // help goes to stdout, usage errors to stderr
            let _ = err.print();
            CliError::Usage(err).exit_code()
        }
        Err(err) => {
            debug!("{:?}", err);
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("qr_png_cli_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["qr_png", "hello", "out.png"]).unwrap();

        assert_eq!(args.text, OsString::from("hello"));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert_eq!(args.params(), RasterParams::new(10, 4));
        assert_eq!(args.ec_level, EcLevel::M);
    }

    #[test_case(&["qr_png", "t", "o.png", "0"], 1, 4 ; "zero scale")]
    #[test_case(&["qr_png", "t", "o.png", "3", "-5"], 3, 0 ; "negative margin")]
    #[test_case(&["qr_png", "t", "o.png", "-2", "-1"], 1, 0 ; "both negative")]
    #[test_case(&["qr_png", "t", "o.png", "7", "2"], 7, 2 ; "explicit")]
    #[test_case(&["qr_png", "t", "o.png", "abc"], 1, 4 ; "non numeric scale")]
    #[test_case(&["qr_png", "t", "o.png", "3px", "2mm"], 3, 2 ; "trailing garbage")]
    #[test_case(&["qr_png", "t", "o.png", "5", "x"], 5, 0 ; "non numeric margin")]
    #[test_case(&["qr_png", "t", "o.png", "1", "0", "extra", "more"], 1, 0 ; "extra arguments ignored")]
    fn test_clamping(argv: &[&str], scale: u32, margin: u32) {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();

        assert_eq!(args.params(), RasterParams { scale, margin });
    }

    #[test_case("42", 42)]
    #[test_case("  +7", 7)]
    #[test_case("-5", -5)]
    #[test_case("3px", 3)]
    #[test_case("abc", 0)]
    #[test_case("", 0)]
    #[test_case("-", 0)]
    #[test_case("99999999999999999999999", i64::MAX)]
    fn test_leading_int(input: &str, expected: i64) {
        assert_eq!(leading_int(input), expected);
    }

    #[test]
    fn test_ec_level_flag() {
        let args = Args::try_parse_from(["qr_png", "t", "o.png", "--ec-level", "H"]).unwrap();
        assert_eq!(args.ec_level, EcLevel::H);

        let err = Args::try_parse_from(["qr_png", "t", "o.png", "--ec-level", "Z"]).unwrap_err();
        assert_eq!(CliError::Usage(err).exit_code(), ExitCode::FAILURE);
    }

    #[test]
    fn test_missing_output_is_usage_error() {
        let err = run(["qr_png", "only text"]).unwrap_err();

        assert_eq!(err.exit_code(), ExitCode::FAILURE);
        match err {
            CliError::Usage(err) => {
                assert!(err.use_stderr());
                let message = err.to_string();
                assert!(message.contains("Usage:"));
                assert!(message.contains("<OUTPUT>"));
            }
            other => panic!("expected a usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_odd_numbers_still_write_png() {
        let path = temp_path("odd_numbers.png");
        let saved = run([
            OsString::from("qr_png"),
            OsString::from("A"),
            path.clone().into_os_string(),
            OsString::from("abc"),
            OsString::from("0"),
            OsString::from("extra"),
        ])
        .unwrap();

        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(saved.side, 21);
    }

    #[test]
    fn test_help_exits_zero() {
        let err = run(["qr_png", "--help"]).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_run_writes_png() {
        let path = temp_path("run.png");
        let saved = run([
            OsString::from("qr_png"),
            OsString::from("A"),
            path.clone().into_os_string(),
            OsString::from("0"),
            OsString::from("-5"),
        ])
        .unwrap();

        let img = image::open(&path).unwrap().into_luma8();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(saved.side, 21);
        assert_eq!(saved.path, path);
        assert_eq!(img.dimensions(), (21, 21));
        assert_eq!(
            saved.to_string(),
            format!("QR code saved to {} (21x21 pixels)", path.display())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_text() {
        use std::os::unix::ffi::OsStringExt;

        let path = temp_path("non_utf8.png");
        let saved = run([
            OsString::from("qr_png"),
            OsString::from_vec(vec![0xff, 0xfe, b'A']),
            path.clone().into_os_string(),
            OsString::from("1"),
            OsString::from("0"),
        ])
        .unwrap();

        std::fs::remove_file(&path).unwrap();
        assert_eq!(saved.side, 21);
    }

    #[test]
    fn test_encode_failure() {
        let path = temp_path("empty.png");
        let err = run([
            OsString::from("qr_png"),
            OsString::from(""),
            path.clone().into_os_string(),
        ])
        .unwrap_err();

        assert!(matches!(err, CliError::Encode(_)));
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_fails() {
        let path = temp_path("missing_dir").join("out.png");
        let err = run([
            OsString::from("qr_png"),
            OsString::from("A"),
            path.into_os_string(),
        ])
        .unwrap_err();

        assert!(matches!(err, CliError::Save(_)));
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
        assert!(err.to_string().starts_with("Failed to save PNG file"));
    }
}
