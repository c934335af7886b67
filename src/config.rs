use pico_args::Arguments;
use std::path::PathBuf;

const HELP: &str = "\
pix-restamp - embed capture date and GPS EXIF metadata from export sidecars

USAGE:
  pix-restamp --input-dir <DIR> [--output-dir <DIR>] [OPTIONS]

OPTIONS:
  --input-dir <DIR>    Root of the photo export (sidecar JSON files + images)
  --output-dir <DIR>   Destination for updated images
                       (required unless --overwrite or --sanity-check)
  --overwrite          Update images in place instead of copying
  --sanity-check       Report unmatched images/metadata without modifying anything
  --verbose            Enable debug logging
  -h, --help           Show this help
";

#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub sanity_check: bool,
    pub verbose: bool,
}

impl Config {
    pub fn from_args() -> Result<Self, String> {
        let mut args = Arguments::from_env();

        if args.contains(["-h", "--help"]) {
            print!("{}", HELP);
            std::process::exit(0);
        }

        Self::parse(args)
    }

    fn parse(mut args: Arguments) -> Result<Self, String> {
        let overwrite = args.contains("--overwrite");
        let sanity_check = args.contains("--sanity-check");
        let verbose = args.contains("--verbose");

        let input_dir: PathBuf = args
            .value_from_str("--input-dir")
            .map_err(|e| e.to_string())?;
        let output_dir: Option<PathBuf> = args
            .opt_value_from_str("--output-dir")
            .map_err(|e| e.to_string())?;

        let remaining = args.finish();
        if !remaining.is_empty() {
            return Err(format!("Unexpected arguments: {:?}", remaining));
        }

        if output_dir.is_none() && !overwrite && !sanity_check {
            return Err(
                "--output-dir is required unless --overwrite or --sanity-check is set".to_string(),
            );
        }

        Ok(Config {
            input_dir,
            output_dir,
            overwrite,
            sanity_check,
            verbose,
        })
    }
}
