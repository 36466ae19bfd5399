use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use saz2har::logging::init_logging;
use saz2har::{Converter, ConverterConfig};

#[derive(Parser)]
#[command(name = "saz2har", version)]
#[command(about = "Convert a Fiddler session archive (.saz) into a HAR file.", long_about = None)]
struct Cli {
    /// Session archive to convert.
    source: PathBuf,
    /// Password of an encrypted archive.
    #[arg(short, long)]
    password: Option<String>,
    /// Output file (defaults to <SOURCE>.har).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write indented JSON.
    #[arg(short, long, default_value_t = false)]
    indented: bool,
    /// Do not print the banner.
    #[arg(long, default_value_t = false)]
    no_logo: bool,
    /// Converter settings (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Log every exchange.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.no_logo {
        eprintln!(
            "saz2har {} - Fiddler archive to HAR converter",
            env!("CARGO_PKG_VERSION")
        );
    }

    let config = match &cli.config {
        Some(path) => ConverterConfig::from_file(path),
        None => ConverterConfig::default(),
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.source));

    let converter = Converter::open(&cli.source, cli.password, config)
        .with_context(|| format!("open {}", cli.source.display()))?;
    let har = converter
        .convert()
        .with_context(|| format!("convert {}", cli.source.display()))?;

    let file = File::create(&output).with_context(|| format!("create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    har.write_to(&mut writer, cli.indented)
        .with_context(|| format!("write {}", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("write {}", output.display()))?;

    tracing::info!("wrote {}", output.display());
    Ok(())
}

fn default_output_path(source: &Path) -> PathBuf {
    let mut path = source.as_os_str().to_owned();
    path.push(".har");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["saz2har", "in.saz", "-p", "pw", "-o", "out.har", "-i", "--no-logo"]);
        assert_eq!(cli.source, PathBuf::from("in.saz"));
        assert_eq!(cli.password.as_deref(), Some("pw"));
        assert_eq!(cli.output, Some(PathBuf::from("out.har")));
        assert!(cli.indented);
        assert!(cli.no_logo);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("dir/session.saz")),
            PathBuf::from("dir/session.saz.har")
        );
    }
}
