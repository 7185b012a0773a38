/*!
 * upypack CLI - Command Line Interface
 *
 * Validate an existing MicroPython package.json against a package descriptor,
 * print the derived manifest, or create it next to the descriptor.
 */

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use upypack::{
    config::{LogLevel, ToolConfig},
    error::{Result, UpyError, EXIT_SUCCESS},
    logging::{self, LogSettings},
    manifest::render_json,
    Packager, ValidationOptions,
};

#[derive(Parser)]
#[command(name = "upypack")]
#[command(
    version,
    about = "Create or validate a MicroPython package.json from a package descriptor",
    long_about = None
)]
struct Cli {
    /// Path to the package descriptor (TOML or JSON)
    #[arg(long = "setup-file", alias = "descriptor", value_name = "PATH", value_parser = existing_file)]
    setup_file: PathBuf,

    /// Path to the package.json manifest
    #[arg(long = "package-file", alias = "manifest", value_name = "PATH", value_parser = existing_file)]
    package_file: Option<PathBuf>,

    /// Path to the package changelog; its latest release sets the version
    #[arg(long = "package-changelog-file", alias = "changelog", value_name = "PATH", value_parser = existing_file)]
    package_changelog_file: Option<PathBuf>,

    /// Write the derived manifest to the manifest path or next to the descriptor
    #[arg(long = "create")]
    create: bool,

    /// Validate the existing manifest against the descriptor
    #[arg(long = "validate")]
    validate: bool,

    /// Exclude version from validation
    #[arg(long = "ignore-version")]
    ignore_version: bool,

    /// Exclude dependencies from validation
    #[arg(long = "ignore-deps")]
    ignore_deps: bool,

    /// Exclude boot.py and main.py entries from validation
    #[arg(long = "ignore-boot-main")]
    ignore_boot_main: bool,

    /// Print the derived manifest as JSON to stdout
    #[arg(long = "print")]
    print: bool,

    /// Indent JSON output by 4 spaces
    #[arg(long = "pretty")]
    pretty: bool,

    /// Emit diagnostics to stderr
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Increase diagnostic verbosity (-vv warnings, -vvv info, -vvvv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Configuration file (TOML)
    #[arg(long = "config", value_name = "FILE", value_parser = existing_file)]
    config: Option<PathBuf>,

    /// Write diagnostics to a file instead of stderr
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn existing_file(arg: &str) -> std::result::Result<PathBuf, String> {
    let path = Path::new(arg);
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(format!("The file {} does not exist!", arg))
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref config_path) => ToolConfig::from_file(config_path)?,
        None => ToolConfig::default(),
    };

    // Override config with CLI arguments
    if cli.verbosity > 0 {
        config.log_level = LogLevel::from_verbosity(cli.verbosity);
    }
    config.debug |= cli.debug;
    config.pretty |= cli.pretty;
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }

    if let Err(e) = logging::init_logging(&LogSettings::from_config(&config)) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let packager = Packager::builder(&cli.setup_file)
        .manifest_path(cli.package_file.as_ref())
        .changelog_path(cli.package_changelog_file.as_ref())
        .config(&config)
        .build()?;

    if cli.validate {
        let options = ValidationOptions::new()
            .ignore_version(cli.ignore_version)
            .ignore_deps(cli.ignore_deps)
            .ignore_boot_main(cli.ignore_boot_main);

        if !packager.validate(&options)? {
            let diff = packager.validation_diff()?;
            write_stdout(&render_json(&diff, config.pretty)?)?;
            return Err(UpyError::ValidationMismatch);
        }
        tracing::info!("{} matches the descriptor", display_manifest(&packager));
    }

    if cli.print {
        let manifest = packager.package_data()?;
        write_stdout(&manifest.to_json(config.pretty)?)?;
    }

    if cli.create {
        let path = packager.create(None, config.pretty)?;
        tracing::info!("Created {}", path.display());
    }

    Ok(())
}

fn display_manifest(packager: &Packager) -> String {
    packager
        .manifest_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "manifest".to_string())
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
