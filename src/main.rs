use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiffsize::convert::{self, ConvertJob};
use tiffsize::imaging::{ImageHandle, Kernel, OutputFormat, RustBackend};
use tiffsize::{config, output};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "tiffsize")]
#[command(about = "Resize an image to half width and convert it to TIFF")]
#[command(long_about = "\
Resize an image to half width and convert it to TIFF

With no arguments, `tiffsize convert` reads input.jpg, resizes it to
floor(width / 2) with a Lanczos3 kernel (height keeps the aspect ratio)
and writes output.tiff at quality 100.

Settings resolve in order: command-line flags, then tiffsize.toml, then
stock defaults. Run 'tiffsize gen-config' for a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize and re-encode one image
    Convert {
        /// Source image (default from config: input.jpg)
        input: Option<PathBuf>,
        /// Destination file (default from config: output.tiff)
        output: Option<PathBuf>,
        /// Output width as a fraction of the source width (at most 8)
        #[arg(long)]
        scale: Option<f64>,
        /// Resampling kernel: nearest, linear, cubic, gaussian, lanczos3
        #[arg(long)]
        kernel: Option<Kernel>,
        /// Output format: tiff, jpeg, png
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Encoding quality 0-100
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        quality: Option<u32>,
    },
    /// Print an image's metadata without decoding it
    Identify {
        path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock tiffsize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert {
            input,
            output: out,
            scale,
            kernel,
            format,
            quality,
        } => {
            let mut settings = config::load_config(&cli.config)?;
            if let Some(input) = input {
                settings.input = input.to_string_lossy().into_owned();
            }
            if let Some(out) = out {
                settings.output = out.to_string_lossy().into_owned();
            }
            if let Some(scale) = scale {
                settings.resize.scale = scale;
            }
            if let Some(kernel) = kernel {
                settings.resize.kernel = kernel;
            }
            if let Some(format) = format {
                settings.encode.format = format;
            }
            if let Some(quality) = quality {
                settings.encode.quality = quality;
            }
            settings.validate()?;

            let job = ConvertJob::from_config(&settings);
            let report = convert::run(&RustBackend::new(), &job)?;
            output::print_convert_output(&report);
        }
        Command::Identify { path, json } => {
            let backend = RustBackend::new();
            let metadata = ImageHandle::open(&backend, &path).metadata()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            } else {
                output::print_identify_output(&path, &metadata);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for `identify --json`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tiffsize=debug")
        } else {
            EnvFilter::new("tiffsize=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
