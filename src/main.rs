use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use fieldlines::io::FormatRegistry;
use tracing_subscriber::EnvFilter;

mod server;

/// Trace electric field lines through 2D charge layouts.
#[derive(Parser)]
#[command(name = "fieldlines")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input request file (.json, .yaml) - used when no subcommand specified
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output directory for generated files
    #[arg(short, long, global = true, default_value = "output")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace a request and write the results (default behavior)
    Generate {
        /// Input request file (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for generated files
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Output formats to write (repeatable)
        #[arg(short, long = "format", value_enum, default_values_t = [Format::Svg, Format::Json])]
        formats: Vec<Format>,
    },
    /// Check a request against the admission rules without tracing it
    Validate {
        /// Input request file (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Start development server with hot reload
    Serve {
        /// Input request file (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for generated files
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Json,
    Html,
}

impl Format {
    fn id(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Json => "json",
            Format::Html => "html",
        }
    }
}

fn generate(input: &Path, output: &Path, formats: &[Format]) -> anyhow::Result<()> {
    let ids: Vec<&str> = formats.iter().map(|f| f.id()).collect();
    let result = FormatRegistry::with_defaults().generate(input, output, &ids)?;
    let singular = result
        .field_lines
        .iter()
        .filter(|l| l.line.reaches_singularity())
        .count();
    println!(
        "Traced {} field lines ({} ending on a charge) into {}",
        result.field_lines.len(),
        singular,
        output.display()
    );
    Ok(())
}

fn check(input: &Path) -> anyhow::Result<()> {
    let simulation = FormatRegistry::with_defaults().load(input)?;
    println!(
        "{} is valid: {} charges, {} field lines",
        input.display(),
        simulation.collection.charges().len(),
        simulation.collection.total_field_lines()
    );
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fieldlines=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate {
            input,
            output,
            formats,
        }) => {
            generate(&input, &output, &formats)?;
        }
        Some(Commands::Validate { input }) => {
            check(&input)?;
        }
        Some(Commands::Serve {
            input,
            output,
            port,
        }) => {
            server::serve(&input, &output, port).await?;
        }
        None => {
            // Default behavior: generate if input provided
            if let Some(input) = cli.input {
                generate(&input, &cli.output, &[Format::Svg, Format::Json])?;
            } else {
                println!("fieldlines: no input specified. Use --help for usage.");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["fieldlines"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("output"));
        assert!(cli.input.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_generate_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldlines",
            "generate",
            "--input",
            "dipole.json",
            "--output",
            "out",
            "--format",
            "html",
            "--format",
            "svg",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate {
                input,
                output,
                formats,
            }) => {
                assert_eq!(input, PathBuf::from("dipole.json"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(formats, vec![Format::Html, Format::Svg]);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn generate_defaults_to_svg_and_json() {
        let cli = Cli::try_parse_from(["fieldlines", "generate", "-i", "dipole.json"]).unwrap();
        match cli.command {
            Some(Commands::Generate { formats, .. }) => {
                assert_eq!(formats, vec![Format::Svg, Format::Json]);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(
            Cli::try_parse_from(["fieldlines", "generate", "-i", "a.json", "--format", "png"])
                .is_err()
        );
    }

    #[test]
    fn cli_parses_validate_subcommand() {
        let cli = Cli::try_parse_from(["fieldlines", "validate", "--input", "scene.yaml"]).unwrap();
        match cli.command {
            Some(Commands::Validate { input }) => assert_eq!(input, PathBuf::from("scene.yaml")),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldlines",
            "serve",
            "--input",
            "dipole.json",
            "--port",
            "8080",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve { input, port, .. }) => {
                assert_eq!(input, PathBuf::from("dipole.json"));
                assert_eq!(port, 8080);
            }
            _ => panic!("Expected Serve command"),
        }
    }
}
