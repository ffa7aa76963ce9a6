//! pptx-mcp - PowerPoint tool server and command-line tools
//!
//! Without a subcommand the binary runs the stdio tool server. Every tool is
//! also available as a subcommand for use from a shell.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidedeck::create::PresentationSpec;
use slidedeck::inventory::JsonFormat;
use slidedeck::{archive, create, inventory, mcp, rearrange, replace, thumbnail};
use slidedeck::{ExternalTools, McpServer, ServerConfig, ThumbnailOptions};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PPTX_MCP_LOG";

/// PowerPoint creation, inspection and editing tools
#[derive(Parser)]
#[command(
    name = "pptx-mcp",
    author = "iyulab",
    version,
    about = "PowerPoint tools over the Model Context Protocol",
    long_about = "pptx-mcp - create, inspect and edit PowerPoint presentations.\n\n\
                  Runs a JSON-RPC tool server on stdin/stdout when no subcommand is given."
)]
struct Cli {
    /// LibreOffice executable used for thumbnails and pack validation
    #[arg(long, global = true, env = "SOFFICE_PATH")]
    soffice: Option<PathBuf>,

    /// pdftoppm executable used for thumbnails
    #[arg(long, global = true, env = "PDFTOPPM_PATH")]
    pdftoppm: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tool server on stdin/stdout (default)
    Serve,

    /// Create a presentation from a JSON description
    Create {
        /// JSON file with `layout` and `slides`
        spec: PathBuf,

        /// Output .pptx path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the text shapes of a presentation as JSON
    #[command(visible_alias = "inv")]
    Inventory {
        /// Input .pptx file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only include shapes with overflow or overlap issues
        #[arg(long)]
        issues_only: bool,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Replace shape text from a JSON file or inline JSON
    Replace {
        /// Input .pptx file
        input: PathBuf,

        /// Replacement JSON file, or inline JSON
        replacements: String,

        /// Output .pptx path
        #[arg(short, long)]
        output: PathBuf,

        /// Leave text of shapes that are not listed untouched
        #[arg(long)]
        keep_unlisted: bool,
    },

    /// Reorder, duplicate and delete slides
    Rearrange {
        /// Template .pptx file
        template: PathBuf,

        /// Comma-separated 0-based slide indices, e.g. 0,3,3,1
        sequence: String,

        /// Output .pptx path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render slide thumbnails into grid images
    Thumbnail {
        /// Input .pptx file
        input: PathBuf,

        /// Output path prefix
        #[arg(short, long, default_value = "thumbnails")]
        prefix: String,

        /// Grid columns (3-6)
        #[arg(long, default_value = "5")]
        cols: u32,

        /// Outline text shapes in red
        #[arg(long)]
        outline: bool,
    },

    /// Extract an Office document into a directory
    Unpack {
        /// Input .docx, .pptx or .xlsx file
        input: PathBuf,

        /// Output directory
        output_dir: PathBuf,
    },

    /// Pack a directory into an Office document
    Pack {
        /// Unpacked document directory
        input_dir: PathBuf,

        /// Output .docx, .pptx or .xlsx path
        output: PathBuf,

        /// Check the result converts with LibreOffice
        #[arg(long)]
        validate: bool,
    },

    /// Check an unpacked Office document
    Validate {
        /// Unpacked document directory
        unpacked_dir: PathBuf,

        /// Original document, used to pick the checks
        original: PathBuf,

        /// Also list checks that passed
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the tool definitions as JSON
    Tools,

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let serving = matches!(cli.command, None | Some(Commands::Serve));
    init_logging(if serving { "info" } else { "warn" });

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs always go to stderr; stdout carries protocol messages.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn server_config(cli: &Cli) -> ServerConfig {
    let mut tools = ExternalTools::detect();
    if let Some(path) = &cli.soffice {
        tools = tools.with_soffice(path);
    }
    if let Some(path) = &cli.pdftoppm {
        tools = tools.with_pdftoppm(path);
    }
    ServerConfig::default().with_tools(tools)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = server_config(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!(
                soffice = ?config.tools.soffice,
                pdftoppm = ?config.tools.pdftoppm,
                "external tools"
            );
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(McpServer::new(config).run_stdio())?;
        }

        Commands::Create { spec, output } => {
            let pb = create_spinner("Building presentation...");
            let spec: PresentationSpec = serde_json::from_str(&fs::read_to_string(&spec)?)?;
            let message = create::create_presentation(&output, &spec)?;
            pb.finish_and_clear();
            println!("{} {}", "✓".green().bold(), message);
        }

        Commands::Inventory {
            input,
            output,
            issues_only,
            compact,
        } => {
            let pb = create_spinner("Reading presentation...");
            let inv = inventory::extract_text_inventory(&input, issues_only)?;
            pb.finish_and_clear();

            match output {
                Some(path) => {
                    let summary = inventory::save_inventory(&inv, &path)?;
                    println!("{} {}", "✓".green().bold(), summary);
                }
                None => {
                    let format = if compact {
                        JsonFormat::Compact
                    } else {
                        JsonFormat::Pretty
                    };
                    write_stdout(&inventory::to_json(&inv, format)?)?;
                }
            }
        }

        Commands::Replace {
            input,
            replacements,
            output,
            keep_unlisted,
        } => {
            let pb = create_spinner("Applying replacements...");
            let value = replace::load_replacements(&replacements)?;
            replace::apply_replacements(&input, &value, &output, !keep_unlisted)?;
            pb.finish_and_clear();
            println!(
                "{} Applied replacements: {}",
                "✓".green().bold(),
                output.display()
            );
        }

        Commands::Rearrange {
            template,
            sequence,
            output,
        } => {
            let pb = create_spinner("Rearranging slides...");
            let sequence = rearrange::parse_sequence(&sequence)?;
            rearrange::rearrange_presentation(&template, &output, &sequence)?;
            pb.finish_and_clear();
            println!(
                "{} Rearranged {} slides: {}",
                "✓".green().bold(),
                sequence.len(),
                output.display()
            );
        }

        Commands::Thumbnail {
            input,
            prefix,
            cols,
            outline,
        } => {
            let pb = create_spinner("Rendering slides...");
            let options = ThumbnailOptions::new()
                .with_prefix(prefix)
                .with_cols(cols)
                .with_outlines(outline);
            let paths = thumbnail::create_thumbnail_grids(&input, &options, &config.tools)?;
            pb.finish_and_clear();
            println!("{} {}", "✓".green().bold(), thumbnail::summary(&paths));
        }

        Commands::Unpack { input, output_dir } => {
            let pb = create_spinner("Unpacking document...");
            let message = archive::unpack_document(&input, &output_dir)?;
            pb.finish_and_clear();
            println!("{} {}", "✓".green().bold(), message);
        }

        Commands::Pack {
            input_dir,
            output,
            validate,
        } => {
            let pb = create_spinner("Packing document...");
            let packed = archive::pack_document(&input_dir, &output, validate, &config)?;
            pb.finish_and_clear();
            if !packed {
                return Err("Validation failed. Document may be corrupt.".into());
            }
            println!("{} Packed document: {}", "✓".green().bold(), output.display());
            if !validate {
                println!("{} Validation was skipped", "!".yellow().bold());
            }
        }

        Commands::Validate {
            unpacked_dir,
            original,
            verbose,
        } => {
            let (passed, messages) = archive::validate_document(&unpacked_dir, &original, verbose)?;
            if passed {
                println!("{} All validations PASSED!", "✓".green().bold());
            } else {
                println!("{} Validation FAILED:", "✗".red().bold());
            }
            for message in &messages {
                println!("{}", message);
            }
            if !passed {
                std::process::exit(1);
            }
        }

        Commands::Tools => {
            write_stdout(&serde_json::to_string_pretty(&mcp::tool_definitions())?)?;
        }

        Commands::Version => {
            print_version(&config);
        }
    }

    Ok(())
}

fn print_version(config: &ServerConfig) {
    println!("{} {}", "pptx-mcp".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PowerPoint tools over the Model Context Protocol");
    println!();
    println!("Protocol: {}", mcp::PROTOCOL_VERSION);
    println!("Tools: {}", mcp::tool_definitions().len());
    println!(
        "soffice: {}",
        config
            .tools
            .soffice
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not found".yellow().to_string())
    );
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_stdout(content: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["pptx-mcp"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["pptx-mcp", "rearrange", "in.pptx", "0,1", "-o", "out.pptx"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Rearrange { .. })));
    }
}
