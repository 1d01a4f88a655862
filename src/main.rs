use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fglscope::analysis::analyze;
use fglscope::config::Config;
use fglscope::export::{self, ExportFormat, ReportData};
use fglscope::locate::find_definition;
use fglscope::outline;
use fglscope::workspace::{analyze_path, read_source};

#[derive(Parser)]
#[command(name = "fglscope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Outline and unused-variable analyzer for Genero/Informix 4GL sources", long_about = None)]
struct Cli {
    /// Config file (defaults to fglscope.json in the analyzed directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutlineFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the scope tree of a source file
    Outline {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutlineFormat,
    },
    /// Report unused variables in a file or directory
    Check {
        /// File or directory to analyze (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: text, json, csv, markdown
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find the FUNCTION or REPORT a word refers to
    Definition {
        word: String,

        /// File the word appears in
        #[arg(long)]
        file: PathBuf,

        /// Line the word appears on (1-based)
        #[arg(long, default_value_t = 1)]
        line: usize,

        /// Directory searched for other source files
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Re-check a file whenever it changes
    #[cfg(feature = "watch-mode")]
    Watch { file: PathBuf },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fglscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Directory whose `fglscope.json` applies to `path`.
fn config_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn load_config(explicit: Option<&Path>, analyzed: &Path) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load(path)?,
        None => Config::discover(&config_root(analyzed))?,
    };
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Outline { file, format }) => {
            let text = read_source(&file)?;
            let tree = analyze(&text).tree;
            match format {
                OutlineFormat::Text => print!("{}", outline::render(&tree)),
                OutlineFormat::Json => {
                    let json = serde_json::to_string_pretty(&tree)
                        .context("Failed to serialize scope tree")?;
                    println!("{}", json);
                }
            }
        }
        Some(Commands::Check {
            path,
            format,
            output,
        }) => {
            let config = load_config(cli.config.as_deref(), &path)?;
            let reports = analyze_path(&path, &config)
                .with_context(|| format!("Failed to analyze {}", path.display()))?;
            let data = ReportData::new(reports);

            match output {
                Some(out) => {
                    let mut file = fs::File::create(&out)
                        .with_context(|| format!("Failed to create {}", out.display()))?;
                    export::export(format, &data, &mut file)?;
                    eprintln!(
                        "Wrote {} finding(s) to {}",
                        data.diagnostic_count(),
                        out.display()
                    );
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    export::export(format, &data, &mut handle)?;
                    handle.flush()?;
                }
            }
        }
        Some(Commands::Definition {
            word,
            file,
            line,
            root,
        }) => {
            let root = root.unwrap_or_else(|| config_root(&file));
            let config = load_config(cli.config.as_deref(), &root)?;
            let text = read_source(&file)?;
            match find_definition(
                &word,
                line.saturating_sub(1),
                &file,
                &text,
                &root,
                &config.workspace,
            ) {
                Some(location) => println!("{}:{}", location.path.display(), location.line + 1),
                None => {
                    eprintln!("No definition found for '{}'", word);
                    std::process::exit(1);
                }
            }
        }
        #[cfg(feature = "watch-mode")]
        Some(Commands::Watch { file }) => {
            let config = load_config(cli.config.as_deref(), &file)?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(async {
                let watched = fglscope::watch::watch_file(file, config, |report| {
                    let data = ReportData::new(vec![report.clone()]);
                    if data.diagnostic_count() == 0 {
                        println!("{}: no unused variables", report.path.display());
                    } else if let Err(e) =
                        export::export(ExportFormat::Text, &data, &mut io::stdout())
                    {
                        tracing::warn!("Failed to print report: {}", e);
                    }
                });
                tokio::select! {
                    result = watched => result.map_err(anyhow::Error::from),
                    _ = tokio::signal::ctrl_c() => Ok(()),
                }
            })?;
        }
        Some(Commands::Version) => {
            println!("fglscope v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("fglscope - Genero 4GL outline and unused-variable analyzer");
            println!("Run 'fglscope check <path>' to report unused variables");
            println!("Run 'fglscope --help' for more information");
        }
    }

    Ok(())
}
