//! fhirconnect-nav CLI - Go to Definition and Find Usages for FHIR-Connect YAML

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use fhirconnect_nav::{
    locate_anchor, offset_to_position, position_to_offset, Anchor, Candidate, NavConfig,
    NavigationOutcome, NavigationSink, Navigator, Position, RelationshipCategory, Resolver,
    Symbol, WorkspaceScanner,
};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fhirconnect-nav")]
#[command(about = "Go to Definition and Find Usages for FHIR-Connect YAML mappings")]
#[command(version)]
struct Cli {
    /// Configuration file (default: .fhirconnect-nav.{yaml,yml,json} in the root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Navigate from a position, as a click in an editor would
    Goto {
        /// FHIR-Connect YAML file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long)]
        line: u32,

        /// Column number (1-based)
        #[arg(long)]
        column: u32,

        /// Workspace root (default: the file's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Destination to take when several qualify (1-based)
        #[arg(long)]
        pick: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List documents related to a symbol
    Candidates {
        /// Workspace root
        #[arg(long)]
        root: PathBuf,

        /// File the request comes from; never listed
        #[arg(long)]
        file: PathBuf,

        /// Symbol to look for
        #[arg(long)]
        symbol: String,

        /// Clicked categories (metadataName, slotArchetype, archetypes, start, ...)
        #[arg(long, value_delimiter = ',', required = true)]
        category: Vec<RelationshipCategory>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Locate a symbol inside one document
    Locate {
        /// FHIR-Connect YAML file
        file: PathBuf,

        /// Symbol to look for
        #[arg(long)]
        symbol: String,

        /// Relationship whose pattern is used
        #[arg(long)]
        category: RelationshipCategory,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show how a position would be interpreted
    Click {
        /// FHIR-Connect YAML file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long)]
        line: u32,

        /// Column number (1-based)
        #[arg(long)]
        column: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the YAML documents of a workspace
    Scan {
        /// Workspace root
        root: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config;

    match cli.command {
        Command::Goto {
            file,
            line,
            column,
            root,
            pick,
            format,
        } => {
            let root = root.unwrap_or_else(|| parent_dir(&file));
            let config = load_config(config_path.as_deref(), &root)?;
            let content = read_file(&file)?;
            let offset = cursor_offset(&content, line, column)?;

            let mut sink = CliSink { pick };
            let navigator = Navigator::new(Resolver::new(config));
            let outcome = navigator.navigate(&root, &file, &content, offset, &mut sink)?;

            match format {
                OutputFormat::Text => match &outcome {
                    NavigationOutcome::Opened(anchor) => println!("{}", anchor_line(anchor)),
                    NavigationOutcome::NotNavigable => println!("Nothing to navigate at this position"),
                    NavigationOutcome::NoCandidates => println!("No destinations found"),
                    NavigationOutcome::NotLocated(candidate) => println!(
                        "Symbol not found in {}",
                        candidate.path.display()
                    ),
                    NavigationOutcome::Cancelled => println!("Cancelled"),
                },
                OutputFormat::Json => {
                    let value = match &outcome {
                        NavigationOutcome::Opened(anchor) => {
                            serde_json::json!({ "outcome": "opened", "anchor": anchor })
                        }
                        NavigationOutcome::NotNavigable => {
                            serde_json::json!({ "outcome": "not_navigable" })
                        }
                        NavigationOutcome::NoCandidates => {
                            serde_json::json!({ "outcome": "no_candidates" })
                        }
                        NavigationOutcome::NotLocated(candidate) => {
                            serde_json::json!({ "outcome": "not_located", "candidate": candidate })
                        }
                        NavigationOutcome::Cancelled => {
                            serde_json::json!({ "outcome": "cancelled" })
                        }
                    };
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }

        Command::Candidates {
            root,
            file,
            symbol,
            category,
            format,
        } => {
            let config = load_config(config_path.as_deref(), &root)?;
            let candidates =
                Resolver::new(config).find_candidates(&root, &file, &symbol, &category)?;

            match format {
                OutputFormat::Text => {
                    for c in &candidates {
                        println!("{} - {} ({:?})", c.path.display(), c.category, c.kind);
                    }
                    println!("\n{} candidate(s) found", candidates.len());
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&candidates)?);
                }
            }
        }

        Command::Locate {
            file,
            symbol,
            category,
            format,
        } => {
            let config = load_config(config_path.as_deref(), &parent_dir(&file))?;
            let rules = config.rules.compile(&Symbol::new(&symbol))?;
            let rule = rules
                .get(category)
                .ok_or_else(|| anyhow!("No rule for category {}", category))?;

            let content = read_file(&file)?;
            let position = locate_anchor(&content, &rule.locator, &symbol);

            match format {
                OutputFormat::Text => match position {
                    Some(position) => {
                        println!("{}", anchor_line(&Anchor::new(file, position, symbol)))
                    }
                    None => println!("Symbol not found"),
                },
                OutputFormat::Json => {
                    let anchor = position.map(|p| Anchor::new(file, p, symbol));
                    println!("{}", serde_json::to_string_pretty(&anchor)?);
                }
            }
        }

        Command::Click {
            file,
            line,
            column,
            format,
        } => {
            let config = load_config(config_path.as_deref(), &parent_dir(&file))?;
            let content = read_file(&file)?;
            let offset = cursor_offset(&content, line, column)?;
            let site = Navigator::new(Resolver::new(config)).click_site(&content, offset);

            match format {
                OutputFormat::Text => match &site {
                    Some(site) => {
                        let start = offset_to_position(&content, site.range.start);
                        println!(
                            "{} at {}:{} - {}",
                            site.key_path,
                            start.line + 1,
                            start.character + 1,
                            match site.category() {
                                Some(category) => category.to_string(),
                                None => "not navigable".to_string(),
                            }
                        );
                        if let Some(symbol) = site.symbol() {
                            println!("  symbol: {}", symbol);
                        }
                    }
                    None => println!("No key at this position"),
                },
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&site)?);
                }
            }
        }

        Command::Scan { root, format } => {
            let config = load_config(config_path.as_deref(), &root)?;
            let files = WorkspaceScanner::new(&config.scan).scan(&root);

            match format {
                OutputFormat::Text => {
                    for f in &files {
                        println!("{}", f.display());
                    }
                    println!("\n{} file(s) found", files.len());
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&files)?);
                }
            }
        }
    }

    Ok(())
}

/// Picks from `--pick`, or asks on the terminal when stdin is interactive
struct CliSink {
    pick: Option<usize>,
}

impl NavigationSink for CliSink {
    fn choose(&mut self, title: &str, candidates: &[Candidate]) -> Option<usize> {
        if let Some(pick) = self.pick {
            return pick.checked_sub(1);
        }
        if !io::stdin().is_terminal() {
            return None;
        }

        eprintln!("{}", title);
        for (i, c) in candidates.iter().enumerate() {
            eprintln!("  {}) {} ({})", i + 1, c.display_name(), c.category);
        }
        eprint!("> ");
        io::stderr().flush().ok()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).ok()?;
        answer.trim().parse::<usize>().ok()?.checked_sub(1)
    }

    fn open(&mut self, anchor: &Anchor) {
        log::debug!("Opening {}", anchor.path.display());
    }
}

fn load_config(path: Option<&Path>, root: &Path) -> anyhow::Result<NavConfig> {
    let config = match path {
        Some(path) => NavConfig::load(path),
        None => NavConfig::discover(root),
    };
    config.context("Failed to load config")
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Byte offset of a 1-based line and column
fn cursor_offset(content: &str, line: u32, column: u32) -> anyhow::Result<usize> {
    if line == 0 || column == 0 {
        bail!("Line and column are 1-based");
    }
    position_to_offset(content, Position::new(line - 1, column - 1))
        .ok_or_else(|| anyhow!("Position {}:{} is outside the file", line, column))
}

fn anchor_line(anchor: &Anchor) -> String {
    format!(
        "{}:{}:{} - {}",
        anchor.path.display(),
        anchor.position.line + 1,
        anchor.position.character + 1,
        anchor.symbol
    )
}
