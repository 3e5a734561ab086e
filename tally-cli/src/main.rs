use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tally_core::Summary;
use tally_finance::{render_report, summarize};
use tally_ingest::{parse_csv_file, write_simple_csv, ParseDiagnostics, ParsedStatement};

mod auth;
mod config;
mod llm;
mod logging;
mod query;
mod session;
mod state;

use llm::{ChatBackend, HttpBackend, LlmConfig, Provider};
use query::{query_suggestions, QueryService};
use session::{SessionId, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Normalize, summarize and question bank statement CSV exports")]
struct Cli {
    /// Log filter when RUST_LOG is unset (overrides config: error, warn, info, debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the layout and parse a statement
    Parse {
        csv: PathBuf,
        /// Print the transactions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a statement and print its summary
    Summary {
        csv: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a statement in the simple five-column layout
    Normalize {
        csv: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask one question about a statement
    Ask { csv: PathBuf, question: String },

    /// Interactive question session over one or more statements
    Chat { csv: PathBuf },

    /// Print example questions
    Suggestions,

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage stored API keys
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if missing
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an API key in ~/.tally/auth.json (prompts when --key is omitted)
    SetKey {
        #[arg(long, default_value = "openai")]
        provider: Provider,
        #[arg(long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init_logging(cli.log_level.as_deref().unwrap_or(&cfg.log.level));

    match cli.command {
        Command::Parse { csv, json } => {
            let parsed = load_statement(&csv)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed.transactions)?);
            } else {
                println!(
                    "Parsed {} transactions from {} (format: {})",
                    parsed.transactions.len(),
                    csv.display(),
                    parsed.format
                );
                print_diagnostics(&parsed.diagnostics);
            }
        }

        Command::Summary { csv, json } => {
            let parsed = load_statement(&csv)?;
            let summary = summarize(&parsed.transactions);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render_report(&summary));
                print_diagnostics(&parsed.diagnostics);
            }
        }

        Command::Normalize { csv, output } => {
            let parsed = load_statement(&csv)?;
            match output {
                Some(path) => {
                    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
                    write_simple_csv(f, &parsed.transactions)?;
                    eprintln!("Wrote {} transactions to {}", parsed.transactions.len(), path.display());
                }
                None => write_simple_csv(io::stdout().lock(), &parsed.transactions)?,
            }
        }

        Command::Ask { csv, question } => {
            let service = QueryService::new(http_backend(&cfg)?);
            let mut store = SessionStore::new();
            let id = open_session(&mut store, &csv)?;
            let session = store.get_mut(&id).context("session vanished")?;
            let answer = service.ask(session, &question)?;
            println!("{answer}");
        }

        Command::Chat { csv } => {
            let service = QueryService::new(http_backend(&cfg)?);
            let mut store = SessionStore::new();
            let id = open_session(&mut store, &csv)?;
            run_chat(&mut store, &service, id)?;
        }

        Command::Suggestions => {
            for q in query_suggestions() {
                println!("- {q}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::SetKey { provider, key } => auth::set_key(provider, key)?,
        },
    }

    Ok(())
}

fn load_statement(path: &Path) -> Result<ParsedStatement> {
    parse_csv_file(path).with_context(|| format!("processing {}", path.display()))
}

fn http_backend(cfg: &config::Config) -> Result<HttpBackend> {
    HttpBackend::from_config(LlmConfig::from_section(&cfg.llm)?)
}

fn open_session(store: &mut SessionStore, path: &Path) -> Result<SessionId> {
    let parsed = load_statement(path)?;
    let summary: Summary = summarize(&parsed.transactions);
    let (format, count) = (parsed.format, parsed.transactions.len());
    let id = store.create(path, parsed, summary);
    println!("[{id}] {} transactions from {} (format: {format})", count, path.display());
    Ok(id)
}

fn print_diagnostics(d: &ParseDiagnostics) {
    if d.skipped == 0 && d.failed == 0 {
        return;
    }
    println!("\nRows read: {} | skipped: {} | failed: {}", d.rows_read, d.skipped, d.failed);
    for s in &d.samples {
        println!("  {s}");
    }
}

const CHAT_HELP: &str = "\
Type a question, or:
  :summary          show the summary of the current statement
  :history          show this session's questions and answers
  :sessions         list open statements
  :open <csv>       load another statement and switch to it
  :switch <id>      switch to an open statement
  :close [id]       close a statement (default: current)
  :suggest          example questions
  :quit             exit";

fn run_chat<B: ChatBackend>(store: &mut SessionStore, service: &QueryService<B>, first: SessionId) -> Result<()> {
    let mut current = first;
    println!("{CHAT_HELP}\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{current}> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        match cmd {
            ":quit" | ":q" | ":exit" => break,
            ":help" => println!("{CHAT_HELP}"),
            ":suggest" => {
                for q in query_suggestions() {
                    println!("- {q}");
                }
            }
            ":summary" => {
                let session = store.get(&current).context("current session missing")?;
                print!("{}", render_report(&session.summary));
            }
            ":history" => {
                let session = store.get(&current).context("current session missing")?;
                if session.messages.is_empty() {
                    println!("(no questions yet)");
                }
                for m in &session.messages {
                    println!("[{}] {:?}:\n{}\n", m.timestamp, m.role, m.content);
                }
            }
            ":sessions" => {
                for id in store.list() {
                    if let Some(s) = store.get(id) {
                        let marker = if *id == current { "*" } else { " " };
                        println!(
                            "{marker} {id}  {}  {} transactions  {}",
                            s.format,
                            s.transactions.len(),
                            s.file_path.display()
                        );
                    }
                }
            }
            ":open" => {
                if arg.is_empty() {
                    println!("usage: :open <csv>");
                    continue;
                }
                match open_session(store, Path::new(arg)) {
                    Ok(id) => current = id,
                    Err(e) => println!("error: {e:#}"),
                }
            }
            ":switch" => {
                let id = SessionId::from(arg);
                if store.get(&id).is_some() {
                    current = id;
                } else {
                    println!("no such session: {arg}");
                }
            }
            ":close" => {
                let id = if arg.is_empty() { current.clone() } else { SessionId::from(arg) };
                if store.remove(&id).is_none() {
                    println!("no such session: {id}");
                    continue;
                }
                println!("closed {id}");
                if store.is_empty() {
                    println!("no statements open");
                    break;
                }
                if id == current {
                    if let Some(next) = store.list().last() {
                        current = next.clone();
                    }
                }
            }
            other if other.starts_with(':') => println!("unknown command {other} (try :help)"),
            _ => {
                let session = store.get_mut(&current).context("current session missing")?;
                match service.ask(session, input) {
                    Ok(answer) => println!("\n{answer}\n"),
                    Err(e) => println!("error: {e:#}"),
                }
            }
        }
    }

    Ok(())
}
