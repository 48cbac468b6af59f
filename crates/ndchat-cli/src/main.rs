mod settings;
mod ui;

use std::env;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use ndchat_core::Config;
use ndchat_core::SettleOutcome;
use ndchat_exec::attachments::load_file;
use ndchat_exec::attachments::load_files;
use ndchat_exec::ChatSession;
use ndchat_exec::CycleOutcome;
use ndchat_exec::HttpTransport;
use ndchat_exec::OutgoingAttachment;
use ndchat_exec::StopHandle;
use ndchat_exec::Submission;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::settings::apply_overrides;
use crate::settings::load_config;
use crate::ui::TerminalObserver;

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct SessionArgs {
    config: Option<PathBuf>,
    endpoint: Option<String>,
    chat_id: Option<String>,
    attach: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Send { args: SessionArgs, text: String },
    Repl(SessionArgs),
    Reset(SessionArgs),
    Help,
    Version,
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ndchat=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    match parse_command(env::args().skip(1).collect())? {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("ndchat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Send { args, text } => run_send(&args, text).await,
        Command::Repl(args) => run_repl(&args).await,
        Command::Reset(args) => {
            let mut session = open_session(&args)?;
            session.reset(&mut TerminalObserver::new()).await?;
            println!("session {} reset", session.state().chat_id);
            Ok(())
        }
    }
}

fn parse_command(args: Vec<String>) -> Result<Command, Box<dyn std::error::Error>> {
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "--help" | "-h" | "help" => Ok(Command::Help),
        "--version" | "-V" | "version" => Ok(Command::Version),
        "send" => {
            let (args, words) = parse_session_args(rest, true)?;
            if words.is_empty() {
                return Err("send requires message text".into());
            }
            Ok(Command::Send {
                args,
                text: words.join(" "),
            })
        }
        "repl" => {
            let (args, _) = parse_session_args(rest, false)?;
            Ok(Command::Repl(args))
        }
        "reset" => {
            let (args, _) = parse_session_args(rest, false)?;
            if !args.attach.is_empty() {
                return Err("reset does not take --attach".into());
            }
            Ok(Command::Reset(args))
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

fn parse_session_args(
    args: Vec<String>,
    allow_text: bool,
) -> Result<(SessionArgs, Vec<String>), Box<dyn std::error::Error>> {
    let mut parsed = SessionArgs::default();
    let mut words = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "--endpoint" | "--chat-id" | "--attach" => {
                let Some(value) = args.get(i + 1) else {
                    return Err(format!("{flag} requires a value").into());
                };
                match flag {
                    "--config" => parsed.config = Some(PathBuf::from(value)),
                    "--endpoint" => parsed.endpoint = Some(value.clone()),
                    "--chat-id" => parsed.chat_id = Some(value.clone()),
                    _ => parsed.attach.push(PathBuf::from(value)),
                }
                i += 2;
            }
            other if other.starts_with("--") => {
                return Err(format!("unsupported argument: {other}").into());
            }
            other if allow_text => {
                words.push(other.to_string());
                i += 1;
            }
            other => {
                return Err(format!("unexpected argument: {other}").into());
            }
        }
    }
    Ok((parsed, words))
}

fn resolve_config(args: &SessionArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let path = args.config.clone().or_else(settings::default_config_path);
    let mut config = load_config(path.as_deref())?;
    apply_overrides(&mut config, args.endpoint.as_deref(), args.chat_id.as_deref());
    Ok(config)
}

fn open_session(
    args: &SessionArgs,
) -> Result<ChatSession<HttpTransport>, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    tracing::debug!(
        url = %config.endpoint.chat_url(),
        chat_id = %config.session.chat_id,
        "opening session"
    );
    let transport = HttpTransport::new(config.endpoint.clone());
    Ok(ChatSession::new(transport, config))
}

/// Ctrl-C stops whichever cycle is streaming; a press while idle exits.
fn forward_interrupts(handle: StopHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !interrupt_keeps_running(&handle) {
                eprintln!();
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    });
}

fn interrupt_keeps_running(handle: &StopHandle) -> bool {
    handle.stop()
}

async fn run_send(args: &SessionArgs, text: String) -> Result<(), Box<dyn std::error::Error>> {
    let attachments = load_files(&args.attach).await?;
    let mut session = open_session(args)?;
    forward_interrupts(session.stop_handle());

    let mut observer = TerminalObserver::new();
    let outcome = session
        .submit(
            Submission::text(text).with_attachments(attachments),
            &mut observer,
        )
        .await;
    match outcome {
        CycleOutcome::Rejected => Err("message is blank".into()),
        CycleOutcome::Settled {
            outcome: SettleOutcome::Failed(_),
            ..
        } => Err("request failed".into()),
        CycleOutcome::Settled { .. } => Ok(()),
    }
}

async fn run_repl(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut queued: Vec<OutgoingAttachment> = load_files(&args.attach).await?;
    let mut session = open_session(args)?;
    forward_interrupts(session.stop_handle());
    let mut observer = TerminalObserver::new();

    println!(
        "ndchat {} ({}), /attach PATH, /reset, /quit (Ctrl-C stops a reply, or exits when idle)",
        env!("CARGO_PKG_VERSION"),
        session.config().endpoint.chat_url()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_repl_line(&line) {
            ReplLine::Quit => break,
            ReplLine::Empty => {}
            ReplLine::Reset => {
                if let Err(err) = session.reset(&mut observer).await {
                    eprintln!("! reset failed: {err}");
                } else {
                    queued.clear();
                    println!("session reset");
                }
            }
            ReplLine::Attach(path) => match load_file(&path).await {
                Ok(attachment) => {
                    println!("queued {} ({})", attachment.name, attachment.content_type);
                    queued.push(attachment);
                }
                Err(err) => eprintln!("! {err}"),
            },
            ReplLine::Unknown(command) => eprintln!("! unknown command: {command}"),
            ReplLine::Message(text) => {
                session.set_input(text);
                let submission = Submission::default().with_attachments(queued.clone());
                match session.submit(submission, &mut observer).await {
                    CycleOutcome::Rejected => {}
                    CycleOutcome::Settled { .. } => queued.clear(),
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplLine {
    Empty,
    Quit,
    Reset,
    Attach(PathBuf),
    Unknown(String),
    Message(String),
}

fn parse_repl_line(line: &str) -> ReplLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplLine::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplLine::Message(line.to_string());
    }
    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    match command {
        "/quit" | "/exit" => ReplLine::Quit,
        "/reset" => ReplLine::Reset,
        "/attach" if !rest.trim().is_empty() => ReplLine::Attach(PathBuf::from(rest.trim())),
        other => ReplLine::Unknown(other.to_string()),
    }
}

fn print_help() {
    println!("ndchat {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  ndchat send [--endpoint URL] [--chat-id ID] [--attach PATH]... TEXT");
    println!("  ndchat repl [--endpoint URL] [--chat-id ID] [--attach PATH]...");
    println!("  ndchat reset [--endpoint URL] [--chat-id ID]");
    println!("  ndchat --help");
    println!("  ndchat --version");
    println!();
    println!("All commands accept --config PATH (default: <config dir>/ndchat/config.toml).");
}
