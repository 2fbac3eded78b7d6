use std::process::Stdio;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::process::Command;

use nudge_ai::{Mode, GEMINI_API_KEY_VAR};
use nudge_core::config::{load_env_file, Config};
use nudge_core::watcher::Watcher;

#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Screen-watching focus assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the screen until interrupted, nudging on distraction
    Watch {
        /// What you intend to be doing right now
        #[arg(short, long)]
        goal: String,
        /// Analysis backend: offline (local daemon) or online (Gemini)
        #[arg(short, long, default_value = "offline")]
        mode: String,
        /// Seconds between scans (default from config, 300)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Run a single scan-and-classify cycle and exit
    Scan {
        /// What you intend to be doing right now
        #[arg(short, long)]
        goal: String,
        /// Analysis backend: offline (local daemon) or online (Gemini)
        #[arg(short, long, default_value = "offline")]
        mode: String,
    },
    /// Check that the external tools each mode needs are present
    Doctor,
}

#[cfg(target_os = "macos")]
const DIALOG_TOOL: (&str, &[&str]) = ("osascript", &["-e", "return"]);

#[cfg(target_os = "linux")]
const DIALOG_TOOL: (&str, &[&str]) = ("zenity", &["--version"]);

#[cfg(target_os = "windows")]
const DIALOG_TOOL: (&str, &[&str]) = ("powershell", &["-NoProfile", "-Command", "exit"]);

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const DIALOG_TOOL: (&str, &[&str]) = ("false", &[]);

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    load_env_file();
    let config = Config::load()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            goal,
            mode,
            interval,
        } => watch(goal, &mode, interval, config).await,
        Commands::Scan { goal, mode } => scan_once(goal, &mode, config).await,
        Commands::Doctor => doctor().await,
    }
}

fn parse_mode(raw: &str) -> Result<Mode> {
    raw.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn require_goal(goal: &str) -> Result<()> {
    if goal.trim().is_empty() {
        anyhow::bail!("You must have a goal!");
    }
    Ok(())
}

async fn watch(goal: String, mode: &str, interval: Option<u64>, mut config: Config) -> Result<()> {
    let mode = parse_mode(mode)?;
    require_goal(&goal)?;
    if let Some(seconds) = interval {
        log::debug!("Scan interval overridden to {seconds}s");
        config.interval_seconds = seconds;
    }

    println!("--- Focus Nudge ---");
    println!("Goal: {goal}");
    println!("Mode: {mode}");
    println!(
        "Okay! I'll check on you every {} seconds.",
        config.interval_seconds
    );
    println!("Press Ctrl+C to stop.");

    let mut watcher = Watcher::new(goal, mode, &config)?;
    watcher.run_with_signals().await
}

async fn scan_once(goal: String, mode: &str, config: Config) -> Result<()> {
    let mode = parse_mode(mode)?;
    require_goal(&goal)?;

    println!("Scanning... Goal: {goal}, Mode: {mode}");
    let mut watcher = Watcher::new(goal, mode, &config)?;
    let outcome = watcher.run_cycle().await?;
    println!("Scan outcome: {outcome:?}");
    Ok(())
}

async fn doctor() -> Result<()> {
    println!("Checking external tools...");
    println!("{}", "\u{2550}".repeat(30));

    let tesseract = check_tool("tesseract", &["--version"]).await;
    let ollama = check_tool("ollama", &["--version"]).await;
    let (dialog_bin, dialog_args) = DIALOG_TOOL;
    let dialog = check_tool(dialog_bin, dialog_args).await;
    let api_key = std::env::var(GEMINI_API_KEY_VAR).is_ok();

    report("tesseract (offline OCR)", tesseract);
    report("ollama (offline model daemon)", ollama);
    report(dialog_bin, dialog);
    report(
        &format!("{GEMINI_API_KEY_VAR} (online mode key)"),
        api_key,
    );

    println!();
    if tesseract && ollama {
        println!("Offline mode is ready.");
    } else {
        println!("Offline mode needs tesseract and ollama installed.");
    }
    if api_key {
        println!("Online mode is ready.");
    } else {
        println!("Online mode needs {GEMINI_API_KEY_VAR} set (e.g. in .env).");
    }
    if !dialog {
        println!("Warning: no dialog tool found; nudges cannot be shown.");
    }

    Ok(())
}

fn report(label: &str, ok: bool) {
    let status = if ok { "ok" } else { "MISSING" };
    println!("  {label:<40} {status}");
}

async fn check_tool(binary: &str, args: &[&str]) -> bool {
    Command::new(binary)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
