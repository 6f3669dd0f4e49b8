// reportkit CLI - font setup, dashboard serving, card delivery

mod card_cmd;
mod exit_codes;
mod font_cmd;
mod serve_cmd;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "rkit")]
#[command(about = "Automation helpers for CJK visual reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// CJK font discovery and diagnostics
    Font {
        #[command(subcommand)]
        command: FontCommands,
    },

    /// Serve the dashboard directory tree over HTTP
    #[command(after_help = "\
Examples:
  rkit serve                          # serve the current directory
  rkit serve --root /path/to/task     # explicit task root
  rkit serve --port 7788              # pin the port
  rkit serve --dir ./dashboard        # legacy: serves the parent of dashboard/")]
    Serve {
        /// Task root directory to serve
        #[arg(long)]
        root: Option<PathBuf>,

        /// (Legacy) alias for --root; a dashboard/ directory serves its parent
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Port (default: first free port from 7788)
        #[arg(long, default_value_t = 0)]
        port: u16,
    },

    /// Feishu rich-card delivery
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },
}

#[derive(Subcommand)]
enum FontCommands {
    /// Resolve and report the best available CJK font
    #[command(after_help = "\
Examples:
  rkit font setup
  rkit font setup --candidate 'Noto Sans CJK SC' --path ./fonts
  rkit font setup --json | jq .family_chain")]
    Setup {
        /// Preferred family names, earlier = preferred (repeatable)
        #[arg(long = "candidate", value_name = "NAME")]
        candidates: Vec<String>,

        /// Extra directories to scan (repeatable)
        #[arg(long = "path", value_name = "DIR")]
        paths: Vec<PathBuf>,

        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },

    /// Report CJK font availability: index, disk, resolution
    Diagnose {
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// Send a rich card with interleaved text and images
    #[command(after_help = "\
Examples:
  rkit card send --title Report --text 'Done!' --image /tmp/plot.png
  rkit card send --chat oc_xxx --title Daily --template indigo --text 'All green'
  rkit card send --title Fix --reply-to om_xxx --text 'Resolved in rev 7'")]
    Send {
        /// Chat to deliver to (falls back to FEISHU_DEFAULT_CHAT_ID)
        #[arg(long, env = "FEISHU_DEFAULT_CHAT_ID")]
        chat: Option<String>,

        /// Card title
        #[arg(long)]
        title: String,

        /// Markdown text section(s), repeatable
        #[arg(long = "text", value_name = "MARKDOWN")]
        texts: Vec<String>,

        /// Image path(s), repeatable
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,

        /// Header color template
        #[arg(long, default_value = "blue")]
        template: String,

        /// Send as a threaded reply to this message id
        #[arg(long, value_name = "MESSAGE_ID")]
        reply_to: Option<String>,
    },
}

/// Command-level error: exit code, message, optional remediation hint.
#[derive(Debug)]
pub(crate) struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn print(&self) {
        eprintln!("error: {}", self.message);
        if let Some(hint) = &self.hint {
            eprintln!("hint: {}", hint);
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: rkit <command> [options]");
            eprintln!("       rkit --help for more information");
            Ok(())
        }
        Some(Commands::Font { command }) => match command {
            FontCommands::Setup {
                candidates,
                paths,
                json,
            } => font_cmd::cmd_setup(candidates, paths, json),
            FontCommands::Diagnose { json } => font_cmd::cmd_diagnose(json),
        },
        Some(Commands::Serve { root, dir, port }) => serve_cmd::cmd_serve(root, dir, port),
        Some(Commands::Card { command }) => match command {
            CardCommands::Send {
                chat,
                title,
                texts,
                images,
                template,
                reply_to,
            } => card_cmd::cmd_send(chat, title, texts, images, template, reply_to),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            e.print();
            ExitCode::from(e.code)
        }
    }
}
