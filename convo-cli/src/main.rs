use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use convo_core::extract::DEFAULT_PLACEHOLDER_EMOJI;
use convo_core::{DatabaseConfig, DatabaseSource, ExtractOptions, FileSource, render_source};

#[derive(Debug, Parser)]
#[command(
    name = "convo",
    version,
    about = "Render a stored conversation as a two-column terminal transcript"
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["chat_session_id", "file"])
))]
struct Cli {
    /// Chat session id to load from the database (requires DATABASE_URL)
    chat_session_id: Option<String>,

    /// Read the conversation from a JSONL file instead of the database
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Show option emojis even when they equal the placeholder value
    #[arg(long)]
    keep_placeholder_emoji: bool,

    /// Emoji value that stands for "no emoji" on an option
    #[arg(long, value_name = "VALUE", default_value = DEFAULT_PLACEHOLDER_EMOJI)]
    placeholder_emoji: String,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> convo_core::Result<()> {
    let options = ExtractOptions {
        treat_placeholder_emoji_as_absent: !cli.keep_placeholder_emoji,
        placeholder_emoji: cli.placeholder_emoji.clone(),
    };

    let transcript = match (&cli.file, &cli.chat_session_id) {
        (Some(path), _) => render_source(&FileSource::new(path), &options)?,
        (None, Some(chat_session_id)) => {
            let config = DatabaseConfig::from_env()?;
            render_source(
                &DatabaseSource::with_psql(config, chat_session_id.as_str()),
                &options,
            )?
        }
        (None, None) => unreachable!("clap requires <CHAT_SESSION_ID> or --file"),
    };

    print!("{transcript}");
    Ok(())
}

// Diagnostics go to stderr; stdout carries only the transcript.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
