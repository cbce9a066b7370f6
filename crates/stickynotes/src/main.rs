//! `stickies` - CLI for stickynotes
//!
//! This binary runs the note orchestrator for a renderer and offers a few
//! direct operations on the note store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use stickynotes::cli::{Cli, Command, ConfigCommand, OutputFormat};
use stickynotes::service::{self, RunOptions};
use stickynotes::{init_logging, Config, NoteId, NoteRecord, NoteStore};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use stickynotes_linux as platform;

#[cfg(target_os = "macos")]
use stickynotes_mac as platform;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod platform {
    pub fn init() -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    pub fn platform_name() -> &'static str {
        std::env::consts::OS
    }

    pub fn default_icon() -> &'static str {
        "assets/icon.png"
    }

    pub fn supports_transparency() -> bool {
        true
    }
}

/// Characters of content shown per note in listings.
const PREVIEW_CHARS: usize = 48;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    apply_platform_defaults(&mut config);

    match cli.command {
        Command::Run(cmd) => {
            platform::init().map_err(|e| anyhow::anyhow!("platform init failed: {e}"))?;
            let open = cmd
                .open
                .into_iter()
                .map(NoteId::parse)
                .collect::<Result<Vec<_>, _>>()?;
            let options = RunOptions {
                no_manager: cmd.no_manager,
                open,
            };
            service::run_stdio(config, options).await?;
        }
        Command::List(cmd) => handle_list(&config, cmd.format)?,
        Command::Show(cmd) => handle_show(&config, &cmd.id, cmd.json)?,
        Command::New(cmd) => handle_new(&config, cmd.content)?,
        Command::Delete(cmd) => handle_delete(&config, &cmd.id)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn apply_platform_defaults(config: &mut Config) {
    if config.window.icon.is_none() {
        config.window.icon = Some(PathBuf::from(platform::default_icon()));
    }
    if !platform::supports_transparency() {
        config.window.transparent = false;
    }
}

fn open_store(config: &Config) -> anyhow::Result<NoteStore> {
    let dir = config.store_dir();
    NoteStore::open(&dir).with_context(|| format!("opening note store at {}", dir.display()))
}

fn handle_list(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let notes = open_store(config)?.load_all()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        OutputFormat::Plain => {
            if notes.is_empty() {
                println!("No notes.");
            }
            for note in &notes {
                let pin = if note.is_pinned { " [pinned]" } else { "" };
                println!("{}{pin}  {}", note.id, preview(note));
            }
        }
        OutputFormat::Table => {
            println!("{:<36}  {:<6}  {:<9}  PREVIEW", "ID", "PINNED", "SIZE");
            for note in &notes {
                println!(
                    "{:<36}  {:<6}  {:<9}  {}",
                    note.id,
                    if note.is_pinned { "yes" } else { "no" },
                    format!("{}x{}", note.width, note.height),
                    preview(note)
                );
            }
        }
    }
    Ok(())
}

fn handle_show(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let id = NoteId::parse(id)?;
    let note = open_store(config)?.load(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Note {}", note.id);
        println!("  Color:   {}", note.color);
        println!("  Size:    {}x{}", note.width, note.height);
        match note.bounds() {
            Some(b) => println!("  Position: {},{}", b.x, b.y),
            None => println!("  Position: (not placed)"),
        }
        println!("  Pinned:  {}", note.is_pinned);
        println!();
        println!("{}", note.content);
    }
    Ok(())
}

fn handle_new(config: &Config, content: Option<String>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut note = NoteRecord::new(&config.note);
    note.content = content.unwrap_or_default();
    store.save(&note)?;
    println!("{}", note.id);
    Ok(())
}

fn handle_delete(config: &Config, id: &str) -> anyhow::Result<()> {
    let id = NoteId::parse(id)?;
    if open_store(config)?.delete(&id)? {
        println!("Deleted {id}");
    } else {
        println!("No note {id}; nothing to delete");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("Platform:           {}", platform::platform_name());
                println!();
                println!("[Store]");
                println!("  Directory:        {}", config.store_dir().display());
                println!();
                println!("[Note]");
                println!("  Default color:    {}", config.note.default_color);
                println!(
                    "  Size:             {}x{} (min {}x{})",
                    config.note.width,
                    config.note.height,
                    config.note.min_width,
                    config.note.min_height
                );
                println!();
                println!("[Manager]");
                println!(
                    "  Size:             {}x{}",
                    config.manager.width, config.manager.height
                );
                println!();
                println!("[Window]");
                println!("  Frameless:        {}", config.window.frameless);
                println!("  Transparent:      {}", config.window.transparent);
                println!("  Show in taskbar:  {}", config.window.show_in_taskbar);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn preview(note: &NoteRecord) -> String {
    let first_line = note.content.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS || note.content.lines().nth(1).is_some() {
        preview.push('…');
    }
    preview
}
