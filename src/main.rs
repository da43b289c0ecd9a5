use anyhow::{Context, Result};
use clap::Parser;
use maskfield::{KeyInput, MaskOptions, MaskedField, MemoryField, PasteStrategy, Selection};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

/// Replays input events against a masked field and prints every state.
#[derive(Parser, Debug)]
#[command(name = "maskfield", version = env!("CARGO_PKG_VERSION"), about = "Replay edits against an input mask")]
struct Cli {
    /// Mask template, e.g. "+7 (999) 999-99-99".
    #[arg(long, short = 'm')]
    mask: Option<String>,

    /// Fill character for unfilled positions.
    #[arg(long, value_name = "CHAR", conflicts_with = "no_mask_char")]
    mask_char: Option<char>,

    /// Show only the literal prefix and grow with input.
    #[arg(long)]
    no_mask_char: bool,

    #[arg(long)]
    always_show_mask: bool,

    /// Paste text arrives with the following change event.
    #[arg(long)]
    defer_paste: bool,

    /// Mask options file (YAML, or JSON by extension).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Event script to replay (YAML, or JSON by extension).
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Text typed key by key after focusing, when no script is given.
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScriptStep {
    Focus,
    Blur,
    Tick,
    Type(String),
    Key(String),
    Paste(String),
    Autofill(String),
    Select { start: usize, end: usize },
    #[serde(alias = "change")]
    Edit { text: String, caret: usize },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = build_options(&cli)?;
    let steps = match &cli.script {
        Some(path) => load_script(path)?,
        None => vec![
            ScriptStep::Focus,
            ScriptStep::Type(cli.text.clone().unwrap_or_default()),
        ],
    };

    let mut field = maskfield::attach(MemoryField::new(), options).context("Failed to attach mask")?;
    print_state("attach", &field);
    for step in steps {
        let label = format!("{step:?}");
        apply_step(&mut field, step)?;
        print_state(&label, &field);
    }
    Ok(())
}

fn build_options(cli: &Cli) -> Result<MaskOptions> {
    let mut options = match &cli.config {
        Some(path) => MaskOptions::load(path)
            .with_context(|| format!("Failed to load mask options from {}", path.display()))?,
        None => MaskOptions::default(),
    };
    if let Some(mask) = &cli.mask {
        options.mask = Some(mask.clone());
    }
    if cli.no_mask_char {
        options.mask_char = None;
    } else if let Some(mask_char) = cli.mask_char {
        options.mask_char = Some(mask_char);
    }
    if cli.always_show_mask {
        options.always_show_mask = true;
    }
    if cli.defer_paste {
        options.paste_strategy = PasteStrategy::DeferToChange;
    }
    Ok(options)
}

fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let steps = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&source).context("Invalid JSON script")?
    } else {
        serde_yaml::from_str(&source).context("Invalid YAML script")?
    };
    Ok(steps)
}

fn apply_step(field: &mut MaskedField, step: ScriptStep) -> Result<()> {
    match step {
        ScriptStep::Focus => field.focus(),
        ScriptStep::Blur => field.blur(),
        ScriptStep::Tick => field.tick(),
        ScriptStep::Type(text) => field.type_text(&text),
        ScriptStep::Key(name) => {
            let key: KeyInput = name.parse()?;
            field.press_key(key);
        }
        ScriptStep::Paste(text) => field.paste(&text),
        ScriptStep::Autofill(text) => field.autofill(&text),
        ScriptStep::Select { start, end } => field.select(start, end),
        ScriptStep::Edit { text, caret } => field.native_edit(&text, Selection::caret(caret)),
    }
    Ok(())
}

fn print_state(label: &str, field: &MaskedField) {
    let value = field.value();
    let before: String = value.chars().take(field.caret()).collect();
    println!("{label}");
    println!("  |{value}|");
    println!("   {}^", " ".repeat(before.width()));
}
