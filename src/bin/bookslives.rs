//! CLI binary for bookslives.
//!
//! An interactive terminal reader over the library crate: renders the
//! current page to a PNG for an external viewer, prints the cleaned page
//! text, and maps single-letter commands to the companion's generators.
//! Every blocking API call gets a spinner; produced media lands as files in
//! the media directory.

use anyhow::{Context, Result};
use bookslives::{
    clean_page_text, png_bytes, Companion, CompanionConfig, Document, NavEvent, Narration,
    ProgressStore, ReaderSession,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Open a book and start (or resume) reading
  bookslives novel.pdf

  # Open from a URL
  bookslives https://example.com/novel.pdf

  # Jump straight to page 12, keep media in a custom directory
  bookslives --page 12 --media-dir ~/reading/media novel.pdf

  # Use a specific chat model and provider for prompts and insights
  bookslives --model gpt-5-mini --provider openai novel.pdf

  # Page count and metadata only, no API keys needed
  bookslives --inspect-only novel.pdf

READER COMMANDS:
  n  next page           p  previous page       g <N>  go to page N
  a  narrate this page   m  music for this page
  i  insights            e  emotion analysis    v      scene image
  t  reprint page text   h  help                q      quit

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        narration + default chat provider
  REPLICATE_API_TOKEN   scene-art generation
  BOOKSLIVES_MODEL      override chat model
  BOOKSLIVES_PROVIDER   override chat provider

SETUP:
  1. Set API keys:      export OPENAI_API_KEY=sk-...
                        export REPLICATE_API_TOKEN=r8_...
  2. (music only) serve a text-to-audio model and point
     --music-endpoint at it; everything else works without it.
  3. Read:              bookslives novel.pdf
"#;

/// An interactive reading companion for PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "bookslives",
    version,
    about = "Read PDFs with AI narration, ambient music, insights, and scene art",
    long_about = "An interactive reading companion: renders PDF pages, remembers your position \
per book, and on demand narrates the page, scores a soundtrack for it, extracts structured \
insights, analyzes its emotions, and paints the scene.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Start at this page instead of the remembered position.
    #[arg(long)]
    page: Option<usize>,

    /// Directory for produced media (page PNGs, narration MP3s, music WAVs).
    #[arg(long, env = "BOOKSLIVES_MEDIA_DIR", default_value = "bookslives_media")]
    media_dir: PathBuf,

    /// Chat model for prompts, insights, and emotion analysis.
    #[arg(long, env = "BOOKSLIVES_MODEL")]
    model: Option<String>,

    /// Chat provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "BOOKSLIVES_PROVIDER")]
    provider: Option<String>,

    /// Narration voice.
    #[arg(long, env = "BOOKSLIVES_VOICE", default_value = "onyx")]
    voice: String,

    /// Speech-synthesis model.
    #[arg(long, env = "BOOKSLIVES_TTS_MODEL", default_value = "gpt-4o-mini-tts")]
    tts_model: String,

    /// Replicate model for scene art.
    #[arg(long, env = "BOOKSLIVES_IMAGE_MODEL", default_value = "black-forest-labs/flux-1.1-pro")]
    image_model: String,

    /// Base URL of the text-to-audio inference server.
    #[arg(long, env = "BOOKSLIVES_MUSIC_ENDPOINT", default_value = "http://localhost:8000")]
    music_endpoint: String,

    /// Reading-progress file.
    #[arg(long, env = "BOOKSLIVES_PROGRESS_FILE", default_value = "pdf_progress.json")]
    progress_file: PathBuf,

    /// Maximum documents remembered in the progress file.
    #[arg(long, default_value_t = 256)]
    progress_capacity: usize,

    /// Maximum rendered page dimension in pixels.
    #[arg(long, env = "BOOKSLIVES_MAX_PIXELS", default_value_t = 1600)]
    max_pixels: u32,

    /// Print page count and metadata only, then exit.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BOOKSLIVES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the page text itself.
    #[arg(short, long)]
    quiet: bool,
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Open the document ────────────────────────────────────────────────
    let config = build_config(&cli)?;

    let bar = spinner("Opening PDF…");
    let document = Document::open(&cli.input, config.download_timeout_secs)
        .await
        .context("Failed to open document")?;
    let companion = Companion::new(config.clone()).context("Failed to initialise companion")?;
    let overview = companion
        .overview(&document)
        .await
        .context("Failed to read document")?;
    bar.finish_and_clear();

    if cli.inspect_only {
        println!("File:     {}", cli.input);
        if let Some(ref t) = overview.title {
            println!("Title:    {t}");
        }
        if let Some(ref a) = overview.author {
            println!("Author:   {a}");
        }
        println!("Pages:    {}", overview.page_count);
        println!("Hash:     {}", document.content_hash());
        return Ok(());
    }

    std::fs::create_dir_all(&cli.media_dir)
        .with_context(|| format!("Failed to create media directory {:?}", cli.media_dir))?;

    // ── Session setup ────────────────────────────────────────────────────
    let store = ProgressStore::load(&config.progress_path, config.progress_capacity);
    let mut session = ReaderSession::resume(document.content_hash(), overview.page_count, store);

    if let Some(page) = cli.page {
        session.navigate(NavEvent::Goto(page))?;
    }

    if !cli.quiet {
        let title = overview.title.as_deref().unwrap_or(&cli.input);
        println!("{} {}", cyan("◆"), bold(title));
        if let Some(ref a) = overview.author {
            println!("  {}", dim(&format!("by {a}")));
        }
        println!(
            "  {}",
            dim(&format!(
                "{} pages — resuming at page {} — type h for commands",
                overview.page_count,
                session.current_page()
            ))
        );
    }

    run_reader(cli, document, companion, &mut session).await
}

/// Map CLI args to `CompanionConfig`.
fn build_config(cli: &Cli) -> Result<CompanionConfig> {
    let mut builder = CompanionConfig::builder()
        .tts_model(cli.tts_model.clone())
        .tts_voice(cli.voice.clone())
        .image_model(cli.image_model.clone())
        .music_endpoint(cli.music_endpoint.clone())
        .progress_path(cli.progress_file.clone())
        .progress_capacity(cli.progress_capacity)
        .max_rendered_pixels(cli.max_pixels);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }

    builder.build().context("Invalid configuration")
}

/// The interactive read–command loop.
async fn run_reader(
    cli: Cli,
    document: Document,
    mut companion: Companion,
    session: &mut ReaderSession,
) -> Result<()> {
    let mut page_text = show_page(&companion, &document, session, &cli.media_dir).await?;

    let stdin = io::stdin();
    loop {
        print!("{} ", bold("›"));
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "n" | "next" => {
                session.navigate(NavEvent::Next)?;
                page_text = show_page(&companion, &document, session, &cli.media_dir).await?;
            }
            "p" | "prev" => {
                session.navigate(NavEvent::Prev)?;
                page_text = show_page(&companion, &document, session, &cli.media_dir).await?;
            }
            "g" | "goto" => match arg.parse::<usize>() {
                Ok(page) => {
                    session.navigate(NavEvent::Goto(page))?;
                    page_text = show_page(&companion, &document, session, &cli.media_dir).await?;
                }
                Err(_) => println!("{}", red("Usage: g <page number>")),
            },
            "a" | "narrate" => narrate(&mut companion, session, &page_text, &cli.media_dir).await,
            "m" | "music" => music(&mut companion, session, &page_text, &cli.media_dir).await,
            "i" | "insights" => insights(&mut companion, session, &page_text).await,
            "e" | "emotions" => emotions(&mut companion, session, &page_text).await,
            "v" | "image" => image(&mut companion, session, &page_text).await,
            "t" | "text" => println!("{page_text}"),
            "h" | "?" | "help" => print_help(),
            "q" | "quit" | "exit" => break,
            other => println!("{}", red(&format!("Unknown command '{other}' — h for help"))),
        }
    }

    Ok(())
}

/// Render the current page: write its PNG and print the cleaned text.
///
/// Returns the cleaned text, which every generator command reuses.
async fn show_page(
    companion: &Companion,
    document: &Document,
    session: &ReaderSession,
    media_dir: &Path,
) -> Result<String> {
    let bar = spinner("Rendering page…");
    let view = companion
        .page_view(document, session.current_page())
        .await
        .context("Failed to render page")?;
    let png = png_bytes(&view.image)?;
    bar.finish_and_clear();

    let png_path = media_dir.join(format!("page_{:04}.png", view.number));
    std::fs::write(&png_path, png)
        .with_context(|| format!("Failed to write page image {png_path:?}"))?;

    let text = clean_page_text(&view.raw_text);

    println!();
    println!(
        "{}  {}",
        cyan(&format!("— Page {} of {} —", view.number, session.page_count())),
        dim(&format!("image: {}", png_path.display()))
    );
    if text.is_empty() {
        println!("{}", dim("(no extractable text on this page)"));
    } else {
        println!("{text}");
    }
    println!();

    Ok(text)
}

async fn narrate(companion: &mut Companion, session: &mut ReaderSession, text: &str, media_dir: &Path) {
    let bar = spinner("Generating narration…");
    match companion.narration(text).await {
        Ok(Narration::Audio(bytes)) => {
            bar.finish_and_clear();
            let path = media_dir.join(format!("narration_page_{:04}.mp3", session.current_page()));
            match std::fs::write(&path, &bytes) {
                Ok(()) => println!("{} Narration ready: {}", green("✔"), bold(&path.display().to_string())),
                Err(e) => println!("{}", red(&format!("Failed to write narration: {e}"))),
            }
            session.media.narration = Some(Narration::Audio(bytes));
        }
        Ok(Narration::NoText) => {
            bar.finish_and_clear();
            println!("{}", dim("This page has no narratable text."));
            session.media.narration = Some(Narration::NoText);
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
        }
    }
}

async fn music(companion: &mut Companion, session: &mut ReaderSession, text: &str, media_dir: &Path) {
    let bar = spinner("Curating a music prompt…");
    let prompt = match companion.music_prompt(text).await {
        Ok(p) => {
            bar.finish_and_clear();
            println!("  {} {}", dim("prompt:"), p);
            p
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
            return;
        }
    };

    let bar = spinner("Generating audio… this can take a while");
    match companion.music(&prompt).await {
        Ok(wav) => {
            bar.finish_and_clear();
            let path = media_dir.join(format!("music_page_{:04}.wav", session.current_page()));
            match std::fs::write(&path, &wav) {
                Ok(()) => println!("{} Music ready: {}", green("✔"), bold(&path.display().to_string())),
                Err(e) => println!("{}", red(&format!("Failed to write music: {e}"))),
            }
            session.media.music = Some(wav);
            session.media.music_prompt = Some(prompt);
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
        }
    }
}

async fn insights(companion: &mut Companion, session: &mut ReaderSession, text: &str) {
    let bar = spinner("Analyzing the text…");
    match companion.insights(text).await {
        Ok(record) => {
            bar.finish_and_clear();
            println!("{}", cyan("— Insights —"));
            for (label, value) in record.display_fields() {
                println!("  {:<18} {}", bold(&format!("{label}:")), value);
            }
            session.media.insights = Some(record);
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
        }
    }
}

async fn emotions(companion: &mut Companion, session: &mut ReaderSession, text: &str) {
    let bar = spinner("Reading the room…");
    match companion.emotions(text).await {
        Ok(vector) => {
            bar.finish_and_clear();
            println!("{}", cyan("— Emotions on this page —"));
            let (dominant, _) = vector.dominant();
            for (name, score) in vector.scores() {
                let line = format!("  {name:<12} {:>5.1}%", score * 100.0);
                if name == dominant {
                    println!("{}", bold(&line));
                } else {
                    println!("{line}");
                }
            }
            session.media.emotions = Some(vector);
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
        }
    }
}

async fn image(companion: &mut Companion, session: &mut ReaderSession, text: &str) {
    let bar = spinner("Preparing the scene prompt…");
    let prompt = match companion.image_prompt(text).await {
        Ok(p) => {
            bar.finish_and_clear();
            println!("  {} {}", dim("scene:"), p);
            p
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
            return;
        }
    };

    let bar = spinner("Generating the image…");
    match companion.image(&prompt).await {
        Ok(url) => {
            bar.finish_and_clear();
            println!("{} Image ready: {}", green("✔"), bold(&url));
            session.media.image_url = Some(url);
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("{}", red(&format!("✗ {e}")));
        }
    }
}

fn print_help() {
    println!("{}", cyan("— Commands —"));
    println!("  n  next page           p  previous page       g <N>  go to page N");
    println!("  a  narrate this page   m  music for this page");
    println!("  i  insights            e  emotion analysis    v      scene image");
    println!("  t  reprint page text   h  help                q      quit");
}
