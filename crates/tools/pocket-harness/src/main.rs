//! CLI harness for exercising a vault outside the app
//!
//! This tool allows testing:
//! - Vault creation and inspection
//! - Adding notes, credentials and photos
//! - Listing in every tab and sort order
//! - Background timeout behaviour of the lock
//! - Fetch performance on large tables

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pocket_core::{
    AppLock, LifecycleEvent, LockEffect, ManualClock, MockAuthenticator, PasscodeConfig, Settings,
    VaultConfig,
};
use pocket_storage_sqlite::{
    migrations, CredentialTable, ListItems, NoteField, NoteTable, PhotoTable, RecordKind,
    RecordTable, SortOrder, Vault,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pocket-harness")]
#[command(about = "Secret Pocket vault testing harness", long_about = None)]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Tab {
    Memo,
    Image,
    Passcode,
}

impl From<Tab> for RecordKind {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Memo => RecordKind::Note,
            Tab::Image => RecordKind::Photo,
            Tab::Passcode => RecordKind::Credential,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vault if needed and print its settings
    Init,

    /// Record counts and schema version
    Stats,

    /// Add a note
    AddNote {
        /// Title; derived from the body when omitted
        #[arg(short, long)]
        title: Option<String>,

        /// Body text
        body: String,
    },

    /// Add a credential
    AddCredential {
        /// Title; the current date when omitted
        #[arg(short, long)]
        title: Option<String>,

        /// Up to four field values
        #[arg(num_args = 0..=4)]
        fields: Vec<String>,
    },

    /// Add a photo from an image file
    AddPhoto {
        /// Image file
        path: PathBuf,

        /// Title; the current date when omitted
        #[arg(short, long)]
        title: Option<String>,

        /// Quarter turns clockwise to apply before saving
        #[arg(short, long, default_value = "0")]
        rotate: u8,
    },

    /// List records of one tab
    List {
        /// Tab to show
        #[arg(short, long, value_enum, default_value = "memo")]
        tab: Tab,

        /// Sort index: 0 oldest first, 1 newest first, 2 by title
        #[arg(short, long)]
        sort: Option<i64>,
    },

    /// Simulate a background period and report whether the app relocks
    LockSim {
        /// Auto-lock timeout index
        #[arg(short, long, default_value = "1")]
        timeout_index: i64,

        /// Seconds spent in the background
        #[arg(short, long, default_value = "45")]
        background_secs: u64,
    },

    /// Insert notes and time paged fetches
    Benchmark {
        /// Notes to insert
        #[arg(short, long, default_value = "1000")]
        notes: usize,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,
    },
}

fn main() -> anyhow::Result<()> {
    pocket_core::init_logging("info");

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => VaultConfig::load_or_default(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VaultConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    match cli.command {
        Commands::Init => run_init(&config)?,
        Commands::Stats => run_stats(&config)?,
        Commands::AddNote { title, body } => run_add_note(&config, title, body)?,
        Commands::AddCredential { title, fields } => run_add_credential(&config, title, fields)?,
        Commands::AddPhoto {
            path,
            title,
            rotate,
        } => run_add_photo(&config, path, title, rotate)?,
        Commands::List { tab, sort } => run_list(&config, tab, sort)?,
        Commands::LockSim {
            timeout_index,
            background_secs,
        } => run_lock_sim(&config, timeout_index, background_secs)?,
        Commands::Benchmark { notes, runs } => run_benchmark(&config, notes, runs)?,
    }

    Ok(())
}

fn open(config: &VaultConfig) -> anyhow::Result<Vault> {
    Vault::open(config).with_context(|| format!("opening {}", config.database_path().display()))
}

fn run_init(config: &VaultConfig) -> anyhow::Result<()> {
    let vault = open(config)?;
    let settings = vault.settings();
    info!("Vault ready at {}", config.database_path().display());
    info!("  Tab: {}", RecordKind::from_tab(settings.selected_tab()).tab_title());
    info!("  Sort: {:?}", SortOrder::from_index(settings.sort_option()));
    info!("  Timeout: {}s", settings.timeout_seconds());
    info!("  Passcode unlock: {}", settings.use_password());
    info!("  Passcode set: {}", settings.has_main_passcode());
    info!("  Default locks: {:?}", settings.default_field_locks());
    Ok(())
}

fn run_stats(config: &VaultConfig) -> anyhow::Result<()> {
    let vault = open(config)?;
    let conn = vault.conn();
    info!("Schema version: {}", migrations::get_schema_version(conn)?);
    info!("  Notes: {}", NoteTable::count(conn)?);
    info!("  Photos: {}", PhotoTable::count(conn)?);
    info!("  Credentials: {}", CredentialTable::count(conn)?);
    Ok(())
}

fn run_add_note(config: &VaultConfig, title: Option<String>, body: String) -> anyhow::Result<()> {
    let vault = open(config)?;
    let mut editor = vault.note_editor();
    if let Some(title) = title {
        editor.set_text(NoteField::Title, &title);
    }
    if !editor.update_if_needed(vault.conn(), &body, NoteField::Body) {
        warn!("Body is blank, nothing saved");
        return Ok(());
    }
    info!("Saved note {:?} as {:?}", editor.draft().title, editor.draft().id);
    Ok(())
}

fn run_add_credential(
    config: &VaultConfig,
    title: Option<String>,
    fields: Vec<String>,
) -> anyhow::Result<()> {
    let vault = open(config)?;
    let mut editor = vault.credential_editor();
    if let Some(title) = title {
        editor.set_title(&title);
    }
    for (index, value) in fields.iter().enumerate() {
        editor.set_field(index, value);
    }
    editor.save(vault.conn())?;
    info!(
        "Saved credential {:?} as {:?}, hidden fields {:?}",
        editor.draft().title,
        editor.draft().id,
        editor.draft().locks()
    );
    Ok(())
}

fn run_add_photo(
    config: &VaultConfig,
    path: PathBuf,
    title: Option<String>,
    rotate: u8,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let vault = open(config)?;
    let mut editor = vault.photo_editor()?;
    editor.add_image(&bytes)?;
    for _ in 0..rotate % 4 {
        editor.rotate_clockwise()?;
    }
    if let Some(title) = title {
        editor.set_title(&title);
    }
    editor.save(vault.conn())?;
    info!(
        "Saved photo {:?} ({} bytes, thumbnail {} bytes, {:?})",
        editor.draft().title,
        editor.draft().image.len(),
        editor.draft().thumbnail.len(),
        editor.orientation()
    );
    Ok(())
}

fn run_list(config: &VaultConfig, tab: Tab, sort: Option<i64>) -> anyhow::Result<()> {
    let vault = open(config)?;
    let mut list = vault.record_list()?;
    list.select_tab(vault.conn(), vault.settings(), tab.into())?;
    if let Some(sort) = sort {
        list.set_sort(vault.conn(), vault.settings(), sort)?;
    }
    while !list.is_exhausted() {
        list.load_more(vault.conn())?;
    }

    info!("{} ({:?}, {} rows)", list.kind().tab_title(), list.sort(), list.items().len());
    match list.items() {
        ListItems::Notes(notes) => {
            for note in notes {
                info!("  [{}] {} ({:?})", note.modified_at, note.title, note.tag);
            }
        }
        ListItems::Photos(photos) => {
            for photo in photos {
                info!("  [{}] {} ({} bytes)", photo.modified_at, photo.title, photo.image.len());
            }
        }
        ListItems::Credentials(credentials) => {
            for credential in credentials {
                info!("  [{}] {} ({:?})", credential.modified_at, credential.title, credential.tag);
            }
        }
    }
    Ok(())
}

fn run_lock_sim(
    config: &VaultConfig,
    timeout_index: i64,
    background_secs: u64,
) -> anyhow::Result<()> {
    const CODE: &str = "135790";

    let settings = Settings::in_memory();
    settings.register_defaults()?;
    settings.set_timeout_index(timeout_index)?;
    settings.set_main_passcode(CODE)?;
    settings.set_help_shown(true)?;
    settings.set_first_launch_acknowledged(true)?;

    let passcode = PasscodeConfig {
        hash_new_passcodes: false,
        length: CODE.len(),
        ..config.passcode.clone()
    };
    let clock = Arc::new(ManualClock::new());
    let mut lock = AppLock::new(settings.clone(), passcode.clone(), clock.clone())
        .with_authenticator(Arc::new(MockAuthenticator::new()));

    lock.launch();
    for digit in CODE.chars() {
        lock.push_digit(digit);
    }
    clock.advance(passcode.debounce());
    let effects = lock.pump();
    if !effects.contains(&LockEffect::Unlocked) {
        anyhow::bail!("simulated unlock failed: {:?}", effects);
    }
    info!("Unlocked, timeout {}s", settings.timeout_seconds());

    lock.handle_lifecycle(LifecycleEvent::WillResignActive);
    lock.handle_lifecycle(LifecycleEvent::DidEnterBackground);
    clock.advance(Duration::from_secs(background_secs));
    let effects = lock.handle_lifecycle(LifecycleEvent::DidBecomeActive);

    info!("After {}s in background: {:?}", background_secs, lock.state());
    for effect in effects {
        info!("  {:?}", effect);
    }
    Ok(())
}

fn run_benchmark(config: &VaultConfig, notes: usize, runs: u32) -> anyhow::Result<()> {
    info!("Starting benchmark: {} notes, {} runs", notes, runs);

    let vault = Vault::open_in_memory(config, Arc::new(pocket_core::SystemClock))?;
    let start_time = Instant::now();
    for i in 0..notes {
        let mut editor = vault.note_editor();
        editor.update_if_needed(vault.conn(), &format!("note {i}\nbody"), NoteField::Body);
    }
    info!("  Inserted in {:.2}s", start_time.elapsed().as_secs_f64());

    let mut total_duration = Duration::ZERO;
    for run in 1..=runs {
        let start_time = Instant::now();
        let mut list = vault.record_list()?;
        while !list.is_exhausted() {
            list.load_more(vault.conn())?;
        }
        let elapsed = start_time.elapsed();
        info!(
            "Run {}/{}: {} rows in {:.3}s",
            run,
            runs,
            list.items().len(),
            elapsed.as_secs_f64()
        );
        total_duration += elapsed;
    }

    if runs > 0 {
        info!("Average fetch: {:.3}s", (total_duration / runs).as_secs_f64());
    }
    Ok(())
}
