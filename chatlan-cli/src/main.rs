mod chat;

use anyhow::{Context, Result};
use chatlan_core::store::{JsonProfileStore, ProfileStore};
use chatlan_core::{Language, Role, UserProfile};
use chatlan_session::{SessionConfig, TransportConfig};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatlan", version, about = "Group chat over direct peer links, no server needed")]
struct Cli {
    /// Profile file (defaults to ~/.chatlan/profile.json).
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Log handshake and transport details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct LinkArgs {
    /// STUN server URL; by default only local candidates are used.
    #[arg(long = "ice")]
    ice_servers: Vec<String>,

    /// Seconds a handshake may take before it is dropped.
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Also offer loopback candidates (two sessions on one machine).
    #[arg(long)]
    loopback: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a group and hand out offer tokens.
    Host(LinkArgs),

    /// Join a group by pasting the host's offer token.
    Join(LinkArgs),

    /// Show or change the local profile.
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum)]
        language: Option<LanguageArg>,

        /// Forget the stored profile.
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    En,
    Es,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::En,
            LanguageArg::Es => Language::Es,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = JsonProfileStore::new(cli.profile.clone().unwrap_or_else(default_profile_path));

    match cli.command {
        Commands::Host(args) => run_session(Role::Host, &store, args).await,
        Commands::Join(args) => run_session(Role::Guest, &store, args).await,
        Commands::Profile {
            name,
            language,
            reset,
        } => manage_profile(&store, name, language, reset),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_profile_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".chatlan").join("profile.json")
}

async fn run_session(role: Role, store: &JsonProfileStore, args: LinkArgs) -> Result<()> {
    let profile = ensure_profile(store)?;

    let transport = TransportConfig {
        ice_servers: args.ice_servers,
        include_loopback: args.loopback,
    };
    let config = SessionConfig {
        handshake_timeout: Duration::from_secs(args.timeout),
        ..SessionConfig::default()
    };

    chat::run(role, &profile, transport, config).await
}

/// Loads the stored profile, asking for a name the first time.
fn ensure_profile(store: &JsonProfileStore) -> Result<UserProfile> {
    if let Some(profile) = store.profile().context("Failed to read profile")? {
        return Ok(profile);
    }

    println!("{}", "No profile yet, let's create one.".cyan());
    let profile = loop {
        let name = Input::<String>::new()
            .with_prompt("Display name")
            .interact_text()
            .context("Failed to read display name")?;
        if let Some(profile) = UserProfile::new(&name) {
            break profile;
        }
        println!("{}", "Name cannot be empty.".yellow());
    };

    store
        .set_profile(&profile)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;
    println!("Saved profile to {}", store.path().display());
    Ok(profile)
}

fn manage_profile(
    store: &JsonProfileStore,
    name: Option<String>,
    language: Option<LanguageArg>,
    reset: bool,
) -> Result<()> {
    if reset {
        let confirmed = Confirm::new()
            .with_prompt("Forget the stored profile?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if confirmed {
            store.clear().context("Failed to clear profile")?;
            println!("{}", "Profile cleared.".green());
        }
        return Ok(());
    }

    if let Some(name) = name {
        let profile = UserProfile::new(&name).context("Name cannot be empty")?;
        store.set_profile(&profile).context("Failed to write profile")?;
    }
    if let Some(language) = language {
        store
            .set_language(language.into())
            .context("Failed to write language")?;
    }

    match store.profile().context("Failed to read profile")? {
        Some(profile) => {
            println!("{} {}", "Name:".bold(), profile.name);
            println!("{} {}", "Id:".bold(), profile.id);
            println!("{} {}", "Avatar:".bold(), profile.avatar_color);
        }
        None => println!("{}", "No profile stored.".yellow()),
    }
    println!("{} {:?}", "Language:".bold(), store.language()?);
    println!("{} {}", "File:".bold(), store.path().display());
    Ok(())
}
