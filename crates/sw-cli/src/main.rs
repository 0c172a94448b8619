//! CLI frontend for the Streetwise rules engine and scene services.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sw",
    about = "Streetwise: dice, characters, and shared scenes",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice pool, optionally pushing it
    Roll {
        /// Attribute rating
        #[arg(short, long, default_value = "2")]
        attribute: u32,

        /// Skill rating
        #[arg(short, long, default_value = "0")]
        skill: u32,

        /// Extra dice (negative removes dice)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        modifier: i32,

        /// Current scene strain; adds that many strain dice
        #[arg(long, default_value = "0")]
        strain: u32,

        /// Push the roll
        #[arg(short, long)]
        push: bool,

        /// Push a second time (a talent allows it)
        #[arg(long, requires = "push")]
        twice: bool,

        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final roll as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a scene panic, or print the panic table
    Panic {
        /// Scene strain the panic is rolled against
        #[arg(long, default_value = "0")]
        strain: u32,

        /// Use this d6 result instead of rolling
        #[arg(short, long)]
        roll: Option<u32>,

        /// Print the whole table
        #[arg(short, long)]
        table: bool,

        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show how a character's dice pool for a skill is built
    Pool {
        /// Character JSON file (current or legacy format)
        file: PathBuf,

        /// Skill id (e.g. pinch, hoodwink) or attribute id with --attribute
        skill: String,

        /// Treat SKILL as an attribute for a raw attribute roll
        #[arg(long)]
        attribute: bool,

        /// Situational modifier
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        modifier: i32,

        /// Pending assistance dice
        #[arg(long, default_value = "0")]
        assistance: u32,
    },

    /// Roll on a d66 table
    D66 {
        /// Number of rolls
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// RNG seed for reproducible rolls
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate a character file, migrating the legacy format
    Import {
        /// Character JSON file
        file: PathBuf,

        /// Write the migrated character in the current format here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-export a character file in the current format
    Export {
        /// Character JSON file (current or legacy format)
        file: PathBuf,

        /// Directory to write the export to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List talents and their mechanics
    Talents {
        /// Only talents affecting this skill id
        skill: Option<String>,
    },

    /// Play a scripted scene on an in-memory room
    Scene {
        /// Successes (or banes) the scene challenge needs
        #[arg(short, long, default_value = "6")]
        target: u32,

        /// Maximum number of turns to play
        #[arg(long, default_value = "3")]
        turns: u32,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "sw=info" };
    let filter = std::env::var("SW_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Roll {
            attribute,
            skill,
            modifier,
            strain,
            push,
            twice,
            seed,
            json,
        } => commands::roll::run(
            commands::roll::Options {
                attribute,
                skill,
                modifier,
                strain,
                pushes: u32::from(push) + u32::from(twice),
                json,
            },
            seed,
        ),
        Commands::Panic {
            strain,
            roll,
            table,
            seed,
        } => {
            if table {
                commands::panic::table();
                Ok(())
            } else {
                commands::panic::run(strain, roll, seed)
            }
        }
        Commands::Pool {
            file,
            skill,
            attribute,
            modifier,
            assistance,
        } => commands::pool::run(&file, &skill, attribute, modifier, assistance),
        Commands::D66 { count, seed } => commands::d66::run(count, seed),
        Commands::Import { file, output } => commands::import::run(&file, output.as_deref()),
        Commands::Export { file, dir } => commands::export::run(&file, &dir),
        Commands::Talents { skill } => commands::talents::run(skill.as_deref()),
        Commands::Scene { target, turns } => commands::scene::run(target, turns),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
