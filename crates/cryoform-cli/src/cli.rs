use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Cryoform Developers",
    version,
    about = "Cryoform CLI - Formulation metrics, archetype classification, target-driven optimization and paste preservation advice for frozen desserts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional ingredient catalog (TOML or CSV) layered over the built-in one.
    /// Can be used multiple times; later catalogs win.
    #[arg(long = "catalog", global = true, value_name = "PATH")]
    pub catalogs: Vec<PathBuf>,

    /// Target band overrides in TOML format, merged over the built-in bands
    #[arg(long, global = true, value_name = "PATH")]
    pub bands: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimization.max-iterations=300
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the metrics of a recipe, classify it and check it against target bands.
    Analyze(AnalyzeArgs),
    /// Adjust ingredient quantities so a recipe meets numeric targets.
    Optimize(OptimizeArgs),
    /// Rank preservation methods for a flavor paste.
    Advise(AdviseArgs),
    /// Browse the ingredient catalog.
    Catalog(CatalogArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the recipe file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,

    /// Validate against this archetype instead of the classified one
    /// (white_base, finished_gelato, fruit_gelato, sorbet).
    #[arg(short, long, value_name = "NAME")]
    pub archetype: Option<String>,

    /// Override the percentage of water evaporated during cooking.
    #[arg(short, long, value_name = "PCT")]
    pub evaporation: Option<f64>,
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Path to the seed recipe file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,

    /// Write the optimized recipe to this file (TOML).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the maximum number of metrics evaluations.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override the step multiplier.
    #[arg(long, value_name = "FLOAT")]
    pub step_scale: Option<f64>,

    /// Target value, overriding the recipe file's targets. Can be used multiple times.
    /// Example: -T fat=8 -T pac=26
    #[arg(short = 'T', long = "target", value_name = "FIELD=VALUE")]
    pub targets: Vec<String>,

    /// Ingredient whose mass must not change. Can be used multiple times.
    #[arg(short, long = "lock", value_name = "INGREDIENT")]
    pub locked: Vec<String>,

    /// Rescale the result to the seed recipe's total mass.
    #[arg(long)]
    pub preserve_batch_mass: bool,

    /// Archetype whose bands are used for validation and default targets.
    #[arg(short, long, value_name = "NAME")]
    pub archetype: Option<String>,
}

/// Arguments for the `advise` subcommand.
#[derive(Args, Debug)]
pub struct AdviseArgs {
    /// Path to the paste file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub paste: PathBuf,

    /// Prefer ambient logistics.
    #[arg(long)]
    pub ambient: bool,

    /// Favor methods that need no additives.
    #[arg(long)]
    pub clean_label: bool,

    /// Largest particle carried by the paste, in millimetres.
    #[arg(long, value_name = "MM")]
    pub max_particle_mm: Option<f64>,
}

/// Arguments for the `catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List catalog ingredients.
    List {
        /// Only list ingredients of this category.
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
    },
    /// Show the full record of one ingredient, looked up by id, name or alias.
    Show {
        #[arg(required = true)]
        name: String,
    },
}
