//! Leafcoco: canonical layout and COCO export for the Plant Village apple
//! leaf dataset.
//!
//! Two batch jobs share one filesystem convention:
//!
//! 1. [`organize`] copies raw subcategory folders into the canonical
//!    `apples/{subcategory}/{variant}/{images,json,csv}` tree and
//!    [`splits`] derives `sets/{split}.txt` lists from the reference listing.
//! 2. [`coco`] reads the canonical tree and writes one COCO JSON document per
//!    split.
//!
//! # Modules
//!
//! - [`taxonomy`]: Fixed subcategory, variant and split tables
//! - [`layout`]: Raw and canonical directory layout
//! - [`boxes`]: Per-image bounding-box CSV format
//! - [`error`]: Error types for leafcoco operations

pub mod boxes;
pub mod coco;
pub mod error;
pub mod layout;
pub mod logging;
pub mod organize;
pub mod splits;
pub mod taxonomy;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LeafcocoError;
use logging::LogLevel;
use taxonomy::{Split, Subcategory, Variant, CANONICAL_CATEGORY};

/// The leafcoco CLI application.
#[derive(Parser)]
#[command(name = "leafcoco")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Minimum log level written to stderr.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogLevel::Info,
        env = "LEAFCOCO_LOG"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Copy raw folders into the canonical tree and derive split lists.
    Organize(OrganizeArgs),
    /// Export the canonical tree as COCO JSON, one file per split.
    Coco(CocoArgs),
}

/// Arguments for the organize subcommand.
#[derive(clap::Args)]
struct OrganizeArgs {
    /// Dataset root holding the raw folders.
    #[arg(long, env = "LEAFCOCO_ROOT", default_value = ".")]
    root: PathBuf,
}

/// Arguments for the coco subcommand.
#[derive(clap::Args)]
struct CocoArgs {
    /// Dataset root directory.
    #[arg(long, env = "LEAFCOCO_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output directory for COCO JSON files (default: <root>/annotations).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Category name.
    #[arg(long, default_value = CANONICAL_CATEGORY)]
    category: String,

    /// Subcategories to include, in priority order.
    #[arg(long, value_enum, num_args = 1.., default_values_t = Subcategory::ALL)]
    subcategories: Vec<Subcategory>,

    /// Dataset splits to generate.
    #[arg(long, value_enum, num_args = 1.., default_values_t = Split::ALL)]
    splits: Vec<Split>,

    /// Name outputs combined_<variant>_instances_<split>.json.
    #[arg(long)]
    combined: bool,

    /// Image variant to convert.
    #[arg(long, value_enum, default_value_t = Variant::Color)]
    variant: Variant,
}

/// Run the leafcoco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LeafcocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Organize(args)) => {
            logging::init_logging(cli.log_level)?;
            run_organize(args)
        }
        Some(Commands::Coco(args)) => {
            logging::init_logging(cli.log_level)?;
            run_coco(args)
        }
        None => {
            println!("leafcoco {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Canonical layout and COCO export for the Plant Village apple dataset.");
            println!();
            println!("Run 'leafcoco --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the organize subcommand.
fn run_organize(args: OrganizeArgs) -> Result<(), LeafcocoError> {
    let opts = organize::OrganizeOptions { root: args.root };

    let report = organize::organize_dataset(&opts)?;
    print!("{}", report);

    let split_report = splits::create_splits(&opts.root)?;
    print!("{}", split_report);

    println!("Done!");
    Ok(())
}

/// Execute the coco subcommand.
fn run_coco(args: CocoArgs) -> Result<(), LeafcocoError> {
    let out_dir = args.out.unwrap_or_else(|| args.root.join("annotations"));
    let opts = coco::CocoOptions {
        root: args.root,
        out_dir,
        category: args.category,
        subcategories: args.subcategories,
        splits: args.splits,
        combined: args.combined,
        variant: args.variant,
    };

    let report = coco::convert(&opts)?;
    print!("{}", report);
    Ok(())
}
