//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use keelson::ops::ResolveOptions;

/// Keelson - package resolution for embedded C projects
#[derive(Parser)]
#[command(name = "keelson")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a target's packages and features
    Resolve(ResolveArgs),

    /// Show compile/link flags for a package
    Flags(FlagsArgs),

    /// Display the dependency tree of a package
    Tree(TreeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that resolves a target.
#[derive(Args)]
pub struct TargetArgs {
    /// Target to resolve (defaults to `[build] target` from config)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Enable an extra feature (may be repeated)
    #[arg(short = 'F', long = "feature", value_name = "FEATURE")]
    pub features: Vec<String>,

    /// Skip the required-capability check
    #[arg(long)]
    pub no_verify_caps: bool,
}

impl TargetArgs {
    /// Build resolve options, adding `packages` as extra roots.
    pub fn options(&self, packages: Vec<String>) -> ResolveOptions {
        ResolveOptions {
            target: self.target.clone(),
            features: self.features.clone(),
            packages,
            verify_caps: self.no_verify_caps.then_some(false),
        }
    }
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Package to show flags for (`path/to/pkg` or `@repo/path/to/pkg`)
    pub package: String,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Show compile arguments only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Print the compiler info as JSON
    #[arg(long, conflicts_with_all = ["compile", "link"])]
    pub json: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Package to show the tree for
    pub package: String,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
