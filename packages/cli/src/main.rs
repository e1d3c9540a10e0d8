use std::path::PathBuf;

use clap::Parser;
use headsync::config::{PageManifest, PageMeta, SiteConfig};

mod check;
mod render;
mod tracer;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracer::build_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => render::render(args),
        Commands::Check(args) => check::check(args),
    }
}

#[derive(Parser)]
#[clap(name = "headsync", version)]
struct Cli {
    /// Log what every synchronization does
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render the head of every page to HTML
    #[clap(name = "render")]
    Render(render::RenderArgs),

    /// Walk every page through one document and verify the head stays clean
    #[clap(name = "check")]
    Check(check::CheckArgs),
}

/// The inputs every command shares
#[derive(clap::Args)]
pub(crate) struct SiteArgs {
    /// The site configuration
    #[clap(long, default_value = "site.toml")]
    site: PathBuf,

    /// The page manifest
    #[clap(long, default_value = "pages.toml")]
    pages: PathBuf,
}

impl SiteArgs {
    pub(crate) fn load(&self) -> anyhow::Result<(SiteConfig, PageManifest)> {
        let site = SiteConfig::load(&self.site)?;
        let manifest = PageManifest::load(&self.pages)?;
        tracing::info!(
            "loaded {} pages for {}",
            manifest.pages.len(),
            site.site_name
        );
        Ok((site, manifest))
    }
}

/// The structured-data marker of a page.
pub(crate) fn marker(page: &PageMeta) -> String {
    format!("headsync-{}", page.slug())
}
