use std::{fs, path::PathBuf, rc::Rc};

use anyhow::Context;
use headsync::{
    config::{PageMeta, SiteConfig},
    render::render_head,
    HeadNode, HeadSynchronizer, MemoryHead,
};

use crate::{marker, SiteArgs};

#[derive(clap::Args)]
pub(crate) struct RenderArgs {
    #[clap(flatten)]
    site: SiteArgs,

    /// Write `<slug>.html` per page into this directory instead of printing to stdout
    #[clap(long)]
    out: Option<PathBuf>,

    /// The `<meta charset>` every head starts with
    #[clap(long, default_value = "utf-8")]
    charset: String,
}

pub(crate) fn render(args: RenderArgs) -> anyhow::Result<()> {
    let (site, manifest) = args.site.load()?;

    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("failed to create `{}`", out.display()))?;
    }

    for page in &manifest.pages {
        let html = render_page(&site, page, &args.charset);
        match &args.out {
            Some(out) => {
                let path = out.join(format!("{}.html", page.slug()));
                fs::write(&path, html)
                    .with_context(|| format!("failed to write `{}`", path.display()))?;
                tracing::info!("wrote {}", path.display());
            }
            None => println!("<!-- {} -->\n{html}", page.path),
        }
    }

    Ok(())
}

/// The head of one page, as the server would send it.
pub(crate) fn render_page(site: &SiteConfig, page: &PageMeta, charset: &str) -> String {
    let head = Rc::new(MemoryHead::new());
    head.seed(HeadNode::Charset(charset.to_string()));

    let sync = HeadSynchronizer::new(head.clone());
    let active = sync.activate(marker(page), &site.descriptor(page));
    tracing::debug!(
        "rendered {} with {} managed nodes",
        page.path,
        active.reconciliation().to_create.len()
    );

    let html = render_head(&head);
    drop(active);
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use headsync::config::PageManifest;

    #[test]
    fn renders_a_complete_head() {
        let site = SiteConfig::from_toml_str(
            r#"
            site_name = "Example"
            base_url = "https://example.com"
            "#,
        )
        .unwrap();
        let manifest = PageManifest::from_toml_str(
            r#"
            [[page]]
            path = "/jewelry"
            title = "Jewelry SEO"
            description = "Jewelry and accessories ecommerce SEO."
            "#,
        )
        .unwrap();

        let html = render_page(&site, &manifest.pages[0], "utf-8");
        let lines: Vec<&str> = html.lines().collect();

        assert_eq!(lines[0], "<meta charset=\"utf-8\">");
        assert_eq!(lines[1], "<title>Jewelry SEO</title>");
        assert_eq!(html.matches("<link rel=\"canonical\"").count(), 1);
        assert!(html.contains("href=\"https://example.com/jewelry\""));
        assert!(html.contains(
            "<meta name=\"twitter:card\" content=\"summary_large_image\" data-headsync>"
        ));
        assert_eq!(
            html.matches("data-headsync-id=\"headsync-jewelry\"").count(),
            1
        );
    }
}
