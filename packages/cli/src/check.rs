use std::{collections::HashMap, rc::Rc};

use headsync::{
    config::{PageManifest, SiteConfig},
    HeadKey, HeadStore, HeadSynchronizer, MemoryHead, PageHead,
};

use crate::{marker, SiteArgs};

#[derive(clap::Args)]
pub(crate) struct CheckArgs {
    #[clap(flatten)]
    site: SiteArgs,

    /// How many times to walk through every page
    #[clap(long, default_value_t = 2)]
    rounds: usize,
}

pub(crate) fn check(args: CheckArgs) -> anyhow::Result<()> {
    let (site, manifest) = args.site.load()?;

    let problems = walk(&site, &manifest, args.rounds);
    for problem in &problems {
        tracing::error!("{problem}");
    }
    if !problems.is_empty() {
        anyhow::bail!("found {} problems in the synchronized head", problems.len());
    }

    tracing::info!(
        "{} pages stay clean over {} rounds of navigation",
        manifest.pages.len(),
        args.rounds
    );
    Ok(())
}

/// Navigate through every page in one shared document and collect everything that would leave
/// the head in a state other than the active page's descriptor.
///
/// Each page mounts before the previous one is released, the way client-side navigation
/// usually orders it.
pub(crate) fn walk(site: &SiteConfig, manifest: &PageManifest, rounds: usize) -> Vec<String> {
    let head = Rc::new(MemoryHead::new());
    let sync = HeadSynchronizer::new(head.clone());

    let mut problems = Vec::new();
    let mut previous: Option<PageHead> = None;

    for page in (0..rounds).flat_map(|_| manifest.pages.iter()) {
        let descriptor = site.descriptor(page);
        let marker = marker(page);

        // a page re-entering itself must give up its marker first
        if previous.as_ref().is_some_and(|prev| prev.marker() == marker) {
            previous = None;
        }

        let current = sync.activate(marker.as_str(), &descriptor);

        if let Some(prev) = previous.take() {
            let old = HeadKey::structured_data(prev.marker());
            prev.dispose();
            if head.count(&old) != 0 {
                problems.push(format!("{}: {old} survived deactivation", page.path));
            }
        }

        let desired: HashMap<HeadKey, String> = descriptor.entries().into_iter().collect();
        for key in desired.keys() {
            let count = head.count(key);
            if count != 1 {
                problems.push(format!("{}: {key} appears {count} times", page.path));
            }
        }

        let own_script = HeadKey::structured_data(marker.as_str());
        for (key, value) in head.entries() {
            if key == own_script {
                continue;
            }
            match desired.get(&key) {
                Some(wanted) if *wanted == value => {}
                Some(_) => problems.push(format!("{}: {key} has a stale value", page.path)),
                None => problems.push(format!("{}: stale {key} left behind", page.path)),
            }
        }

        if !descriptor.structured_data.is_empty() && head.count(&own_script) != 1 {
            problems.push(format!("{}: structured data is missing", page.path));
        }

        previous = Some(current);
    }

    problems
}
