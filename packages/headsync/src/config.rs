//! Site-wide settings and per-page metadata, read from TOML.
//!
//! A [`SiteConfig`] holds what every page shares (site name, base URL, card type, the site's
//! owner). A [`PageMeta`] holds one page's copy. Together they produce the page's
//! [`MetadataDescriptor`].

use std::{fs, path::Path};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::schema::{self, FaqEntry, FaqPage, NodeRef, Person, Service, WebPage, WebSite};
use crate::{ConfigError, MetadataDescriptor, Result};

fn default_og_type() -> String {
    "website".to_string()
}

fn default_twitter_card() -> String {
    "summary_large_image".to_string()
}

/// Settings shared by every page of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Written to `og:site_name` and the `WebSite` node.
    pub site_name: String,

    /// The origin canonical URLs are built from, e.g. `https://example.com`.
    pub base_url: String,

    /// Default `og:type` for pages that do not set one.
    #[serde(default = "default_og_type")]
    pub og_type: String,

    #[serde(default = "default_twitter_card")]
    pub twitter_card: String,

    /// The person behind the site, emitted as a `Person` node and the site's publisher.
    #[serde(default)]
    pub owner: Option<OwnerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerConfig {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub same_as: Vec<String>,
}

/// The metadata of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Path below the base URL, `/` for the homepage.
    pub path: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub og_type: Option<String>,
    /// Absolute URL of the share image.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "faq")]
    pub faqs: Vec<FaqEntry>,
    #[serde(default)]
    pub service: Option<ServiceMeta>,
}

impl PageMeta {
    /// A file-system friendly name for the page: `/` is `index`, `/shopify/plus` is `shopify-plus`.
    ///
    /// A manifest never holds two pages with the same slug, so it also names the page's
    /// structured-data marker and prerendered file.
    pub fn slug(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        match trimmed.is_empty() {
            true => "index".to_string(),
            false => trimmed.replace('/', "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMeta {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub area_served: Option<String>,
}

/// Every page of a site, as `[[page]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageManifest {
    #[serde(default, rename = "page")]
    pub pages: Vec<PageMeta>,
}

impl SiteConfig {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        parse(data, Path::new(INLINE_SOURCE))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        parse(&read(path)?, path)
    }

    /// The absolute URL of a page path.
    ///
    /// The URL is not validated: whatever the base URL and path contain is written out as-is.
    pub fn page_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.origin())
    }

    fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// The full descriptor of a page: title, description, Open Graph and Twitter tags, canonical
    /// link and structured data.
    pub fn descriptor(&self, page: &PageMeta) -> MetadataDescriptor {
        let url = self.page_url(&page.path);
        let og_type = page.og_type.as_deref().unwrap_or(&self.og_type);

        let mut descriptor = MetadataDescriptor::new(page.title.as_str())
            .with_name("description", page.description.as_str())
            .with_property("og:title", page.title.as_str())
            .with_property("og:description", page.description.as_str())
            .with_property("og:url", url.as_str())
            .with_property("og:type", og_type)
            .with_property("og:site_name", self.site_name.as_str());

        if let Some(image) = &page.image {
            descriptor = descriptor.with_property("og:image", image.as_str());
        }

        descriptor = descriptor
            .with_name("twitter:card", self.twitter_card.as_str())
            .with_name("twitter:title", page.title.as_str())
            .with_name("twitter:description", page.description.as_str());

        if let Some(image) = &page.image {
            descriptor = descriptor.with_name("twitter:image", image.as_str());
        }

        descriptor.structured_data = self.structured_data(page, &url);
        descriptor.with_canonical(url)
    }

    /// The schema.org nodes of a page, linked by `@id`.
    fn structured_data(&self, page: &PageMeta, url: &str) -> Vec<serde_json::Value> {
        let website_id = format!("{}/#website", self.origin());
        let person_id = format!("{}/#person", self.origin());
        let service_id = format!("{url}#service");
        let owner = self.owner.as_ref().map(|_| NodeRef::new(person_id.as_str()));

        let mut nodes = vec![schema::to_payload(&WebPage {
            id: Some(format!("{url}#webpage")),
            url: url.to_string(),
            name: page.title.clone(),
            description: page.description.clone(),
            is_part_of: Some(NodeRef::new(website_id.as_str())),
            about: owner.clone(),
            main_entity: page
                .service
                .as_ref()
                .map(|_| NodeRef::new(service_id.as_str())),
        })];

        if let Some(service) = &page.service {
            nodes.push(schema::to_payload(&Service {
                id: Some(service_id),
                name: service.name.clone(),
                description: service.description.clone(),
                url: url.to_string(),
                service_type: service.service_type.clone(),
                area_served: service.area_served.clone(),
                provider: owner.clone(),
            }));
        }

        if !page.faqs.is_empty() {
            nodes.push(schema::to_payload(&FaqPage::from_entries(
                Some(format!("{url}#faq")),
                &page.faqs,
            )));
        }

        if let Some(person) = &self.owner {
            nodes.push(schema::to_payload(&Person {
                id: Some(person_id),
                name: person.name.clone(),
                url: person.url.clone(),
                job_title: person.job_title.clone(),
                same_as: person.same_as.clone(),
            }));
        }

        nodes.push(schema::to_payload(&WebSite {
            id: Some(website_id),
            url: format!("{}/", self.origin()),
            name: self.site_name.clone(),
            publisher: owner,
        }));

        nodes
    }
}

impl PageManifest {
    /// Parse a manifest. Two pages with the same path or the same slug are rejected.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let manifest: Self = parse(data, Path::new(INLINE_SOURCE))?;
        manifest.check_unique()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let manifest: Self = parse(&read(path)?, path)?;
        manifest.check_unique()?;
        Ok(manifest)
    }

    fn check_unique(&self) -> Result<()> {
        let mut paths = FxHashSet::default();
        let mut slugs: FxHashMap<String, &str> = FxHashMap::default();
        for page in &self.pages {
            if !paths.insert(page.path.trim_matches('/')) {
                return Err(ConfigError::DuplicatePage(page.path.clone()));
            }
            if let Some(first) = slugs.insert(page.slug(), &page.path) {
                return Err(ConfigError::SlugCollision {
                    first: first.to_string(),
                    second: page.path.clone(),
                    slug: page.slug(),
                });
            }
        }
        Ok(())
    }
}

/// Stands in for a file name when parsing TOML that came from memory.
const INLINE_SOURCE: &str = "<inline>";

fn parse<T: serde::de::DeserializeOwned>(data: &str, path: &Path) -> Result<T> {
    toml::from_str(data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String> {
    tracing::debug!("reading {}", path.display());
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
