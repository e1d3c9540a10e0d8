use std::rc::Rc;

use headsync::{
    AttributeKind, HeadKey, HeadNode, HeadStore, HeadSynchronizer, MemoryHead, MetadataDescriptor,
};
use serde_json::{json, Value};

fn attached() -> (Rc<MemoryHead>, HeadSynchronizer) {
    let head = Rc::new(MemoryHead::new());
    let sync = HeadSynchronizer::new(head.clone());
    (head, sync)
}

fn description() -> HeadKey {
    HeadKey::meta(AttributeKind::Name, "description")
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[test]
fn meta_upsert_is_idempotent() {
    let (head, sync) = attached();

    sync.upsert_meta_tag(AttributeKind::Name, "description", "Jewelry SEO");
    sync.upsert_meta_tag(AttributeKind::Name, "description", "Jewelry SEO");

    assert_eq!(head.count(&description()), 1);
    assert_eq!(
        head.meta_content(AttributeKind::Name, "description").as_deref(),
        Some("Jewelry SEO")
    );
    assert_eq!(head.len(), 1);
}

#[test]
fn meta_upsert_overwrites() {
    let (head, sync) = attached();

    sync.upsert_meta_tag(AttributeKind::Name, "description", "A");
    sync.upsert_meta_tag(AttributeKind::Name, "description", "B");

    assert_eq!(head.count(&description()), 1);
    assert_eq!(
        head.meta_content(AttributeKind::Name, "description").as_deref(),
        Some("B")
    );
}

#[test]
fn malformed_keys_pass_through() {
    let (head, sync) = attached();

    sync.upsert_meta_tag(AttributeKind::Property, "og:\"weird key", "");
    sync.upsert_meta_tag(AttributeKind::Property, "og:\"weird key", "");

    let key = HeadKey::meta(AttributeKind::Property, "og:\"weird key");
    assert_eq!(head.count(&key), 1);
    assert_eq!(head.entries(), vec![(key, String::new())]);
}

#[test]
fn canonical_link_stays_unique() {
    let (head, sync) = attached();

    let urls = [
        "https://example.com/a",
        "https://example.com/b",
        "not even a url",
        "https://example.com/jewelry",
    ];
    for url in urls {
        sync.upsert_canonical_link(url);
    }

    assert_eq!(head.count(&HeadKey::Canonical), 1);
    assert_eq!(
        head.canonical().as_deref(),
        Some("https://example.com/jewelry")
    );
}

#[test]
fn structured_data_is_replaced() {
    let (head, sync) = attached();

    let payload_a = json!({ "@context": "https://schema.org", "@type": "WebPage", "name": "A" });
    let payload_b = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": []
    });

    sync.replace_structured_data("page-x", &[payload_a]);
    sync.replace_structured_data("page-x", &[payload_b.clone()]);

    assert_eq!(head.count(&HeadKey::structured_data("page-x")), 1);
    assert_eq!(parse(&head.script("page-x").unwrap()), payload_b);
}

#[test]
fn empty_payloads_remove_the_script() {
    let (head, sync) = attached();

    sync.replace_structured_data("page-x", &[json!({ "@type": "WebPage" })]);
    sync.replace_structured_data("page-x", &[]);

    assert_eq!(head.count(&HeadKey::structured_data("page-x")), 0);
}

#[test]
fn markers_are_isolated() {
    let (head, sync) = attached();

    sync.replace_structured_data("a", &[json!({ "@type": "WebPage", "name": "A" })]);
    sync.replace_structured_data("b", &[json!({ "@type": "WebPage", "name": "B" })]);
    let b_before = head.script("b").unwrap();

    assert!(sync.remove_structured_data("a"));
    assert!(!sync.remove_structured_data("a"));

    assert_eq!(head.count(&HeadKey::structured_data("a")), 0);
    assert_eq!(head.script("b").as_deref(), Some(b_before.as_str()));
}

#[test]
fn jewelry_page_end_to_end() {
    let (head, sync) = attached();

    let descriptor = MetadataDescriptor::new("Jewelry SEO")
        .with_name("description", "Jewelry and accessories ecommerce SEO...")
        .with_canonical("https://example.com/jewelry")
        .with_structured_data(json!({
            "@type": "FAQPage",
            "mainEntity": [{
                "@type": "Question",
                "name": "How long does SEO take?",
                "acceptedAnswer": { "@type": "Answer", "text": "Three to six months." }
            }]
        }));

    let page = sync.activate("jewelry", &descriptor);

    assert_eq!(head.title().as_deref(), Some("Jewelry SEO"));
    assert_eq!(head.count(&description()), 1);
    assert_eq!(
        head.meta_content(AttributeKind::Name, "description").as_deref(),
        Some("Jewelry and accessories ecommerce SEO...")
    );
    assert_eq!(head.count(&HeadKey::Canonical), 1);
    assert_eq!(
        head.canonical().as_deref(),
        Some("https://example.com/jewelry")
    );

    let scripts = head
        .nodes()
        .into_iter()
        .filter(|node| matches!(node, HeadNode::Script { .. }))
        .count();
    assert_eq!(scripts, 1);

    let json = parse(&head.script("jewelry").unwrap());
    assert_eq!(json["@type"], "FAQPage");
    assert_eq!(json["@context"], "https://schema.org");

    drop(page);
}

#[test]
fn deactivation_removes_only_structured_data() {
    let (head, sync) = attached();

    let descriptor = MetadataDescriptor::new("Shopify SEO")
        .with_name("description", "Shopify stores")
        .with_canonical("https://example.com/shopify")
        .with_structured_data(json!({ "@type": "Service" }));

    let page = sync.activate("shopify", &descriptor);
    assert_eq!(head.count(&HeadKey::structured_data("shopify")), 1);

    assert!(page.dispose());

    assert_eq!(head.count(&HeadKey::structured_data("shopify")), 0);
    assert_eq!(head.title().as_deref(), Some("Shopify SEO"));
    assert_eq!(head.count(&description()), 1);
    assert_eq!(head.count(&HeadKey::Canonical), 1);
}

#[test]
fn dropping_the_handle_deactivates() {
    let (head, sync) = attached();

    {
        let _page = sync.activate(
            "scoped",
            &MetadataDescriptor::new("t").with_structured_data(json!({ "@type": "WebPage" })),
        );
        assert!(head.script("scoped").is_some());
    }

    assert!(head.script("scoped").is_none());
}

#[test]
fn navigation_leaves_no_stale_state() {
    let (head, sync) = attached();

    let home = MetadataDescriptor::new("Home")
        .with_name("description", "home")
        .with_property("og:image", "https://example.com/home.png")
        .with_canonical("https://example.com/")
        .with_structured_data(json!({ "@type": "WebSite" }));
    let about = MetadataDescriptor::new("About")
        .with_name("description", "about")
        .with_structured_data(json!({ "@type": "Person" }));

    // the next page mounts before the previous one unmounts
    let first = sync.activate("home", &home);
    let second = sync.activate("about", &about);
    drop(first);

    assert_eq!(head.title().as_deref(), Some("About"));
    assert_eq!(
        head.meta_content(AttributeKind::Property, "og:image"),
        None,
        "og:image of the previous page leaked"
    );
    assert_eq!(head.count(&HeadKey::Canonical), 0);
    assert!(head.script("home").is_none());
    assert!(head.script("about").is_some());

    let keys: Vec<HeadKey> = head.entries().into_iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        vec![
            HeadKey::Title,
            description(),
            HeadKey::structured_data("about"),
        ]
    );

    drop(second);
}

#[test]
fn repeated_activation_does_not_grow_the_head() {
    let (head, sync) = attached();

    let descriptor = MetadataDescriptor::new("Home")
        .with_name("description", "home")
        .with_property("og:title", "Home")
        .with_name("twitter:card", "summary_large_image")
        .with_canonical("https://example.com/")
        .with_structured_data(json!({ "@type": "WebSite" }));

    let page = sync.activate("home", &descriptor);
    let size = head.len();
    drop(page);

    for _ in 0..5 {
        let page = sync.activate("home", &descriptor);
        assert_eq!(head.len(), size);
        assert!(page.reconciliation().is_noop());
        drop(page);
    }
}

#[test]
fn resynchronizing_collapses_copies_added_since_the_last_run() {
    let (head, sync) = attached();
    let descriptor = MetadataDescriptor::new("Jewelry SEO").with_name("description", "fresh");
    sync.synchronize(&descriptor);

    // a third-party script injects its own description with the same key
    head.seed(HeadNode::Meta {
        attribute: AttributeKind::Name,
        key: "description".into(),
        content: "stale".into(),
    });
    assert_eq!(head.count(&description()), 2);

    let plan = sync.synchronize(&descriptor);

    assert_eq!(head.count(&description()), 1);
    assert_eq!(
        head.meta_content(AttributeKind::Name, "description").as_deref(),
        Some("fresh")
    );
    assert_eq!(plan.to_update, vec![(description(), "fresh".to_string())]);
    assert_eq!(plan.unchanged, 1);

    assert!(sync.synchronize(&descriptor).is_noop());
}

#[test]
fn template_nodes_survive_synchronization() {
    let head = Rc::new(MemoryHead::new());
    head.seed(HeadNode::Charset("utf-8".into()));
    head.seed(HeadNode::Meta {
        attribute: AttributeKind::Name,
        key: "viewport".into(),
        content: "width=device-width, initial-scale=1".into(),
    });
    head.seed(HeadNode::Link {
        rel: "stylesheet".into(),
        href: "/main.css".into(),
    });
    let sync = HeadSynchronizer::new(head.clone());

    let page = sync.activate("home", &MetadataDescriptor::new("Home"));
    drop(page);
    let page = sync.activate("about", &MetadataDescriptor::new("About"));
    drop(page);

    assert_eq!(head.len(), 4);
    assert!(head.meta_content(AttributeKind::Name, "viewport").is_some());
    assert!(head.nodes().contains(&HeadNode::Charset("utf-8".into())));
}

#[test]
fn detached_synchronizer_does_nothing() {
    let sync = HeadSynchronizer::detached();
    assert!(!sync.is_attached());

    sync.apply_title("t");
    sync.upsert_meta_tag(AttributeKind::Name, "description", "d");
    sync.upsert_canonical_link("https://example.com/");
    sync.replace_structured_data("m", &[json!({ "@type": "WebPage" })]);
    assert!(!sync.remove_structured_data("m"));

    let plan = sync.synchronize(&MetadataDescriptor::new("t"));
    assert!(plan.is_noop());

    let page = sync.activate("m", &MetadataDescriptor::new("t"));
    assert!(!page.is_active());
    assert!(!page.dispose());
}
