//! headsync for the browser
//!
//! [`WebHead`] is a [`headsync::HeadStore`] that reads and writes `document.head` through web-sys.
//!
//! ```rust, no_run
//! use headsync::MetadataDescriptor;
//!
//! let sync = headsync_web::synchronizer();
//! let page = sync.activate(
//!     "home",
//!     &MetadataDescriptor::new("Home").with_name("description", "Ecommerce SEO"),
//! );
//!
//! // keep `page` alive for as long as the page is shown
//! drop(page);
//! ```
//!
//! Heads prerendered on the server with `headsync::render` carry the `data-headsync` attribute, so
//! the first synchronization in the browser adopts those nodes instead of inserting copies.

mod document;

pub use crate::document::WebHead;

use headsync::HeadSynchronizer;

/// A synchronizer for the current document, or a detached one if there is no window, document or
/// `<head>`.
pub fn synchronizer() -> HeadSynchronizer {
    match WebHead::get() {
        Some(head) => HeadSynchronizer::new(head),
        None => {
            tracing::debug!("no document head available, head synchronization is disabled");
            HeadSynchronizer::detached()
        }
    }
}
