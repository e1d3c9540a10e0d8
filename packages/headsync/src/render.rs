//! Write a [`MemoryHead`] out as HTML.
//!
//! On the server the head is collected into a [`MemoryHead`] while the page renders, then written
//! into the `<head>` of the response. Managed nodes carry the [`MANAGED_ATTRIBUTE`] so the browser
//! store adopts them instead of inserting copies.

use std::fmt::{self, Write};

use askama_escape::{escape, Html};

use crate::{HeadNode, MemoryHead, JSON_LD_TYPE, MANAGED_ATTRIBUTE, MARKER_ATTRIBUTE};

/// Render every node of the head, one per line, in document order.
pub fn render_head(head: &MemoryHead) -> String {
    let mut buf = String::new();
    _ = render_head_to(&mut buf, head);
    buf
}

pub fn render_head_to(buf: &mut impl Write, head: &MemoryHead) -> fmt::Result {
    for (node, managed) in head.nodes_with_ownership() {
        render_node(buf, &node, managed)?;
        buf.write_char('\n')?;
    }
    Ok(())
}

fn render_node(buf: &mut impl Write, node: &HeadNode, managed: bool) -> fmt::Result {
    let marker = if managed {
        format!(" {MANAGED_ATTRIBUTE}")
    } else {
        String::new()
    };

    match node {
        HeadNode::Title(text) => write!(buf, "<title>{}</title>", escape(text, Html)),
        HeadNode::Meta {
            attribute,
            key,
            content,
        } => write!(
            buf,
            "<meta {attribute}=\"{}\" content=\"{}\"{marker}>",
            escape(key, Html),
            escape(content, Html)
        ),
        HeadNode::Charset(charset) => write!(buf, "<meta charset=\"{}\">", escape(charset, Html)),
        HeadNode::Link { rel, href } => write!(
            buf,
            "<link rel=\"{}\" href=\"{}\"{marker}>",
            escape(rel, Html),
            escape(href, Html)
        ),
        HeadNode::Script { marker: id, json } => {
            write!(buf, "<script type=\"{JSON_LD_TYPE}\"")?;
            if let Some(id) = id {
                write!(buf, " {MARKER_ATTRIBUTE}=\"{}\"", escape(id, Html))?;
            }
            // the json was made safe for a script body when it was stored
            write!(buf, "{marker}>{json}</script>")
        }
    }
}
