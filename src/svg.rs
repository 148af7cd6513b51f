//! Preparation of Graphviz SVG renders for the loop view.
//!
//! A prerendered subnet is stored as
//! { "imageId": 3, "subnet_nodes": [12, 13], "content": "<svg id=\"svg-object-3\" ..." }
//! where `content` starts at the root `<svg` element (no XML prolog or
//! doctype) and the root carries a stable id so the page can find it.

use crate::Result;

use anyhow::Context;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Drop everything before the root `<svg` tag. Without one, nothing is left.
pub fn strip_header(svg: &str) -> &str {
    match svg.find("<svg") {
        Some(pos) => &svg[pos..],
        None => "",
    }
}

/// Element id given to the root of image `image_id`.
pub fn root_element_id(image_id: u64) -> String {
    format!("svg-object-{}", image_id)
}

/// Insert the root id at the first space (right after `<svg`).
pub fn tag_root(svg: &str, image_id: u64) -> String {
    let attr = format!(" id=\"{}\" ", root_element_id(image_id));
    match svg.find(' ') {
        Some(pos) => format!("{}{}{}", &svg[..pos], attr, &svg[pos + 1..]),
        None => svg.to_string(),
    }
}

/// Build a prerendered-subnet record from a raw Graphviz SVG.
pub fn prerendered_entry(image_id: u64, subnet_nodes: &[u64], raw_svg: &str) -> Value {
    json!({
        "imageId": image_id,
        "subnet_nodes": subnet_nodes,
        "content": tag_root(strip_header(raw_svg), image_id),
    })
}

/// Next unused image id among existing records.
pub fn next_image_id(entries: &[Value]) -> Result<u64> {
    match entries
        .iter()
        .filter_map(|e| e.get("imageId").and_then(Value::as_u64))
        .max()
    {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .with_context(|| format!("no image id left after {}", max)),
    }
}

/// Ids of the graph nodes drawn in `svg` (`<g id=".." class="node">`).
///
/// Returned in document order without duplicates.
pub fn node_ids(svg: &str) -> Result<Vec<String>> {
    let group_re = Regex::new(r#"<g\s[^>]*>"#)?;
    let class_re = Regex::new(r#"\sclass\s*=\s*"([^"]*)""#)?;
    let id_re = Regex::new(r#"\sid\s*=\s*"([^"]*)""#)?;

    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    for tag in group_re.find_iter(svg) {
        let tag = tag.as_str();
        let is_node = class_re
            .captures(tag)
            .and_then(|c| c.get(1))
            .is_some_and(|classes| classes.as_str().split_whitespace().any(|c| c == "node"));
        if !is_node {
            continue;
        }
        if let Some(id) = id_re.captures(tag).and_then(|c| c.get(1)) {
            let id = id.as_str().to_string();
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Parse a comma separated node id list such as `12, 13,14`.
pub fn parse_node_list(list: &str) -> Result<Vec<u64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("bad node id {:?}", s))
        })
        .collect()
}
