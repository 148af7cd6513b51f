//! View model: turn loaded records into per-page item views.
//!
//! Each view holds the already serialized markup its page fragment needs, so
//! the page renderer only stitches fragments together.

pub mod offcanvas;

pub use offcanvas::{OffcanvasPanel, PanelBody, PanelKind};

use crate::load::{DataFile, DataSet};
use crate::render::markup::{Markup, StackTraces, escape_html};
use crate::spec::{LogMessage, MessagePart, array_field, js_string, record_id, severity_color};
use crate::svg;
use crate::{Result, diagnostics};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Summary fields shown in a node's list line, in record order.
const NODE_SUMMARY_KEYS: [&str; 3] = ["id", "name", "group"];
const GROUP_SUMMARY_KEYS: [&str; 2] = ["id", "name"];

/// Lookup of node records by id.
#[derive(Debug, Clone, Copy)]
pub struct NodeIndex<'a> {
    nodes: &'a [Value],
}

impl<'a> NodeIndex<'a> {
    pub fn new(nodes: &'a [Value]) -> Self {
        NodeIndex { nodes }
    }

    /// The node with `id`; the last one wins if ids repeat.
    pub fn get(&self, id: &str) -> Option<&'a Value> {
        self.nodes
            .iter()
            .rev()
            .find(|n| record_id(n).as_deref() == Some(id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Offcanvas anchor (`#node{id}`); `None` when the record has no id.
    pub anchor: Option<String>,
    pub summary: Vec<(String, String)>,
    pub popover: String,
    pub panel: OffcanvasPanel,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub anchor: Option<String>,
    pub summary: Vec<(String, String)>,
    /// Member ids, comma separated; `None` when the group has none.
    pub children: Option<String>,
    pub popover: String,
    pub panel: OffcanvasPanel,
}

/// One rendered piece of a log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PartView {
    Text(String),
    /// Link text and the offcanvas it opens.
    NodeLink { text: String, target: String },
    /// Link text and an href into the hierarchy page.
    GroupLink { text: String, href: String },
    Subnet(usize),
    Other,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    /// 1-based position in the report.
    pub number: usize,
    pub severity: String,
    pub color: &'static str,
    pub source: String,
    pub parts: Vec<PartView>,
    /// Signal loop messages link to the loop page.
    pub is_loop: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubnetView {
    pub image_id: String,
    pub subnet_nodes: Vec<String>,
    pub content: String,
    /// Clickable node ids found in the SVG.
    pub svg_nodes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalsView {
    pub nodes: usize,
    pub groups: usize,
    pub messages: usize,
    pub loop_messages: usize,
    pub subnets: usize,
    pub failed_files: Vec<String>,
}

fn summary(record: &Value, keys: &[&str]) -> Vec<(String, String)> {
    match record.as_object() {
        Some(map) => map
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), js_string(v)))
            .collect(),
        None => Vec::new(),
    }
}

/// Views for the node list of the hierarchy page.
pub fn node_views(nodes: &[Value], markup: Markup<'_>) -> Vec<NodeView> {
    let popover = Markup::new(markup.links, StackTraces::Hidden);
    nodes
        .iter()
        .map(|node| {
            let id = record_id(node);
            NodeView {
                anchor: id.as_ref().map(|id| format!("#{}", PanelKind::Node.element_id(id))),
                summary: summary(node, &NODE_SUMMARY_KEYS),
                popover: popover.entity(Some(node)),
                panel: OffcanvasPanel::for_node(PanelKind::Node, id.as_deref(), Some(node), markup),
            }
        })
        .collect()
}

/// Views for the group list of the hierarchy page.
pub fn group_views(groups: &[Value], markup: Markup<'_>) -> Vec<GroupView> {
    let popover = Markup::new(markup.links, StackTraces::Hidden);
    groups
        .iter()
        .map(|group| {
            let id = record_id(group);
            let members = array_field(group, "children");
            GroupView {
                anchor: id.as_ref().map(|id| format!("#{}", PanelKind::Group.element_id(id))),
                summary: summary(group, &GROUP_SUMMARY_KEYS),
                children: (!members.is_empty())
                    .then(|| members.iter().map(js_string).collect::<Vec<_>>().join(", ")),
                popover: popover.entity(Some(group)),
                panel: OffcanvasPanel::for_group(id.as_deref(), group, markup),
            }
        })
        .collect()
}

/// Views for the log page, plus one offcanvas per referenced node.
pub fn message_views(
    messages: &[Value],
    nodes: &[Value],
    markup: Markup<'_>,
) -> (Vec<MessageView>, Vec<OffcanvasPanel>) {
    let index = NodeIndex::new(nodes);
    let mut panel_ids: BTreeSet<String> = BTreeSet::new();
    let mut panels = Vec::new();
    let mut views = Vec::new();

    for (i, raw) in messages.iter().enumerate() {
        let msg = LogMessage::from_value(raw);

        for node_id in msg.parts.iter().filter_map(MessagePart::node_id) {
            if panel_ids.insert(node_id.to_string()) {
                let node = index.get(node_id);
                if node.is_none() {
                    tracing::debug!(node = node_id, "log message references a removed node");
                }
                panels.push(OffcanvasPanel::for_node(
                    PanelKind::Log,
                    Some(node_id),
                    node,
                    markup,
                ));
            }
        }

        let parts = msg
            .parts
            .iter()
            .map(|part| match part {
                MessagePart::Text(text) => PartView::Text(text.clone()),
                MessagePart::Node(id) => PartView::NodeLink {
                    text: format!("NODE(id: {})", id),
                    target: PanelKind::Log.element_id(id),
                },
                MessagePart::NodePort { node, port } => PartView::NodeLink {
                    text: format!("NODE(id: {}).port {}", node, port),
                    target: PanelKind::Log.element_id(node),
                },
                MessagePart::Group(id) => PartView::GroupLink {
                    text: format!("GROUP(id: {})", id),
                    href: format!("hierarchy.html#{}", PanelKind::Group.element_id(id)),
                },
                MessagePart::Subnet(ids) => PartView::Subnet(ids.len()),
                MessagePart::Other(_) => PartView::Other,
            })
            .collect();

        views.push(MessageView {
            number: i + 1,
            color: severity_color(&msg.severity),
            is_loop: msg.reports_loop(),
            severity: msg.severity,
            source: msg.source,
            parts,
        });
    }

    (views, panels)
}

/// Views for the loop page, plus one offcanvas per node drawn in any SVG.
pub fn subnet_views(
    subnets: &[Value],
    nodes: &[Value],
    markup: Markup<'_>,
) -> Result<(Vec<SubnetView>, Vec<OffcanvasPanel>)> {
    let index = NodeIndex::new(nodes);
    let mut panel_ids: BTreeSet<String> = BTreeSet::new();
    let mut panels = Vec::new();
    let mut views = Vec::new();

    for subnet in subnets {
        let content = subnet
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let image_id = subnet.get("imageId").map(js_string).unwrap_or_default();
        if content.is_empty() {
            diagnostics::warn(format!("prerendered subnet {:?} has no SVG content", image_id));
        }

        let svg_nodes = svg::node_ids(&content)?;
        for id in &svg_nodes {
            if panel_ids.insert(id.clone()) {
                panels.push(OffcanvasPanel::for_node(
                    PanelKind::Loop,
                    Some(id),
                    index.get(id),
                    markup,
                ));
            }
        }

        views.push(SubnetView {
            image_id,
            subnet_nodes: array_field(subnet, "subnet_nodes").iter().map(js_string).collect(),
            content,
            svg_nodes,
        });
    }

    Ok((views, panels))
}

/// Counts for the index page.
pub fn totals(data: &DataSet) -> TotalsView {
    let loop_messages = data
        .records(DataFile::LogMessages)
        .iter()
        .filter(|m| LogMessage::from_value(m).reports_loop())
        .count();

    TotalsView {
        nodes: data.records(DataFile::Nodes).len(),
        groups: data.records(DataFile::Groups).len(),
        messages: data.records(DataFile::LogMessages).len(),
        loop_messages,
        subnets: data.records(DataFile::PrerenderedSubnets).len(),
        failed_files: data
            .failures()
            .iter()
            .map(|f| f.file.file_name().to_string())
            .collect(),
    }
}

/// Summary line markup: `<strong>key: </strong>value, ` per entry.
pub fn summary_markup(summary: &[(String, String)]) -> String {
    summary
        .iter()
        .map(|(k, v)| format!("<strong>{}: </strong>{}, ", escape_html(k), escape_html(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markup::FrameLinks;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn nodes() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "a", "group": 0, "stack_trace": [], "type": "signal",
                   "clocks": [], "inputPorts": [], "outputPorts": []}),
            json!({"id": 2, "name": "b", "group": 0, "type": "register"}),
        ]
    }

    #[test]
    fn node_index_last_match_wins() {
        let records = vec![json!({"id": 1, "v": "old"}), json!({"id": 1, "v": "new"})];
        let index = NodeIndex::new(&records);
        assert_eq!(index.get("1").unwrap()["v"], "new");
        assert!(index.get("9").is_none());
    }

    #[test]
    fn node_views_summarize_in_record_order() {
        let links = FrameLinks::default();
        let records = vec![json!({"group": 3, "name": "x", "type": "mux", "id": 5})];
        let views = node_views(&records, Markup::new(&links, StackTraces::Dropdown));

        assert_eq!(views[0].anchor.as_deref(), Some("#node5"));
        assert_eq!(
            summary_markup(&views[0].summary),
            "<strong>group: </strong>3, <strong>name: </strong>x, <strong>id: </strong>5, "
        );
        assert_eq!(views[0].panel.element_id.as_deref(), Some("node5"));
    }

    #[test]
    fn node_without_id_has_no_anchor() {
        let links = FrameLinks::default();
        let records = vec![json!({"name": "anon"})];
        let views = node_views(&records, Markup::new(&links, StackTraces::Dropdown));
        assert_eq!(views[0].anchor, None);
        assert_eq!(views[0].panel.element_id, None);
    }

    #[test]
    fn group_children_are_joined() {
        let links = FrameLinks::default();
        let records = vec![
            json!({"id": 0, "name": "top", "instanceName": "top0", "children": [1, 2]}),
            json!({"id": 1, "name": "leaf", "children": []}),
        ];
        let views = group_views(&records, Markup::new(&links, StackTraces::Dropdown));
        assert_eq!(views[0].children.as_deref(), Some("1, 2"));
        assert_eq!(views[1].children, None);
        assert_eq!(views[1].anchor.as_deref(), Some("#group1"));
    }

    #[test]
    fn messages_link_nodes_and_dedup_panels() {
        let links = FrameLinks::default();
        let messages = vec![
            json!({"severity": "LOG_WARNING", "source": "DESIGN", "message_parts": [
                {"type": "string", "data": "Detected a signal loop:"},
                {"type": "node", "id": 1},
                {"type": "nodeport", "node": 1, "port": 0},
                {"type": "group", "id": 4}
            ]}),
            json!({"severity": "LOG_INFO", "source": "DESIGN", "message_parts": [
                {"type": "node", "id": 99}
            ]}),
        ];
        let records = nodes();
        let (views, panels) =
            message_views(&messages, &records, Markup::new(&links, StackTraces::Dropdown));

        assert_eq!(views[0].number, 1);
        assert_eq!(views[0].color, "#FFC107");
        assert!(views[0].is_loop);
        assert!(!views[1].is_loop);
        assert_eq!(
            views[0].parts[1],
            PartView::NodeLink {
                text: "NODE(id: 1)".to_string(),
                target: "log1".to_string()
            }
        );
        assert_eq!(
            views[0].parts[2],
            PartView::NodeLink {
                text: "NODE(id: 1).port 0".to_string(),
                target: "log1".to_string()
            }
        );
        assert_eq!(
            views[0].parts[3],
            PartView::GroupLink {
                text: "GROUP(id: 4)".to_string(),
                href: "hierarchy.html#group4".to_string()
            }
        );

        let ids: Vec<Option<&str>> = panels.iter().map(|p| p.element_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("log1"), Some("log99")]);
        assert!(matches!(panels[1].body, PanelBody::Removed));
    }

    #[test]
    fn group_parts_link_to_hierarchy_without_log_panel() {
        let links = FrameLinks::default();
        let messages = vec![json!({"message_parts": [{"type": "group", "id": 3}]})];
        let records = nodes();
        let (views, panels) =
            message_views(&messages, &records, Markup::new(&links, StackTraces::Dropdown));

        assert_eq!(
            views[0].parts,
            vec![PartView::GroupLink {
                text: "GROUP(id: 3)".to_string(),
                href: "hierarchy.html#group3".to_string()
            }]
        );
        assert!(panels.is_empty());
    }

    #[test]
    fn subnet_parts_count_nodes() {
        let links = FrameLinks::default();
        let messages = vec![json!({"message_parts": [
            {"type": "subnet", "nodes": [1, 2, 3]},
            {"type": "subnet", "nodes": []}
        ]})];
        let (views, panels) =
            message_views(&messages, &nodes(), Markup::new(&links, StackTraces::Dropdown));

        assert_eq!(views[0].parts, vec![PartView::Subnet(3), PartView::Subnet(0)]);
        assert!(panels.is_empty());
    }

    #[test]
    fn subnets_find_svg_nodes() {
        let links = FrameLinks::default();
        let subnets = vec![json!({
            "imageId": 0,
            "subnet_nodes": [1, 2],
            "content": "<svg id=\"svg-object-0\"><g id=\"1\" class=\"node\"></g><g id=\"2\" class=\"node\"></g></svg>"
        })];
        let records = nodes();
        let (views, panels) =
            subnet_views(&subnets, &records, Markup::new(&links, StackTraces::Dropdown)).unwrap();

        assert_eq!(views[0].svg_nodes, vec!["1", "2"]);
        assert_eq!(views[0].subnet_nodes, vec!["1", "2"]);
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].element_id.as_deref(), Some("loop1"));
    }

    #[test]
    fn totals_count_records_and_failures() {
        let mut data = DataSet::from_records([
            (DataFile::Nodes, nodes()),
            (
                DataFile::LogMessages,
                vec![json!({"message_parts": [{"type": "string", "data": "a signal loop"}]})],
            ),
        ]);
        data.push_failure(crate::load::LoadFailure {
            file: DataFile::Groups,
            path: "data/groups.js".into(),
            reason: "missing".to_string(),
        });

        let t = totals(&data);
        assert_eq!(t.nodes, 2);
        assert_eq!(t.messages, 1);
        assert_eq!(t.loop_messages, 1);
        assert_eq!(t.failed_files, vec!["groups.js"]);
    }
}
