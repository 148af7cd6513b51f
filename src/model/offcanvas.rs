//! Slide-in detail panels holding a record's full field dump.

use crate::render::markup::Markup;
use crate::spec::array_field;

use serde::Serialize;
use serde_json::Value;

/// Which page a panel belongs to; decides its element id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelKind {
    Node,
    Group,
    Log,
    Loop,
}

impl PanelKind {
    pub fn prefix(self) -> &'static str {
        match self {
            PanelKind::Node => "node",
            PanelKind::Group => "group",
            PanelKind::Log => "log",
            PanelKind::Loop => "loop",
        }
    }

    pub fn element_id(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }

    fn title(self) -> &'static str {
        match self {
            PanelKind::Group => "Group details",
            _ => "Node details",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum PanelBody {
    /// The referenced record is not in the data (dropped during post processing).
    Removed,
    /// Pre-rendered markup, one entry per section.
    Sections(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
pub struct OffcanvasPanel {
    pub kind: PanelKind,
    pub element_id: Option<String>,
    pub title: &'static str,
    pub body: PanelBody,
}

impl OffcanvasPanel {
    /// Panel for a node record; `node` is `None` when the id is unknown.
    pub fn for_node(
        kind: PanelKind,
        id: Option<&str>,
        node: Option<&Value>,
        markup: Markup<'_>,
    ) -> Self {
        let body = match node {
            None => PanelBody::Removed,
            Some(node) => PanelBody::Sections(vec![
                markup.property(node, "id", "Node ID"),
                markup.property(node, "name", "Name"),
                markup.property(node, "group", "Group"),
                markup.stack_trace(array_field(node, "stack_trace")),
                markup.property(node, "type", "Type"),
                markup.property(node, "meta", "Meta information"),
                markup.property(node, "clocks", "Clocks"),
                markup.property(node, "inputPorts", "Input ports"),
                markup.property(node, "outputPorts", "Output ports"),
            ]),
        };

        OffcanvasPanel {
            kind,
            element_id: id.map(|id| kind.element_id(id)),
            title: kind.title(),
            body,
        }
    }

    pub fn for_group(id: Option<&str>, group: &Value, markup: Markup<'_>) -> Self {
        OffcanvasPanel {
            kind: PanelKind::Group,
            element_id: id.map(|id| PanelKind::Group.element_id(id)),
            title: PanelKind::Group.title(),
            body: PanelBody::Sections(vec![
                markup.property(group, "id", "Node ID"),
                markup.property(group, "name", "Name"),
                markup.property(group, "instanceName", "Instance Name"),
                markup.stack_trace(array_field(group, "stack_trace")),
                markup.property(group, "children", "Children"),
            ]),
        }
    }
}
