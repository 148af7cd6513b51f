use crate::Result;
use crate::load::{DataFile, DataSet, LoadFailure};
use crate::model::{
    self, GroupView, MessageView, NodeView, OffcanvasPanel, PanelBody, PartView, SubnetView,
    TotalsView,
};
use crate::render::RenderOptions;
use crate::render::markup::{Markup, StackTraces, escape_html};

/// Data files each page needs before it renders anything.
pub const HIERARCHY_FILES: [DataFile; 2] = [DataFile::Nodes, DataFile::Groups];
pub const LOG_FILES: [DataFile; 2] = [DataFile::LogMessages, DataFile::Nodes];
pub const LOOP_FILES: [DataFile; 3] = [
    DataFile::LogMessages,
    DataFile::Nodes,
    DataFile::PrerenderedSubnets,
];

// Placeholders are substituted in a single left-to-right pass (see `fill`),
// so record text that happens to contain a placeholder is left alone.
const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; }
  .entry { margin: 2px 0; }
  .entry a { text-decoration: none; color: #333; }
  .custom-link { color: #0a58ca; cursor: pointer; }
  .custom-link-2 { color: #BB2D3B; font-weight: 600; }
  .custom-btn { border: 1px solid #ccc; border-radius: 4px; background: #F8F9FA; }
  .panel-section { margin-bottom: 8px; white-space: pre-line; }
  .svg-holder { overflow: auto; }
  .svg-holder g.node { cursor: pointer; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; margin-right: 8px; }
</style>
</head>
<body>
<nav class="navbar navbar-expand bg-light border-bottom mb-3 px-3">
  <a class="navbar-brand" href="index.html">Circuit report</a>
  <div class="navbar-nav">
    <a class="nav-link" href="hierarchy.html">Hierarchy</a>
    <a class="nav-link" href="logs.html">Log</a>
    <a class="nav-link" href="loops.html">Loops</a>
  </div>
</nav>
<main class="container-fluid">
<h2>__TITLE__</h2>
<div id="errorMessageTarget">__ERRORS__</div>
__CONTENT__
<div id="offcanvasTarget">__OFFCANVAS__</div>
</main>
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
<script>
__SCRIPT__
</script>
</body>
</html>
"#;

const POPOVER_SCRIPT: &str = r#"document.querySelectorAll('[data-bs-toggle="popover"]').forEach(function (el) {
  new bootstrap.Popover(el, { placement: 'right', trigger: 'click', html: true, sanitize: false });
});"#;

const LOOP_SCRIPT: &str = r#"document.querySelectorAll('.svg-holder g.node').forEach(function (node) {
  node.addEventListener('click', function () {
    var panel = document.getElementById('loop' + node.getAttribute('id'));
    if (panel) {
      bootstrap.Offcanvas.getOrCreateInstance(panel).show();
    } else {
      console.log('No details for node ' + node.getAttribute('id'));
    }
  });
});"#;

/// Substitute `__KEY__` placeholders in one pass over `template`.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, *value)))
            .min_by_key(|(pos, _, _)| *pos);
        match next {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

fn page(title: &str, errors: &str, content: &str, offcanvas: &str, script: &str) -> String {
    let title = escape_html(title);
    fill(
        PAGE_TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__ERRORS__", errors),
            ("__CONTENT__", content),
            ("__OFFCANVAS__", offcanvas),
            ("__SCRIPT__", script),
        ],
    )
}

/// Alert banners for data files that failed to load.
pub fn alert_banners(failures: &[&LoadFailure]) -> String {
    failures
        .iter()
        .map(|f| {
            format!(
                "<div class=\"alert alert-danger\" role=\"alert\" title=\"{}\">File {} does not exist or cannot be found.</div>\n",
                escape_html(&f.reason),
                escape_html(&f.path.display().to_string())
            )
        })
        .collect()
}

fn panel_html(panel: &OffcanvasPanel) -> String {
    let id_attr = panel
        .element_id
        .as_ref()
        .map(|id| format!(" id=\"{}\"", escape_html(id)))
        .unwrap_or_default();

    let body = match &panel.body {
        PanelBody::Removed => {
            "<p>This node has been removed during post processing</p>".to_string()
        }
        PanelBody::Sections(sections) => sections
            .iter()
            .map(|s| format!("<div class=\"panel-section\">{}</div>", s))
            .collect(),
    };

    format!(
        "<div class=\"offcanvas offcanvas-end\" tabindex=\"-1\"{}>\
         <div class=\"offcanvas-header\"><h5 class=\"offcanvas-title\">{}</h5>\
         <button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"offcanvas\" aria-label=\"Close\"></button></div>\
         <div class=\"offcanvas-body\">{}</div></div>\n",
        id_attr,
        escape_html(panel.title),
        body
    )
}

fn entry_link(anchor: Option<&str>, inner: &str) -> String {
    match anchor {
        Some(anchor) => format!(
            "<a href=\"{}\" data-bs-toggle=\"offcanvas\" role=\"button\">{}</a>",
            escape_html(anchor),
            inner
        ),
        None => format!("<a role=\"button\">{}</a>", inner),
    }
}

fn popover_button(content: &str) -> String {
    format!(
        "<button type=\"button\" class=\"btn btn-sm btn-outline-secondary\" data-bs-toggle=\"popover\" data-bs-content=\"{}\">Fields</button>",
        escape_html(content)
    )
}

fn node_entry(view: &NodeView) -> String {
    format!(
        "<p class=\"entry\">{} {}</p>\n",
        entry_link(view.anchor.as_deref(), &model::summary_markup(&view.summary)),
        popover_button(&view.popover)
    )
}

fn group_entry(view: &GroupView) -> String {
    let mut inner = model::summary_markup(&view.summary);
    if let Some(children) = &view.children {
        inner.push_str(&format!("<strong>children: {}</strong>", escape_html(children)));
    }
    format!(
        "<p class=\"entry\">{} {}</p>\n",
        entry_link(view.anchor.as_deref(), &inner),
        popover_button(&view.popover)
    )
}

fn part_html(part: &PartView) -> String {
    match part {
        PartView::Text(text) => format!("{} ", escape_html(text)),
        PartView::NodeLink { text, target } => format!(
            "<a class=\"custom-link\" href=\"#{target}\" data-bs-toggle=\"offcanvas\" role=\"button\" aria-controls=\"{target}\">{}</a> ",
            escape_html(text),
            target = escape_html(target)
        ),
        PartView::GroupLink { text, href } => format!(
            "<a class=\"custom-link\" href=\"{}\">{}</a> ",
            escape_html(href),
            escape_html(text)
        ),
        PartView::Subnet(count) => format!("<span class=\"subnet\">SUBNET({} nodes)</span> ", count),
        PartView::Other => String::new(),
    }
}

fn message_entry(view: &MessageView) -> String {
    let mut parts: String = view.parts.iter().map(part_html).collect();
    if view.is_loop {
        parts.push_str("<a class=\"custom-link-2\" href=\"loops.html\">Show as graph</a>");
    }
    format!(
        "<div class=\"card log-message mb-2\"><div class=\"card-body\">\
         <h6 class=\"msg-number\">Message {}:</h6>\
         <p><span class=\"severity\" style=\"color: {}\">{}</span> <span class=\"source text-muted\">{}</span></p>\
         <div class=\"parts\">{}</div></div></div>\n",
        view.number,
        view.color,
        escape_html(&view.severity),
        escape_html(&view.source),
        parts
    )
}

fn subnet_entry(view: &SubnetView) -> String {
    // SVG content is generated by Graphviz and inserted verbatim.
    format!(
        "<div class=\"card mb-3\"><div class=\"card-body\">\
         <h6>Subnet {} <span class=\"text-muted\">nodes: {}</span></h6>\
         <div class=\"svg-holder\" id=\"svg-holder-{}\">{}</div></div></div>\n",
        escape_html(&view.image_id),
        escape_html(&view.subnet_nodes.join(", ")),
        escape_html(&view.image_id),
        view.content
    )
}

fn panels_html(panels: &[OffcanvasPanel]) -> String {
    panels.iter().map(panel_html).collect()
}

/// Hierarchy page: every node and group with popover dumps and panels.
pub fn render_hierarchy_page(data: &DataSet, opts: &RenderOptions) -> String {
    let failures = data.failures_for(&HIERARCHY_FILES);
    let errors = alert_banners(&failures);

    let (nodes_html, groups_html, offcanvas) = if failures.is_empty() {
        let markup = Markup::new(&opts.links, StackTraces::Dropdown);
        let nodes = model::node_views(data.records(DataFile::Nodes), markup);
        let groups = model::group_views(data.records(DataFile::Groups), markup);

        let mut offcanvas = String::new();
        for v in &nodes {
            offcanvas.push_str(&panel_html(&v.panel));
        }
        for v in &groups {
            offcanvas.push_str(&panel_html(&v.panel));
        }
        (
            nodes.iter().map(node_entry).collect::<String>(),
            groups.iter().map(group_entry).collect::<String>(),
            offcanvas,
        )
    } else {
        Default::default()
    };

    let content = format!(
        "<div class=\"row\">\
         <div class=\"col\"><h4>Nodes</h4><div id=\"nodeTarget\">\n{}</div></div>\
         <div class=\"col\"><h4>Groups</h4><div id=\"groupTarget\">\n{}</div></div>\
         </div>",
        nodes_html, groups_html
    );

    page("Hierarchy", &errors, &content, &offcanvas, POPOVER_SCRIPT)
}

/// Log page: one card per log message.
pub fn render_log_page(data: &DataSet, opts: &RenderOptions) -> String {
    let failures = data.failures_for(&LOG_FILES);
    let errors = alert_banners(&failures);

    let (messages_html, offcanvas) = if failures.is_empty() {
        let markup = Markup::new(&opts.links, StackTraces::Dropdown);
        let (views, panels) = model::message_views(
            data.records(DataFile::LogMessages),
            data.records(DataFile::Nodes),
            markup,
        );
        (
            views.iter().map(message_entry).collect::<String>(),
            panels_html(&panels),
        )
    } else {
        Default::default()
    };

    let content = format!("<div id=\"messageTarget\">\n{}</div>", messages_html);
    page("Log", &errors, &content, &offcanvas, "")
}

/// Loop page: prerendered subnet SVGs with clickable nodes.
pub fn render_loop_page(data: &DataSet, opts: &RenderOptions) -> Result<String> {
    let failures = data.failures_for(&LOOP_FILES);
    let errors = alert_banners(&failures);

    let (svgs_html, offcanvas) = if failures.is_empty() {
        let markup = Markup::new(&opts.links, StackTraces::Dropdown);
        let (views, panels) = model::subnet_views(
            data.records(DataFile::PrerenderedSubnets),
            data.records(DataFile::Nodes),
            markup,
        )?;
        (
            views.iter().map(subnet_entry).collect::<String>(),
            panels_html(&panels),
        )
    } else {
        Default::default()
    };

    let content = format!("<div id=\"svgTarget\">\n{}</div>", svgs_html);
    Ok(page("Loops", &errors, &content, &offcanvas, LOOP_SCRIPT))
}

/// Index page: record counts and links to the views.
pub fn render_index_page(data: &DataSet, totals: &TotalsView) -> String {
    let failures: Vec<&LoadFailure> = data.failures().iter().collect();
    let errors = alert_banners(&failures);

    let content = format!(
        "<div class=\"mb-3\">\
         <span class=\"pill\">nodes: <b>{}</b></span>\
         <span class=\"pill\">groups: <b>{}</b></span>\
         <span class=\"pill\">messages: <b>{}</b></span>\
         <span class=\"pill\">signal loops: <b>{}</b></span>\
         <span class=\"pill\">subnets: <b>{}</b></span>\
         </div>\
         <ul>\
         <li><a href=\"hierarchy.html\">Node and group hierarchy</a></li>\
         <li><a href=\"logs.html\">Log messages</a></li>\
         <li><a href=\"loops.html\">Signal loops</a></li>\
         </ul>",
        totals.nodes, totals.groups, totals.messages, totals.loop_messages, totals.subnets
    );

    page("Circuit report", &errors, &content, "", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> DataSet {
        DataSet::from_records([
            (
                DataFile::Nodes,
                vec![json!({"id": 7, "name": "acc", "group": 0, "type": "register",
                            "stack_trace": [{"file": "/src/top.cpp", "line": 12}],
                            "clocks": ["clk"]})],
            ),
            (
                DataFile::Groups,
                vec![json!({"id": 0, "name": "top", "instanceName": "top0",
                            "stack_trace": [], "children": [7]})],
            ),
            (
                DataFile::LogMessages,
                vec![json!({"severity": "LOG_ERROR", "source": "POSTPROCESSING",
                            "message_parts": [
                                {"type": "string", "data": "Found a signal loop through"},
                                {"type": "node", "id": 7}
                            ]})],
            ),
            (
                DataFile::PrerenderedSubnets,
                vec![json!({"imageId": 0, "subnet_nodes": [7],
                            "content": "<svg id=\"svg-object-0\"><g id=\"7\" class=\"node\"></g></svg>"})],
            ),
        ])
    }

    fn missing(file: DataFile) -> LoadFailure {
        LoadFailure {
            file,
            path: std::path::Path::new("data").join(file.file_name()),
            reason: "not found".to_string(),
        }
    }

    #[test]
    fn fill_is_single_pass() {
        assert_eq!(
            fill("a __X__ b __Y__", &[("__X__", "__Y__"), ("__Y__", "y")]),
            "a __Y__ b y"
        );
    }

    #[test]
    fn hierarchy_lists_nodes_and_groups() {
        let html = render_hierarchy_page(&sample(), &RenderOptions::default());

        assert!(html.contains(
            "<a href=\"#node7\" data-bs-toggle=\"offcanvas\" role=\"button\">\
             <strong>id: </strong>7, <strong>name: </strong>acc, <strong>group: </strong>0, </a>"
        ));
        assert!(html.contains("<strong>children: 7</strong>"));
        assert!(html.contains("id=\"node7\""));
        assert!(html.contains("id=\"group0\""));
        assert!(html.contains("href=\"vscode://file/src/top.cpp:12\""));
        assert!(html.contains("Stacktrace: No stacktrace found for this node."));
        // popover bodies are attribute-escaped markup
        assert!(html.contains("data-bs-content=\"&lt;ul&gt;&lt;li&gt;&lt;strong&gt;id:"));
        assert!(!html.contains("alert-danger"));
    }

    #[test]
    fn hierarchy_shows_only_banner_when_data_missing() {
        let mut data = sample();
        data.push_failure(missing(DataFile::Groups));

        let html = render_hierarchy_page(&data, &RenderOptions::default());
        assert!(html.contains(
            "<div class=\"alert alert-danger\" role=\"alert\" title=\"not found\">File data/groups.js does not exist or cannot be found.</div>"
        ));
        assert!(!html.contains("#node7"));
        assert!(html.contains("<div id=\"nodeTarget\">\n</div>"));
    }

    #[test]
    fn log_page_renders_messages() {
        let html = render_log_page(&sample(), &RenderOptions::default());

        assert!(html.contains("Message 1:"));
        assert!(html.contains("style=\"color: #BB2D3B\">LOG_ERROR</span>"));
        assert!(html.contains("Found a signal loop through "));
        assert!(html.contains(">NODE(id: 7)</a>"));
        assert!(html.contains("id=\"log7\""));
        assert!(html.contains("href=\"loops.html\">Show as graph</a>"));
    }

    #[test]
    fn nodeport_and_subnet_parts_render() {
        assert_eq!(
            part_html(&PartView::NodeLink {
                text: "NODE(id: 7).port 1".to_string(),
                target: "log7".to_string()
            }),
            "<a class=\"custom-link\" href=\"#log7\" data-bs-toggle=\"offcanvas\" role=\"button\" aria-controls=\"log7\">NODE(id: 7).port 1</a> "
        );
        assert_eq!(
            part_html(&PartView::Subnet(2)),
            "<span class=\"subnet\">SUBNET(2 nodes)</span> "
        );

        let data = DataSet::from_records([
            (DataFile::Nodes, vec![json!({"id": 7, "name": "acc"})]),
            (
                DataFile::LogMessages,
                vec![json!({"severity": "LOG_INFO", "source": "DESIGN", "message_parts": [
                    {"type": "nodeport", "node": 7, "port": 1},
                    {"type": "subnet", "nodes": [7, 8]},
                    {"type": "group", "id": 2}
                ]})],
            ),
        ]);
        let html = render_log_page(&data, &RenderOptions::default());
        assert!(html.contains(
            "href=\"#log7\" data-bs-toggle=\"offcanvas\" role=\"button\" aria-controls=\"log7\">NODE(id: 7).port 1</a>"
        ));
        assert!(html.contains("<span class=\"subnet\">SUBNET(2 nodes)</span>"));
        assert!(html.contains("<a class=\"custom-link\" href=\"hierarchy.html#group2\">GROUP(id: 2)</a>"));
        assert!(html.contains("id=\"log7\""));
        assert!(!html.contains("id=\"log2\""));
    }

    #[test]
    fn log_page_banner_per_failed_file() {
        let mut data = sample();
        data.push_failure(missing(DataFile::LogMessages));
        data.push_failure(missing(DataFile::Nodes));

        let html = render_log_page(&data, &RenderOptions::default());
        assert_eq!(html.matches("alert-danger").count(), 2);
        assert!(!html.contains("Message 1:"));
    }

    #[test]
    fn loop_page_embeds_svg_and_panels() {
        let html = render_loop_page(&sample(), &RenderOptions::default()).unwrap();

        assert!(html.contains("<div class=\"svg-holder\" id=\"svg-holder-0\"><svg id=\"svg-object-0\">"));
        assert!(html.contains("id=\"loop7\""));
        assert!(html.contains("Clocks:\n<ul><li><strong>0:</strong> clk</li></ul>"));
    }

    #[test]
    fn loop_page_ignores_unrelated_failures() {
        let mut data = sample();
        data.push_failure(missing(DataFile::Groups));

        let html = render_loop_page(&data, &RenderOptions::default()).unwrap();
        assert!(!html.contains("alert-danger"));
    }

    #[test]
    fn index_page_counts() {
        let data = sample();
        let html = render_index_page(&data, &model::totals(&data));
        assert!(html.contains("nodes: <b>1</b>"));
        assert!(html.contains("signal loops: <b>1</b>"));
    }
}
