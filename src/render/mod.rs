//! Page rendering: record markup and the static HTML site.

pub mod html;
pub mod markup;

pub use markup::FrameLinks;

use crate::Result;
use crate::load::{DataFile, DataSet};
use crate::model::{self, TotalsView};

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub links: FrameLinks,
}

/// A rendered page and the file name it is written under.
#[derive(Debug, Clone)]
pub struct Page {
    pub file_name: &'static str,
    pub html: String,
}

/// What `write_site` produced.
#[derive(Debug, Clone)]
pub struct SiteReport {
    pub index: PathBuf,
    pub pages: Vec<PathBuf>,
    pub totals: TotalsView,
}

/// Render every page from already loaded data.
pub fn render_site(data: &DataSet, opts: &RenderOptions) -> Result<Vec<Page>> {
    let totals = model::totals(data);
    Ok(vec![
        Page {
            file_name: "index.html",
            html: html::render_index_page(data, &totals),
        },
        Page {
            file_name: "hierarchy.html",
            html: html::render_hierarchy_page(data, opts),
        },
        Page {
            file_name: "logs.html",
            html: html::render_log_page(data, opts),
        },
        Page {
            file_name: "loops.html",
            html: html::render_loop_page(data, opts)?,
        },
    ])
}

/// Load `data_dir`, render the site, and write it into `out_dir`.
pub fn write_site(data_dir: &Path, out_dir: &Path, opts: &RenderOptions) -> Result<SiteReport> {
    let data = DataSet::load(data_dir, &DataFile::ALL);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let mut pages = Vec::new();
    for page in render_site(&data, opts)? {
        let path = out_dir.join(page.file_name);
        fs::write(&path, page.html).with_context(|| format!("write {}", path.display()))?;
        tracing::info!(page = %path.display(), "wrote page");
        pages.push(path);
    }

    Ok(SiteReport {
        index: out_dir.join("index.html"),
        pages,
        totals: model::totals(&data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::write_data_file;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn writes_all_pages_and_tolerates_missing_files() {
        let data_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        write_data_file(
            &data_dir.path().join("nodes.js"),
            DataFile::Nodes,
            &[json!({"id": 1, "name": "a", "group": 0})],
        )
        .unwrap();
        write_data_file(
            &data_dir.path().join("report.js"),
            DataFile::LogMessages,
            &[json!({"severity": "LOG_INFO", "source": "DESIGN",
                     "message_parts": [{"type": "node", "id": 1}]})],
        )
        .unwrap();

        let out = out_dir.path().join("site");
        let report = write_site(data_dir.path(), &out, &RenderOptions::default()).unwrap();

        let names: Vec<String> = report
            .pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["index.html", "hierarchy.html", "logs.html", "loops.html"]);
        assert_eq!(report.totals.failed_files, vec!["groups.js", "prerenderedSubnets.js"]);

        let logs = fs::read_to_string(out.join("logs.html")).unwrap();
        assert!(logs.contains("NODE(id: 1)"));
        assert!(!logs.contains("alert-danger"));

        let hierarchy = fs::read_to_string(out.join("hierarchy.html")).unwrap();
        assert!(hierarchy.contains("groups.js does not exist or cannot be found."));

        let loops = fs::read_to_string(out.join("loops.html")).unwrap();
        assert!(loops.contains("prerenderedSubnets.js does not exist or cannot be found."));
    }
}
