use clap::{Parser, Subcommand};

mod diagnostics;
mod load;
mod model;
mod render;
mod spec;
mod svg;

use anyhow::Context;
use std::path::PathBuf;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "circuit-report")]
#[command(about = "Static HTML viewer for circuit design reports", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the hierarchy, log and loop pages from a data directory.
    Render {
        /// Directory holding nodes.js, groups.js, report.js, prerenderedSubnets.js.
        #[arg(long, default_value = "data")]
        data: PathBuf,

        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Prefix for stack frame source links.
        #[arg(long, env = "CIRCUIT_REPORT_LINK_PREFIX", default_value = "vscode://file")]
        link_prefix: String,

        /// Source file linked for frames that carry no file of their own.
        #[arg(long, env = "CIRCUIT_REPORT_FALLBACK_SOURCE", default_value = "")]
        fallback_source: String,

        /// Print record counts as JSON after rendering.
        #[arg(long)]
        json: bool,
    },

    /// Add a Graphviz SVG render of a subnet to prerenderedSubnets.js.
    Subnet {
        #[arg(long)]
        svg: PathBuf,

        /// Comma separated ids of the nodes in the subnet.
        #[arg(long, default_value = "")]
        nodes: String,

        #[arg(long, default_value = "data")]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(cli.verbose);

    match cli.cmd {
        Commands::Render {
            data,
            out,
            link_prefix,
            fallback_source,
            json,
        } => {
            let opts = render::RenderOptions {
                links: render::FrameLinks {
                    prefix: link_prefix,
                    fallback_source,
                },
            };

            let report = render::write_site(&data, &out, &opts)?;
            tracing::info!(pages = report.pages.len(), out = %out.display(), "site rendered");
            for failed in &report.totals.failed_files {
                diagnostics::warn(format!(
                    "{} could not be loaded; dependent pages show an alert",
                    failed
                ));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report.totals)?);
            }
            let index = std::path::absolute(&report.index).unwrap_or(report.index);
            println!("In a web browser, open file://{}", index.display());
        }

        Commands::Subnet {
            svg: svg_path,
            nodes,
            data,
        } => {
            let raw = std::fs::read_to_string(&svg_path).with_context(|| {
                diagnostics::error_message(format!("read {}", svg_path.display()))
            })?;
            let subnet_nodes = svg::parse_node_list(&nodes)?;

            let file = load::DataFile::PrerenderedSubnets;
            let path = data.join(file.file_name());
            let mut entries = if path.exists() {
                load::load_data_file(&data, file)?
            } else {
                Vec::new()
            };

            let image_id = svg::next_image_id(&entries)?;
            if svg::strip_header(&raw).is_empty() {
                diagnostics::warn(format!("{} contains no <svg> element", svg_path.display()));
            }
            entries.push(svg::prerendered_entry(image_id, &subnet_nodes, &raw));
            load::write_data_file(&path, file, &entries)?;

            println!("Added subnet image {} to {}", image_id, path.display());
        }
    }

    Ok(())
}
