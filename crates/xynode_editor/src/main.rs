// SPDX-License-Identifier: MIT OR Apache-2.0
//! `xynode` - headless node graph tool.
//!
//! Creates, inspects and edits graph files written by the `XYNode` editor.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use xynode_editor::Document;
use xynode_graph::{create_calculator_registry, ClipboardData, EditorConfig, Point, SceneData};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Editor configuration file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the three-node sample graph
    Demo {
        /// Output file
        out: PathBuf,
    },
    /// Print node and edge counts and a per-node summary
    Info {
        /// Graph file
        file: PathBuf,
    },
    /// Paste every node and edge of SOURCE into TARGET with fresh IDs
    Merge {
        /// Graph file to modify
        target: PathBuf,
        /// Graph file to copy from
        source: PathBuf,
        /// Centre of the pasted nodes
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        at: Option<Vec<f64>>,
    },
    /// Append a calculator node to a graph file
    Add {
        /// Graph file to modify
        file: PathBuf,
        /// Template ID (see `templates`)
        template: String,
        /// Node position
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        at: Option<Vec<f64>>,
    },
    /// List calculator node templates
    Templates,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("xynode_graph=info".parse()?)
        .add_directive("xynode_editor=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match args.command {
        Command::Demo { out } => demo(&out, config),
        Command::Info { file } => info(&file, config),
        Command::Merge { target, source, at } => merge(&target, &source, at.as_deref(), config),
        Command::Add { file, template, at } => add(&file, &template, at.as_deref(), config),
        Command::Templates => {
            list_templates();
            Ok(())
        }
    }
}

fn point(at: Option<&[f64]>) -> Option<Point> {
    match at {
        Some([x, y]) => Some(Point::new(*x, *y)),
        _ => None,
    }
}

fn open(path: &Path, config: EditorConfig) -> Result<Document> {
    Document::open(path, config).with_context(|| format!("Failed to open {}", path.display()))
}

fn demo(out: &Path, config: EditorConfig) -> Result<()> {
    let mut document = Document::with_sample_graph(config)?;
    document
        .save_as(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Wrote sample graph to {}", out.display());
    Ok(())
}

fn info(file: &Path, config: EditorConfig) -> Result<()> {
    let document = open(file, config)?;
    let scene = document.editor().scene();

    println!("{}", document.user_friendly_filename());
    println!("  nodes: {}", scene.node_count());
    println!("  edges: {}", scene.edge_count());
    for node in scene.nodes() {
        let position = node.position();
        let connected = node.sockets().filter(|s| s.edge_count() > 0).count();
        println!(
            "  {} '{}' at ({}, {}): {} in, {} out, {} connected",
            node.id(),
            node.title,
            position.x,
            position.y,
            node.inputs().len(),
            node.outputs().len(),
            connected
        );
    }
    Ok(())
}

fn merge(target: &Path, source: &Path, at: Option<&[f64]>, config: EditorConfig) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let data = SceneData::from_json(&text)
        .with_context(|| format!("Failed to parse {}", source.display()))?;
    let payload = ClipboardData {
        nodes: data.nodes,
        edges: data.edges,
    };

    let mut document = open(target, config)?;
    if let Some(p) = point(at) {
        document.editor_mut().pointer_moved(p);
    }
    let pasted = document.editor_mut().paste(&payload)?;
    document.save()?;

    println!(
        "Merged {} nodes and {} edges into {}",
        pasted.nodes.len(),
        pasted.edges.len(),
        target.display()
    );
    Ok(())
}

fn add(file: &Path, template: &str, at: Option<&[f64]>, config: EditorConfig) -> Result<()> {
    let registry = create_calculator_registry();
    let Some(template) = registry.get(template) else {
        bail!("Unknown template '{}' (run `xynode templates`)", template);
    };

    let mut document = open(file, config)?;
    let position = point(at).unwrap_or(Point::ZERO);
    let node = document.editor_mut().add_node_from_template(template, position)?;
    document.save()?;

    println!("Added {} '{}' to {}", node, template.title, file.display());
    Ok(())
}

fn list_templates() {
    let registry = create_calculator_registry();
    for template in registry.templates() {
        println!(
            "{:<10} {:<10} {:?}: {}",
            template.id, template.title, template.category, template.description
        );
    }
}
