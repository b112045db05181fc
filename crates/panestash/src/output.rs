//! Human and JSON rendering for pstash replies.

use std::fmt::Write;

use clap::ValueEnum;
use panestash_core::error::LayoutError;
use panestash_core::layout_tree::Node;
use panestash_core::store::NamedConfig;
use serde::Serialize;
use serde_json::{Value, json};

/// Output format for stdout replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// A successful reply in both renderings.
pub struct Reply {
    plain: String,
    json: Value,
}

impl Reply {
    pub fn new(command: &str, plain: impl Into<String>, mut fields: Value) -> Self {
        if let Value::Object(map) = &mut fields {
            map.insert("status".into(), json!("ok"));
            map.insert("command".into(), json!(command));
        }
        Self {
            plain: plain.into(),
            json: fields,
        }
    }
}

/// One row of `pstash list --format json`.
#[derive(Serialize)]
pub struct ListEntry<'a> {
    pub name: &'a str,
    pub saved_at: u64,
    pub leaves: usize,
    pub current: bool,
}

pub fn emit(reply: &Reply, format: OutputFormat) {
    match format {
        OutputFormat::Plain => {
            if !reply.plain.is_empty() {
                println!("{}", reply.plain.trim_end());
            }
        }
        OutputFormat::Json => println!("{}", reply.json),
    }
}

fn error_kind(err: &LayoutError) -> &'static str {
    match err {
        LayoutError::NotFound(_) => "not_found",
        LayoutError::NothingCurrent => "nothing_current",
        LayoutError::PersistenceUnavailable { .. } => "persistence_unavailable",
    }
}

/// Report a primary failure on stderr.
pub fn error(err: &LayoutError, format: OutputFormat) {
    match format {
        OutputFormat::Plain => {
            eprintln!("error: {err}");
            eprint!("{}", err.remediation().render_plain());
        }
        OutputFormat::Json => eprintln!(
            "{}",
            json!({
                "status": "error",
                "kind": error_kind(err),
                "error": err.to_string(),
                "remediation": err.remediation(),
            })
        ),
    }
}

/// Report a non-fatal persistence failure on stderr.
pub fn warning(err: &LayoutError, format: OutputFormat) {
    match format {
        OutputFormat::Plain => eprintln!("warning: {err}"),
        OutputFormat::Json => eprintln!(
            "{}",
            json!({
                "status": "warning",
                "kind": error_kind(err),
                "error": err.to_string(),
            })
        ),
    }
}

/// Setup failures (config, surface file) that stop the run.
pub fn fatal(err: &anyhow::Error, remediation: Option<String>, format: OutputFormat) {
    match format {
        OutputFormat::Plain => {
            eprintln!("error: {err:#}");
            if let Some(text) = remediation {
                eprint!("{text}");
            }
        }
        OutputFormat::Json => eprintln!(
            "{}",
            json!({
                "status": "error",
                "kind": "setup",
                "error": format!("{err:#}"),
            })
        ),
    }
}

/// Indented tree view of a stored layout.
pub fn render_layout(entry: &NamedConfig) -> String {
    let snap = &entry.snapshot;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  frame {}x{} at ({}, {})  focus {}",
        entry.name,
        snap.frame_size.0,
        snap.frame_size.1,
        snap.frame_position.0,
        snap.frame_position.1,
        snap.focused_leaf_index
    );
    let mut leaf_index = 0;
    render_node(&snap.root, 1, snap.focused_leaf_index, &mut leaf_index, &mut out);
    out
}

fn render_node(node: &Node, depth: usize, focused: usize, leaf_index: &mut usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Leaf(leaf) => {
            let marker = if *leaf_index == focused { " *" } else { "" };
            let _ = match &leaf.content_path {
                Some(path) => writeln!(
                    out,
                    "{indent}[{leaf_index}] {}x{} {} ({path}){marker}",
                    leaf.width, leaf.height, leaf.content_label
                ),
                None => writeln!(
                    out,
                    "{indent}[{leaf_index}] {}x{} {}{marker}",
                    leaf.width, leaf.height, leaf.content_label
                ),
            };
            *leaf_index += 1;
        }
        Node::Split(split) => {
            let b = split.bounds;
            let _ = writeln!(
                out,
                "{indent}{} ({},{})-({},{})",
                split.orientation, b.x1, b.y1, b.x2, b.y2
            );
            for child in &split.children {
                render_node(child, depth + 1, focused, leaf_index, out);
            }
        }
    }
}
