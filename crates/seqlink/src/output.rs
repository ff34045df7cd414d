//! Output formatting: plain, table, JSON, YAML.
//!
//! Renders the sequencer state in the format selected by `--output`. Plain
//! is the one-line-per-client/port dump, table uses `tabled`, structured
//! formats use serde.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use seqlink_core::{ClientSummary, PortSummary};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Capabilities")]
    caps: String,
    #[tabled(rename = "Conn")]
    conn: String,
}

impl PortRow {
    fn new(client: &ClientSummary, port: &PortSummary) -> Self {
        Self {
            client: format!("{} {}", client.id, client.name),
            kind: client.kind.to_string(),
            port: format!("{} {}", port.id, port.name),
            caps: port.caps.join(" "),
            conn: port.markers(),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render the sequencer state in the chosen format.
pub fn render_state(format: OutputFormat, clients: &[ClientSummary]) -> Result<String, CliError> {
    match format {
        OutputFormat::Plain => Ok(render_plain(clients)),
        OutputFormat::Table => {
            let rows: Vec<PortRow> = clients
                .iter()
                .flat_map(|c| c.ports.iter().map(move |p| PortRow::new(c, p)))
                .collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(clients),
        OutputFormat::Yaml => render_yaml(clients),
    }
}

/// Render any serializable value; `plain` and `table` fall back to `plain_fn`.
pub fn render_value<T: serde::Serialize>(
    format: OutputFormat,
    data: &T,
    plain_fn: impl Fn(&T) -> Result<String, CliError>,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Plain | OutputFormat::Table => plain_fn(data),
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

/// Client lines, each followed by its port lines indented by one space.
fn render_plain(clients: &[ClientSummary]) -> String {
    let mut lines = Vec::new();
    for client in clients {
        lines.push(client.to_string());
        lines.extend(client.ports.iter().map(|p| format!(" {p}")));
    }
    lines.join("\n")
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(data).map_err(|e| CliError::Render {
        format: "json",
        reason: e.to_string(),
    })
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render {
        format: "yaml",
        reason: e.to_string(),
    })
}
