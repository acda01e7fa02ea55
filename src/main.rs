//! Fires Coordinator - Entry Point
//!
//! Terminal front end for one planning session: status readouts, preset
//! selection, document import and chat turns against the configured model.

use fires_coordinator::core::config::{config, set_config, SessionConfig};
use fires_coordinator::core::error::{FiresError, Result};
use fires_coordinator::fires::{cumulative_pk, rounds_required};
use fires_coordinator::import::{CellGrid, DocumentKind, SheetKind};
use fires_coordinator::inventory::preset::PRESETS;
use fires_coordinator::llm::client::LlmClient;
use fires_coordinator::llm::context::ContextSerializer;
use fires_coordinator::llm::prompt::ReferenceDoc;
use fires_coordinator::session::{Session, TurnOutcome};

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Fires Coordinator - AI-assisted fires planning trainer
#[derive(Parser, Debug)]
#[command(name = "fires-coordinator")]
#[command(about = "Interactive fires planning session with ammunition and map tracking")]
struct Args {
    /// Loadout preset to start with ("Custom" starts empty)
    #[arg(long)]
    preset: Option<String>,

    /// TOML file overriding the session defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference document appended to the system prompt (repeatable)
    #[arg(long = "reference", short = 'r')]
    references: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fires_coordinator=info")),
        )
        .init();

    tracing::info!("Fires Coordinator starting...");

    if let Some(path) = &args.config {
        let loaded = SessionConfig::load(path)?;
        if set_config(loaded).is_err() {
            tracing::warn!("config already initialized; ignoring {}", path.display());
        }
    }

    let rt = Runtime::new()?;

    let references = args
        .references
        .iter()
        .map(|p| ReferenceDoc::load(p))
        .collect::<Result<Vec<_>>>()?;

    let mut session = match &args.preset {
        Some(name) => {
            let mut session = Session::new();
            if !session.select_preset(name) {
                return Err(FiresError::Config(format!("unknown preset: {}", name)));
            }
            session
        }
        None => Session::new(),
    }
    .with_references(references);

    // Chat works only with a key; everything else runs without one
    let llm_client = LlmClient::from_env();
    if let Err(e) = &llm_client {
        tracing::warn!("{} - chat and OPORD import disabled", e);
    }

    println!("\n=== FIRES COORDINATOR ===");
    println!("UNCLASSIFIED training aid - do not enter CUI or classified material");
    println!();
    println!("Commands:");
    println!("  status / s               - Show ammunition status");
    println!("  map / m                  - Show plotted units and threat rings");
    println!("  docs                     - Show imported documents");
    println!("  presets                  - List loadout presets");
    println!("  preset <name>            - Switch preset (discards current inventory)");
    println!("  reset                    - Restore the active preset");
    println!("  set <type> <n>           - Set remaining rounds for a type");
    println!("  import <kind> <path>     - Import targets/equipment/standards (.json, .csv)");
    println!("  import opord <path>      - Extract an operation order (.txt, .md)");
    println!("  pk <single> <desired>    - Rounds required for a desired Pk");
    println!("  clear                    - Clear chat history and token counts");
    println!("  quit / q                 - Exit");
    println!("  <any text>               - Ask the fires coordinator");
    println!();
    println!("Preset: {}", session.selection().name());

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "status" || input == "s" {
            display_status(&session);
            continue;
        }

        if input == "map" || input == "m" {
            display_map(&session);
            continue;
        }

        if input == "docs" {
            if session.documents().is_empty() {
                println!("No documents imported.");
            } else {
                let serializer = ContextSerializer::new();
                for block in serializer.document_blocks(session.documents()) {
                    println!("{}\n", block);
                }
            }
            continue;
        }

        if input == "presets" {
            for preset in PRESETS {
                let marker = if preset.name == session.selection().name() {
                    "*"
                } else {
                    " "
                };
                println!(" {} {} ({} types)", marker, preset.name, preset.entries.len());
            }
            continue;
        }

        if let Some(name) = input.strip_prefix("preset ") {
            if session.select_preset(name) {
                println!("Switched to {}.", session.selection().name());
            } else {
                println!("Unknown preset: {}", name.trim());
            }
            continue;
        }

        if input == "reset" {
            session.reset_inventory();
            println!("Inventory restored from {}.", session.selection().reset_source().name);
            continue;
        }

        if let Some(rest) = input.strip_prefix("set ") {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next().and_then(|n| n.parse::<u32>().ok())) {
                (Some(type_key), Some(amount)) => match session.set_remaining(type_key, amount) {
                    Some(change) => println!("{}", change),
                    None => println!("No ammunition type {} in the inventory.", type_key),
                },
                _ => println!("Usage: set <type> <number>"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("pk ") {
            let values: Vec<f64> = rest
                .split_whitespace()
                .filter_map(|v| v.parse().ok())
                .collect();
            match values.as_slice() {
                [single, desired] => match rounds_required(*single, *desired) {
                    Some(n) => {
                        let achieved = cumulative_pk(*single, n).unwrap_or(0.0);
                        println!(
                            "n = ceil(ln(1 - {}) / ln(1 - {})) = {} rounds (Pk achieved {:.3})",
                            desired, single, n, achieved
                        );
                    }
                    None => println!("Pk values must be in [0, 1) with a non-zero single-shot Pk."),
                },
                _ => println!("Usage: pk <single-shot Pk> <desired Pk>"),
            }
            continue;
        }

        if input == "clear" {
            session.clear_chat();
            println!("Chat cleared.");
            continue;
        }

        if let Some(rest) = input.strip_prefix("import ") {
            let mut parts = rest.splitn(2, ' ');
            let (Some(kind), Some(path)) = (parts.next(), parts.next()) else {
                println!("Usage: import <targets|equipment|standards|opord> <path>");
                continue;
            };
            let path = Path::new(path.trim());

            if kind.eq_ignore_ascii_case("opord") {
                let client = match &llm_client {
                    Ok(client) => client,
                    Err(e) => {
                        println!("{}", e.user_message());
                        continue;
                    }
                };
                match read_text_document(path) {
                    Ok(text) => {
                        let outcome = rt.block_on(session.import_opord(client, &text));
                        match outcome.error {
                            None => println!("Imported OPORD with {} fire task(s).", outcome.records),
                            Some(e) => println!("OPORD import failed: {}", e),
                        }
                    }
                    Err(e) => println!("{}", e),
                }
                continue;
            }

            let Some(kind) = SheetKind::parse(kind) else {
                println!("Unknown import kind: {}", kind);
                continue;
            };
            match read_sheet(path) {
                Ok(grid) => {
                    let count = session.import_sheet(kind, &grid);
                    println!("Imported {} record(s) from {}.", count, path.display());
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }

        // Anything else is a chat turn
        let outcome = match &llm_client {
            Ok(client) => rt.block_on(session.send(client, input)),
            Err(e) => {
                session.push_user(input);
                TurnOutcome {
                    reply: session.record_failure(e),
                    changes: Vec::new(),
                    error: Some(e.clone()),
                }
            }
        };
        display_turn(&session, &outcome);
    }

    let usage = session.usage();
    println!(
        "\nSession closed: {} call(s), {} tokens (~${:.4}).",
        usage.calls,
        usage.total(),
        session.estimated_cost()
    );
    Ok(())
}

fn display_status(session: &Session) {
    println!();
    println!("Preset: {}", session.selection().name());
    println!("{}", ContextSerializer::new().inventory_block(session.inventory()));
    println!();
}

fn display_map(session: &Session) {
    let map = session.map();
    if map.is_empty() {
        println!("No units plotted.");
        return;
    }
    for unit in map.units() {
        let threat = map
            .threat_profile(unit)
            .map(|p| format!(" - {} {} km ({})", p.category.label(), p.range_km, p.display_color))
            .unwrap_or_default();
        println!(
            "  [{}] {} ({}) {:.4}, {:.4}{}",
            unit.allegiance, unit.name, unit.system_type, unit.latitude, unit.longitude, threat
        );
    }
}

fn display_turn(session: &Session, outcome: &TurnOutcome) {
    println!();
    println!("{}", outcome.reply);
    if !outcome.changes.is_empty() {
        println!();
        println!("State updates:");
        for change in &outcome.changes {
            println!("  - {}", change);
        }
    }
    if outcome.error.is_none() {
        let usage = session.usage();
        println!(
            "\n[{} tokens this session, ~${:.4} at ${}/1k]",
            usage.total(),
            session.estimated_cost(),
            config().cost_per_1k_tokens
        );
    }
    println!();
}

/// Read a tabular file into a cell grid (JSON rows or CSV)
fn read_sheet(path: &Path) -> Result<CellGrid> {
    let name = path.to_string_lossy();
    if DocumentKind::from_filename(&name)? != DocumentKind::Spreadsheet {
        return Err(FiresError::Config(format!("{} is not a spreadsheet", name)));
    }
    let content = std::fs::read_to_string(path)?;
    match extension(path).as_str() {
        "json" => Ok(CellGrid::from_json(&content)?),
        "csv" => Ok(CellGrid::from_csv(&content)?),
        other => Err(FiresError::Config(format!(
            "export .{} workbooks to CSV or JSON before importing",
            other
        ))),
    }
}

/// Plain text for the OPORD importer
fn read_text_document(path: &Path) -> Result<String> {
    let name = path.to_string_lossy();
    if DocumentKind::from_filename(&name)? != DocumentKind::Text {
        return Err(FiresError::Config(format!("{} is not a text document", name)));
    }
    match extension(path).as_str() {
        "txt" | "md" => Ok(std::fs::read_to_string(path)?),
        other => Err(FiresError::Config(format!(
            "extract the text of the .{} file to .txt before importing",
            other
        ))),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}
