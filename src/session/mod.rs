//! Per-session state and the chat turn pipeline
//!
//! serialize context -> model call -> parse directives -> apply. Everything a
//! student touches lives in one [`Session`]; nothing is shared between
//! sessions.

use serde::Serialize;

use crate::core::config::config;
use crate::core::error::LlmError;
use crate::directive::{ChangeSummary, DirectiveApplier, DirectiveParser};
use crate::import::opord::import_opord;
use crate::import::{CellGrid, DocumentStore, ImportOutcome, SheetKind};
use crate::inventory::alias::AliasTable;
use crate::inventory::preset::PresetSelection;
use crate::inventory::record::Inventory;
use crate::llm::context::ContextSerializer;
use crate::llm::prompt::{build_system_prompt, ReferenceDoc};
use crate::map::{MapModel, MapUnit, UnitKey, UtmGridConverter};

pub use crate::llm::client::{ChatMessage, Completion, ModelBackend, Role};

/// Token totals across every model call in the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub calls: u32,
}

impl TokenUsage {
    pub fn record(&mut self, completion: &Completion) {
        self.input_tokens += completion.input_tokens;
        self.output_tokens += completion.output_tokens;
        self.calls += 1;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Flat-rate estimate: total / 1000 x cost per 1k tokens
    pub fn estimated_cost(&self, cost_per_1k: f64) -> f64 {
        self.total() as f64 / 1000.0 * cost_per_1k
    }
}

/// What one chat turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Model reply, or the labeled error text shown in its place
    pub reply: String,
    pub changes: Vec<ChangeSummary>,
    pub error: Option<LlmError>,
}

pub struct Session {
    inventory: Inventory,
    selection: PresetSelection,
    map: MapModel,
    documents: DocumentStore,
    history: Vec<ChatMessage>,
    usage: TokenUsage,
    aliases: AliasTable,
    references: Vec<ReferenceDoc>,
    serializer: ContextSerializer,
    grid: UtmGridConverter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session on the configured default preset
    pub fn new() -> Self {
        let selection = PresetSelection::from_name(&config().default_preset).unwrap_or_default();
        Self::with_preset(selection)
    }

    pub fn with_preset(selection: PresetSelection) -> Self {
        Self {
            inventory: inventory_for(selection),
            selection,
            map: MapModel::new(),
            documents: DocumentStore::new(),
            history: Vec::new(),
            usage: TokenUsage::default(),
            aliases: AliasTable::default(),
            references: Vec::new(),
            serializer: ContextSerializer::new(),
            grid: UtmGridConverter,
        }
    }

    pub fn with_references(mut self, references: Vec<ReferenceDoc>) -> Self {
        self.references = references;
        self
    }

    pub fn with_serializer(mut self, serializer: ContextSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn selection(&self) -> PresetSelection {
        self.selection
    }

    pub fn map(&self) -> &MapModel {
        &self.map
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn estimated_cost(&self) -> f64 {
        self.usage.estimated_cost(config().cost_per_1k_tokens)
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Switch presets, discarding the current inventory. Returns false for
    /// an unknown name.
    pub fn select_preset(&mut self, name: &str) -> bool {
        let Some(selection) = PresetSelection::from_name(name) else {
            return false;
        };
        self.selection = selection;
        self.inventory = inventory_for(selection);
        tracing::info!("preset switched to {}", selection.name());
        true
    }

    /// Fresh copy of the active preset (the default one under Custom)
    pub fn reset_inventory(&mut self) {
        self.inventory = Inventory::from_preset(self.selection.reset_source());
        tracing::info!("inventory reset from {}", self.selection.reset_source().name);
    }

    /// Manual edit of a remaining count; clamped to the type's max
    pub fn set_remaining(&mut self, type_key: &str, amount: u32) -> Option<ChangeSummary> {
        self.inventory.set_remaining(type_key, amount)
    }

    // ========================================================================
    // Map
    // ========================================================================

    pub fn plot_unit(&mut self, unit: MapUnit) -> bool {
        self.map.add(unit)
    }

    pub fn remove_unit(&mut self, key: &UnitKey) -> bool {
        self.map.remove_key(key)
    }

    // ========================================================================
    // Documents
    // ========================================================================

    pub fn import_sheet(&mut self, kind: SheetKind, grid: &CellGrid) -> usize {
        self.documents.import_sheet(kind, grid)
    }

    /// Extract an operation order through the model. A failed import leaves
    /// the previous order in place.
    pub async fn import_opord<M: ModelBackend>(
        &mut self,
        model: &M,
        text: &str,
    ) -> ImportOutcome<usize> {
        let outcome = import_opord(model, text).await;
        match outcome.records {
            Some(doc) => {
                let tasks = doc.tasks.len();
                self.documents.set_opord(Some(doc));
                ImportOutcome {
                    records: tasks,
                    error: outcome.error,
                }
            }
            None => ImportOutcome {
                records: 0,
                error: outcome.error,
            },
        }
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Serialized state for the next model call
    pub fn context(&self) -> String {
        self.serializer
            .serialize(&self.inventory, Some(&self.map), Some(&self.documents))
    }

    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.context(), &self.references)
    }

    /// Parse and apply every directive in a model response
    pub fn apply_response(&mut self, response: &str) -> Vec<ChangeSummary> {
        let directives = DirectiveParser::parse(response);
        DirectiveApplier::new(&self.aliases)
            .with_grid_converter(&self.grid)
            .apply_all(&directives, &mut self.inventory, &mut self.map)
    }

    pub fn push_user(&mut self, text: &str) {
        self.history.push(ChatMessage::user(text));
    }

    /// Record a successful completion: usage, history, then state changes
    pub fn absorb_completion(&mut self, completion: Completion) -> Vec<ChangeSummary> {
        self.usage.record(&completion);
        let changes = self.apply_response(&completion.text);
        self.history.push(ChatMessage::assistant(completion.text));
        changes
    }

    /// Record a failed call. State is untouched; the labeled message stands
    /// in for the reply.
    pub fn record_failure(&mut self, error: &LlmError) -> String {
        tracing::warn!("model call failed: {}", error);
        let message = error.user_message();
        self.history.push(ChatMessage::assistant(message.clone()));
        message
    }

    /// One full chat turn
    pub async fn send<M: ModelBackend>(&mut self, model: &M, text: &str) -> TurnOutcome {
        let system = self.system_prompt();
        self.push_user(text);

        match model.complete(&system, &self.history).await {
            Ok(completion) => {
                let reply = completion.text.clone();
                let changes = self.absorb_completion(completion);
                tracing::info!(
                    "turn complete: {} change(s), {} tokens total",
                    changes.len(),
                    self.usage.total()
                );
                TurnOutcome {
                    reply,
                    changes,
                    error: None,
                }
            }
            Err(error) => TurnOutcome {
                reply: self.record_failure(&error),
                changes: Vec::new(),
                error: Some(error),
            },
        }
    }

    /// Drop the conversation and token counts; inventory, map and documents
    /// stay
    pub fn clear_chat(&mut self) {
        self.history.clear();
        self.usage = TokenUsage::default();
    }
}

fn inventory_for(selection: PresetSelection) -> Inventory {
    match selection {
        PresetSelection::Named(preset) => Inventory::from_preset(preset),
        PresetSelection::Custom => Inventory::new(),
    }
}
