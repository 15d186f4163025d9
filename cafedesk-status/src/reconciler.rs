/**
 * RECONCILER - Keyed diff between the row table and a fresh snapshot
 *
 * ROLE: Turn a StatusSnapshot into the smallest list of row instructions
 * (create, field update, status update, reveal, mark-stale) for the renderer.
 *
 * RULES:
 * - One RowState per id ever seen; rows are hidden when absent, never removed
 * - A value is written only when it differs from the last rendered one
 * - Status label and style tag travel together in a single instruction
 * - Instructions follow snapshot order, stale markings come last in table order
 *
 * The row table is mutated when an instruction is built, not when it is rendered:
 * a render failure is a presentation problem, the table stays consistent.
 */

use crate::models::{ComputerId, ComputerStatus, Field, StatusClass, StatusSnapshot};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One change to apply to the live computers table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowInstruction {
    /// First sight of an id: build and append the full row
    Create(ComputerStatus),
    UpdateField {
        id: ComputerId,
        field: Field,
        value: String,
    },
    UpdateStatus {
        id: ComputerId,
        label: String,
        class: StatusClass,
    },
    /// A hidden row is back in the snapshot
    Reveal { id: ComputerId },
    /// Row absent from the snapshot: hide it, keep it addressable
    MarkStale { id: ComputerId },
}

impl RowInstruction {
    pub fn id(&self) -> &ComputerId {
        match self {
            RowInstruction::Create(record) => &record.id,
            RowInstruction::UpdateField { id, .. }
            | RowInstruction::UpdateStatus { id, .. }
            | RowInstruction::Reveal { id }
            | RowInstruction::MarkStale { id } => id,
        }
    }

    /// Field or status write on an existing row
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            RowInstruction::UpdateField { .. } | RowInstruction::UpdateStatus { .. }
        )
    }
}

/// Values last written to a row's cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedFields {
    fields: [String; Field::COUNT],
    status: String,
    status_class: StatusClass,
}

impl RenderedFields {
    fn from_record(record: &ComputerStatus) -> Self {
        Self {
            fields: Field::ALL.map(|field| record.field(field).to_string()),
            status: record.status.clone(),
            status_class: record.status_class.clone(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        &self.fields[field.index()]
    }

    pub fn status(&self) -> (&str, &StatusClass) {
        (&self.status, &self.status_class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowState {
    last_rendered: RenderedFields,
    visible: bool,
}

impl RowState {
    pub fn last_rendered(&self) -> &RenderedFields {
        &self.last_rendered
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Persistent row state for the whole process lifetime, owned by the synchronizer.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    rows: HashMap<ComputerId, RowState>,
    // first-sight order, used for stale markings
    order: Vec<ComputerId>,
}

impl RowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ComputerId) -> Option<&RowState> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.rows.values().filter(|row| row.visible).count()
    }

    /// Ids in first-sight order
    pub fn ids(&self) -> impl Iterator<Item = &ComputerId> {
        self.order.iter()
    }

    /// One reconciliation pass.
    pub fn reconcile(&mut self, snapshot: &StatusSnapshot) -> Vec<RowInstruction> {
        let mut instructions = Vec::new();
        let mut seen: HashSet<&ComputerId> = HashSet::with_capacity(snapshot.len());

        for record in snapshot.computers() {
            if !seen.insert(&record.id) {
                warn!(id = %record.id, "duplicate computer id in snapshot, keeping first record");
                continue;
            }

            match self.rows.get_mut(&record.id) {
                None => {
                    self.rows.insert(
                        record.id.clone(),
                        RowState {
                            last_rendered: RenderedFields::from_record(record),
                            visible: true,
                        },
                    );
                    self.order.push(record.id.clone());
                    instructions.push(RowInstruction::Create(record.clone()));
                }
                Some(row) => diff_row(row, record, &mut instructions),
            }
        }

        for id in &self.order {
            if seen.contains(id) {
                continue;
            }
            if let Some(row) = self.rows.get_mut(id) {
                if row.visible {
                    row.visible = false;
                    instructions.push(RowInstruction::MarkStale { id: id.clone() });
                }
            }
        }

        instructions
    }
}

fn diff_row(row: &mut RowState, record: &ComputerStatus, out: &mut Vec<RowInstruction>) {
    if !row.visible {
        row.visible = true;
        out.push(RowInstruction::Reveal {
            id: record.id.clone(),
        });
    }

    for field in Field::ALL {
        let incoming = record.field(field);
        let cached = &mut row.last_rendered.fields[field.index()];
        if cached.as_str() != incoming {
            *cached = incoming.to_string();
            out.push(RowInstruction::UpdateField {
                id: record.id.clone(),
                field,
                value: incoming.to_string(),
            });
        }
    }

    let rendered = &mut row.last_rendered;
    if rendered.status != record.status || rendered.status_class != record.status_class {
        rendered.status = record.status.clone();
        rendered.status_class = record.status_class.clone();
        out.push(RowInstruction::UpdateStatus {
            id: record.id.clone(),
            label: record.status.clone(),
            class: record.status_class.clone(),
        });
    }
}
