/**
 * ROW RENDERER - Applies reconciler instructions to the live table
 *
 * ROLE: Stateless translation of RowInstruction into ViewContainer calls.
 * No polling, no diffing: the reconciler already decided what must change.
 *
 * ISOLATION: every instruction is applied on its own; a failure is logged and
 * reported for its row, the rest of the pass is still applied.
 */

use crate::error::ViewError;
use crate::models::{row_key, status_cell_key, ComputerId, ComputerStatus, Field};
use crate::reconciler::RowInstruction;
use crate::view::{Cell, CellContent, NewRow, ViewContainer};
use tracing::warn;

pub const DEFAULT_EDIT_PATH_PREFIX: &str = "/edit_pc";
const RENAME_LABEL: &str = "Rename";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub id: ComputerId,
    pub error: ViewError,
}

/// Outcome of applying one pass of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub applied: usize,
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RowRenderer {
    edit_path_prefix: String,
}

impl Default for RowRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_EDIT_PATH_PREFIX)
    }
}

impl RowRenderer {
    pub fn new(edit_path_prefix: &str) -> Self {
        Self {
            edit_path_prefix: edit_path_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Target of the rename affordance; navigation itself belongs to the admin app
    pub fn edit_href(&self, id: &ComputerId) -> String {
        format!("{}/{}", self.edit_path_prefix, id)
    }

    /// Full row for a computer seen for the first time.
    /// Cell order: name, status, client, session, start, end, remaining, version, action.
    pub fn build_row(&self, record: &ComputerStatus) -> NewRow {
        let text = |field: Field| Cell {
            key: Some(field.cell_key(&record.id)),
            content: CellContent::Text(record.field(field).to_string()),
        };

        let mut cells = Vec::with_capacity(Field::COUNT + 2);
        cells.push(text(Field::DisplayName));
        cells.push(Cell {
            key: Some(status_cell_key(&record.id)),
            content: CellContent::Status {
                label: record.status.clone(),
                class: record.status_class.clone(),
            },
        });
        cells.extend(Field::ALL[1..].iter().map(|&field| text(field)));
        cells.push(Cell {
            key: None,
            content: CellContent::Link {
                href: self.edit_href(&record.id),
                label: RENAME_LABEL.to_string(),
            },
        });

        NewRow {
            key: row_key(&record.id),
            cells,
        }
    }

    pub fn apply<V: ViewContainer>(&self, view: &mut V, instructions: &[RowInstruction]) -> RenderReport {
        let mut report = RenderReport::default();
        view.with_pass(&mut |target| self.apply_all(target, instructions, &mut report));
        report
    }

    fn apply_all(&self, view: &mut dyn ViewContainer, instructions: &[RowInstruction], report: &mut RenderReport) {
        for instruction in instructions {
            match self.apply_one(view, instruction) {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    warn!(id = %instruction.id(), %error, "failed to render row instruction");
                    report.failures.push(RenderFailure {
                        id: instruction.id().clone(),
                        error,
                    });
                }
            }
        }
    }

    fn apply_one(&self, view: &mut dyn ViewContainer, instruction: &RowInstruction) -> Result<(), ViewError> {
        match instruction {
            RowInstruction::Create(record) => view.append_row(self.build_row(record)),
            RowInstruction::UpdateField { id, field, value } => view.set_cell_text(&field.cell_key(id), value),
            RowInstruction::UpdateStatus { id, label, class } => view.set_status(&status_cell_key(id), label, class),
            RowInstruction::Reveal { id } => view.set_row_visible(&row_key(id), true),
            RowInstruction::MarkStale { id } => view.set_row_visible(&row_key(id), false),
        }
    }
}
