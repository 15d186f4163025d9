//! Live computers table
//!
//! `ViewContainer` is the seam between the renderer and whatever displays the
//! table. Rows are addressed by `row-{id}` and cells by `{field}-{id}`; the
//! container only appends rows, rewrites cells and toggles row visibility.
//! `TableView` is the in-memory container served as HTML by the console.

use crate::error::ViewError;
use crate::models::StatusClass;
use std::collections::HashMap;
use std::fmt::Write as _;

pub trait ViewContainer {
    fn append_row(&mut self, row: NewRow) -> Result<(), ViewError>;

    fn set_cell_text(&mut self, cell_key: &str, text: &str) -> Result<(), ViewError>;

    fn set_status(&mut self, cell_key: &str, label: &str, class: &StatusClass) -> Result<(), ViewError>;

    fn set_row_visible(&mut self, row_key: &str, visible: bool) -> Result<(), ViewError>;

    /// Runs one render pass. Observers must see either none or all of a pass,
    /// shared containers override this to hold their lock for the whole pass.
    fn with_pass(&mut self, pass: &mut dyn FnMut(&mut dyn ViewContainer))
    where
        Self: Sized,
    {
        pass(self)
    }
}

/// Row materialized by the renderer, ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRow {
    pub key: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Addressable cells carry a key, the action cell does not
    pub key: Option<String>,
    pub content: CellContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Status { label: String, class: StatusClass },
    Link { href: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub key: String,
    pub hidden: bool,
    pub cells: Vec<Cell>,
}

/// In-memory computers table, rows kept in append order.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    rows: Vec<TableRow>,
    row_index: HashMap<String, usize>,
    cell_index: HashMap<String, (usize, usize)>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, row_key: &str) -> Option<&TableRow> {
        self.row_index.get(row_key).map(|&i| &self.rows[i])
    }

    pub fn cell(&self, cell_key: &str) -> Option<&CellContent> {
        self.cell_index
            .get(cell_key)
            .map(|&(row, cell)| &self.rows[row].cells[cell].content)
    }

    /// Text shown in a cell (status label for the status cell)
    pub fn cell_text(&self, cell_key: &str) -> Option<&str> {
        self.cell(cell_key).map(|content| match content {
            CellContent::Text(text) => text.as_str(),
            CellContent::Status { label, .. } => label.as_str(),
            CellContent::Link { label, .. } => label.as_str(),
        })
    }

    pub fn visible_rows(&self) -> usize {
        self.rows.iter().filter(|row| !row.hidden).count()
    }

    fn cell_mut(&mut self, cell_key: &str) -> Result<&mut CellContent, ViewError> {
        let &(row, cell) = self
            .cell_index
            .get(cell_key)
            .ok_or_else(|| ViewError::UnknownCell(cell_key.to_string()))?;
        Ok(&mut self.rows[row].cells[cell].content)
    }

    /// `<tbody>` fragment of the computers table
    pub fn render_html(&self) -> String {
        let mut html = String::from("<tbody id=\"computers-table-body\">\n");
        for row in &self.rows {
            let _ = write!(html, "<tr id=\"{}\"", escape_html(&row.key));
            if row.hidden {
                html.push_str(" style=\"display: none\"");
            }
            html.push('>');
            for cell in &row.cells {
                html.push_str("<td");
                if let Some(key) = &cell.key {
                    let _ = write!(html, " id=\"{}\"", escape_html(key));
                }
                match &cell.content {
                    CellContent::Text(text) => {
                        let _ = write!(html, ">{}", escape_html(text));
                    }
                    CellContent::Status { label, class } => {
                        let _ = write!(
                            html,
                            " class=\"{}\">{}",
                            escape_html(class.as_tag()),
                            escape_html(label)
                        );
                    }
                    CellContent::Link { href, label } => {
                        let _ = write!(
                            html,
                            "><a href=\"{}\" class=\"add-pc-btn\">{}</a>",
                            escape_html(href),
                            escape_html(label)
                        );
                    }
                }
                html.push_str("</td>");
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n");
        html
    }
}

impl ViewContainer for TableView {
    fn append_row(&mut self, row: NewRow) -> Result<(), ViewError> {
        if self.row_index.contains_key(&row.key) {
            return Err(ViewError::DuplicateRow(row.key));
        }
        if let Some(taken) = row
            .cells
            .iter()
            .filter_map(|cell| cell.key.as_ref())
            .find(|key| self.cell_index.contains_key(key.as_str()))
        {
            return Err(ViewError::DuplicateRow(taken.clone()));
        }

        let row_pos = self.rows.len();
        for (cell_pos, cell) in row.cells.iter().enumerate() {
            if let Some(key) = &cell.key {
                self.cell_index.insert(key.clone(), (row_pos, cell_pos));
            }
        }
        self.row_index.insert(row.key.clone(), row_pos);
        self.rows.push(TableRow {
            key: row.key,
            hidden: false,
            cells: row.cells,
        });
        Ok(())
    }

    fn set_cell_text(&mut self, cell_key: &str, text: &str) -> Result<(), ViewError> {
        let content = self.cell_mut(cell_key)?;
        *content = CellContent::Text(text.to_string());
        Ok(())
    }

    fn set_status(&mut self, cell_key: &str, label: &str, class: &StatusClass) -> Result<(), ViewError> {
        let content = self.cell_mut(cell_key)?;
        *content = CellContent::Status {
            label: label.to_string(),
            class: class.clone(),
        };
        Ok(())
    }

    fn set_row_visible(&mut self, row_key: &str, visible: bool) -> Result<(), ViewError> {
        let &pos = self
            .row_index
            .get(row_key)
            .ok_or_else(|| ViewError::UnknownRow(row_key.to_string()))?;
        self.rows[pos].hidden = !visible;
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_cell(key: &str, text: &str) -> Cell {
        Cell {
            key: Some(key.into()),
            content: CellContent::Text(text.into()),
        }
    }

    fn sample_row(id: u32) -> NewRow {
        NewRow {
            key: format!("row-{id}"),
            cells: vec![
                text_cell(&format!("name-{id}"), &format!("PC-{id}")),
                Cell {
                    key: Some(format!("status-{id}")),
                    content: CellContent::Status {
                        label: "Active".into(),
                        class: StatusClass::Online,
                    },
                },
                Cell {
                    key: None,
                    content: CellContent::Link {
                        href: format!("/edit_pc/{id}"),
                        label: "Rename".into(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_append_and_address_cells() {
        let mut view = TableView::new();
        view.append_row(sample_row(1)).unwrap();
        view.append_row(sample_row(2)).unwrap();

        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.cell_text("name-2"), Some("PC-2"));
        assert_eq!(view.cell_text("status-1"), Some("Active"));

        view.set_cell_text("name-1", "PC-01").unwrap();
        assert_eq!(view.cell_text("name-1"), Some("PC-01"));
        assert_eq!(view.cell_text("name-2"), Some("PC-2"));
    }

    #[test]
    fn test_duplicate_row_is_rejected() {
        let mut view = TableView::new();
        view.append_row(sample_row(1)).unwrap();
        assert_eq!(
            view.append_row(sample_row(1)),
            Err(ViewError::DuplicateRow("row-1".into()))
        );
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn test_unknown_keys() {
        let mut view = TableView::new();
        assert_eq!(
            view.set_cell_text("name-9", "x"),
            Err(ViewError::UnknownCell("name-9".into()))
        );
        assert_eq!(
            view.set_row_visible("row-9", false),
            Err(ViewError::UnknownRow("row-9".into()))
        );
    }

    #[test]
    fn test_hidden_rows_stay_addressable() {
        let mut view = TableView::new();
        view.append_row(sample_row(3)).unwrap();
        view.set_row_visible("row-3", false).unwrap();

        assert_eq!(view.visible_rows(), 0);
        assert!(view.row("row-3").unwrap().hidden);
        view.set_cell_text("name-3", "PC-03").unwrap();

        view.set_row_visible("row-3", true).unwrap();
        assert_eq!(view.visible_rows(), 1);
    }

    #[test]
    fn test_render_html_escapes_and_hides() {
        let mut view = TableView::new();
        view.append_row(sample_row(1)).unwrap();
        view.set_cell_text("name-1", "<b>Tom & Jerry</b>").unwrap();
        view.set_status("status-1", "Busy", &StatusClass::Busy).unwrap();
        view.set_row_visible("row-1", false).unwrap();

        let html = view.render_html();
        assert!(html.starts_with("<tbody id=\"computers-table-body\">"));
        assert!(html.contains("<tr id=\"row-1\" style=\"display: none\">"));
        assert!(html.contains("<td id=\"name-1\">&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</td>"));
        assert!(html.contains("<td id=\"status-1\" class=\"status-busy\">Busy</td>"));
        assert!(html.contains("<a href=\"/edit_pc/1\" class=\"add-pc-btn\">Rename</a>"));
    }
}
