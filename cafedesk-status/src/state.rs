use crate::error::ViewError;
use crate::models::StatusClass;
use crate::view::{NewRow, ViewContainer};
use parking_lot::Mutex;
use std::sync::Arc;

/// Table shared between the synchronizer (writer) and the HTTP layer (reader).
pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

// The synchronizer is the only writer; readers lock the table to render it.
impl<V: ViewContainer> ViewContainer for Shared<V> {
    fn append_row(&mut self, row: NewRow) -> Result<(), ViewError> {
        self.lock().append_row(row)
    }

    fn set_cell_text(&mut self, cell_key: &str, text: &str) -> Result<(), ViewError> {
        self.lock().set_cell_text(cell_key, text)
    }

    fn set_status(&mut self, cell_key: &str, label: &str, class: &StatusClass) -> Result<(), ViewError> {
        self.lock().set_status(cell_key, label, class)
    }

    fn set_row_visible(&mut self, row_key: &str, visible: bool) -> Result<(), ViewError> {
        self.lock().set_row_visible(row_key, visible)
    }

    fn with_pass(&mut self, pass: &mut dyn FnMut(&mut dyn ViewContainer))
    where
        Self: Sized,
    {
        let mut view = self.lock();
        pass(&mut *view)
    }
}
