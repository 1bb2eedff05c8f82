use crate::document::Document;
use crate::layer::LayerId;
use crate::op::Op;

/// Undo/redo over whole ops.
///
/// The document itself is the undo record: undo pops its last op onto the
/// redo stack, redo moves it back. Only finalized ops are undo units; an
/// in-progress stroke lives in [`crate::StrokeCapture`] until commit and is
/// not undoable.
#[derive(Debug, Default)]
pub struct History {
    document: Document,
    redo_stack: Vec<Op>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current committed document. Clone it for a render snapshot.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Commits a finalized op. Any previously undone ops become unreachable.
    pub fn commit(&mut self, op: Op) {
        self.document.append(op);
        self.redo_stack.clear();
    }

    /// Moves the most recent op onto the redo stack. Returns `false` (and
    /// does nothing) when there is nothing to undo; callers surface that as
    /// a disabled affordance, not an error.
    pub fn undo(&mut self) -> bool {
        match self.document.pop() {
            Some(op) => {
                self.redo_stack.push(op);
                true
            }
            None => false,
        }
    }

    /// Re-applies the most recently undone op. No-op when the redo stack is
    /// empty.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(op) => {
                self.document.append(op);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.document.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Deletes a layer's ops from the document and the redo stack. Layer
    /// deletion is not an undoable edit, so the removed ops are simply
    /// dropped rather than recorded.
    pub fn remove_layer(&mut self, layer: LayerId) {
        let removed = self.document.remove_layer_ops(layer);
        self.redo_stack.retain(|op| op.layer() != layer);
        log::debug!("removed layer {layer}: dropped {removed} ops");
    }

    pub fn clear(&mut self) {
        self.document = Document::new();
        self.redo_stack.clear();
    }

    /// Replaces the whole document, e.g. after loading a saved file. The
    /// history of the previous document does not apply to the new one.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.redo_stack.clear();
    }
}
