use crate::layer::LayerId;
use crate::op::Op;
use std::sync::Arc;

/// The ordered op sequence of a drawing.
///
/// Insertion order is paint order within a layer; the compositor filters the
/// sequence per layer, so z-order across layers comes from the layer stack,
/// not from this sequence.
///
/// The ops live behind an `Arc`, so `clone()` is a cheap snapshot and every
/// mutation replaces the whole sequence (`Arc::make_mut`). A reader holding a
/// snapshot always sees a complete, internally consistent document no matter
/// what is committed afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    ops: Arc<Vec<Op>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops: Arc::new(ops) }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The ordered subsequence of ops on one layer.
    pub fn ops_for(&self, layer: LayerId) -> impl Iterator<Item = &Op> {
        self.ops.iter().filter(move |op| op.layer() == layer)
    }

    /// Appends an op at the end of the sequence.
    pub fn append(&mut self, op: Op) {
        Arc::make_mut(&mut self.ops).push(op);
    }

    /// Removes and returns the most recently committed op.
    pub fn pop(&mut self) -> Option<Op> {
        Arc::make_mut(&mut self.ops).pop()
    }

    /// Drops every op belonging to `layer`, returning how many were removed.
    /// Layer existence rules are enforced by [`crate::LayerStack::remove`];
    /// this only filters the sequence.
    pub fn remove_layer_ops(&mut self, layer: LayerId) -> usize {
        let ops = Arc::make_mut(&mut self.ops);
        let before = ops.len();
        ops.retain(|op| op.layer() != layer);
        before - ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{TextOp, Op};
    use egui::{Color32, Pos2};

    fn text_op(label: &str, layer: LayerId) -> Op {
        Op::Text(TextOp {
            text: label.to_string(),
            pos: Pos2::new(10.0, 10.0),
            color: Color32::BLACK,
            size: 16.0,
            family: "sans-serif".to_string(),
            layer,
        })
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut doc = Document::new();
        doc.append(text_op("a", LayerId(0)));
        doc.append(text_op("b", LayerId(1)));
        doc.append(text_op("c", LayerId(0)));

        let on_zero: Vec<_> = doc.ops_for(LayerId(0)).collect();
        assert_eq!(on_zero.len(), 2);
        assert_eq!(on_zero[0], &text_op("a", LayerId(0)));
        assert_eq!(on_zero[1], &text_op("c", LayerId(0)));
    }

    #[test]
    fn snapshots_are_unaffected_by_later_edits() {
        let mut doc = Document::new();
        doc.append(text_op("a", LayerId(0)));
        let snapshot = doc.clone();

        doc.append(text_op("b", LayerId(0)));
        doc.remove_layer_ops(LayerId(0));

        assert!(doc.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn remove_layer_ops_reports_count() {
        let mut doc = Document::new();
        doc.append(text_op("a", LayerId(0)));
        doc.append(text_op("b", LayerId(1)));
        assert_eq!(doc.remove_layer_ops(LayerId(0)), 1);
        assert_eq!(doc.len(), 1);
    }
}
