// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection drag state (`Idle -> Dragging -> Idle`).

use crate::connection::RejectReason;
use crate::node::NodeId;

/// Connection gesture in progress on a graph
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectionDrag {
    /// No gesture
    #[default]
    Idle,
    /// Dragging a line out of `source`
    Dragging {
        /// Node the line starts from (the prospective parent)
        source: NodeId,
        /// Free end of the line (graph space)
        line_end: [f32; 2],
    },
}

impl ConnectionDrag {
    /// Start (or restart) a drag from `source`
    pub fn begin(&mut self, source: NodeId, at: [f32; 2]) {
        *self = Self::Dragging { source, line_end: at };
    }

    /// Move the free end to an absolute position
    pub fn move_to(&mut self, pos: [f32; 2]) {
        if let Self::Dragging { line_end, .. } = self {
            *line_end = pos;
        }
    }

    /// Move the free end by a delta
    pub fn move_by(&mut self, delta: [f32; 2]) {
        if let Self::Dragging { line_end, .. } = self {
            line_end[0] += delta[0];
            line_end[1] += delta[1];
        }
    }

    /// End the gesture, returning the source if one was active
    pub fn finish(&mut self) -> Option<NodeId> {
        let source = self.source();
        *self = Self::Idle;
        source
    }

    /// Source node of the active drag
    pub fn source(&self) -> Option<NodeId> {
        match self {
            Self::Idle => None,
            Self::Dragging { source, .. } => Some(*source),
        }
    }

    /// Free end of the active drag
    pub fn line_end(&self) -> Option<[f32; 2]> {
        match self {
            Self::Idle => None,
            Self::Dragging { line_end, .. } => Some(*line_end),
        }
    }

    /// Whether a drag is active
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// How a drag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragResolution {
    /// There was no drag to resolve
    NotDragging,
    /// Released over empty canvas
    Dropped,
    /// Edge created
    Connected {
        /// Drag source
        parent: NodeId,
        /// Drop target
        child: NodeId,
    },
    /// Edge refused
    Rejected(RejectReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_move_finish() {
        let source = NodeId::new();
        let mut drag = ConnectionDrag::default();
        assert!(!drag.is_active());

        drag.move_by([1.0, 1.0]);
        assert_eq!(drag, ConnectionDrag::Idle);

        drag.begin(source, [10.0, 10.0]);
        drag.move_by([5.0, -2.0]);
        assert_eq!(drag.line_end(), Some([15.0, 8.0]));

        drag.move_to([0.0, 0.0]);
        assert_eq!(drag.line_end(), Some([0.0, 0.0]));

        assert_eq!(drag.finish(), Some(source));
        assert_eq!(drag, ConnectionDrag::Idle);
        assert_eq!(drag.finish(), None);
    }

    #[test]
    fn test_begin_replaces_active_drag() {
        let first = NodeId::new();
        let second = NodeId::new();
        let mut drag = ConnectionDrag::default();

        drag.begin(first, [0.0, 0.0]);
        drag.begin(second, [3.0, 4.0]);
        assert_eq!(drag.source(), Some(second));
        assert_eq!(drag.line_end(), Some([3.0, 4.0]));
    }
}
