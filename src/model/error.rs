use super::item::{ItemId, ItemState};

/// Errors raised by the simulation core.
///
/// None of these can be recovered from inside a tick: the driver is expected
/// to surface them and stop.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Speed multiplier was zero, negative, NaN or infinite
    InvalidSpeed(f64),
    /// Real elapsed time handed to `tick` was negative, not finite, or scaled
    /// past the longest span one tick may catch up
    InvalidElapsed(f64),
    /// The WS2 queue references an item that is missing or already queued
    InconsistentQueueState(ItemId),
    /// A workshop marker points at an item that does not exist
    UnknownItem(ItemId),
    /// An item was asked to jump to a state that is not its successor
    IllegalTransition {
        id: ItemId,
        from: ItemState,
        to: ItemState,
    },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidSpeed(v) => write!(f, "Invalid speed multiplier: {}", v),
            SimError::InvalidElapsed(v) => write!(f, "Invalid elapsed time: {}", v),
            SimError::InconsistentQueueState(id) => {
                write!(f, "Inconsistent WS2 queue state for item {}", id)
            }
            SimError::UnknownItem(id) => write!(f, "Unknown item {}", id),
            SimError::IllegalTransition { id, from, to } => write!(
                f,
                "Illegal transition for item {}: {} -> {}",
                id,
                from.label(),
                to.label()
            ),
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_item() {
        let err = SimError::IllegalTransition {
            id: 4,
            from: ItemState::ProducingWs1,
            to: ItemState::Finished,
        };
        let text = err.to_string();
        assert!(text.contains("item 4"));
        assert!(text.contains("producing_ws1"));
        assert!(text.contains("finished"));

        assert_eq!(
            SimError::InconsistentQueueState(9).to_string(),
            "Inconsistent WS2 queue state for item 9"
        );
    }
}
