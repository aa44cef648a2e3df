//! Order State Machine
//!
//! ```text
//! Pending ──start──▶ InProgress ──complete──▶ Completed
//!    │                   │
//!    └──cancel──▶ Cancelled ◀──cancel──┘
//! ```
//!
//! Completed and Cancelled are terminal. `complete` is only issued by the
//! sale aggregator; the generic order update never produces it.

use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    Start,
    Cancel,
    Complete,
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot {} order in status {from}", .event.name())]
    Invalid { from: OrderStatus, event: OrderEvent },

    #[error("No transition from {from} to {to}")]
    Unreachable { from: OrderStatus, to: OrderStatus },

    #[error("Orders are only completed by settlement")]
    SettlementOnly,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        let message = err.to_string();
        match err {
            TransitionError::Invalid { from, event } => {
                let code = match from {
                    OrderStatus::Completed => ErrorCode::OrderAlreadyCompleted,
                    OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
                    _ => ErrorCode::OrderInvalidTransition,
                };
                AppError::with_message(code, message)
                    .with_detail("from", from.as_str())
                    .with_detail("event", event.name())
            }
            TransitionError::Unreachable { from, to } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            TransitionError::SettlementOnly => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("to", OrderStatus::Completed.as_str())
            }
        }
    }
}

/// Apply `event` to `status`
pub fn apply(status: OrderStatus, event: OrderEvent) -> Result<OrderStatus, TransitionError> {
    use OrderEvent::*;
    use OrderStatus::*;

    match (status, event) {
        (Pending, Start) => Ok(InProgress),
        (Pending, Cancel) | (InProgress, Cancel) => Ok(Cancelled),
        (InProgress, Complete) => Ok(Completed),
        (from, event) => Err(TransitionError::Invalid { from, event }),
    }
}

/// Event a generic update needs to move `from` to `to`
///
/// `Ok(None)` when the status does not change.
pub fn event_for_target(from: OrderStatus, to: OrderStatus) -> Result<Option<OrderEvent>, TransitionError> {
    if from == to {
        return Ok(None);
    }
    let event = match to {
        OrderStatus::InProgress => OrderEvent::Start,
        OrderStatus::Cancelled => OrderEvent::Cancel,
        OrderStatus::Completed => return Err(TransitionError::SettlementOnly),
        OrderStatus::Pending => return Err(TransitionError::Unreachable { from, to }),
    };
    apply(from, event)?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderEvent::*;
    use OrderStatus::*;

    #[test]
    fn test_transition_table() {
        let cases = [
            (Pending, Start, Some(InProgress)),
            (Pending, Cancel, Some(Cancelled)),
            (Pending, Complete, None),
            (InProgress, Start, None),
            (InProgress, Cancel, Some(Cancelled)),
            (InProgress, Complete, Some(Completed)),
        ];
        for (from, event, expected) in cases {
            assert_eq!(apply(from, event).ok(), expected, "{from} --{}-->", event.name());
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [Completed, Cancelled] {
            for event in [Start, Cancel, Complete] {
                assert_eq!(apply(from, event), Err(TransitionError::Invalid { from, event }));
            }
        }
    }

    #[test]
    fn test_complete_from_pending_is_invalid() {
        let err = apply(Pending, Complete).unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::OrderInvalidTransition);
    }

    #[test]
    fn test_terminal_error_codes() {
        assert_eq!(
            AppError::from(apply(Completed, Cancel).unwrap_err()).code,
            ErrorCode::OrderAlreadyCompleted
        );
        assert_eq!(
            AppError::from(apply(Cancelled, Start).unwrap_err()).code,
            ErrorCode::OrderAlreadyCancelled
        );
    }

    #[test]
    fn test_event_for_target() {
        assert_eq!(event_for_target(Pending, Pending), Ok(None));
        assert_eq!(event_for_target(Pending, InProgress), Ok(Some(Start)));
        assert_eq!(event_for_target(InProgress, Cancelled), Ok(Some(Cancel)));
        assert_eq!(
            event_for_target(InProgress, Completed),
            Err(TransitionError::SettlementOnly)
        );
        assert_eq!(
            event_for_target(InProgress, Pending),
            Err(TransitionError::Unreachable {
                from: InProgress,
                to: Pending
            })
        );
        assert!(event_for_target(Cancelled, InProgress).is_err());
    }
}
