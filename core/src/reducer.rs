//! Lifecycle reducer.
//!
//! The pure decision core: `(State, Action, Environment) → (State, Effects)`.
//! It decides *what* happens on creation and on staff edits; the
//! [`crate::lifecycle::LifecycleController`] performs the I/O.

use crate::actions::RmaAction;
use crate::config::LifecycleConfig;
use crate::effects::RmaEffect;
use crate::state::{RmaRequest, RmaStatus};
use smallvec::{SmallVec, smallvec};

/// The Reducer trait.
///
/// # Type Parameters
///
/// - `State`: The state this reducer operates on
/// - `Action`: The action type it processes
/// - `Effect`: The effect descriptions it returns
/// - `Environment`: Injected configuration
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The effect descriptions this reducer produces
    type Effect;

    /// The environment type with injected configuration
    type Environment;

    /// Reduce an action into state changes and effects.
    ///
    /// Updates `state` in place and returns effect descriptions to execute.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Self::Effect; 4]>;
}

/// State of one request as seen by the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RmaState {
    /// The persisted request, once known.
    pub current: Option<RmaRequest>,
}

impl RmaState {
    /// State holding a loaded request.
    #[must_use]
    pub const fn loaded(request: RmaRequest) -> Self {
        Self {
            current: Some(request),
        }
    }
}

/// Lifecycle reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmaReducer;

impl RmaReducer {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for RmaReducer {
    type State = RmaState;
    type Action = RmaAction;
    type Effect = RmaEffect;
    type Environment = LifecycleConfig;

    fn reduce(
        &self,
        state: &mut RmaState,
        action: RmaAction,
        env: &LifecycleConfig,
    ) -> SmallVec<[RmaEffect; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // RequestCreated: cache, then notify admin and customer
            // ═══════════════════════════════════════════════════════════════
            RmaAction::RequestCreated { request } => {
                let request_id = request.id;
                state.current = Some((*request).clone());

                smallvec![
                    RmaEffect::CacheSnapshot {
                        request,
                        ttl: env.snapshot_ttl,
                    },
                    RmaEffect::NotifyCreation { request_id },
                ]
            }

            // ═══════════════════════════════════════════════════════════════
            // ApplyAdminChanges: persist; notify only on a change to rma_sent
            // ═══════════════════════════════════════════════════════════════
            RmaAction::ApplyAdminChanges { update } => {
                let Some(current) = state.current.as_mut() else {
                    tracing::warn!("Admin changes applied to an unloaded request");
                    return smallvec![RmaEffect::None];
                };

                let previous_status = current.status;
                let mut changed = false;

                if let Some(status) = update.status {
                    changed |= status != current.status;
                    current.status = status;
                }
                if let Some(instructions) = update.rma_instructions {
                    changed |= instructions != current.rma_instructions;
                    current.rma_instructions = instructions;
                }

                if !changed {
                    return smallvec![RmaEffect::None];
                }

                let request = Box::new(current.clone());

                if RmaStatus::triggers_customer_notification(previous_status, current.status) {
                    // Snapshot precedes the commit so the notifier never reads the store.
                    smallvec![RmaEffect::Sequential(vec![
                        RmaEffect::CacheSnapshot {
                            request: request.clone(),
                            ttl: env.snapshot_ttl,
                        },
                        RmaEffect::PersistChanges { request },
                        RmaEffect::NotifyStatusSent {
                            request_id: current.id,
                        },
                    ])]
                } else {
                    smallvec![RmaEffect::PersistChanges { request }]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{RmaId, RmaNumber, RmaSubmission, RmaUpdate};
    use chrono::Utc;
    use std::time::Duration;

    fn request(status: RmaStatus) -> RmaRequest {
        let mut request = RmaSubmission {
            customer_name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            order_ref: "ORD-1".into(),
            product_sku: "SKU-1".into(),
            reason_for_return: "Broken".into(),
        }
        .into_request(RmaId::new(5), RmaNumber::from_sequence(5), Utc::now());
        request.status = status;
        request
    }

    fn apply(status: RmaStatus, update: RmaUpdate) -> (RmaState, SmallVec<[RmaEffect; 4]>) {
        let mut state = RmaState::loaded(request(status));
        let effects = RmaReducer::new().reduce(
            &mut state,
            RmaAction::ApplyAdminChanges { update },
            &LifecycleConfig::default(),
        );
        (state, effects)
    }

    #[test]
    fn test_created_caches_then_notifies() {
        let mut state = RmaState::default();
        let config = LifecycleConfig::new().with_snapshot_ttl(Duration::from_secs(60));
        let effects = RmaReducer::new().reduce(
            &mut state,
            RmaAction::RequestCreated {
                request: Box::new(request(RmaStatus::Pending)),
            },
            &config,
        );

        assert!(state.current.is_some());
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            &effects[0],
            RmaEffect::CacheSnapshot { ttl, .. } if *ttl == Duration::from_secs(60)
        ));
        assert_eq!(
            effects[1],
            RmaEffect::NotifyCreation {
                request_id: RmaId::new(5)
            }
        );
    }

    #[test]
    fn test_change_to_rma_sent_notifies_once() {
        let (state, effects) = apply(RmaStatus::Pending, RmaUpdate::status(RmaStatus::RmaSent));

        assert_eq!(
            state.current.as_ref().map(|r| r.status),
            Some(RmaStatus::RmaSent)
        );
        let [RmaEffect::Sequential(steps)] = effects.as_slice() else {
            unreachable!("expected a single sequential effect, got {effects:?}");
        };
        assert!(matches!(steps[0], RmaEffect::CacheSnapshot { .. }));
        assert!(matches!(steps[1], RmaEffect::PersistChanges { .. }));
        assert!(matches!(steps[2], RmaEffect::NotifyStatusSent { .. }));
    }

    #[test]
    fn test_resave_rma_sent_is_a_no_op() {
        let (_, effects) = apply(RmaStatus::RmaSent, RmaUpdate::status(RmaStatus::RmaSent));
        assert_eq!(effects.as_slice(), [RmaEffect::None]);
    }

    #[test]
    fn test_instruction_edit_on_sent_request_persists_without_email() {
        let (state, effects) = apply(
            RmaStatus::RmaSent,
            RmaUpdate::status(RmaStatus::RmaSent).with_instructions("Ship to $rma_number"),
        );
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], RmaEffect::PersistChanges { .. }));
        assert!(!effects[0].notifies());
        assert_eq!(
            state.current.map(|r| r.rma_instructions),
            Some("Ship to $rma_number".to_string())
        );
    }

    #[test]
    fn test_product_received_persists_without_email() {
        let (_, effects) =
            apply(RmaStatus::Pending, RmaUpdate::status(RmaStatus::ProductReceived));
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], RmaEffect::PersistChanges { .. }));
    }

    #[test]
    fn test_unloaded_state_yields_nothing() {
        let mut state = RmaState::default();
        let effects = RmaReducer::new().reduce(
            &mut state,
            RmaAction::ApplyAdminChanges {
                update: RmaUpdate::status(RmaStatus::RmaSent),
            },
            &LifecycleConfig::default(),
        );
        assert_eq!(effects.as_slice(), [RmaEffect::None]);
    }
}
