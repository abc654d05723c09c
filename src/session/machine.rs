//! Invocation state machine: one current selection, last selection wins.
//!
//! Every dispatched request is tagged with a ticket from a monotonically
//! increasing counter. When a response arrives its ticket is compared with
//! the latest one; a mismatch means a newer selection has been made since,
//! and the response is dropped without touching the visible state. There is
//! no cancellation: superseded requests run to completion and are ignored.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::{InvocationPhase, InvocationState};
use crate::capitals::CapitalRecord;
use crate::gateway::{CapitalTool, GatewayError, ToolRequest, ToolResponse};

/// What `select` did with a selection.
#[derive(Debug)]
pub enum Selection {
    /// A request was issued. The handle yields `true` if its response was
    /// applied, `false` if it had been superseded by the time it arrived.
    Dispatched(JoinHandle<bool>),
    /// The same target is already in flight; no new request.
    AlreadyPending,
    /// Settled immediately from a previously resolved record.
    Cached,
}

/// Bookkeeping guarded by the slot lock. The watch channel only ever sees
/// whole transitions.
#[derive(Default)]
struct Slot {
    ticket: u64,
    in_flight: Option<String>,
    cache: HashMap<String, Arc<CapitalRecord>>,
}

/// Client-side controller for one explorer session.
pub struct InvocationStateMachine {
    transport: Arc<dyn CapitalTool>,
    slot: Arc<Mutex<Slot>>,
    state: Arc<watch::Sender<InvocationState>>,
}

impl InvocationStateMachine {
    pub fn new(transport: Arc<dyn CapitalTool>) -> Self {
        let (state, _) = watch::channel(InvocationState::default());
        Self {
            transport,
            slot: Arc::new(Mutex::new(Slot::default())),
            state: Arc::new(state),
        }
    }

    /// Session that starts from the response of the invocation that opened
    /// the surface.
    pub fn with_initial(
        transport: Arc<dyn CapitalTool>,
        target: impl Into<String>,
        response: ToolResponse,
    ) -> Self {
        let machine = Self::new(transport);
        machine.seed(target, response);
        machine
    }

    /// Watch every state transition.
    pub fn subscribe(&self) -> watch::Receiver<InvocationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> InvocationState {
        self.state.borrow().clone()
    }

    /// Select `target` and resolve it, reusing a cached record when one
    /// exists for that target.
    pub fn select(&self, target: impl Into<String>) -> Selection {
        self.dispatch(target.into(), true)
    }

    /// Select `target` and always go to the transport. Use after `Failed`
    /// or to pick up refreshed enrichment.
    pub fn refresh(&self, target: impl Into<String>) -> Selection {
        self.dispatch(target.into(), false)
    }

    /// Apply a response obtained outside the machine as the outcome for
    /// `target`, superseding anything in flight.
    pub fn seed(&self, target: impl Into<String>, response: ToolResponse) {
        let target = target.into();
        let key = selection_key(&target);
        let ticket = {
            let mut slot = self.slot.lock();
            slot.ticket += 1;
            slot.ticket
        };
        self.state
            .send_modify(|s| s.current_selection = Some(target.clone()));
        settle(&self.slot, &self.state, ticket, &key, target, Ok(response));
    }

    pub fn clear_cache(&self) {
        self.slot.lock().cache.clear();
    }

    fn dispatch(&self, target: String, use_cache: bool) -> Selection {
        let key = selection_key(&target);
        let mut slot = self.slot.lock();

        if slot.in_flight.as_deref() == Some(key.as_str()) {
            return Selection::AlreadyPending;
        }

        slot.ticket += 1;
        let ticket = slot.ticket;

        if use_cache {
            if let Some(record) = slot.cache.get(&key).cloned() {
                slot.in_flight = None;
                self.state.send_modify(|s| {
                    s.current_selection = Some(target.clone());
                    s.last_settled = Some(Arc::clone(&record));
                    s.phase = InvocationPhase::Settled { target, record };
                });
                return Selection::Cached;
            }
        }

        slot.in_flight = Some(key.clone());
        self.state.send_modify(|s| {
            s.current_selection = Some(target.clone());
            s.phase = InvocationPhase::Pending {
                target: target.clone(),
            };
        });
        drop(slot);

        let transport = Arc::clone(&self.transport);
        let slot = Arc::clone(&self.slot);
        let state = Arc::clone(&self.state);
        Selection::Dispatched(tokio::spawn(async move {
            let outcome = transport.call(ToolRequest::new(target.clone())).await;
            settle(&slot, &state, ticket, &key, target, outcome)
        }))
    }
}

/// Apply an outcome if `ticket` is still the latest. Returns whether it was
/// applied.
fn settle(
    slot: &Mutex<Slot>,
    state: &watch::Sender<InvocationState>,
    ticket: u64,
    key: &str,
    target: String,
    outcome: Result<ToolResponse, GatewayError>,
) -> bool {
    let mut slot = slot.lock();
    if slot.ticket != ticket {
        log::debug!(
            "Dropping superseded response for '{}' (ticket {}, latest {})",
            target,
            ticket,
            slot.ticket
        );
        return false;
    }
    slot.in_flight = None;

    match outcome {
        Ok(response) => {
            let ToolResponse {
                structured_content,
                response_metadata,
            } = response;
            let record = Arc::new(structured_content.capital);
            slot.cache.insert(key.to_string(), Arc::clone(&record));
            slot.cache
                .insert(selection_key(&record.country.cca2), Arc::clone(&record));

            state.send_modify(|s| {
                s.last_settled = Some(Arc::clone(&record));
                s.phase = InvocationPhase::Settled { target, record };
                if !response_metadata.all_capitals.is_empty() {
                    s.roster = Arc::new(response_metadata.all_capitals);
                }
            });
        }
        Err(error) => {
            log::debug!("Selection '{}' failed: {}", target, error);
            state.send_modify(|s| s.phase = InvocationPhase::Failed { target, error });
        }
    }
    true
}

fn selection_key(target: &str) -> String {
    target.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capitals::{CapitalRepository, CapitalResolver, ErrorKind};
    use crate::gateway::{IdentifierNormalizer, ToolGateway};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    type Outcome = Result<ToolResponse, GatewayError>;

    /// Transport whose responses are released by the test, per target.
    #[derive(Default)]
    struct ScriptedTool {
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTool {
        fn gate(&self, name: &str) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(name.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl CapitalTool for ScriptedTool {
        async fn call(&self, request: ToolRequest) -> Result<ToolResponse, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().remove(&request.name);
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(GatewayError::internal())),
                None => Err(GatewayError::not_found(format!("no script for {}", request.name))),
            }
        }
    }

    fn gateway() -> ToolGateway {
        let repo = CapitalRepository::embedded().unwrap();
        ToolGateway::new(Arc::new(CapitalResolver::new(repo.clone())))
            .with_normalizer(IdentifierNormalizer::from_repository(&repo))
    }

    async fn response(name: &str) -> ToolResponse {
        gateway().invoke(ToolRequest::new(name)).await.unwrap()
    }

    fn settled_code(state: &InvocationState) -> Option<String> {
        match &state.phase {
            InvocationPhase::Settled { record, .. } => Some(record.country.cca2.clone()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_select_then_settle() {
        let tool = Arc::new(ScriptedTool::default());
        let gate = tool.gate("FR");
        let machine = InvocationStateMachine::new(tool.clone());
        assert_eq!(machine.snapshot().phase, InvocationPhase::Idle);

        let Selection::Dispatched(handle) = machine.select("FR") else {
            panic!("expected a dispatched request");
        };
        let pending = machine.snapshot();
        assert!(pending.is_pending());
        assert_eq!(pending.target(), Some("FR"));

        gate.send(Ok(response("FR").await)).unwrap();
        assert!(handle.await.unwrap());

        let state = machine.snapshot();
        assert!(!state.is_pending());
        assert_eq!(settled_code(&state).as_deref(), Some("FR"));
        assert_eq!(state.last_settled.as_ref().unwrap().name, "Paris");
        assert!(!state.roster.is_empty());
    }

    #[tokio::test]
    async fn test_last_selection_wins_over_late_response() {
        let tool = Arc::new(ScriptedTool::default());
        let gate_fr = tool.gate("FR");
        let gate_de = tool.gate("DE");
        let machine = InvocationStateMachine::new(tool.clone());

        let Selection::Dispatched(first) = machine.select("FR") else {
            panic!("expected a dispatched request");
        };
        let Selection::Dispatched(second) = machine.select("DE") else {
            panic!("expected a dispatched request");
        };

        gate_de.send(Ok(response("DE").await)).unwrap();
        assert!(second.await.unwrap());
        gate_fr.send(Ok(response("FR").await)).unwrap();
        assert!(!first.await.unwrap());

        let state = machine.snapshot();
        assert_eq!(settled_code(&state).as_deref(), Some("DE"));
        assert_eq!(state.current_selection.as_deref(), Some("DE"));
        assert_eq!(state.last_settled.as_ref().unwrap().name, "Berlin");
    }

    #[tokio::test]
    async fn test_stale_response_dropped_while_newer_pending() {
        let tool = Arc::new(ScriptedTool::default());
        let gate_fr = tool.gate("FR");
        let _gate_de = tool.gate("DE");
        let machine = InvocationStateMachine::new(tool.clone());

        let Selection::Dispatched(first) = machine.select("FR") else {
            panic!("expected a dispatched request");
        };
        let _second = machine.select("DE");

        gate_fr.send(Ok(response("FR").await)).unwrap();
        assert!(!first.await.unwrap());

        let state = machine.snapshot();
        assert!(state.is_pending());
        assert_eq!(state.target(), Some("DE"));
        assert!(state.last_settled.is_none());
    }

    #[tokio::test]
    async fn test_stale_error_does_not_clobber() {
        let tool = Arc::new(ScriptedTool::default());
        let gate_zz = tool.gate("ZZ");
        let gate_fr = tool.gate("FR");
        let machine = InvocationStateMachine::new(tool.clone());

        let Selection::Dispatched(first) = machine.select("ZZ") else {
            panic!("expected a dispatched request");
        };
        let Selection::Dispatched(second) = machine.select("FR") else {
            panic!("expected a dispatched request");
        };
        gate_fr.send(Ok(response("FR").await)).unwrap();
        assert!(second.await.unwrap());
        gate_zz
            .send(Err(GatewayError::not_found("No capital known for ZZ")))
            .unwrap();
        assert!(!first.await.unwrap());

        assert_eq!(settled_code(&machine.snapshot()).as_deref(), Some("FR"));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_record() {
        let tool = Arc::new(ScriptedTool::default());
        let machine =
            InvocationStateMachine::with_initial(tool.clone(), "FR", response("FR").await);

        let gate = tool.gate("ZZ");
        let Selection::Dispatched(handle) = machine.select("ZZ") else {
            panic!("expected a dispatched request");
        };
        gate.send(Err(GatewayError::not_found("No capital known for ZZ")))
            .unwrap();
        assert!(handle.await.unwrap());

        let state = machine.snapshot();
        assert_eq!(state.error().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(state.target(), Some("ZZ"));
        assert_eq!(state.last_settled.as_ref().unwrap().name, "Paris");
    }

    #[tokio::test]
    async fn test_same_target_pending_is_not_reissued() {
        let tool = Arc::new(ScriptedTool::default());
        let gate = tool.gate("FR");
        let machine = InvocationStateMachine::new(tool.clone());

        let Selection::Dispatched(handle) = machine.select("FR") else {
            panic!("expected a dispatched request");
        };
        assert!(matches!(machine.select(" fr "), Selection::AlreadyPending));

        gate.send(Ok(response("FR").await)).unwrap();
        assert!(handle.await.unwrap());
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_settled_target_served_from_cache() {
        let tool = Arc::new(ScriptedTool::default());
        let machine =
            InvocationStateMachine::with_initial(tool.clone(), "France", response("France").await);

        let gate_de = tool.gate("DE");
        let Selection::Dispatched(handle) = machine.select("DE") else {
            panic!("expected a dispatched request");
        };
        gate_de.send(Ok(response("DE").await)).unwrap();
        assert!(handle.await.unwrap());

        // Cached under both the selection and the resolved code.
        assert!(matches!(machine.select("France"), Selection::Cached));
        assert!(matches!(machine.select("fr"), Selection::Cached));
        assert_eq!(settled_code(&machine.snapshot()).as_deref(), Some("FR"));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_selection_supersedes_in_flight() {
        let tool = Arc::new(ScriptedTool::default());
        let machine =
            InvocationStateMachine::with_initial(tool.clone(), "FR", response("FR").await);

        let gate_de = tool.gate("DE");
        let Selection::Dispatched(handle) = machine.select("DE") else {
            panic!("expected a dispatched request");
        };
        assert!(matches!(machine.select("FR"), Selection::Cached));

        gate_de.send(Ok(response("DE").await)).unwrap();
        assert!(!handle.await.unwrap());
        assert_eq!(settled_code(&machine.snapshot()).as_deref(), Some("FR"));
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let tool = Arc::new(ScriptedTool::default());
        let machine =
            InvocationStateMachine::with_initial(tool.clone(), "FR", response("FR").await);

        let gate = tool.gate("FR");
        let Selection::Dispatched(handle) = machine.refresh("FR") else {
            panic!("expected a dispatched request");
        };
        gate.send(Ok(response("FR").await)).unwrap();
        assert!(handle.await.unwrap());
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);

        machine.clear_cache();
        let _gate = tool.gate("FR");
        assert!(matches!(machine.select("FR"), Selection::Dispatched(_)));
    }

    #[tokio::test]
    async fn test_observers_see_pending_then_settled() {
        let tool = Arc::new(ScriptedTool::default());
        let gate = tool.gate("JP");
        let machine = InvocationStateMachine::new(tool.clone());
        let mut rx = machine.subscribe();

        let Selection::Dispatched(handle) = machine.select("JP") else {
            panic!("expected a dispatched request");
        };
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_pending());

        gate.send(Ok(response("JP").await)).unwrap();
        handle.await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(settled_code(&rx.borrow()).as_deref(), Some("JP"));
    }

    #[tokio::test]
    async fn test_round_trip_against_gateway() {
        let machine = InvocationStateMachine::new(Arc::new(gateway()));
        for code in ["ES", "it", "KE"] {
            let Selection::Dispatched(handle) = machine.select(code) else {
                panic!("expected a dispatched request");
            };
            assert!(handle.await.unwrap());
            let state = machine.snapshot();
            assert_eq!(
                settled_code(&state).unwrap(),
                code.to_ascii_uppercase()
            );
            // Nearby list never contains the selection itself.
            assert!(state
                .nearby(5)
                .iter()
                .all(|r| !r.capital.country_code.eq_ignore_ascii_case(code)));
        }
    }
}
