//! Observable state of one explorer session.

use std::sync::Arc;

use crate::capitals::{geo, CapitalRecord, CapitalSummary, GeoPoint, RankedCapital};
use crate::gateway::GatewayError;

/// Lifecycle of the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InvocationPhase {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A request for `target` is in flight.
    Pending { target: String },
    /// The latest request for `target` succeeded.
    Settled {
        target: String,
        record: Arc<CapitalRecord>,
    },
    /// The latest request for `target` failed.
    Failed { target: String, error: GatewayError },
}

/// Snapshot published to observers after every transition.
#[derive(Debug, Clone, Default)]
pub struct InvocationState {
    pub phase: InvocationPhase,
    /// What the user last asked for, as they spelled it.
    pub current_selection: Option<String>,
    /// Most recent successfully resolved record. Survives `Pending` and
    /// `Failed` so the surface keeps showing the previous capital.
    pub last_settled: Option<Arc<CapitalRecord>>,
    /// Roster from the most recent response metadata.
    pub roster: Arc<Vec<CapitalSummary>>,
}

impl InvocationState {
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, InvocationPhase::Pending { .. })
    }

    /// Target of the current phase, if any.
    pub fn target(&self) -> Option<&str> {
        match &self.phase {
            InvocationPhase::Idle => None,
            InvocationPhase::Pending { target }
            | InvocationPhase::Settled { target, .. }
            | InvocationPhase::Failed { target, .. } => Some(target),
        }
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match &self.phase {
            InvocationPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Roster entry for the current selection, matched on code, capital
    /// name, or country name.
    pub fn selected_summary(&self) -> Option<&CapitalSummary> {
        let selection = self.current_selection.as_deref()?.trim();
        self.roster.iter().find(|c| {
            c.country_code.eq_ignore_ascii_case(selection)
                || c.name.eq_ignore_ascii_case(selection)
                || c.country_name.eq_ignore_ascii_case(selection)
        })
    }

    /// Map center: the selected capital, else the last settled record,
    /// else the origin.
    pub fn center(&self) -> GeoPoint {
        self.selected_summary()
            .map(|c| c.coordinates)
            .or_else(|| self.last_settled.as_ref().map(|r| r.coordinates))
            .unwrap_or_else(GeoPoint::origin)
    }

    /// Closest other capitals to the current center.
    pub fn nearby(&self, limit: usize) -> Vec<RankedCapital> {
        let exclude = self
            .selected_summary()
            .map(|c| c.country_code.as_str())
            .or_else(|| self.last_settled.as_ref().map(|r| r.country.cca2.as_str()));
        geo::nearby(self.center(), &self.roster, exclude, limit)
    }
}
