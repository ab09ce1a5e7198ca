use std::fmt;

/// Activation policy assigned to a task from its inbound edges.
///
/// Computed once per conversion by the trigger-rule pass, after the full
/// edge set is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRule {
    /// Run only if every upstream dependency succeeded.
    AllSuccess,
    /// Run only if an upstream dependency failed.
    OneFailed,
    /// Run regardless of upstream outcome.
    AllDone,
    /// Unconstrained; the entry-node default.
    Dummy,
}

impl TriggerRule {
    /// Classify a node from its inbound edge flags.
    ///
    /// `on_success`: some node transitions here on success.
    /// `on_error`: some node transitions here on failure.
    pub fn from_reachability(on_success: bool, on_error: bool) -> Self {
        match (on_success, on_error) {
            (true, false) => TriggerRule::AllSuccess,
            (false, true) => TriggerRule::OneFailed,
            (true, true) => TriggerRule::AllDone,
            (false, false) => TriggerRule::Dummy,
        }
    }

    /// The identifier the target engine uses for this rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerRule::AllSuccess => "all_success",
            TriggerRule::OneFailed => "one_failed",
            TriggerRule::AllDone => "all_done",
            TriggerRule::Dummy => "dummy",
        }
    }
}

impl fmt::Display for TriggerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
