use crate::domain::{Expectation, TRANSPORT_FAILURE_STATUS, Verdict};

impl Expectation {
    /// Short label used in reasons and reports.
    pub fn label(&self) -> String {
        match self {
            Expectation::AcceptAny => "any status".to_string(),
            Expectation::StatusIn(allowed) => {
                let codes: Vec<String> = allowed.iter().map(|code| code.to_string()).collect();
                format!("one of [{}]", codes.join(", "))
            }
            Expectation::NotSuccess2xx => "not 2xx".to_string(),
            Expectation::Is4xx => "4xx".to_string(),
            Expectation::Is4xxOr415 => "4xx/415".to_string(),
            Expectation::NotServerError5xx => "not 5xx".to_string(),
            Expectation::StableAcrossRepeat => "same status on repeat".to_string(),
        }
    }

    /// Judge a single observed status.
    ///
    /// `StableAcrossRepeat` cannot be decided from one status and always fails
    /// here; use [`evaluate_repeat`] with both dispatches instead.
    pub fn evaluate(&self, status: i32) -> Verdict {
        let ok = match self {
            Expectation::AcceptAny => {
                return Verdict {
                    ok: true,
                    reason: format!("status={status}, baseline accepts any status"),
                };
            }
            Expectation::StatusIn(allowed) => allowed.contains(&status),
            Expectation::NotSuccess2xx => !(200..300).contains(&status),
            Expectation::Is4xx | Expectation::Is4xxOr415 => (400..500).contains(&status),
            Expectation::NotServerError5xx => !(500..600).contains(&status),
            Expectation::StableAcrossRepeat => {
                return Verdict {
                    ok: false,
                    reason: format!(
                        "status={status}, expected {} (requires two dispatches)",
                        self.label()
                    ),
                };
            }
        };

        Verdict {
            ok,
            reason: format!("status={status}, expected {}", self.label()),
        }
    }
}

/// Verdict for a stability case: both statuses equal and neither a transport failure.
pub fn evaluate_repeat(first: i32, second: i32) -> Verdict {
    Verdict {
        ok: first == second && first != TRANSPORT_FAILURE_STATUS,
        reason: format!("status1={first}, status2={second}, expected identical statuses"),
    }
}
