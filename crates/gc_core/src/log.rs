//! Event log for notable transitions and invariant violations, in the
//! teacher's `ActionLog` style: a plain append-only `Vec<String>` rather than
//! a tracing/metrics framework the teacher never reached for.

/// Chronological record of simulation events worth surfacing to an operator
/// (construction completions, spawner births, invariant violations).
#[derive(Debug, Default)]
pub struct EngineLog {
    pub events: Vec<String>,
}

impl EngineLog {
    pub fn log(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Emits to stderr immediately and records in `log`; used at the handful of
/// spots spec.md §7 calls out as "fatal in development builds" invariant
/// violations (a malformed `ConstructionSpec`, an orphaned worker reference).
pub fn report_invariant_violation(log: &mut EngineLog, message: impl Into<String>) {
    let message = message.into();
    eprintln!("invariant violation: {message}");
    log.log(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_then_clear_empties_events() {
        let mut log = EngineLog::default();
        log.log("construction site finished");
        assert_eq!(log.events.len(), 1);
        log.clear();
        assert!(log.events.is_empty());
    }
}
