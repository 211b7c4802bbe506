//! Mode selection for one playback iteration (spec.md §4.7).

use flowtrace_gateway::schema::PlaybackMode;

/// Recovery if the previous action failed; guided if the current step
/// index points to a defined step; generative otherwise.
pub fn select(last_error: Option<&str>, current_step_defined: bool) -> PlaybackMode {
    if last_error.is_some() {
        PlaybackMode::Recovery
    } else if current_step_defined {
        PlaybackMode::Guided
    } else {
        PlaybackMode::Generative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_failure_forces_recovery_even_when_guided() {
        assert_eq!(select(Some("element not found"), true), PlaybackMode::Recovery);
    }

    #[test]
    fn defined_step_is_guided() {
        assert_eq!(select(None, true), PlaybackMode::Guided);
    }

    #[test]
    fn no_defined_step_is_generative() {
        assert_eq!(select(None, false), PlaybackMode::Generative);
    }
}
