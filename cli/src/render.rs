//! Text rendering of a session snapshot

use std::fmt::Write;

use eq_core::{format_countdown, SessionSnapshot, SessionState};

/// Digit boxes, e.g. `[1][2][_][_]`, with the focused box marked
pub fn render_digits(snapshot: &SessionSnapshot) -> String {
    snapshot
        .digits
        .iter()
        .enumerate()
        .map(|(i, digit)| {
            let c = digit.unwrap_or('_');
            if i == snapshot.focus && snapshot.can_edit {
                format!(">{}<", c)
            } else {
                format!("[{}]", c)
            }
        })
        .collect()
}

/// Status line for the current state
pub fn render_status(state: &SessionState, masked_phone: &str) -> String {
    match state {
        SessionState::Idle => "Preparing verification...".to_string(),
        SessionState::AwaitingCode { seconds_remaining, .. } => format!(
            "Enter the code sent to {}. Code expires in {}",
            masked_phone,
            format_countdown(*seconds_remaining)
        ),
        SessionState::Verifying { .. } => "Verifying...".to_string(),
        SessionState::Submitting { .. } => "Submitting enquiry...".to_string(),
        SessionState::Succeeded { enquiry_id } => format!("Enquiry submitted (reference {})", enquiry_id),
        SessionState::Failed { .. } => "Something went wrong.".to_string(),
        SessionState::Expired { .. } => "Code expired.".to_string(),
    }
}

/// Full screen: status, boxes, messages and the actions on offer
pub fn render_snapshot(snapshot: &SessionSnapshot, masked_phone: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_status(&snapshot.state, masked_phone));
    if snapshot.can_edit {
        let _ = writeln!(out, "  {}", render_digits(snapshot));
    }
    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "  {}", notice);
    }
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "  ! {}", error.message);
    }

    let mut actions = Vec::new();
    if snapshot.can_submit {
        actions.push("submit");
    }
    if snapshot.can_resend {
        actions.push("resend");
    }
    if snapshot.can_retry_submit {
        actions.push("retry");
    }
    if !actions.is_empty() {
        let _ = writeln!(out, "  Available: {}", actions.join(", "));
    } else if let Some(secs) = snapshot.resend_in {
        let _ = writeln!(out, "  Resend available in {}", format_countdown(secs));
    }
    out
}

/// Whether a tick is worth printing on its own line
pub fn should_announce_tick(remaining: u64) -> bool {
    remaining <= 10 || remaining % 60 == 0
}
