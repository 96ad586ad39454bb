//! Terminal host driving one verification session
//!
//! Multiplexes countdown events and input lines in a single `select!` loop
//! and re-renders the snapshot after every user action.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use eq_core::{
    format_countdown, SessionEvent, SessionSnapshot, SessionState, TimerEvent, VerificationSession,
    VerificationTransport,
};
use eq_shared::phone::mask_phone_number;

use crate::commands::{parse_command, ParseError, UserCommand, HELP};
use crate::render::{render_snapshot, should_announce_tick};

/// How a hosted session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Submitted { enquiry_id: String },
    Failed { message: String },
    Abandoned,
}

fn finished(snapshot: &SessionSnapshot) -> Option<HostOutcome> {
    match &snapshot.state {
        SessionState::Succeeded { enquiry_id } => Some(HostOutcome::Submitted {
            enquiry_id: enquiry_id.clone(),
        }),
        SessionState::Failed { reason } if !snapshot.can_retry_submit => Some(HostOutcome::Failed {
            message: snapshot
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| reason.to_string()),
        }),
        _ => None,
    }
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

/// Run `session` against line-oriented input until it finishes
///
/// Starts the session, then feeds it timer events and parsed commands.
/// End of input abandons the enquiry.
pub async fn run_session<T, R, W>(
    session: &mut VerificationSession<T>,
    input: R,
    mut output: W,
) -> anyhow::Result<HostOutcome>
where
    T: VerificationTransport + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let masked = mask_phone_number(session.machine().phone().as_str());
    let mut lines = input.lines();

    if let Err(e) = session.dispatch(SessionEvent::Start).await {
        emit(&mut output, &format!("! {}\n", e)).await?;
    }
    emit(&mut output, &render_snapshot(&session.snapshot(), &masked)).await?;

    loop {
        if let Some(outcome) = finished(&session.snapshot()) {
            session.close();
            info!(outcome = ?outcome, "Verification session finished");
            return Ok(outcome);
        }

        tokio::select! {
            biased;

            Some(event) = session.next_timer_event() => {
                if let Err(e) = session.dispatch(event.into()).await {
                    debug!(error = %e, "Timer event ignored");
                    continue;
                }
                match event {
                    TimerEvent::Tick { remaining } if should_announce_tick(remaining) => {
                        emit(&mut output, &format!("  Code expires in {}\n", format_countdown(remaining))).await?;
                    }
                    TimerEvent::Expired => {
                        emit(&mut output, &render_snapshot(&session.snapshot(), &masked)).await?;
                    }
                    _ => {}
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.close();
                    info!("Input closed; enquiry abandoned");
                    return Ok(HostOutcome::Abandoned);
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(ParseError::Empty) => continue,
                    Err(e) => {
                        emit(&mut output, &format!("! {}\n", e)).await?;
                        continue;
                    }
                };

                match command {
                    UserCommand::Quit => {
                        session.close();
                        info!("Enquiry abandoned by user");
                        return Ok(HostOutcome::Abandoned);
                    }
                    UserCommand::Help => {
                        emit(&mut output, &format!("{}\n", HELP)).await?;
                        continue;
                    }
                    other => {
                        let focus = session.snapshot().focus;
                        if let Some(event) = other.into_event(focus) {
                            if let Err(e) = session.dispatch(event).await {
                                emit(&mut output, &format!("! {}\n", e)).await?;
                            }
                        }
                    }
                }
                emit(&mut output, &render_snapshot(&session.snapshot(), &masked)).await?;
            }
        }
    }
}
