//! Resend gating
//!
//! By default a replacement code is only offered once the current one has
//! expired. A cooldown policy additionally opens resend on a live code once
//! enough of its TTL has elapsed.

use eq_shared::ResendPolicy;

use super::types::SessionState;
use crate::domain::entities::VerificationChallenge;
use crate::errors::{DomainError, DomainResult};

/// Whether resend is open right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendAvailability {
    Available,
    /// Closed; `in_seconds` is set when waiting will open it
    Unavailable { in_seconds: Option<u64> },
}

/// Challenge a resend replaces and how the session stood when it started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOrigin {
    Expired(VerificationChallenge),
    Live {
        challenge: VerificationChallenge,
        seconds_remaining: u64,
    },
}

impl ResendOrigin {
    pub fn challenge(&self) -> &VerificationChallenge {
        match self {
            ResendOrigin::Expired(challenge) => challenge,
            ResendOrigin::Live { challenge, .. } => challenge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendController {
    policy: ResendPolicy,
}

impl ResendController {
    pub fn new(policy: ResendPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResendPolicy {
        self.policy
    }

    pub fn availability(&self, state: &SessionState) -> ResendAvailability {
        match (state, self.policy) {
            (SessionState::Expired { .. }, _) => ResendAvailability::Available,
            (
                SessionState::AwaitingCode {
                    seconds_remaining, ..
                },
                ResendPolicy::AfterExpiry,
            ) => ResendAvailability::Unavailable {
                in_seconds: Some(*seconds_remaining),
            },
            (
                SessionState::AwaitingCode {
                    challenge,
                    seconds_remaining,
                },
                ResendPolicy::AfterCooldown { seconds },
            ) => {
                let elapsed = challenge.ttl_seconds.saturating_sub(*seconds_remaining);
                if elapsed >= seconds {
                    ResendAvailability::Available
                } else {
                    ResendAvailability::Unavailable {
                        in_seconds: Some((seconds - elapsed).min(*seconds_remaining)),
                    }
                }
            }
            _ => ResendAvailability::Unavailable { in_seconds: None },
        }
    }

    /// Checks the policy and records what the resend supersedes
    pub fn begin(&self, state: &SessionState) -> DomainResult<ResendOrigin> {
        if let ResendAvailability::Unavailable { in_seconds } = self.availability(state) {
            return Err(DomainError::ResendUnavailable {
                available_in_seconds: in_seconds,
            });
        }

        match state {
            SessionState::Expired { challenge } => Ok(ResendOrigin::Expired(challenge.clone())),
            SessionState::AwaitingCode {
                challenge,
                seconds_remaining,
            } => Ok(ResendOrigin::Live {
                challenge: challenge.clone(),
                seconds_remaining: *seconds_remaining,
            }),
            _ => Err(DomainError::ResendUnavailable {
                available_in_seconds: None,
            }),
        }
    }
}
