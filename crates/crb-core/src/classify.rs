//! Operation-specific classification of remote errors.
//!
//! Telegram reports most failures as a bad-request description string, so
//! classification is a case-insensitive substring match over that text. The
//! matching rules live here, isolated from the network, so they can be
//! pinned down by unit tests. Unmatched descriptions fall back to a generic
//! reason with the description truncated.

use crate::{fanout::TargetOutcome, formatting::truncate_chars, Error};

/// Longest slice of a raw error description shown to the operator.
pub const REASON_PREVIEW_CHARS: usize = 50;

pub fn classify_ban(err: &Error) -> TargetOutcome {
    match err {
        Error::Forbidden(_) => TargetOutcome::failed("Bot was kicked from channel"),
        Error::BadRequest(desc) => {
            let lower = desc.to_lowercase();
            if lower.contains("user not found") {
                TargetOutcome::failed("User not found in this channel")
            } else if lower.contains("not enough rights") {
                TargetOutcome::failed("Bot doesn't have ban rights")
            } else if lower.contains("user is an administrator") {
                TargetOutcome::failed("User is an administrator")
            } else {
                TargetOutcome::failed(format!(
                    "Error: {}",
                    truncate_chars(desc, REASON_PREVIEW_CHARS)
                ))
            }
        }
        _ => TargetOutcome::failed("Unexpected error"),
    }
}

pub fn classify_unban(err: &Error) -> TargetOutcome {
    match err {
        Error::Forbidden(_) => TargetOutcome::failed("Bot was kicked from channel"),
        Error::BadRequest(desc) => {
            let lower = desc.to_lowercase();
            if lower.contains("user not found") {
                TargetOutcome::skipped("User not found")
            } else if lower.contains("user not banned") {
                TargetOutcome::skipped("User not banned")
            } else if lower.contains("not enough rights") {
                TargetOutcome::failed("Bot doesn't have unban rights")
            } else if lower.contains("chat not found") {
                TargetOutcome::failed("Chat not found")
            } else {
                TargetOutcome::failed(format!(
                    "Error: {}",
                    truncate_chars(desc, REASON_PREVIEW_CHARS)
                ))
            }
        }
        _ => TargetOutcome::failed("Unexpected error"),
    }
}

pub fn classify_broadcast(err: &Error) -> TargetOutcome {
    match err {
        Error::Forbidden(_) => TargetOutcome::failed("Bot was kicked from channel"),
        Error::BadRequest(desc) => TargetOutcome::failed(format!(
            "Bad request: {}",
            truncate_chars(desc, REASON_PREVIEW_CHARS)
        )),
        other => TargetOutcome::failed(format!(
            "Unexpected error: {}",
            truncate_chars(&other.to_string(), REASON_PREVIEW_CHARS)
        )),
    }
}

pub fn classify_delete(err: &Error) -> TargetOutcome {
    TargetOutcome::failed(format!(
        "Error: {}",
        truncate_chars(&err.to_string(), REASON_PREVIEW_CHARS)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad(desc: &str) -> Error {
        Error::BadRequest(desc.to_string())
    }

    #[test]
    fn ban_matches_known_descriptions() {
        assert_eq!(
            classify_ban(&bad("Bad Request: USER NOT FOUND")),
            TargetOutcome::failed("User not found in this channel")
        );
        assert_eq!(
            classify_ban(&bad("Bad Request: not enough rights to restrict/unrestrict chat member")),
            TargetOutcome::failed("Bot doesn't have ban rights")
        );
        assert_eq!(
            classify_ban(&bad("Bad Request: user is an administrator of the chat")),
            TargetOutcome::failed("User is an administrator")
        );
    }

    #[test]
    fn ban_forbidden_means_kicked() {
        let err = Error::Forbidden("Forbidden: bot was kicked from the channel chat".to_string());
        assert_eq!(
            classify_ban(&err),
            TargetOutcome::failed("Bot was kicked from channel")
        );
    }

    #[test]
    fn ban_unknown_description_falls_back_truncated() {
        let desc = "x".repeat(80);
        let out = classify_ban(&bad(&desc));
        let TargetOutcome::Failed { reason } = out else {
            panic!("expected failure");
        };
        assert_eq!(reason, format!("Error: {}...", "x".repeat(50)));
    }

    #[test]
    fn ban_unexpected_error_kind() {
        let err = Error::Telegram("network timeout".to_string());
        assert_eq!(classify_ban(&err), TargetOutcome::failed("Unexpected error"));
    }

    #[test]
    fn unban_benign_cases_are_skips() {
        assert_eq!(
            classify_unban(&bad("Bad Request: user not found")),
            TargetOutcome::skipped("User not found")
        );
        assert_eq!(
            classify_unban(&bad("Bad Request: user not banned")),
            TargetOutcome::skipped("User not banned")
        );
    }

    #[test]
    fn unban_hard_failures_stay_failures() {
        assert_eq!(
            classify_unban(&bad("Bad Request: chat not found")),
            TargetOutcome::failed("Chat not found")
        );
        assert_eq!(
            classify_unban(&bad("Bad Request: not enough rights")),
            TargetOutcome::failed("Bot doesn't have unban rights")
        );
    }

    #[test]
    fn broadcast_prefixes_bad_requests() {
        let out = classify_broadcast(&bad("chat not found"));
        assert_eq!(out, TargetOutcome::failed("Bad request: chat not found"));
    }

    #[test]
    fn broadcast_unexpected_carries_message() {
        let err = Error::Telegram("connection reset".to_string());
        let TargetOutcome::Failed { reason } = classify_broadcast(&err) else {
            panic!("expected failure");
        };
        assert!(reason.starts_with("Unexpected error: "));
        assert!(reason.contains("connection reset"));
    }

    #[test]
    fn delete_always_fails_with_reason() {
        let TargetOutcome::Failed { reason } = classify_delete(&bad("message to delete not found"))
        else {
            panic!("expected failure");
        };
        assert!(reason.contains("message to delete not found"));
    }
}
