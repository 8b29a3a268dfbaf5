//! Ticket codes and QR payloads.

use std::{fmt, iter};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tickets::TicketId;

/// Prefix of every ticket code.
pub const TICKET_CODE_PREFIX: &str = "LUXE";

/// Random characters after the prefix.
pub const TICKET_CODE_LEN: usize = 6;

/// Length of the random QR token.
pub const QR_TOKEN_LEN: usize = 13;

/// Default base of QR validation links.
pub const DEFAULT_QR_BASE_URL: &str = "https://luxe.com/validate";

/// QR payload parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// The payload doesn't end in `/<ticket id>/<token>`.
    #[error("malformed QR payload: {0:?}")]
    Malformed(String),
}

/// `n` random lower-case base-36 characters.
fn base36<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    iter::repeat_with(|| rng.gen_range(0..36))
        .filter_map(|digit| char::from_digit(digit, 36))
        .take(n)
        .collect()
}

/// Short human-readable code, e.g. `LUXEK3Z9QA`.
pub fn ticket_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(TICKET_CODE_PREFIX.len() + TICKET_CODE_LEN);

    code.push_str(TICKET_CODE_PREFIX);
    code.push_str(&base36(rng, TICKET_CODE_LEN).to_ascii_uppercase());

    code
}

/// Whether `code` looks like a ticket code.
pub fn is_ticket_code(code: &str) -> bool {
    code.strip_prefix(TICKET_CODE_PREFIX).is_some_and(|rest| {
        rest.len() == TICKET_CODE_LEN
            && rest
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    })
}

/// What a ticket's QR code encodes: the ticket and a random token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    /// Ticket the code was issued for.
    pub ticket_id: TicketId,

    /// Random token.
    pub token: String,
}

impl QrPayload {
    /// A payload with a fresh token.
    pub fn issue<R: Rng + ?Sized>(ticket_id: TicketId, rng: &mut R) -> Self {
        Self {
            ticket_id,
            token: base36(rng, QR_TOKEN_LEN),
        }
    }

    /// Render as a validation link under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}/{}", base_url.trim_end_matches('/'), self.ticket_id, self.token)
    }

    /// Split a scanned link back into ticket id and token. The base of the
    /// link isn't checked.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Malformed`] if the last two path segments aren't a
    /// ticket id and an alphanumeric token.
    pub fn parse(payload: &str) -> Result<Self, QrError> {
        let malformed = || QrError::Malformed(payload.to_string());

        let mut segments = payload.trim().trim_end_matches('/').rsplit('/');

        let token = segments.next().filter(|token| {
            !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
        });
        let ticket_id = segments.next().filter(|id| !id.is_empty());

        match (ticket_id, token, segments.next()) {
            (Some(ticket_id), Some(token), Some(_)) => Ok(Self {
                ticket_id: TicketId::from(ticket_id),
                token: token.to_string(),
            }),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_url(DEFAULT_QR_BASE_URL))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rustc_hash::FxHashSet;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn ticket_codes_have_prefix_and_six_base36_chars() {
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let code = ticket_code(&mut rng);

            assert!(is_ticket_code(&code), "bad ticket code {code}");
            assert_eq!(code.len(), 10);
        }
    }

    #[test]
    fn ticket_codes_are_distinct() {
        let mut rng = StdRng::seed_from_u64(2);

        let codes: FxHashSet<String> = (0..500).map(|_| ticket_code(&mut rng)).collect();

        assert_eq!(codes.len(), 500);
    }

    #[test]
    fn is_ticket_code_rejects_other_shapes() {
        assert!(!is_ticket_code("LUXEabc123"));
        assert!(!is_ticket_code("LUXE12345"));
        assert!(!is_ticket_code("VIPX123456"));
    }

    #[test]
    fn qr_payload_round_trips_through_url() -> TestResult {
        let mut rng = StdRng::seed_from_u64(3);
        let payload = QrPayload::issue(TicketId::from("LUXE-0123456-42-1-0"), &mut rng);

        let url = payload.to_url("https://luxe.com/validate/");

        assert!(url.starts_with("https://luxe.com/validate/LUXE-0123456-42-1-0/"));
        assert_eq!(payload.token.len(), QR_TOKEN_LEN);
        assert_eq!(QrPayload::parse(&url)?, payload);

        Ok(())
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for payload in ["", "token-only", "https://luxe.com", "/id/tok en"] {
            assert_eq!(
                QrPayload::parse(payload),
                Err(QrError::Malformed(payload.to_string())),
                "accepted {payload:?}"
            );
        }
    }
}
