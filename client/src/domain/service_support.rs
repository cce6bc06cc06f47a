//! Helpers shared by the gateway-facing services.

use chrono::NaiveDate;
use mockable::Clock;

use super::Error;
use super::ports::GatewayError;

/// Map a gateway failure into the domain error surfaced to callers.
///
/// Backend messages are passed through verbatim.
pub(crate) fn map_gateway_error(error: GatewayError) -> Error {
    match error {
        GatewayError::Unauthenticated { message } if message.trim().is_empty() => {
            Error::unauthenticated(super::session::NOT_LOGGED_IN)
        }
        GatewayError::Unauthenticated { message } => Error::unauthenticated(message),
        GatewayError::Rejected { status, message } => Error::api(status, message),
        GatewayError::Transport { message } => {
            Error::service_unavailable(format!("backend unreachable: {message}"))
        }
        GatewayError::Decode { message } => {
            Error::internal(format!("unexpected backend response: {message}"))
        }
    }
}

/// Calendar date the user is living in.
pub(crate) fn today(clock: &dyn Clock) -> NaiveDate {
    clock.local().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(GatewayError::unauthenticated("Invalid or expired token"), ErrorCode::Unauthenticated, None)]
    #[case(GatewayError::rejected(400_u16, "Email already registered"), ErrorCode::Api, Some(400))]
    #[case(GatewayError::transport("connection refused"), ErrorCode::ServiceUnavailable, None)]
    #[case(GatewayError::decode("missing field `id`"), ErrorCode::InternalError, None)]
    fn gateway_errors_map_to_codes(
        #[case] error: GatewayError,
        #[case] code: ErrorCode,
        #[case] status: Option<u16>,
    ) {
        let mapped = map_gateway_error(error);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.status(), status);
    }

    #[rstest]
    fn rejected_message_is_verbatim() {
        let mapped = map_gateway_error(GatewayError::rejected(400_u16, "Email already registered"));
        assert_eq!(mapped.message(), "Email already registered");
    }
}
