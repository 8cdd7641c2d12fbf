//! Result-Code AVP (268) values used by the base protocol (RFC 6733 §7.1).

pub const DIAMETER_MULTI_ROUND_AUTH: u32 = 1001;

pub const DIAMETER_SUCCESS: u32 = 2001;
pub const DIAMETER_LIMITED_SUCCESS: u32 = 2002;

pub const DIAMETER_COMMAND_UNSUPPORTED: u32 = 3001;
pub const DIAMETER_UNABLE_TO_DELIVER: u32 = 3002;
pub const DIAMETER_REALM_NOT_SERVED: u32 = 3003;
pub const DIAMETER_TOO_BUSY: u32 = 3004;
pub const DIAMETER_LOOP_DETECTED: u32 = 3005;
pub const DIAMETER_REDIRECT_INDICATION: u32 = 3006;
pub const DIAMETER_APPLICATION_UNSUPPORTED: u32 = 3007;
pub const DIAMETER_INVALID_HDR_BITS: u32 = 3008;
pub const DIAMETER_INVALID_AVP_BITS: u32 = 3009;
pub const DIAMETER_UNKNOWN_PEER: u32 = 3010;

pub const DIAMETER_AUTHENTICATION_REJECTED: u32 = 4001;
pub const DIAMETER_SESSION_EXISTS: u32 = 4002;
pub const ELECTION_LOST: u32 = 4003;

pub const DIAMETER_AVP_UNSUPPORTED: u32 = 5001;
pub const DIAMETER_UNKNOWN_SESSION_ID: u32 = 5002;
pub const DIAMETER_AUTHORIZATION_REJECTED: u32 = 5003;
pub const DIAMETER_INVALID_AVP_VALUE: u32 = 5004;
pub const DIAMETER_MISSING_AVP: u32 = 5005;
pub const DIAMETER_RESOURCES_EXCEEDED: u32 = 5006;
pub const DIAMETER_CONTRADICTING_AVPS: u32 = 5007;
pub const DIAMETER_AVP_NOT_ALLOWED: u32 = 5008;
pub const DIAMETER_AVP_OCCURS_TOO_MANY_TIMES: u32 = 5009;
pub const DIAMETER_NO_COMMON_APPLICATION: u32 = 5010;
pub const DIAMETER_UNSUPPORTED_VERSION: u32 = 5011;
pub const DIAMETER_UNABLE_TO_COMPLY: u32 = 5012;
pub const DIAMETER_INVALID_BIT_IN_HEADER: u32 = 5013;
pub const DIAMETER_INVALID_AVP_LENGTH: u32 = 5014;
pub const DIAMETER_INVALID_MESSAGE_LENGTH: u32 = 5015;
pub const DIAMETER_INVALID_AVP_BIT_COMBO: u32 = 5016;
pub const DIAMETER_NO_COMMON_SECURITY: u32 = 5017;

/// True for 1xxx/2xxx codes: informational or success, never retried.
pub fn is_success(code: u32) -> bool {
    (1000..3000).contains(&code)
}

/// True for 3xxx/4xxx/5xxx codes: protocol, transient, or permanent failure.
pub fn is_error(code: u32) -> bool {
    code >= 3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(is_success(DIAMETER_SUCCESS));
        assert!(!is_error(DIAMETER_SUCCESS));
        assert!(is_error(DIAMETER_UNABLE_TO_COMPLY));
        assert!(!is_success(DIAMETER_UNABLE_TO_COMPLY));
    }
}
