use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A read ran past the end of the available bytes.
    Truncated,
    /// An AVP's payload length did not match what its declared type requires.
    BadLength(String),
    /// A UTF8String AVP's payload was not valid UTF-8.
    BadUtf8(std::str::Utf8Error),
    /// An Address AVP's payload did not match its declared address family.
    BadAddress(String),
    /// A nested AVP inside a Grouped AVP was malformed.
    BadGrouped(String),
    /// A dictionary factory was asked to build an AVP code it does not declare.
    UnknownAvp(u32),
    /// Dictionary has no entry for a decoded AVP code (kept for diagnostics).
    UnknownAvpCode(u32),
    /// A typed value did not match the shape the encoder expected.
    EncodeTypeMismatch(String),
    /// A required AVP was missing when emitting a typed message.
    MissingAvp(&'static str),
    /// A decoded AVP value failed a type-specific validity check.
    InvalidAvpValue(String),
    /// Diameter version was not 1, or a message/AVP length was out of range.
    BadFraming(String),
    /// The node has no application registered for a message's application-id.
    UnknownApplication(u32),
    /// An outbound request's deadline elapsed with no matching answer.
    Timeout,
    /// The peer a request was sent on disconnected before an answer arrived.
    PeerGone,
    DecodeError(String),
    EncodeError(String),
    ClientError(String),
    ServerError(String),
    IoError(std::io::Error),
    TryFromSliceError(std::array::TryFromSliceError),
    AddrParseError(std::net::AddrParseError),
    TlsError(native_tls::Error),
}

/// Why a peer connection was closed (RFC 6733 §5.6's transitions into
/// `Closing`). Recorded alongside the final [`crate::peer::PeerState`] so a
/// caller can tell a clean shutdown from a protocol or transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer's CER/CEA did not establish a common application.
    CerRejected,
    /// We initiated a connection but capabilities exchange never completed.
    FailedConnectCE,
    /// A read or write failed, or the stream closed abnormally.
    SocketFail,
    /// DPR/DPA completed, or the peer closed the stream after an answer.
    CleanDisconnect,
    /// No DWA arrived for an outstanding DWR within the watchdog timeout.
    DwaTimeout,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "buffer truncated"),
            Error::BadLength(msg) => write!(f, "bad AVP length: {}", msg),
            Error::BadUtf8(e) => write!(f, "invalid utf-8: {}", e),
            Error::BadAddress(msg) => write!(f, "bad address AVP: {}", msg),
            Error::BadGrouped(msg) => write!(f, "bad grouped AVP: {}", msg),
            Error::UnknownAvp(code) => write!(f, "unknown AVP code in dictionary: {}", code),
            Error::UnknownAvpCode(code) => write!(f, "unknown AVP code: {}", code),
            Error::EncodeTypeMismatch(msg) => write!(f, "encode type mismatch: {}", msg),
            Error::MissingAvp(name) => write!(f, "missing required AVP: {}", name),
            Error::InvalidAvpValue(msg) => write!(f, "invalid AVP value: {}", msg),
            Error::BadFraming(msg) => write!(f, "framing error: {}", msg),
            Error::UnknownApplication(id) => write!(f, "no application registered for id {}", id),
            Error::Timeout => write!(f, "request timed out"),
            Error::PeerGone => write!(f, "peer disconnected while awaiting answer"),
            Error::DecodeError(msg) => write!(f, "{}", msg),
            Error::EncodeError(msg) => write!(f, "{}", msg),
            Error::ClientError(msg) => write!(f, "{}", msg),
            Error::ServerError(msg) => write!(f, "{}", msg),
            Error::IoError(e) => write!(f, "{}", e),
            Error::TryFromSliceError(e) => write!(f, "{}", e),
            Error::AddrParseError(e) => write!(f, "{}", e),
            Error::TlsError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(err: std::array::TryFromSliceError) -> Error {
        Error::TryFromSliceError(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Error {
        Error::BadUtf8(err)
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Error {
        Error::AddrParseError(err)
    }
}

impl From<native_tls::Error> for Error {
    fn from(err: native_tls::Error) -> Error {
        Error::TlsError(err)
    }
}
