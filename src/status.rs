//! Return codes written by the transport into a request's status slot, and the
//! single table that decides which error a failed submission surfaces as.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    NotFound,
    SearchDone,
    CmpFail,
    ReadOnly,
    UnknownSpace,
    CoordFail,
    ServerError,
    PollFailed,
    Overflow,
    Reconfigure,
    Timeout,
    UnknownAttr,
    DupeAttr,
    NonePending,
    DontUseKey,
    WrongType,
    NoMem,
    BadConfig,
    Exception,
    Zero,
    A,
    B,
    Unknown(i32),
}

const CODES: &[(Status, i32, &str)] = &[
    (Status::Success, 8448, "HYPERCLIENT_SUCCESS"),
    (Status::NotFound, 8449, "HYPERCLIENT_NOTFOUND"),
    (Status::SearchDone, 8450, "HYPERCLIENT_SEARCHDONE"),
    (Status::CmpFail, 8451, "HYPERCLIENT_CMPFAIL"),
    (Status::ReadOnly, 8452, "HYPERCLIENT_READONLY"),
    (Status::UnknownSpace, 8512, "HYPERCLIENT_UNKNOWNSPACE"),
    (Status::CoordFail, 8513, "HYPERCLIENT_COORDFAIL"),
    (Status::ServerError, 8514, "HYPERCLIENT_SERVERERROR"),
    (Status::PollFailed, 8515, "HYPERCLIENT_POLLFAILED"),
    (Status::Overflow, 8516, "HYPERCLIENT_OVERFLOW"),
    (Status::Reconfigure, 8517, "HYPERCLIENT_RECONFIGURE"),
    (Status::Timeout, 8519, "HYPERCLIENT_TIMEOUT"),
    (Status::UnknownAttr, 8520, "HYPERCLIENT_UNKNOWNATTR"),
    (Status::DupeAttr, 8521, "HYPERCLIENT_DUPEATTR"),
    (Status::NonePending, 8523, "HYPERCLIENT_NONEPENDING"),
    (Status::DontUseKey, 8524, "HYPERCLIENT_DONTUSEKEY"),
    (Status::WrongType, 8525, "HYPERCLIENT_WRONGTYPE"),
    (Status::NoMem, 8526, "HYPERCLIENT_NOMEM"),
    (Status::BadConfig, 8527, "HYPERCLIENT_BADCONFIG"),
    (Status::Exception, 8574, "HYPERCLIENT_EXCEPTION"),
    (Status::Zero, 8575, "HYPERCLIENT_ZERO"),
    (Status::A, 8576, "HYPERCLIENT_A"),
    (Status::B, 8577, "HYPERCLIENT_B"),
];

impl Status {
    pub fn from_code(code: i32) -> Status {
        CODES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(status, _, _)| *status)
            .unwrap_or(Status::Unknown(code))
    }
    pub fn code(&self) -> i32 {
        match self {
            Status::Unknown(code) => *code,
            known => CODES
                .iter()
                .find(|(status, _, _)| status == known)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }
    pub fn name(&self) -> &'static str {
        CODES
            .iter()
            .find(|(status, _, _)| status == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("HYPERCLIENT_UNKNOWN")
    }
    /// Which error a rejected submission with this status is reported as.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Status::UnknownAttr | Status::DupeAttr | Status::DontUseKey => FailureClass::Value,
            Status::WrongType => FailureClass::Type,
            Status::NoMem => FailureClass::Memory,
            _ => FailureClass::Exception,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Unknown(code) => write!(f, "HYPERCLIENT_UNKNOWN({})", code),
            known => write!(f, "{}", known.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// malformed or empty constraint set
    Value,
    /// attribute type does not match the space's schema
    Type,
    Memory,
    /// anything else, reported with the raw status
    Exception,
}
