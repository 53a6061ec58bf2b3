//! Error taxonomy surfaced to callers (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or invalid principal")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(String),

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("driver already assigned to another route on this date")]
    DriverAlreadyAssigned,

    #[error("vehicle already assigned to another route on this date")]
    VehicleAlreadyAssigned,

    #[error("port failure: {0}")]
    PortFailure(String),

    #[error("concurrent planning conflict: {0}")]
    Conflict(String),

    #[error("store failure: {0}")]
    Store(String),
}

impl AppError {
    /// The wire-level error code, matching spec.md §7 exactly.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadInput(_) => "BAD_INPUT",
            AppError::DriverAlreadyAssigned => "DRIVER_ALREADY_ASSIGNED",
            AppError::VehicleAlreadyAssigned => "VEHICLE_ALREADY_ASSIGNED",
            AppError::PortFailure(_) => "PORT_FAILURE",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Store(_) => "CONFLICT",
        }
    }
}
