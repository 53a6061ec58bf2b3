//! Test-only fixtures shared across module test suites.

use async_trait::async_trait;

use crate::domain::Coordinates;
use crate::errors::AppError;
use crate::ports::TimeMatrixProvider;

/// A `TimeMatrixProvider` that always fails, exercising C5's great-circle
/// fallback path the way spec.md §4.4 describes it.
pub struct NullTimeMatrix;

#[async_trait]
impl TimeMatrixProvider for NullTimeMatrix {
    async fn matrix(&self, _locations: &[Coordinates]) -> Result<Vec<Vec<u32>>, AppError> {
        Err(AppError::PortFailure("no time matrix provider configured".to_string()))
    }
}
