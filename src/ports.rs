//! Pluggable collaborators (spec.md §4.7). The core depends only on these
//! traits; concrete geocoding, driving-time, and persistence backends are
//! external collaborators supplied by the binary that wires the service up.

use async_trait::async_trait;

use crate::domain::{Coordinates, Route, RouteStatus, Stop};
use crate::errors::AppError;

/// Best-effort address → coordinates lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, AppError>;
}

/// Pairwise driving-time estimation between coordinates, in seconds.
///
/// Callers (C5) must tolerate this port being unavailable or failing and
/// fall back to great-circle estimation; `matrix` itself only reports a
/// hard failure, it does not implement the fallback.
#[async_trait]
pub trait TimeMatrixProvider: Send + Sync {
    async fn matrix(&self, locations: &[Coordinates]) -> Result<Vec<Vec<u32>>, AppError>;
}

/// Source of the "today" reference for `getMyAssignedRoute`.
pub trait Clock: Send + Sync {
    fn today(&self) -> String;
}

/// A transactional handle into the persistence layer, alive only for the
/// duration of one `Store::begin`/`commit`/`rollback` cycle.
#[async_trait]
pub trait StoreTx: Send {
    async fn load_children(&mut self) -> Result<Vec<crate::domain::Child>, AppError>;
    async fn load_drivers(&mut self) -> Result<Vec<crate::domain::Driver>, AppError>;
    async fn load_vehicles(&mut self) -> Result<Vec<crate::domain::Vehicle>, AppError>;
    async fn load_routes_for_date(&mut self, date: &str) -> Result<Vec<Route>, AppError>;
    async fn load_route(&mut self, route_id: &str) -> Result<Option<Route>, AppError>;
    async fn load_child(&mut self, child_id: &str) -> Result<Option<crate::domain::Child>, AppError>;
    async fn load_driver(&mut self, driver_id: &str) -> Result<Option<crate::domain::Driver>, AppError>;
    async fn load_vehicle(&mut self, vehicle_id: &str) -> Result<Option<crate::domain::Vehicle>, AppError>;
    async fn load_routes(&mut self) -> Result<Vec<Route>, AppError>;

    /// Deletes every stop belonging to a route with this date, then every
    /// route with this date (spec.md §4.5 step 1).
    async fn wipe_routes_for_date(&mut self, date: &str) -> Result<(), AppError>;

    async fn insert_route(&mut self, route: Route) -> Result<Route, AppError>;
    async fn delete_route(&mut self, route_id: &str) -> Result<bool, AppError>;
    async fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<(), AppError>;
    async fn update_route_assignment(
        &mut self,
        route_id: &str,
        driver_id: Option<String>,
        vehicle_id: Option<String>,
        status: RouteStatus,
    ) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

/// Transactional repository. Implementors provide typed entity queries,
/// inserts, updates, deletes, and a begin/commit/rollback transaction handle.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError>;
}

/// Runs `f` inside one transaction, committing on `Ok` and rolling back on
/// `Err` — the `withTransaction(f)` contract of spec.md §4.7.
pub async fn with_transaction<S, F, Fut, T>(store: &S, f: F) -> Result<T, AppError>
where
    S: Store + ?Sized,
    F: FnOnce(&mut dyn StoreTx) -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut tx = store.begin().await?;
    match f(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            // Best-effort rollback; the originating error is what's reported.
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}
