//! In-process reference `Store` implementation. Used by every unit and
//! scenario test, and as the default when `DATABASE_URL` is unset.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{Child, Driver, Route, RouteStatus, Stop, Vehicle};
use crate::errors::AppError;
use crate::ports::{Store, StoreTx};

#[derive(Clone, Default)]
struct Db {
    children: Vec<Child>,
    drivers: Vec<Driver>,
    vehicles: Vec<Vehicle>,
    routes: Vec<Route>,
}

pub struct MemoryStore {
    inner: Arc<Mutex<Db>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { inner: Arc::new(Mutex::new(Db::default())) }
    }

    /// Test/fixture helper: replaces the roster wholesale.
    pub async fn seed(&self, children: Vec<Child>, drivers: Vec<Driver>, vehicles: Vec<Vehicle>) {
        let mut db = self.inner.lock().await;
        db.children = children;
        db.drivers = drivers;
        db.vehicles = vehicles;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Db>,
    working: Db,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn load_children(&mut self) -> Result<Vec<Child>, AppError> {
        Ok(self.working.children.clone())
    }

    async fn load_drivers(&mut self) -> Result<Vec<Driver>, AppError> {
        Ok(self.working.drivers.clone())
    }

    async fn load_vehicles(&mut self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.working.vehicles.clone())
    }

    async fn load_routes_for_date(&mut self, date: &str) -> Result<Vec<Route>, AppError> {
        Ok(self.working.routes.iter().filter(|r| r.date == date).cloned().collect())
    }

    async fn load_route(&mut self, route_id: &str) -> Result<Option<Route>, AppError> {
        Ok(self.working.routes.iter().find(|r| r.id == route_id).cloned())
    }

    async fn load_child(&mut self, child_id: &str) -> Result<Option<Child>, AppError> {
        Ok(self.working.children.iter().find(|c| c.id == child_id).cloned())
    }

    async fn load_driver(&mut self, driver_id: &str) -> Result<Option<Driver>, AppError> {
        Ok(self.working.drivers.iter().find(|d| d.id == driver_id).cloned())
    }

    async fn load_vehicle(&mut self, vehicle_id: &str) -> Result<Option<Vehicle>, AppError> {
        Ok(self.working.vehicles.iter().find(|v| v.id == vehicle_id).cloned())
    }

    async fn load_routes(&mut self) -> Result<Vec<Route>, AppError> {
        Ok(self.working.routes.clone())
    }

    async fn wipe_routes_for_date(&mut self, date: &str) -> Result<(), AppError> {
        self.working.routes.retain(|r| r.date != date);
        Ok(())
    }

    async fn insert_route(&mut self, route: Route) -> Result<Route, AppError> {
        self.working.routes.push(route.clone());
        Ok(route)
    }

    async fn delete_route(&mut self, route_id: &str) -> Result<bool, AppError> {
        let before = self.working.routes.len();
        self.working.routes.retain(|r| r.id != route_id);
        Ok(self.working.routes.len() != before)
    }

    async fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<(), AppError> {
        let route = self
            .working
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| AppError::NotFound(format!("route {route_id}")))?;
        route.stops = stops;
        Ok(())
    }

    async fn update_route_assignment(
        &mut self,
        route_id: &str,
        driver_id: Option<String>,
        vehicle_id: Option<String>,
        status: RouteStatus,
    ) -> Result<(), AppError> {
        let route = self
            .working
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| AppError::NotFound(format!("route {route_id}")))?;
        route.driver_id = driver_id;
        route.vehicle_id = vehicle_id;
        route.status = status;
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::with_transaction;

    #[tokio::test]
    async fn rolled_back_mutations_do_not_persist() {
        let store = MemoryStore::new();
        let result: Result<(), AppError> = with_transaction(&store, |tx| {
            Box::pin(async move {
                tx.insert_route(Route::new_planning(
                    "r1".to_string(),
                    "Route 1".to_string(),
                    "2025-01-01".to_string(),
                ))
                .await?;
                Err(AppError::BadInput("force rollback".to_string()))
            })
        })
        .await;

        assert!(result.is_err());

        let routes = with_transaction(&store, |tx| Box::pin(async move { tx.load_routes().await })).await.unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn committed_mutations_persist() {
        let store = MemoryStore::new();
        with_transaction(&store, |tx| {
            Box::pin(async move {
                tx.insert_route(Route::new_planning(
                    "r1".to_string(),
                    "Route 1".to_string(),
                    "2025-01-01".to_string(),
                ))
                .await
            })
        })
        .await
        .unwrap();

        let routes = with_transaction(&store, |tx| Box::pin(async move { tx.load_routes().await })).await.unwrap();
        assert_eq!(routes.len(), 1);
    }
}
