//! `sqlx`/Postgres-backed `Store`, matching the five-table schema of
//! spec.md §6 (`child`, `driver`, `vehicle`, `route`, `stop`). Grounded on
//! the `sqlx::PgPool` pattern in
//! `examples/other_examples/219fae9b_khx02-vrp__src-main.rs.rs`.
//!
//! Queries go through runtime `sqlx::query`/row-by-name extraction, not the
//! `query!`/`query_as!` macros — those need either a live `DATABASE_URL` or
//! a committed `.sqlx/` offline cache at compile time, and this crate ships
//! neither.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::{
    Capability, Category, Child, Coordinates, Driver, Equipment, Route, RouteStatus, Stop, StopStatus, StopType,
    Vehicle,
};
use crate::errors::AppError;
use crate::ports::{Store, StoreTx};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(PostgresStore { pool })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let tx = self.pool.begin().await.map_err(|e| AppError::Store(e.to_string()))?;
        Ok(Box::new(PostgresTx { tx }))
    }
}

struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

/// Reads one column out of a row by name, mapping `sqlx::Error` into the
/// store's own error type so call sites don't repeat the `map_err`.
fn get<'r, T>(row: &'r PgRow, name: &str) -> Result<T, AppError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| AppError::Store(e.to_string()))
}

fn parse_capabilities(raw: &str) -> std::collections::BTreeSet<Capability> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s {
            "infant_certified" => Some(Capability::InfantCertified),
            "toddler_trained" => Some(Capability::ToddlerTrained),
            "special_needs" => Some(Capability::SpecialNeeds),
            _ => None,
        })
        .collect()
}

fn parse_equipment(raw: &str) -> std::collections::BTreeSet<Equipment> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s {
            "infant_seat" => Some(Equipment::InfantSeat),
            "toddler_seat" => Some(Equipment::ToddlerSeat),
            "booster_seat" => Some(Equipment::BoosterSeat),
            "wheelchair_lift" => Some(Equipment::WheelchairLift),
            _ => None,
        })
        .collect()
}

fn category_wire(category: Category) -> &'static str {
    match category {
        Category::Infant => "infant",
        Category::Toddler => "toddler",
        Category::Preschool => "preschool",
        Category::OutOfSchoolCare => "out_of_school_care",
    }
}

fn parse_category(raw: &str) -> Result<Category, AppError> {
    match raw {
        "infant" => Ok(Category::Infant),
        "toddler" => Ok(Category::Toddler),
        "preschool" => Ok(Category::Preschool),
        "out_of_school_care" => Ok(Category::OutOfSchoolCare),
        other => Err(AppError::Store(format!("unknown category {other:?} in storage"))),
    }
}

fn route_status_wire(status: RouteStatus) -> &'static str {
    match status {
        RouteStatus::Planning => "planning",
        RouteStatus::Assigned => "assigned",
        RouteStatus::InProgress => "in_progress",
        RouteStatus::Completed => "completed",
    }
}

fn parse_route_status(raw: &str) -> Result<RouteStatus, AppError> {
    match raw {
        "planning" => Ok(RouteStatus::Planning),
        "assigned" => Ok(RouteStatus::Assigned),
        "in_progress" => Ok(RouteStatus::InProgress),
        "completed" => Ok(RouteStatus::Completed),
        other => Err(AppError::Store(format!("unknown route status {other:?} in storage"))),
    }
}

fn stop_type_wire(kind: StopType) -> &'static str {
    match kind {
        StopType::Pickup => "pickup",
        StopType::Dropoff => "dropoff",
    }
}

fn parse_stop_type(raw: &str) -> Result<StopType, AppError> {
    match raw {
        "pickup" => Ok(StopType::Pickup),
        "dropoff" => Ok(StopType::Dropoff),
        other => Err(AppError::Store(format!("unknown stop type {other:?} in storage"))),
    }
}

fn stop_status_wire(status: StopStatus) -> &'static str {
    match status {
        StopStatus::Pending => "pending",
        StopStatus::Completed => "completed",
    }
}

fn parse_stop_status(raw: &str) -> Result<StopStatus, AppError> {
    match raw {
        "pending" => Ok(StopStatus::Pending),
        "completed" => Ok(StopStatus::Completed),
        other => Err(AppError::Store(format!("unknown stop status {other:?} in storage"))),
    }
}

fn row_to_child(row: &PgRow) -> Result<Child, AppError> {
    let lat: Option<f64> = get(row, "lat")?;
    let lon: Option<f64> = get(row, "lon")?;
    let category: String = get(row, "category")?;
    Ok(Child {
        id: get(row, "id")?,
        name: get(row, "name")?,
        street: get(row, "street")?,
        city: get(row, "city")?,
        state: get(row, "state")?,
        coordinates: match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        },
        category: parse_category(&category)?,
    })
}

fn row_to_driver(row: &PgRow) -> Result<Driver, AppError> {
    let capabilities: String = get(row, "capabilities")?;
    Ok(Driver { id: get(row, "id")?, name: get(row, "name")?, capabilities: parse_capabilities(&capabilities) })
}

fn row_to_vehicle(row: &PgRow) -> Result<Vehicle, AppError> {
    let capacity: i32 = get(row, "capacity")?;
    let equipment: String = get(row, "equipment")?;
    Ok(Vehicle {
        id: get(row, "id")?,
        name: get(row, "name")?,
        capacity: capacity as u32,
        equipment: parse_equipment(&equipment),
    })
}

fn row_to_route_shell(row: &PgRow) -> Result<Route, AppError> {
    let status: String = get(row, "status")?;
    Ok(Route {
        id: get(row, "id")?,
        name: get(row, "name")?,
        date: get(row, "date")?,
        status: parse_route_status(&status)?,
        driver_id: get(row, "driverId")?,
        vehicle_id: get(row, "vehicleId")?,
        stops: Vec::new(),
    })
}

fn row_to_stop(row: &PgRow) -> Result<Stop, AppError> {
    let sequence: i32 = get(row, "sequence")?;
    let kind: String = get(row, "type")?;
    let status: String = get(row, "status")?;
    Ok(Stop {
        id: get(row, "id")?,
        sequence: sequence as u32,
        kind: parse_stop_type(&kind)?,
        status: parse_stop_status(&status)?,
        child_id: get(row, "childId")?,
        route_id: get(row, "routeId")?,
    })
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn load_children(&mut self) -> Result<Vec<Child>, AppError> {
        let rows = sqlx::query(r#"SELECT id, name, street, city, state, lat, lon, category FROM child"#)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.iter().map(row_to_child).collect()
    }

    async fn load_drivers(&mut self) -> Result<Vec<Driver>, AppError> {
        let rows = sqlx::query(r#"SELECT id, name, capabilities FROM driver"#)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.iter().map(row_to_driver).collect()
    }

    async fn load_vehicles(&mut self) -> Result<Vec<Vehicle>, AppError> {
        let rows = sqlx::query(r#"SELECT id, name, capacity, equipment FROM vehicle"#)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.iter().map(row_to_vehicle).collect()
    }

    async fn load_routes_for_date(&mut self, date: &str) -> Result<Vec<Route>, AppError> {
        let route_rows = sqlx::query(
            r#"SELECT id, name, date, status, "driverId", "vehicleId" FROM route WHERE date = $1"#,
        )
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        let mut routes = Vec::with_capacity(route_rows.len());
        for row in &route_rows {
            let mut route = row_to_route_shell(row)?;
            route.stops = self.load_stops_for_route(&route.id).await?;
            routes.push(route);
        }
        Ok(routes)
    }

    async fn load_route(&mut self, route_id: &str) -> Result<Option<Route>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, name, date, status, "driverId", "vehicleId" FROM route WHERE id = $1"#,
        )
        .bind(route_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        let Some(row) = row else { return Ok(None) };
        let mut route = row_to_route_shell(&row)?;
        route.stops = self.load_stops_for_route(&route.id).await?;
        Ok(Some(route))
    }

    async fn load_child(&mut self, child_id: &str) -> Result<Option<Child>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, name, street, city, state, lat, lon, category FROM child WHERE id = $1"#,
        )
        .bind(child_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        row.as_ref().map(row_to_child).transpose()
    }

    async fn load_driver(&mut self, driver_id: &str) -> Result<Option<Driver>, AppError> {
        let row = sqlx::query(r#"SELECT id, name, capabilities FROM driver WHERE id = $1"#)
            .bind(driver_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        row.as_ref().map(row_to_driver).transpose()
    }

    async fn load_vehicle(&mut self, vehicle_id: &str) -> Result<Option<Vehicle>, AppError> {
        let row = sqlx::query(r#"SELECT id, name, capacity, equipment FROM vehicle WHERE id = $1"#)
            .bind(vehicle_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        row.as_ref().map(row_to_vehicle).transpose()
    }

    async fn load_routes(&mut self) -> Result<Vec<Route>, AppError> {
        let route_rows = sqlx::query(r#"SELECT id, name, date, status, "driverId", "vehicleId" FROM route"#)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let mut routes = Vec::with_capacity(route_rows.len());
        for row in &route_rows {
            let mut route = row_to_route_shell(row)?;
            route.stops = self.load_stops_for_route(&route.id).await?;
            routes.push(route);
        }
        Ok(routes)
    }

    async fn wipe_routes_for_date(&mut self, date: &str) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM stop WHERE "routeId" IN (SELECT id FROM route WHERE date = $1)"#)
            .bind(date)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        sqlx::query(r#"DELETE FROM route WHERE date = $1"#)
            .bind(date)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(())
    }

    async fn insert_route(&mut self, route: Route) -> Result<Route, AppError> {
        sqlx::query(
            r#"INSERT INTO route (id, name, date, status, "driverId", "vehicleId")
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&route.id)
        .bind(&route.name)
        .bind(&route.date)
        .bind(route_status_wire(route.status))
        .bind(&route.driver_id)
        .bind(&route.vehicle_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        for stop in &route.stops {
            self.insert_stop(stop).await?;
        }

        Ok(route)
    }

    async fn delete_route(&mut self, route_id: &str) -> Result<bool, AppError> {
        sqlx::query(r#"DELETE FROM stop WHERE "routeId" = $1"#)
            .bind(route_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let result = sqlx::query(r#"DELETE FROM route WHERE id = $1"#)
            .bind(route_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM stop WHERE "routeId" = $1"#)
            .bind(route_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        for stop in &stops {
            self.insert_stop(stop).await?;
        }

        Ok(())
    }

    async fn update_route_assignment(
        &mut self,
        route_id: &str,
        driver_id: Option<String>,
        vehicle_id: Option<String>,
        status: RouteStatus,
    ) -> Result<(), AppError> {
        sqlx::query(r#"UPDATE route SET "driverId" = $1, "vehicleId" = $2, status = $3 WHERE id = $4"#)
            .bind(driver_id)
            .bind(vehicle_id)
            .bind(route_status_wire(status))
            .bind(route_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await.map_err(|e| AppError::Store(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await.map_err(|e| AppError::Store(e.to_string()))
    }
}

impl PostgresTx {
    async fn load_stops_for_route(&mut self, route_id: &str) -> Result<Vec<Stop>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, sequence, type, status, "childId", "routeId"
               FROM stop WHERE "routeId" = $1 ORDER BY sequence ASC"#,
        )
        .bind(route_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        rows.iter().map(row_to_stop).collect()
    }

    async fn insert_stop(&mut self, stop: &Stop) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO stop (id, sequence, type, status, "childId", "routeId")
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&stop.id)
        .bind(stop.sequence as i32)
        .bind(stop_type_wire(stop.kind))
        .bind(stop_status_wire(stop.status))
        .bind(&stop.child_id)
        .bind(&stop.route_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(())
    }
}
