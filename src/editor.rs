//! Manual editor (C7, spec.md §4.6): transactional mutations a dispatcher
//! applies directly to persisted routes.

use uuid::Uuid;

use crate::domain::{Route, RouteStatus, Stop, StopStatus, StopType};
use crate::errors::AppError;
use crate::ports::{with_transaction, Store, StoreTx};

pub async fn create_manual_route<S: Store + ?Sized>(
    store: &S,
    name: String,
    date: String,
) -> Result<Route, AppError> {
    with_transaction(store, move |tx| {
        Box::pin(async move {
            let route = Route::new_planning(Uuid::new_v4().to_string(), name, date);
            tx.insert_route(route).await
        })
    })
    .await
}

pub async fn delete_route<S: Store + ?Sized>(store: &S, route_id: &str) -> Result<bool, AppError> {
    let route_id = route_id.to_string();
    with_transaction(store, move |tx| Box::pin(async move { tx.delete_route(&route_id).await })).await
}

/// Appends a new Pickup/Pending stop. Fails `NOT_FOUND` if the route or
/// child is missing, `BAD_INPUT` if the child already has a stop on this
/// route (resolving spec.md §9 open question (i): duplicates are rejected,
/// not silently allowed).
pub async fn add_stop_to_route<S: Store + ?Sized>(
    store: &S,
    route_id: &str,
    child_id: &str,
) -> Result<Route, AppError> {
    let route_id = route_id.to_string();
    let child_id = child_id.to_string();

    with_transaction(store, move |tx| {
        let route_id = route_id.clone();
        let child_id = child_id.clone();
        Box::pin(async move {
            let mut route = tx
                .load_route(&route_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("route {route_id}")))?;

            tx.load_child(&child_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("child {child_id}")))?;

            if route.stops.iter().any(|s| s.child_id == child_id) {
                return Err(AppError::BadInput(format!(
                    "child {child_id} already has a stop on route {route_id}"
                )));
            }

            let stop = Stop {
                id: Uuid::new_v4().to_string(),
                sequence: route.stops.len() as u32 + 1,
                kind: StopType::Pickup,
                status: StopStatus::Pending,
                child_id: child_id.clone(),
                route_id: route_id.clone(),
            };
            route.stops.push(stop);

            tx.replace_stops(&route_id, route.stops.clone()).await?;
            Ok(route)
        })
    })
    .await
}

/// Deletes the stop, then densifies the owning route's sequences to
/// `1..N'` in ascending order of the surviving stops' prior sequence
/// values (spec.md invariant (a)).
pub async fn remove_stop_from_route<S: Store + ?Sized>(store: &S, stop_id: &str) -> Result<Route, AppError> {
    let stop_id = stop_id.to_string();

    with_transaction(store, move |tx| {
        let stop_id = stop_id.clone();
        Box::pin(async move {
            let routes = tx.load_routes().await?;
            let route_id = routes
                .iter()
                .find(|r| r.stops.iter().any(|s| s.id == stop_id))
                .map(|r| r.id.clone())
                .ok_or_else(|| AppError::NotFound(format!("stop {stop_id}")))?;

            let mut route = tx.load_route(&route_id).await?.expect("just located by id");

            route.stops.sort_by_key(|s| s.sequence);
            route.stops.retain(|s| s.id != stop_id);
            for (i, stop) in route.stops.iter_mut().enumerate() {
                stop.sequence = (i + 1) as u32;
            }

            tx.replace_stops(&route_id, route.stops.clone()).await?;
            Ok(route)
        })
    })
    .await
}

/// Overwrites sequences to `index+1` following the provided order.
/// `stop_ids` must be exactly a permutation of the route's current stop
/// ids; any mismatch is `BAD_INPUT` (spec.md §9 open question (ii)).
pub async fn reorder_stops<S: Store + ?Sized>(
    store: &S,
    route_id: &str,
    stop_ids: Vec<String>,
) -> Result<Route, AppError> {
    let route_id = route_id.to_string();

    if stop_ids.is_empty() {
        return Err(AppError::BadInput("stopIds must not be empty".to_string()));
    }

    with_transaction(store, move |tx| {
        let route_id = route_id.clone();
        let stop_ids = stop_ids.clone();
        Box::pin(async move {
            let mut route = tx
                .load_route(&route_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("route {route_id}")))?;

            let mut current_ids: Vec<&str> = route.stops.iter().map(|s| s.id.as_str()).collect();
            current_ids.sort_unstable();
            let mut requested_ids: Vec<&str> = stop_ids.iter().map(|s| s.as_str()).collect();
            requested_ids.sort_unstable();
            if current_ids != requested_ids {
                return Err(AppError::BadInput(
                    "stopIds must be exactly a permutation of the route's current stops".to_string(),
                ));
            }

            for (index, stop_id) in stop_ids.iter().enumerate() {
                if let Some(stop) = route.stops.iter_mut().find(|s| &s.id == stop_id) {
                    stop.sequence = (index + 1) as u32;
                }
            }
            route.stops.sort_by_key(|s| s.sequence);

            tx.replace_stops(&route_id, route.stops.clone()).await?;
            Ok(route)
        })
    })
    .await
}

/// Sets driver+vehicle on the route and transitions status
/// Planning→Assigned, after checking the date-level cross-route conflicts
/// of spec.md invariants (d) and (e).
pub async fn assign_driver_and_vehicle<S: Store + ?Sized>(
    store: &S,
    route_id: &str,
    driver_id: &str,
    vehicle_id: &str,
) -> Result<Route, AppError> {
    let route_id = route_id.to_string();
    let driver_id = driver_id.to_string();
    let vehicle_id = vehicle_id.to_string();

    with_transaction(store, move |tx| {
        let route_id = route_id.clone();
        let driver_id = driver_id.clone();
        let vehicle_id = vehicle_id.clone();
        Box::pin(async move {
            let route = tx
                .load_route(&route_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("route {route_id}")))?;
            tx.load_driver(&driver_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("driver {driver_id}")))?;
            tx.load_vehicle(&vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("vehicle {vehicle_id}")))?;

            let same_date_routes = tx.load_routes_for_date(&route.date).await?;
            for other in &same_date_routes {
                if other.id == route_id {
                    continue;
                }
                if other.driver_id.as_deref() == Some(driver_id.as_str()) {
                    return Err(AppError::DriverAlreadyAssigned);
                }
                if other.vehicle_id.as_deref() == Some(vehicle_id.as_str()) {
                    return Err(AppError::VehicleAlreadyAssigned);
                }
            }

            tx.update_route_assignment(
                &route_id,
                Some(driver_id),
                Some(vehicle_id),
                RouteStatus::Assigned,
            )
            .await?;

            tx.load_route(&route_id).await?.ok_or_else(|| AppError::NotFound(format!("route {route_id}")))
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Child, Coordinates, Driver, Vehicle};
    use crate::store::memory::MemoryStore;
    use std::collections::BTreeSet;

    fn child(id: &str) -> Child {
        Child {
            id: id.to_string(),
            name: id.to_string(),
            street: "1 Main St".to_string(),
            city: "Seattle".to_string(),
            state: None,
            coordinates: Some(Coordinates { lat: 47.6, lon: -122.3 }),
            category: Category::Preschool,
        }
    }

    async fn seeded_store(child_ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(
                child_ids.iter().map(|id| child(id)).collect(),
                vec![
                    Driver { id: "d1".to_string(), name: "D1".to_string(), capabilities: BTreeSet::new() },
                    Driver { id: "d2".to_string(), name: "D2".to_string(), capabilities: BTreeSet::new() },
                ],
                vec![
                    Vehicle { id: "v1".to_string(), name: "V1".to_string(), capacity: 4, equipment: BTreeSet::new() },
                    Vehicle { id: "v2".to_string(), name: "V2".to_string(), capacity: 4, equipment: BTreeSet::new() },
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn manual_editing_invariants_hold_through_add_remove_reorder() {
        let store = seeded_store(&["c1", "c2", "c3"]).await;
        let route = create_manual_route(&store, "Manual Route".to_string(), "2025-02-01".to_string())
            .await
            .unwrap();

        let route = add_stop_to_route(&store, &route.id, "c1").await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c2").await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c3").await.unwrap();
        assert_eq!(route.stops.iter().map(|s| s.sequence).collect::<Vec<_>>(), vec![1, 2, 3]);

        let stop_c2 = route.stops.iter().find(|s| s.child_id == "c2").unwrap().id.clone();
        let route = remove_stop_from_route(&store, &stop_c2).await.unwrap();
        assert_eq!(route.stops.len(), 2);
        assert_eq!(route.stops.iter().map(|s| s.sequence).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            route.stops.iter().map(|s| s.child_id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c3"]
        );

        let stop_c1 = route.stops.iter().find(|s| s.child_id == "c1").unwrap().id.clone();
        let stop_c3 = route.stops.iter().find(|s| s.child_id == "c3").unwrap().id.clone();
        let route = reorder_stops(&store, &route.id, vec![stop_c3.clone(), stop_c1.clone()]).await.unwrap();
        assert_eq!(
            route.stops.iter().map(|s| s.child_id.as_str()).collect::<Vec<_>>(),
            vec!["c3", "c1"]
        );
    }

    #[tokio::test]
    async fn adding_duplicate_child_is_rejected() {
        let store = seeded_store(&["c1"]).await;
        let route = create_manual_route(&store, "R".to_string(), "2025-02-01".to_string()).await.unwrap();
        add_stop_to_route(&store, &route.id, "c1").await.unwrap();
        let result = add_stop_to_route(&store, &route.id, "c1").await;
        assert!(matches!(result, Err(AppError::BadInput(_))));
    }

    #[tokio::test]
    async fn reorder_with_partial_stop_set_is_bad_input() {
        let store = seeded_store(&["c1", "c2"]).await;
        let route = create_manual_route(&store, "R".to_string(), "2025-02-01".to_string()).await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c1").await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c2").await.unwrap();

        let stop_c1 = route.stops.iter().find(|s| s.child_id == "c1").unwrap().id.clone();
        let result = reorder_stops(&store, &route.id, vec![stop_c1]).await;
        assert!(matches!(result, Err(AppError::BadInput(_))));
    }

    #[tokio::test]
    async fn reorder_is_a_no_op_when_given_current_order() {
        let store = seeded_store(&["c1", "c2"]).await;
        let route = create_manual_route(&store, "R".to_string(), "2025-02-01".to_string()).await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c1").await.unwrap();
        let route = add_stop_to_route(&store, &route.id, "c2").await.unwrap();

        let ids: Vec<String> = route.stops.iter().map(|s| s.id.clone()).collect();
        let reordered = reorder_stops(&store, &route.id, ids).await.unwrap();
        assert_eq!(
            reordered.stops.iter().map(|s| s.sequence).collect::<Vec<_>>(),
            route.stops.iter().map(|s| s.sequence).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn assignment_conflicts_are_detected_per_date() {
        let store = seeded_store(&["c1"]).await;
        let r1 = create_manual_route(&store, "R1".to_string(), "2025-03-01".to_string()).await.unwrap();
        let r2 = create_manual_route(&store, "R2".to_string(), "2025-03-01".to_string()).await.unwrap();

        let r1 = assign_driver_and_vehicle(&store, &r1.id, "d1", "v1").await.unwrap();
        assert_eq!(r1.status, RouteStatus::Assigned);

        let driver_conflict = assign_driver_and_vehicle(&store, &r2.id, "d1", "v2").await;
        assert!(matches!(driver_conflict, Err(AppError::DriverAlreadyAssigned)));

        let vehicle_conflict = assign_driver_and_vehicle(&store, &r2.id, "d2", "v1").await;
        assert!(matches!(vehicle_conflict, Err(AppError::VehicleAlreadyAssigned)));
    }

    #[tokio::test]
    async fn removing_all_added_stops_leaves_zero_stops() {
        let store = seeded_store(&["c1", "c2", "c3"]).await;
        let route = create_manual_route(&store, "R".to_string(), "2025-02-01".to_string()).await.unwrap();
        let mut route = route;
        for id in ["c1", "c2", "c3"] {
            route = add_stop_to_route(&store, &route.id, id).await.unwrap();
        }

        while let Some(stop) = route.stops.first().cloned() {
            route = remove_stop_from_route(&store, &stop.id).await.unwrap();
            let sequences: Vec<u32> = route.stops.iter().map(|s| s.sequence).collect();
            assert_eq!(sequences, (1..=sequences.len() as u32).collect::<Vec<_>>());
        }

        assert!(route.stops.is_empty());
    }
}
