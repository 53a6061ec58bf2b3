//! Plan orchestrator (C6, spec.md §4.5): drives C2→C5 atomically for a date.

use uuid::Uuid;

use crate::cluster;
use crate::config::CONFIG;
use crate::domain::{Category, Child, Route, RouteStatus, Stop, StopStatus, StopType};
use crate::eligibility::{self, EligibilityMap};
use crate::errors::AppError;
use crate::partition;
use crate::ports::{with_transaction, Store, StoreTx, TimeMatrixProvider};
use crate::sequence;

#[derive(Debug, Clone)]
pub struct UnroutableChild {
    pub child: Child,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlanningResult {
    pub generated_routes: Vec<Route>,
    pub unroutable_children: Vec<UnroutableChild>,
}

/// Wipes and rewrites `date`'s planned routes from the current roster. See
/// spec.md §4.5 for the seven-step contract.
pub async fn plan_day<S: Store + ?Sized>(
    store: &S,
    date: &str,
    matrix_provider: &dyn TimeMatrixProvider,
) -> Result<PlanningResult, AppError> {
    let depot = CONFIG.depot;
    let capacity_heuristic = CONFIG.capacity_heuristic;
    let date = date.to_string();

    with_transaction(store, move |tx| {
        let date = date.clone();
        Box::pin(async move {
            tx.wipe_routes_for_date(&date).await?;

            let children = tx.load_children().await?;
            let drivers = tx.load_drivers().await?;
            let vehicles = tx.load_vehicles().await?;

            let eligibility = eligibility::match_eligibility(&children, &drivers, &vehicles);

            let (routable, unroutable): (Vec<Child>, Vec<Child>) = children
                .into_iter()
                .partition(|c| eligibility.get(&c.id).is_some_and(|opts| !opts.is_empty()));

            let unroutable_children = unroutable
                .into_iter()
                .map(|child| {
                    let reason = diagnose_reason(&child, &drivers, &vehicles);
                    UnroutableChild { child, reason }
                })
                .collect();

            let workloads = partition::partition(&routable, &eligibility);

            let mut generated_routes = Vec::new();
            let mut counter = 1u32;

            for workload in &workloads {
                let clusters = cluster::cluster(&workload.children, capacity_heuristic);
                for cluster_children in clusters {
                    let ordered = sequence::order(&cluster_children, depot, matrix_provider).await?;
                    if ordered.is_empty() {
                        continue;
                    }

                    let route_id = Uuid::new_v4().to_string();
                    let name = format!("Route {counter} - {}", workload.label);
                    counter += 1;

                    let mut route = Route::new_planning(route_id.clone(), name, date.clone());
                    route.stops = ordered
                        .iter()
                        .enumerate()
                        .map(|(i, child)| Stop {
                            id: Uuid::new_v4().to_string(),
                            sequence: (i + 1) as u32,
                            kind: StopType::Pickup,
                            status: StopStatus::Pending,
                            child_id: child.id.clone(),
                            route_id: route_id.clone(),
                        })
                        .collect();

                    let inserted = tx.insert_route(route).await?;
                    generated_routes.push(inserted);
                }
            }

            Ok(PlanningResult { generated_routes, unroutable_children })
        })
    })
    .await
}

fn diagnose_reason(
    child: &Child,
    drivers: &[crate::domain::Driver],
    vehicles: &[crate::domain::Vehicle],
) -> String {
    use crate::domain::{Capability, Equipment};

    match child.category {
        Category::Infant => {
            if !drivers.iter().any(|d| d.capabilities.contains(&Capability::InfantCertified)) {
                "No infant-certified driver available".to_string()
            } else if !vehicles.iter().any(|v| v.equipment.contains(&Equipment::InfantSeat)) {
                "No vehicle with infant seat available".to_string()
            } else {
                "No compatible transport available".to_string()
            }
        }
        Category::Toddler => {
            if !vehicles.iter().any(|v| v.equipment.contains(&Equipment::ToddlerSeat)) {
                "No vehicle with toddler seat available".to_string()
            } else {
                "No compatible transport available".to_string()
            }
        }
        Category::Preschool | Category::OutOfSchoolCare => "No compatible transport available".to_string(),
    }
}
