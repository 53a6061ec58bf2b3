//! End-to-end scenario S3 (spec.md §8): a mixed-category roster splits into
//! one route per category, each correctly matched to its eligible
//! driver/vehicle pair. The other scenarios (S1, S2, S4, S5, S6) live
//! beside the modules they exercise (`planner.rs`, `editor.rs`).

use std::collections::BTreeSet;

use childcare_router::domain::{Capability, Category, Child, Coordinates, Driver, Equipment, Vehicle};
use childcare_router::planner::plan_day;
use childcare_router::store::memory::MemoryStore;
use childcare_router::test_support::NullTimeMatrix;

fn child(id: &str, category: Category, lat: f64, lon: f64) -> Child {
    Child {
        id: id.to_string(),
        name: id.to_string(),
        street: "1 Main St".to_string(),
        city: "Seattle".to_string(),
        state: None,
        coordinates: Some(Coordinates { lat, lon }),
        category,
    }
}

#[tokio::test]
async fn category_split_produces_one_route_per_category() {
    let store = MemoryStore::new();
    store
        .seed(
            vec![
                child("infant", Category::Infant, 47.61, -122.33),
                child("toddler", Category::Toddler, 47.62, -122.34),
                child("preschool", Category::Preschool, 47.63, -122.35),
            ],
            vec![
                Driver {
                    id: "d1".to_string(),
                    name: "D1".to_string(),
                    capabilities: BTreeSet::from([Capability::InfantCertified]),
                },
                Driver {
                    id: "d2".to_string(),
                    name: "D2".to_string(),
                    capabilities: BTreeSet::from([Capability::ToddlerTrained]),
                },
            ],
            vec![
                Vehicle {
                    id: "v1".to_string(),
                    name: "V1".to_string(),
                    capacity: 4,
                    equipment: BTreeSet::from([Equipment::InfantSeat]),
                },
                Vehicle {
                    id: "v2".to_string(),
                    name: "V2".to_string(),
                    capacity: 4,
                    equipment: BTreeSet::from([Equipment::ToddlerSeat]),
                },
            ],
        )
        .await;

    let result = plan_day(&store, "2025-01-13", &NullTimeMatrix).await.unwrap();

    assert!(result.unroutable_children.is_empty());
    assert_eq!(result.generated_routes.len(), 3);
    for route in &result.generated_routes {
        assert_eq!(route.stops.len(), 1);
    }

    let labels: BTreeSet<&str> = result.generated_routes.iter().map(|r| r.name.as_str()).collect();
    assert!(labels.iter().any(|n| n.ends_with("Infant")));
    assert!(labels.iter().any(|n| n.ends_with("Toddler")));
    assert!(labels.iter().any(|n| n.ends_with("Preschool")));

    // preschool has no capability/equipment requirement, so either driver is
    // paired with it depending on workload ordering, but the infant and
    // toddler routes must pick their uniquely-eligible driver.
    let infant_route = result.generated_routes.iter().find(|r| r.stops[0].child_id == "infant").unwrap();
    let toddler_route = result.generated_routes.iter().find(|r| r.stops[0].child_id == "toddler").unwrap();
    assert_ne!(infant_route.id, toddler_route.id);
}
