//! Compatibility partitioner (C3, spec.md §4.2).

use crate::domain::Child;
use crate::eligibility::EligibilityMap;

#[derive(Clone, Debug)]
pub struct Workload {
    /// Sorted-and-joined list of eligible driver ids; order-independent,
    /// deterministic value-identity for the workload.
    pub key: String,
    pub children: Vec<Child>,
    pub label: String,
}

/// Groups children sharing an identical eligible-driver-set into workloads.
/// Children with an empty eligible set are excluded (already flagged
/// unroutable by the caller).
pub fn partition(children: &[Child], eligibility: &EligibilityMap) -> Vec<Workload> {
    let mut keyed: Vec<(String, Child)> = Vec::new();

    for child in children {
        let options = match eligibility.get(&child.id) {
            Some(opts) if !opts.is_empty() => opts,
            _ => continue,
        };

        let mut driver_ids: Vec<&str> = options.iter().map(|o| o.driver_id.as_str()).collect();
        driver_ids.sort_unstable();
        driver_ids.dedup();
        let key = driver_ids.join(",");

        keyed.push((key, child.clone()));
    }

    let mut workloads: Vec<Workload> = Vec::new();
    for (key, child) in keyed {
        match workloads.iter_mut().find(|w| w.key == key) {
            Some(workload) => workload.children.push(child),
            None => workloads.push(Workload {
                key,
                children: vec![child],
                label: String::new(),
            }),
        }
    }

    for workload in &mut workloads {
        workload.label = label_for(&workload.children);
    }

    workloads
}

fn label_for(children: &[Child]) -> String {
    let mut categories = children.iter().map(|c| c.category);
    let first = match categories.next() {
        Some(c) => c,
        None => return "Mixed Categories".to_string(),
    };
    if categories.all(|c| c == first) {
        first.label().to_string()
    } else {
        "Mixed Categories".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Coordinates};
    use crate::eligibility::TransportOption;

    fn child(id: &str, category: Category) -> Child {
        Child {
            id: id.to_string(),
            name: id.to_string(),
            street: "1 Main St".to_string(),
            city: "Seattle".to_string(),
            state: None,
            coordinates: Some(Coordinates { lat: 47.6, lon: -122.3 }),
            category,
        }
    }

    #[test]
    fn children_with_identical_driver_sets_share_a_workload() {
        let children = vec![
            child("c1", Category::Preschool),
            child("c2", Category::Preschool),
            child("c3", Category::Infant),
        ];
        let mut eligibility = EligibilityMap::new();
        eligibility.insert(
            "c1".to_string(),
            vec![TransportOption { driver_id: "d1".to_string(), vehicle_id: "v1".to_string() }],
        );
        eligibility.insert(
            "c2".to_string(),
            vec![TransportOption { driver_id: "d1".to_string(), vehicle_id: "v2".to_string() }],
        );
        eligibility.insert(
            "c3".to_string(),
            vec![TransportOption { driver_id: "d2".to_string(), vehicle_id: "v1".to_string() }],
        );

        let workloads = partition(&children, &eligibility);
        assert_eq!(workloads.len(), 2);
        let preschool = workloads.iter().find(|w| w.label == "Preschool").unwrap();
        assert_eq!(preschool.children.len(), 2);
    }

    #[test]
    fn unroutable_children_are_excluded() {
        let children = vec![child("c1", Category::Infant)];
        let mut eligibility = EligibilityMap::new();
        eligibility.insert("c1".to_string(), vec![]);

        let workloads = partition(&children, &eligibility);
        assert!(workloads.is_empty());
    }

    #[test]
    fn mixed_category_workload_gets_mixed_label() {
        let children = vec![child("c1", Category::Preschool), child("c2", Category::OutOfSchoolCare)];
        let mut eligibility = EligibilityMap::new();
        for id in ["c1", "c2"] {
            eligibility.insert(
                id.to_string(),
                vec![TransportOption { driver_id: "d1".to_string(), vehicle_id: "v1".to_string() }],
            );
        }

        let workloads = partition(&children, &eligibility);
        assert_eq!(workloads.len(), 1);
        assert_eq!(workloads[0].label, "Mixed Categories");
    }
}
