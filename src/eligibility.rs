//! Eligibility matcher (C2, spec.md §4.1).

use std::collections::HashMap;

use crate::domain::{Child, Driver, Id, Vehicle};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransportOption {
    pub driver_id: Id,
    pub vehicle_id: Id,
}

pub type EligibilityMap = HashMap<Id, Vec<TransportOption>>;

/// For each child, enumerates the (driver, vehicle) pairs that satisfy its
/// category's capability and equipment requirements. The candidate set is
/// the full cartesian product of drivers and vehicles; no pre-pairing.
pub fn match_eligibility(children: &[Child], drivers: &[Driver], vehicles: &[Vehicle]) -> EligibilityMap {
    let mut map = EligibilityMap::new();
    for child in children {
        let required_caps = child.category.required_capabilities();
        let required_equip = child.category.required_equipment();

        let mut options = Vec::new();
        for driver in drivers {
            if !required_caps.iter().all(|c| driver.capabilities.contains(c)) {
                continue;
            }
            for vehicle in vehicles {
                if !required_equip.iter().all(|e| vehicle.equipment.contains(e)) {
                    continue;
                }
                options.push(TransportOption {
                    driver_id: driver.id.clone(),
                    vehicle_id: vehicle.id.clone(),
                });
            }
        }

        if options.is_empty() {
            tracing::warn!(child_id = %child.id, "child has no eligible transport option");
        }

        map.insert(child.id.clone(), options);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Capability, Category, Coordinates, Equipment};
    use std::collections::BTreeSet;

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

    fn driver(id: &str, caps: &[Capability]) -> Driver {
        Driver {
            id: id.to_string(),
            name: id.to_string(),
            capabilities: caps.iter().copied().collect(),
        }
    }

    fn vehicle(id: &str, equip: &[Equipment]) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            name: id.to_string(),
            capacity: 10,
            equipment: equip.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn infant_requires_certification_and_seat() {
        let children = vec![child("c1", Category::Infant)];
        let drivers = vec![
            driver("d1", &[]),
            driver("d2", &[Capability::InfantCertified]),
        ];
        let vehicles = vec![vehicle("v1", &[]), vehicle("v2", &[Equipment::InfantSeat])];

        let map = match_eligibility(&children, &drivers, &vehicles);
        let options = &map["c1"];
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].driver_id, "d2");
        assert_eq!(options[0].vehicle_id, "v2");
    }

    #[test]
    fn preschool_has_no_requirements() {
        let children = vec![child("c1", Category::Preschool)];
        let drivers = vec![driver("d1", &[])];
        let vehicles = vec![vehicle("v1", &[])];

        let map = match_eligibility(&children, &drivers, &vehicles);
        assert_eq!(map["c1"].len(), 1);
    }

    #[test]
    fn empty_eligible_set_when_no_match() {
        let children = vec![child("c1", Category::Toddler)];
        let drivers = vec![driver("d1", &[])];
        let vehicles = vec![vehicle("v1", &[])];

        let map = match_eligibility(&children, &drivers, &vehicles);
        assert!(map["c1"].is_empty());
    }
}
