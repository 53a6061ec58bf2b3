//! Core domain model: entities, enums, and the invariants spec.md §3 pins to them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type Id = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Infant,
    Toddler,
    Preschool,
    OutOfSchoolCare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    InfantCertified,
    ToddlerTrained,
    SpecialNeeds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    InfantSeat,
    ToddlerSeat,
    BoosterSeat,
    WheelchairLift,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopType {
    Pickup,
    Dropoff,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Pending,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Planning,
    Assigned,
    InProgress,
    Completed,
}

/// Coordinates in WGS-84 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Child {
    pub id: Id,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub category: Category,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Driver {
    pub id: Id,
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Vehicle {
    pub id: Id,
    pub name: String,
    pub capacity: u32,
    pub equipment: BTreeSet<Equipment>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Stop {
    pub id: Id,
    pub sequence: u32,
    pub kind: StopType,
    pub status: StopStatus,
    pub child_id: Id,
    pub route_id: Id,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Route {
    pub id: Id,
    pub name: String,
    /// ISO calendar date, `YYYY-MM-DD`, treated as an opaque key.
    pub date: String,
    pub status: RouteStatus,
    pub driver_id: Option<Id>,
    pub vehicle_id: Option<Id>,
    pub stops: Vec<Stop>,
}

impl Route {
    pub fn new_planning(id: Id, name: String, date: String) -> Self {
        Route {
            id,
            name,
            date,
            status: RouteStatus::Planning,
            driver_id: None,
            vehicle_id: None,
            stops: Vec::new(),
        }
    }
}

/// The authenticated caller, supplied per request. Authentication itself
/// (token issuance/validation) is out of scope; the core only authorizes
/// against whatever principal it is handed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Principal {
    Admin,
    Driver(Id),
}

impl Category {
    /// Required driver capabilities for this category (possibly empty).
    pub fn required_capabilities(self) -> &'static [Capability] {
        match self {
            Category::Infant => &[Capability::InfantCertified],
            Category::Toddler => &[Capability::ToddlerTrained],
            Category::Preschool | Category::OutOfSchoolCare => &[],
        }
    }

    /// Required vehicle equipment for this category (possibly empty).
    pub fn required_equipment(self) -> &'static [Equipment] {
        match self {
            Category::Infant => &[Equipment::InfantSeat],
            Category::Toddler => &[Equipment::ToddlerSeat],
            Category::Preschool | Category::OutOfSchoolCare => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Infant => "Infant",
            Category::Toddler => "Toddler",
            Category::Preschool => "Preschool",
            Category::OutOfSchoolCare => "OutOfSchoolCare",
        }
    }
}
