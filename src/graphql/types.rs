//! GraphQL-facing wrapper types. Field and enum wire values match spec.md
//! §6 exactly, since "the exact field names are part of the external
//! contract because clients depend on them."

use async_graphql::{Enum, SimpleObject};

use crate::domain;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum Category {
    #[graphql(name = "infant")]
    Infant,
    #[graphql(name = "toddler")]
    Toddler,
    #[graphql(name = "preschool")]
    Preschool,
    #[graphql(name = "out_of_school_care")]
    OutOfSchoolCare,
}

impl From<domain::Category> for Category {
    fn from(c: domain::Category) -> Self {
        match c {
            domain::Category::Infant => Category::Infant,
            domain::Category::Toddler => Category::Toddler,
            domain::Category::Preschool => Category::Preschool,
            domain::Category::OutOfSchoolCare => Category::OutOfSchoolCare,
        }
    }
}

impl From<Category> for domain::Category {
    fn from(c: Category) -> Self {
        match c {
            Category::Infant => domain::Category::Infant,
            Category::Toddler => domain::Category::Toddler,
            Category::Preschool => domain::Category::Preschool,
            Category::OutOfSchoolCare => domain::Category::OutOfSchoolCare,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum Capability {
    #[graphql(name = "infant_certified")]
    InfantCertified,
    #[graphql(name = "toddler_trained")]
    ToddlerTrained,
    #[graphql(name = "special_needs")]
    SpecialNeeds,
}

impl From<domain::Capability> for Capability {
    fn from(c: domain::Capability) -> Self {
        match c {
            domain::Capability::InfantCertified => Capability::InfantCertified,
            domain::Capability::ToddlerTrained => Capability::ToddlerTrained,
            domain::Capability::SpecialNeeds => Capability::SpecialNeeds,
        }
    }
}

impl From<Capability> for domain::Capability {
    fn from(c: Capability) -> Self {
        match c {
            Capability::InfantCertified => domain::Capability::InfantCertified,
            Capability::ToddlerTrained => domain::Capability::ToddlerTrained,
            Capability::SpecialNeeds => domain::Capability::SpecialNeeds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum Equipment {
    #[graphql(name = "infant_seat")]
    InfantSeat,
    #[graphql(name = "toddler_seat")]
    ToddlerSeat,
    #[graphql(name = "booster_seat")]
    BoosterSeat,
    #[graphql(name = "wheelchair_lift")]
    WheelchairLift,
}

impl From<domain::Equipment> for Equipment {
    fn from(e: domain::Equipment) -> Self {
        match e {
            domain::Equipment::InfantSeat => Equipment::InfantSeat,
            domain::Equipment::ToddlerSeat => Equipment::ToddlerSeat,
            domain::Equipment::BoosterSeat => Equipment::BoosterSeat,
            domain::Equipment::WheelchairLift => Equipment::WheelchairLift,
        }
    }
}

impl From<Equipment> for domain::Equipment {
    fn from(e: Equipment) -> Self {
        match e {
            Equipment::InfantSeat => domain::Equipment::InfantSeat,
            Equipment::ToddlerSeat => domain::Equipment::ToddlerSeat,
            Equipment::BoosterSeat => domain::Equipment::BoosterSeat,
            Equipment::WheelchairLift => domain::Equipment::WheelchairLift,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum StopType {
    #[graphql(name = "pickup")]
    Pickup,
    #[graphql(name = "dropoff")]
    Dropoff,
}

impl From<domain::StopType> for StopType {
    fn from(t: domain::StopType) -> Self {
        match t {
            domain::StopType::Pickup => StopType::Pickup,
            domain::StopType::Dropoff => StopType::Dropoff,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum StopStatus {
    #[graphql(name = "pending")]
    Pending,
    #[graphql(name = "completed")]
    Completed,
}

impl From<domain::StopStatus> for StopStatus {
    fn from(s: domain::StopStatus) -> Self {
        match s {
            domain::StopStatus::Pending => StopStatus::Pending,
            domain::StopStatus::Completed => StopStatus::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum RouteStatus {
    #[graphql(name = "planning")]
    Planning,
    #[graphql(name = "assigned")]
    Assigned,
    #[graphql(name = "in_progress")]
    InProgress,
    #[graphql(name = "completed")]
    Completed,
}

impl From<domain::RouteStatus> for RouteStatus {
    fn from(s: domain::RouteStatus) -> Self {
        match s {
            domain::RouteStatus::Planning => RouteStatus::Planning,
            domain::RouteStatus::Assigned => RouteStatus::Assigned,
            domain::RouteStatus::InProgress => RouteStatus::InProgress,
            domain::RouteStatus::Completed => RouteStatus::Completed,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<domain::Coordinates> for Coordinates {
    fn from(c: domain::Coordinates) -> Self {
        Coordinates { lat: c.lat, lon: c.lon }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Child {
    pub id: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub category: Category,
}

impl From<domain::Child> for Child {
    fn from(c: domain::Child) -> Self {
        Child {
            id: c.id,
            name: c.name,
            street: c.street,
            city: c.city,
            state: c.state,
            lat: c.coordinates.map(|co| co.lat),
            lon: c.coordinates.map(|co| co.lon),
            category: c.category.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<Capability>,
}

impl From<domain::Driver> for Driver {
    fn from(d: domain::Driver) -> Self {
        Driver { id: d.id, name: d.name, capabilities: d.capabilities.into_iter().map(Into::into).collect() }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub equipment: Vec<Equipment>,
}

impl From<domain::Vehicle> for Vehicle {
    fn from(v: domain::Vehicle) -> Self {
        Vehicle {
            id: v.id,
            name: v.name,
            capacity: v.capacity as i32,
            equipment: v.equipment.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Stop {
    pub id: String,
    pub sequence: i32,
    #[graphql(name = "type")]
    pub kind: StopType,
    pub status: StopStatus,
    pub child_id: String,
    pub route_id: String,
}

impl From<domain::Stop> for Stop {
    fn from(s: domain::Stop) -> Self {
        Stop {
            id: s.id,
            sequence: s.sequence as i32,
            kind: s.kind.into(),
            status: s.status.into(),
            child_id: s.child_id,
            route_id: s.route_id,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub date: String,
    pub status: RouteStatus,
    pub driver_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub stops: Vec<Stop>,
}

impl From<domain::Route> for Route {
    fn from(r: domain::Route) -> Self {
        Route {
            id: r.id,
            name: r.name,
            date: r.date,
            status: r.status.into(),
            driver_id: r.driver_id,
            vehicle_id: r.vehicle_id,
            stops: r.stops.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct UnroutableChild {
    pub child: Child,
    pub reason: String,
}

impl From<crate::planner::UnroutableChild> for UnroutableChild {
    fn from(u: crate::planner::UnroutableChild) -> Self {
        UnroutableChild { child: u.child.into(), reason: u.reason }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PlanningResult {
    pub generated_routes: Vec<Route>,
    pub unroutable_children: Vec<UnroutableChild>,
}

impl From<crate::planner::PlanningResult> for PlanningResult {
    fn from(p: crate::planner::PlanningResult) -> Self {
        PlanningResult {
            generated_routes: p.generated_routes.into_iter().map(Into::into).collect(),
            unroutable_children: p.unroutable_children.into_iter().map(Into::into).collect(),
        }
    }
}
