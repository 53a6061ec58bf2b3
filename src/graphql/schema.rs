//! GraphQL root types (C12, spec.md §6 / SPEC_FULL.md §4.12).

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Result as GraphQLResult, Schema};

use crate::domain::Principal;
use crate::editor;
use crate::errors::AppError;
use crate::planner;
use crate::ports::{Clock, Geocoder, Store, TimeMatrixProvider};

use super::types;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub time_matrix: Arc<dyn TimeMatrixProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub clock: Arc<dyn Clock>,
}

pub type ChildcareSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(state: AppState) -> ChildcareSchema {
    Schema::build(Query, Mutation, EmptySubscription).data(state).finish()
}

fn into_graphql_error(err: AppError) -> async_graphql::Error {
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", err.code()))
}

fn require_admin(ctx: &Context<'_>) -> GraphQLResult<()> {
    match ctx.data::<Principal>() {
        Ok(Principal::Admin) => Ok(()),
        _ => Err(into_graphql_error(AppError::Unauthenticated)),
    }
}

fn require_driver<'a>(ctx: &'a Context<'_>) -> GraphQLResult<&'a str> {
    match ctx.data::<Principal>() {
        Ok(Principal::Driver(id)) => Ok(id.as_str()),
        _ => Err(into_graphql_error(AppError::Unauthenticated)),
    }
}

pub struct Query;

#[Object]
impl Query {
    async fn children(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<types::Child>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let children = tx.load_children().await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(children.into_iter().map(Into::into).collect())
    }

    async fn drivers(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<types::Driver>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let drivers = tx.load_drivers().await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(drivers.into_iter().map(Into::into).collect())
    }

    async fn vehicles(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<types::Vehicle>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let vehicles = tx.load_vehicles().await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(vehicles.into_iter().map(Into::into).collect())
    }

    async fn child(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<types::Child>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let child = tx.load_child(&id).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(child.map(Into::into))
    }

    async fn driver(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<types::Driver>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let driver = tx.load_driver(&id).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(driver.map(Into::into))
    }

    async fn vehicle(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<types::Vehicle>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let vehicle = tx.load_vehicle(&id).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(vehicle.map(Into::into))
    }

    async fn routes(&self, ctx: &Context<'_>, date: String) -> GraphQLResult<Vec<types::Route>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let routes = tx.load_routes_for_date(&date).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(routes.into_iter().map(Into::into).collect())
    }

    async fn route(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<types::Route>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let route = tx.load_route(&id).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;
        Ok(route.map(Into::into))
    }

    async fn geocode_address(&self, ctx: &Context<'_>, address: String) -> GraphQLResult<Option<types::Coordinates>> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let coords = state.geocoder.lookup(&address).await.map_err(into_graphql_error)?;
        Ok(coords.map(Into::into))
    }

    /// Requires a driver principal; returns the route where `driverId`
    /// matches the principal and `status != Planning`.
    async fn get_my_assigned_route(&self, ctx: &Context<'_>, date: String) -> GraphQLResult<Option<types::Route>> {
        let driver_id = require_driver(ctx)?.to_string();
        let state = ctx.data_unchecked::<AppState>();
        let mut tx = state.store.begin().await.map_err(into_graphql_error)?;
        let routes = tx.load_routes_for_date(&date).await.map_err(into_graphql_error)?;
        let _ = tx.commit().await;

        let found = routes.into_iter().find(|r| {
            r.driver_id.as_deref() == Some(driver_id.as_str())
                && r.status != crate::domain::RouteStatus::Planning
        });
        Ok(found.map(Into::into))
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn plan_all_daily_routes(&self, ctx: &Context<'_>, date: String) -> GraphQLResult<types::PlanningResult> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let result = planner::plan_day(&*state.store, &date, &*state.time_matrix)
            .await
            .map_err(into_graphql_error)?;
        Ok(result.into())
    }

    async fn create_manual_route(&self, ctx: &Context<'_>, name: String, date: String) -> GraphQLResult<types::Route> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let route = editor::create_manual_route(&*state.store, name, date).await.map_err(into_graphql_error)?;
        Ok(route.into())
    }

    async fn add_stop_to_route(
        &self,
        ctx: &Context<'_>,
        route_id: String,
        child_id: String,
    ) -> GraphQLResult<types::Route> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let route = editor::add_stop_to_route(&*state.store, &route_id, &child_id)
            .await
            .map_err(into_graphql_error)?;
        Ok(route.into())
    }

    async fn remove_stop_from_route(&self, ctx: &Context<'_>, stop_id: String) -> GraphQLResult<types::Route> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let route = editor::remove_stop_from_route(&*state.store, &stop_id).await.map_err(into_graphql_error)?;
        Ok(route.into())
    }

    async fn reorder_stops(
        &self,
        ctx: &Context<'_>,
        route_id: String,
        stop_ids: Vec<String>,
    ) -> GraphQLResult<types::Route> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let route = editor::reorder_stops(&*state.store, &route_id, stop_ids).await.map_err(into_graphql_error)?;
        Ok(route.into())
    }

    async fn assign_driver_and_vehicle_to_route(
        &self,
        ctx: &Context<'_>,
        route_id: String,
        driver_id: String,
        vehicle_id: String,
    ) -> GraphQLResult<types::Route> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let route = editor::assign_driver_and_vehicle(&*state.store, &route_id, &driver_id, &vehicle_id)
            .await
            .map_err(into_graphql_error)?;
        Ok(route.into())
    }

    async fn delete_route(&self, ctx: &Context<'_>, route_id: String) -> GraphQLResult<bool> {
        require_admin(ctx)?;
        let state = ctx.data_unchecked::<AppState>();
        let deleted = editor::delete_route(&*state.store, &route_id).await.map_err(into_graphql_error)?;
        Ok(deleted)
    }
}
