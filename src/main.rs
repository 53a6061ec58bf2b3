use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Router;

use clap::Parser;

use childcare_router::cli::Args;
use childcare_router::config::CONFIG;
use childcare_router::domain::Principal;
use childcare_router::graphql::{build_schema, AppState, ChildcareSchema};
use childcare_router::logger;
use childcare_router::ports::{Clock, Geocoder, TimeMatrixProvider};
use childcare_router::store::memory::MemoryStore;
use childcare_router::store::postgres::PostgresStore;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    logger::init();

    let args = Args::parse();
    let bind_addr = args.bind_addr.unwrap_or_else(|| CONFIG.bind_addr.clone());
    let database_url = args.database_url.or_else(|| CONFIG.database_url.clone());

    let store: Arc<dyn childcare_router::ports::Store> = match &database_url {
        Some(url) => {
            tracing::info!("connecting to Postgres store");
            Arc::new(PostgresStore::connect(url).await.expect("database connection"))
        }
        None => {
            tracing::warn!("DATABASE_URL unset, using in-process MemoryStore");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        store,
        time_matrix: Arc::new(UnavailableTimeMatrix),
        geocoder: Arc::new(UnavailableGeocoder),
        clock: Arc::new(SystemClock),
    };

    let schema = build_schema(state);
    let app = Router::new().route("/graphql", post(graphql_handler)).with_state(schema);

    tracing::info!(%bind_addr, "starting GraphQL server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.expect("bind address");
    axum::serve(listener, app).await.expect("server error");
}

/// Reads a principal already established by the external identity/session
/// collaborator (spec.md §1, out of scope here) and attaches it to the
/// GraphQL request context. Real deployments replace `parse_principal`
/// with whatever their actual auth middleware has validated.
async fn graphql_handler(
    State(schema): State<ChildcareSchema>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(principal) = headers.get("x-principal").and_then(|v| v.to_str().ok()).and_then(parse_principal) {
        request = request.data(principal);
    }
    schema.execute(request).await.into()
}

fn parse_principal(raw: &str) -> Option<Principal> {
    if raw == "admin" {
        return Some(Principal::Admin);
    }
    raw.strip_prefix("driver:").map(|id| Principal::Driver(id.to_string()))
}

struct UnavailableTimeMatrix;

#[async_trait::async_trait]
impl TimeMatrixProvider for UnavailableTimeMatrix {
    async fn matrix(
        &self,
        _locations: &[childcare_router::domain::Coordinates],
    ) -> Result<Vec<Vec<u32>>, childcare_router::errors::AppError> {
        Err(childcare_router::errors::AppError::PortFailure(
            "no time matrix provider configured".to_string(),
        ))
    }
}

struct UnavailableGeocoder;

#[async_trait::async_trait]
impl Geocoder for UnavailableGeocoder {
    async fn lookup(
        &self,
        _address: &str,
    ) -> Result<Option<childcare_router::domain::Coordinates>, childcare_router::errors::AppError> {
        Ok(None)
    }
}

struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        chrono::Utc::now().format("%Y-%m-%d").to_string()
    }
}
