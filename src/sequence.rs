//! Sequence optimizer (C5, spec.md §4.4): open-depot TSP over one cluster.

use itertools::Itertools;

use crate::domain::{Child, Coordinates};
use crate::errors::AppError;
use crate::ports::TimeMatrixProvider;

/// Above this node count (depot + stops), brute force is skipped in favor
/// of the heuristic candidates alone.
const BRUTE_FORCE_LIMIT: usize = 6;

const FALLBACK_SPEED_KM_PER_HOUR: f64 = 40.0;
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Orders `children` into the lowest-cost tour starting and ending at
/// `depot`, with the depot endpoints stripped from the result. Children
/// without coordinates are excluded from optimization and appended
/// verbatim at the end.
pub async fn order(
    children: &[Child],
    depot: Coordinates,
    matrix_provider: &dyn TimeMatrixProvider,
) -> Result<Vec<Child>, AppError> {
    let (with_coords, without_coords): (Vec<Child>, Vec<Child>) =
        children.iter().cloned().partition(|c| c.coordinates.is_some());

    if with_coords.is_empty() {
        return Ok(without_coords);
    }
    if with_coords.len() == 1 {
        let mut result = with_coords;
        result.extend(without_coords);
        return Ok(result);
    }

    let mut locations = vec![depot];
    locations.extend(with_coords.iter().map(|c| c.coordinates.expect("filtered for coords")));

    let matrix = match matrix_provider.matrix(&locations).await {
        Ok(m) => m,
        Err(err) => {
            tracing::warn!(error = %err, "time matrix provider unavailable, falling back to great-circle estimate");
            great_circle_matrix(&locations)
        }
    };

    let n = locations.len();
    let mut candidates: Vec<Vec<usize>> = Vec::new();
    candidates.push(nearest_neighbor_tour(&matrix, n));
    candidates.push(greedy_tour(&matrix, n));
    if n <= BRUTE_FORCE_LIMIT {
        candidates.push(brute_force_tour(&matrix, n));
    }

    let best = candidates
        .into_iter()
        .min_by_key(|tour| tour_cost(&matrix, tour))
        .expect("at least the nearest-neighbor candidate is always generated");

    let mut ordered: Vec<Child> = best
        .into_iter()
        .skip(1) // drop leading depot
        .take(n - 1) // drop trailing depot
        .map(|idx| with_coords[idx - 1].clone())
        .collect();
    ordered.extend(without_coords);

    Ok(ordered)
}

fn tour_cost(matrix: &[Vec<u32>], tour: &[usize]) -> u64 {
    tour.windows(2).map(|w| matrix[w[0]][w[1]] as u64).sum()
}

/// Nearest-neighbor starting at the depot (index 0).
fn nearest_neighbor_tour(matrix: &[Vec<u32>], n: usize) -> Vec<usize> {
    let mut visited = vec![false; n];
    let mut tour = vec![0usize];
    visited[0] = true;
    let mut current = 0usize;

    for _ in 1..n {
        let next = (1..n)
            .filter(|&j| !visited[j])
            .min_by_key(|&j| matrix[current][j])
            .expect("there is always an unvisited non-depot node here");
        visited[next] = true;
        tour.push(next);
        current = next;
    }

    tour.push(0);
    tour
}

/// At each step, picks the nearest unvisited node from the current node.
/// Identical to nearest-neighbor in this single-vehicle formulation;
/// retained as a second seed so future replacements can differ (spec.md §4.4).
fn greedy_tour(matrix: &[Vec<u32>], n: usize) -> Vec<usize> {
    nearest_neighbor_tour(matrix, n)
}

fn brute_force_tour(matrix: &[Vec<u32>], n: usize) -> Vec<usize> {
    let non_depot: Vec<usize> = (1..n).collect();
    let mut best_tour = None;
    let mut best_cost = u64::MAX;

    for perm in non_depot.iter().copied().permutations(non_depot.len()) {
        let mut tour = vec![0usize];
        tour.extend(perm);
        tour.push(0);
        let cost = tour_cost(matrix, &tour);
        if cost < best_cost {
            best_cost = cost;
            best_tour = Some(tour);
        }
    }

    best_tour.expect("n >= 2 guarantees at least one permutation")
}

fn great_circle_matrix(locations: &[Coordinates]) -> Vec<Vec<u32>> {
    let n = locations.len();
    let mut matrix = vec![vec![0u32; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let km = haversine_km(locations[i], locations[j]);
            let seconds = (km / FALLBACK_SPEED_KM_PER_HOUR * 3600.0).round();
            matrix[i][j] = seconds as u32;
        }
    }
    matrix
}

fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use async_trait::async_trait;

    fn child_at(id: &str, lat: f64, lon: f64) -> Child {
        Child {
            id: id.to_string(),
            name: id.to_string(),
            street: "1 Main St".to_string(),
            city: "Seattle".to_string(),
            state: None,
            coordinates: Some(Coordinates { lat, lon }),
            category: Category::Preschool,
        }
    }

    fn child_without_coords(id: &str) -> Child {
        Child {
            id: id.to_string(),
            name: id.to_string(),
            street: "1 Main St".to_string(),
            city: "Seattle".to_string(),
            state: None,
            coordinates: None,
            category: Category::Preschool,
        }
    }

    struct UnavailableMatrix;

    #[async_trait]
    impl TimeMatrixProvider for UnavailableMatrix {
        async fn matrix(&self, _locations: &[Coordinates]) -> Result<Vec<Vec<u32>>, AppError> {
            Err(AppError::PortFailure("no provider configured".to_string()))
        }
    }

    const DEPOT: Coordinates = Coordinates { lat: 47.6062, lon: -122.3321 };

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let result = order(&[], DEPOT, &UnavailableMatrix).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn single_child_with_coords_is_returned_as_is() {
        let children = vec![child_at("c1", 47.61, -122.33)];
        let result = order(&children, DEPOT, &UnavailableMatrix).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "c1");
    }

    #[tokio::test]
    async fn single_child_without_coords_is_returned_unoptimized() {
        let children = vec![child_without_coords("c1")];
        let result = order(&children, DEPOT, &UnavailableMatrix).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "c1");
    }

    #[tokio::test]
    async fn child_without_coords_trails_the_optimized_order() {
        let children = vec![
            child_at("a", 47.61, -122.33),
            child_at("b", 47.62, -122.34),
            child_without_coords("nocoords"),
        ];
        let result = order(&children, DEPOT, &UnavailableMatrix).await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.last().unwrap().id, "nocoords");
    }

    #[tokio::test]
    async fn three_collinear_children_order_by_proximity_to_depot() {
        let children = vec![
            child_at("a", 47.61, -122.33),
            child_at("b", 47.62, -122.34),
            child_at("c", 47.63, -122.35),
        ];
        let result = order(&children, DEPOT, &UnavailableMatrix).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
