//! Geographic clusterer (C4, spec.md §4.3).

use crate::domain::Child;

/// Subdivides a workload into geographic clusters via k-means on raw
/// (lat, lon) degrees. `capacity_heuristic` drives the choice of `k`.
pub fn cluster(children: &[Child], capacity_heuristic: usize) -> Vec<Vec<Child>> {
    let (with_coords, without_coords): (Vec<Child>, Vec<Child>) =
        children.iter().cloned().partition(|c| c.coordinates.is_some());

    if with_coords.is_empty() {
        return vec![children.to_vec()];
    }

    let n = with_coords.len();
    let capacity_heuristic = capacity_heuristic.max(1);
    let k = ((n + capacity_heuristic - 1) / capacity_heuristic).max(1).min(n);

    if k == 1 {
        return vec![children.to_vec()];
    }

    let points: Vec<(f64, f64)> = with_coords
        .iter()
        .map(|c| {
            let coords = c.coordinates.expect("partitioned into with_coords");
            (coords.lat, coords.lon)
        })
        .collect();

    let assignments = kmeans(&points, k);

    let mut clusters: Vec<Vec<Child>> = vec![Vec::new(); k];
    for (child, cluster_idx) in with_coords.into_iter().zip(assignments) {
        clusters[cluster_idx].push(child);
    }

    clusters.retain(|c| !c.is_empty());

    if without_coords.is_empty() {
        clusters
    } else if let Some(first) = clusters.first_mut() {
        first.extend(without_coords);
        clusters
    } else {
        vec![without_coords]
    }
}

/// Lloyd's algorithm with default (first-k-points) initialization, run to
/// convergence. Returns the cluster index for each input point. Ties
/// resolve to the lowest cluster index.
fn kmeans(points: &[(f64, f64)], k: usize) -> Vec<usize> {
    let mut centroids: Vec<(f64, f64)> = points.iter().take(k).copied().collect();
    let mut assignments = vec![0usize; points.len()];

    loop {
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f64::MAX;
            for (ci, centroid) in centroids.iter().enumerate() {
                let dist = squared_distance(*point, *centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = ci;
                }
            }
            if assignments[i] != best {
                assignments[i] = best;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
        for (point, &assignment) in points.iter().zip(&assignments) {
            sums[assignment].0 += point.0;
            sums[assignment].1 += point.1;
            sums[assignment].2 += 1;
        }
        for (ci, (sum_lat, sum_lon, count)) in sums.into_iter().enumerate() {
            if count > 0 {
                centroids[ci] = (sum_lat / count as f64, sum_lon / count as f64);
            }
        }
    }

    assignments
}

fn squared_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = a.0 - b.0;
    let dlon = a.1 - b.1;
    dlat * dlat + dlon * dlon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Coordinates};

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

    #[test]
    fn small_workload_is_a_single_cluster() {
        let children = vec![child_at("c1", 47.6, -122.3), child_at("c2", 47.61, -122.31)];
        let clusters = cluster(&children, 10);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn empty_with_coords_yields_one_cluster_of_everyone() {
        let children = vec![child_without_coords("c1"), child_without_coords("c2")];
        let clusters = cluster(&children, 10);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn without_coords_children_append_to_first_cluster() {
        let mut children: Vec<Child> = (0..25)
            .map(|i| child_at(&format!("c{i}"), 47.6 + i as f64 * 0.01, -122.3))
            .collect();
        children.push(child_without_coords("nocoords"));

        let clusters = cluster(&children, 10);
        assert!(clusters.len() > 1);
        let total: usize = clusters.iter().map(|c| c.len()).sum();
        assert_eq!(total, 26);
        assert!(clusters[0].iter().any(|c| c.id == "nocoords"));
    }

    #[test]
    fn k_never_exceeds_point_count() {
        let children = vec![child_at("c1", 47.6, -122.3)];
        let clusters = cluster(&children, 1);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 1);
    }
}
