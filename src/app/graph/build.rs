use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

use crate::data::Country;

use super::super::{GraphModel, GraphNode};

/// Canonical identity of an unordered id pair. `(a, b)` and `(b, a)` map to
/// the same key, so the edge set holds at most one edge per neighbor pair.
fn pair_key(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}

/// Builds the node/edge model from raw country records.
///
/// Nodes map 1:1 from the input, preserving order; a duplicate id keeps the
/// first-seen record and drops the rest. Edges come from the first
/// `max_neighbors` entries of each country's neighbor list, deduplicated by
/// pair key. Neighbor ids that reference no loaded country, and
/// self-references, are silently skipped - partial data sets are normal,
/// not a fault.
pub(in crate::app) fn build_graph_model(countries: &[Country], max_neighbors: usize) -> GraphModel {
    let mut nodes = Vec::with_capacity(countries.len());
    let mut index_by_id = HashMap::with_capacity(countries.len());

    for country in countries {
        if index_by_id.contains_key(&country.id) {
            continue;
        }

        index_by_id.insert(country.id, nodes.len());
        nodes.push(GraphNode {
            id: country.id,
            name: country.name.clone(),
            code: country.code.clone(),
            continent_id: country.continent_id,
            continent_name: country.continent_name.clone(),
            color: country.color.clone(),
            is_capital: country.is_capital,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            fixed: None,
            isolated: false,
        });
    }

    let mut edges = Vec::new();
    let mut processed_pairs = HashSet::new();
    let mut visited_sources = HashSet::new();

    for country in countries {
        // Duplicate ids dropped their record above; drop their neighbor
        // lists here too.
        if !visited_sources.insert(country.id) {
            continue;
        }
        let Some(&source_index) = index_by_id.get(&country.id) else {
            continue;
        };

        for &neighbor_id in country.neighbor_ids.iter().take(max_neighbors) {
            if neighbor_id == country.id {
                continue;
            }
            if !processed_pairs.insert(pair_key(country.id, neighbor_id)) {
                continue;
            }
            if let Some(&target_index) = index_by_id.get(&neighbor_id)
                && source_index != target_index
            {
                edges.push((source_index, target_index));
            }
        }
    }

    let mut degree = vec![0usize; nodes.len()];
    for &(source, target) in &edges {
        degree[source] += 1;
        degree[target] += 1;
    }

    GraphModel {
        nodes,
        edges,
        degree,
    }
}

#[cfg(test)]
mod tests {
    use super::build_graph_model;
    use crate::data::Country;

    fn country(id: i64, neighbor_ids: Vec<i64>) -> Country {
        Country {
            id,
            name: format!("country-{id}"),
            code: format!("C{id}"),
            continent_id: None,
            continent_name: None,
            color: None,
            neighbor_ids,
            is_capital: false,
        }
    }

    #[test]
    fn build_is_deterministic() {
        let countries = vec![
            country(1, vec![2, 3]),
            country(2, vec![3, 1]),
            country(3, vec![]),
        ];

        let first = build_graph_model(&countries, 5);
        let second = build_graph_model(&countries, 5);

        let first_ids = first.nodes.iter().map(|node| node.id).collect::<Vec<_>>();
        let second_ids = second.nodes.iter().map(|node| node.id).collect::<Vec<_>>();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn reciprocal_neighbor_listing_yields_one_edge() {
        let countries = vec![country(1, vec![2]), country(2, vec![1])];
        let model = build_graph_model(&countries, 5);
        assert_eq!(model.edges, vec![(0, 1)]);
    }

    #[test]
    fn neighbor_cap_limits_edges_sourced_from_one_list() {
        let mut countries = vec![country(1, vec![2, 3, 4, 5, 6, 7, 8])];
        for id in 2..=8 {
            countries.push(country(id, vec![]));
        }

        let model = build_graph_model(&countries, 5);
        assert_eq!(model.edges.len(), 5);
        // A node may still exceed the cap through other countries' lists.
        let extra = vec![
            country(1, vec![2, 3, 4, 5, 6]),
            country(2, vec![]),
            country(3, vec![]),
            country(4, vec![]),
            country(5, vec![]),
            country(6, vec![]),
            country(7, vec![1]),
        ];
        let model = build_graph_model(&extra, 5);
        assert_eq!(model.degree[0], 6);
    }

    #[test]
    fn dangling_references_are_dropped_without_error() {
        let countries = vec![country(1, vec![999, 2]), country(2, vec![])];
        let model = build_graph_model(&countries, 5);
        assert_eq!(model.edges, vec![(0, 1)]);
    }

    #[test]
    fn self_references_are_dropped() {
        let countries = vec![country(1, vec![1, 2]), country(2, vec![])];
        let model = build_graph_model(&countries, 5);
        assert_eq!(model.edges, vec![(0, 1)]);
    }

    #[test]
    fn duplicate_ids_keep_first_seen_record() {
        let mut duplicate = country(1, vec![3]);
        duplicate.name = "shadow".to_owned();
        let countries = vec![
            country(1, vec![2]),
            duplicate,
            country(2, vec![]),
            country(3, vec![]),
        ];

        let model = build_graph_model(&countries, 5);
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.nodes[0].name, "country-1");
        // The shadowed record's neighbor list is ignored with it.
        assert_eq!(model.edges, vec![(0, 1)]);
    }

    #[test]
    fn edge_order_follows_first_encounter() {
        let countries = vec![
            country(3, vec![1]),
            country(1, vec![2, 3]),
            country(2, vec![]),
        ];

        let model = build_graph_model(&countries, 5);
        // (3,1) encountered first, then (1,2); (1,3) is already processed.
        assert_eq!(model.edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = build_graph_model(&[], 5);
        assert!(model.nodes.is_empty());
        assert!(model.edges.is_empty());
        assert!(model.degree.is_empty());
    }

    #[test]
    fn degree_counts_both_endpoints() {
        let countries = vec![
            country(1, vec![2, 3]),
            country(2, vec![]),
            country(3, vec![]),
            country(4, vec![]),
        ];

        let model = build_graph_model(&countries, 5);
        assert_eq!(model.degree, vec![2, 1, 1, 0]);
    }
}
