use eframe::egui::{Vec2, vec2};

use super::super::{ForceParams, GraphNode};
use super::ForceScratch;
use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.81;
const LINK_STRENGTH: f32 = 0.1;
// Repulsion is capped as if no pair ever gets closer than this.
const MIN_CHARGE_DISTANCE: f32 = 1.0;

/// One force pass: link, charge, centering, collision, composed additively
/// into `scratch.forces` as velocity deltas. Positions and velocities are
/// only read here; integration (and the pin exemption) happens in the
/// solver step.
pub(super) fn accumulate_forces(
    nodes: &[GraphNode],
    edges: &[(usize, usize)],
    center: Vec2,
    alpha: f32,
    params: &ForceParams,
    scratch: &mut ForceScratch,
) {
    let node_count = nodes.len();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.forces.fill(Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.extend(nodes.iter().map(|node| node.pos));

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;

    if let Some(quadtree) = QuadNode::build(positions) {
        let repulsion = -params.charge_strength * alpha;
        if repulsion != 0.0 {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_repulsion_for_node(&quadtree, index, positions, repulsion, force);
            }
        }

        if params.collision_radius > 0.0 {
            accumulate_collision_pairs(
                &quadtree,
                &quadtree,
                true,
                positions,
                params.collision_radius,
                forces,
            );
        }
    }

    for &(source, target) in edges {
        if source >= node_count || target >= node_count {
            continue;
        }

        let delta = positions[target] - positions[source];
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }
        let direction = delta / distance;
        let correction = direction * ((distance - params.link_distance) * LINK_STRENGTH * alpha);

        forces[source] += correction;
        forces[target] -= correction;
    }

    for (index, force) in forces.iter_mut().enumerate() {
        *force += (center - positions[index]) * (params.center_strength * alpha);
    }
}

fn repulsion_between(point: Vec2, other: Vec2, mass: f32, repulsion: f32) -> Vec2 {
    let delta = point - other;
    let distance = delta.length();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        vec2(1.0, 0.0)
    };
    direction * ((repulsion * mass) / distance.max(MIN_CHARGE_DISTANCE))
}

fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    repulsion: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *force += repulsion_between(point, positions[other_index], 1.0, repulsion);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && ((node.bounds.side_length() / distance) < BARNES_HUT_THETA)
        && node.mass > 1.0;

    if can_approximate {
        *force += repulsion_between(point, node.center_of_mass, node.mass, repulsion);
        return;
    }

    for child in &node.children {
        if let Some(child) = child.as_ref() {
            accumulate_repulsion_for_node(child, index, positions, repulsion, force);
        }
    }
}

fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    min_separation: f32,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > min_separation * min_separation {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    collide_pair(
                        node_a.indices[i],
                        node_a.indices[j],
                        positions,
                        min_separation,
                        forces,
                    );
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, min_separation, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, min_separation, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a,
                    child_b,
                    false,
                    positions,
                    min_separation,
                    forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, min_separation, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, min_separation, forces);
        }
    }
}

/// Soft minimum-separation constraint: overlapping pairs get pushed apart
/// by half the overlap each, resolved over successive ticks.
fn collide_pair(from: usize, to: usize, positions: &[Vec2], min_separation: f32, forces: &mut [Vec2]) {
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_separation * min_separation {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };

    let push = (min_separation - distance) * 0.5;
    forces[from] += direction * push;
    forces[to] -= direction * push;
}
