use eframe::egui::{Vec2, vec2};

use super::quadtree::BodyTree;

const MIN_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Negative repels.
    pub(super) charge: f32,
    pub(super) alpha: f32,
    pub(super) theta: f32,
}

/// Stable fallback direction for bodies sitting on the same spot.
pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn pull(point: Vec2, source: Vec2, weight: f32, params: ChargeParams) -> Vec2 {
    let offset = source - point;
    offset * (params.charge * params.alpha * weight / offset.length_sq().max(MIN_DISTANCE_SQ))
}

/// Charge felt by `body`, approximating far cells by their centroid.
pub(super) fn charge_on(tree: &BodyTree, body: usize, positions: &[Vec2], params: ChargeParams) -> Vec2 {
    let point = positions[body];
    let mut total = Vec2::ZERO;
    let mut pending = vec![tree];

    while let Some(cell) = pending.pop() {
        if cell.count == 0 {
            continue;
        }

        if cell.is_leaf() {
            for &other in cell.bodies.iter().filter(|&&other| other != body) {
                let source = positions[other];
                if (source - point).length_sq() <= f32::EPSILON {
                    let side = if body < other { -1.0 } else { 1.0 };
                    total += jiggle(body.min(other), body.max(other)) * side * params.alpha;
                } else {
                    total += pull(point, source, 1.0, params);
                }
            }
            continue;
        }

        let distance = (cell.centroid - point).length().max(f32::EPSILON);
        let far_enough = cell.count > 1
            && !cell.cell.contains(point)
            && cell.cell.size / distance < params.theta;
        if far_enough {
            total += pull(point, cell.centroid, cell.count as f32, params);
        } else {
            pending.extend(cell.children());
        }
    }
    total
}

fn separate(a: usize, b: usize, positions: &[Vec2], radii: &[f32], strength: f32, deltas: &mut [Vec2]) {
    let touching = radii[a] + radii[b];
    let offset = positions[a] - positions[b];
    let distance_sq = offset.length_sq();
    if distance_sq >= touching * touching {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 1e-4 { offset / distance } else { jiggle(a, b) };
    let overlap = direction * (touching - distance) * strength;

    // Smaller discs give way more.
    let (area_a, area_b) = (radii[a] * radii[a], radii[b] * radii[b]);
    let share_a = area_b / (area_a + area_b).max(f32::EPSILON);
    deltas[a] += overlap * share_a;
    deltas[b] -= overlap * (1.0 - share_a);
}

/// Resolves overlaps between every pair of bodies under `a` and `b`. Cell
/// pairs further apart than their combined reach are skipped whole.
pub(super) fn collide(
    a: &BodyTree,
    b: &BodyTree,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let same = std::ptr::eq(a, b);
    let reach = a.reach + b.reach;
    if !same && a.cell.gap_sq(b.cell) > reach * reach {
        return;
    }

    match (a.is_leaf(), b.is_leaf()) {
        (true, true) if same => {
            for (offset, &first) in a.bodies.iter().enumerate() {
                for &second in &a.bodies[offset + 1..] {
                    separate(first, second, positions, radii, strength, deltas);
                }
            }
        }
        (true, true) => {
            for &first in &a.bodies {
                for &second in &b.bodies {
                    separate(first, second, positions, radii, strength, deltas);
                }
            }
        }
        _ if same => {
            let children = a.children().collect::<Vec<_>>();
            for (offset, first) in children.iter().enumerate() {
                collide(first, first, positions, radii, strength, deltas);
                for second in &children[offset + 1..] {
                    collide(first, second, positions, radii, strength, deltas);
                }
            }
        }
        (a_leaf, b_leaf) => {
            if !a_leaf && (b_leaf || a.cell.size >= b.cell.size) {
                for child in a.children() {
                    collide(child, b, positions, radii, strength, deltas);
                }
            } else {
                for child in b.children() {
                    collide(a, child, positions, radii, strength, deltas);
                }
            }
        }
    }
}
