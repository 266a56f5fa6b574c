mod forces;
mod hull;
mod quadtree;

use std::collections::{BTreeMap, HashMap};

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cluster::ClusterIndex;
use crate::graph::{GraphSnapshot, NodeId};
use crate::interaction::VisibleGraph;
use crate::util::stable_pair;
use forces::{ChargeParams, charge_on, collide, jiggle};
use quadtree::BodyTree;

pub use hull::{ClusterHull, convex_hull, polygon_contains};

pub type PositionMap = BTreeMap<NodeId, Vec2>;

const SEED_SPREAD: f32 = 0.8;
const MOTION_EPSILON_SQ: f32 = 1e-8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub link_distance: f32,
    /// Scaled by edge weight and divided by the smaller endpoint degree.
    pub link_strength: f32,
    pub charge: f32,
    pub theta: f32,
    pub center_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub reheat_alpha: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        let alpha_min: f32 = 0.001;
        Self {
            link_distance: 100.0,
            link_strength: 1.0,
            charge: -300.0,
            theta: 0.9,
            center_strength: 0.05,
            collision_padding: 2.0,
            collision_strength: 0.7,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            reheat_alpha: 0.3,
            viewport_width: 960.0,
            viewport_height: 640.0,
        }
    }
}

struct Body {
    id: NodeId,
    position: Vec2,
    velocity: Vec2,
    pinned: Option<Vec2>,
    radius: f32,
    degree: usize,
}

struct Link {
    source: usize,
    target: usize,
    weight: f32,
}

struct HullTarget {
    cluster_id: String,
    cluster_type: String,
    members: Vec<usize>,
}

#[derive(Default)]
struct LayoutScratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    deltas: Vec<Vec2>,
    hull_points: Vec<Vec2>,
}

/// Read-only view of one simulated node.
#[derive(Clone, Copy, Debug)]
pub struct BodyView<'a> {
    pub id: &'a str,
    pub position: Vec2,
    pub radius: f32,
    pub pinned: bool,
}

/// Owns every transient position. Callers read snapshots and request writes
/// through [`LayoutEngine::pin`].
pub struct LayoutEngine {
    params: LayoutParams,
    center: Vec2,
    half_extent: Vec2,
    bodies: Vec<Body>,
    index_by_id: HashMap<NodeId, usize>,
    links: Vec<Link>,
    hull_targets: Vec<HullTarget>,
    hulls: Vec<ClusterHull>,
    parked: HashMap<NodeId, Vec2>,
    alpha: f32,
    alpha_target: f32,
    scratch: LayoutScratch,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        let mut engine = Self {
            params,
            center: Vec2::ZERO,
            half_extent: Vec2::ZERO,
            bodies: Vec::new(),
            index_by_id: HashMap::new(),
            links: Vec::new(),
            hull_targets: Vec::new(),
            hulls: Vec::new(),
            parked: HashMap::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            scratch: LayoutScratch::default(),
        };
        let (width, height) = (engine.params.viewport_width, engine.params.viewport_height);
        engine.set_viewport(width, height);
        engine
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let width = if width.is_finite() { width.max(1.0) } else { 1.0 };
        let height = if height.is_finite() { height.max(1.0) } else { 1.0 };
        self.params.viewport_width = width;
        self.params.viewport_height = height;
        self.center = vec2(width * 0.5, height * 0.5);
        self.half_extent = vec2(width * 0.5, height * 0.5);
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Installs the visible part of `snapshot`. Persisting ids keep their
    /// position and velocity, hidden ids are parked, returning ids resume
    /// where they were parked and unseen ids are seeded inside the viewport.
    pub fn sync(&mut self, snapshot: &GraphSnapshot, visible: &VisibleGraph) {
        let mut prior = self
            .bodies
            .drain(..)
            .map(|body| (body.id.clone(), body))
            .collect::<HashMap<_, _>>();

        let mut bodies = Vec::with_capacity(visible.node_indices.len());
        let mut seeded = 0usize;
        for &node_index in &visible.node_indices {
            let Some(node) = snapshot.nodes().get(node_index) else {
                continue;
            };

            let body = if let Some(mut body) = prior.remove(&node.id) {
                body.radius = node.visual_size();
                body.degree = 0;
                body
            } else {
                let position = match self.parked.remove(&node.id) {
                    Some(position) => position,
                    None => {
                        seeded += 1;
                        self.seed_position(&node.id, bodies.len())
                    }
                };
                Body {
                    id: node.id.clone(),
                    position,
                    velocity: Vec2::ZERO,
                    pinned: None,
                    radius: node.visual_size(),
                    degree: 0,
                }
            };
            bodies.push(body);
        }

        for (id, body) in prior {
            self.parked.insert(id, body.position);
        }
        self.parked.retain(|id, _| snapshot.contains(id));

        self.index_by_id = bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (body.id.clone(), index))
            .collect();
        self.bodies = bodies;

        self.links.clear();
        for &edge_index in &visible.edge_indices {
            let Some(edge) = snapshot.edges().get(edge_index) else {
                continue;
            };
            let (Some(&source), Some(&target)) = (
                self.index_by_id.get(&edge.source),
                self.index_by_id.get(&edge.target),
            ) else {
                continue;
            };
            if source == target {
                continue;
            }

            self.bodies[source].degree += 1;
            self.bodies[target].degree += 1;
            self.links.push(Link {
                source,
                target,
                weight: edge.weight,
            });
        }

        let cluster_index = ClusterIndex::new(snapshot.clusters());
        self.hull_targets = snapshot
            .clusters()
            .iter()
            .enumerate()
            .filter_map(|(slot, cluster)| {
                let members = cluster
                    .member_ids
                    .iter()
                    .filter(|id| cluster_index.cluster_of(id) == Some(slot))
                    .filter_map(|id| self.index_by_id.get(id).copied())
                    .collect::<Vec<_>>();
                (members.len() > 2).then(|| HullTarget {
                    cluster_id: cluster.id.clone(),
                    cluster_type: cluster.cluster_type.clone(),
                    members,
                })
            })
            .collect();

        self.recompute_hulls();
        debug!(
            bodies = self.bodies.len(),
            links = self.links.len(),
            parked = self.parked.len(),
            seeded,
            "layout synced"
        );
    }

    /// Adopts positions from a previous run for every id it knows about.
    pub fn restore_positions(&mut self, previous: &PositionMap) {
        for (id, position) in previous {
            if !position.x.is_finite() || !position.y.is_finite() {
                continue;
            }
            match self.index_by_id.get(id) {
                Some(&index) => {
                    let body = &mut self.bodies[index];
                    if body.pinned.is_none() {
                        body.position = *position;
                        body.velocity = Vec2::ZERO;
                    }
                }
                None => {
                    self.parked.insert(id.clone(), *position);
                }
            }
        }
        self.recompute_hulls();
    }

    fn seed_position(&self, id: &str, index: usize) -> Vec2 {
        let (jx, jy) = stable_pair(id);
        let mut offset = vec2(jx, jy);
        if offset.length_sq() <= 0.0001 {
            offset = jiggle(index, index + 1) * 0.5;
        }
        self.center + vec2(offset.x * self.half_extent.x, offset.y * self.half_extent.y) * SEED_SPREAD
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_active(&self) -> bool {
        self.alpha >= self.params.alpha_min || self.alpha_target >= self.params.alpha_min
    }

    /// Re-excites a cooled simulation.
    pub fn reheat(&mut self) {
        self.alpha = self.params.reheat_alpha.max(self.params.alpha_min);
    }

    /// While non-zero, alpha converges to `target` instead of decaying away.
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn hold_warm(&mut self, warm: bool) {
        let target = if warm { self.params.reheat_alpha } else { 0.0 };
        self.set_alpha_target(target);
    }

    /// One simulation step. Returns whether the simulation is still active.
    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        let decay = self.params.alpha_decay.clamp(0.0, 1.0);
        self.alpha += (self.alpha_target - self.alpha) * decay;

        if self.step() {
            self.recompute_hulls();
        }
        trace!(alpha = self.alpha, "layout tick");

        self.is_active()
    }

    /// Ticks until the simulation cools or `max_ticks` is reached.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    fn step(&mut self) -> bool {
        let Self {
            params,
            center,
            bodies,
            links,
            scratch,
            alpha,
            ..
        } = self;
        let alpha = *alpha;
        let count = bodies.len();
        if count == 0 {
            return false;
        }

        scratch.positions.clear();
        scratch.radii.clear();
        scratch.deltas.clear();
        scratch.deltas.resize(count, Vec2::ZERO);
        for body in bodies.iter() {
            scratch.positions.push(body.pinned.unwrap_or(body.position));
            scratch.radii.push(body.radius + params.collision_padding.max(0.0));
        }

        let positions = &scratch.positions;
        let radii = &scratch.radii;
        let deltas = &mut scratch.deltas;

        for link in links.iter() {
            let (source, target) = (link.source, link.target);
            let delta = positions[target] - positions[source];
            let distance = delta.length();
            let (direction, distance) = if distance > 0.0001 {
                (delta / distance, distance)
            } else {
                (jiggle(source, target), 0.0001)
            };

            let source_degree = bodies[source].degree.max(1) as f32;
            let target_degree = bodies[target].degree.max(1) as f32;
            let strength =
                params.link_strength * link.weight / source_degree.min(target_degree);
            let stretch = (distance - params.link_distance) * alpha * strength;
            let bias = source_degree / (source_degree + target_degree);

            deltas[target] -= direction * stretch * bias;
            deltas[source] += direction * stretch * (1.0 - bias);
        }

        if count > 1
            && let Some(tree) = BodyTree::build(positions, radii)
        {
            let charge = ChargeParams {
                charge: params.charge,
                alpha,
                theta: params.theta.max(0.0),
            };
            for (index, delta) in deltas.iter_mut().enumerate() {
                *delta += charge_on(&tree, index, positions, charge);
            }

            if tree.reach > 0.0 && params.collision_strength > 0.0 {
                let strength = params.collision_strength.clamp(0.0, 1.0);
                collide(&tree, &tree, positions, radii, strength, deltas);
            }
        }

        let center_pull = params.center_strength * alpha;
        for (delta, position) in deltas.iter_mut().zip(positions.iter()) {
            *delta += (*center - *position) * center_pull;
        }

        let keep = 1.0 - params.velocity_decay.clamp(0.0, 1.0);
        let mut moved = false;
        for (body, delta) in bodies.iter_mut().zip(deltas.iter()) {
            if let Some(pin) = body.pinned {
                body.position = pin;
                body.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (body.velocity + *delta) * keep;
            if !velocity.x.is_finite() || !velocity.y.is_finite() {
                velocity = Vec2::ZERO;
            }
            body.velocity = velocity;
            body.position += velocity;
            if velocity.length_sq() > MOTION_EPSILON_SQ {
                moved = true;
            }
        }

        moved
    }

    fn recompute_hulls(&mut self) {
        self.hulls.clear();
        let points = &mut self.scratch.hull_points;
        for target in &self.hull_targets {
            points.clear();
            points.extend(
                target
                    .members
                    .iter()
                    .filter_map(|&index| self.bodies.get(index))
                    .map(|body| body.position),
            );
            if let Some(polygon) = convex_hull(points) {
                self.hulls.push(ClusterHull {
                    cluster_id: target.cluster_id.clone(),
                    cluster_type: target.cluster_type.clone(),
                    polygon: polygon.iter().map(|point| [point.x, point.y]).collect(),
                });
            }
        }
    }

    /// Pins `id` at `position`; forces still act on its neighbours.
    pub fn pin(&mut self, id: &str, position: Vec2) -> bool {
        if !position.x.is_finite() || !position.y.is_finite() {
            return false;
        }
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        let body = &mut self.bodies[index];
        body.pinned = Some(position);
        body.position = position;
        body.velocity = Vec2::ZERO;
        self.recompute_hulls();
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.bodies[index].pinned.take().is_some()
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.index_by_id
            .get(id)
            .is_some_and(|&index| self.bodies[index].pinned.is_some())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Current position of a visible node, or the last one of a hidden node.
    pub fn position(&self, id: &str) -> Option<Vec2> {
        match self.index_by_id.get(id) {
            Some(&index) => Some(self.bodies[index].position),
            None => self.parked.get(id).copied(),
        }
    }

    pub fn positions(&self) -> PositionMap {
        self.bodies
            .iter()
            .map(|body| (body.id.clone(), body.position))
            .collect()
    }

    pub fn bodies(&self) -> impl Iterator<Item = BodyView<'_>> + '_ {
        self.bodies.iter().map(|body| BodyView {
            id: body.id.as_str(),
            position: body.position,
            radius: body.radius,
            pinned: body.pinned.is_some(),
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn hulls(&self) -> &[ClusterHull] {
        &self.hulls
    }

    /// Closest node whose visual disc contains `point`.
    pub fn node_at(&self, point: Vec2) -> Option<&str> {
        self.bodies
            .iter()
            .filter_map(|body| {
                let distance = (body.position - point).length();
                (distance <= body.radius).then_some((body, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(body, _distance)| body.id.as_str())
    }
}
