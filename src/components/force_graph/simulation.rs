//! Force-directed layout simulation.
//!
//! Node state lives in a flat `Vec<Body>` indexed by scene node index and is
//! advanced by [`Simulation::step`]. Each step integrates three forces:
//!
//! - **Link**: springs pull linked bodies toward `link_distance`.
//! - **Charge**: every pair of bodies repels (negative strength).
//! - **Center**: the whole body set is translated so its mean sits on `center`.
//!
//! A decaying `alpha` scales all forces so the layout settles instead of
//! oscillating. Dragging raises `alpha_target`, which keeps the layout warm
//! until the drag ends.

use std::f64::consts::PI;

/// Tuning for a simulation. See [`super::variant::ViewVariant`] for the
/// per-view values.
#[derive(Clone, Debug)]
pub struct SimulationParams {
	/// Rest length of link springs in world units.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Pairs closer than this are treated as this far apart.
	pub charge_distance_min: f64,
	/// Point the layout is centered on.
	pub center: (f64, f64),
	/// The simulation stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered per step.
	pub alpha_decay: f64,
	/// Velocity multiplier applied every step (1.0 = frictionless).
	pub velocity_decay: f64,
	/// Alpha target held while a node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for SimulationParams {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 30.0,
			charge_strength: -30.0,
			charge_distance_min: 1.0,
			center: (0.0, 0.0),
			alpha_min,
			// Cools from 1.0 to alpha_min in ~300 steps.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.6,
			drag_alpha_target: 0.3,
		}
	}
}

/// Position, velocity and optional per-axis pin of one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x position. The body does not move on x while set.
	pub fx: Option<f64>,
	/// Pinned y position. The body does not move on y while set.
	pub fy: Option<f64>,
}

impl Body {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A resolved link between two body indices.
#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target (the rest goes to the source).
	bias: f64,
}

/// Linear congruential generator used to separate coincident bodies.
#[derive(Clone, Debug)]
struct Lcg(u32);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

/// Explicit layout state for one graph instance.
#[derive(Clone, Debug)]
pub struct Simulation {
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	params: SimulationParams,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	stopped: bool,
	rng: Lcg,
}

impl Simulation {
	/// Create a simulation for `node_count` bodies joined by `links`.
	///
	/// Links referencing an index outside `0..node_count` are ignored.
	pub fn new(
		node_count: usize,
		links: impl IntoIterator<Item = (usize, usize)>,
		params: SimulationParams,
	) -> Self {
		let golden_angle = PI * (3.0 - 5f64.sqrt());
		let bodies: Vec<Body> = (0..node_count)
			.map(|i| {
				let radius = 10.0 * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				Body {
					x: params.center.0 + radius * angle.cos(),
					y: params.center.1 + radius * angle.sin(),
					..Body::default()
				}
			})
			.collect();

		let pairs: Vec<(usize, usize)> = links
			.into_iter()
			.filter(|&(s, t)| s < node_count && t < node_count)
			.collect();

		let mut degree = vec![0usize; node_count];
		for &(s, t) in &pairs {
			degree[s] += 1;
			degree[t] += 1;
		}

		let springs = pairs
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Spring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			bodies,
			springs,
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			running: node_count > 0,
			stopped: false,
			rng: Lcg(1),
		}
	}

	pub fn params(&self) -> &SimulationParams {
		&self.params
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Current position of body `idx`, if it exists.
	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.bodies.get(idx).map(|b| (b.x, b.y))
	}

	/// Whether [`tick`](Self::tick) will advance the layout.
	pub fn is_running(&self) -> bool {
		self.running && !self.stopped
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Resume ticking after the layout has cooled.
	pub fn restart(&mut self) {
		if !self.bodies.is_empty() {
			self.running = true;
		}
	}

	/// Halt for good. Used when the owning view is unmounted or replaced.
	pub fn stop(&mut self) {
		self.stopped = true;
	}

	/// Fix body `idx` at `(x, y)` until [`unpin`](Self::unpin).
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = Some(x);
			body.fy = Some(y);
		}
	}

	/// Return body `idx` to free movement.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = None;
			body.fy = None;
		}
	}

	/// Begin a drag on `idx`: pin it where it is and keep the layout warm.
	pub fn grab(&mut self, idx: usize) {
		if let Some((x, y)) = self.position(idx) {
			self.pin(idx, x, y);
			self.set_alpha_target(self.params.drag_alpha_target);
			self.restart();
		}
	}

	/// End a drag on `idx`: release the pin and let the layout cool.
	pub fn release(&mut self, idx: usize) {
		self.unpin(idx);
		self.set_alpha_target(0.0);
	}

	/// Advance one step if running. Returns whether a step was taken.
	pub fn tick(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.step();
		if self.alpha < self.params.alpha_min {
			self.running = false;
		}
		true
	}

	/// Run one integration step unconditionally.
	pub fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_center();

		let decay = self.params.velocity_decay;
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= decay;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= decay;
					body.y += body.vy;
				}
			}
		}
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		let distance = self.params.link_distance;

		for spring in &self.springs {
			if spring.source == spring.target {
				continue;
			}
			let (s, t) = (&self.bodies[spring.source], &self.bodies[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.rng.jiggle();
			}
			if dy == 0.0 {
				dy = self.rng.jiggle();
			}

			let len = (dx * dx + dy * dy).sqrt();
			let l = (len - distance) / len * alpha * spring.strength;
			let (dx, dy) = (dx * l, dy * l);

			let target = &mut self.bodies[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self) {
		let n = self.bodies.len();
		let strength = self.params.charge_strength * self.alpha;
		let min2 = self.params.charge_distance_min * self.params.charge_distance_min;

		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = self.bodies[j].x - self.bodies[i].x;
				let mut dy = self.bodies[j].y - self.bodies[i].y;
				if dx == 0.0 {
					dx = self.rng.jiggle();
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
				}

				let mut l = dx * dx + dy * dy;
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;

				self.bodies[i].vx += dx * w;
				self.bodies[i].vy += dy * w;
				self.bodies[j].vx -= dx * w;
				self.bodies[j].vy -= dy * w;
			}
		}
	}

	fn apply_center(&mut self) {
		if self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (cx, cy) = self.params.center;
		let (shift_x, shift_y) = (sx / n - cx, sy / n - cy);

		for body in &mut self.bodies {
			body.x -= shift_x;
			body.y -= shift_y;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (ax, ay) = sim.position(a).unwrap();
		let (bx, by) = sim.position(b).unwrap();
		((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
	}

	fn settle(sim: &mut Simulation) -> usize {
		let mut steps = 0;
		while sim.tick() {
			steps += 1;
			assert!(steps < 10_000, "simulation never cooled");
		}
		steps
	}

	#[test]
	fn empty_simulation_is_inert() {
		let mut sim = Simulation::new(0, [], SimulationParams::default());
		assert!(!sim.is_running());
		assert!(!sim.tick());
		sim.step();
		assert!(sim.is_empty());
	}

	#[test]
	fn single_node_rests_on_center() {
		let params = SimulationParams {
			center: (5.0, -5.0),
			..SimulationParams::default()
		};
		let mut sim = Simulation::new(1, [], params);
		settle(&mut sim);
		let (x, y) = sim.position(0).unwrap();
		assert!((x - 5.0).abs() < 1e-9);
		assert!((y + 5.0).abs() < 1e-9);
	}

	#[test]
	fn cools_and_stops() {
		let mut sim = Simulation::new(4, [(0, 1), (1, 2), (2, 3)], SimulationParams::default());
		let steps = settle(&mut sim);
		assert!(steps > 250 && steps < 350, "took {steps} steps");
		assert!(sim.alpha() < sim.params().alpha_min);
		assert!(!sim.is_running());
	}

	#[test]
	fn linked_nodes_end_closer_than_unlinked() {
		let params = SimulationParams {
			link_distance: 50.0,
			charge_strength: -60.0,
			..SimulationParams::default()
		};
		// 0-1 linked, 2 floating free.
		let mut sim = Simulation::new(3, [(0, 1)], params);
		settle(&mut sim);
		assert!(distance(&sim, 0, 1) < distance(&sim, 0, 2));
		assert!(distance(&sim, 0, 1) < distance(&sim, 1, 2));
	}

	#[test]
	fn charge_pushes_unlinked_nodes_apart() {
		let mut sim = Simulation::new(2, [], SimulationParams::default());
		let before = distance(&sim, 0, 1);
		settle(&mut sim);
		assert!(distance(&sim, 0, 1) > before);
	}

	#[test]
	fn center_force_keeps_mean_at_origin() {
		let mut sim = Simulation::new(
			6,
			[(0, 1), (1, 2), (3, 4)],
			SimulationParams::default(),
		);
		settle(&mut sim);
		let n = sim.len() as f64;
		let (mx, my) = sim
			.bodies()
			.iter()
			.fold((0.0, 0.0), |(x, y), b| (x + b.x / n, y + b.y / n));
		assert!(mx.abs() < 0.5 && my.abs() < 0.5, "mean drifted to ({mx}, {my})");
	}

	#[test]
	fn pinned_body_holds_position() {
		let mut sim = Simulation::new(3, [(0, 1), (1, 2)], SimulationParams::default());
		sim.pin(1, 120.0, -40.0);
		for _ in 0..20 {
			sim.step();
		}
		assert_eq!(sim.position(1), Some((120.0, -40.0)));
		assert_eq!(sim.bodies()[1].vx, 0.0);
	}

	#[test]
	fn released_body_moves_again() {
		let mut sim = Simulation::new(3, [(0, 1), (1, 2)], SimulationParams::default());
		sim.grab(1);
		sim.pin(1, 400.0, 400.0);
		for _ in 0..5 {
			sim.tick();
		}
		sim.release(1);
		assert!(!sim.bodies()[1].is_pinned());
		sim.tick();
		assert_ne!(sim.position(1), Some((400.0, 400.0)));
	}

	#[test]
	fn drag_keeps_simulation_warm() {
		let mut sim = Simulation::new(2, [(0, 1)], SimulationParams::default());
		settle(&mut sim);
		assert!(!sim.is_running());

		sim.grab(0);
		assert!(sim.is_running());
		for _ in 0..1_000 {
			assert!(sim.tick());
		}
		let target = sim.params().drag_alpha_target;
		assert!((sim.alpha() - target).abs() < 0.01);

		sim.release(0);
		settle(&mut sim);
		assert!(!sim.is_running());
	}

	#[test]
	fn stop_is_permanent() {
		let mut sim = Simulation::new(2, [(0, 1)], SimulationParams::default());
		sim.stop();
		sim.restart();
		assert!(!sim.tick());
	}

	#[test]
	fn out_of_range_links_are_ignored() {
		let mut sim = Simulation::new(2, [(0, 1), (0, 7)], SimulationParams::default());
		settle(&mut sim);
		assert!(sim.bodies().iter().all(|b| b.x.is_finite() && b.y.is_finite()));
	}

	#[test]
	fn coincident_bodies_separate() {
		let mut sim = Simulation::new(2, [], SimulationParams::default());
		sim.bodies[1].x = sim.bodies[0].x;
		sim.bodies[1].y = sim.bodies[0].y;
		for _ in 0..10 {
			sim.step();
		}
		assert!(distance(&sim, 0, 1) > 0.0);
		assert!(sim.bodies().iter().all(|b| b.x.is_finite() && b.y.is_finite()));
	}
}
