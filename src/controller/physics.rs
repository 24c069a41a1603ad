use glam::{Quat, Vec3};
use rapier3d::prelude::*;

/// Ideal integration step the simulation reconciles wall-clock time against.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Cap on catch-up sub-steps per frame, bounding worst-case CPU cost when the
/// host stalls.
pub const MAX_SUBSTEPS: u32 = 3;

pub const FLOOR_Y: f32 = -2.0;
pub const BOX_HALF_EXTENTS: [f32; 3] = [1.25, 0.5, 0.1];
pub const BOX_SPAWN_Y: f32 = 3.0;

const GRAVITY_Y: f32 = -9.82;
const FRICTION: f32 = 0.1;
const RESTITUTION: f32 = 0.8;

/// Rigid-body world: one static floor, one dynamic box. Owns every rapier
/// structure exclusively; the frame loop is the only caller.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    accumulator: f32,
    box_handle: RigidBodyHandle,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Static floor: a halfspace with a +Y outward normal, so the body
        // itself carries no rotation.
        let floor = bodies.insert(
            RigidBodyBuilder::fixed().translation(vector![0.0, FLOOR_Y, 0.0]),
        );
        colliders.insert_with_parent(
            ColliderBuilder::halfspace(Vector::y_axis())
                .friction(FRICTION)
                .restitution(RESTITUTION),
            floor,
            &mut bodies,
        );

        // Dynamic box the text mesh will track
        let box_handle = bodies.insert(
            RigidBodyBuilder::dynamic().translation(vector![0.0, BOX_SPAWN_Y, 0.0]),
        );
        let [hx, hy, hz] = BOX_HALF_EXTENTS;
        colliders.insert_with_parent(
            ColliderBuilder::cuboid(hx, hy, hz)
                .mass(1.0)
                .friction(FRICTION)
                .restitution(RESTITUTION),
            box_handle,
            &mut bodies,
        );

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = FIXED_TIMESTEP;

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, GRAVITY_Y, 0.0],
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
            box_handle,
        }
    }

    /// Advance the world by `delta` seconds of wall-clock time, integrating
    /// in fixed sub-steps of [`FIXED_TIMESTEP`], at most [`MAX_SUBSTEPS`] per
    /// call. Returns the number of sub-steps taken.
    pub fn step(&mut self, delta: f32) -> u32 {
        self.accumulator += delta;

        let mut substeps = 0;
        while self.accumulator >= FIXED_TIMESTEP && substeps < MAX_SUBSTEPS {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            self.accumulator -= FIXED_TIMESTEP;
            substeps += 1;
        }

        // A long stall must not build unbounded catch-up debt
        if self.accumulator > FIXED_TIMESTEP {
            self.accumulator = FIXED_TIMESTEP;
        }

        substeps
    }

    pub fn box_position(&self) -> Vec3 {
        let t = self.bodies[self.box_handle].translation();
        Vec3::new(t.x, t.y, t.z)
    }

    pub fn box_rotation(&self) -> Quat {
        // nalgebra stores quaternion coords in (i, j, k, w) order
        let q = self.bodies[self.box_handle].rotation().coords;
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }

    pub fn box_velocity(&self) -> Vec3 {
        let v = self.bodies[self.box_handle].linvel();
        Vec3::new(v.x, v.y, v.z)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_setup() {
        let world = PhysicsWorld::new();
        assert_eq!(world.body_count(), 2);
        let pos = world.box_position();
        assert_eq!(pos, Vec3::new(0.0, BOX_SPAWN_Y, 0.0));
        assert_eq!(world.box_rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_single_substep_for_one_frame() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.step(0.0), 0, "no time accumulated, no sub-step");
        assert_eq!(world.step(FIXED_TIMESTEP), 1);
    }

    #[test]
    fn test_substeps_bounded_under_lag() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.step(10.0), MAX_SUBSTEPS);
        // Leftover debt is capped at one fixed step, not carried in full
        assert_eq!(world.step(0.0), 1);
        assert_eq!(world.step(0.0), 0);
    }

    #[test]
    fn test_box_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        for _ in 0..30 {
            world.step(FIXED_TIMESTEP);
        }
        assert!(world.box_position().y < BOX_SPAWN_Y);
        assert!(world.box_velocity().y < 0.0);
    }

    #[test]
    fn test_box_settles_on_floor() {
        let mut world = PhysicsWorld::new();
        let bottom_half_extent = BOX_HALF_EXTENTS[1];
        let mut lowest = f32::INFINITY;

        // 20 simulated seconds: enough for the restitution-0.8 bounces to
        // decay and the body to fall asleep
        for _ in 0..1200 {
            world.step(FIXED_TIMESTEP);
            lowest = lowest.min(world.box_position().y - bottom_half_extent);
        }

        let rest_y = FLOOR_Y + bottom_half_extent;
        let pos = world.box_position();
        assert!(
            (pos.y - rest_y).abs() < 0.05,
            "box should rest on the floor at y={rest_y}, got y={}",
            pos.y
        );
        assert!(
            world.box_velocity().length() < 0.05,
            "box should be at rest, velocity {:?}",
            world.box_velocity()
        );
        assert!(
            lowest > FLOOR_Y - 0.05,
            "box must not clip through the floor, lowest bottom was {lowest}"
        );
    }
}
