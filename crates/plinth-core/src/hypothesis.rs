// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pose-hypothesis bookkeeping on top of a physics world.
//!
//! [`HypothesisManager`] owns the world together with the id → body registry,
//! the durable best-pose map, and the trial-scoped candidate map. One coarse
//! `Mutex` guards all of it; every public method locks once for its whole
//! duration, so at most one trial or graph build is in flight.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use plinth_geom::{Transform, Vec3, EPSILON};
use tracing::{debug, info, instrument, warn};

use crate::body::{BodyHandle, MassProps, RigidBody};
use crate::config::AnalysisConfig;
use crate::error::SupportError;
use crate::ident::{identity_of, ObjectId};
use crate::overlap::OverlapSensor;
use crate::support::builder::SupportGraphBuilder;
use crate::support::graph::SupportGraph;
use crate::world::PhysicsWorld;

/// Which pose map a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PoseSource {
    /// Durable best poses only.
    #[default]
    Best,
    /// The in-trial candidate, falling back to the durable best pose.
    Trial,
}

/// Outcome of [`HypothesisManager::evaluate_trial`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    /// Object whose candidate pose was evaluated.
    pub object_id: ObjectId,
    /// Support graph of the settled (or timed-out) scene.
    pub graph: SupportGraph,
    /// Ticks stepped.
    pub ticks: u32,
    /// Whether every dynamic body came to rest before `max_ticks`.
    pub steady: bool,
    /// Whether the object ended up reachable from the background.
    pub ground_supported: bool,
}

/// Outcome of [`HypothesisManager::check_candidate`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    /// Object whose candidate pose was checked.
    pub object_id: ObjectId,
    /// Summed penetration depth against recognized neighbours.
    pub total_penetration_depth: f32,
    /// Summed intersecting volume against recognized neighbours.
    pub total_intersecting_volume: f32,
    /// Box volume of the candidate sub-shape in the last contact.
    pub candidate_box_volume: f32,
    /// Both totals strictly below their thresholds.
    pub accepted: bool,
}

#[derive(Debug)]
struct SceneState<W> {
    world: W,
    bodies: BTreeMap<ObjectId, BodyHandle>,
    best: BTreeMap<ObjectId, Transform>,
    trial: BTreeMap<ObjectId, Transform>,
    saved_mass: BTreeMap<ObjectId, MassProps>,
}

impl<W: PhysicsWorld> SceneState<W> {
    fn handle(&self, id: &str) -> Result<BodyHandle, SupportError> {
        self.bodies
            .get(id)
            .copied()
            .ok_or_else(|| SupportError::UnknownObject(ObjectId::new(id)))
    }

    fn body_mut(&mut self, id: &str) -> Result<&mut RigidBody, SupportError> {
        let handle = self.handle(id)?;
        self.world
            .body_mut(handle)
            .ok_or(SupportError::UnknownBody(handle))
    }

    /// Moves a body to `pose`; `snap` also brings it to rest.
    fn install(&mut self, id: &str, pose: Transform, snap: bool) -> Result<(), SupportError> {
        let body = self.body_mut(id)?;
        body.pose = pose;
        if snap {
            body.stop_motion();
        }
        Ok(())
    }

    fn best_pose(&self, id: &str, source: PoseSource) -> Result<Transform, SupportError> {
        let trial = match source {
            PoseSource::Trial => self.trial.get(id),
            PoseSource::Best => None,
        };
        trial
            .or_else(|| self.best.get(id))
            .copied()
            .ok_or_else(|| SupportError::UnknownObject(ObjectId::new(id)))
    }

    fn is_steady(&self, config: &AnalysisConfig) -> bool {
        self.world.body_handles().into_iter().all(|h| {
            self.world.body(h).is_none_or(|b| {
                b.is_static()
                    || (b.linear_velocity.length() < config.steady_linear_velocity
                        && b.angular_velocity.length() < config.steady_angular_velocity)
            })
        })
    }

    fn build(&self, config: &AnalysisConfig, time_step: f32) -> Result<SupportGraph, SupportError> {
        SupportGraphBuilder::new(config).build(&self.world, time_step)
    }
}

/// Drives pose hypotheses against a physics world.
///
/// Objects are addressed by [`ObjectId`]; [`register`](Self::register) binds
/// an id to a body handle. Best poses are durable until overwritten; trial
/// poses live until [`finish_trial`](Self::finish_trial).
#[derive(Debug)]
pub struct HypothesisManager<W> {
    config: AnalysisConfig,
    state: Mutex<SceneState<W>>,
}

impl<W: PhysicsWorld> HypothesisManager<W> {
    /// Wraps `world`; no objects are registered yet.
    pub fn new(world: W, config: AnalysisConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SceneState {
                world,
                bodies: BTreeMap::new(),
                best: BTreeMap::new(),
                trial: BTreeMap::new(),
                saved_mass: BTreeMap::new(),
            }),
        }
    }

    /// Wraps `world` and registers every active body carrying an identity.
    pub fn from_world(world: W, config: AnalysisConfig) -> Self {
        let manager = Self::new(world, config);
        if let Ok(mut state) = manager.state.lock() {
            let found: Vec<(ObjectId, BodyHandle)> = state
                .world
                .body_handles()
                .into_iter()
                .filter_map(|h| {
                    let body = state.world.body(h)?;
                    body.identity.as_ref()?;
                    Some((ObjectId::new(identity_of(body)), h))
                })
                .collect();
            state.bodies.extend(found);
        }
        manager
    }

    fn lock(&self) -> Result<MutexGuard<'_, SceneState<W>>, SupportError> {
        self.state.lock().map_err(|_| SupportError::LockPoisoned)
    }

    /// Analysis parameters.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs `f` against the world under the scene lock.
    pub fn with_world<R>(&self, f: impl FnOnce(&W) -> R) -> Result<R, SupportError> {
        let state = self.lock()?;
        Ok(f(&state.world))
    }

    /// Runs `f` against the mutable world under the scene lock.
    pub fn with_world_mut<R>(&self, f: impl FnOnce(&mut W) -> R) -> Result<R, SupportError> {
        let mut state = self.lock()?;
        Ok(f(&mut state.world))
    }

    /// Consumes the manager and returns the world.
    pub fn into_world(self) -> Result<W, SupportError> {
        self.state
            .into_inner()
            .map(|s| s.world)
            .map_err(|_| SupportError::LockPoisoned)
    }

    /// Binds `id` to the body behind `handle`, replacing any earlier binding.
    pub fn register(&self, id: impl Into<ObjectId>, handle: BodyHandle) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        if state.world.body(handle).is_none() {
            return Err(SupportError::UnknownBody(handle));
        }
        let id = id.into();
        if let Some(old) = state.bodies.insert(id.clone(), handle) {
            if old != handle {
                warn!(object = %id, %old, new = %handle, "object re-registered to a different body");
            }
        }
        Ok(())
    }

    /// All registered ids, active or detached.
    pub fn object_ids(&self) -> Result<Vec<ObjectId>, SupportError> {
        Ok(self.lock()?.bodies.keys().cloned().collect())
    }

    /// Registered ids whose bodies are in the active set.
    pub fn active_object_ids(&self) -> Result<Vec<ObjectId>, SupportError> {
        let state = self.lock()?;
        Ok(state
            .bodies
            .iter()
            .filter(|(_, h)| state.world.is_active(**h))
            .map(|(id, _)| id.clone())
            .collect())
    }

    /// Records `pose` as the trial candidate for `id` and installs it.
    ///
    /// With `reset_position` the body is snapped to the pose at rest; without
    /// it the body keeps its velocities and moves on from the new pose.
    pub fn prepare_trial(
        &self,
        id: &str,
        pose: Transform,
        reset_position: bool,
    ) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        state.install(id, pose, reset_position)?;
        state.trial.insert(ObjectId::new(id), pose);
        Ok(())
    }

    /// Snaps every object with a trial candidate to that candidate.
    pub fn prepare_with_trial_poses(&self) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let trial: Vec<(ObjectId, Transform)> =
            state.trial.iter().map(|(k, v)| (k.clone(), *v)).collect();
        for (id, pose) in trial {
            state.install(id.as_str(), pose, true)?;
        }
        Ok(())
    }

    /// Clears every trial candidate.
    pub fn finish_trial(&self) -> Result<(), SupportError> {
        self.lock()?.trial.clear();
        Ok(())
    }

    /// Overwrites the durable best pose of `id`.
    pub fn record_best_pose(&self, id: impl Into<ObjectId>, pose: Transform) -> Result<(), SupportError> {
        self.lock()?.best.insert(id.into(), pose);
        Ok(())
    }

    /// Overwrites durable best poses for every entry of `poses`.
    pub fn record_best_poses(
        &self,
        poses: impl IntoIterator<Item = (ObjectId, Transform)>,
    ) -> Result<(), SupportError> {
        self.lock()?.best.extend(poses);
        Ok(())
    }

    /// Pose of `id` from `source`; unknown ids are an error.
    pub fn best_pose(&self, id: &str, source: PoseSource) -> Result<Transform, SupportError> {
        self.lock()?.best_pose(id, source)
    }

    /// Poses for every id in `ids`; fails without a partial map if any is unknown.
    pub fn best_poses_for<S: AsRef<str>>(
        &self,
        ids: &[S],
        source: PoseSource,
    ) -> Result<BTreeMap<ObjectId, Transform>, SupportError> {
        let state = self.lock()?;
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                state.best_pose(id, source).map(|p| (ObjectId::new(id), p))
            })
            .collect()
    }

    /// Detaches every registered body except the background.
    pub fn detach_all(&self) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let handles: Vec<BodyHandle> = state
            .bodies
            .iter()
            .filter(|(id, _)| !id.is_background())
            .map(|(_, h)| *h)
            .collect();
        for h in handles {
            state.world.set_active(h, false);
        }
        Ok(())
    }

    /// Detaches the named bodies; body state is kept for a later attach.
    pub fn detach<S: AsRef<str>>(&self, ids: &[S]) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let handles = ids
            .iter()
            .map(|id| state.handle(id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for h in handles {
            state.world.set_active(h, false);
        }
        Ok(())
    }

    /// Reattaches `id` at rest at `pose`.
    pub fn attach(&self, id: &str, pose: Transform) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let handle = state.handle(id)?;
        state.install(id, pose, true)?;
        state.world.set_active(handle, true);
        Ok(())
    }

    /// Reattaches every entry of `poses`; unknown ids abort before any change.
    pub fn attach_many(&self, poses: &BTreeMap<ObjectId, Transform>) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        for id in poses.keys() {
            state.handle(id.as_str())?;
        }
        for (id, pose) in poses {
            let handle = state.handle(id.as_str())?;
            state.install(id.as_str(), *pose, true)?;
            state.world.set_active(handle, true);
        }
        Ok(())
    }

    /// Freezes `id` in place, or restores the mass it had before freezing.
    pub fn set_static(&self, id: &str, make_static: bool) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let key = ObjectId::new(id);
        if make_static {
            let body = state.body_mut(id)?;
            let original = body.mass;
            body.mass = MassProps::default();
            body.stop_motion();
            state.saved_mass.entry(key).or_insert(original);
        } else if let Some(original) = state.saved_mass.remove(id) {
            state.body_mut(id)?.mass = original;
        } else {
            // Validate the id even when there is nothing to restore.
            state.handle(id)?;
        }
        Ok(())
    }

    /// Sets the flag that tells the world to skip external forces on `id`.
    pub fn set_ignore_external_forces(&self, id: &str, ignore: bool) -> Result<(), SupportError> {
        self.lock()?.body_mut(id)?.ignore_external_forces = ignore;
        Ok(())
    }

    /// World poses of all active registered bodies.
    pub fn current_poses(&self) -> Result<BTreeMap<ObjectId, Transform>, SupportError> {
        let state = self.lock()?;
        Ok(state
            .bodies
            .iter()
            .filter(|(_, h)| state.world.is_active(**h))
            .filter_map(|(id, h)| state.world.body(*h).map(|b| (id.clone(), b.pose)))
            .collect())
    }

    /// Stops every registered body; with `reset_pose`, also moves each id in
    /// `targets` to its target pose.
    pub fn reset_motion_state(
        &self,
        reset_pose: bool,
        targets: &BTreeMap<ObjectId, Transform>,
    ) -> Result<(), SupportError> {
        let mut state = self.lock()?;
        let ids: Vec<ObjectId> = state.bodies.keys().cloned().collect();
        for id in ids {
            let target = if reset_pose { targets.get(&id).copied() } else { None };
            let body = state.body_mut(id.as_str())?;
            body.stop_motion();
            if let Some(pose) = target {
                body.pose = pose;
            }
        }
        Ok(())
    }

    /// Points gravity along `direction`, scaled to the configured magnitude.
    ///
    /// A zero-length direction leaves gravity unchanged.
    pub fn set_gravity_direction(&self, direction: Vec3) -> Result<(), SupportError> {
        if direction.length() <= EPSILON {
            warn!("ignoring zero-length gravity direction");
            return Ok(());
        }
        let gravity = direction.normalize().scale(self.config.gravity_magnitude);
        debug!(?gravity, "gravity updated");
        self.lock()?.world.set_gravity(gravity);
        Ok(())
    }

    /// Uses the negated local +Y axis of `frame` as the gravity direction.
    pub fn set_gravity_from_up_frame(&self, frame: &Transform) -> Result<(), SupportError> {
        let up = frame.rotation().axes()[1];
        self.set_gravity_direction(up.neg())
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Result<Vec3, SupportError> {
        Ok(self.lock()?.world.gravity())
    }

    /// Support graph of the world's last tick.
    pub fn support_graph(&self, time_step: f32) -> Result<SupportGraph, SupportError> {
        self.lock()?.build(&self.config, time_step)
    }

    /// Steps the world once, then builds the support graph.
    pub fn updated_support_graph(&self, time_step: f32) -> Result<SupportGraph, SupportError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(SupportError::InvalidTimeStep(time_step));
        }
        let mut state = self.lock()?;
        state.world.step(time_step);
        state.build(&self.config, time_step)
    }

    /// Snaps `id` to `pose`, simulates until the scene settles or
    /// `max_ticks` elapse, and reports the resulting support graph.
    #[instrument(skip(self, pose))]
    pub fn evaluate_trial(
        &self,
        id: &str,
        pose: Transform,
        time_step: f32,
    ) -> Result<TrialReport, SupportError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(SupportError::InvalidTimeStep(time_step));
        }
        let mut state = self.lock()?;
        state.install(id, pose, true)?;
        state.trial.insert(ObjectId::new(id), pose);

        let mut ticks = 0;
        let mut steady = false;
        while ticks < self.config.max_ticks {
            state.world.step(time_step);
            ticks += 1;
            if state.is_steady(&self.config) {
                steady = true;
                break;
            }
        }

        let graph = state.build(&self.config, time_step)?;
        let ground_supported = graph.is_ground_supported(id)?;
        info!(ticks, steady, ground_supported, "trial evaluated");
        Ok(TrialReport {
            object_id: ObjectId::new(id),
            graph,
            ticks,
            steady,
            ground_supported,
        })
    }

    /// Snaps `id` to `pose` and measures its overlap with recognized neighbours.
    pub fn check_candidate(
        &self,
        id: &str,
        pose: Transform,
        max_depth: f32,
        max_volume: f32,
    ) -> Result<OverlapReport, SupportError> {
        let mut state = self.lock()?;
        let handle = state.handle(id)?;
        state.install(id, pose, true)?;
        let mut sensor = OverlapSensor::new(handle, id);
        sensor.measure(&state.world);
        let accepted = sensor.within_threshold(max_depth, max_volume);
        debug!(
            object = id,
            depth = sensor.total_penetration_depth(),
            volume = sensor.total_intersecting_volume(),
            accepted,
            "candidate overlap"
        );
        Ok(OverlapReport {
            object_id: ObjectId::new(id),
            total_penetration_depth: sensor.total_penetration_depth(),
            total_intersecting_volume: sensor.total_intersecting_volume(),
            candidate_box_volume: sensor.candidate_box_volume(),
            accepted,
        })
    }

    /// [`check_candidate`](Self::check_candidate) with the configured thresholds.
    pub fn check_candidate_default(
        &self,
        id: &str,
        pose: Transform,
    ) -> Result<OverlapReport, SupportError> {
        self.check_candidate(
            id,
            pose,
            self.config.max_penetration_depth,
            self.config.max_intersecting_volume,
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::world::SnapshotWorld;
    use plinth_geom::{Quat, Shape};

    fn manager() -> HypothesisManager<SnapshotWorld> {
        let mut world = SnapshotWorld::default();
        world.insert(
            RigidBody::new(Shape::Sphere { radius: 1.0 }, Transform::identity(), 0.0)
                .with_identity("background"),
        );
        world.insert(
            RigidBody::new(Shape::Sphere { radius: 0.1 }, Transform::identity(), 2.0)
                .with_identity("mug"),
        );
        HypothesisManager::from_world(world, AnalysisConfig::default())
    }

    #[test]
    fn from_world_registers_identified_bodies() {
        let m = manager();
        let ids = m.object_ids().expect("ids");
        assert_eq!(ids, vec![ObjectId::from("background"), ObjectId::from("mug")]);
    }

    #[test]
    fn trial_pose_shadows_best_pose_until_finished() {
        let m = manager();
        let best = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let trial = Transform::from_translation(Vec3::new(2.0, 0.0, 0.0));
        m.record_best_pose("mug", best).expect("record");
        m.prepare_trial("mug", trial, true).expect("prepare");
        assert_eq!(m.best_pose("mug", PoseSource::Trial), Ok(trial));
        assert_eq!(m.best_pose("mug", PoseSource::Best), Ok(best));
        m.finish_trial().expect("finish");
        assert_eq!(m.best_pose("mug", PoseSource::Trial), Ok(best));
    }

    #[test]
    fn prepare_without_reset_keeps_velocity() {
        let m = manager();
        m.with_world_mut(|w| {
            if let Some(b) = w.body_mut(BodyHandle(1)) {
                b.linear_velocity = Vec3::new(0.0, 0.0, -1.0);
            }
        })
        .expect("lock");
        m.prepare_trial("mug", Transform::identity(), false).expect("prepare");
        let v = m
            .with_world(|w| w.body(BodyHandle(1)).map(|b| b.linear_velocity))
            .expect("lock");
        assert_eq!(v, Some(Vec3::new(0.0, 0.0, -1.0)));
        m.prepare_trial("mug", Transform::identity(), true).expect("prepare");
        let v = m
            .with_world(|w| w.body(BodyHandle(1)).map(|b| b.linear_velocity))
            .expect("lock");
        assert_eq!(v, Some(Vec3::ZERO));
    }

    #[test]
    fn gravity_from_up_frame_points_down_its_y_axis() {
        let m = manager();
        let frame = Transform::new(
            Vec3::ZERO,
            Quat::from_axis_angle(Vec3::UNIT_X, core::f32::consts::FRAC_PI_2),
        );
        m.set_gravity_from_up_frame(&frame).expect("gravity");
        let g = m.gravity().expect("gravity");
        // +Y rotated a quarter turn about X is +Z, so gravity points along -Z.
        assert!(g.sub(&Vec3::new(0.0, 0.0, -9.81)).length() < 1e-4);
    }

    #[test]
    fn zero_direction_leaves_gravity_alone() {
        let m = manager();
        let before = m.gravity().expect("gravity");
        m.set_gravity_direction(Vec3::ZERO).expect("gravity");
        assert_eq!(m.gravity(), Ok(before));
    }

    #[test]
    fn register_rejects_unknown_handle() {
        let m = manager();
        assert_eq!(
            m.register("ghost", BodyHandle(42)),
            Err(SupportError::UnknownBody(BodyHandle(42)))
        );
    }
}
