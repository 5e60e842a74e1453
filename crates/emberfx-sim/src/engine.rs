//! Particle engine: owns every system and routes sub-emitter messages.
//!
//! `ParticleEngine` keeps its systems as entities in a hecs world, applies
//! driver commands, advances systems in insertion order and produces
//! `EngineSnapshot`s. Headless and deterministic for a given seed.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec2;
use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use emberfx_core::commands::SystemCommand;
use emberfx_core::constants::{DEFAULT_SEED, MAX_DELTA, SIMULATE_STEP};
use emberfx_core::error::ConfigIssue;
use emberfx_core::modules::{SubEmitterModule, SystemModules};
use emberfx_core::state::EngineSnapshot;
use emberfx_core::types::{SimTime, SystemId};

use crate::particle_system::{simulate_steps, ParticleSystem};
use crate::session::ParentRef;
use crate::sub_emitter::{self, SessionInstall};
use crate::systems;

/// Configuration for a new engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// RNG seed for determinism. Same seed = same particles.
    pub seed: u64,
    /// Sub-step used by `Simulate`.
    pub simulate_step: f32,
    /// Largest `dt` a single tick accepts.
    pub max_delta: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            simulate_step: SIMULATE_STEP,
            max_delta: MAX_DELTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown particle system {0}")]
    UnknownSystem(SystemId),
}

/// Display name of a system, used by scenes and snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemName(pub String);

/// The particle engine. Owns the world and every system in it.
pub struct ParticleEngine {
    world: World,
    time: SimTime,
    config: EngineConfig,
    rng: ChaCha8Rng,
    /// Advance order; systems tick in the order they were added.
    order: Vec<SystemId>,
    command_queue: VecDeque<(SystemId, SystemCommand)>,
}

impl ParticleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            order: Vec::new(),
            command_queue: VecDeque::new(),
        }
    }

    /// Add a system and return its id. Modules are sanitized on the way in;
    /// the system starts playing if its main module asks for it.
    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        modules: SystemModules,
        max_particles: usize,
    ) -> SystemId {
        let modules = modules.sanitized();
        let play_on_start = modules.main.play_on_start;
        let seed = self.rng.gen::<u64>();
        let name = name.into();

        let entity = self
            .world
            .spawn((ParticleSystem::new(modules, max_particles, seed), SystemName(name.clone())));
        let id = SystemId(entity.to_bits().get());

        if let Ok(mut system) = self.world.get::<&mut ParticleSystem>(entity) {
            system.bind(id);
            if play_on_start {
                system.play();
            }
        }
        self.order.push(id);

        log::debug!("added system '{}' as {}", name, id);
        id
    }

    /// Remove a system. Sessions it installed elsewhere lose their parent
    /// and are torn down on the target's next tick.
    pub fn remove_system(&mut self, id: SystemId) -> Result<(), EngineError> {
        let entity = self.entity(id)?;
        self.world
            .despawn(entity)
            .map_err(|_| EngineError::UnknownSystem(id))?;
        self.order.retain(|&other| other != id);
        self.command_queue.retain(|(target, _)| *target != id);
        Ok(())
    }

    /// Replace a system's modules (sanitized).
    pub fn reconfigure(&mut self, id: SystemId, modules: SystemModules) -> Result<(), EngineError> {
        self.system_mut(id)?.set_modules(modules.sanitized());
        Ok(())
    }

    pub fn system(&self, id: SystemId) -> Result<hecs::Ref<'_, ParticleSystem>, EngineError> {
        let entity = self.entity(id)?;
        self.world
            .get::<&ParticleSystem>(entity)
            .map_err(|_| EngineError::UnknownSystem(id))
    }

    pub fn system_mut(
        &self,
        id: SystemId,
    ) -> Result<hecs::RefMut<'_, ParticleSystem>, EngineError> {
        let entity = self.entity(id)?;
        self.world
            .get::<&mut ParticleSystem>(entity)
            .map_err(|_| EngineError::UnknownSystem(id))
    }

    /// Look a system up by name.
    pub fn find(&self, name: &str) -> Option<SystemId> {
        self.order.iter().copied().find(|&id| {
            self.entity(id)
                .ok()
                .and_then(|entity| self.world.get::<&SystemName>(entity).ok())
                .is_some_and(|n| n.0 == name)
        })
    }

    /// Ids of every system in advance order.
    pub fn system_ids(&self) -> &[SystemId] {
        &self.order
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only access to the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, id: SystemId, command: SystemCommand) {
        self.command_queue.push_back((id, command));
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = (SystemId, SystemCommand)>) {
        self.command_queue.extend(commands);
    }

    /// Apply a command right away.
    pub fn apply(&mut self, id: SystemId, command: SystemCommand) -> Result<(), EngineError> {
        match command {
            SystemCommand::Play => self.system_mut(id)?.play(),
            SystemCommand::Pause => {
                for target in self.cascade(id)? {
                    self.system_mut(target)?.pause();
                }
            }
            SystemCommand::Resume => {
                for target in self.cascade(id)? {
                    self.system_mut(target)?.resume();
                }
            }
            SystemCommand::Stop { clear_particles } => self.system_mut(id)?.stop(clear_particles),
            SystemCommand::Restart => self.system_mut(id)?.restart(),
            SystemCommand::Clear => self.system_mut(id)?.clear(),
            SystemCommand::Simulate { time, restart } => {
                if restart {
                    self.system_mut(id)?.reset_for_simulate();
                }
                for dt in simulate_steps(time, self.config.simulate_step) {
                    self.advance_system(id, dt)?;
                }
            }
            SystemCommand::EmitSingle => self.system_mut(id)?.emit_single(),
            SystemCommand::EmitBurst { count } => self.system_mut(id)?.emit_burst(count),
            SystemCommand::Emit { params } => self.system_mut(id)?.emit(&params),
            SystemCommand::EmitSprite {
                sprite_slot,
                uv_rect,
                count,
                interval,
            } => self.system_mut(id)?.emit_sprite(sprite_slot, uv_rect, count, interval),
            SystemCommand::SetMaxParticles { max_particles } => {
                self.system_mut(id)?.set_max_particles(max_particles)
            }
            SystemCommand::SetAttractionTarget { target } => {
                self.system_mut(id)?.set_attraction_target(target)
            }
        }

        let installs = self.system_mut(id)?.take_installs();
        self.deliver(installs);
        Ok(())
    }

    /// Advance every system by `dt` (clamped to `max_delta`) and return the
    /// resulting snapshot.
    pub fn tick(&mut self, dt: f32) -> EngineSnapshot {
        self.process_commands();

        let dt = dt.clamp(0.0, self.config.max_delta);
        let order = self.order.clone();
        for id in order {
            if let Err(err) = self.advance_system(id, dt) {
                log::warn!("skipping system during tick: {err}");
            }
        }
        self.time.advance(dt);

        self.snapshot()
    }

    /// Snapshot every system, draining their pending events.
    pub fn snapshot(&mut self) -> EngineSnapshot {
        let mut systems = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            let Ok(entity) = self.entity(id) else {
                continue;
            };
            if let Ok((system, name)) = self
                .world
                .query_one_mut::<(&mut ParticleSystem, &SystemName)>(entity)
            {
                let events = system.drain_events();
                systems.push(systems::snapshot::build_snapshot(&name.0, system, events));
            }
        }

        EngineSnapshot {
            time: self.time,
            systems,
        }
    }

    /// Advisory check of `id`'s sub-emitter entries. Never used by the runtime.
    pub fn diagnose(&self, id: SystemId) -> Result<Vec<ConfigIssue>, EngineError> {
        let modules: HashMap<SystemId, SubEmitterModule> = self
            .order
            .iter()
            .filter_map(|&other| {
                let system = self.system(other).ok()?;
                Some((other, system.modules.sub_emitters.clone()))
            })
            .collect();

        let module = modules
            .get(&id)
            .ok_or(EngineError::UnknownSystem(id))?;
        Ok(sub_emitter::diagnose(id, module, |other| modules.get(&other)))
    }

    fn process_commands(&mut self) {
        while let Some((id, command)) = self.command_queue.pop_front() {
            if let Err(err) = self.apply(id, command) {
                log::warn!("dropping queued command: {err}");
            }
        }
    }

    /// Advance one system: probe the parents its Birth sessions follow,
    /// advance it, then deliver the installs it produced.
    fn advance_system(&mut self, id: SystemId, dt: f32) -> Result<(), EngineError> {
        let parents: Vec<ParentRef> = self.system(id)?.tracked_parents().collect();

        let mut probes: HashMap<ParentRef, Vec2> = HashMap::with_capacity(parents.len());
        for parent in parents {
            let Ok(parent_system) = self.system(parent.system) else {
                continue;
            };
            if let Some(position) = parent_system.parent_position(parent.slot, parent.id) {
                probes.insert(parent, position);
            }
        }

        let installs = {
            let mut system = self.system_mut(id)?;
            system.advance(dt, &probes);
            system.take_installs()
        };
        self.deliver(installs);
        Ok(())
    }

    fn deliver(&mut self, installs: Vec<SessionInstall>) {
        for install in installs {
            match self.system_mut(install.target) {
                Ok(mut target) => target.install_session(install),
                Err(_) => log::warn!(
                    "{}: sub-emitter target {} not found",
                    install.parent.system,
                    install.target
                ),
            }
        }
    }

    /// `id` and every system reachable from it through sub-emitter entries.
    fn cascade(&self, id: SystemId) -> Result<Vec<SystemId>, EngineError> {
        self.entity(id)?;

        let mut seen = HashSet::from([id]);
        let mut pending = vec![id];
        let mut reached = Vec::new();
        while let Some(current) = pending.pop() {
            reached.push(current);
            let Ok(system) = self.system(current) else {
                continue;
            };
            if !system.modules.sub_emitters.enabled {
                continue;
            }
            for target in system.modules.sub_emitters.entries.iter().filter_map(|e| e.target) {
                if self.entity(target).is_ok() && seen.insert(target) {
                    pending.push(target);
                }
            }
        }
        Ok(reached)
    }

    fn entity(&self, id: SystemId) -> Result<Entity, EngineError> {
        Entity::from_bits(id.0)
            .filter(|&entity| self.world.contains(entity))
            .ok_or(EngineError::UnknownSystem(id))
    }
}
