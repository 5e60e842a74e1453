//! One particle system: store, sessions, spread cursor and RNG, driven by
//! an explicit `advance(dt)`.

use glam::{Vec2, Vec4};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use emberfx_core::commands::EmitParams;
use emberfx_core::constants::{CENTER_SPREAD, SUB_EMITTER_DEPTH};
use emberfx_core::enums::{InheritFlags, PlaybackState, SessionEndReason, SubEmitterKind};
use emberfx_core::events::ParticleEvent;
use emberfx_core::modules::SystemModules;
use emberfx_core::types::{Color, SystemId};

use crate::session::{EmissionSession, EmissionStep, ParentRef, SubEmitterLink};
use crate::shape::{BurstIndex, SpreadCursor};
use crate::store::{Particle, ParticleStore};
use crate::sub_emitter::{self, ParentLookup, SessionInstall, TriggerSource};
use crate::systems::emission::{self, SpawnOrigin, SpriteStamp};
use crate::systems::lifecycle;

/// Id of a system not yet registered with an engine. Never a valid entity.
pub const UNBOUND: SystemId = SystemId(0);

pub struct ParticleSystem {
    id: SystemId,
    /// Externally owned configuration, read every tick.
    pub modules: SystemModules,
    store: ParticleStore,
    seed: u64,
    rng: ChaCha8Rng,
    playing: bool,
    paused: bool,
    /// Own timeline; `None` when not emitting on its own.
    own: Option<EmissionSession>,
    /// Sessions installed by parent systems.
    sessions: Vec<EmissionSession>,
    depth: u8,
    spread: SpreadCursor,
    attraction_target: Option<Vec2>,
    next_session_id: u32,
    /// Installs for other systems, collected by the engine.
    outbox: Vec<SessionInstall>,
    events: Vec<ParticleEvent>,
    death_buffer: Vec<(usize, Particle)>,
    sprite_streams: Vec<SpriteStream>,
}

/// Sprite particles still waiting to leave, one every `interval` seconds.
#[derive(Debug, Clone, Copy)]
struct SpriteStream {
    stamp: SpriteStamp,
    remaining: u32,
    interval: f32,
    timer: f32,
}

impl ParticleSystem {
    pub fn new(modules: SystemModules, max_particles: usize, seed: u64) -> Self {
        Self {
            id: UNBOUND,
            modules,
            store: ParticleStore::new(max_particles),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            playing: false,
            paused: false,
            own: None,
            sessions: Vec::new(),
            depth: 0,
            spread: SpreadCursor::default(),
            attraction_target: None,
            next_session_id: 0,
            outbox: Vec::new(),
            events: Vec::new(),
            death_buffer: Vec::new(),
            sprite_streams: Vec::new(),
        }
    }

    pub(crate) fn bind(&mut self, id: SystemId) {
        self.id = id;
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    // --- Playback ---

    /// Start the own timeline from zero. The first tick emits immediately.
    pub fn play(&mut self) {
        let main = &self.modules.main;
        let mut own = EmissionSession::own(main.duration, main.looping);
        own.rate_accumulator = 1.0;
        self.own = Some(own);
        self.playing = true;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Stop own emission and drop hosted sessions. Sessions this system
    /// installed elsewhere are left to run out on their own.
    pub fn stop(&mut self, clear_particles: bool) {
        self.playing = false;
        self.paused = false;
        self.own = None;
        self.sprite_streams.clear();
        self.end_sessions(SessionEndReason::Stopped);
        self.depth = 0;
        if clear_particles {
            self.clear();
        }
    }

    pub fn restart(&mut self) {
        self.stop(true);
        self.play();
    }

    /// Kill every live particle. Sessions keep running.
    pub fn clear(&mut self) {
        self.detach_sprites();
        self.store.clear();
        self.events.push(ParticleEvent::ParticlesCleared);
    }

    /// Return to a fresh start with the original seed, then play.
    pub fn reset_for_simulate(&mut self) {
        self.stop(true);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.spread.reset();
        self.play();
    }

    /// Advance `time` seconds in `step`-sized sub-steps.
    pub fn simulate(&mut self, time: f32, restart: bool, step: f32, parents: &impl ParentLookup) {
        if restart {
            self.reset_for_simulate();
        }
        for dt in simulate_steps(time, step) {
            self.advance(dt, parents);
        }
    }

    // --- Runtime settings ---

    /// Reallocate the store. Every session restarts since stored slot
    /// references no longer apply.
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.detach_sprites();
        self.store.rebuild(max_particles);
        self.end_sessions(SessionEndReason::Stopped);
        self.depth = 0;
        if let Some(own) = self.own.as_mut() {
            own.play_time = 0.0;
            own.rate_accumulator = 0.0;
            own.reset_bursts();
        }
        log::info!(
            "{}: particle store rebuilt with capacity {}",
            self.id,
            self.store.capacity()
        );
        self.events.push(ParticleEvent::StoreRebuilt {
            capacity: self.store.capacity(),
        });
    }

    pub fn set_attraction_target(&mut self, target: Option<Vec2>) {
        self.attraction_target = target;
    }

    pub fn set_modules(&mut self, modules: SystemModules) {
        self.modules = modules;
    }

    // --- Manual emission ---

    pub fn emit_single(&mut self) {
        let origin = self.own_origin();
        self.spawn(&origin, None, None);
    }

    /// Emit `count` particles as one group.
    pub fn emit_burst(&mut self, count: u32) {
        let origin = self.own_origin();
        self.spawn_group(&origin, count, None);
    }

    /// Emit one particle exactly as described.
    pub fn emit(&mut self, params: &EmitParams) {
        let particle = emission::particle_from_params(params, &mut self.rng);
        self.install_particle(particle);
    }

    /// Emit `count` particles stamped for the renderer's sprite `sprite_slot`.
    ///
    /// A positive `interval` spaces them out: the first leaves now, the rest
    /// follow from `advance`. Stopping drops the ones not yet emitted.
    pub fn emit_sprite(&mut self, sprite_slot: i32, uv_rect: Vec4, count: u32, interval: f32) {
        if count == 0 {
            return;
        }
        let origin = self.own_origin();
        let stamp = SpriteStamp {
            sprite_slot,
            uv_rect,
        };
        if interval <= 0.0 {
            self.spawn_group(&origin, count, Some(stamp));
            return;
        }

        self.spawn(&origin, None, Some(stamp));
        if count > 1 {
            self.sprite_streams.push(SpriteStream {
                stamp,
                remaining: count - 1,
                interval,
                timer: interval,
            });
        }
    }

    /// Sprite particles queued by interval emission and not yet emitted.
    pub fn pending_sprites(&self) -> u32 {
        self.sprite_streams.iter().map(|s| s.remaining).sum()
    }

    // --- Sub-emitter plumbing ---

    /// Host a session requested by a parent system.
    pub fn install_session(&mut self, install: SessionInstall) {
        let session_id = self.next_session_id;
        self.next_session_id = self.next_session_id.wrapping_add(1);

        let main = &self.modules.main;
        let link = SubEmitterLink {
            session_id,
            kind: install.kind,
            parent: install.parent,
            flags: install.flags,
            base_position: install.position,
            inherited: install.inherited,
        };
        self.sessions
            .push(EmissionSession::sub_emitter(main.duration, main.looping, link));
        self.depth = SUB_EMITTER_DEPTH;

        log::debug!(
            "{}: installed {:?} session {} from {}",
            self.id,
            install.kind,
            session_id,
            install.parent.system
        );
        self.events.push(ParticleEvent::SessionInstalled {
            session_id,
            kind: install.kind,
            parent: install.parent.system,
        });
    }

    /// Parents that hosted Birth sessions need to be probed before advancing.
    pub fn tracked_parents(&self) -> impl Iterator<Item = ParentRef> + '_ {
        self.sessions
            .iter()
            .filter_map(|s| s.link.as_ref())
            .filter(|link| link.tracks_parent())
            .map(|link| link.parent)
    }

    /// Position of the particle at `slot` if it is still the one stamped `id`.
    pub fn parent_position(&self, slot: usize, id: u32) -> Option<Vec2> {
        self.store
            .get(slot)
            .filter(|p| p.id == id)
            .map(|p| p.position)
    }

    /// Installs produced since the last call.
    pub fn take_installs(&mut self) -> Vec<SessionInstall> {
        std::mem::take(&mut self.outbox)
    }

    /// Events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ParticleEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Tick ---

    /// Run one tick: emission for every session, then the lifecycle pass.
    /// A paused system does nothing.
    pub fn advance(&mut self, dt: f32, parents: &impl ParentLookup) {
        if self.paused {
            return;
        }

        if self.depth > 0 && self.sessions.is_empty() && self.store.active_count() == 0 {
            log::debug!("{}: back to depth 0", self.id);
            self.depth = 0;
        }

        if self.depth == 0 {
            self.advance_own(dt);
        }
        self.advance_sessions(dt, parents);
        self.advance_sprite_streams(dt);

        let mut deaths = std::mem::take(&mut self.death_buffer);
        deaths.clear();
        lifecycle::run(
            &mut self.store,
            &self.modules,
            self.attraction_target,
            dt,
            &mut deaths,
        );
        for (slot, particle) in &deaths {
            if particle.sprite_slot >= 0 {
                self.events.push(ParticleEvent::SpriteDetached {
                    slot: *slot as u32,
                    sprite_slot: particle.sprite_slot,
                });
            }
            self.fire(SubEmitterKind::Death, *slot, particle);
        }
        self.death_buffer = deaths;

        // A finished timeline keeps the system playing until its last
        // particle is gone.
        if self.playing && self.own.is_none() && self.store.active_count() == 0 {
            self.playing = false;
        }
    }

    fn advance_own(&mut self, dt: f32) {
        let Some(mut own) = self.own.take() else {
            return;
        };
        own.duration = self.modules.main.duration;
        own.looping = self.modules.main.looping;

        match own.step(dt, &self.modules.emission, &mut self.rng) {
            Some(step) => {
                let origin = SpawnOrigin::at(self.pivot(), own.normalized_time());
                self.own = Some(own);
                self.emit_step(&step, &origin);
            }
            None => log::debug!("{}: own timeline finished", self.id),
        }
    }

    fn advance_sessions(&mut self, dt: f32, parents: &impl ParentLookup) {
        let sessions = std::mem::take(&mut self.sessions);
        let mut kept = Vec::with_capacity(sessions.len());

        for mut session in sessions {
            let Some(link) = session.link.as_mut() else {
                continue;
            };

            if link.tracks_parent() {
                match parents.parent_position(&link.parent) {
                    Some(position) => {
                        if link.flags.contains(InheritFlags::POSITION) {
                            link.base_position = position;
                        }
                    }
                    None => {
                        self.session_ended(link.session_id, SessionEndReason::ParentLost);
                        continue;
                    }
                }
            }

            let session_id = link.session_id;
            match session.step(dt, &self.modules.emission, &mut self.rng) {
                Some(step) => {
                    if let Some(origin) = session_origin(&session) {
                        self.emit_step(&step, &origin);
                    }
                    kept.push(session);
                }
                None => self.session_ended(session_id, SessionEndReason::Expired),
            }
        }

        self.sessions = kept;
    }

    fn advance_sprite_streams(&mut self, dt: f32) {
        if self.sprite_streams.is_empty() {
            return;
        }
        let mut streams = std::mem::take(&mut self.sprite_streams);
        for stream in &mut streams {
            stream.timer -= dt;
            while stream.timer <= 0.0 && stream.remaining > 0 {
                let origin = self.own_origin();
                self.spawn(&origin, None, Some(stream.stamp));
                stream.remaining -= 1;
                stream.timer += stream.interval;
            }
        }
        streams.retain(|stream| stream.remaining > 0);
        self.sprite_streams = streams;
    }

    fn emit_step(&mut self, step: &EmissionStep, origin: &SpawnOrigin) {
        for _ in 0..step.rate {
            self.spawn(origin, None, None);
        }
        for &count in &step.bursts {
            self.spawn_group(origin, count, None);
        }
    }

    fn spawn_group(&mut self, origin: &SpawnOrigin, count: u32, sprite: Option<SpriteStamp>) {
        for index in 0..count {
            self.spawn(origin, Some(BurstIndex { index, count }), sprite);
        }
    }

    fn spawn(
        &mut self,
        origin: &SpawnOrigin,
        burst: Option<BurstIndex>,
        sprite: Option<SpriteStamp>,
    ) -> Option<usize> {
        let particle = emission::build_particle(
            &self.modules,
            &mut self.spread,
            origin,
            burst,
            sprite,
            &mut self.rng,
        );
        self.install_particle(particle)
    }

    fn install_particle(&mut self, particle: Particle) -> Option<usize> {
        let slot = self.store.try_spawn(particle)?;
        if let Some(spawned) = self.store.get(slot).copied() {
            self.fire(SubEmitterKind::Birth, slot, &spawned);
        }
        Some(slot)
    }

    fn fire(&mut self, kind: SubEmitterKind, slot: usize, particle: &Particle) {
        let source = TriggerSource {
            system: self.id,
            module: &self.modules.sub_emitters,
            depth: self.depth,
            base_size: self
                .modules
                .main
                .start_size
                .evaluate(self.own_normalized_time(), CENTER_SPREAD),
        };
        sub_emitter::trigger(kind, &source, slot, particle, &mut self.outbox);
    }

    fn end_sessions(&mut self, reason: SessionEndReason) {
        for session in std::mem::take(&mut self.sessions) {
            if let Some(link) = session.link {
                self.session_ended(link.session_id, reason);
            }
        }
    }

    fn session_ended(&mut self, session_id: u32, reason: SessionEndReason) {
        log::debug!("{}: session {} ended ({:?})", self.id, session_id, reason);
        self.events
            .push(ParticleEvent::SessionEnded { session_id, reason });
    }

    fn detach_sprites(&mut self) {
        for (slot, particle) in self.store.iter_alive() {
            if particle.sprite_slot >= 0 {
                self.events.push(ParticleEvent::SpriteDetached {
                    slot: slot as u32,
                    sprite_slot: particle.sprite_slot,
                });
            }
        }
    }

    fn pivot(&self) -> Vec2 {
        self.modules.shape.pivot.unwrap_or(Vec2::ZERO)
    }

    fn own_normalized_time(&self) -> f32 {
        self.own.as_ref().map_or(0.0, EmissionSession::normalized_time)
    }

    fn own_origin(&self) -> SpawnOrigin {
        SpawnOrigin::at(self.pivot(), self.own_normalized_time())
    }

    // --- Accessors ---

    pub fn playback(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Own timeline position, 0 when not playing.
    pub fn play_time(&self) -> f32 {
        self.own.as_ref().map_or(0.0, |s| s.play_time)
    }

    pub fn own_session(&self) -> Option<&EmissionSession> {
        self.own.as_ref()
    }

    /// Sessions hosted for parent systems.
    pub fn sessions(&self) -> &[EmissionSession] {
        &self.sessions
    }

    pub fn spread_cursor(&self) -> &SpreadCursor {
        &self.spread
    }

    pub fn spread_cursor_mut(&mut self) -> &mut SpreadCursor {
        &mut self.spread
    }

    pub fn attraction_target(&self) -> Option<Vec2> {
        self.attraction_target
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    pub fn is_alive(&self, slot: usize) -> bool {
        self.store.get(slot).is_some()
    }

    pub fn particle(&self, slot: usize) -> Option<&Particle> {
        self.store.get(slot)
    }

    pub fn position(&self, slot: usize) -> Option<Vec2> {
        self.store.get(slot).map(|p| p.position)
    }

    pub fn velocity(&self, slot: usize) -> Option<Vec2> {
        self.store.get(slot).map(|p| p.velocity)
    }

    pub fn color(&self, slot: usize) -> Option<Color> {
        self.store.get(slot).map(|p| p.color)
    }

    pub fn size(&self, slot: usize) -> Option<f32> {
        self.store.get(slot).map(|p| p.size)
    }

    pub fn rotation(&self, slot: usize) -> Option<f32> {
        self.store.get(slot).map(|p| p.rotation)
    }

    pub fn sprite_slot(&self, slot: usize) -> Option<i32> {
        self.store.get(slot).map(|p| p.sprite_slot)
    }

    pub fn uv_rect(&self, slot: usize) -> Option<Vec4> {
        self.store.get(slot).map(|p| p.uv_rect)
    }
}

fn session_origin(session: &EmissionSession) -> Option<SpawnOrigin> {
    let link = session.link.as_ref()?;
    Some(SpawnOrigin {
        normalized_time: session.normalized_time(),
        base_position: link.base_position,
        inherit: Some((link.flags, link.inherited)),
    })
}

/// Sub-step lengths covering `time` seconds, each at most `step`.
pub fn simulate_steps(time: f32, step: f32) -> impl Iterator<Item = f32> {
    let step = step.max(f32::EPSILON);
    let mut remaining = time.max(0.0);
    std::iter::from_fn(move || {
        if remaining <= 0.0 {
            return None;
        }
        let dt = remaining.min(step);
        remaining -= dt;
        Some(dt)
    })
}

#[cfg(test)]
mod tests {
    use emberfx_core::curves::MinMaxCurve;
    use emberfx_core::modules::BurstEntry;

    use crate::sub_emitter::NoParents;

    use super::*;

    fn quiet_modules() -> SystemModules {
        let mut modules = SystemModules::default();
        modules.emission.enabled = false;
        modules.main.start_lifetime = MinMaxCurve::constant(1.0);
        modules
    }

    #[test]
    fn play_emits_on_first_tick() {
        let mut modules = quiet_modules();
        modules.emission.enabled = true;
        modules.emission.rate_over_time = 0.0;
        let mut system = ParticleSystem::new(modules, 16, 1);
        system.play();
        system.advance(0.016, &NoParents);
        assert_eq!(system.active_count(), 1);
    }

    #[test]
    fn paused_system_is_frozen() {
        let mut system = ParticleSystem::new(quiet_modules(), 16, 2);
        system.emit_burst(3);
        let before = system.particle(0).copied();
        system.pause();
        system.advance(0.1, &NoParents);
        assert_eq!(system.particle(0).copied(), before);
        assert_eq!(system.playback(), PlaybackState::Paused);

        system.resume();
        system.advance(0.1, &NoParents);
        assert_ne!(system.particle(0).copied(), before);
    }

    #[test]
    fn stopped_system_keeps_aging_particles() {
        let mut system = ParticleSystem::new(quiet_modules(), 16, 3);
        system.play();
        system.emit_burst(4);
        system.stop(false);
        assert_eq!(system.active_count(), 4);

        for _ in 0..60 {
            system.advance(0.02, &NoParents);
        }
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn non_looping_timeline_stops_playing() {
        let mut modules = quiet_modules();
        modules.main.looping = false;
        modules.main.duration = 0.1;
        let mut system = ParticleSystem::new(modules, 16, 4);
        system.play();
        for _ in 0..10 {
            system.advance(0.02, &NoParents);
        }
        assert!(!system.is_playing());
        assert!(system.own_session().is_none());
    }

    #[test]
    fn clear_twice_is_fine() {
        let mut system = ParticleSystem::new(quiet_modules(), 16, 5);
        system.emit_burst(5);
        system.clear();
        assert_eq!(system.active_count(), 0);
        system.clear();
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn emit_uses_explicit_state() {
        let mut system = ParticleSystem::new(quiet_modules(), 4, 6);
        system.emit(&EmitParams {
            position: Vec2::new(1.0, 2.0),
            size: 42.0,
            ..Default::default()
        });
        assert_eq!(system.position(0), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(system.size(0), Some(42.0));
        assert_eq!(system.sprite_slot(0), Some(-1));
        assert!(system.is_alive(0));
        assert!(!system.is_alive(1));
    }

    #[test]
    fn sprite_particles_report_detach_on_death() {
        let mut system = ParticleSystem::new(quiet_modules(), 4, 7);
        system.emit_sprite(9, Vec4::new(0.0, 0.0, 0.25, 0.25), 1, 0.0);
        assert_eq!(system.sprite_slot(0), Some(9));
        system.drain_events();

        system.advance(2.0, &NoParents);
        assert_eq!(
            system.drain_events(),
            vec![ParticleEvent::SpriteDetached {
                slot: 0,
                sprite_slot: 9
            }]
        );
    }

    #[test]
    fn sprite_interval_spaces_out_emission() {
        let mut modules = quiet_modules();
        modules.main.start_lifetime = MinMaxCurve::constant(10.0);
        let uv = Vec4::new(0.5, 0.0, 0.5, 0.5);
        let mut system = ParticleSystem::new(modules, 8, 11);

        system.emit_sprite(4, uv, 3, 0.5);
        assert_eq!(system.active_count(), 1);
        assert_eq!(system.pending_sprites(), 2);

        system.advance(0.25, &NoParents);
        assert_eq!(system.active_count(), 1);
        system.advance(0.25, &NoParents);
        assert_eq!(system.active_count(), 2);
        system.advance(0.5, &NoParents);
        assert_eq!(system.active_count(), 3);
        assert_eq!(system.pending_sprites(), 0);

        system.advance(0.5, &NoParents);
        assert_eq!(system.active_count(), 3);
        for slot in 0..3 {
            assert_eq!(system.sprite_slot(slot), Some(4));
            assert_eq!(system.uv_rect(slot), Some(uv));
        }
    }

    #[test]
    fn stop_drops_pending_sprites() {
        let mut system = ParticleSystem::new(quiet_modules(), 8, 12);
        system.emit_sprite(2, Vec4::ONE, 5, 0.1);
        system.stop(false);
        assert_eq!(system.pending_sprites(), 0);

        system.advance(0.5, &NoParents);
        assert_eq!(system.active_count(), 1);
    }

    #[test]
    fn finished_timeline_plays_until_particles_die() {
        let mut modules = quiet_modules();
        modules.main.looping = false;
        modules.main.duration = 0.1;
        let mut system = ParticleSystem::new(modules, 16, 13);
        system.play();
        system.emit_burst(2);

        for _ in 0..10 {
            system.advance(0.02, &NoParents);
        }
        assert!(system.own_session().is_none());
        assert!(system.is_playing());
        assert_eq!(system.active_count(), 2);

        for _ in 0..45 {
            system.advance(0.02, &NoParents);
        }
        assert_eq!(system.active_count(), 0);
        assert!(!system.is_playing());
        assert_eq!(system.playback(), PlaybackState::Stopped);
    }

    #[test]
    fn set_max_particles_rebuilds_store() {
        let mut system = ParticleSystem::new(quiet_modules(), 4, 8);
        system.emit_burst(4);
        system.set_max_particles(0);
        assert_eq!(system.capacity(), 1);
        assert_eq!(system.active_count(), 0);
        assert!(system
            .drain_events()
            .contains(&ParticleEvent::StoreRebuilt { capacity: 1 }));
    }

    #[test]
    fn simulate_with_restart_is_reproducible() {
        let mut modules = quiet_modules();
        modules.emission.enabled = true;
        modules.emission.bursts.push(BurstEntry::new(0.2, 6.0, 0, 0.3));
        let mut system = ParticleSystem::new(modules, 64, 9);

        system.simulate(1.3, true, 0.02, &NoParents);
        let first: Vec<(Vec2, f32)> = system
            .store()
            .iter_alive()
            .map(|(_, p)| (p.position, p.size))
            .collect();

        system.simulate(0.7, false, 0.02, &NoParents);
        system.simulate(1.3, true, 0.02, &NoParents);
        let second: Vec<(Vec2, f32)> = system
            .store()
            .iter_alive()
            .map(|(_, p)| (p.position, p.size))
            .collect();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn simulate_steps_cover_time() {
        let steps: Vec<f32> = simulate_steps(0.05, 0.02).collect();
        assert_eq!(steps.len(), 3);
        assert!((steps.iter().sum::<f32>() - 0.05).abs() < 1e-6);
        assert_eq!(simulate_steps(0.0, 0.02).count(), 0);
    }

    #[test]
    fn install_session_enters_sub_emitter_depth() {
        let mut system = ParticleSystem::new(quiet_modules(), 16, 10);
        system.play();
        system.install_session(SessionInstall {
            target: UNBOUND,
            kind: SubEmitterKind::Death,
            parent: ParentRef {
                system: SystemId(5),
                slot: 0,
                id: 1,
            },
            flags: InheritFlags::POSITION,
            position: Vec2::new(7.0, 7.0),
            inherited: Default::default(),
        });
        assert_eq!(system.depth(), SUB_EMITTER_DEPTH);
        assert_eq!(system.sessions().len(), 1);

        // Own emission is suspended while hosting.
        system.advance(0.02, &NoParents);
        assert_eq!(system.active_count(), 0);
        assert_eq!(system.sessions().len(), 1, "death sessions never poll parents");

        system.stop(false);
        assert_eq!(system.depth(), 0);
        assert!(system.sessions().is_empty());
    }
}
