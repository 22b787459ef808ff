//! Shared resolution state: generation counter, active unit system and the
//! currently observable place/snapshot pair
//!
//! Every location resolution takes a generation from [`ResolutionContext::begin`].
//! Its result is only published by [`ResolutionContext::commit`] if no newer
//! generation was handed out in the meantime and the snapshot was fetched in
//! the active unit system; the checks and the publication share one critical
//! section. The lock is never held across an `.await`.
//!
//! A unit refresh ([`ResolutionContext::begin_refresh`]) never supersedes a
//! location resolution in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::models::{Resolution, UnitSystem};
use crate::{PlacecastError, Result};

/// Phase of the location-in-flight slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolutionPhase {
    #[default]
    Idle,
    Resolving { generation: u64 },
    Resolved,
    Failed { error: PlacecastError },
}

/// What [`ResolutionContext::commit`] did with an offered resolution
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Published(Resolution),
    /// Units were toggled while the snapshot was fetched. Nothing was
    /// published; fetch again in `units` and retry.
    UnitsChanged { units: UnitSystem },
}

#[derive(Debug, Default)]
struct State {
    phase: ResolutionPhase,
    units: UnitSystem,
    current: Option<Resolution>,
}

/// Explicit context object shared by the resolver and the units controller
#[derive(Debug, Default)]
pub struct ResolutionContext {
    generation: AtomicU64,
    state: Mutex<State>,
}

impl ResolutionContext {
    #[must_use]
    pub fn new(units: UnitSystem) -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: Mutex::new(State {
                units,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new resolution, superseding any in flight. Returns its generation.
    pub fn begin(&self) -> u64 {
        let mut state = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let ResolutionPhase::Resolving { generation: previous } = state.phase {
            debug!("Resolution {} superseded by {}", previous, generation);
        }
        state.phase = ResolutionPhase::Resolving { generation };
        generation
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Start a weather refresh of the current place after a unit switch.
    ///
    /// Returns `None` if there is no place yet or a resolution is already in
    /// flight. That resolution sees the new units when it commits.
    pub fn begin_refresh(&self) -> Option<(u64, Resolution)> {
        let mut state = self.lock();
        if let ResolutionPhase::Resolving { generation } = state.phase {
            debug!("Resolution {} in flight, leaving the refresh to it", generation);
            return None;
        }
        let current = state.current.clone()?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.phase = ResolutionPhase::Resolving { generation };
        Some((generation, current))
    }

    /// Publish a completed resolution if `generation` is still the latest and
    /// its snapshot is in the active unit system.
    ///
    /// Stale results are discarded and reported as `Superseded`.
    pub fn commit(&self, generation: u64, resolution: Resolution) -> Result<CommitOutcome> {
        let mut state = self.lock();
        if !self.is_current(generation) {
            warn!("Discarding stale resolution {}", generation);
            return Err(PlacecastError::Superseded { generation });
        }
        if resolution.snapshot.units != state.units {
            debug!(
                "Resolution {} fetched in {}, active units are {}",
                generation, resolution.snapshot.units, state.units
            );
            return Ok(CommitOutcome::UnitsChanged { units: state.units });
        }
        state.current = Some(resolution.clone());
        state.phase = ResolutionPhase::Resolved;
        Ok(CommitOutcome::Published(resolution))
    }

    /// Record a failed resolution. The previous resolution stays observable.
    ///
    /// A stale failure leaves the state alone and is reported as `Superseded`.
    pub fn fail(&self, generation: u64, error: PlacecastError) -> PlacecastError {
        let mut state = self.lock();
        if !self.is_current(generation) {
            warn!("Discarding stale failure of resolution {}: {}", generation, error);
            return PlacecastError::Superseded { generation };
        }
        state.phase = ResolutionPhase::Failed {
            error: error.clone(),
        };
        error
    }

    /// The currently observable place and snapshot
    #[must_use]
    pub fn current(&self) -> Option<Resolution> {
        self.lock().current.clone()
    }

    #[must_use]
    pub fn units(&self) -> UnitSystem {
        self.lock().units
    }

    /// Flip the unit system and return the new value
    pub fn toggle_units(&self) -> UnitSystem {
        let mut state = self.lock();
        state.units = state.units.toggled();
        state.units
    }

    #[must_use]
    pub fn phase(&self) -> ResolutionPhase {
        self.lock().phase.clone()
    }
}
