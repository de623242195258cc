//! # TESSEL Sample Application
//!
//! A player with health and a poison effect:
//! - [`Poison`] drains [`Health`] every tick
//! - [`Health`] destroys its entity once it reaches zero
//! - between ticks the host may regenerate health by snapshotting the
//!   health store, editing the copy and swapping it back in
//!
//! Both kinds claim static ids, so they keep the low slots of the kind table.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use tessel_core::{Component, EcsResult, EntityId, EntityMut, Manager};

/// Hit points. Destroys its entity when at or below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health(pub i32);

impl Component for Health {
    const KIND: Option<u16> = Some(0);
    const PRIORITY: u32 = 0;

    fn update(entity: EntityMut<'_>) {
        if entity.get::<Health>().is_some_and(|health| health.0 <= 0) {
            tracing::info!(entity = %entity.id(), "health depleted");
            entity.destroy();
        }
    }
}

/// Damage over time, applied to [`Health`] each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Poison {
    /// Damage per tick.
    pub rate: i32,
}

impl Default for Poison {
    fn default() -> Self {
        Self { rate: 5 }
    }
}

impl Component for Poison {
    const KIND: Option<u16> = Some(1);

    fn update(mut entity: EntityMut<'_>) {
        let Some(rate) = entity.get::<Poison>().map(|poison| poison.rate) else {
            return;
        };
        if let Some(health) = entity.get_mut::<Health>() {
            health.0 -= rate;
        }
    }
}

/// Settings for [`run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Starting health of the player.
    pub health: i32,
    /// Number of ticks to run.
    pub ticks: u32,
    /// Health restored after each tick. Zero disables regeneration.
    pub regen: i32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            health: 15,
            ticks: 5,
            regen: 1,
        }
    }
}

/// Creates the player: `health` plus the default poison.
pub fn spawn_player(manager: &mut Manager, health: i32) -> EntityId {
    let player = manager.create_entity();
    manager.add_component(player, Health(health));
    manager.add_component(player, Poison::default());
    player
}

/// Adds `amount` to every [`Health`] by snapshot and swap.
///
/// Does nothing if no health store exists yet.
///
/// # Errors
///
/// Propagates [`Manager::replace_store`] errors.
pub fn regenerate(manager: &mut Manager, amount: i32) -> EcsResult<()> {
    let Some(mut next) = manager.snapshot_store::<Health>() else {
        return Ok(());
    };
    for health in next.components_mut() {
        health.0 += amount;
    }
    manager.replace_store(next)?;
    Ok(())
}

/// Runs the scenario on `manager`.
///
/// # Returns
///
/// The player's health observed before each tick, `None` once it is dead.
///
/// # Errors
///
/// Propagates [`regenerate`] errors.
pub fn run(manager: &mut Manager, scenario: Scenario) -> EcsResult<Vec<Option<i32>>> {
    let player = spawn_player(manager, scenario.health);
    let mut observed = Vec::with_capacity(scenario.ticks as usize);

    for _ in 0..scenario.ticks {
        // The player may have been destroyed by the previous tick.
        let health = manager
            .entity(player)
            .and_then(|entity| entity.get::<Health>().copied())
            .map(|health| health.0);

        match health {
            Some(value) => tracing::info!(tick = manager.tick_count(), health = value, "player health"),
            None => tracing::info!(tick = manager.tick_count(), "player is dead"),
        }
        observed.push(health);

        manager.tick();

        if scenario.regen != 0 {
            regenerate(manager, scenario.regen)?;
        }
    }

    Ok(observed)
}
