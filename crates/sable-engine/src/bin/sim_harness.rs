//! Headless harness: runs a small demo level and prints a summary.
//!
//! Run with:
//!   cargo run --bin sim_harness -p sable-engine -- [config.json] [ticks]
//!
//! `RUST_LOG=sable_engine=debug` shows per-tick logging.

use std::collections::BTreeMap;

use anyhow::Context;
use sable_engine::prelude::*;

const DEFAULT_TICKS: u64 = 300;

const LEVEL: &[&str] = &[
    "################################################",
    "#..............................................#",
    "#..............................................#",
    "#..............................................#",
    "#..............................................#",
    "#.........................=====................#",
    "#..............................................#",
    "#..............................................#",
    "#..............................................#",
    "#..............................#...............#",
    "#..............................#...............#",
    "################################################",
];

fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::CollidedWithWorld { .. } => "collided_with_world",
        GameEvent::ShootableDamaged { .. } => "shootable_damaged",
        GameEvent::ShootableKilled { .. } => "shootable_killed",
        GameEvent::ItemCollected { .. } => "item_collected",
        GameEvent::PlayerTookDamage { .. } => "player_took_damage",
        GameEvent::PlayerTeleported { .. } => "player_teleported",
        GameEvent::EntityActivated { .. } => "entity_activated",
        GameEvent::PlaySound { .. } => "play_sound",
        GameEvent::ScoreAwarded { .. } => "score_awarded",
        GameEvent::PlayerMessage { .. } => "player_message",
    }
}

fn build_level(config: SimConfig) -> anyhow::Result<Simulation> {
    let map = GridMap::from_ascii(LEVEL).context("demo level layout")?;
    let mut sim = Simulation::with_standard_factory(Box::new(map), config)?;

    sim.spawn_player(Vector::new(3, 6));
    sim.create_actor(ActorKind::Teleporter, Vector::new(2, 8));
    sim.create_actor(ActorKind::Teleporter, Vector::new(40, 8));
    sim.create_actor(ActorKind::RigelatinSoldier, Vector::new(12, 8));
    sim.create_actor(ActorKind::SpikeBall, Vector::new(22, 10));
    sim.create_actor(ActorKind::SimpleWalker, Vector::new(36, 10));
    sim.create_actor(ActorKind::SlidingDoor, Vector::new(44, 6));

    for x in [8, 9, 10] {
        sim.world_mut().spawn((
            Vector::new(x, 10),
            BoundingBox::UNIT,
            CollectableItem {
                given_score: Some(100),
                spawn_score_numbers: true,
                ..Default::default()
            },
        ));
    }
    Ok(sim)
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            SimConfig::from_json_str(&json)?
        }
        None => SimConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    let mut sim = build_level(config)?;
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for tick in 0..ticks {
        let input = InputFrame {
            interact: tick == ticks / 2,
            ..Default::default()
        };
        for event in sim.tick(&input) {
            *counts.entry(event_name(&event)).or_default() += 1;
        }
    }

    let snapshot = sim.capture_snapshot()?;
    let summary = serde_json::json!({
        "ticks": sim.tick_count(),
        "sim_time": sim.sim_time(),
        "entities": sim.world().entity_count(),
        "score": sim.player_model().score(),
        "health": sim.player_model().health(),
        "rng_cursor": snapshot.rng_cursor,
        "events": counts,
        "hash": snapshot.hash,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
