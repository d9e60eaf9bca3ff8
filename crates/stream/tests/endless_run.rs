use std::collections::HashMap;

use runway_common::{GeometryHandle, ObjectId};
use runway_kernel::{Materializer, Scene};
use runway_stream::{
    DecorationConfig, DecorationSpawnerKind, LevelConfig, LevelGenerator, ObstacleConfig,
    ObstacleSpawnerKind, RowWindow, Runner, SpacingRange, Subject,
};

const BARRIER: GeometryHandle = GeometryHandle(10);
const DOOR: GeometryHandle = GeometryHandle(20);
const CURB: GeometryHandle = GeometryHandle(21);

fn full_config(seed: u64) -> LevelConfig {
    LevelConfig {
        lanes: 5,
        layers: 5,
        max_height_change: 2,
        probability_to_change_height: 0.4,
        probability_to_spawn_door: 0.3,
        seed: Some(seed),
        obstacles: vec![ObstacleConfig {
            name: "barrier".into(),
            geometry: Some(BARRIER),
            spawner: ObstacleSpawnerKind::Center,
        }],
        decorations: vec![
            DecorationConfig {
                name: "door".into(),
                geometry: Some(DOOR),
                spawner: DecorationSpawnerKind::Door,
                spawn_chance: 1.0,
            },
            DecorationConfig {
                name: "curb".into(),
                geometry: Some(CURB),
                spawner: DecorationSpawnerKind::Curb,
                spawn_chance: 0.5,
            },
        ],
        ..LevelConfig::default()
    }
}

fn long_level(config: LevelConfig, rows: u32) -> LevelGenerator<Scene> {
    let mut level = LevelGenerator::new(config, Scene::new()).unwrap();
    level.create_level();
    level.extend(rows);
    level
}

/// `(row, lane)` pairs with a live predecessor.
fn successors(window: &RowWindow) -> impl Iterator<Item = (i32, u32)> + '_ {
    (window.front_row() + 1..window.current_length())
        .flat_map(move |row| (0..window.lanes()).map(move |lane| (row, lane)))
}

#[test]
fn height_delta_is_bounded() {
    for seed in 0..10 {
        let level = long_level(full_config(seed), 400);
        let window = level.window();
        for (row, lane) in successors(window) {
            let prev = window.get(row - 1, lane).unwrap().height();
            let cur = window.get(row, lane).unwrap();
            assert!(
                cur.height().abs_diff(prev) <= 2,
                "seed {seed} row {row} lane {lane}: {prev} -> {}",
                cur.height()
            );
            assert!(cur.height() < 5);
        }
    }
}

#[test]
fn every_rise_is_reachable() {
    for seed in 0..10 {
        let level = long_level(full_config(seed), 400);
        let window = level.window();
        let lanes = window.lanes();
        for (row, lane) in successors(window) {
            let prev_h = |l: u32| window.get(row - 1, l).unwrap().height();
            let cur = window.get(row, lane).unwrap();
            if cur.height() <= prev_h(lane) || cur.is_ramp() {
                continue;
            }
            // A fresh corridor is the detour under the wall.
            if cur.has_indoors() && cur.indoor_length() == 0 {
                continue;
            }
            // Ramps count as flat for the lanes next to them.
            let neighbour_ok = [lane.checked_sub(1), Some(lane + 1)]
                .into_iter()
                .flatten()
                .filter(|&n| n < lanes)
                .any(|n| {
                    let t = window.get(row, n).unwrap();
                    prev_h(n) <= prev_h(lane) && (t.height() <= prev_h(n) || t.is_ramp())
                });
            assert!(neighbour_ok, "seed {seed}: death wall at row {row} lane {lane}");
        }
    }
}

#[test]
fn indoor_sections_reach_minimum_length() {
    let config = LevelConfig {
        min_indoor_length: 3,
        probability_to_spawn_door: 0.8,
        ..full_config(3)
    };
    let level = long_level(config, 600);
    let window = level.window();
    let mut corridors = 0;
    for (row, lane) in successors(window) {
        let prev = window.get(row - 1, lane).unwrap();
        if !prev.has_indoors() {
            continue;
        }
        assert!(prev.height() > prev.indoor_height());
        if prev.indoor_length() < 3 {
            let cur = window.get(row, lane).unwrap();
            assert!(cur.has_indoors(), "corridor cut short at row {row} lane {lane}");
            assert_eq!(cur.indoor_height(), prev.indoor_height());
            assert_eq!(cur.indoor_length(), prev.indoor_length() + 1);
        }
        if prev.indoor_length() == 0 {
            corridors += 1;
        }
    }
    assert!(corridors > 0);
}

#[test]
fn first_rows_without_run_up_are_reachable() {
    for seed in 0..200 {
        let config = LevelConfig {
            lanes: 3,
            layers: 3,
            max_height_change: 3,
            probability_to_change_height: 1.0,
            seed: Some(seed),
            ..LevelConfig::default()
        };
        let mut level = LevelGenerator::new(config, Scene::new()).unwrap();
        level.extend(2);
        let window = level.window();

        for lane in 0..3 {
            assert!(window.get(0, lane).unwrap().height() <= 2);
        }
        for lane in 0..3 {
            let prev_h = |l: u32| window.get(0, l).unwrap().height();
            let cur = window.get(1, lane).unwrap();
            // Too early for corridors.
            assert!(!cur.has_indoors());
            if cur.height() < prev_h(lane) + 2 || cur.is_ramp() {
                continue;
            }
            let escape = [lane.checked_sub(1), Some(lane + 1)]
                .into_iter()
                .flatten()
                .filter(|&n| n < 3)
                .any(|n| {
                    let t = window.get(1, n).unwrap();
                    prev_h(n) <= prev_h(lane) && (t.height() <= prev_h(n) || t.is_ramp())
                });
            assert!(escape, "seed {seed}: unreachable jump in lane {lane}");
        }
    }
}

#[test]
fn obstacle_gaps_stay_within_spacing() {
    for seed in 0..20 {
        let config = LevelConfig {
            seed: Some(seed),
            obstacle_spacing: SpacingRange::new(2, 4),
            obstacles: vec![ObstacleConfig {
                name: "barrier".into(),
                geometry: Some(BARRIER),
                spawner: ObstacleSpawnerKind::Center,
            }],
            ..LevelConfig::default()
        };
        let mut level = LevelGenerator::new(config, Scene::new()).unwrap();
        level.create_level();

        // Rows that counted a lane 0 timer down since its last obstacle.
        let mut counted: Option<u32> = None;
        let mut last_row: Option<i32> = None;
        let mut fired = 0;
        for _ in 0..1000 {
            let before = level.planner().lane_timers()[0];
            level.extend(1);
            let after = level.planner().lane_timers()[0];
            let row = level.window().current_length() - 1;
            let tile = level.window().get(row, 0).unwrap();

            if before == 0 && after > 0 {
                assert!(
                    tile.objects()
                        .iter()
                        .any(|&o| level.scene().get(o).is_some_and(|obj| obj.geometry == BARRIER)),
                    "seed {seed}: timer fired without a barrier at row {row}"
                );
                if let Some(gap) = counted {
                    assert!((2..=4).contains(&gap), "seed {seed}: gap {gap} before row {row}");
                }
                if let Some(last) = last_row {
                    assert!(row - last - 1 >= 2, "seed {seed}: rows {last} and {row} too close");
                }
                counted = Some(0);
                last_row = Some(row);
                fired += 1;
            } else if after + 1 == before {
                assert!(!tile.is_ramp(), "seed {seed}: ramp consumed the timer at row {row}");
                if let Some(gap) = counted.as_mut() {
                    *gap += 1;
                }
            } else {
                // Ramps and blocked tiles leave the timer alone.
                assert_eq!(after, before);
                assert!(
                    tile.is_ramp() || before == 0,
                    "seed {seed}: timer stalled on a plain tile at row {row}"
                );
            }
        }
        assert!(fired > 100, "seed {seed}: only {fired} obstacles");
    }
}

#[test]
fn endless_run_keeps_window_and_positions_consistent() {
    let config = LevelConfig {
        lanes: 9,
        disable_distance: 2,
        ..full_config(5)
    };
    let tile_length = config.tile_length;
    let loop_distance = config.loop_distance();
    let ground_geometry = config.geometry.ground;
    let mut level = LevelGenerator::new(config, Scene::new()).unwrap();
    level.create_level();
    let live_rows = level.window().rows();
    let mut runner = Runner::new(9, 2.0, 7.0);

    for step in 0..6000 {
        if step % 150 == 0 {
            runner.change_lane(if (step / 150) % 4 < 2 { -1 } else { 1 });
        }
        let before: HashMap<ObjectId, f32> = level
            .scene()
            .objects()
            .iter()
            .map(|(&id, obj)| (id, obj.transform.position.z))
            .collect();

        runner.advance(0.1);
        let report = level.fixed_step(&mut runner);

        let window = level.window();
        assert_eq!(
            (window.current_length() - window.front_row()) as usize,
            window.rows()
        );
        assert_eq!(window.rows(), live_rows);
        assert!(runner.position().z <= loop_distance);

        // Translation only: surviving objects move by the same amount.
        let shift = if report.rebased { loop_distance } else { 0.0 };
        for (id, z) in &before {
            if let Some(now) = level.scene().position(*id) {
                assert!((z - shift - now.z).abs() < 1e-3);
            }
        }

        let visible = level.stream().visible_lane();
        assert_eq!(visible, runner.lane());
        let mut owned = 0;
        for tile in window.iter() {
            owned += tile.objects().len();
            let ground = tile
                .objects()
                .iter()
                .filter_map(|&o| level.scene().get(o))
                .find(|obj| obj.geometry == ground_geometry)
                .unwrap();
            assert_eq!(ground.transform.position.z, tile.row() as f32 * tile_length);
            let on = tile.lane().abs_diff(visible) <= 2;
            for &o in tile.objects() {
                assert_eq!(level.scene().get(o).unwrap().active, on);
            }
        }
        assert_eq!(owned, level.scene().object_count());
    }

    let stats = level.stats();
    assert!(stats.rebases >= 3);
    assert_eq!(stats.rows_deleted, stats.rows_generated - live_rows as u64);
    assert!(stats.obstacles > 0);
    assert!(stats.visibility_refreshes > 0);
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let mut level = LevelGenerator::new(full_config(42), Scene::new()).unwrap();
        level.create_level();
        let mut runner = Runner::new(5, 2.0, 9.0);
        for step in 0..2000 {
            if step % 97 == 0 {
                runner.change_lane(if step % 2 == 0 { 1 } else { -1 });
            }
            runner.advance(0.1);
            level.fixed_step(&mut runner);
        }
        let stats = level.stats().clone();
        (level.into_scene().state_hash(), stats.rows_generated, stats.rebases)
    };
    assert_eq!(run(), run());
}
