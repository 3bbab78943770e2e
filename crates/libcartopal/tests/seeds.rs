mod common;

use std::time::{Duration, Instant};

use common::session;
use libcartopal::{Consumer, Error, InitialSeeds, SeedId};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn positions(session: &libcartopal::Session, consumer: Consumer) -> Vec<usize> {
    let mut positions: Vec<usize> = session
        .seeds()
        .iter()
        .filter_map(|seed| seed.input_index(consumer))
        .collect();
    positions.sort_unstable();
    positions
}

#[test]
fn load_round_trips() {
    let mut session = session();
    let colors = vec!["#FF0000", "#0f0", "#123456", "#abcdef"];
    session.load(&colors).unwrap();
    assert_eq!(session.registry().colors(), colors);
}

#[test]
fn text_import_success() {
    let mut session = session();
    let now = Instant::now();

    let loaded = session
        .load_from_text_at("pick #FF0000 or #00ff00", now)
        .unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(session.registry().colors(), vec!["#FF0000", "#00ff00"]);
    assert!(session.import_status().is_success(now));
    assert!(!session.import_status().is_error(now));
    assert!(!session
        .import_status()
        .is_success(now + Duration::from_secs(2)));
}

#[test]
fn text_import_failure_keeps_the_seeds() {
    let mut session = session();
    session.load(&["#123456"]).unwrap();
    let before = session.seeds();
    let now = Instant::now();

    let result = session.load_from_text_at("no colors here", now);

    assert!(matches!(result, Err(Error::NoColorsFound)));
    assert_eq!(session.seeds(), before);
    assert!(session.import_status().is_error(now));
    assert!(!session.import_status().is_success(now));
}

#[test]
fn initialize_assigns_up_to_three_seeds() {
    let mut session = session();
    session
        .initialize(&InitialSeeds::Generate {
            count: 8,
            start_color: None,
        })
        .unwrap();

    assert_eq!(session.registry().len(), 8);
    for consumer in Consumer::BOTH {
        assert_eq!(positions(&session, consumer), vec![0, 1, 2]);
        assert_eq!(session.palette_colors(consumer).len(), 9);
    }
}

#[test]
fn removing_twice_is_the_same_as_once() {
    let mut session = session();
    session.load(&["#111111", "#222222", "#333333"]).unwrap();
    session.add_to_input_end(Consumer::Point, SeedId(1));
    session.add_to_input_end(Consumer::Point, SeedId(2));

    session.remove_from_input(Consumer::Point, SeedId(1));
    let once = session.seeds();
    session.remove_from_input(Consumer::Point, SeedId(1));
    assert_eq!(session.seeds(), once);
    assert_eq!(positions(&session, Consumer::Point), vec![0, 1]);
}

#[test]
fn dropping_on_a_target_inserts_before_it() {
    let mut session = session();
    session
        .load(&["#111111", "#222222", "#333333", "#444444"])
        .unwrap();
    for id in 1..4 {
        session.add_to_input_end(Consumer::Area, SeedId(id));
    }

    session.add_to_input_position(Consumer::Area, SeedId(3), SeedId(1));

    let order: Vec<String> = session
        .input_colors(Consumer::Area)
        .iter()
        .map(|seed| seed.color.clone())
        .collect();
    assert_eq!(order, vec!["#111111", "#444444", "#222222", "#333333"]);
}

#[test]
fn random_reordering_keeps_positions_contiguous() {
    let mut session = session();
    session.generate(7, None).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..500 {
        let consumer = if rng.gen_bool(0.5) {
            Consumer::Point
        } else {
            Consumer::Area
        };
        let id = SeedId(rng.gen_range(0..7));
        match rng.gen_range(0..3) {
            0 => session.add_to_input_end(consumer, id),
            1 => session.remove_from_input(consumer, id),
            _ => {
                let target = SeedId(rng.gen_range(0..7));
                session.add_to_input_position(consumer, id, target);
            }
        }

        for consumer in Consumer::BOTH {
            let assigned = positions(&session, consumer);
            let expected: Vec<usize> = (0..assigned.len()).collect();
            assert_eq!(assigned, expected);
            assert_eq!(session.input_colors(consumer).len(), assigned.len());
        }
    }
}

#[test]
fn shrinking_the_registry_keeps_positions_contiguous() {
    let mut session = session();
    session.generate(6, None).unwrap();
    for id in [5, 2, 4] {
        session.add_to_input_end(Consumer::Point, SeedId(id));
    }

    session.generate_random(3).unwrap();

    assert_eq!(session.registry().len(), 3);
    assert_eq!(positions(&session, Consumer::Point), vec![0, 1]);
    let ids: Vec<SeedId> = session
        .input_colors(Consumer::Point)
        .iter()
        .map(|seed| seed.id)
        .collect();
    assert_eq!(ids, vec![SeedId(0), SeedId(2)]);
}
