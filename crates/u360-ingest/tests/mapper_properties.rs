//! Property-based tests for the field mapper and hash.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;
use u360_ingest::dimensions::{DimensionTables, LEAGUES};
use u360_ingest::facts::Fact;
use u360_ingest::hash::{Murmur2, StringHasher};
use u360_ingest::mapper::FieldMapper;
use u360_ingest::model::{Favorite, User};

fn mapper() -> FieldMapper {
    FieldMapper::new(Arc::new(DimensionTables::standard()), Arc::new(Murmur2::new()))
}

/// League ids biased towards the tracked leagues.
fn arb_league() -> impl Strategy<Value = i32> {
    prop_oneof![
        3 => prop::sample::select(LEAGUES.iter().map(|l| l.id).collect::<Vec<_>>()),
        1 => -5i32..1000,
    ]
}

fn arb_favorite() -> impl Strategy<Value = Favorite> {
    (
        arb_league(),
        arb_league(),
        -2i32..6000,
        prop::sample::select(vec!["High", "Medium", "Low", "high", ""]),
    )
        .prop_map(|(sport_id, league_id, team_id, bucket)| Favorite {
            sport_id,
            league_id,
            team_id,
            bucket: bucket.to_string(),
            ..Default::default()
        })
}

fn arb_user() -> impl Strategy<Value = User> {
    (
        (
            "[a-zA-Z0-9-]{0,12}",
            prop::sample::select(vec!["", "registered", "anonymous"]),
            prop::sample::select(vec!["", "M", "F", "U", "X"]),
            -1i64..120,
            "[0-9a-z]{0,5}",
            "[0-9]{0,5}",
        ),
        prop::array::uniform6(any::<bool>()),
        prop::array::uniform5(0i64..70_000),
        prop::collection::vec(arb_favorite(), 0..4),
        prop::collection::vec(arb_favorite(), 0..4),
    )
        .prop_map(|((swid, user_type, gender, age, dma, postal), flags, counters, stated, derived)| User {
            swid,
            user_type: user_type.to_string(),
            gender: gender.to_string(),
            age,
            registered_dma_id: dma,
            registered_postal_code: postal,
            is_league_manager: flags[0],
            plays_fantasy: flags[1],
            has_favorites: flags[2],
            has_notifications: flags[3],
            has_autostart: flags[4],
            is_insider: flags[5],
            page_views: counters[0],
            time_spent: counters[1],
            video_completes: counters[2],
            visits: counters[3],
            hits: counters[4],
            stated_favorites: stated,
            derived_favorites: derived,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn prop_mapping_is_deterministic(user in arb_user(), column in any::<u64>()) {
        let mapper = mapper();
        prop_assert_eq!(mapper.map(&user, column), mapper.map(&user, column));
    }

    #[test]
    fn prop_mapping_is_independent_of_order_and_threads(users in prop::collection::vec(arb_user(), 1..16)) {
        let mapper = mapper();
        let expected: Vec<_> = users.iter().enumerate().map(|(i, u)| mapper.map(u, i as u64)).collect();

        // Clones share the same tables and hasher.
        let clones: Vec<FieldMapper> = (0..4).map(|_| mapper.clone()).collect();
        let results: Vec<Vec<(usize, Vec<Fact<'_>>)>> = std::thread::scope(|scope| {
            let handles: Vec<_> = clones
                .iter()
                .enumerate()
                .map(|(t, worker)| {
                    let users = &users;
                    scope.spawn(move || {
                        let mut order: Vec<usize> = (0..users.len()).collect();
                        if t % 2 == 1 {
                            order.reverse();
                        }
                        order.rotate_left(t % users.len());
                        order
                            .into_iter()
                            .map(|i| (i, worker.map(&users[i], i as u64)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for mapped in results {
            prop_assert_eq!(mapped.len(), users.len());
            for (i, facts) in mapped {
                prop_assert_eq!(&facts, &expected[i]);
            }
        }
    }

    #[test]
    fn prop_facts_carry_the_column(user in arb_user(), column in any::<u64>()) {
        let mapper = mapper();
        prop_assert!(mapper.map(&user, column).iter().all(|f| f.column() == column));
    }

    #[test]
    fn prop_every_dimension_is_provisioned(user in arb_user()) {
        let mapper = mapper();
        let schema = mapper.tables().schema();
        for fact in mapper.map(&user, 0) {
            prop_assert!(schema.iter().any(|frame| frame.name == fact.dimension()));
        }
    }

    #[test]
    fn prop_flag_facts_only_for_true_flags(user in arb_user()) {
        let mapper = mapper();
        let facts = mapper.map(&user, 1);
        let flags = [
            ("is_league_manager", user.is_league_manager),
            ("plays_fantasy", user.plays_fantasy),
            ("has_favorites", user.has_favorites),
            ("has_notifications", user.has_notifications),
            ("has_autostart", user.has_autostart),
            ("is_insider", user.is_insider),
            ("is_registered", user.is_registered()),
        ];
        for (dimension, set) in flags {
            let emitted: Vec<_> = facts.iter().filter(|f| f.dimension() == dimension).collect();
            if set {
                let expected = Fact::bit(dimension, 1, 1);
                prop_assert_eq!(emitted, vec![&expected]);
            } else {
                prop_assert!(emitted.is_empty());
            }
        }
    }

    #[test]
    fn prop_favorites_emit_pairs(user in arb_user()) {
        let mapper = mapper();
        let baseline = mapper.map(&User { stated_favorites: vec![], derived_favorites: vec![], ..user.clone() }, 0);
        let facts = mapper.map(&user, 0);
        // Each accepted favourite adds a team bit and a league bit.
        prop_assert_eq!((facts.len() - baseline.len()) % 2, 0);
    }

    #[test]
    fn prop_hash_fits_u32(value in ".{0,64}") {
        let hash = Murmur2::new().hash(&value);
        prop_assert!((0..=i64::from(u32::MAX)).contains(&hash));
    }
}
