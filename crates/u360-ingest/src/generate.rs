//! Synthetic user records
//!
//! Produces NDJSON shaped like the production export, for smoke-testing a
//! loader deployment without real data.

use crate::dimensions::LEAGUES;
use crate::model::{Bucket, Favorite, User, REGISTERED_USER_TYPE};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::io::Write;

/// Favourite-list lengths drawn uniformly; most users have none.
const FAVORITE_COUNTS: [usize; 13] = [0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 2, 2, 3];

const SWID_LEN: usize = 8;

/// `percent` chance of `true`.
fn chance<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    rng.random_range(0..100) < percent
}

fn random_favorite<R: Rng + ?Sized>(rng: &mut R) -> Favorite {
    let league = LEAGUES[rng.random_range(0..LEAGUES.len())];
    let team = rng.random_range(0..league.team_cache) as i32;
    let bucket = Bucket::ALL[rng.random_range(0..Bucket::ALL.len())];

    Favorite {
        league_id: league.id,
        sport_id: league.id,
        team_id: team,
        bucket: bucket.label().to_string(),
        ..Default::default()
    }
}

fn random_favorites<R: Rng + ?Sized>(rng: &mut R) -> Vec<Favorite> {
    let count = FAVORITE_COUNTS[rng.random_range(0..FAVORITE_COUNTS.len())];
    (0..count).map(|_| random_favorite(rng)).collect()
}

pub fn random_user<R: Rng + ?Sized>(rng: &mut R) -> User {
    let user_type = if chance(rng, 10) { REGISTERED_USER_TYPE } else { "" };
    let gender = match (chance(rng, 80), chance(rng, 50)) {
        (false, _) => "U",
        (true, true) => "M",
        (true, false) => "F",
    };
    let swid: String = (0..SWID_LEN).map(|_| char::from(rng.sample(Alphanumeric))).collect();

    User {
        swid,
        user_type: user_type.to_string(),
        gender: gender.to_string(),
        age: rng.random_range(10..100),
        registered_dma_id: rng.random_range(0..10_000).to_string(),
        registered_postal_code: rng.random_range(10_000..99_999).to_string(),
        is_league_manager: chance(rng, 5),
        plays_fantasy: chance(rng, 25),
        has_favorites: chance(rng, 20),
        has_notifications: chance(rng, 10),
        has_autostart: chance(rng, 20),
        is_insider: chance(rng, 20),
        page_views: rng.random_range(0..65_535),
        time_spent: rng.random_range(0..10_000_000),
        video_completes: rng.random_range(0..65_535),
        visits: rng.random_range(0..65_535),
        hits: rng.random_range(0..65_535),
        stated_favorites: random_favorites(rng),
        derived_favorites: random_favorites(rng),
        ..Default::default()
    }
}

/// Write `count` random users to `out`, one JSON object per line.
pub fn write_users<R, W>(count: usize, rng: &mut R, mut out: W) -> std::io::Result<()>
where
    R: Rng + ?Sized,
    W: Write,
{
    for _ in 0..count {
        serde_json::to_writer(&mut out, &random_user(rng))?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::DimensionTables;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_lines_decode() {
        let mut out = Vec::new();
        write_users(25, &mut StdRng::seed_from_u64(7), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let users: Vec<User> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(users.len(), 25);
    }

    #[test]
    fn test_users_are_within_schema_ranges() {
        let tables = DimensionTables::standard();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let user = random_user(&mut rng);
            assert_eq!(user.swid.len(), SWID_LEN);
            assert!((10..100).contains(&user.age));
            assert!(tables.gender_row(&user.gender) > 0);
            assert!(user.stated_favorites.len() <= 3);

            for favorite in &user.stated_favorites {
                assert!(tables.stated().team_dimension(favorite.sport_id).is_some());
            }
            for favorite in &user.derived_favorites {
                let bucket = Bucket::from_label(&favorite.bucket).unwrap();
                assert!(tables.derived(bucket).unwrap().team_dimension(favorite.league_id).is_some());
            }
        }
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let a = random_user(&mut StdRng::seed_from_u64(3));
        let b = random_user(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
