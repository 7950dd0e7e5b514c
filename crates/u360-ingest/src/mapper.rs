//! User -> fact mapping
//!
//! [`FieldMapper`] is pure: the same user and column always produce the same
//! facts in the same order. It holds only shared, immutable state and can be
//! cloned freely into every load worker.

use crate::dimensions::{dim, DimensionTables, FavoriteTable};
use crate::facts::Fact;
use crate::hash::StringHasher;
use crate::model::{Bucket, Favorite, User};
use std::sync::Arc;

/// Row written to the country frame until a real country table is wired in.
pub const COUNTRY_PLACEHOLDER_ROW: u64 = 10;

/// Row id set for a true boolean flag.
const FLAG_ROW: u64 = 1;

#[derive(Clone)]
pub struct FieldMapper {
    tables: Arc<DimensionTables>,
    hasher: Arc<dyn StringHasher>,
}

impl FieldMapper {
    pub fn new(tables: Arc<DimensionTables>, hasher: Arc<dyn StringHasher>) -> Self {
        Self { tables, hasher }
    }

    pub fn tables(&self) -> &DimensionTables {
        &self.tables
    }

    /// All facts for `user`, stamped with `column`.
    pub fn map<'a>(&'a self, user: &User, column: u64) -> Vec<Fact<'a>> {
        let mut facts = Vec::with_capacity(24);

        if user.age != 0 {
            facts.push(Fact::value(dim::AGE, column, user.age));
        }

        let flags = [
            (dim::IS_LEAGUE_MANAGER, user.is_league_manager),
            (dim::PLAYS_FANTASY, user.plays_fantasy),
            (dim::HAS_FAVORITES, user.has_favorites),
            (dim::HAS_NOTIFICATIONS, user.has_notifications),
            (dim::HAS_AUTOSTART, user.has_autostart),
            (dim::IS_INSIDER, user.is_insider),
            (dim::IS_REGISTERED, user.is_registered()),
        ];
        facts.extend(
            flags
                .into_iter()
                .filter(|(_, set)| *set)
                .map(|(dimension, _)| Fact::bit(dimension, column, FLAG_ROW)),
        );

        let gender = self.tables.gender_row(&user.gender);
        if gender != 0 {
            facts.push(Fact::bit(dim::GENDER, column, gender));
        }

        facts.push(Fact::bit(dim::COUNTRY, column, COUNTRY_PLACEHOLDER_ROW));

        if let Ok(dma) = user.registered_dma_id.parse::<u64>() {
            facts.push(Fact::bit(dim::DMA_ID, column, dma));
        }

        // An empty postal code hashes to 0 and is dropped here too.
        let postal = self.hasher.hash(&user.registered_postal_code);
        if postal != 0 {
            facts.push(Fact::value(dim::POSTAL_CODE, column, postal));
        }

        let stated = self.tables.stated();
        for favorite in &user.stated_favorites {
            push_favorite(&mut facts, stated, favorite.sport_id, favorite, column);
        }

        for favorite in &user.derived_favorites {
            let table = Bucket::from_label(&favorite.bucket).and_then(|b| self.tables.derived(b));
            if let Some(table) = table {
                push_favorite(&mut facts, table, favorite.league_id, favorite, column);
            }
        }

        facts.push(Fact::value(dim::SWID, column, self.hasher.hash(&user.swid)));

        facts.extend([
            Fact::value(dim::PAGE_VIEWS, column, user.page_views),
            Fact::value(dim::TIME_SPENT, column, user.time_spent),
            Fact::value(dim::VIDEO_COMPLETES, column, user.video_completes),
            Fact::value(dim::VISITS, column, user.visits),
            Fact::value(dim::HITS, column, user.hits),
        ]);

        facts
    }
}

fn push_favorite<'a>(
    facts: &mut Vec<Fact<'a>>,
    table: &'a FavoriteTable,
    league: i32,
    favorite: &Favorite,
    column: u64,
) {
    let Some(dimension) = table.team_dimension(league) else {
        return;
    };
    let (Ok(team), Ok(league)) = (u64::try_from(favorite.team_id), u64::try_from(league)) else {
        return;
    };
    facts.push(Fact::bit(dimension, column, team));
    facts.push(Fact::bit(table.leagues_dimension(), column, league));
}
