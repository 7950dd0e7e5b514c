//! Static dimension tables and the index schema derived from them
//!
//! [`DimensionTables::standard`] is built once at startup and shared
//! read-only (behind an `Arc`) by every load worker. The schema used to
//! provision the bitmap index is derived from the same tables, so every
//! dimension the mapper can emit is guaranteed to exist.

use crate::model::Bucket;
use std::collections::{BTreeMap, HashMap};

/// Dimension names emitted by the field mapper.
pub mod dim {
    pub const GENDER: &str = "gender";
    pub const AGE: &str = "age_i";
    pub const COUNTRY: &str = "country";
    pub const POSTAL_CODE: &str = "postal_code";
    pub const DMA_ID: &str = "dma_id";

    pub const IS_LEAGUE_MANAGER: &str = "is_league_manager";
    pub const PLAYS_FANTASY: &str = "plays_fantasy";
    pub const HAS_FAVORITES: &str = "has_favorites";
    pub const HAS_NOTIFICATIONS: &str = "has_notifications";
    pub const HAS_AUTOSTART: &str = "has_autostart";
    pub const IS_INSIDER: &str = "is_insider";
    pub const IS_REGISTERED: &str = "is_registered";

    pub const SWID: &str = "swid";
    pub const PAGE_VIEWS: &str = "page_views";
    pub const TIME_SPENT: &str = "time_spent";
    pub const VIDEO_COMPLETES: &str = "video_completes";
    pub const VISITS: &str = "visits";
    pub const HITS: &str = "hits";

    pub const STATED_LEAGUES: &str = "stated_leagues";
}

/// A league with its own team dimension.
#[derive(Debug, Clone, Copy)]
pub struct League {
    pub id: i32,
    pub slug: &'static str,
    /// Ranked cache size for the league's team frames (≈ team cardinality).
    pub team_cache: u32,
    /// Whether the stated-team frame keeps an inverse view.
    pub stated_inverse: bool,
}

pub const LEAGUES: [League; 7] = [
    League { id: 10, slug: "mlb", team_cache: 50, stated_inverse: true },
    League { id: 46, slug: "nba", team_cache: 50, stated_inverse: false },
    League { id: 41, slug: "ncaab", team_cache: 5000, stated_inverse: false },
    League { id: 23, slug: "cfb", team_cache: 5000, stated_inverse: false },
    League { id: 28, slug: "nfl", team_cache: 50, stated_inverse: false },
    League { id: 90, slug: "nhl", team_cache: 50, stated_inverse: false },
    League { id: 600, slug: "soccer", team_cache: 5000, stated_inverse: false },
];

/// Cache size shared by the league-membership frames.
const LEAGUE_FRAME_CACHE: u32 = 25;

/// Ranked cache size used for boolean and small categorical frames.
const FLAG_FRAME_CACHE: u32 = 100;

/// Target frame for one league's teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFrame {
    pub dimension: String,
    pub cache_size: u32,
    pub inverse_enabled: bool,
}

/// League id -> team dimension, plus the shared league-membership dimension.
#[derive(Debug, Clone)]
pub struct FavoriteTable {
    teams: BTreeMap<i32, TeamFrame>,
    leagues_dimension: String,
}

impl FavoriteTable {
    fn build(prefix: &str, leagues_dimension: impl Into<String>, inverse: fn(&League) -> bool) -> Self {
        let teams = LEAGUES
            .iter()
            .map(|league| {
                let frame = TeamFrame {
                    dimension: format!("{prefix}_teams_{}", league.slug),
                    cache_size: league.team_cache,
                    inverse_enabled: inverse(league),
                };
                (league.id, frame)
            })
            .collect();

        Self {
            teams,
            leagues_dimension: leagues_dimension.into(),
        }
    }

    /// Team dimension for `league_id`, or `None` when the league is not tracked.
    pub fn team_dimension(&self, league_id: i32) -> Option<&str> {
        self.teams.get(&league_id).map(|frame| frame.dimension.as_str())
    }

    pub fn leagues_dimension(&self) -> &str {
        &self.leagues_dimension
    }

    pub fn frames(&self) -> impl Iterator<Item = &TeamFrame> {
        self.teams.values()
    }
}

/// Immutable lookup tables consulted by the field mapper.
#[derive(Debug, Clone)]
pub struct DimensionTables {
    gender: HashMap<String, u64>,
    stated: FavoriteTable,
    derived: HashMap<Bucket, FavoriteTable>,
}

impl DimensionTables {
    /// The production tables.
    pub fn standard() -> Self {
        let gender = [("M", 1), ("F", 2), ("U", 3)]
            .into_iter()
            .map(|(code, row)| (code.to_string(), row))
            .collect();

        let stated = FavoriteTable::build("stated", dim::STATED_LEAGUES, |l| l.stated_inverse);

        let derived = Bucket::ALL
            .into_iter()
            .map(|bucket| {
                let table = FavoriteTable::build(
                    &format!("derived_{}_cc", bucket.slug()),
                    format!("league_cc_{}", bucket.slug()),
                    |_| false,
                );
                (bucket, table)
            })
            .collect();

        Self {
            gender,
            stated,
            derived,
        }
    }

    /// Row id for a gender code; 0 for unrecognized codes.
    pub fn gender_row(&self, code: &str) -> u64 {
        self.gender.get(code).copied().unwrap_or(0)
    }

    pub fn stated(&self) -> &FavoriteTable {
        &self.stated
    }

    pub fn derived(&self, bucket: Bucket) -> Option<&FavoriteTable> {
        self.derived.get(&bucket)
    }

    /// Frames to provision in the bitmap index, one per emitted dimension.
    pub fn schema(&self) -> Vec<FrameSpec> {
        let mut frames = vec![
            FrameSpec::ranked(dim::GENDER, FLAG_FRAME_CACHE),
            FrameSpec::range(dim::AGE, 0, 200),
            FrameSpec::ranked(dim::COUNTRY, 600),
            FrameSpec::range(dim::POSTAL_CODE, 0, i64::from(u32::MAX)),
            FrameSpec::ranked(dim::DMA_ID, 10_000),
            FrameSpec::ranked(dim::IS_LEAGUE_MANAGER, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::PLAYS_FANTASY, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::HAS_FAVORITES, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::HAS_NOTIFICATIONS, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::HAS_AUTOSTART, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::IS_INSIDER, FLAG_FRAME_CACHE),
            FrameSpec::ranked(dim::IS_REGISTERED, FLAG_FRAME_CACHE).with_inverse(),
            FrameSpec::range(dim::SWID, 0, i64::from(u32::MAX)),
            FrameSpec::range(dim::PAGE_VIEWS, 0, 65_535),
            FrameSpec::range(dim::TIME_SPENT, 0, 10_000_000),
            FrameSpec::range(dim::VIDEO_COMPLETES, 0, 65_535),
            FrameSpec::range(dim::VISITS, 0, 65_535),
            FrameSpec::range(dim::HITS, 0, 65_535),
        ];

        let favorite_tables =
            std::iter::once(&self.stated).chain(Bucket::ALL.iter().filter_map(|b| self.derived(*b)));

        for table in favorite_tables {
            for team in table.frames() {
                let spec = FrameSpec::ranked(&team.dimension, team.cache_size);
                frames.push(if team.inverse_enabled { spec.with_inverse() } else { spec });
            }
            frames.push(FrameSpec::ranked(table.leagues_dimension(), LEAGUE_FRAME_CACHE));
        }

        frames
    }
}

/// How a frame stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePolicy {
    /// Set-bit rows with a top-K ranked cache.
    Ranked { cache_size: u32 },
    /// An integer field bounded to `min..=max`.
    Range { min: i64, max: i64 },
}

/// One frame of the index schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub name: String,
    pub policy: FramePolicy,
    pub inverse_enabled: bool,
}

impl FrameSpec {
    pub fn ranked(name: impl Into<String>, cache_size: u32) -> Self {
        Self {
            name: name.into(),
            policy: FramePolicy::Ranked { cache_size },
            inverse_enabled: false,
        }
    }

    pub fn range(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            policy: FramePolicy::Range { min, max },
            inverse_enabled: false,
        }
    }

    pub fn with_inverse(mut self) -> Self {
        self.inverse_enabled = true;
        self
    }
}
