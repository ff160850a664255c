//! Randomized car cosmetics for the mystery bots
//!
//! Every field is sampled independently, so two mystery bots running the same
//! bot bundle are not recognisable by their looks.

use crate::catalog::ItemCatalog;
use crate::types::{LoadoutConfig, PaintConfig};
use rand::seq::IndexedRandom;
use rand::Rng;

pub const BODY: &str = "Body";
pub const DECAL: &str = "Skin";
pub const WHEELS: &str = "Wheels";
pub const BOOST: &str = "Boost";
pub const TRAIL: &str = "SupersonicTrail";
pub const PAINT_FINISH: &str = "PaintFinish";
pub const GOAL_EXPLOSION: &str = "GoalExplosion";

const MAX_TEAM_COLOR_ID: u32 = 69;
const MAX_CUSTOM_COLOR_ID: u32 = 104;
const MAX_PAINT_ID: u32 = 13;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoadoutError {
    #[error("Item catalog has no items in category '{0}'")]
    MissingCategory(&'static str),
}

pub fn randomize<R: Rng + ?Sized>(
    items: &ItemCatalog,
    rng: &mut R,
) -> Result<LoadoutConfig, LoadoutError> {
    let mut pick = |category: &'static str| -> Result<u32, LoadoutError> {
        items
            .ids(category)
            .and_then(|ids| ids.choose(&mut *rng))
            .copied()
            .ok_or(LoadoutError::MissingCategory(category))
    };

    let car_id = pick(BODY)?;
    let decal_id = pick(DECAL)?;
    let boost_id = pick(BOOST)?;
    let wheels_id = pick(WHEELS)?;
    let trails_id = pick(TRAIL)?;
    let paint_finish_id = pick(PAINT_FINISH)?;
    let custom_finish_id = pick(PAINT_FINISH)?;
    let goal_explosion_id = pick(GOAL_EXPLOSION)?;

    Ok(LoadoutConfig {
        team_color_id: rng.random_range(0..=MAX_TEAM_COLOR_ID),
        custom_color_id: rng.random_range(0..=MAX_CUSTOM_COLOR_ID),
        car_id,
        decal_id,
        wheels_id,
        boost_id,
        trails_id,
        paint_finish_id,
        custom_finish_id,
        goal_explosion_id,
        paint_config: PaintConfig {
            car_paint_id: rng.random_range(0..=MAX_PAINT_ID),
            decal_paint_id: rng.random_range(0..=MAX_PAINT_ID),
            boost_paint_id: rng.random_range(0..=MAX_PAINT_ID),
            wheels_paint_id: rng.random_range(0..=MAX_PAINT_ID),
            trails_paint_id: rng.random_range(0..=MAX_PAINT_ID),
            goal_explosion_paint_id: rng.random_range(0..=MAX_PAINT_ID),
        },
    })
}
