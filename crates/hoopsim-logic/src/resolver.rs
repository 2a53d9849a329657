//! Weighted-random possession resolution.
//!
//! A possession is resolved in two steps so the draw stays separate from
//! the bookkeeping:
//!
//! 1. [`resolve_possession`] reads the matchup and the current state and
//!    draws a [`Possession`] - duration, outcome kind, shot location and
//!    make/miss, bonus free throws. It never mutates state.
//! 2. [`apply_outcome`] writes the possession into [`GameState`]: team
//!    foul, points, possession change, then the clock.
//!
//! # Probabilities
//!
//! | Step | Rule |
//! |------|------|
//! | Duration | `4 + (shot_clock - 4) * (10 - pace) / 10 * U`, capped at the clock |
//! | Outcome | shot 0.80, turnover 0.12, foul 0.08 |
//! | Location | offense's shot-selection bias (three, mid, inside) |
//! | Make | location % minus `(def_rating - 100) / 100 * 0.1`, floor 0.1 |
//! | Bonus | defense at or over the threshold after the foul: 2 FTs |

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{outcome_weights, shooting, timing};
use crate::rules::GameRules;
use crate::state::{game_timestamp, ClockTick, GameState, Side};
use crate::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotLocation {
    Inside,
    MidRange,
    ThreePoint,
    FreeThrow,
}

impl ShotLocation {
    /// Points for a made attempt from this location.
    pub fn value(self) -> u32 {
        match self {
            ShotLocation::ThreePoint => 3,
            ShotLocation::MidRange | ShotLocation::Inside => 2,
            ShotLocation::FreeThrow => 1,
        }
    }

    pub fn is_field_goal(self) -> bool {
        !matches!(self, ShotLocation::FreeThrow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotAttempt {
    pub team: Side,
    pub location: ShotLocation,
    pub made: bool,
    pub points: u32,
    /// Period clock after the possession.
    pub time_remaining: u32,
    pub quarter: u8,
    /// `Q<n> M:SS`.
    pub game_timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PossessionResult {
    Shot,
    Turnover,
    Foul,
}

impl PossessionResult {
    /// Outcome table used by [`pick_outcome`], in draw order.
    pub const WEIGHTS: [(PossessionResult, f64); 3] = [
        (PossessionResult::Shot, outcome_weights::SHOT),
        (PossessionResult::Turnover, outcome_weights::TURNOVER),
        (PossessionResult::Foul, outcome_weights::FOUL),
    ];
}

/// One resolved possession. Append-only log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Possession {
    /// Team on offense.
    pub team: Side,
    /// Seconds of game clock used.
    pub duration: u32,
    pub result: PossessionResult,
    /// Field-goal attempt, present when `result` is `Shot`.
    pub shot: Option<ShotAttempt>,
    /// Bonus free throws drawn on a foul.
    pub free_throws: Vec<ShotAttempt>,
    /// Period clock after the possession.
    pub time_remaining: u32,
    pub quarter: u8,
}

impl Possession {
    pub fn points(&self) -> u32 {
        self.attempts().map(|s| s.points).sum()
    }

    /// Field-goal attempt followed by any free throws.
    pub fn attempts(&self) -> impl Iterator<Item = &ShotAttempt> {
        self.shot.iter().chain(self.free_throws.iter())
    }

    /// Whether this was a foul that put the offense on the line.
    pub fn is_bonus_foul(&self) -> bool {
        self.result == PossessionResult::Foul && !self.free_throws.is_empty()
    }
}

/// Draw a possession length in seconds.
///
/// Slower teams (low pace preference) stretch further toward the shot
/// clock; the result never exceeds the time left in the period.
pub fn possession_duration(
    pace_preference: u8,
    rules: &GameRules,
    time_remaining: u32,
    roll: f64,
) -> u32 {
    let min = timing::MIN_POSSESSION_SECS;
    let span = rules.shot_clock_duration.saturating_sub(min) as f64;
    let pace_adjustment = (10.0 - pace_preference as f64) / 10.0;
    let drawn = min + (span * pace_adjustment * roll).floor().max(0.0) as u32;
    drawn.min(time_remaining)
}

/// Pick an outcome kind from a uniform draw in `[0, 1)`.
pub fn pick_outcome(roll: f64) -> PossessionResult {
    let mut cumulative = 0.0;
    for (result, weight) in PossessionResult::WEIGHTS {
        cumulative += weight;
        if roll <= cumulative {
            return result;
        }
    }
    // Rounding can leave the cumulative sum a hair under 1.0.
    PossessionResult::Foul
}

/// Shot percentage after the opponent's defensive adjustment.
pub fn adjusted_shot_percentage(base: f64, defensive_rating: f64) -> f64 {
    let defense_adjustment = (defensive_rating - 100.0) / 100.0;
    (base - defense_adjustment * shooting::DEFENSE_PENALTY_SCALE).max(shooting::MIN_SHOT_PERCENTAGE)
}

/// Draw one possession for whichever side currently has the ball.
///
/// A foul puts the offense on the line when the defense's count including
/// this foul reaches the bonus threshold, one foul earlier than comparing
/// the count before it.
pub fn resolve_possession<R: Rng + ?Sized>(
    rng: &mut R,
    home: &Team,
    away: &Team,
    rules: &GameRules,
    state: &GameState,
) -> Possession {
    let offense_side = state.possession;
    let defense_side = offense_side.opponent();
    let (offense, defense) = match offense_side {
        Side::Home => (home, away),
        Side::Away => (away, home),
    };

    let duration = possession_duration(
        offense.pace_preference,
        rules,
        state.time_remaining,
        rng.gen::<f64>(),
    );
    let time_after = state.time_remaining - duration;
    let quarter = state.quarter;

    let attempt = |location: ShotLocation, made: bool| ShotAttempt {
        team: offense_side,
        location,
        made,
        points: if made { location.value() } else { 0 },
        time_remaining: time_after,
        quarter,
        game_timestamp: game_timestamp(quarter, time_after),
    };

    let result = pick_outcome(rng.gen::<f64>());
    let mut shot = None;
    let mut free_throws = Vec::new();

    match result {
        PossessionResult::Shot => {
            let location = offense.shot_selection_bias.pick(rng.gen::<f64>());
            let percentage = adjusted_shot_percentage(
                offense.percentage_for(location),
                defense.defensive_rating,
            );
            let made = rng.gen::<f64>() < percentage;
            shot = Some(attempt(location, made));
        }
        PossessionResult::Turnover => {}
        PossessionResult::Foul => {
            let fouls_after = state.fouls(defense_side).saturating_add(1);
            if fouls_after >= rules.bonus_threshold {
                for _ in 0..shooting::BONUS_FREE_THROWS {
                    let made = rng.gen::<f64>() < offense.free_throw_percentage;
                    free_throws.push(attempt(ShotLocation::FreeThrow, made));
                }
            }
        }
    }

    Possession {
        team: offense_side,
        duration,
        result,
        shot,
        free_throws,
        time_remaining: time_after,
        quarter,
    }
}

/// Write a resolved possession into the game state.
///
/// Made and missed shots, turnovers, and bonus fouls hand the ball to the
/// other team; a foul outside the bonus leaves it with the offense.
pub fn apply_outcome(
    state: &mut GameState,
    rules: &GameRules,
    possession: &Possession,
) -> ClockTick {
    let offense = possession.team;

    if possession.result == PossessionResult::Foul {
        state.add_foul(offense.opponent());
    }

    let points = possession.points();
    if points > 0 {
        state.add_points(offense, points);
    }

    let keeps_ball = possession.result == PossessionResult::Foul && !possession.is_bonus_foul();
    state.possession = if keeps_ball {
        offense
    } else {
        offense.opponent()
    };

    state.advance_time(possession.duration, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ClockEvent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Team, Team, GameRules, GameState) {
        let rules = GameRules::default();
        let state = GameState::new(&rules);
        (Team::default_home(), Team::default_away(), rules, state)
    }

    #[test]
    fn test_outcome_weights_sum_to_one() {
        let sum: f64 = PossessionResult::WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pick_outcome_bands() {
        assert_eq!(pick_outcome(0.0), PossessionResult::Shot);
        assert_eq!(pick_outcome(0.79), PossessionResult::Shot);
        assert_eq!(pick_outcome(0.85), PossessionResult::Turnover);
        assert_eq!(pick_outcome(0.95), PossessionResult::Foul);
        assert_eq!(pick_outcome(0.999_999), PossessionResult::Foul);
    }

    #[test]
    fn test_duration_bounds() {
        let rules = GameRules::default();
        assert_eq!(possession_duration(5, &rules, 720, 0.0), 4);
        // pace 5 → half of the 20s span at most
        assert_eq!(possession_duration(5, &rules, 720, 0.999), 13);
        // pace 10 never stretches past the minimum
        assert_eq!(possession_duration(10, &rules, 720, 0.999), 4);
        assert_eq!(possession_duration(1, &rules, 720, 0.999), 21);
    }

    #[test]
    fn test_duration_capped_by_clock() {
        let rules = GameRules::default();
        assert_eq!(possession_duration(1, &rules, 3, 0.9), 3);
        assert_eq!(possession_duration(1, &rules, 0, 0.9), 0);
    }

    #[test]
    fn test_defense_adjustment() {
        // 110 defense takes a point off
        assert!((adjusted_shot_percentage(0.40, 110.0) - 0.39).abs() < 1e-9);
        // weak defense helps
        assert!((adjusted_shot_percentage(0.40, 90.0) - 0.41).abs() < 1e-9);
        // floor
        assert!((adjusted_shot_percentage(0.05, 120.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_is_deterministic_for_seed() {
        let (home, away, rules, state) = setup();
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let pa = resolve_possession(&mut a, &home, &away, &rules, &state);
            let pb = resolve_possession(&mut b, &home, &away, &rules, &state);
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn test_shot_detail_matches_result() {
        let (home, away, rules, state) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..500 {
            let p = resolve_possession(&mut rng, &home, &away, &rules, &state);
            match p.result {
                PossessionResult::Shot => {
                    let shot = p.shot.as_ref().expect("shot possession has a shot");
                    assert!(shot.location.is_field_goal());
                    let expected = if shot.made { shot.location.value() } else { 0 };
                    assert_eq!(shot.points, expected);
                    assert!(p.free_throws.is_empty());
                }
                PossessionResult::Turnover => {
                    assert!(p.shot.is_none());
                    assert!(p.free_throws.is_empty());
                }
                PossessionResult::Foul => assert!(p.shot.is_none()),
            }
            assert_eq!(p.team, Side::Home);
            assert_eq!(p.time_remaining, state.time_remaining - p.duration);
        }
    }

    #[test]
    fn test_bonus_awards_two_free_throws() {
        let (home, away, rules, mut state) = setup();
        // away commits the foul; the 5th foul reaches the threshold
        state.away_team_fouls = 4;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut saw_foul = false;
        for _ in 0..400 {
            let p = resolve_possession(&mut rng, &home, &away, &rules, &state);
            if p.result == PossessionResult::Foul {
                saw_foul = true;
                assert_eq!(p.free_throws.len(), 2);
                for ft in &p.free_throws {
                    assert_eq!(ft.location, ShotLocation::FreeThrow);
                    assert!(ft.points <= 1);
                    assert_eq!(ft.team, Side::Home);
                }
            }
        }
        assert!(saw_foul);
    }

    #[test]
    fn test_no_free_throws_below_bonus() {
        let (home, away, rules, state) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..400 {
            let p = resolve_possession(&mut rng, &home, &away, &rules, &state);
            if p.result == PossessionResult::Foul {
                assert!(p.free_throws.is_empty());
            }
        }
    }

    fn possession(result: PossessionResult, shot: Option<ShotAttempt>) -> Possession {
        Possession {
            team: Side::Home,
            duration: 10,
            result,
            shot,
            free_throws: Vec::new(),
            time_remaining: 710,
            quarter: 1,
        }
    }

    fn shot(location: ShotLocation, made: bool) -> ShotAttempt {
        ShotAttempt {
            team: Side::Home,
            location,
            made,
            points: if made { location.value() } else { 0 },
            time_remaining: 710,
            quarter: 1,
            game_timestamp: "Q1 11:50".into(),
        }
    }

    #[test]
    fn test_apply_made_shot() {
        let (_, _, rules, mut state) = setup();
        let p = possession(
            PossessionResult::Shot,
            Some(shot(ShotLocation::ThreePoint, true)),
        );
        let tick = apply_outcome(&mut state, &rules, &p);
        assert_eq!(state.home_score, 3);
        assert_eq!(state.possession, Side::Away);
        assert_eq!(state.time_remaining, 710);
        assert_eq!(tick.event, ClockEvent::Running);
    }

    #[test]
    fn test_apply_miss_and_turnover_flip() {
        let (_, _, rules, mut state) = setup();
        let miss = possession(PossessionResult::Shot, Some(shot(ShotLocation::Inside, false)));
        apply_outcome(&mut state, &rules, &miss);
        assert_eq!(state.possession, Side::Away);
        assert_eq!(state.home_score, 0);

        let mut turnover = possession(PossessionResult::Turnover, None);
        turnover.team = Side::Away;
        apply_outcome(&mut state, &rules, &turnover);
        assert_eq!(state.possession, Side::Home);
    }

    #[test]
    fn test_apply_non_bonus_foul_keeps_ball() {
        let (_, _, rules, mut state) = setup();
        let foul = possession(PossessionResult::Foul, None);
        apply_outcome(&mut state, &rules, &foul);
        assert_eq!(state.away_team_fouls, 1);
        assert_eq!(state.home_team_fouls, 0);
        assert_eq!(state.possession, Side::Home);
    }

    #[test]
    fn test_apply_bonus_foul_scores_and_flips() {
        let (_, _, rules, mut state) = setup();
        state.away_team_fouls = 4;
        let mut foul = possession(PossessionResult::Foul, None);
        foul.free_throws = vec![
            shot(ShotLocation::FreeThrow, true),
            shot(ShotLocation::FreeThrow, false),
        ];
        apply_outcome(&mut state, &rules, &foul);
        assert_eq!(state.home_score, 1);
        assert_eq!(state.away_team_fouls, 5);
        assert_eq!(state.possession, Side::Away);
    }
}
