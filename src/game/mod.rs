//! Hunt progression engine
//!
//! All progression writes go through here. Each operation runs in a single
//! transaction; duplicate-completion checks are conditional inserts whose
//! change count decides the outcome, so a double-submitted click can never
//! award points twice.

mod answer;

pub use answer::{matches_final_answer, normalize};

use std::collections::BTreeMap;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::catalog::{Catalog, PhotoFrame, Step};
use crate::domain::{game_key, GameId, Phase, Progress, StepId};
use crate::error::AppError;
use crate::store::HuntDb;

/// Points awarded for a game when the request names no value
pub const DEFAULT_GAME_POINTS: i64 = 100;

/// Full progress snapshot returned by `GET /api/game/progress`.
///
/// Carries the whole step catalog so clients have a single source of truth
/// for titles, payloads and point values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(flatten)]
    pub progress: Progress,
    pub total_score: i64,
    pub available_points: i64,
    pub clues: Vec<Step>,
}

/// Outcome of a game completion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCompletion {
    pub already_completed: bool,
    pub points_earned: i64,
    pub current_game_index: usize,
    pub total_score: i64,
    pub available_points: i64,
}

/// Outcome of a passed final-answer gate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCompletion {
    pub points_earned: i64,
    pub next_clue: Option<StepId>,
    pub total_score: i64,
    pub available_points: i64,
}

/// Outcome of a bonus task completion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletion {
    pub points_earned: i64,
    pub total_score: i64,
    pub available_points: i64,
}

/// One answered part of a multi-part game
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    pub is_correct: bool,
}

/// A hunt location with the player's standing at it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub clue_number: StepId,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<PhotoFrame>,
    pub is_completed: bool,
    pub is_current: bool,
    pub is_locked: bool,
}

struct PlayerTotals {
    total_score: i64,
    available_points: i64,
    current_step: Option<StepId>,
    current_game_index: usize,
    updated_at: i64,
}

/// The progression engine: catalog lookups plus transactional state updates
#[derive(Clone)]
pub struct ProgressEngine {
    db: HuntDb,
    catalog: Arc<Catalog>,
}

impl ProgressEngine {
    pub fn new(db: HuntDb, catalog: Arc<Catalog>) -> Self {
        Self { db, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The player's progress record
    pub fn progress(&self, username: &str) -> Result<Progress, AppError> {
        let conn = self.db.conn();
        load_progress(&conn, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Progress plus totals plus the full catalog
    pub fn snapshot(&self, username: &str) -> Result<ProgressSnapshot, AppError> {
        let conn = self.db.conn();
        let totals = read_totals(&conn, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let progress = build_progress(&conn, username, &totals)?;
        Ok(ProgressSnapshot {
            progress,
            total_score: totals.total_score,
            available_points: totals.available_points,
            clues: self.catalog.steps().to_vec(),
        })
    }

    /// Where the player stands in the step/game state machine
    pub fn phase(&self, username: &str) -> Result<Phase, AppError> {
        let progress = self.progress(username)?;
        let games = progress
            .current_clue
            .and_then(|id| self.catalog.step(id))
            .map(|step| step.game_ids())
            .unwrap_or_default();
        Ok(Phase::of(&progress, &games))
    }

    /// Mark one game done and award its points exactly once.
    ///
    /// Repeat calls succeed without awarding anything. The active game index
    /// moves to this game's position within its step.
    pub fn complete_game(
        &self,
        username: &str,
        step_id: StepId,
        game_id: GameId,
        points: Option<i64>,
    ) -> Result<GameCompletion, AppError> {
        let step = self
            .catalog
            .step(step_id)
            .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;
        let position = step
            .game_position(game_id)
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
        let points = points.unwrap_or(DEFAULT_GAME_POINTS);
        let now = chrono::Utc::now().timestamp_millis();

        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;
        ensure_player(&tx, username)?;

        let fresh = tx
            .execute(
                "INSERT OR IGNORE INTO completed_games (username, step_id, game_id, points_earned, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![username, step_id, game_id, points, now],
            )
            .map_err(AppError::from)?
            == 1;

        if fresh {
            tx.execute(
                "UPDATE players SET total_score = total_score + ?1,
                        available_points = available_points + ?1,
                        current_game_index = ?2, updated_at = ?3
                 WHERE username = ?4",
                params![points, position as i64, now, username],
            )
            .map_err(AppError::from)?;
        }

        let totals = read_totals(&tx, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        tx.commit().map_err(AppError::from)?;

        Ok(GameCompletion {
            already_completed: !fresh,
            points_earned: if fresh { points } else { 0 },
            current_game_index: totals.current_game_index,
            total_score: totals.total_score,
            available_points: totals.available_points,
        })
    }

    /// Check a step's final answer and advance to the next step.
    ///
    /// Steps without an expected answer accept any submission. The current
    /// step only ever moves forward; completing an earlier step late never
    /// pulls it back.
    pub fn complete_step(
        &self,
        username: &str,
        step_id: StepId,
        submitted: &str,
    ) -> Result<StepCompletion, AppError> {
        let step = self
            .catalog
            .step(step_id)
            .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;

        if let Some(expected) = &step.final_answer {
            if !matches_final_answer(expected, submitted) {
                return Err(AppError::InvalidAnswer);
            }
        }

        let awarded = step.points.completion;
        let now = chrono::Utc::now().timestamp_millis();

        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;
        ensure_player(&tx, username)?;

        let fresh = tx
            .execute(
                "INSERT OR IGNORE INTO completed_steps (username, step_id, points_earned, completed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, step_id, awarded, now],
            )
            .map_err(AppError::from)?
            == 1;
        if !fresh {
            return Err(AppError::AlreadyCompleted("Clue already completed".to_string()));
        }

        let next = self.advance_current(&tx, username, step_id, now)?;
        tx.execute(
            "UPDATE players SET total_score = total_score + ?1,
                    available_points = available_points + ?1
             WHERE username = ?2",
            params![awarded, username],
        )
        .map_err(AppError::from)?;

        let totals = read_totals(&tx, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        tx.commit().map_err(AppError::from)?;

        Ok(StepCompletion {
            points_earned: awarded,
            next_clue: next,
            total_score: totals.total_score,
            available_points: totals.available_points,
        })
    }

    /// Award a step's bonus task once the step itself is done
    pub fn complete_task(
        &self,
        username: &str,
        step_id: StepId,
    ) -> Result<TaskCompletion, AppError> {
        let step = self
            .catalog
            .step(step_id)
            .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;
        let awarded = step.points.bonus;
        let now = chrono::Utc::now().timestamp_millis();

        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;
        ensure_player(&tx, username)?;

        let step_done: bool = tx
            .query_row(
                "SELECT 1 FROM completed_steps WHERE username = ?1 AND step_id = ?2",
                params![username, step_id],
                |_| Ok(true),
            )
            .optional()
            .map_err(AppError::from)?
            .unwrap_or(false);
        if !step_done {
            return Err(AppError::Invalid("Complete the clue first".to_string()));
        }

        let fresh = tx
            .execute(
                "INSERT OR IGNORE INTO completed_tasks (username, step_id, points_earned, completed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, step_id, awarded, now],
            )
            .map_err(AppError::from)?
            == 1;
        if !fresh {
            return Err(AppError::AlreadyCompleted("Task already completed".to_string()));
        }

        tx.execute(
            "UPDATE players SET total_score = total_score + ?1,
                    available_points = available_points + ?1, updated_at = ?2
             WHERE username = ?3",
            params![awarded, now, username],
        )
        .map_err(AppError::from)?;

        let totals = read_totals(&tx, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        tx.commit().map_err(AppError::from)?;

        Ok(TaskCompletion {
            points_earned: awarded,
            total_score: totals.total_score,
            available_points: totals.available_points,
        })
    }

    /// Check one part of a multi-part game against the catalog's answer.
    ///
    /// The expected answer lives server-side; clients only send their text.
    pub fn validate_part(
        &self,
        username: &str,
        step_id: StepId,
        game_id: GameId,
        part_index: usize,
        submitted: &str,
    ) -> Result<PartResult, AppError> {
        let game = self
            .catalog
            .game(step_id, game_id)
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
        let parts = game
            .payload
            .parts()
            .ok_or_else(|| AppError::Invalid("Game has no answer steps".to_string()))?;
        let part = parts
            .get(part_index)
            .ok_or_else(|| AppError::NotFound("Game step not found".to_string()))?;

        let is_correct = normalize(submitted) == normalize(&part.correct_answer);
        if is_correct {
            let now = chrono::Utc::now().timestamp_millis();
            let conn = self.db.conn();
            conn.execute(
                "INSERT OR REPLACE INTO game_part_answers (username, step_id, game_id, part_index, correct, answered_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5)",
                params![username, step_id, game_id, part_index as i64, now],
            )
            .map_err(AppError::from)?;
        }
        Ok(PartResult { is_correct })
    }

    /// Which parts of a multi-part game the player has answered
    pub fn part_progress(
        &self,
        username: &str,
        step_id: StepId,
        game_id: GameId,
    ) -> Result<BTreeMap<String, PartResult>, AppError> {
        self.catalog
            .game(step_id, game_id)
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        let conn = self.db.conn();
        let mut stmt = conn
            .prepare(
                "SELECT part_index FROM game_part_answers
                 WHERE username = ?1 AND step_id = ?2 AND game_id = ?3 AND correct = 1
                 ORDER BY part_index",
            )
            .map_err(AppError::from)?;
        let rows = stmt
            .query_map(params![username, step_id, game_id], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(AppError::from)?;

        let mut progress = BTreeMap::new();
        for row in rows {
            let index = row.map_err(AppError::from)?;
            progress.insert(index.to_string(), PartResult { is_correct: true });
        }
        Ok(progress)
    }

    /// Every hunt location flagged with the player's standing
    pub fn locations(&self, username: &str) -> Result<Vec<LocationView>, AppError> {
        let progress = self.progress(username)?;
        let views = self
            .catalog
            .steps()
            .iter()
            .map(|step| LocationView {
                clue_number: step.id,
                title: step.title.clone(),
                lat: step.location.lat,
                lng: step.location.lng,
                name: step.location.name.clone(),
                address: step.location.address.clone(),
                filter: step.filter.clone(),
                is_completed: progress.is_step_completed(step.id),
                is_current: progress.current_clue == Some(step.id),
                is_locked: progress
                    .current_clue
                    .map_or(false, |current| step.id > current),
            })
            .collect();
        Ok(views)
    }

    /// Admin: mark a step completed without points and advance the player
    pub fn skip_step(&self, username: &str, step_id: StepId) -> Result<Option<StepId>, AppError> {
        self.catalog
            .step(step_id)
            .ok_or_else(|| AppError::NotFound("Clue not found".to_string()))?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;
        ensure_player(&tx, username)?;

        tx.execute(
            "INSERT OR IGNORE INTO completed_steps (username, step_id, points_earned, completed_at)
             VALUES (?1, ?2, 0, ?3)",
            params![username, step_id, now],
        )
        .map_err(AppError::from)?;

        let next = self.advance_current(&tx, username, step_id, now)?;
        tx.commit().map_err(AppError::from)?;
        Ok(next)
    }

    /// Wipe a player's progression back to the first step
    pub fn reset(&self, username: &str) -> Result<(), AppError> {
        let first = self.catalog.first_step_id();
        let now = chrono::Utc::now().timestamp_millis();

        let mut conn = self.db.conn();
        let tx = conn.transaction().map_err(AppError::from)?;
        ensure_player(&tx, username)?;

        for table in ["completed_steps", "completed_tasks", "completed_games", "game_part_answers"] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE username = ?1"),
                params![username],
            )
            .map_err(AppError::from)?;
        }
        tx.execute(
            "UPDATE players SET total_score = 0, available_points = 0,
                    current_step = ?1, current_game_index = 0, updated_at = ?2
             WHERE username = ?3",
            params![first, now, username],
        )
        .map_err(AppError::from)?;

        tx.commit().map_err(AppError::from)?;
        Ok(())
    }

    /// Move `current_step` past a just-completed step.
    ///
    /// The new value is the lowest catalog id strictly greater than the
    /// completed step, or the terminal sentinel when none remains. A player
    /// already further along stays where they are.
    fn advance_current(
        &self,
        conn: &Connection,
        username: &str,
        completed: StepId,
        now: i64,
    ) -> Result<Option<StepId>, AppError> {
        let totals = read_totals(conn, username)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let next = self.catalog.next_step_after(completed);
        let new_current = match (totals.current_step, next) {
            (None, _) => None,
            (Some(_), None) => None,
            (Some(current), Some(n)) => Some(n.max(current)),
        };

        conn.execute(
            "UPDATE players SET current_step = ?1, current_game_index = 0, updated_at = ?2
             WHERE username = ?3",
            params![new_current, now, username],
        )
        .map_err(AppError::from)?;
        Ok(new_current)
    }
}

fn ensure_player(conn: &Connection, username: &str) -> Result<(), AppError> {
    let exists: bool = conn
        .query_row(
            "SELECT 1 FROM players WHERE username = ?1",
            params![username],
            |_| Ok(true),
        )
        .optional()
        .map_err(AppError::from)?
        .unwrap_or(false);
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".to_string()))
    }
}

fn read_totals(conn: &Connection, username: &str) -> Result<Option<PlayerTotals>, AppError> {
    let totals = conn
        .query_row(
            "SELECT total_score, available_points, current_step, current_game_index, updated_at
             FROM players WHERE username = ?1",
            params![username],
            |row| {
                let index: i64 = row.get(3)?;
                Ok(PlayerTotals {
                    total_score: row.get(0)?,
                    available_points: row.get(1)?,
                    current_step: row.get(2)?,
                    current_game_index: index.max(0) as usize,
                    updated_at: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(AppError::from)?;
    Ok(totals)
}

fn build_progress(
    conn: &Connection,
    username: &str,
    totals: &PlayerTotals,
) -> Result<Progress, AppError> {
    let mut completed_clues = Vec::new();
    let mut stmt = conn
        .prepare("SELECT step_id FROM completed_steps WHERE username = ?1 ORDER BY step_id")
        .map_err(AppError::from)?;
    let rows = stmt
        .query_map(params![username], |row| row.get::<_, StepId>(0))
        .map_err(AppError::from)?;
    for row in rows {
        completed_clues.push(row.map_err(AppError::from)?);
    }

    let mut completed_tasks = Vec::new();
    let mut stmt = conn
        .prepare("SELECT step_id FROM completed_tasks WHERE username = ?1 ORDER BY step_id")
        .map_err(AppError::from)?;
    let rows = stmt
        .query_map(params![username], |row| row.get::<_, StepId>(0))
        .map_err(AppError::from)?;
    for row in rows {
        completed_tasks.push(row.map_err(AppError::from)?);
    }

    let mut completed_games = BTreeMap::new();
    let mut stmt = conn
        .prepare("SELECT step_id, game_id FROM completed_games WHERE username = ?1")
        .map_err(AppError::from)?;
    let rows = stmt
        .query_map(params![username], |row| {
            Ok((row.get::<_, StepId>(0)?, row.get::<_, GameId>(1)?))
        })
        .map_err(AppError::from)?;
    for row in rows {
        let (step_id, game_id) = row.map_err(AppError::from)?;
        completed_games.insert(game_key(step_id, game_id), true);
    }

    Ok(Progress {
        current_clue: totals.current_step,
        completed_clues,
        completed_tasks,
        completed_games,
        current_game_index: totals.current_game_index,
        last_updated: totals.updated_at,
    })
}

fn load_progress(conn: &Connection, username: &str) -> Result<Option<Progress>, AppError> {
    let Some(totals) = read_totals(conn, username)? else {
        return Ok(None);
    };
    Ok(Some(build_progress(conn, username, &totals)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::store::{NewPlayer, PlayerStore};

    fn test_catalog() -> Catalog {
        Catalog::from_toml(
            r#"
            [[steps]]
            id = 1
            title = "First Stop"
            description = "Warm up"
            finalAnswer = "trader joes"
            bonusTask = "Do 55 jumping jacks"
            location = { lat = 42.35, lng = -71.07, name = "Trader Joe's" }

            [steps.points]
            completion = 100
            bonus = 50

            [[steps.games]]
            id = 1
            title = "Warmup Search"
            points = 100
            component = "WordSearch"
            words = ["TRADER", "JOES"]

            [[steps.games]]
            id = 2
            title = "Warmup Wordle"
            points = 150
            component = "Wordle"
            answer = "CHIPS"

            [[steps]]
            id = 2
            title = "Second Stop"
            description = "Keep going"
            finalAnswer = "dunkin donuts"
            bonusTask = "Text the group chat"
            location = { lat = 42.35, lng = -71.07, name = "Dunkin'" }

            [steps.points]
            completion = 100
            bonus = 50

            [[steps.games]]
            id = 1
            title = "Name That Tree"
            points = 100
            component = "MultiStepTextInput"

            [[steps.games.steps]]
            question = "Which conifer drops its needles?"
            correctAnswer = "larch"

            [[steps.games.steps]]
            question = "Which fig strangles its host?"
            correctAnswer = "banyan"

            [[steps]]
            id = 4
            title = "Finale"
            description = "Celebrate"
            bonusTask = "Watch the sunset"
            location = { lat = 42.36, lng = -71.05, name = "Charles River" }

            [steps.points]
            completion = 200
            bonus = 100

            [[steps.games]]
            id = 1
            title = "Victory Lap"
            points = 100
            component = "Placeholder"
            description = "You made it"
            "#,
        )
        .unwrap()
    }

    fn test_engine() -> ProgressEngine {
        let db = HuntDb::open_in_memory().unwrap();
        let engine = ProgressEngine::new(db.clone(), Arc::new(test_catalog()));
        PlayerStore::new(db)
            .create(&NewPlayer {
                username: "raj42".to_string(),
                name: "Raj".to_string(),
                email: "raj@example.com".to_string(),
                password_hash: "h".to_string(),
                password_salt: "s".to_string(),
                role: Role::Player,
                starting_step: 1,
            })
            .unwrap();
        engine
    }

    #[test]
    fn game_completion_is_idempotent() {
        let engine = test_engine();

        let first = engine.complete_game("raj42", 1, 1, Some(100)).unwrap();
        assert!(!first.already_completed);
        assert_eq!(first.points_earned, 100);
        assert_eq!(first.total_score, 100);

        let second = engine.complete_game("raj42", 1, 1, Some(100)).unwrap();
        assert!(second.already_completed);
        assert_eq!(second.points_earned, 0);
        assert_eq!(second.total_score, 100);
        assert_eq!(second.available_points, 100);
    }

    #[test]
    fn game_points_default_when_missing() {
        let engine = test_engine();
        let done = engine.complete_game("raj42", 1, 2, None).unwrap();
        assert_eq!(done.points_earned, DEFAULT_GAME_POINTS);
    }

    #[test]
    fn game_completion_moves_active_index() {
        let engine = test_engine();
        let done = engine.complete_game("raj42", 1, 2, Some(150)).unwrap();
        assert_eq!(done.current_game_index, 1);
    }

    #[test]
    fn unknown_step_or_game_is_rejected() {
        let engine = test_engine();
        assert!(matches!(
            engine.complete_game("raj42", 99, 1, None),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            engine.complete_game("raj42", 1, 99, None),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            engine.complete_step("raj42", 99, "anything"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_player_is_rejected() {
        let engine = test_engine();
        assert!(matches!(
            engine.complete_game("ghost", 1, 1, None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn step_gate_awards_and_advances() {
        let engine = test_engine();

        let done = engine
            .complete_step("raj42", 1, "I stopped at Trader Joes today")
            .unwrap();
        assert_eq!(done.points_earned, 100);
        assert_eq!(done.next_clue, Some(2));

        let progress = engine.progress("raj42").unwrap();
        assert_eq!(progress.current_clue, Some(2));
        assert_eq!(progress.completed_clues, vec![1]);
        assert_eq!(progress.current_game_index, 0);
    }

    #[test]
    fn wrong_answer_is_rejected_without_state_change() {
        let engine = test_engine();
        assert!(matches!(
            engine.complete_step("raj42", 1, "whole foods"),
            Err(AppError::InvalidAnswer)
        ));
        let progress = engine.progress("raj42").unwrap();
        assert!(progress.completed_clues.is_empty());
        assert_eq!(progress.current_clue, Some(1));
    }

    #[test]
    fn completed_step_gate_never_passes_again() {
        let engine = test_engine();
        engine.complete_step("raj42", 1, "trader joes").unwrap();

        let before = engine.snapshot("raj42").unwrap();
        let err = engine.complete_step("raj42", 1, "trader joes").unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted(_)));

        let after = engine.snapshot("raj42").unwrap();
        assert_eq!(after.total_score, before.total_score);
        assert_eq!(after.progress.current_clue, before.progress.current_clue);
    }

    #[test]
    fn gate_without_answer_accepts_anything() {
        let engine = test_engine();
        engine.complete_step("raj42", 1, "trader joes").unwrap();
        engine.complete_step("raj42", 2, "dunkin").unwrap();

        // The finale has no expected answer
        let done = engine.complete_step("raj42", 4, "celebration").unwrap();
        assert_eq!(done.next_clue, None);
        assert!(engine.progress("raj42").unwrap().is_finished());
    }

    #[test]
    fn advance_skips_catalog_gaps() {
        let engine = test_engine();
        engine.complete_step("raj42", 1, "trader joes").unwrap();
        // Step ids jump from 2 to 4; the scan must land on 4
        let done = engine.complete_step("raj42", 2, "dunkin donuts").unwrap();
        assert_eq!(done.next_clue, Some(4));
    }

    #[test]
    fn current_step_never_moves_backward() {
        let engine = test_engine();
        engine.skip_step("raj42", 1).unwrap();
        engine.skip_step("raj42", 2).unwrap();
        assert_eq!(engine.progress("raj42").unwrap().current_clue, Some(4));

        // Step 2 was skipped without its gate; completing step 1 again is
        // impossible, but a late gate on an uncompleted earlier step must
        // not pull the player back. Reset step 2's completion to simulate.
        let db = engine.db.clone();
        db.conn()
            .execute(
                "DELETE FROM completed_steps WHERE username = 'raj42' AND step_id = 2",
                [],
            )
            .unwrap();

        engine.complete_step("raj42", 2, "dunkin").unwrap();
        assert_eq!(engine.progress("raj42").unwrap().current_clue, Some(4));
    }

    #[test]
    fn bonus_task_requires_completed_step() {
        let engine = test_engine();
        assert!(matches!(
            engine.complete_task("raj42", 1),
            Err(AppError::Invalid(_))
        ));

        engine.complete_step("raj42", 1, "trader joes").unwrap();
        let done = engine.complete_task("raj42", 1).unwrap();
        assert_eq!(done.points_earned, 50);

        let err = engine.complete_task("raj42", 1).unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted(_)));
    }

    #[test]
    fn step_one_end_to_end_totals() {
        let engine = test_engine();

        engine.complete_game("raj42", 1, 1, Some(100)).unwrap();
        engine.complete_game("raj42", 1, 2, Some(150)).unwrap();
        let done = engine.complete_step("raj42", 1, "trader joes").unwrap();

        // Two game awards plus the completion award
        assert_eq!(done.total_score, 100 + 150 + 100);
        assert_eq!(done.available_points, 350);
        assert_eq!(done.next_clue, Some(2));

        let progress = engine.progress("raj42").unwrap();
        assert!(progress.completed_clues.contains(&1));
        assert!(progress.is_game_completed(1, 1));
        assert!(progress.is_game_completed(1, 2));
    }

    #[test]
    fn total_score_survives_spending_but_reset_zeroes_both() {
        let engine = test_engine();
        engine.complete_game("raj42", 1, 1, Some(100)).unwrap();
        engine.complete_step("raj42", 1, "trader joes").unwrap();

        engine.reset("raj42").unwrap();
        let snapshot = engine.snapshot("raj42").unwrap();
        assert_eq!(snapshot.total_score, 0);
        assert_eq!(snapshot.available_points, 0);
        assert_eq!(snapshot.progress.current_clue, Some(1));
        assert!(snapshot.progress.completed_clues.is_empty());
        assert!(snapshot.progress.completed_tasks.is_empty());
        assert!(snapshot.progress.completed_games.is_empty());
        assert_eq!(snapshot.progress.current_game_index, 0);
    }

    #[test]
    fn snapshot_carries_catalog() {
        let engine = test_engine();
        let snapshot = engine.snapshot("raj42").unwrap();
        assert_eq!(snapshot.clues.len(), 3);
        assert_eq!(snapshot.clues[0].id, 1);
    }

    #[test]
    fn phase_tracks_state_machine() {
        let engine = test_engine();
        assert_eq!(
            engine.phase("raj42").unwrap(),
            Phase::InStep { step_id: 1, game_index: 0 }
        );

        engine.complete_game("raj42", 1, 1, None).unwrap();
        engine.complete_game("raj42", 1, 2, None).unwrap();
        assert_eq!(engine.phase("raj42").unwrap(), Phase::AwaitingAnswer { step_id: 1 });

        engine.complete_step("raj42", 1, "trader joes").unwrap();
        assert_eq!(
            engine.phase("raj42").unwrap(),
            Phase::InStep { step_id: 2, game_index: 0 }
        );
    }

    #[test]
    fn part_validation_records_progress() {
        let engine = test_engine();

        let wrong = engine.validate_part("raj42", 2, 1, 0, "oak").unwrap();
        assert!(!wrong.is_correct);
        assert!(engine.part_progress("raj42", 2, 1).unwrap().is_empty());

        let right = engine.validate_part("raj42", 2, 1, 0, " Larch ").unwrap();
        assert!(right.is_correct);
        let progress = engine.part_progress("raj42", 2, 1).unwrap();
        assert!(progress.get("0").map(|p| p.is_correct).unwrap_or(false));

        assert!(matches!(
            engine.validate_part("raj42", 2, 1, 9, "larch"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            engine.validate_part("raj42", 1, 1, 0, "larch"),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn locations_reflect_standing() {
        let engine = test_engine();
        engine.complete_step("raj42", 1, "trader joes").unwrap();

        let locations = engine.locations("raj42").unwrap();
        assert_eq!(locations.len(), 3);

        let first = &locations[0];
        assert!(first.is_completed);
        assert!(!first.is_current);
        assert!(!first.is_locked);

        let second = &locations[1];
        assert!(second.is_current);
        assert!(!second.is_locked);

        let finale = &locations[2];
        assert!(!finale.is_completed);
        assert!(finale.is_locked);
    }

    #[test]
    fn skip_step_awards_nothing() {
        let engine = test_engine();
        let next = engine.skip_step("raj42", 1).unwrap();
        assert_eq!(next, Some(2));

        let snapshot = engine.snapshot("raj42").unwrap();
        assert_eq!(snapshot.total_score, 0);
        assert!(snapshot.progress.completed_clues.contains(&1));
    }
}
