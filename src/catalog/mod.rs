//! The hunt content catalog: steps, games and their payloads.
//!
//! The catalog is loaded once at process start (embedded default or a TOML
//! file named in config) and injected read-only into the engine and the HTTP
//! state. It is the single source of truth for hunt content; clients receive
//! it inside the progress response and never carry their own copy.

mod builtin;

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{GameId, StepId};

pub use builtin::builtin;

/// Point values attached to a step: `completion` is awarded when the
/// final-answer gate passes, `bonus` when the optional bonus task is done.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepPoints {
    pub completion: i64,
    pub bonus: i64,
}

/// Real-world target of a step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Where a decorative frame overlay sits on an uploaded photo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramePosition {
    Top,
    #[default]
    Bottom,
    Center,
    Corner,
}

/// Decorative frame metadata applied to photos taken at a step's location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFrame {
    pub frame_url: String,
    pub overlay_text: String,
    #[serde(default)]
    pub position: FramePosition,
}

/// One quiz/trivia prompt with the index of the correct option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

/// One sub-prompt of a multi-part text game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePart {
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// One selectable item of a connections grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionItem {
    pub text: String,
    pub category: String,
}

/// Widget payload of a game. The `component` tag tells clients which widget
/// to render; each variant carries exactly the props that widget needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "component", rename_all_fields = "camelCase")]
pub enum GamePayload {
    WordSearch {
        words: Vec<String>,
    },
    ShoppingList {
        items: Vec<String>,
    },
    QuickQuiz {
        questions: Vec<QuizQuestion>,
        time_limit: u32,
        required_correct: usize,
    },
    TextInput {
        question: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
        answer: String,
    },
    MultiStepTextInput {
        steps: Vec<GamePart>,
    },
    ImageGuess {
        image_url: String,
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer: Option<String>,
    },
    VideoGuess {
        video_url: String,
        question: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        answers: Vec<String>,
    },
    Wordle {
        answer: String,
    },
    Connections {
        categories: Vec<String>,
        items: Vec<ConnectionItem>,
    },
    AudioGuess {
        audio_url: String,
        question: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        answers: Vec<String>,
    },
    MultipleChoice {
        question: String,
        options: Vec<String>,
    },
    Slideshow {
        images: Vec<String>,
    },
    Placeholder {
        description: String,
    },
    JigsawPuzzle {
        image_url: String,
    },
    TriviaQuestion {
        questions: Vec<QuizQuestion>,
    },
}

impl GamePayload {
    /// The widget tag as sent to clients
    pub fn component(&self) -> &'static str {
        match self {
            GamePayload::WordSearch { .. } => "WordSearch",
            GamePayload::ShoppingList { .. } => "ShoppingList",
            GamePayload::QuickQuiz { .. } => "QuickQuiz",
            GamePayload::TextInput { .. } => "TextInput",
            GamePayload::MultiStepTextInput { .. } => "MultiStepTextInput",
            GamePayload::ImageGuess { .. } => "ImageGuess",
            GamePayload::VideoGuess { .. } => "VideoGuess",
            GamePayload::Wordle { .. } => "Wordle",
            GamePayload::Connections { .. } => "Connections",
            GamePayload::AudioGuess { .. } => "AudioGuess",
            GamePayload::MultipleChoice { .. } => "MultipleChoice",
            GamePayload::Slideshow { .. } => "Slideshow",
            GamePayload::Placeholder { .. } => "Placeholder",
            GamePayload::JigsawPuzzle { .. } => "JigsawPuzzle",
            GamePayload::TriviaQuestion { .. } => "TriviaQuestion",
        }
    }

    /// The sub-prompts of a multi-part game, if this is one
    pub fn parts(&self) -> Option<&[GamePart]> {
        match self {
            GamePayload::MultiStepTextInput { steps } => Some(steps),
            _ => None,
        }
    }
}

/// One mini-game within a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub points: i64,
    #[serde(flatten)]
    pub payload: GamePayload,
}

/// One stage of the hunt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    /// Expected free-text gate answer; `None` means the step completes on
    /// any submission (used for the finale)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
    pub bonus_task: String,
    pub points: StepPoints,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<PhotoFrame>,
    pub games: Vec<Game>,
}

impl Step {
    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.iter().find(|g| g.id == game_id)
    }

    /// Position of a game within this step's ordered list
    pub fn game_position(&self, game_id: GameId) -> Option<usize> {
        self.games.iter().position(|g| g.id == game_id)
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        self.games.iter().map(|g| g.id).collect()
    }
}

/// Immutable, validated collection of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    steps: Vec<Step>,
}

impl Catalog {
    /// Build a catalog from steps, rejecting structural defects up front
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let catalog = Self { steps };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content).context("Failed to parse catalog TOML")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))
    }

    /// Load the configured catalog file, or fall back to the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(builtin().clone()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            bail!("Catalog has no steps");
        }

        let mut step_ids = std::collections::HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id) {
                bail!("Duplicate step id {} in catalog", step.id);
            }

            let mut game_ids = std::collections::HashSet::new();
            for game in &step.games {
                if !game_ids.insert(game.id) {
                    bail!("Duplicate game id {} in step {}", game.id, step.id);
                }
            }

            // Gate-less steps are allowed to have no games (pure ceremony),
            // gated steps need at least one game to pass through.
            if step.final_answer.is_some() && step.games.is_empty() {
                bail!("Step {} has an answer gate but no games", step.id);
            }
        }

        Ok(())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn game(&self, step_id: StepId, game_id: GameId) -> Option<&Game> {
        self.step(step_id).and_then(|s| s.game(game_id))
    }

    /// The id a fresh player starts at
    pub fn first_step_id(&self) -> StepId {
        // Validation guarantees at least one step.
        self.steps.iter().map(|s| s.id).min().unwrap_or(1)
    }

    /// The lowest step id strictly greater than `id`, or `None` at the end.
    /// Ids need not be contiguous; this is a linear scan over a small list.
    pub fn next_step_after(&self, id: StepId) -> Option<StepId> {
        self.steps.iter().map(|s| s.id).filter(|&s| s > id).min()
    }
}
