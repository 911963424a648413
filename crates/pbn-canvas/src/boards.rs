//! Curated catalog of ready-made boards.
//!
//! Boards are grouped into categories. Picking one sends its image URL to
//! the processing service in place of an upload.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

const BUILTIN_JSON: &str = include_str!("boards.json");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        })
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("{:?} is not a difficulty (easy, medium, hard)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub difficulty: Difficulty,
    /// Human-readable, e.g. `"45 min"`.
    pub estimated_time: String,
    /// Palette size the board is tuned for.
    pub colors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub boards: Vec<Board>,
}

/// Narrows a catalog listing. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone)]
pub struct BoardCatalog {
    categories: Vec<BoardCategory>,
}

impl BoardCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_JSON)
    }

    /// Parses a category list. Board ids must be unique across categories.
    pub fn from_json(text: &str) -> Result<Self> {
        let categories: Vec<BoardCategory> = serde_json::from_str(text)?;
        let mut seen = HashSet::new();
        for board in categories.iter().flat_map(|c| &c.boards) {
            if !seen.insert(board.id.as_str()) {
                return Err(CanvasError::InvalidCatalog(format!("board id {:?} appears twice", board.id)));
            }
        }
        log::debug!("loaded {} boards in {} categories", seen.len(), categories.len());
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[BoardCategory] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&BoardCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Every board, in category order.
    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.categories.iter().flat_map(|c| &c.boards)
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards().find(|b| b.id == id)
    }

    /// Boards matching every set field of `filter`. An unknown category
    /// matches nothing.
    pub fn search(&self, filter: &BoardFilter) -> Vec<&Board> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        self.categories
            .iter()
            .filter(|c| filter.category.as_deref().is_none_or(|id| c.id == id))
            .flat_map(|c| &c.boards)
            .filter(|b| needle.as_deref().is_none_or(|n| b.title.to_lowercase().contains(n)))
            .filter(|b| filter.difficulty.is_none_or(|d| b.difficulty == d))
            .collect()
    }
}
