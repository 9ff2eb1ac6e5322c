//! Decision tables for the toggle ledgers. Given what is stored and what was
//! asked for, decide the single row change to make. No store access here.

use scout_types::models::{VoteState, VoteValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// No vote yet: record one in the requested direction.
    Insert(VoteValue),
    /// Vote in the other direction: switch it.
    Update(VoteValue),
    /// Vote in the same direction: retract it.
    Delete,
}

impl VoteAction {
    /// Vote state once the action has been applied.
    pub fn resulting_state(&self) -> VoteState {
        match self {
            Self::Insert(value) | Self::Update(value) => VoteState::from(Some(*value)),
            Self::Delete => VoteState::None,
        }
    }
}

/// Casting a vote toggles that direction: same direction retracts,
/// opposite direction switches.
pub fn decide_vote(existing: Option<VoteValue>, requested: VoteValue) -> VoteAction {
    match existing {
        None => VoteAction::Insert(requested),
        Some(current) if current == requested => VoteAction::Delete,
        Some(_) => VoteAction::Update(requested),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Insert,
    Delete,
}

impl FavoriteAction {
    pub fn is_favorite(&self) -> bool {
        matches!(self, Self::Insert)
    }
}

pub fn decide_favorite(exists: bool) -> FavoriteAction {
    if exists {
        FavoriteAction::Delete
    } else {
        FavoriteAction::Insert
    }
}
