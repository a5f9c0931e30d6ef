//! Persistent player state: score, health, inventory and bonus letters.
//!
//! The player *entity* (position, box) lives in the world; this model holds
//! what survives between levels and what the reactive systems update.

use serde::Serialize;

use crate::components::{CollectableLetter, InventoryItem};

/// Result of picking up a bonus letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterCollectionState {
    /// Fewer than five letters so far.
    Incomplete,
    /// All five letters, collected in the correct order.
    InOrder,
    /// All five letters, in any other order.
    WrongOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerModel {
    score: u32,
    health: i32,
    max_health: i32,
    inventory: Vec<InventoryItem>,
    letters: Vec<CollectableLetter>,
    mercy_frames_left: u32,
}

impl PlayerModel {
    pub fn new(max_health: i32) -> Self {
        Self {
            score: 0,
            health: max_health,
            max_health,
            inventory: Vec::new(),
            letters: Vec::new(),
            mercy_frames_left: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn give_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_at_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn give_health(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Apply damage unless mercy frames are running. Returns whether damage
    /// was taken; taking damage starts `mercy_frames` of invulnerability.
    pub fn take_damage(&mut self, amount: i32, mercy_frames: u32) -> bool {
        if self.mercy_frames_left > 0 || self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        self.mercy_frames_left = mercy_frames;
        true
    }

    pub fn mercy_frames_left(&self) -> u32 {
        self.mercy_frames_left
    }

    /// Count down invulnerability by one tick.
    pub fn update_mercy_frames(&mut self) {
        self.mercy_frames_left = self.mercy_frames_left.saturating_sub(1);
    }

    pub fn give_item(&mut self, item: InventoryItem) {
        self.inventory.push(item);
    }

    pub fn has_item(&self, item: InventoryItem) -> bool {
        self.inventory.contains(&item)
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn letters(&self) -> &[CollectableLetter] {
        &self.letters
    }

    /// Record a bonus letter and report whether the set is now complete.
    pub fn add_letter(&mut self, letter: CollectableLetter) -> LetterCollectionState {
        self.letters.push(letter);
        if self.letters.len() < CollectableLetter::CORRECT_ORDER.len() {
            return LetterCollectionState::Incomplete;
        }
        if self.letters[..] == CollectableLetter::CORRECT_ORDER[..] {
            LetterCollectionState::InOrder
        } else {
            LetterCollectionState::WrongOrder
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use CollectableLetter::*;

    #[test]
    fn mercy_frames_block_repeated_damage() {
        let mut model = PlayerModel::new(9);
        assert!(model.take_damage(2, 3));
        assert!(!model.take_damage(2, 3));
        for _ in 0..3 {
            model.update_mercy_frames();
        }
        assert!(model.take_damage(2, 3));
        assert_eq!(model.health(), 5);
    }

    #[test]
    fn health_is_capped() {
        let mut model = PlayerModel::new(9);
        model.take_damage(4, 0);
        model.give_health(10);
        assert!(model.is_at_full_health());
    }

    #[test]
    fn letters_in_order() {
        let mut model = PlayerModel::new(9);
        for letter in [N, U, K, E] {
            assert_eq!(model.add_letter(letter), LetterCollectionState::Incomplete);
        }
        assert_eq!(model.add_letter(M), LetterCollectionState::InOrder);
    }

    #[test]
    fn letters_out_of_order() {
        let mut model = PlayerModel::new(9);
        for letter in [U, N, K, E] {
            model.add_letter(letter);
        }
        assert_eq!(model.add_letter(M), LetterCollectionState::WrongOrder);
    }
}
