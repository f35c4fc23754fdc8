//! Conflict policy: the per-flush insert-vs-update coin flip.
//!
//! Evaluated once per flush, never per row, so an entire batch shares
//! one outcome. The append-only transaction table never consults it.

use crate::rng::PercentSource;

/// How the store resolves a key collision for one flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// `ON CONFLICT (key) DO UPDATE SET` every non-key column.
    UpdateOnConflict,
    /// `ON CONFLICT DO NOTHING`.
    IgnoreOnConflict,
}

impl ConflictAction {
    /// Draw in [1, 100]; at or below `update_freq` means update.
    /// 0 always ignores, 100 always updates.
    pub fn choose(update_freq: u32, src: &mut dyn PercentSource) -> Self {
        if src.percent() <= update_freq {
            Self::UpdateOnConflict
        } else {
            Self::IgnoreOnConflict
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl PercentSource for Fixed {
        fn percent(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn boundary_draw_equal_to_freq_updates() {
        let action = ConflictAction::choose(10, &mut Fixed(10));
        assert_eq!(action, ConflictAction::UpdateOnConflict);
        let action = ConflictAction::choose(10, &mut Fixed(11));
        assert_eq!(action, ConflictAction::IgnoreOnConflict);
    }
}
