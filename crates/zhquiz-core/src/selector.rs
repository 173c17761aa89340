//! Question selection.
//!
//! Picks the eligible items for a mode, orders them, and hands them out one
//! `Question` at a time. Each call to [`select`] starts from scratch; there is
//! no cursor shared between selections.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::QuizError;
use crate::model::{DictionaryItem, Direction, Mode, Order};
use crate::question::Question;
use crate::store::DictionaryStore;

/// The ordered questions of one session.
#[derive(Debug)]
pub struct Selection<'a> {
    direction: Direction,
    items: std::vec::IntoIter<&'a DictionaryItem>,
}

impl<'a> Iterator for Selection<'a> {
    type Item = Question<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items
            .next()
            .map(|item| Question::new(item, self.direction))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Selection<'_> {}

/// Select the questions for a session.
///
/// Items are filtered to the mode's kinds and to those that can be asked in
/// the mode's direction, ordered by kind then identifier, shuffled with `rng`
/// unless the mode asks for sorted order, and truncated to the mode's limit.
pub fn select<'a, R>(
    store: &'a DictionaryStore,
    mode: &Mode,
    rng: &mut R,
) -> Result<Selection<'a>, QuizError>
where
    R: Rng + ?Sized,
{
    let mut items: Vec<&DictionaryItem> = mode
        .kinds
        .iter()
        .flat_map(|&kind| store.items(kind))
        .filter(|item| {
            let eligible = item.is_eligible(mode.direction);
            if !eligible {
                tracing::debug!(
                    "skipping {} '{}': not askable {}",
                    item.kind,
                    item.id,
                    mode.direction
                );
            }
            eligible
        })
        .collect();

    if items.is_empty() {
        return Err(QuizError::EmptySelection {
            kinds: mode.kinds.clone(),
            direction: mode.direction,
        });
    }

    if mode.order == Order::Shuffled {
        items.shuffle(rng);
    }

    if let Some(max) = mode.limit.max() {
        items.truncate(max);
    }

    tracing::debug!("selected {} questions", items.len());

    Ok(Selection {
        direction: mode.direction,
        items: items.into_iter(),
    })
}
