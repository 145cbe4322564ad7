use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom, index};
use std::collections::HashSet;

use quiz_core::model::{Catalog, ChoiceSet, Item};

use crate::error::SessionError;

/// Draw `size` distinct items from the catalog, uniformly and in random order.
///
/// # Errors
///
/// Returns `SessionError::InsufficientItems` if the catalog is smaller than `size`.
pub(crate) fn draw_round<R: Rng + ?Sized>(
    catalog: &Catalog,
    size: usize,
    rng: &mut R,
) -> Result<Vec<Item>, SessionError> {
    if catalog.len() < size {
        return Err(SessionError::InsufficientItems {
            available: catalog.len(),
            required: size,
        });
    }
    let items = catalog.items();
    Ok(index::sample(rng, items.len(), size)
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}

/// Build the choice set for `correct`: `size - 1` distinct decoy names plus the
/// correct name at a uniformly random position.
///
/// Decoys never repeat the correct name, even when another region lists it.
///
/// # Errors
///
/// Returns `SessionError::InsufficientItems` when fewer than `size` distinct
/// names are available.
pub(crate) fn choice_set<R: Rng + ?Sized>(
    catalog: &Catalog,
    correct: &Item,
    size: usize,
    rng: &mut R,
) -> Result<ChoiceSet, SessionError> {
    let mut seen = HashSet::new();
    seen.insert(correct.name());
    let decoys: Vec<&str> = catalog
        .items()
        .iter()
        .map(Item::name)
        .filter(|name| seen.insert(*name))
        .collect();

    let wanted = size.saturating_sub(1);
    if decoys.len() < wanted {
        return Err(SessionError::InsufficientItems {
            available: decoys.len() + 1,
            required: size,
        });
    }

    let mut names: Vec<String> = decoys
        .choose_multiple(rng, wanted)
        .map(|name| (*name).to_string())
        .collect();
    names.shuffle(rng);
    let at = rng.random_range(0..=names.len());
    names.insert(at, correct.name().to_string());
    Ok(ChoiceSet::new(names))
}
