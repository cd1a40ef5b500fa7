//! Record ordering.
//!
//! Records are ordered by the display string of one field, using a collation
//! that approximates a locale-aware comparison for Latin scripts:
//!
//! 1. letters compare case-insensitively with common diacritics folded
//!    (`é` sorts with `e`),
//! 2. then unaccented before accented,
//! 3. then lowercase before uppercase,
//! 4. then by code point, so distinct strings never compare equal.
//!
//! Sorting is stable in both directions: records with equal keys keep their
//! relative input order.

use std::cmp::Ordering;

use super::SortOrder;
use crate::model::Record;

/// Returns `items` ordered by `key` in `order`.
///
/// [`SortOrder::None`] returns the input order.
pub fn sort(items: &[Record], key: &str, order: SortOrder) -> Vec<Record> {
    let mut sorted = items.to_vec();
    sort_in_place(&mut sorted, key, order);
    sorted
}

/// Orders `items` by `key` in place.
pub fn sort_in_place(items: &mut [Record], key: &str, order: SortOrder) {
    match order {
        SortOrder::Asc => items.sort_by(|a, b| locale_cmp(&a.display(key), &b.display(key))),
        SortOrder::Desc => items.sort_by(|a, b| locale_cmp(&b.display(key), &a.display(key))),
        SortOrder::None => {}
    }
}

/// Compares two strings with the collation described in the module docs.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold)
        .cmp(b.chars().flat_map(char::to_lowercase).map(fold));

    primary
        .then_with(|| {
            // Same letters: the first accent decides
            a.chars()
                .zip(b.chars())
                .map(|(x, y)| is_accented(x).cmp(&is_accented(y)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .map(|(x, y)| x.is_uppercase().cmp(&y.is_uppercase()))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(b))
}

fn is_accented(c: char) -> bool {
    let lower = c.to_lowercase().next().unwrap_or(c);
    fold(lower) != lower
}

/// Maps a lowercase Latin letter with a diacritic to its base letter.
fn fold(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
