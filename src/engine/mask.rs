// Unique-mask generator for learning mode.
//
// Reveals as few letters of a member's name as possible while keeping the masked
// pattern unambiguous among the other members of the same group.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

/// Placeholder for hidden letters.
pub const MASK_CHAR: char = '*';

/// Char positions shown to the player.
pub type RevealSet = BTreeSet<usize>;

fn alpha_positions(chars: &[char]) -> Vec<usize> {
    chars
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .collect()
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Whether `candidate` fits the pattern of `target` with `reveals` shown.
///
/// Revealed letters must match ignoring case, hidden letters must be matched by
/// any letter, and every non-letter must match exactly.
fn fits_pattern(candidate: &[char], target: &[char], reveals: &RevealSet) -> bool {
    if candidate.len() != target.len() {
        return false;
    }
    target.iter().zip(candidate).enumerate().all(|(i, (&t, &c))| {
        if !t.is_alphabetic() {
            c == t
        } else if reveals.contains(&i) {
            same_letter(c, t)
        } else {
            c.is_alphabetic()
        }
    })
}

fn count_fits(candidates: &[Vec<char>], target: &[char], reveals: &RevealSet) -> usize {
    candidates
        .iter()
        .filter(|c| fits_pattern(c, target, reveals))
        .count()
}

/// Pick the reveal set for `target` among `siblings`.
///
/// One random letter is tried first, then every second letter in random order. If
/// no pair singles the name out, letters keep being added (the one leaving the
/// fewest look-alikes first) until it is unique. Only when even the full name is
/// ambiguous, which needs a sibling equal to the target ignoring case, are the first
/// two letters revealed as a fallback.
pub fn reveal_positions<R, S>(target: &str, siblings: &[S], rng: &mut R) -> RevealSet
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let target_chars: Vec<char> = target.chars().collect();
    let alpha = alpha_positions(&target_chars);
    if alpha.is_empty() {
        return RevealSet::new();
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(target);
    let mut candidates: Vec<Vec<char>> = vec![target_chars.clone()];
    for sibling in siblings {
        let sibling = sibling.as_ref();
        if seen.insert(sibling) {
            candidates.push(sibling.chars().collect());
        }
    }

    let first = alpha[rng.gen_range(0..alpha.len())];
    let mut reveals = RevealSet::from([first]);
    if count_fits(&candidates, &target_chars, &reveals) == 1 {
        return reveals;
    }

    let mut rest: Vec<usize> = alpha.iter().copied().filter(|&p| p != first).collect();
    rest.shuffle(rng);
    for &second in &rest {
        let pair = RevealSet::from([first, second]);
        if count_fits(&candidates, &target_chars, &pair) == 1 {
            return pair;
        }
    }

    // Widen the search past two letters.
    while reveals.len() < alpha.len() {
        let mut best: Option<(usize, usize)> = None;
        for &pos in &rest {
            if reveals.contains(&pos) {
                continue;
            }
            let mut trial = reveals.clone();
            trial.insert(pos);
            let fits = count_fits(&candidates, &target_chars, &trial);
            if best.map_or(true, |(_, b)| fits < b) {
                best = Some((pos, fits));
            }
        }
        let Some((pos, fits)) = best else { break };
        reveals.insert(pos);
        if fits == 1 {
            return reveals;
        }
    }

    tracing::warn!(member = target, "No reveal set singles out member; revealing first two letters");
    alpha.iter().take(2).copied().collect()
}

/// Render `target` with every hidden letter replaced by [`MASK_CHAR`].
pub fn render_mask(target: &str, reveals: &RevealSet) -> String {
    target
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_alphabetic() && !reveals.contains(&i) {
                MASK_CHAR
            } else {
                c
            }
        })
        .collect()
}

/// Masked prompt for `target` that is unambiguous among `siblings`.
pub fn compute_mask<R, S>(target: &str, siblings: &[S], rng: &mut R) -> String
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let reveals = reveal_positions(target, siblings, rng);
    render_mask(target, &reveals)
}
