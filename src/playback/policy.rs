use rand::Rng;
use rand::seq::IndexedRandom;

use crate::catalog::Track;
use crate::config::AdvanceMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// Pick the playlist index to move to from `index`, or `None` to stay put.
///
/// In discovery mode both directions behave the same: a random other track
/// by the same artist, else a random other track, else a plain step.
pub(crate) fn pick<R: Rng>(
    playlist: &[Track],
    index: usize,
    direction: Direction,
    mode: AdvanceMode,
    rng: &mut R,
) -> Option<usize> {
    let current = playlist.get(index)?;

    if mode == AdvanceMode::Discovery {
        let artist = current.artist_key();
        let others: Vec<usize> = playlist
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id != current.id)
            .map(|(i, _)| i)
            .collect();
        let same_artist: Vec<usize> = others
            .iter()
            .copied()
            .filter(|&i| playlist[i].artist_key() == artist)
            .collect();

        if let Some(&i) = same_artist.choose(rng) {
            return Some(i);
        }
        if let Some(&i) = others.choose(rng) {
            return Some(i);
        }
    }

    step(playlist.len(), index, direction)
}

fn step(len: usize, index: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Forward if index + 1 < len => Some(index + 1),
        Direction::Backward if index > 0 => Some(index - 1),
        _ => None,
    }
}
