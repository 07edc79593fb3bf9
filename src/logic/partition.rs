//! Group draw: balanced group sizes, random placement, round-robin fixtures.

use crate::models::{Group, GroupMatch, PlayerStat, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;

/// Preferred group size when the organizer does not choose a group count.
pub const TARGET_GROUP_SIZE: usize = 4;
/// Bounds for default group sizes.
pub const MIN_GROUP_SIZE: usize = 3;
pub const MAX_GROUP_SIZE: usize = 5;

/// Default group sizes for `n` competitors.
///
/// Picks the group count `g` in `ceil(n/5)..=floor(n/3)` minimising the mean squared
/// deviation from a size of 4, which for sizes in 3..=5 is `|n - 4g| / g`. Ties go to
/// fewer non-4 groups, then to fewer groups. Fives come first, threes last.
///
/// | n mod 4 | result                       |
/// |---------|------------------------------|
/// | 0       | all fours                    |
/// | 1       | one five (n = 5: `[5]`)      |
/// | 2       | two threes (n = 6: `[3, 3]`) |
/// | 3       | one three                    |
pub fn default_group_sizes(n: usize) -> Result<Vec<usize>, TournamentError> {
    if n < MIN_GROUP_SIZE {
        return Err(TournamentError::NotEnoughPlayers {
            required: MIN_GROUP_SIZE,
            actual: n,
        });
    }
    let min_groups = n.div_ceil(MAX_GROUP_SIZE);
    let max_groups = n / MIN_GROUP_SIZE;

    // (deviation, groups) of the best candidate so far
    let mut best: Option<(usize, usize)> = None;
    for g in min_groups..=max_groups {
        let dev = n.abs_diff(TARGET_GROUP_SIZE * g);
        let better = match best {
            None => true,
            Some((best_dev, best_g)) => {
                // dev / g < best_dev / best_g, cross-multiplied
                let lhs = dev * best_g;
                let rhs = best_dev * g;
                lhs < rhs || (lhs == rhs && (dev, g) < (best_dev, best_g))
            }
        };
        if better {
            best = Some((dev, g));
        }
    }
    let (_, g) = best.ok_or(TournamentError::NotEnoughPlayers {
        required: MIN_GROUP_SIZE,
        actual: n,
    })?;

    let mut sizes = Vec::with_capacity(g);
    if n >= TARGET_GROUP_SIZE * g {
        let fives = n - TARGET_GROUP_SIZE * g;
        sizes.extend(std::iter::repeat(MAX_GROUP_SIZE).take(fives));
        sizes.extend(std::iter::repeat(TARGET_GROUP_SIZE).take(g - fives));
    } else {
        let threes = TARGET_GROUP_SIZE * g - n;
        sizes.extend(std::iter::repeat(TARGET_GROUP_SIZE).take(g - threes));
        sizes.extend(std::iter::repeat(MIN_GROUP_SIZE).take(threes));
    }
    Ok(sizes)
}

/// Largest group count accepted for `n` competitors (every group keeps two members).
pub fn max_group_count(n: usize) -> usize {
    n / 2
}

/// Sizes for an organizer-chosen group count: as even as possible, larger groups first.
pub fn even_group_sizes(n: usize, groups: usize) -> Result<Vec<usize>, TournamentError> {
    let max = max_group_count(n);
    if groups < 2 || groups > max {
        return Err(TournamentError::InvalidGroupCount {
            requested: groups,
            max,
        });
    }
    let base = n / groups;
    let remainder = n % groups;
    Ok((0..groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Group sizes for `n` competitors, honouring an optional organizer choice.
pub fn group_sizes(n: usize, requested: Option<usize>) -> Result<Vec<usize>, TournamentError> {
    match requested {
        Some(groups) => even_group_sizes(n, groups),
        None => default_group_sizes(n),
    }
}

/// Letter label for the group at `index` (A, B, …, Z, then AA, AB…).
pub fn group_label(index: usize) -> String {
    let count = 26;
    if index < count {
        char::from(b'A' + index as u8).to_string()
    } else {
        format!(
            "{}{}",
            group_label(index / count - 1),
            char::from(b'A' + (index % count) as u8)
        )
    }
}

/// One fixture per unordered pair, in listing order.
pub fn round_robin(names: &[String]) -> Vec<GroupMatch> {
    let mut matches = Vec::with_capacity(names.len() * names.len().saturating_sub(1) / 2);
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            matches.push(GroupMatch::new(a.clone(), b.clone()));
        }
    }
    matches
}

/// Shuffle `competitors` and split them into labelled groups with their fixtures.
///
/// `members` supplies the 2v2 roster for a label, if any.
pub fn partition<R, F>(
    competitors: &[String],
    requested: Option<usize>,
    members: F,
    rng: &mut R,
) -> Result<Vec<Group>, TournamentError>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> Option<Vec<String>>,
{
    let sizes = group_sizes(competitors.len(), requested)?;

    let mut shuffled = competitors.to_vec();
    shuffled.shuffle(rng);

    let mut groups = Vec::with_capacity(sizes.len());
    let mut rest = shuffled.as_slice();
    for (i, size) in sizes.into_iter().enumerate() {
        let (names, tail) = rest.split_at(size);
        rest = tail;
        let players = names
            .iter()
            .map(|name| match members(name) {
                Some(m) => PlayerStat::with_members(name.clone(), m),
                None => PlayerStat::new(name.clone()),
            })
            .collect();
        groups.push(Group {
            name: group_label(i),
            players,
            matches: round_robin(names),
        });
    }
    log::debug!(
        "Drew {} competitors into {} group(s)",
        competitors.len(),
        groups.len()
    );
    Ok(groups)
}
