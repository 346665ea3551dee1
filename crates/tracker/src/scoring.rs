//! Streak score calculation
//!
//! The persisted counter only absorbs a day once that day leaves the
//! three-slot window. Days still inside the window are applied on the fly:
//! a past day the user missed halves the running score, a day they showed up
//! adds one. The last day walked never halves, since it is still open.

use common::models::{Category, CounterBook, Day, Meta, UserId};

/// How many of the tracked days to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// All three days, as shown on the leaderboard
    Current,
    /// Only days up to and including `Day`, as shown on that day's prompt
    AsOf(Day),
}

impl Projection {
    fn last_day(self) -> Day {
        match self {
            Projection::Current => Day::Today,
            Projection::AsOf(day) => day,
        }
    }
}

/// Decayed score from a raw counter and membership flags (oldest first)
pub fn score(base: u64, membership: [bool; 3], projection: Projection) -> u64 {
    let last = projection.last_day();
    let mut score = base;

    for day in Day::ALL.into_iter().take_while(|day| *day <= last) {
        if membership[day.index()] {
            score += 1;
        } else if day != last {
            score /= 2;
        }
    }

    score
}

/// A user's displayed score in one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub user_id: UserId,
    pub score: u64,
}

/// Displayed score for a single user. Unknown users start from zero.
pub fn score_for(
    book: &CounterBook,
    meta: &Meta,
    category: Category,
    user_id: &str,
    projection: Projection,
) -> u64 {
    let base = book.get(user_id).map(|c| c.get(category)).unwrap_or(0);
    score(base, meta.membership(category, user_id), projection)
}

/// Scores for every known user, highest first.
///
/// The sort is stable, so equal scores keep the counter document's order.
pub fn standings(
    book: &CounterBook,
    meta: &Meta,
    category: Category,
    projection: Projection,
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = book
        .keys()
        .map(|user_id| Standing {
            user_id: user_id.clone(),
            score: score_for(book, meta, category, user_id, projection),
        })
        .collect();

    standings.sort_by(|a, b| b.score.cmp(&a.score));
    standings
}

/// Scores for the members of one day's bucket, in the order they joined
pub fn day_standings(
    book: &CounterBook,
    meta: &Meta,
    category: Category,
    day: Day,
    projection: Projection,
) -> Vec<Standing> {
    meta.bucket(day, category)
        .iter()
        .map(|user_id| Standing {
            user_id: user_id.clone(),
            score: score_for(book, meta, category, user_id, projection),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Counters;

    const ALL_FLAGS: [[bool; 3]; 8] = [
        [false, false, false],
        [false, false, true],
        [false, true, false],
        [false, true, true],
        [true, false, false],
        [true, false, true],
        [true, true, false],
        [true, true, true],
    ];

    #[test]
    fn test_new_user_reacting_today_scores_one() {
        assert_eq!(score(0, [false, false, true], Projection::Current), 1);
    }

    #[test]
    fn test_missing_today_is_not_penalized() {
        assert_eq!(score(10, [true, true, false], Projection::Current), 12);
        assert_eq!(score(10, [true, true, true], Projection::Current), 13);
    }

    #[test]
    fn test_missing_past_days_halves() {
        // 10 -> 5 -> 2 (floor) -> today open
        assert_eq!(score(10, [false, false, false], Projection::Current), 2);
        // 9 -> 4 -> 5 -> 6
        assert_eq!(score(9, [false, true, true], Projection::Current), 6);
        // 9 -> 10 -> 5 -> 5
        assert_eq!(score(9, [true, false, false], Projection::Current), 5);
    }

    #[test]
    fn test_zero_stays_zero_when_absent() {
        assert_eq!(score(0, [false, false, false], Projection::Current), 0);
    }

    #[test]
    fn test_as_of_ignores_later_days() {
        let flags = [true, false, true];

        // Two days ago alone, and it is the open day of that projection
        assert_eq!(score(4, flags, Projection::AsOf(Day::TwoDaysAgo)), 5);
        // Yesterday is the open day here, so missing it costs nothing yet
        assert_eq!(score(4, flags, Projection::AsOf(Day::Yesterday)), 5);
        assert_eq!(score(4, flags, Projection::AsOf(Day::Today)), 3);
        assert_eq!(
            score(4, flags, Projection::AsOf(Day::Today)),
            score(4, flags, Projection::Current)
        );
    }

    #[test]
    fn test_as_of_unaffected_by_flipping_later_flags() {
        for base in 0..40 {
            for flags in ALL_FLAGS {
                let mut flipped = flags;
                flipped[2] = !flipped[2];
                assert_eq!(
                    score(base, flags, Projection::AsOf(Day::Yesterday)),
                    score(base, flipped, Projection::AsOf(Day::Yesterday)),
                );
            }
        }
    }

    #[test]
    fn test_yesterday_presence_never_lowers_score() {
        for base in 0..200 {
            for flags in ALL_FLAGS {
                let mut absent = flags;
                let mut present = flags;
                absent[1] = false;
                present[1] = true;
                assert!(
                    score(base, present, Projection::Current)
                        >= score(base, absent, Projection::Current),
                    "base {} flags {:?}",
                    base,
                    flags
                );
            }
        }
    }

    #[test]
    fn test_today_presence_adds_exactly_one() {
        for base in 0..100 {
            for flags in ALL_FLAGS {
                let mut absent = flags;
                let mut present = flags;
                absent[2] = false;
                present[2] = true;
                assert_eq!(
                    score(base, present, Projection::Current),
                    score(base, absent, Projection::Current) + 1
                );
            }
        }
    }

    #[test]
    fn test_unknown_user_defaults_to_zero_base() {
        let book = CounterBook::new();
        let mut meta = Meta::default();
        meta.insert(Day::Today, Category::Reading, "1");

        assert_eq!(
            score_for(&book, &meta, Category::Reading, "1", Projection::Current),
            1
        );
        assert_eq!(
            score_for(&book, &meta, Category::Writing, "1", Projection::Current),
            0
        );
    }

    #[test]
    fn test_standings_sorted_descending_with_stable_ties() {
        let mut book = CounterBook::new();
        book.insert("a".into(), Counters { read: 2, write: 0 });
        book.insert("b".into(), Counters { read: 8, write: 0 });
        book.insert("c".into(), Counters { read: 2, write: 0 });
        let mut meta = Meta::default();
        for user in ["a", "b", "c"] {
            meta.insert(Day::TwoDaysAgo, Category::Reading, user);
            meta.insert(Day::Yesterday, Category::Reading, user);
        }

        let standings = standings(&book, &meta, Category::Reading, Projection::Current);
        let order: Vec<(&str, u64)> = standings
            .iter()
            .map(|s| (s.user_id.as_str(), s.score))
            .collect();

        assert_eq!(order, vec![("b", 10), ("a", 4), ("c", 4)]);
    }

    #[test]
    fn test_day_standings_only_lists_that_day() {
        let mut book = CounterBook::new();
        book.insert("a".into(), Counters { read: 3, write: 0 });
        book.insert("b".into(), Counters { read: 5, write: 0 });
        let mut meta = Meta::default();
        meta.insert(Day::Yesterday, Category::Reading, "b");
        meta.insert(Day::Today, Category::Reading, "a");

        let yesterday = day_standings(
            &book,
            &meta,
            Category::Reading,
            Day::Yesterday,
            Projection::AsOf(Day::Yesterday),
        );

        // b: 5 -> halved for two days ago (2) -> yesterday +1
        assert_eq!(
            yesterday,
            vec![Standing {
                user_id: "b".into(),
                score: 3
            }]
        );
    }
}
