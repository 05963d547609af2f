use crate::models::{ContributionDay, LanguageStat, Repository, StreakResult};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

/// Number of languages shown on the languages card
pub const TOP_LANGUAGES: usize = 5;

/// How a zero-contribution "today" affects the current streak.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TodayZeroPolicy {
    /// Today is still in progress: keep counting from yesterday.
    StreakStillOpen,
    /// A zero day ends the streak, today included.
    BreakOnZero,
}

pub const TODAY_ZERO_POLICY: TodayZeroPolicy = TodayZeroPolicy::StreakStillOpen;

/// Compute current and longest streaks as of `today`.
///
/// Days after `today` are ignored. Input order does not matter.
pub fn calculate_streak<'a>(
    days: impl IntoIterator<Item = &'a ContributionDay>,
    today: NaiveDate,
    policy: TodayZeroPolicy,
) -> StreakResult {
    let mut future = 0usize;
    let mut valid: Vec<&ContributionDay> = days
        .into_iter()
        .filter(|day| {
            let keep = day.date <= today;
            if !keep {
                future += 1;
            }
            keep
        })
        .collect();

    if future > 0 {
        warn!(future, %today, "discarding contribution days after today");
    }

    // Stable sort, so dedup keeps the first entry reported for a date
    valid.sort_by_key(|day| day.date);
    valid.dedup_by_key(|day| day.date);

    let result = StreakResult {
        current_streak: current_run(&valid, today, policy),
        longest_streak: longest_run(&valid),
    };
    debug!(
        days = valid.len(),
        current = result.current_streak,
        longest = result.longest_streak,
        "streak calculated"
    );
    result
}

/// Longest run of consecutive positive days in a sorted sequence
fn longest_run(days: &[&ContributionDay]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in days {
        let contiguous = prev.is_none_or(|p| p.succ_opt() == Some(day.date));
        run = match (day.count > 0, contiguous) {
            (false, _) => 0,
            (true, true) => run + 1,
            (true, false) => 1,
        };
        longest = longest.max(run);
        prev = Some(day.date);
    }

    longest
}

/// Run of positive days ending today, or yesterday when today has nothing yet
fn current_run(days: &[&ContributionDay], today: NaiveDate, policy: TodayZeroPolicy) -> u32 {
    let Some(last) = days.last() else {
        return 0;
    };
    let Some(yesterday) = today.pred_opt() else {
        return if last.count > 0 { 1 } else { 0 };
    };

    if last.date == today {
        if last.count > 0 {
            return count_back_from(days, today);
        }
        return match policy {
            TodayZeroPolicy::StreakStillOpen => count_back_from(&days[..days.len() - 1], yesterday),
            TodayZeroPolicy::BreakOnZero => 0,
        };
    }

    // Today missing from the calendar entirely, e.g. the API's day boundary lags the local clock
    if last.date == yesterday && policy == TodayZeroPolicy::StreakStillOpen {
        return count_back_from(days, yesterday);
    }

    0
}

/// Count consecutive positive days walking backward, starting at `start`
fn count_back_from(days: &[&ContributionDay], start: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = Some(start);

    for day in days.iter().rev() {
        if day.count == 0 || expected != Some(day.date) {
            break;
        }
        streak += 1;
        expected = day.date.pred_opt();
    }

    streak
}

/// Sum language sizes across repositories and rank them by total size.
///
/// Percentages are taken against the grand total of every language, before
/// truncation to `limit`. Ties keep the order in which languages were first seen.
pub fn aggregate_languages(repos: &[Repository], limit: usize) -> Vec<LanguageStat> {
    let mut totals: IndexMap<&str, (u64, Option<&str>)> = IndexMap::new();
    let mut grand_total: u64 = 0;

    for edge in repos.iter().flat_map(|repo| &repo.languages.edges) {
        let entry = totals
            .entry(edge.node.name.as_str())
            .or_insert((0, edge.node.color.as_deref()));
        entry.0 += edge.size;
        grand_total += edge.size;
    }

    let mut stats: Vec<LanguageStat> = totals
        .into_iter()
        .map(|(name, (size, color))| LanguageStat {
            name: name.to_string(),
            size_bytes: size,
            percentage: percentage_of(size, grand_total),
            color: color.map(str::to_string),
        })
        .collect();

    stats.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    stats.truncate(limit);
    stats
}

fn percentage_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageConnection, LanguageEdge, LanguageNode};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    /// Build a calendar ending today from counts ordered oldest first
    fn calendar(counts: &[u32]) -> Vec<ContributionDay> {
        let n = counts.len() as i64;
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                ContributionDay::new(today() - chrono::Duration::days(n - 1 - i as i64), count)
            })
            .collect()
    }

    fn streak(counts: &[u32]) -> StreakResult {
        calculate_streak(&calendar(counts), today(), TODAY_ZERO_POLICY)
    }

    fn repo(edges: &[(&str, u64)]) -> Repository {
        Repository {
            name: "repo".to_string(),
            languages: LanguageConnection {
                edges: edges
                    .iter()
                    .map(|(name, size)| LanguageEdge {
                        size: *size,
                        node: LanguageNode {
                            name: name.to_string(),
                            color: Some(format!("#{}", name.len())),
                        },
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_empty_calendar() {
        assert_eq!(streak(&[]), StreakResult::default());
    }

    #[test]
    fn test_all_zero_calendar() {
        for len in 1..10 {
            assert_eq!(streak(&vec![0; len]), StreakResult::default());
        }
    }

    #[test]
    fn test_all_positive_calendar() {
        for len in 1..10u32 {
            let result = streak(&vec![2; len as usize]);
            assert_eq!(result.current_streak, len);
            assert_eq!(result.longest_streak, len);
        }
    }

    #[test]
    fn test_single_day_today() {
        let result = streak(&[4]);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn test_today_zero_yesterday_zero() {
        let result = streak(&[3, 0, 0]);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn test_today_zero_keeps_streak_open() {
        let result = streak(&[3, 5, 0]);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_today_zero_with_break_on_zero_policy() {
        let days = calendar(&[3, 5, 0]);
        let result = calculate_streak(&days, today(), TodayZeroPolicy::BreakOnZero);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);

        let days = calendar(&[3, 5, 1]);
        let result = calculate_streak(&days, today(), TodayZeroPolicy::BreakOnZero);
        assert_eq!(result.current_streak, 3);
    }

    #[test]
    fn test_current_streak_stops_at_first_zero() {
        let result = streak(&[1, 1, 1, 1, 0, 2, 2]);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 4);
    }

    #[test]
    fn test_future_days_are_ignored() {
        let mut days = calendar(&[1, 1, 0]);
        days.push(ContributionDay::new(today() + chrono::Duration::days(1), 9));
        days.push(ContributionDay::new(today() + chrono::Duration::days(2), 9));
        let result = calculate_streak(&days, today(), TODAY_ZERO_POLICY);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_unordered_input() {
        let mut days = calendar(&[0, 1, 1, 1]);
        days.reverse();
        days.swap(0, 2);
        let result = calculate_streak(&days, today(), TODAY_ZERO_POLICY);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_today_missing_counts_from_yesterday() {
        let mut days = calendar(&[0, 2, 2, 2]);
        for day in &mut days {
            day.date = day.date.pred_opt().unwrap();
        }
        let result = calculate_streak(&days, today(), TODAY_ZERO_POLICY);
        assert_eq!(result.current_streak, 3);
    }

    #[test]
    fn test_stale_calendar_has_no_current_streak() {
        let mut days = calendar(&[2, 2]);
        for day in &mut days {
            day.date -= chrono::Duration::days(5);
        }
        let result = calculate_streak(&days, today(), TODAY_ZERO_POLICY);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_gap_in_dates_breaks_streak() {
        let mut days = calendar(&[1, 1, 1, 1]);
        days.remove(1);
        let result = calculate_streak(&days, today(), TODAY_ZERO_POLICY);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_longest_at_least_current() {
        let patterns: [&[u32]; 6] = [
            &[1, 0, 1, 1, 1],
            &[1, 1, 1, 0, 1],
            &[0, 0, 5],
            &[5, 5, 0],
            &[1, 0, 1, 0, 1, 0],
            &[2, 2, 2, 2, 0, 0],
        ];
        for counts in patterns {
            let result = streak(counts);
            assert!(result.longest_streak >= result.current_streak, "{counts:?}");
        }
    }

    #[test]
    fn test_trailing_zeros_do_not_change_longest() {
        let base = vec![1, 1, 0, 1, 1, 1];
        let longest = streak(&base).longest_streak;
        for extra in 1..5 {
            let mut counts = base.clone();
            counts.extend(std::iter::repeat_n(0, extra));
            assert_eq!(streak(&counts).longest_streak, longest);
        }
    }

    #[test]
    fn test_aggregate_tie_keeps_first_seen_order() {
        let repos = vec![repo(&[("Go", 100)]), repo(&[("Go", 50)]), repo(&[("Rust", 150)])];
        let stats = aggregate_languages(&repos, TOP_LANGUAGES);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Go");
        assert_eq!(stats[0].size_bytes, 150);
        assert!((stats[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(stats[1].name, "Rust");
        assert!((stats[1].percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_percentages_sum_to_100() {
        let repos = vec![
            repo(&[("Rust", 1234), ("Shell", 17), ("Nix", 3)]),
            repo(&[("Python", 999), ("Rust", 1)]),
            repo(&[("C", 77), ("Lua", 5), ("Go", 10)]),
        ];
        let all = aggregate_languages(&repos, usize::MAX);
        assert_eq!(all.len(), 7);
        let sum: f64 = all.iter().map(|l| l.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_truncates_to_top_five() {
        let repos = vec![repo(&[
            ("A", 1),
            ("B", 7),
            ("C", 3),
            ("D", 9),
            ("E", 5),
            ("F", 2),
            ("G", 8),
        ])];
        let stats = aggregate_languages(&repos, TOP_LANGUAGES);
        let names: Vec<_> = stats.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["D", "G", "B", "E", "C"]);
        assert!(stats.windows(2).all(|w| w[0].size_bytes >= w[1].size_bytes));
    }

    #[test]
    fn test_aggregate_zero_total() {
        let repos = vec![repo(&[("Rust", 0), ("Go", 0)])];
        let stats = aggregate_languages(&repos, TOP_LANGUAGES);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|l| l.percentage == 0.0));
    }

    #[test]
    fn test_aggregate_color_from_first_edge() {
        let mut first = repo(&[("Rust", 10)]);
        first.languages.edges[0].node.color = Some("#dea584".to_string());
        let mut second = repo(&[("Rust", 10)]);
        second.languages.edges[0].node.color = Some("#000000".to_string());
        let stats = aggregate_languages(&[first, second], TOP_LANGUAGES);
        assert_eq!(stats[0].color.as_deref(), Some("#dea584"));
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_languages(&[], TOP_LANGUAGES).is_empty());
    }
}
