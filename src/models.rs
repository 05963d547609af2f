use chrono::NaiveDate;
use serde::Deserialize;

// --- Contribution calendar ---

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(rename = "contributionCount")]
    pub count: u32,
}

#[cfg(test)]
impl ContributionDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Week {
    #[serde(rename = "contributionDays", default)]
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ContributionCalendar {
    #[serde(rename = "totalContributions")]
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

impl ContributionCalendar {
    /// All days across every week, in API order.
    pub fn days(&self) -> impl Iterator<Item = &ContributionDay> {
        self.weeks.iter().flat_map(|w| w.contribution_days.iter())
    }
}

// --- Repository languages ---

#[derive(Deserialize, Clone, Debug)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub languages: LanguageConnection,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LanguageConnection {
    // GitHub sends `null` here for empty repositories.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LanguageEdge {
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Derived statistics ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguageStat {
    pub name: String,
    pub size_bytes: u64,
    pub percentage: f64,
    pub color: Option<String>,
}
