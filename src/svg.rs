use crate::models::{LanguageStat, StreakResult};
use serde::Deserialize;
use std::fmt::Write;

const CARD_WIDTH: u32 = 450;
const STREAK_CARD_HEIGHT: u32 = 210;
const BAR_TRACK_WIDTH: f64 = 250.0;
const LANGUAGE_ROW_HEIGHT: u32 = 40;

const FLAME_ICON: &str = "M12 23a7.5 7.5 0 0 1-5.138-12.963C8.202 8.725 12 3.5 12 3.5s3.798 5.225 5.138 6.537A7.5 7.5 0 0 1 12 23Z";
const CHART_ICON: &str = "M3 3v18h18v-2H5V3H3zm4 14h2v-4H7v4zm4 0h2V9h-2v8zm4 0h2V5h-2v12z";
const TROPHY_ICON: &str = "M6 2h12a1 1 0 0 1 1 1v3c0 3.3-2.4 6.1-5.5 6.8A5.5 5.5 0 0 1 10.5 15H10v3h4v2H6v-2h4v-3h-.5A5.5 5.5 0 0 1 4.5 9.8C1.4 9.1-1 6.3-1 3V3a1 1 0 0 1 1-1zm1 2v3c0 2.2 1.6 4 4 4s4-1.8 4-4V4H7zm-5 0v1c0 1.9 1.3 3.4 3 3.8V4H2zm18 0h-3v4.8c1.7-.4 3-1.9 3-3.8V4z";

/// Colors and font used by both cards.
///
/// Defaults to a Gruvbox dark palette. Every field can be overridden from the
/// `[theme]` table of the config file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub card_bg: String,
    pub border: String,
    pub fg: String,
    pub muted: String,
    pub bar_track: String,
    pub total_icon: String,
    pub current_icon: String,
    pub longest_icon: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            card_bg: "#282828".to_string(),
            border: "#3c3836".to_string(),
            fg: "#ebdbb2".to_string(),
            muted: "#928374".to_string(),
            bar_track: "#1d2021".to_string(),
            total_icon: "#83a598".to_string(),
            current_icon: "#fe8019".to_string(),
            longest_icon: "#fabd2f".to_string(),
            font_family: "'Segoe UI', Ubuntu, Sans-Serif".to_string(),
        }
    }
}

/// Card with total contributions, current streak and longest streak
pub fn render_streak_card(streak: &StreakResult, total_contributions: u64, theme: &Theme) -> String {
    let mut svg = card_header(CARD_WIDTH, STREAK_CARD_HEIGHT, "Contribution Stats", theme);
    let col_width = f64::from(CARD_WIDTH - 50) / 3.0;

    let columns = [
        (total_contributions.to_string(), "Total Contributions", CHART_ICON, &theme.total_icon),
        (streak.current_streak.to_string(), "Current Streak", FLAME_ICON, &theme.current_icon),
        (streak.longest_streak.to_string(), "Longest Streak", TROPHY_ICON, &theme.longest_icon),
    ];

    for (i, (value, label, icon, color)) in columns.iter().enumerate() {
        let x = 25.0 + col_width * (i as f64 + 0.5);
        let _ = write!(
            svg,
            r#"
    <g transform="translate({x:.2}, 110)">
        <path d="{icon}" fill="{color}" transform="translate(-12, -40)"/>
        <text x="0" y="10" text-anchor="middle" class="stat-value">{value}</text>
        <text x="0" y="30" text-anchor="middle" class="stat-label">{label}</text>
    </g>"#,
            color = escape(color),
        );
    }

    svg.push_str("\n</svg>\n");
    svg
}

/// Card with one labelled progress bar per language
pub fn render_languages_card(languages: &[LanguageStat], theme: &Theme) -> String {
    let height = 60 + languages.len() as u32 * LANGUAGE_ROW_HEIGHT + 10;
    let mut svg = card_header(CARD_WIDTH, height, "Most Used Languages", theme);

    let mut y = 80;
    for lang in languages {
        let color = lang.color.as_deref().unwrap_or(&theme.fg);
        let fill = bar_fill_width(lang.percentage);
        let _ = write!(
            svg,
            r#"
    <g transform="translate(25, {y})">
        <text x="0" y="0" class="lang-name">{name}</text>
        <text x="{pct_x}" y="0" text-anchor="end" class="lang-percent">{pct:.1}%</text>
        <rect x="0" y="8" width="{BAR_TRACK_WIDTH}" height="6" rx="3" fill="{track}"/>
        <rect x="0" y="8" width="{fill:.2}" height="6" rx="3" fill="{color}"/>
    </g>"#,
            name = escape(&lang.name),
            pct_x = CARD_WIDTH - 50,
            pct = lang.percentage,
            track = escape(&theme.bar_track),
            color = escape(color),
        );
        y += LANGUAGE_ROW_HEIGHT;
    }

    svg.push_str("\n</svg>\n");
    svg
}

fn bar_fill_width(percentage: f64) -> f64 {
    percentage.clamp(0.0, 100.0) / 100.0 * BAR_TRACK_WIDTH
}

fn card_header(width: u32, height: u32, title: &str, theme: &Theme) -> String {
    let font = escape(&theme.font_family);
    let fg = escape(&theme.fg);
    let muted = escape(&theme.muted);
    let border = escape(&theme.border);
    format!(
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" fill="none" xmlns="http://www.w3.org/2000/svg">
    <style>
        .header {{ font: 600 18px {font}; fill: {fg}; }}
        .stat-label {{ font: 400 12px {font}; fill: {muted}; }}
        .stat-value {{ font: 700 20px {font}; fill: {fg}; }}
        .lang-name {{ font: 400 13px {font}; fill: {fg}; }}
        .lang-percent {{ font: 400 12px {font}; fill: {muted}; }}
        .bg {{ fill: {card_bg}; stroke: {border}; stroke-width: 1px; }}
    </style>
    <rect x="0.5" y="0.5" width="{inner_w}" height="{inner_h}" rx="10" class="bg"/>
    <text x="25" y="35" class="header">{title}</text>
    <line x1="25" y1="50" x2="{line_end}" y2="50" stroke="{border}" stroke-width="1"/>"#,
        card_bg = escape(&theme.card_bg),
        inner_w = width - 1,
        inner_h = height - 1,
        title = escape(title),
        line_end = width - 25,
    )
}

/// Escape text for XML content and double-quoted attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
