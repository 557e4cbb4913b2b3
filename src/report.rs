//! Plain-text rendering of query results for the terminal.

use crate::genres::GenreCount;
use crate::interaction::TrackDisplay;
use crate::kpi::Kpis;
use crate::ranker::RankedTrack;
use std::fmt::Write;

const MISSING: &str = "-";

#[must_use]
pub fn render_ranking(ranked: &[RankedTrack]) -> String {
    if ranked.is_empty() {
        return "No interactions stored yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>3}  {:>11}  {:<24}  {:<30}  {}", "#", "probability", "track_id", "track", "artist");
    for (i, entry) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:>11.4}  {:<24}  {:<30}  {}",
            i + 1,
            entry.probability,
            entry.track_id,
            entry.track_name.as_deref().unwrap_or(MISSING),
            entry.artist_name.as_deref().unwrap_or(MISSING)
        );
    }
    out
}

#[must_use]
pub fn render_genres(genres: &[GenreCount]) -> String {
    if genres.is_empty() {
        return "No interactions stored yet.\n".to_string();
    }

    let width = genres.iter().map(|g| g.genre.len()).max().unwrap_or(0).max(5);
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>8}", "genre", "count");
    for genre in genres {
        let _ = writeln!(out, "{:<width$}  {:>8}", genre.genre, genre.count);
    }
    out
}

#[must_use]
pub fn render_kpis(kpis: &Kpis) -> String {
    let average = kpis
        .avg_interactions_per_user
        .map_or_else(|| MISSING.to_string(), |avg| format!("{avg:.2}"));
    format!(
        "Users:              {}\nInteractions:       {}\nAvg per user:       {average}\n",
        kpis.distinct_users, kpis.total_interactions
    )
}

#[must_use]
pub fn render_display(track_id: &str, display: &TrackDisplay) -> String {
    if display.is_unknown() {
        return format!("{track_id}: no metadata found\n");
    }
    format!(
        "{track_id}: {} by {}\n",
        display.track_name.as_deref().unwrap_or(MISSING),
        display.artist_name.as_deref().unwrap_or(MISSING)
    )
}
