use hotshot::config::DisplayConfig;
use hotshot::humanize::Count;
use hotshot::regions::{self, CATEGORIES, Locale, REGIONS};
use hotshot::results::ResultSet;
use std::fmt::Write;

const TITLE_WIDTH: usize = 48;

/// One line per candidate, in the result set's current order
pub fn results_table(results: &ResultSet, limit: Option<usize>, display: &DisplayConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>6} {:>7} {:>7} {:>9} {:>7}  {:<8} {:<16} {}",
        "#", "score", "views", "likes", "views/h", "age(h)", "format", "region", "title / channel"
    );

    let shown = limit.unwrap_or(results.len());
    for (rank, c) in results.iter().take(shown).enumerate() {
        let _ = writeln!(
            out,
            "{:>4} {:>6.1} {:>7} {:>7} {:>9} {:>7.1}  {:<8} {:<16} {} / {}",
            rank + 1,
            c.score,
            Count(c.views).to_compact(),
            Count(c.likes).to_compact(),
            Count(c.velocity as u64).to_compact(),
            c.hours_since,
            c.format(display.shorts_threshold_secs).label(display.locale),
            regions::display_name(&c.origin_region, display.locale),
            truncate(&c.title, TITLE_WIDTH),
            c.channel_title,
        );
    }

    let _ = writeln!(out, "{} of {} videos", shown.min(results.len()), results.len());
    out
}

pub fn regions_table(locale: Locale) -> String {
    REGIONS
        .iter()
        .map(|r| format!("{}  {}\n", r.code, r.name(locale)))
        .collect()
}

pub fn categories_table(locale: Locale) -> String {
    CATEGORIES
        .iter()
        .map(|c| format!("{:>3}  {}\n", c.id, c.label(locale)))
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotshot::platform::VideoRecord;
    use hotshot::results::Candidate;

    fn candidate(id: &str, views: u64, duration_secs: u64) -> Candidate {
        let record = VideoRecord {
            video_id: id.to_string(),
            title: format!("Title {}", id),
            channel_title: "Channel".to_string(),
            published_at: "2024-05-01T10:00:00Z".to_string(),
            duration_secs,
            views,
            likes: 1_200,
            ..VideoRecord::default()
        };
        let mut c = Candidate::from_record(record, "KR").unwrap();
        c.score = 42.0;
        c.hours_since = 2.0;
        c.velocity = views as f64 / 2.0;
        c
    }

    #[test]
    fn test_results_table_rows() {
        let results = ResultSet::new(vec![candidate("a", 1_500_000, 30), candidate("b", 900, 600)]);

        let table = results_table(&results, None, &DisplayConfig::default());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("1.5M"));
        assert!(lines[1].contains("750.0K"));
        assert!(lines[1].contains("Shorts"));
        assert!(lines[1].contains("South Korea"));
        assert!(lines[2].contains("standard"));
        assert_eq!(lines[3], "2 of 2 videos");
    }

    #[test]
    fn test_results_table_limit() {
        let results = ResultSet::new(vec![candidate("a", 1, 30), candidate("b", 2, 30)]);

        let table = results_table(&results, Some(1), &DisplayConfig::default());
        assert_eq!(table.lines().count(), 3);
        assert!(table.ends_with("1 of 2 videos\n"));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("가나다라마바사아자차", 6), "가나다...");
    }

    #[test]
    fn test_catalog_tables() {
        assert!(regions_table(Locale::En).starts_with("US  United States\n"));
        assert_eq!(regions_table(Locale::Ko).lines().count(), 20);
        assert!(categories_table(Locale::En).contains(" 10  Music"));
    }
}
