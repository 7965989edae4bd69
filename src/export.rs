//! Spreadsheet export of a projected result set
//!
//! Comma-separated, UTF-8 with a byte-order mark so spreadsheet applications
//! detect the encoding of non-ASCII titles.

use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::regions::Locale;
use crate::results::ExportRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const FILENAME_PREFIX: &str = "hotshot_results_";
const FILENAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

const HEADERS_EN: [&str; 9] = [
    "rank",
    "title",
    "channel",
    "search_country",
    "format",
    "views",
    "likes",
    "score",
    "url",
];

const HEADERS_KO: [&str; 9] = [
    "순위", "제목", "채널", "검색국가", "형식", "조회수", "좋아요", "떡상점수", "URL",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write export data: {0}")]
    Write(#[from] io::Error),
}

/// `hotshot_results_<YYYYmmdd_HHMMSS>.csv`
pub fn export_filename(at: NaiveDateTime) -> String {
    format!("{}{}.csv", FILENAME_PREFIX, at.format(FILENAME_TIME_FORMAT))
}

/// Write the BOM, a header line and one line per row
pub fn write_csv<W: Write>(mut writer: W, rows: &[ExportRow], locale: Locale) -> Result<(), ExportError> {
    let headers = match locale {
        Locale::En => HEADERS_EN,
        Locale::Ko => HEADERS_KO,
    };

    writer.write_all(UTF8_BOM)?;
    write_record(&mut writer, headers.iter().map(|h| h.to_string()))?;

    for row in rows {
        write_record(
            &mut writer,
            [
                row.rank.to_string(),
                row.title.clone(),
                row.channel.clone(),
                row.search_country.clone(),
                row.format.clone(),
                row.views.to_string(),
                row.likes.to_string(),
                format!("{:.1}", row.score),
                row.url.clone(),
            ],
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `rows` into `directory` under a timestamped name; returns the path
pub fn export_to_dir(
    directory: &Path,
    rows: &[ExportRow],
    locale: Locale,
    at: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(directory).map_err(|source| ExportError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let path = directory.join(export_filename(at));
    let file = File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    write_csv(BufWriter::new(file), rows, locale)?;

    info!(path = %path.display(), rows = rows.len(), "Exported results");
    Ok(path)
}

fn write_record<W, I>(writer: &mut W, fields: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    let line = fields
        .into_iter()
        .map(|f| quote(&f))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

/// RFC 4180 quoting: wrap fields holding separators, quotes or line breaks
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn row(rank: usize, title: &str) -> ExportRow {
        ExportRow {
            rank,
            title: title.to_string(),
            channel: "Channel".to_string(),
            search_country: "South Korea".to_string(),
            format: "Shorts".to_string(),
            views: 1_500,
            likes: 20,
            score: 77.0,
            url: "https://www.youtube.com/watch?v=abc".to_string(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    #[test]
    fn test_filename_format() {
        assert_eq!(export_filename(at()), "hotshot_results_20240501_090503.csv");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a, b"), "\"a, b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_csv_with_bom() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[row(1, "Hot, fresh")], Locale::En).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[0], "rank,title,channel,search_country,format,views,likes,score,url");
        assert_eq!(
            lines[1],
            "1,\"Hot, fresh\",Channel,South Korea,Shorts,1500,20,77.0,https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_korean_headers() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[], Locale::Ko).unwrap();

        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.starts_with("순위,제목,채널,검색국가"));
    }

    #[test]
    fn test_export_to_dir_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let directory = temp_dir.path().join("nested").join("exports");

        let path = export_to_dir(&directory, &[row(1, "a"), row(2, "b")], Locale::En, at()).unwrap();

        assert_eq!(path, directory.join("hotshot_results_20240501_090503.csv"));
        let contents = fs::read(&path).unwrap();
        assert!(contents.starts_with(UTF8_BOM));
        assert_eq!(String::from_utf8_lossy(&contents).matches("\r\n").count(), 3);
    }
}
