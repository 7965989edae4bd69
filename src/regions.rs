//! Fixed region and category catalogs
//!
//! The region list order is significant: the category sweep visits regions in
//! this order and the first region to return a video keeps it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin tag for keyword searches that were not region-filtered
pub const GLOBAL: &str = "GLOBAL";

/// Origin tag for candidates whose region could not be recovered
pub const UNKNOWN: &str = "UNKNOWN";

/// Display language for region names and format labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub name_en: &'static str,
    pub name_ko: &'static str,
}

impl Region {
    pub fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.name_en,
            Locale::Ko => self.name_ko,
        }
    }
}

pub static REGIONS: [Region; 20] = [
    Region { code: "US", name_en: "United States", name_ko: "미국" },
    Region { code: "IN", name_en: "India", name_ko: "인도" },
    Region { code: "GB", name_en: "United Kingdom", name_ko: "영국" },
    Region { code: "JP", name_en: "Japan", name_ko: "일본" },
    Region { code: "KR", name_en: "South Korea", name_ko: "한국" },
    Region { code: "BR", name_en: "Brazil", name_ko: "브라질" },
    Region { code: "CA", name_en: "Canada", name_ko: "캐나다" },
    Region { code: "DE", name_en: "Germany", name_ko: "독일" },
    Region { code: "FR", name_en: "France", name_ko: "프랑스" },
    Region { code: "AU", name_en: "Australia", name_ko: "호주" },
    Region { code: "MX", name_en: "Mexico", name_ko: "멕시코" },
    Region { code: "ES", name_en: "Spain", name_ko: "스페인" },
    Region { code: "IT", name_en: "Italy", name_ko: "이탈리아" },
    Region { code: "RU", name_en: "Russia", name_ko: "러시아" },
    Region { code: "ID", name_en: "Indonesia", name_ko: "인도네시아" },
    Region { code: "TH", name_en: "Thailand", name_ko: "태국" },
    Region { code: "VN", name_en: "Vietnam", name_ko: "베트남" },
    Region { code: "PH", name_en: "Philippines", name_ko: "필리핀" },
    Region { code: "AR", name_en: "Argentina", name_ko: "아르헨티나" },
    Region { code: "PL", name_en: "Poland", name_ko: "폴란드" },
];

/// Look up a region by its ISO-3166 alpha-2 code (case-insensitive)
pub fn find_region(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}

/// Display name for an origin tag; unknown codes are shown verbatim
pub fn display_name(code: &str, locale: Locale) -> String {
    if let Some(region) = find_region(code) {
        return region.name(locale).to_string();
    }

    match (code, locale) {
        (GLOBAL, Locale::En) => "Worldwide".to_string(),
        (GLOBAL, Locale::Ko) => "전세계".to_string(),
        _ => code.to_string(),
    }
}

/// Region restriction for keyword searches
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    Global,
    Country(&'static Region),
}

impl RegionFilter {
    /// Parse a user selection; empty, "ALL" and "GLOBAL" mean unrestricted
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty()
            || value.eq_ignore_ascii_case("all")
            || value.eq_ignore_ascii_case(GLOBAL)
        {
            return Some(RegionFilter::Global);
        }
        find_region(value).map(RegionFilter::Country)
    }

    /// Region code passed to the platform, `None` when unrestricted
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RegionFilter::Global => None,
            RegionFilter::Country(region) => Some(region.code),
        }
    }

    /// Origin tag attached to candidates found with this filter
    pub fn origin_tag(&self) -> &'static str {
        self.code().unwrap_or(GLOBAL)
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.origin_tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label_en: &'static str,
    pub label_ko: &'static str,
}

impl Category {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.label_en,
            Locale::Ko => self.label_ko,
        }
    }
}

pub static CATEGORIES: [Category; 8] = [
    Category { id: "1", label_en: "Film & Drama", label_ko: "영화/드라마" },
    Category { id: "10", label_en: "Music", label_ko: "음악" },
    Category { id: "20", label_en: "Gaming", label_ko: "게임" },
    Category { id: "24", label_en: "Entertainment", label_ko: "엔터테인먼트" },
    Category { id: "25", label_en: "News", label_ko: "뉴스" },
    Category { id: "27", label_en: "Education", label_ko: "교육" },
    Category { id: "28", label_en: "Economy", label_ko: "경제" },
    Category { id: "17", label_en: "Sports", label_ko: "스포츠" },
];

/// Resolve a category by platform id or by label in either language
pub fn find_category(selection: &str) -> Option<&'static Category> {
    let selection = selection.trim();
    CATEGORIES.iter().find(|c| {
        c.id == selection
            || c.label_en.eq_ignore_ascii_case(selection)
            || c.label_ko == selection
    })
}
