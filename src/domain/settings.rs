use crate::domain::model::{ScreenKind, VenueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Row- or column-oriented screen blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Layout {
    /// One screen per header row; prices in `value_column`.
    #[default]
    Rows,
    /// One screen per populated header cell; prices in that screen's column.
    Columns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ComparisonMode {
    /// Index-by-index comparison; reordered menus are discrepancies.
    #[default]
    Positional,
    /// Multiset comparison; order is ignored, multiplicity is not.
    SetBased,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMode::Positional => f.write_str("positional"),
            ComparisonMode::SetBased => f.write_str("set-based"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Grouping {
    #[default]
    VenueCategory,
    VenueKind,
    Category,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::VenueCategory => f.write_str("venue-category"),
            Grouping::VenueKind => f.write_str("venue-kind"),
            Grouping::Category => f.write_str("category"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Ods,
    Csv,
}

impl SourceFormat {
    pub const EXTENSIONS: [&'static str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" => Some(SourceFormat::Xlsx),
            "xls" => Some(SourceFormat::Xls),
            "ods" => Some(SourceFormat::Ods),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletLabel {
    pub label: String,
    pub venue_type: VenueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindRule {
    pub kind: ScreenKind,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

fn rule(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

/// Classification tables and column conventions for the section scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub label_column: usize,
    pub value_column: usize,
    pub layout: Layout,
    pub outlets: Vec<OutletLabel>,
    pub screen_keyword: String,
    pub category_tokens: Vec<String>,
    pub operational_token: String,
    /// First matching rule wins.
    pub screen_kinds: Vec<KindRule>,
    pub default_kind: ScreenKind,
    /// Used to infer a category for screens that no category row tagged.
    pub item_categories: Vec<CategoryRule>,
    pub fallback_category: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            label_column: 1,
            value_column: 2,
            layout: Layout::Rows,
            outlets: vec![
                OutletLabel {
                    label: "Food Outlets:".to_string(),
                    venue_type: VenueType::Food,
                },
                OutletLabel {
                    label: "Coffee Outlets:".to_string(),
                    venue_type: VenueType::Coffee,
                },
                OutletLabel {
                    label: "Bar Outlets:".to_string(),
                    venue_type: VenueType::Bar,
                },
            ],
            screen_keyword: "screen".to_string(),
            category_tokens: rule(&["Hot Food", "Cold Food", "Drinks", "Snacks", "CARD ONLY"]),
            operational_token: "CARD ONLY".to_string(),
            screen_kinds: vec![
                KindRule {
                    kind: ScreenKind::External,
                    keywords: rule(&["external", "outside"]),
                },
                KindRule {
                    kind: ScreenKind::Rotating,
                    keywords: rule(&["rotat"]),
                },
                KindRule {
                    kind: ScreenKind::Operational,
                    keywords: rule(&["operational"]),
                },
                KindRule {
                    kind: ScreenKind::Menu,
                    keywords: rule(&["menu"]),
                },
            ],
            default_kind: ScreenKind::Internal,
            item_categories: vec![
                CategoryRule {
                    category: "Hot Food".to_string(),
                    keywords: rule(&["chips", "burger", "hot dog", "pie", "chicken", "fish"]),
                },
                CategoryRule {
                    category: "Cold Food".to_string(),
                    keywords: rule(&["sandwich", "wrap", "sushi", "salad"]),
                },
                CategoryRule {
                    category: "Drinks".to_string(),
                    keywords: rule(&["water", "coca cola", "juice", "powerade"]),
                },
                CategoryRule {
                    category: "Snacks".to_string(),
                    keywords: rule(&["ice cream", "chocolate", "chips", "lollies"]),
                },
            ],
            fallback_category: "Other".to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn outlet_type(&self, label: &str) -> Option<VenueType> {
        let label = label.trim();
        self.outlets
            .iter()
            .find(|o| o.label.trim().eq_ignore_ascii_case(label))
            .map(|o| o.venue_type)
    }

    pub fn is_screen_header(&self, label: &str) -> bool {
        contains_ignore_case(label, &self.screen_keyword)
    }

    /// Category token matching `label` (trimmed, case-insensitive), in its configured spelling.
    pub fn category_token(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.category_tokens
            .iter()
            .map(|t| t.as_str())
            .find(|t| t.trim().eq_ignore_ascii_case(label))
    }

    pub fn is_operational_token(&self, token: &str) -> bool {
        token.trim().eq_ignore_ascii_case(self.operational_token.trim())
    }

    pub fn classify_kind(&self, screen_name: &str) -> ScreenKind {
        self.screen_kinds
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| contains_ignore_case(screen_name, k)))
            .map(|rule| rule.kind)
            .unwrap_or(self.default_kind)
    }

    /// Category with the most keyword hits across `names`; ties go to the earlier rule.
    pub fn infer_category<'a, I>(&self, names: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.to_lowercase()).collect();
        let mut best: Option<(&str, usize)> = None;
        for rule in &self.item_categories {
            let hits = names
                .iter()
                .filter(|name| {
                    rule.keywords
                        .iter()
                        .any(|k| name.contains(&k.to_lowercase()))
                })
                .count();
            if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
                best = Some((rule.category.as_str(), hits));
            }
        }
        best.map(|(c, _)| c.to_string())
            .unwrap_or_else(|| self.fallback_category.clone())
    }
}

/// Analysis switches for the detector, differ and report assembler.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub comparison_mode: ComparisonMode,
    pub grouping: Grouping,
    pub skip_closed_venues: bool,
    pub include_empty_screens: bool,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
