use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar cell value. Absent cells are `None` in a [`Row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Trimmed string form; blank text counts as empty.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

pub type Cell = Option<CellValue>;
pub type Row = Vec<Cell>;

/// Rectangular-ish grid of cells as read from the first sheet. Rows may be ragged;
/// reading past the end of a row yields an absent cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: Vec<Row>,
}

impl Grid {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Builds a grid from string rows; empty strings become absent cells.
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        if cell.trim().is_empty() {
                            None
                        } else {
                            Some(CellValue::text(cell))
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| cell_at(r, col))
    }
}

/// Non-blank cell at `col`, if any.
pub fn cell_at(row: &[Cell], col: usize) -> Option<&CellValue> {
    row.get(col)
        .and_then(|c| c.as_ref())
        .filter(|c| !c.is_blank())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: CellValue,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: CellValue) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ScreenKind {
    Internal,
    External,
    Rotating,
    Operational,
    Menu,
    Other,
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenKind::Internal => "internal",
            ScreenKind::External => "external",
            ScreenKind::Rotating => "rotating",
            ScreenKind::Operational => "operational",
            ScreenKind::Menu => "menu",
            ScreenKind::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub kind: ScreenKind,
    pub category: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VenueType {
    Food,
    Coffee,
    Bar,
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VenueType::Food => "FOOD",
            VenueType::Coffee => "COFFEE",
            VenueType::Bar => "BAR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(rename = "type")]
    pub venue_type: VenueType,
    pub number: String,
    pub is_closed: bool,
    pub screens: Vec<Screen>,
}

impl Venue {
    /// Venue label used in group keys and reports, e.g. `FOOD 101`.
    pub fn label(&self) -> String {
        format!("{} {}", self.venue_type, self.number)
    }
}

/// Identifies one screen in a report; screen names are only unique within a venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRef {
    pub venue_type: VenueType,
    pub venue_number: String,
    pub screen: String,
    pub kind: ScreenKind,
    pub category: String,
}

impl ScreenRef {
    pub fn new(venue: &Venue, screen: &Screen) -> Self {
        Self {
            venue_type: venue.venue_type,
            venue_number: venue.number.clone(),
            screen: screen.name.clone(),
            kind: screen.kind,
            category: screen.category.clone(),
        }
    }
}

impl fmt::Display for ScreenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} / {}", self.venue_type, self.venue_number, self.screen)
    }
}
