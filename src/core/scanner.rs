//! Section scanner: rebuilds venue → screen → menu item from a ragged grid.
//!
//! Each row is classified once into a [`RowKind`] and the classified rows are
//! folded into a [`ScanState`]. Section boundaries come from the row contents
//! (outlet labels, the "screen" keyword, category tokens), never from fixed
//! row positions.

use crate::domain::model::{cell_at, Cell, CellValue, Grid, MenuItem, Screen, ScreenKind, Venue, VenueType};
use crate::domain::settings::{Layout, ScannerConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    VenueHeader {
        venue_type: VenueType,
        number: String,
        is_closed: bool,
    },
    /// Screen names paired with the column holding their prices.
    ScreenHeader { screens: Vec<(String, usize)> },
    /// `columns` lists the populated cells at or after the value column.
    CategoryRow { token: String, columns: Vec<usize> },
    ItemRow {
        name: String,
        prices: Vec<(usize, CellValue)>,
    },
    Blank,
}

/// Cells at or after `from`, skipping blanks, with their column index.
fn populated_from(row: &[Cell], from: usize) -> impl Iterator<Item = (usize, &CellValue)> {
    row.iter()
        .enumerate()
        .skip(from)
        .filter_map(|(col, cell)| cell.as_ref().filter(|c| !c.is_blank()).map(|c| (col, c)))
}

pub fn classify_row(row: &[Cell], config: &ScannerConfig) -> RowKind {
    let Some(label) = cell_at(row, config.label_column).map(|c| c.to_string()) else {
        return RowKind::Blank;
    };

    if let Some(venue_type) = config.outlet_type(&label) {
        let number = cell_at(row, config.value_column)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let is_closed = number.to_lowercase().contains("closed");
        return RowKind::VenueHeader {
            venue_type,
            number,
            is_closed,
        };
    }

    if config.is_screen_header(&label) {
        let screens = match config.layout {
            Layout::Rows => vec![(label, config.value_column)],
            Layout::Columns => {
                let named: Vec<(String, usize)> = populated_from(row, config.value_column)
                    .map(|(col, cell)| (cell.to_string(), col))
                    .collect();
                if named.is_empty() {
                    vec![(label, config.value_column)]
                } else {
                    named
                }
            }
        };
        return RowKind::ScreenHeader { screens };
    }

    if let Some(token) = config.category_token(&label) {
        return RowKind::CategoryRow {
            token: token.to_string(),
            columns: populated_from(row, config.value_column)
                .map(|(col, _)| col)
                .collect(),
        };
    }

    RowKind::ItemRow {
        name: label,
        prices: populated_from(row, config.value_column)
            .map(|(col, cell)| (col, cell.clone()))
            .collect(),
    }
}

#[derive(Debug, Clone)]
struct ScreenDraft {
    name: String,
    kind: ScreenKind,
    category: Option<String>,
    items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy)]
struct OpenScreen {
    index: usize,
    column: usize,
}

#[derive(Debug, Clone)]
struct VenueDraft {
    venue_type: VenueType,
    number: String,
    is_closed: bool,
    screens: Vec<ScreenDraft>,
    open: Vec<OpenScreen>,
    /// Operational token seen before any screen header; applies to the next one.
    pending_operational: bool,
}

impl VenueDraft {
    fn freeze(self, config: &ScannerConfig) -> Venue {
        let screens = self
            .screens
            .into_iter()
            .map(|draft| {
                let category = draft.category.unwrap_or_else(|| {
                    config.infer_category(draft.items.iter().map(|i| i.name.as_str()))
                });
                Screen {
                    name: draft.name,
                    kind: draft.kind,
                    category,
                    items: draft.items,
                }
            })
            .collect();
        Venue {
            venue_type: self.venue_type,
            number: self.number,
            is_closed: self.is_closed,
            screens,
        }
    }

    /// Open screens whose column is populated in the row, or all of them when none are.
    fn targets(&self, columns: &[usize]) -> Vec<usize> {
        let aligned: Vec<usize> = self
            .open
            .iter()
            .filter(|o| columns.contains(&o.column))
            .map(|o| o.index)
            .collect();
        if aligned.is_empty() {
            self.open.iter().map(|o| o.index).collect()
        } else {
            aligned
        }
    }
}

/// Fold accumulator for [`scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    venues: Vec<Venue>,
    current: Option<VenueDraft>,
    category: Option<String>,
}

impl ScanState {
    pub fn step(self, row: RowKind, config: &ScannerConfig) -> Self {
        let ScanState {
            mut venues,
            current,
            category,
        } = self;

        match row {
            RowKind::Blank => ScanState {
                venues,
                current,
                category,
            },

            RowKind::VenueHeader {
                venue_type,
                number,
                is_closed,
            } => {
                if let Some(previous) = current {
                    venues.push(previous.freeze(config));
                }
                tracing::trace!("venue {} {} (closed: {})", venue_type, number, is_closed);
                ScanState {
                    venues,
                    current: Some(VenueDraft {
                        venue_type,
                        number,
                        is_closed,
                        screens: Vec::new(),
                        open: Vec::new(),
                        pending_operational: false,
                    }),
                    category: None,
                }
            }

            RowKind::ScreenHeader { screens } => {
                let Some(mut venue) = current else {
                    tracing::trace!("screen header before any outlet header, skipped");
                    return ScanState {
                        venues,
                        current: None,
                        category,
                    };
                };

                venue.open = screens
                    .into_iter()
                    .map(|(name, column)| {
                        let index = match venue.screens.iter().position(|s| s.name == name) {
                            // 同名螢幕：續接既有清單
                            Some(index) => index,
                            None => {
                                venue.screens.push(ScreenDraft {
                                    kind: config.classify_kind(&name),
                                    name,
                                    category: category.clone(),
                                    items: Vec::new(),
                                });
                                venue.screens.len() - 1
                            }
                        };
                        OpenScreen { index, column }
                    })
                    .collect();

                if venue.pending_operational {
                    for open in &venue.open {
                        venue.screens[open.index].kind = ScreenKind::Operational;
                    }
                    venue.pending_operational = false;
                }

                ScanState {
                    venues,
                    current: Some(venue),
                    category,
                }
            }

            RowKind::CategoryRow { token, columns } => {
                let Some(mut venue) = current else {
                    return ScanState {
                        venues,
                        current: None,
                        category: Some(token),
                    };
                };

                let targets = venue.targets(&columns);
                if config.is_operational_token(&token) {
                    if targets.is_empty() {
                        venue.pending_operational = true;
                    }
                    for index in targets {
                        venue.screens[index].kind = ScreenKind::Operational;
                    }
                    return ScanState {
                        venues,
                        current: Some(venue),
                        category,
                    };
                }

                for index in targets {
                    venue.screens[index].category = Some(token.clone());
                }
                ScanState {
                    venues,
                    current: Some(venue),
                    category: Some(token),
                }
            }

            RowKind::ItemRow { name, prices } => {
                let Some(mut venue) = current else {
                    tracing::trace!("item '{}' outside any outlet, skipped", name);
                    return ScanState {
                        venues,
                        current: None,
                        category,
                    };
                };

                if venue.open.is_empty() {
                    tracing::trace!("item '{}' before any screen header, skipped", name);
                }

                for open in venue.open.clone() {
                    match prices.iter().find(|(col, _)| *col == open.column) {
                        Some((_, price)) => venue.screens[open.index]
                            .items
                            .push(MenuItem::new(name.clone(), price.clone())),
                        None => tracing::trace!("item '{}' has no price in column {}", name, open.column),
                    }
                }

                ScanState {
                    venues,
                    current: Some(venue),
                    category,
                }
            }
        }
    }

    /// Closes the venue still open at the end of the grid.
    pub fn finish(self, config: &ScannerConfig) -> Vec<Venue> {
        let mut venues = self.venues;
        if let Some(last) = self.current {
            venues.push(last.freeze(config));
        }
        venues
    }
}

/// Extracts every venue from the grid. Never fails: unrecognised rows are skipped.
pub fn scan(grid: &Grid, config: &ScannerConfig) -> Vec<Venue> {
    let venues = grid
        .rows
        .iter()
        .map(|row| classify_row(row, config))
        .fold(ScanState::default(), |state, row| state.step(row, config))
        .finish(config);

    tracing::debug!(
        "Scanned {} rows into {} venues ({} screens)",
        grid.len(),
        venues.len(),
        venues.iter().map(|v| v.screens.len()).sum::<usize>()
    );
    venues
}
