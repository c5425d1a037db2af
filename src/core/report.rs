use crate::core::differ::{diff, Differences, Discrepancy, ExtraItem};
use crate::core::scanner::scan;
use crate::core::standard::{detect_standard, group_screens, GroupKey};
use crate::domain::model::{Grid, Screen, ScreenRef, Venue, VenueType};
use crate::domain::settings::{AnalysisConfig, ComparisonMode, Grouping, ScannerConfig};
use crate::utils::error::{AuditError, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardItem {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub key: GroupKey,
    pub total_screens: usize,
    pub standard_items: Vec<StandardItem>,
    /// Screens sharing the standard layout.
    pub standard_member_count: usize,
    pub matching: Vec<ScreenRef>,
    pub discrepancies: Vec<Discrepancy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_items: Vec<ExtraItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSummary {
    pub venue_type: VenueType,
    pub number: String,
    pub is_closed: bool,
    pub screens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub comparison_mode: ComparisonMode,
    pub grouping: Grouping,
    pub venues: Vec<VenueSummary>,
    pub total_screens: usize,
    pub groups: Vec<GroupReport>,
}

impl AuditReport {
    pub fn discrepancy_count(&self) -> usize {
        self.groups.iter().map(|g| g.discrepancies.len()).sum()
    }

    pub fn group(&self, key: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.key.to_string() == key)
    }

    /// Groups belonging to one venue label (e.g. `FOOD 101`), in report order.
    pub fn groups_for_venue<'a>(&'a self, venue: &'a str) -> impl Iterator<Item = &'a GroupReport> + 'a {
        self.groups
            .iter()
            .filter(move |g| g.key.venue.as_deref() == Some(venue))
    }
}

fn is_audited(venue: &Venue, screen: &Screen, config: &AnalysisConfig) -> bool {
    (config.include_empty_screens || !screen.items.is_empty())
        && !(config.skip_closed_venues && venue.is_closed)
}

/// Builds the report with the grouping strategy from `config`.
pub fn assemble(venues: &[Venue], config: &AnalysisConfig) -> Result<AuditReport> {
    let grouping = config.grouping;
    assemble_with(venues, config, |venue, screen| grouping.key(venue, screen))
}

/// Builds the report with an arbitrary grouping function.
pub fn assemble_with<F>(venues: &[Venue], config: &AnalysisConfig, key_fn: F) -> Result<AuditReport>
where
    F: Fn(&Venue, &Screen) -> GroupKey,
{
    let audited = venues.iter().flat_map(|venue| {
        venue
            .screens
            .iter()
            .filter(move |screen| is_audited(venue, screen, config))
            .map(move |screen| (venue, screen))
    });
    let groups = group_screens(audited, key_fn);

    let total_screens: usize = groups.iter().map(|g| g.members.len()).sum();
    if total_screens == 0 {
        return Err(AuditError::NoScreenData);
    }

    let mode = config.comparison_mode;
    let mut reports = Vec::with_capacity(groups.len());
    for group in &groups {
        let standard = detect_standard(&group.key, &group.screens(), mode).ok_or_else(|| {
            AuditError::NoStandardLayout {
                group: group.key.to_string(),
            }
        })?;
        let outcome = diff(&standard.signature, &group.members, mode);

        reports.push(GroupReport {
            key: group.key.clone(),
            total_screens: group.members.len(),
            standard_items: standard
                .signature
                .items()
                .into_iter()
                .map(|(name, price)| StandardItem { name, price })
                .collect(),
            standard_member_count: standard.member_count,
            matching: outcome.matching,
            discrepancies: outcome.discrepancies,
            extra_items: outcome.extra_items,
        });
    }

    let report = AuditReport {
        comparison_mode: mode,
        grouping: config.grouping,
        venues: venues
            .iter()
            .map(|v| VenueSummary {
                venue_type: v.venue_type,
                number: v.number.clone(),
                is_closed: v.is_closed,
                screens: v.screens.len(),
            })
            .collect(),
        total_screens,
        groups: reports,
    };

    tracing::info!(
        "📊 Analyzed {} screens in {} groups, {} discrepancies",
        report.total_screens,
        report.groups.len(),
        report.discrepancy_count()
    );
    Ok(report)
}

/// Scan then analyze; the whole pure part of the pipeline.
pub fn audit_grid(grid: &Grid, scanner: &ScannerConfig, analysis: &AnalysisConfig) -> Result<AuditReport> {
    let venues = scan(grid, scanner);
    assemble(&venues, analysis)
}

/// Plain-text rendering for terminals.
impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analyzed {} screens", self.total_screens)?;

        if self.discrepancy_count() == 0 {
            return writeln!(f, "All screens follow the standard layout");
        }

        writeln!(f, "Discrepancies found:")?;
        for group in self.groups.iter().filter(|g| !g.discrepancies.is_empty()) {
            writeln!(
                f,
                "\n[{}] {} of {} screens match the standard",
                group.key,
                group.matching.len(),
                group.total_screens
            )?;
            for discrepancy in &group.discrepancies {
                writeln!(f, "  {}", discrepancy.screen)?;
                match &discrepancy.differences {
                    Differences::Positional { changes } => {
                        for change in changes {
                            writeln!(f, "    Expected: {} | Found: {}", change.expected, change.found)?;
                        }
                    }
                    Differences::SetBased { missing, extra } => {
                        if !missing.is_empty() {
                            writeln!(f, "    Missing: {}", missing.join(", "))?;
                        }
                        if !extra.is_empty() {
                            writeln!(f, "    Extra: {}", extra.join(", "))?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

pub fn render_summary(report: &AuditReport) -> String {
    report.to_string()
}
