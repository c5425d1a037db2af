use crate::core::signature::{build_signature, Signature, Token};
use crate::domain::model::{Screen, ScreenRef, Venue};
use crate::domain::settings::ComparisonMode;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const MISSING: &str = "missing";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionalDifference {
    pub index: usize,
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Differences {
    Positional { changes: Vec<PositionalDifference> },
    SetBased { missing: Vec<String>, extra: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub screen: ScreenRef,
    pub differences: Differences,
}

/// An extra item name merged across every screen that carries it, at any price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraItem {
    pub item: String,
    /// Distinct `name-price` tokens seen for this name, first-seen order.
    pub tokens: Vec<String>,
    pub screens: Vec<ScreenRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffOutcome {
    pub matching: Vec<ScreenRef>,
    pub discrepancies: Vec<Discrepancy>,
    /// Only populated in set-based mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_items: Vec<ExtraItem>,
}

fn token_or_missing(token: Option<&Token>) -> String {
    token.map_or_else(|| MISSING.to_string(), |t| t.to_string())
}

pub fn positional_diff(standard: &Signature, current: &Signature) -> Vec<PositionalDifference> {
    let len = standard.len().max(current.len());
    (0..len)
        .filter_map(|index| {
            let expected = standard.get(index);
            let found = current.get(index);
            (expected != found).then(|| PositionalDifference {
                index,
                expected: token_or_missing(expected),
                found: token_or_missing(found),
            })
        })
        .collect()
}

/// Tokens whose count in `from` exceeds their count in `other`, deduplicated in `from` order.
fn surplus<'a>(from: &'a Signature, other: &Signature) -> Vec<&'a Token> {
    let other = other.to_set();
    let from_set = from.to_set();
    let mut seen = HashSet::new();
    from.tokens()
        .iter()
        .filter(|t| from_set.count(t) > other.count(t))
        .filter(|t| seen.insert(*t))
        .collect()
}

fn display_all(tokens: &[&Token]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

pub fn set_diff(standard: &Signature, current: &Signature) -> (Vec<String>, Vec<String>) {
    (
        display_all(&surplus(standard, current)),
        display_all(&surplus(current, standard)),
    )
}

/// Merges extras by item name; a screen is listed once per name.
fn record_extras(
    extras: &mut Vec<ExtraItem>,
    index: &mut HashMap<String, usize>,
    tokens: &[&Token],
    screen: &ScreenRef,
) {
    for token in tokens {
        let slot = *index.entry(token.name.clone()).or_insert_with(|| {
            extras.push(ExtraItem {
                item: token.name.clone(),
                tokens: Vec::new(),
                screens: Vec::new(),
            });
            extras.len() - 1
        });
        let entry = &mut extras[slot];
        let display = token.to_string();
        if !entry.tokens.contains(&display) {
            entry.tokens.push(display);
        }
        if entry.screens.last() != Some(screen) {
            entry.screens.push(screen.clone());
        }
    }
}

/// Splits `screens` into those matching `standard` and itemized discrepancies.
pub fn diff(
    standard: &Signature,
    screens: &[(&Venue, &Screen)],
    mode: ComparisonMode,
) -> DiffOutcome {
    let mut outcome = DiffOutcome::default();
    let mut extras: Vec<ExtraItem> = Vec::new();
    let mut extra_index: HashMap<String, usize> = HashMap::new();

    for (venue, screen) in screens {
        let current = build_signature(&screen.items);
        let screen_ref = ScreenRef::new(venue, screen);

        if current.is_equivalent(standard, mode) {
            outcome.matching.push(screen_ref);
            continue;
        }

        let differences = match mode {
            ComparisonMode::Positional => Differences::Positional {
                changes: positional_diff(standard, &current),
            },
            ComparisonMode::SetBased => {
                let extra = surplus(&current, standard);
                record_extras(&mut extras, &mut extra_index, &extra, &screen_ref);
                Differences::SetBased {
                    missing: display_all(&surplus(standard, &current)),
                    extra: display_all(&extra),
                }
            }
        };

        tracing::debug!("Discrepancy on {}", screen_ref);
        outcome.discrepancies.push(Discrepancy {
            screen: screen_ref,
            differences,
        });
    }

    outcome.extra_items = extras;
    outcome
}
