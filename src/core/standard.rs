use crate::core::signature::{build_signature, Signature, Token};
use crate::domain::model::{Screen, ScreenKind, Venue};
use crate::domain::settings::{ComparisonMode, Grouping};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Report group key. Unused parts stay `None` depending on the grouping strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ScreenKind>,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(venue) = &self.venue {
            parts.push(venue.clone());
        }
        if let Some(category) = &self.category {
            parts.push(category.clone());
        }
        if let Some(kind) = self.kind {
            parts.push(kind.to_string());
        }
        if parts.is_empty() {
            f.write_str("all screens")
        } else {
            f.write_str(&parts.join(" / "))
        }
    }
}

impl Grouping {
    pub fn key(&self, venue: &Venue, screen: &Screen) -> GroupKey {
        match self {
            Grouping::VenueCategory => GroupKey {
                venue: Some(venue.label()),
                category: Some(screen.category.clone()),
                kind: None,
            },
            Grouping::VenueKind => GroupKey {
                venue: Some(venue.label()),
                category: None,
                kind: Some(screen.kind),
            },
            Grouping::Category => GroupKey {
                venue: None,
                category: Some(screen.category.clone()),
                kind: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenGroup<'a> {
    pub key: GroupKey,
    pub members: Vec<(&'a Venue, &'a Screen)>,
}

impl<'a> ScreenGroup<'a> {
    pub fn screens(&self) -> Vec<&'a Screen> {
        self.members.iter().map(|(_, s)| *s).collect()
    }
}

/// Buckets screens by `key_fn`; groups keep first-seen order, members keep scan order.
pub fn group_screens<'a, I, F>(screens: I, key_fn: F) -> Vec<ScreenGroup<'a>>
where
    I: IntoIterator<Item = (&'a Venue, &'a Screen)>,
    F: Fn(&Venue, &Screen) -> GroupKey,
{
    let mut groups: Vec<ScreenGroup<'a>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for (venue, screen) in screens {
        let key = key_fn(venue, screen);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(ScreenGroup {
                key,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push((venue, screen));
    }

    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardLayout {
    pub group_key: GroupKey,
    pub signature: Signature,
    pub member_count: usize,
}

/// Most frequent signature in the group; ties go to the earliest screen.
pub fn detect_standard(
    group_key: &GroupKey,
    screens: &[&Screen],
    mode: ComparisonMode,
) -> Option<StandardLayout> {
    let signatures: Vec<Signature> = screens.iter().map(|s| build_signature(&s.items)).collect();

    // key -> (出現次數, 第一次出現的位置)
    let mut counts: HashMap<Vec<&Token>, (usize, usize)> = HashMap::new();
    for (position, signature) in signatures.iter().enumerate() {
        counts
            .entry(signature.layout_key(mode))
            .or_insert((0, position))
            .0 += 1;
    }

    let (count, first) = counts
        .into_values()
        .max_by(|(count_a, first_a), (count_b, first_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })?;

    tracing::debug!(
        "Standard for '{}': {} of {} screens",
        group_key,
        count,
        screens.len()
    );

    Some(StandardLayout {
        group_key: group_key.clone(),
        signature: signatures[first].clone(),
        member_count: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CellValue, MenuItem, VenueType};

    fn screen(name: &str, kind: ScreenKind, category: &str, items: &[(&str, &str)]) -> Screen {
        Screen {
            name: name.to_string(),
            kind,
            category: category.to_string(),
            items: items
                .iter()
                .map(|(n, p)| MenuItem::new(*n, CellValue::text(*p)))
                .collect(),
        }
    }

    fn venue(number: &str, screens: Vec<Screen>) -> Venue {
        Venue {
            venue_type: VenueType::Food,
            number: number.to_string(),
            is_closed: false,
            screens,
        }
    }

    fn key() -> GroupKey {
        GroupKey {
            venue: None,
            category: Some("Hot Food".to_string()),
            kind: None,
        }
    }

    #[test]
    fn test_most_frequent_signature_wins() {
        let a = screen("A", ScreenKind::Internal, "Hot Food", &[("Pie", "5")]);
        let b = screen("B", ScreenKind::Internal, "Hot Food", &[("Pie", "6")]);
        let c = screen("C", ScreenKind::Internal, "Hot Food", &[("Pie", "6")]);
        let standard = detect_standard(&key(), &[&a, &b, &c], ComparisonMode::Positional).unwrap();
        assert_eq!(standard.signature.to_string(), "Pie-6");
        assert_eq!(standard.member_count, 2);
    }

    #[test]
    fn test_tie_goes_to_first_screen_and_is_stable() {
        let a = screen("A", ScreenKind::Internal, "Hot Food", &[("Pie", "5")]);
        let b = screen("B", ScreenKind::Internal, "Hot Food", &[("Pie", "6")]);
        let c = screen("C", ScreenKind::Internal, "Hot Food", &[("Pie", "6")]);
        let d = screen("D", ScreenKind::Internal, "Hot Food", &[("Pie", "5")]);
        let screens = [&a, &b, &c, &d];
        for _ in 0..10 {
            let standard = detect_standard(&key(), &screens, ComparisonMode::Positional).unwrap();
            assert_eq!(standard.signature.to_string(), "Pie-5");
        }
        let reversed = [&d, &c, &b, &a];
        let standard = detect_standard(&key(), &reversed, ComparisonMode::Positional).unwrap();
        assert_eq!(standard.signature.to_string(), "Pie-5");
        let shifted = [&b, &a, &c, &d];
        let standard = detect_standard(&key(), &shifted, ComparisonMode::Positional).unwrap();
        assert_eq!(standard.signature.to_string(), "Pie-6");
    }

    #[test]
    fn test_set_mode_counts_reordered_menus_together() {
        let a = screen("A", ScreenKind::Internal, "Hot Food", &[("Pie", "5"), ("Chips", "4")]);
        let b = screen("B", ScreenKind::Internal, "Hot Food", &[("Chips", "4"), ("Pie", "5")]);
        let c = screen("C", ScreenKind::Internal, "Hot Food", &[("Pie", "9")]);
        let d = screen("D", ScreenKind::Internal, "Hot Food", &[("Pie", "9")]);
        let screens = [&c, &a, &d, &b];

        let positional = detect_standard(&key(), &screens, ComparisonMode::Positional).unwrap();
        assert_eq!(positional.signature.to_string(), "Pie-9");

        let set = detect_standard(&key(), &screens, ComparisonMode::SetBased).unwrap();
        assert_eq!(set.member_count, 2);
        // earliest class is C/D, both classes have two members
        assert_eq!(set.signature.to_string(), "Pie-9");

        let screens = [&a, &c, &d, &b];
        let set = detect_standard(&key(), &screens, ComparisonMode::SetBased).unwrap();
        assert_eq!(set.signature.to_string(), "Pie-5|Chips-4");
    }

    #[test]
    fn test_empty_group_has_no_standard() {
        assert!(detect_standard(&key(), &[], ComparisonMode::Positional).is_none());
    }

    #[test]
    fn test_grouping_strategies() {
        let venues = vec![
            venue(
                "1",
                vec![
                    screen("S1", ScreenKind::Internal, "Hot Food", &[("Pie", "5")]),
                    screen("S2", ScreenKind::External, "Drinks", &[("Water", "3")]),
                ],
            ),
            venue(
                "2",
                vec![screen("S1", ScreenKind::Internal, "Hot Food", &[("Pie", "5")])],
            ),
        ];
        let pairs = || venues.iter().flat_map(|v| v.screens.iter().map(move |s| (v, s)));

        let by_venue = group_screens(pairs(), |v, s| Grouping::VenueCategory.key(v, s));
        assert_eq!(by_venue.len(), 3);
        assert_eq!(by_venue[0].key.to_string(), "FOOD 1 / Hot Food");

        let by_category = group_screens(pairs(), |v, s| Grouping::Category.key(v, s));
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[0].members.len(), 2);

        let by_kind = group_screens(pairs(), |v, s| Grouping::VenueKind.key(v, s));
        assert_eq!(by_kind[1].key.to_string(), "FOOD 1 / external");

        // any closure works as a grouping function
        let everything = group_screens(pairs(), |_, _| GroupKey {
            venue: None,
            category: None,
            kind: None,
        });
        assert_eq!(everything.len(), 1);
        assert_eq!(everything[0].key.to_string(), "all screens");
        assert_eq!(everything[0].screens().len(), 3);
    }
}
