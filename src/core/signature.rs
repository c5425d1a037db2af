use crate::domain::model::MenuItem;
use crate::domain::settings::ComparisonMode;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One `name-price` entry of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    pub name: String,
    pub price: String,
}

impl Token {
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            name: item.name.trim().to_string(),
            price: item.price.to_string(),
        }
    }

    /// Splits `name-price` on the last `-`.
    pub fn parse(token: &str) -> Option<Self> {
        let (name, price) = token.rsplit_once('-')?;
        Some(Self {
            name: name.to_string(),
            price: price.to_string(),
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.price)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(Vec<Token>);

impl Signature {
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.0.get(index)
    }

    /// `(name, price)` pairs in menu order.
    pub fn items(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|t| (t.name.clone(), t.price.clone()))
            .collect()
    }

    pub fn to_set(&self) -> SetSignature {
        let mut counts = BTreeMap::new();
        for token in &self.0 {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        SetSignature(counts)
    }

    /// Equivalence key under `mode`: the tokens as-is, or sorted for set comparison.
    pub fn layout_key(&self, mode: ComparisonMode) -> Vec<&Token> {
        let mut key: Vec<&Token> = self.0.iter().collect();
        if mode == ComparisonMode::SetBased {
            key.sort();
        }
        key
    }

    pub fn is_equivalent(&self, other: &Signature, mode: ComparisonMode) -> bool {
        match mode {
            ComparisonMode::Positional => self == other,
            ComparisonMode::SetBased => self.to_set() == other.to_set(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        f.write_str(&joined.join("|"))
    }
}

/// Multiset of tokens; order is dropped, multiplicity kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSignature(BTreeMap<Token, usize>);

impl SetSignature {
    pub fn count(&self, token: &Token) -> usize {
        self.0.get(token).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, usize)> {
        self.0.iter().map(|(t, c)| (t, *c))
    }
}

pub fn build_signature(items: &[MenuItem]) -> Signature {
    Signature(items.iter().map(Token::from_item).collect())
}

pub fn build_set_signature(items: &[MenuItem]) -> SetSignature {
    build_signature(items).to_set()
}
