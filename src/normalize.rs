//! Column normalizer.
//!
//! POS exports never agree on header names (`Nom Produit`, `Produit -
//! Nom`, `NOM_PRODUIT`, ...). This module maps raw headers onto the
//! canonical sale schema using an ordered decision table of substring
//! rules evaluated against the folded (lowercased, accent-stripped)
//! header. The first matching rule wins; headers matching no rule are
//! deliberately dropped rather than carried through.

use log::{debug, warn};

use crate::data::fold_header;

/// The fixed set of normalized column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Product,
    UnitPrice,
    Amount,
    Quantity,
    Client,
    Operator,
    Date,
    Code,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Product,
        CanonicalField::UnitPrice,
        CanonicalField::Amount,
        CanonicalField::Quantity,
        CanonicalField::Client,
        CanonicalField::Operator,
        CanonicalField::Date,
        CanonicalField::Code,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Product => "product",
            CanonicalField::UnitPrice => "unit_price",
            CanonicalField::Amount => "amount",
            CanonicalField::Quantity => "quantity",
            CanonicalField::Client => "client",
            CanonicalField::Operator => "operator",
            CanonicalField::Date => "date",
            CanonicalField::Code => "code",
        }
    }

    fn slot(self) -> usize {
        match self {
            CanonicalField::Product => 0,
            CanonicalField::UnitPrice => 1,
            CanonicalField::Amount => 2,
            CanonicalField::Quantity => 3,
            CanonicalField::Client => 4,
            CanonicalField::Operator => 5,
            CanonicalField::Date => 6,
            CanonicalField::Code => 7,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    ContainsAll(&'static [&'static str]),
    ContainsAny(&'static [&'static str]),
    StartsWith(&'static str),
    Exact(&'static str),
}

impl Matcher {
    fn matches(self, folded: &str) -> bool {
        match self {
            Matcher::ContainsAll(needles) => needles.iter().all(|n| folded.contains(n)),
            Matcher::ContainsAny(needles) => needles.iter().any(|n| folded.contains(n)),
            Matcher::StartsWith(prefix) => folded.starts_with(prefix),
            Matcher::Exact(value) => folded == value,
        }
    }
}

/// The header decision table, evaluated top to bottom. Order matters:
/// `prix ttc` must be tried before the bare `ref` catch-all, and the
/// exact `date` rule keeps `date de péremption`-style columns out.
const RULES: &[(Matcher, CanonicalField)] = &[
    (
        Matcher::ContainsAll(&["produit", "nom"]),
        CanonicalField::Product,
    ),
    (Matcher::ContainsAny(&["prix ttc"]), CanonicalField::UnitPrice),
    (Matcher::ContainsAny(&["montant ttc"]), CanonicalField::Amount),
    (Matcher::StartsWith("qt"), CanonicalField::Quantity),
    (Matcher::ContainsAny(&["client"]), CanonicalField::Client),
    (Matcher::ContainsAny(&["operateur"]), CanonicalField::Operator),
    (Matcher::Exact("date"), CanonicalField::Date),
    (
        Matcher::ContainsAny(&["code13", "ref"]),
        CanonicalField::Code,
    ),
];

/// Outcome of classifying one raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDecision {
    /// Auto-generated placeholder (`Unnamed: 3`, empty header) discarded
    /// before the rules run.
    Placeholder,
    Mapped(CanonicalField),
    /// No rule matched; the column never reaches the canonical schema.
    Dropped,
}

pub fn classify_header(raw: &str) -> HeaderDecision {
    let folded = fold_header(raw);
    if folded.is_empty() || folded.starts_with("unnamed") {
        return HeaderDecision::Placeholder;
    }
    for (matcher, field) in RULES {
        if matcher.matches(&folded) {
            return HeaderDecision::Mapped(*field);
        }
    }
    HeaderDecision::Dropped
}

/// Resolved mapping from canonical field to raw column index for one
/// input file. Column presence is decided here, once per file — the
/// coercion defaults in `dataset` depend on that distinction.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    slots: [Option<usize>; 8],
}

impl ColumnMap {
    pub fn build(headers: &[String]) -> ColumnMap {
        let mut map = ColumnMap::default();
        for (idx, raw) in headers.iter().enumerate() {
            match classify_header(raw) {
                HeaderDecision::Mapped(field) => {
                    let slot = field.slot();
                    if let Some(previous) = map.slots[slot] {
                        // Last write wins, as the legacy dashboard did, but
                        // real data may be hiding in the shadowed column.
                        warn!(
                            "columns '{}' and '{}' both map to '{}'; keeping '{}'",
                            headers[previous],
                            raw,
                            field.name(),
                            raw
                        );
                    }
                    debug!("header '{}' -> {}", raw, field.name());
                    map.slots[slot] = Some(idx);
                }
                HeaderDecision::Placeholder => {
                    debug!("discarding placeholder header '{raw}'");
                }
                HeaderDecision::Dropped => {
                    debug!("dropping unrecognized header '{raw}'");
                }
            }
        }
        map
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.slots[field.slot()]
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.index_of(field).is_some()
    }
}
