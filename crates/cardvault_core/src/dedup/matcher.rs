//! Multi-field duplicate scoring.
//!
//! # Responsibility
//! - Score a candidate against one stored card over the signal fields
//!   (name, email, phone, company).
//! - Scan a collection in order and return the first duplicate.
//!
//! # Invariants
//! - A field is comparable only when both sides are non-empty after
//!   normalization.
//! - Majority rule: at least two comparable fields, at least two matches,
//!   and a match ratio strictly above `MAJORITY_RATIO`.
//! - Identifier rule: an equal email or phone is conclusive on its own.
//! - The first card in collection order that satisfies either rule wins.

use crate::dedup::normalize::{normalize_email, normalize_name, normalize_phone};
use crate::model::card::{Card, CardDraft};

/// Match ratio a majority must strictly exceed.
pub const MAJORITY_RATIO: f64 = 0.6;
const MIN_COMPARED_FIELDS: u32 = 2;
const MIN_MATCHED_FIELDS: u32 = 2;

/// Signal-field view over a card or draft, normalized once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalFields {
    name: Option<String>,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl SignalFields {
    pub fn new(
        name: Option<&str>,
        company: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Self {
        Self {
            name: present(name.map(normalize_name)),
            company: present(company.map(normalize_name)),
            email: present(email.map(normalize_email)),
            phone: present(phone.map(normalize_phone)),
        }
    }
}

impl From<&Card> for SignalFields {
    fn from(card: &Card) -> Self {
        Self::new(
            Some(card.name.as_str()),
            card.company.as_deref(),
            card.email.as_deref(),
            card.phone.as_deref(),
        )
    }
}

impl From<&CardDraft> for SignalFields {
    fn from(draft: &CardDraft) -> Self {
        Self::new(
            Some(draft.name.as_str()),
            draft.company.as_deref(),
            draft.email.as_deref(),
            draft.phone.as_deref(),
        )
    }
}

/// Why a stored card was judged a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// Most comparable signal fields matched.
    Majority { matched: u32, compared: u32 },
    /// Normalized emails are equal.
    Email,
    /// Normalized phone digits are equal.
    Phone,
}

/// Per-pair comparison tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchScore {
    /// Signal fields present on both sides.
    pub total_fields: u32,
    /// Comparable signal fields with equal normalized values.
    pub match_count: u32,
    pub email_match: bool,
    pub phone_match: bool,
}

impl MatchScore {
    /// Returns whether the majority rule holds.
    pub fn is_majority(&self) -> bool {
        self.total_fields >= MIN_COMPARED_FIELDS
            && self.match_count >= MIN_MATCHED_FIELDS
            && f64::from(self.match_count) / f64::from(self.total_fields) > MAJORITY_RATIO
    }

    /// Classifies the score; majority is checked before identifiers.
    pub fn reason(&self) -> Option<MatchReason> {
        if self.is_majority() {
            return Some(MatchReason::Majority {
                matched: self.match_count,
                compared: self.total_fields,
            });
        }
        if self.email_match {
            return Some(MatchReason::Email);
        }
        if self.phone_match {
            return Some(MatchReason::Phone);
        }
        None
    }
}

/// Compares one candidate against one stored card.
pub fn score(candidate: &SignalFields, existing: &SignalFields) -> MatchScore {
    let mut tally = MatchScore::default();
    compare(&candidate.name, &existing.name, &mut tally);
    compare(&candidate.company, &existing.company, &mut tally);
    tally.email_match = compare(&candidate.email, &existing.email, &mut tally);
    tally.phone_match = compare(&candidate.phone, &existing.phone, &mut tally);
    tally
}

/// Returns the first card in `cards` that the candidate duplicates.
pub fn find_match<'a>(
    candidate: &SignalFields,
    cards: &'a [Card],
) -> Option<(&'a Card, MatchReason)> {
    cards.iter().find_map(|card| {
        score(candidate, &SignalFields::from(card))
            .reason()
            .map(|reason| (card, reason))
    })
}

fn compare(left: &Option<String>, right: &Option<String>, tally: &mut MatchScore) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };
    tally.total_fields += 1;
    if left == right {
        tally.match_count += 1;
        return true;
    }
    false
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|normalized| !normalized.is_empty())
}
