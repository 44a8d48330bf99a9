//! Summary → lead matching.
//!
//! Strategies run in a fixed priority order and the first strategy that
//! finds any lead wins:
//! 1. `leadEmail` equals a lead's email
//! 2. a participant email equals a lead's email (participants in order)
//! 3. `leadName` and the lead's name contain one another
//! 4. `leadCompany` and the lead's company contain one another
//!
//! All comparisons are case-insensitive and blank values never match.
//! Within a strategy the first lead in iteration order wins.

use std::fmt;

use serde::Serialize;

use crate::models::{Lead, Summary};

/// How a summary was matched to a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// `leadEmail` equals the lead's email.
    Email,
    /// A participant's email equals the lead's email.
    ParticipantEmail,
    /// Bidirectional substring match on name.
    Name,
    /// Bidirectional substring match on company.
    Company,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMethod::Email => "email",
            MatchMethod::ParticipantEmail => "participant_email",
            MatchMethod::Name => "name",
            MatchMethod::Company => "company",
        })
    }
}

/// Result of matching a summary against a lead collection.
#[derive(Debug, Clone, Copy)]
pub struct LeadMatch<'a> {
    /// Position of the lead in the collection that was searched.
    pub index: usize,
    pub lead: &'a Lead,
    pub method: MatchMethod,
}

/// Select the lead a summary belongs to, if any.
///
/// Pure and deterministic for a given lead order.
pub fn find_matching_lead<'a>(summary: &Summary, leads: &'a [Lead]) -> Option<LeadMatch<'a>> {
    let found = |index: usize, method: MatchMethod| LeadMatch {
        index,
        lead: &leads[index],
        method,
    };

    if let Some(email) = summary.lead_email.as_deref().and_then(fold) {
        if let Some(i) = leads.iter().position(|l| email_matches(&l.email, &email)) {
            return Some(found(i, MatchMethod::Email));
        }
    }

    for email in summary.participant_emails().filter_map(fold) {
        if let Some(i) = leads.iter().position(|l| email_matches(&l.email, &email)) {
            return Some(found(i, MatchMethod::ParticipantEmail));
        }
    }

    if let Some(name) = summary.lead_name.as_deref().and_then(fold) {
        if let Some(i) = leads.iter().position(|l| mutual_contains(&l.name, &name)) {
            return Some(found(i, MatchMethod::Name));
        }
    }

    if let Some(company) = summary.lead_company.as_deref().and_then(fold) {
        if let Some(i) = leads
            .iter()
            .position(|l| mutual_contains(l.company_str(), &company))
        {
            return Some(found(i, MatchMethod::Company));
        }
    }

    None
}

/// The strongest strategy under which `summary` would accept `lead`.
pub fn lead_matches_summary(lead: &Lead, summary: &Summary) -> Option<MatchMethod> {
    if let Some(email) = summary.lead_email.as_deref().and_then(fold) {
        if email_matches(&lead.email, &email) {
            return Some(MatchMethod::Email);
        }
    }
    if summary
        .participant_emails()
        .filter_map(fold)
        .any(|email| email_matches(&lead.email, &email))
    {
        return Some(MatchMethod::ParticipantEmail);
    }
    if let Some(name) = summary.lead_name.as_deref().and_then(fold) {
        if mutual_contains(&lead.name, &name) {
            return Some(MatchMethod::Name);
        }
    }
    if let Some(company) = summary.lead_company.as_deref().and_then(fold) {
        if mutual_contains(lead.company_str(), &company) {
            return Some(MatchMethod::Company);
        }
    }
    None
}

/// Summaries that could belong to `lead`, in their original order.
pub fn summaries_for_lead<'a>(lead: &Lead, summaries: &'a [Summary]) -> Vec<&'a Summary> {
    summaries
        .iter()
        .filter(|s| lead_matches_summary(lead, s).is_some())
        .collect()
}

/// Trimmed, lowercased value; `None` when blank.
fn fold(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// `needle` must already be folded.
fn email_matches(lead_email: &str, needle: &str) -> bool {
    fold(lead_email).is_some_and(|e| e == needle)
}

/// `needle` must already be folded.
fn mutual_contains(lead_value: &str, needle: &str) -> bool {
    fold(lead_value).is_some_and(|v| v.contains(needle) || needle.contains(v.as_str()))
}
