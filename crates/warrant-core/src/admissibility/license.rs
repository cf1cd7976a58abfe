//! License derivation: which modalities a statement's grounding permits.

use std::collections::BTreeSet;

use tracing::debug;

use crate::types::{GroundSet, License, LinkRole, LinkSet, Modality, Scope, Strength, SupportLink};

/// Evidence discipline used to derive a license.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LicenseMode {
    /// Raw factual strength over all relevant grounds licenses assertion.
    Conservative,
    /// Only resolved `supports` links license assertion. Unlinked
    /// evidence counts for nothing: the agent must cite what it relies
    /// on.
    #[default]
    Links,
}

impl LicenseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseMode::Conservative => "conservative",
            LicenseMode::Links => "links",
        }
    }
}

/// Derives the modality license for one statement. Exactly one mode is
/// active per evaluation; modes are never mixed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LicenseDeriver {
    mode: LicenseMode,
}

impl LicenseDeriver {
    pub fn new(mode: LicenseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LicenseMode {
        self.mode
    }

    pub fn derive(&self, ground_set: &GroundSet, links: &LinkSet) -> License {
        let license = match self.mode {
            LicenseMode::Conservative => derive_conservative(ground_set),
            LicenseMode::Links => derive_from_links(ground_set, links),
        };
        debug!(
            mode = self.mode.as_str(),
            ground_set_size = ground_set.grounds.len(),
            factual_present = ground_set.has_factual(),
            factual_strength = ground_set.scope_strength(Scope::Factual).as_str(),
            factual_has_strong = ground_set.has_strong_in_scope(Scope::Factual),
            supports_links = support_links(links).count(),
            permitted = ?permitted_names(&license),
            "license derived"
        );
        license
    }
}

fn derive_conservative(ground_set: &GroundSet) -> License {
    if ground_set.is_empty() {
        return license_from([Modality::Refusal]);
    }
    match ground_set.scope_strength(Scope::Factual) {
        Strength::None => license_from([Modality::Refusal]),
        Strength::Weak => license_from([Modality::Conditional, Modality::Refusal]),
        Strength::Strong => license_from([
            Modality::Assertive,
            Modality::Conditional,
            Modality::Refusal,
        ]),
    }
}

fn derive_from_links(ground_set: &GroundSet, links: &LinkSet) -> License {
    let supports: Vec<&SupportLink> = support_links(links).collect();
    if supports.is_empty() {
        return license_from([Modality::Refusal]);
    }

    let cited: Vec<_> = supports
        .iter()
        .filter_map(|link| ground_set.resolve(&link.ground_id))
        .collect();
    if cited.is_empty() {
        return license_from([Modality::Refusal]);
    }

    let factual: Vec<_> = cited
        .into_iter()
        .filter(|ground| ground.scope == Scope::Factual)
        .collect();
    if factual.is_empty() {
        return license_from([Modality::Refusal]);
    }

    if factual.iter().any(|ground| ground.strength == Strength::Strong) {
        return license_from([
            Modality::Assertive,
            Modality::Conditional,
            Modality::Refusal,
        ]);
    }
    license_from([Modality::Conditional, Modality::Refusal])
}

fn support_links(links: &LinkSet) -> impl Iterator<Item = &SupportLink> {
    links
        .links
        .iter()
        .filter(|link| link.role == LinkRole::Supports)
}

fn permitted_names(license: &License) -> Vec<&'static str> {
    license
        .permitted_modalities
        .iter()
        .map(|m| m.as_str())
        .collect()
}

fn license_from<const N: usize>(modalities: [Modality; N]) -> License {
    let mut permitted = BTreeSet::new();
    for modality in modalities {
        permitted.insert(modality);
    }
    License {
        permitted_modalities: permitted,
    }
}
