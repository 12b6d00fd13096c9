// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The block palette and its typed property schema.
//!
//! Each palette entry fixes a block kind, a display name, and a set of default properties. Blocks
//! store only overrides; reads fall back to the entry's defaults.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;

use super::block::BlockKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaletteEntry {
    Groth16,
    Plonk,
    Halo2,
    Fhe,
    Mpc,
    Bls12_381,
    Bn254,
    Bls24_315,
    RangeProof,
    MerkleProof,
    SignatureVerification,
    AuctionProtocol,
    VotingSystem,
    FairExchange,
    Input,
    Output,
}

/// Curves a zero-knowledge block may be configured with.
pub const ZK_CURVE_CHOICES: [&str; 4] = ["BLS12-381", "BN-254", "BLS24-315", "Pasta"];

impl PaletteEntry {
    /// Palette order, grouped by category.
    pub const ALL: [PaletteEntry; 16] = [
        PaletteEntry::Groth16,
        PaletteEntry::Plonk,
        PaletteEntry::Halo2,
        PaletteEntry::Fhe,
        PaletteEntry::Mpc,
        PaletteEntry::Bls12_381,
        PaletteEntry::Bn254,
        PaletteEntry::Bls24_315,
        PaletteEntry::Input,
        PaletteEntry::Output,
        PaletteEntry::RangeProof,
        PaletteEntry::MerkleProof,
        PaletteEntry::SignatureVerification,
        PaletteEntry::AuctionProtocol,
        PaletteEntry::VotingSystem,
        PaletteEntry::FairExchange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Groth16 => "Groth16",
            Self::Plonk => "Plonk",
            Self::Halo2 => "Halo2",
            Self::Fhe => "FHE",
            Self::Mpc => "MPC",
            Self::Bls12_381 => "BLS12-381",
            Self::Bn254 => "BN-254",
            Self::Bls24_315 => "BLS24-315",
            Self::RangeProof => "Range Proof",
            Self::MerkleProof => "Merkle Proof",
            Self::SignatureVerification => "Signature Verification",
            Self::AuctionProtocol => "Auction Protocol",
            Self::VotingSystem => "Voting System",
            Self::FairExchange => "Fair Exchange",
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }

    pub fn kind(self) -> BlockKind {
        match self {
            Self::Groth16 | Self::Plonk | Self::Halo2 => BlockKind::ZkPrimitive,
            Self::Fhe | Self::Mpc => BlockKind::CryptoPrimitive,
            Self::Bls12_381 | Self::Bn254 | Self::Bls24_315 => BlockKind::CurvePrimitive,
            Self::RangeProof | Self::MerkleProof | Self::SignatureVerification => {
                BlockKind::Verification
            }
            Self::AuctionProtocol | Self::VotingSystem | Self::FairExchange => BlockKind::Mechanism,
            Self::Input => BlockKind::Input,
            Self::Output => BlockKind::Output,
        }
    }

    pub fn category(self) -> &'static str {
        self.kind().category()
    }

    pub fn default_properties(self) -> &'static [(PropertyKey, &'static str)] {
        match self {
            Self::Groth16 => GROTH16_DEFAULTS,
            Self::Plonk => PLONK_DEFAULTS,
            Self::Halo2 => HALO2_DEFAULTS,
            Self::Fhe => FHE_DEFAULTS,
            Self::Mpc => MPC_DEFAULTS,
            Self::Input => INPUT_DEFAULTS,
            Self::Output => OUTPUT_DEFAULTS,
            _ => NO_DEFAULTS,
        }
    }

    pub fn default_property(self, key: &PropertyKey) -> Option<&'static str> {
        self.default_properties()
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| *value)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entry| entry.name() == name)
    }

    /// Finds the entry backing a block. Input and output blocks keep their entry after a rename;
    /// every other kind is identified by its fixed display name.
    pub fn for_block(kind: BlockKind, display_name: &str) -> Option<Self> {
        match kind {
            BlockKind::Input => Some(Self::Input),
            BlockKind::Output => Some(Self::Output),
            _ => Self::from_name(display_name).filter(|entry| entry.kind() == kind),
        }
    }
}

impl fmt::Display for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type PropertyDefaults = &'static [(PropertyKey, &'static str)];

const NO_DEFAULTS: PropertyDefaults = &[];

const GROTH16_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Curve, "BLS12-381"),
    (PropertyKey::ProofSize, "~200 bytes"),
    (PropertyKey::ProverTime, "Fast"),
    (PropertyKey::VerifierTime, "Very Fast"),
    (PropertyKey::TrustedSetup, "Required"),
];

const PLONK_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Curve, "BLS12-381"),
    (PropertyKey::ProofSize, "~300 bytes"),
    (PropertyKey::ProverTime, "Medium"),
    (PropertyKey::VerifierTime, "Fast"),
    (PropertyKey::TrustedSetup, "Universal"),
];

const HALO2_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Curve, "Pasta"),
    (PropertyKey::ProofSize, "~400 bytes"),
    (PropertyKey::ProverTime, "Medium"),
    (PropertyKey::VerifierTime, "Fast"),
    (PropertyKey::TrustedSetup, "None"),
];

const FHE_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Security, "Post-quantum"),
    (PropertyKey::Operations, "Addition, Multiplication"),
    (PropertyKey::KeySize, "~2MB"),
    (PropertyKey::Performance, "Slow"),
];

const MPC_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Parties, "2+"),
    (PropertyKey::Security, "Information-theoretic"),
    (PropertyKey::Communication, "High"),
    (PropertyKey::Rounds, "Multiple"),
];

const INPUT_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Role, "Parameter"),
    (PropertyKey::Editable, "true"),
    (PropertyKey::DataType, "Any"),
];

const OUTPUT_DEFAULTS: PropertyDefaults = &[
    (PropertyKey::Role, "Result"),
    (PropertyKey::Editable, "true"),
    (PropertyKey::DataType, "Any"),
];

/// Ranks palette entries against a search query.
///
/// An empty query returns the whole palette in palette order.
pub fn search_palette(query: &str) -> Vec<PaletteEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return PaletteEntry::ALL.to_vec();
    }

    let mut ranked = PaletteEntry::ALL
        .into_iter()
        .enumerate()
        .filter_map(|(order, entry)| {
            let by_category = palette_score(&needle, &entry.category().to_lowercase())
                .map(|score| score - 200);
            let score = palette_score(&needle, &entry.name().to_lowercase()).max(by_category)?;
            Some((score, order, entry))
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    ranked.into_iter().map(|(_, _, entry)| entry).collect()
}

fn palette_score(needle: &str, haystack: &str) -> Option<i64> {
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    let mut score = (ratio * 1000.0).round() as i64;
    if haystack.starts_with(needle) {
        score += 3000;
    } else if haystack.contains(needle) {
        score += 2000;
    } else if ratio < 0.6 {
        return None;
    }
    Some(score)
}

/// Known property names plus free-form extras.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Curve,
    ProofSize,
    ProverTime,
    VerifierTime,
    TrustedSetup,
    Security,
    Operations,
    KeySize,
    Performance,
    Parties,
    Communication,
    Rounds,
    /// Serialized as `type`: the parameter/result role of an input or output.
    Role,
    Editable,
    DataType,
    Custom(SmolStr),
}

impl PropertyKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Curve => "curve",
            Self::ProofSize => "proofSize",
            Self::ProverTime => "proverTime",
            Self::VerifierTime => "verifierTime",
            Self::TrustedSetup => "trustedSetup",
            Self::Security => "security",
            Self::Operations => "operations",
            Self::KeySize => "keySize",
            Self::Performance => "performance",
            Self::Parties => "parties",
            Self::Communication => "communication",
            Self::Rounds => "rounds",
            Self::Role => "type",
            Self::Editable => "editable",
            Self::DataType => "dataType",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Maps a wire name to its key; unknown names become [`PropertyKey::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "curve" => Self::Curve,
            "proofSize" => Self::ProofSize,
            "proverTime" => Self::ProverTime,
            "verifierTime" => Self::VerifierTime,
            "trustedSetup" => Self::TrustedSetup,
            "security" => Self::Security,
            "operations" => Self::Operations,
            "keySize" => Self::KeySize,
            "performance" => Self::Performance,
            "parties" => Self::Parties,
            "communication" => Self::Communication,
            "rounds" => Self::Rounds,
            "type" => Self::Role,
            "editable" => Self::Editable,
            "dataType" => Self::DataType,
            other => Self::Custom(SmolStr::new(other)),
        }
    }

    /// Human label, e.g. `proofSize` becomes `proof size`.
    pub fn label(&self) -> String {
        let mut label = String::new();
        for ch in self.as_str().chars() {
            if ch.is_ascii_uppercase() {
                label.push(' ');
                label.push(ch.to_ascii_lowercase());
            } else {
                label.push(ch);
            }
        }
        label
    }
}

impl FromStr for PropertyKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PropertyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_name(&raw))
    }
}

/// Per-block property overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockProperties(BTreeMap<PropertyKey, SmolStr>);

impl BlockProperties {
    pub fn get(&self, key: &PropertyKey) -> Option<&str> {
        self.0.get(key).map(SmolStr::as_str)
    }

    pub fn set(&mut self, key: PropertyKey, value: impl Into<SmolStr>) -> Option<SmolStr> {
        self.0.insert(key, value.into())
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<SmolStr> {
        self.0.remove(key)
    }

    /// Overwrites every key present in `other`.
    pub fn merge_from(&mut self, other: &BlockProperties) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &str)> {
        self.0.iter().map(|(key, value)| (key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PropertyKey, SmolStr)> for BlockProperties {
    fn from_iter<I: IntoIterator<Item = (PropertyKey, SmolStr)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{search_palette, BlockProperties, PaletteEntry, PropertyKey};
    use crate::model::BlockKind;

    #[test]
    fn every_entry_round_trips_through_its_name() {
        for entry in PaletteEntry::ALL {
            assert_eq!(PaletteEntry::from_name(entry.name()), Some(entry));
        }
    }

    #[test]
    fn renamed_inputs_keep_their_entry() {
        assert_eq!(
            PaletteEntry::for_block(BlockKind::Input, "secret witness"),
            Some(PaletteEntry::Input)
        );
        assert_eq!(PaletteEntry::for_block(BlockKind::ZkPrimitive, "Groth16"), Some(PaletteEntry::Groth16));
        // Name and kind must agree for fixed-name blocks.
        assert_eq!(PaletteEntry::for_block(BlockKind::Mechanism, "Groth16"), None);
    }

    #[test]
    fn halo2_defaults_to_pasta() {
        assert_eq!(PaletteEntry::Halo2.default_property(&PropertyKey::Curve), Some("Pasta"));
        assert!(PaletteEntry::MerkleProof.default_properties().is_empty());
    }

    #[test]
    fn property_keys_serialize_as_original_names() {
        let mut props = BlockProperties::default();
        props.set(PropertyKey::Curve, "BN-254");
        props.set(PropertyKey::Role, "Parameter");
        props.set(PropertyKey::from_name("gasLimit"), "30M");

        let json = serde_json::to_value(&props).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "curve": "BN-254", "type": "Parameter", "gasLimit": "30M" })
        );

        let parsed: BlockProperties = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, props);
        assert_eq!(
            parsed.get(&PropertyKey::Custom("gasLimit".into())),
            Some("30M")
        );
    }

    #[test]
    fn property_labels_split_camel_case() {
        assert_eq!(PropertyKey::ProofSize.label(), "proof size");
        assert_eq!(PropertyKey::Curve.label(), "curve");
    }

    #[test]
    fn search_ranks_prefix_matches_first() {
        let results = search_palette("merk");
        assert_eq!(results.first(), Some(&PaletteEntry::MerkleProof));

        let results = search_palette("curve");
        assert!(results.contains(&PaletteEntry::Bn254));

        assert_eq!(search_palette("   ").len(), PaletteEntry::ALL.len());
        assert!(search_palette("zzzzqqq").is_empty());
    }

    #[test]
    fn search_matches_on_category_when_no_name_does() {
        let results = search_palette("elliptic");
        assert_eq!(
            results.get(..3),
            Some(&[PaletteEntry::Bls12_381, PaletteEntry::Bn254, PaletteEntry::Bls24_315][..])
        );

        let results = search_palette("verification");
        assert!(results.contains(&PaletteEntry::RangeProof));
        assert!(results.contains(&PaletteEntry::MerkleProof));
    }
}
