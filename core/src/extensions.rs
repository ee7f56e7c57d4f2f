// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Transaction extension values and the builder used to populate them.
//!
//! Two independent maps are maintained: `extensions` holds the values encoded
//! into the extrinsic itself (the "extra" bytes, in Substrate terms), and
//! `additional_signed` holds the values that only participate in the signing
//! payload. Both are encoded strictly in the order the schema declares.

use crate::chain_info::{ChainInfo, is_era_identifier};
use crate::error::ExtrinsicError;
use crate::utils::{Era, H256};
use codec::Decode;
use scale_value::Value;
use std::collections::BTreeMap;

/// A value for a single extension.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    /// A dynamic value, encoded through the type registry using the type id
    /// the schema declares for the extension.
    Value(Value<()>),
    /// Bytes already in wire format, written out verbatim. Era values are
    /// always carried this way.
    Raw(Vec<u8>),
}

/// Extension values keyed by extension identifier.
pub type ExtensionMap = BTreeMap<String, ExtensionValue>;

/// Encode the in-block extension values into `out`, in schema order.
///
/// Zero sized entries contribute nothing. Era entries must carry pre-encoded
/// bytes; those are written verbatim. Every other non-zero-sized entry must
/// have a value, and a [`ExtensionValue::Raw`] value is trusted to already be
/// in wire format.
pub fn encode_extra_to(
    chain_info: &ChainInfo,
    values: &ExtensionMap,
    out: &mut Vec<u8>,
) -> Result<(), ExtrinsicError> {
    for ext in chain_info.extrinsic().extensions() {
        if chain_info.types().is_zero_sized(ext.type_id) {
            continue;
        }
        let value = values
            .get(&ext.identifier)
            .ok_or_else(|| ExtrinsicError::MissingExtensionValue(ext.identifier.clone()))?;
        if is_era_identifier(&ext.identifier) {
            let ExtensionValue::Raw(bytes) = value else {
                return Err(ExtrinsicError::EraFormat(ext.identifier.clone()));
            };
            out.extend_from_slice(bytes);
            continue;
        }
        match value {
            ExtensionValue::Raw(bytes) => out.extend_from_slice(bytes),
            ExtensionValue::Value(v) => {
                chain_info
                    .types()
                    .encode_value(&ext.identifier, ext.type_id, v, out)?;
            }
        }
    }
    Ok(())
}

/// Encode the signing-payload-only ("additional signed") extension values
/// into `out`, in schema order. The same rules as [`encode_extra_to`] apply,
/// except that there is no era fast path: the era extension's additional
/// value is an ordinary checkpoint hash.
pub fn encode_additional_to(
    chain_info: &ChainInfo,
    values: &ExtensionMap,
    out: &mut Vec<u8>,
) -> Result<(), ExtrinsicError> {
    for ext in chain_info.extrinsic().extensions() {
        if chain_info.types().is_zero_sized(ext.implicit_type_id) {
            continue;
        }
        let value = values
            .get(&ext.identifier)
            .ok_or_else(|| ExtrinsicError::MissingExtensionValue(ext.identifier.clone()))?;
        match value {
            ExtensionValue::Raw(bytes) => out.extend_from_slice(bytes),
            ExtensionValue::Value(v) => {
                chain_info
                    .types()
                    .encode_value(&ext.identifier, ext.implicit_type_id, v, out)?;
            }
        }
    }
    Ok(())
}

/// Decode the in-block extension values from the front of `cursor`, in schema
/// order, consuming the bytes read. The inverse of [`encode_extra_to`]: era
/// bytes are captured raw, zero sized entries are skipped, and everything
/// else is decoded through the registry.
pub fn decode_extra(
    chain_info: &ChainInfo,
    cursor: &mut &[u8],
) -> Result<ExtensionMap, ExtrinsicError> {
    let mut values = ExtensionMap::new();
    for ext in chain_info.extrinsic().extensions() {
        if chain_info.types().is_zero_sized(ext.type_id) {
            continue;
        }
        if is_era_identifier(&ext.identifier) {
            let before: &[u8] = cursor;
            Era::decode(cursor).map_err(|e| ExtrinsicError::codec(&ext.identifier, ext.type_id, e))?;
            let used = before.len() - cursor.len();
            values.insert(
                ext.identifier.clone(),
                ExtensionValue::Raw(before[..used].to_vec()),
            );
            continue;
        }
        let value = chain_info
            .types()
            .decode_value(&ext.identifier, ext.type_id, cursor)?;
        values.insert(ext.identifier.clone(), ExtensionValue::Value(value));
    }
    Ok(values)
}

/// The facts needed to populate the canonical extension set.
#[derive(Debug, Clone)]
pub struct StandardParams {
    /// The runtime spec version.
    pub spec_version: u32,
    /// The runtime transaction version.
    pub transaction_version: u32,
    /// The chain's genesis hash.
    pub genesis_hash: H256,
    /// The hash of the era checkpoint block (ignored for immortal
    /// transactions).
    pub block_hash: H256,
    /// The number of the era checkpoint block.
    pub block_number: u64,
    /// The sender's account nonce.
    pub nonce: u64,
    /// Mortality window in blocks, or `None` for an immortal transaction.
    pub era_period: Option<u64>,
    /// The tip paid to the block author.
    pub tip: u128,
}

impl Default for StandardParams {
    fn default() -> Self {
        StandardParams {
            spec_version: 0,
            transaction_version: 0,
            genesis_hash: H256::zero(),
            block_hash: H256::zero(),
            block_number: 0,
            nonce: 0,
            era_period: None,
            tip: 0,
        }
    }
}

/// Populates one value per extension identifier, split across the in-block
/// and signing-payload-only maps.
///
/// [`ExtensionBuilder::set_standard`] fills the canonical set; the remaining
/// methods adjust individual extensions. [`ExtensionBuilder::validate`]
/// checks the result against the schema before encoding.
pub struct ExtensionBuilder<'info> {
    chain_info: &'info ChainInfo,
    extensions: ExtensionMap,
    additional_signed: ExtensionMap,
    // Remembered from set_standard so that later adjustments can re-derive
    // dependent values (the asset tx payment tip, era checkpoints).
    tip: u128,
    genesis_hash: Option<H256>,
    block_hash: Option<H256>,
}

impl<'info> ExtensionBuilder<'info> {
    /// Create an empty builder for the given chain.
    pub fn new(chain_info: &'info ChainInfo) -> Self {
        ExtensionBuilder {
            chain_info,
            extensions: ExtensionMap::new(),
            additional_signed: ExtensionMap::new(),
            tip: 0,
            genesis_hash: None,
            block_hash: None,
        }
    }

    /// Populate the canonical extension set: spec and transaction versions,
    /// genesis hash, mortality, nonce and tip, plus a disabled metadata hash.
    /// Zero sized extensions (`CheckWeight`, `CheckNonZeroSender`) need no
    /// value and get none.
    pub fn set_standard(mut self, params: StandardParams) -> Self {
        self.tip = params.tip;
        self.genesis_hash = Some(params.genesis_hash);
        self.block_hash = Some(params.block_hash);

        self.set_additional_value(
            "CheckSpecVersion",
            Value::u128(params.spec_version as u128),
        );
        self.set_additional_value(
            "CheckTxVersion",
            Value::u128(params.transaction_version as u128),
        );
        self.set_additional_value("CheckGenesis", Value::from_bytes(params.genesis_hash));
        self.set_value("CheckNonce", Value::u128(params.nonce as u128));
        self.set_value("ChargeTransactionPayment", Value::u128(params.tip));
        self.set_asset_tx_payment(None);

        self = match params.era_period {
            Some(period) => self.mortal(period, params.block_number),
            None => self.immortal(),
        };
        self.metadata_hash(None)
    }

    /// Make the transaction immortal. The signing payload checkpoints at the
    /// genesis hash, which must have been supplied via
    /// [`ExtensionBuilder::set_standard`] for the era's additional value to
    /// be populated.
    pub fn immortal(mut self) -> Self {
        let Some(identifier) = self.chain_info.era_identifier().map(str::to_owned) else {
            return self;
        };
        self.extensions.insert(
            identifier.clone(),
            ExtensionValue::Raw(Era::Immortal.to_bytes()),
        );
        if let Some(genesis) = self.genesis_hash {
            self.additional_signed
                .insert(identifier, ExtensionValue::Value(Value::from_bytes(genesis)));
        }
        self
    }

    /// Bound the transaction to a mortality window of `period` blocks
    /// starting around block `current`. The signing payload checkpoints at
    /// the block hash supplied via [`ExtensionBuilder::set_standard`].
    pub fn mortal(mut self, period: u64, current: u64) -> Self {
        let Some(identifier) = self.chain_info.era_identifier().map(str::to_owned) else {
            return self;
        };
        self.extensions.insert(
            identifier.clone(),
            ExtensionValue::Raw(Era::mortal(period, current).to_bytes()),
        );
        if let Some(checkpoint) = self.block_hash {
            self.additional_signed.insert(
                identifier,
                ExtensionValue::Value(Value::from_bytes(checkpoint)),
            );
        }
        self
    }

    /// Set the `CheckMetadataHash` mode: `Some` enables the check with the
    /// given digest, `None` disables it. A no-op on chains whose schema does
    /// not include the extension.
    pub fn metadata_hash(mut self, hash: Option<[u8; 32]>) -> Self {
        if !self.has_extension("CheckMetadataHash") {
            return self;
        }
        let (mode, additional) = match hash {
            Some(h) => (
                Value::unnamed_variant("Enabled", vec![]),
                Value::unnamed_variant("Some", vec![Value::from_bytes(h)]),
            ),
            None => (
                Value::unnamed_variant("Disabled", vec![]),
                Value::unnamed_variant("None", vec![]),
            ),
        };
        self.set_value("CheckMetadataHash", mode);
        self.set_additional_value("CheckMetadataHash", additional);
        self
    }

    /// Set the optional asset used to pay fees (`ChargeAssetTxPayment`).
    /// A no-op on chains whose schema does not include the extension.
    pub fn asset_id(mut self, asset: Option<Value<()>>) -> Self {
        self.set_asset_tx_payment(asset);
        self
    }

    /// Set the in-block value for an arbitrary extension.
    pub fn set_value(&mut self, identifier: &str, value: Value<()>) {
        self.extensions
            .insert(identifier.to_owned(), ExtensionValue::Value(value));
    }

    /// Set the signing-payload-only value for an arbitrary extension.
    pub fn set_additional_value(&mut self, identifier: &str, value: Value<()>) {
        self.additional_signed
            .insert(identifier.to_owned(), ExtensionValue::Value(value));
    }

    fn has_extension(&self, identifier: &str) -> bool {
        self.chain_info
            .extrinsic()
            .extensions()
            .iter()
            .any(|e| e.identifier == identifier)
    }

    fn set_asset_tx_payment(&mut self, asset: Option<Value<()>>) {
        if !self.has_extension("ChargeAssetTxPayment") {
            return;
        }
        let asset = match asset {
            Some(a) => Value::unnamed_variant("Some", vec![a]),
            None => Value::unnamed_variant("None", vec![]),
        };
        self.set_value(
            "ChargeAssetTxPayment",
            Value::named_composite(vec![
                ("tip".to_owned(), Value::u128(self.tip)),
                ("asset_id".to_owned(), asset),
            ]),
        );
    }

    /// Check that every non-zero-sized schema entry has a value in the
    /// respective map, failing with the first missing identifier otherwise.
    pub fn validate(&self) -> Result<(), ExtrinsicError> {
        for ext in self.chain_info.extrinsic().extensions() {
            let types = self.chain_info.types();
            if !types.is_zero_sized(ext.type_id) && !self.extensions.contains_key(&ext.identifier)
            {
                return Err(ExtrinsicError::MissingExtensionValue(ext.identifier.clone()));
            }
            if !types.is_zero_sized(ext.implicit_type_id)
                && !self.additional_signed.contains_key(&ext.identifier)
            {
                return Err(ExtrinsicError::MissingExtensionValue(ext.identifier.clone()));
            }
        }
        Ok(())
    }

    /// A diagnostic snapshot of which schema entries are populated.
    pub fn summary(&self) -> ExtensionsSummary {
        let entries = self
            .chain_info
            .extrinsic()
            .extensions()
            .iter()
            .map(|ext| {
                let status = |type_id: u32, map: &ExtensionMap| {
                    if self.chain_info.types().is_zero_sized(type_id) {
                        ValueStatus::ZeroSized
                    } else if map.contains_key(&ext.identifier) {
                        ValueStatus::Set
                    } else {
                        ValueStatus::Missing
                    }
                };
                ExtensionStatus {
                    identifier: ext.identifier.clone(),
                    in_block: status(ext.type_id, &self.extensions),
                    signed: status(ext.implicit_type_id, &self.additional_signed),
                }
            })
            .collect();
        ExtensionsSummary { entries }
    }

    /// Yield the two value maps, ready to be placed in a
    /// [`crate::extrinsics::SignedData`].
    pub fn into_maps(self) -> (ExtensionMap, ExtensionMap) {
        (self.extensions, self.additional_signed)
    }
}

/// Whether a single extension slot is populated. See
/// [`ExtensionBuilder::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStatus {
    /// A value is present.
    Set,
    /// A value is required but absent.
    Missing,
    /// The slot encodes to zero bytes; no value is needed.
    ZeroSized,
}

/// The population state of one schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionStatus {
    /// The extension identifier.
    pub identifier: String,
    /// State of the in-block value.
    pub in_block: ValueStatus,
    /// State of the signing-payload-only value.
    pub signed: ValueStatus,
}

/// A diagnostic snapshot of an [`ExtensionBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionsSummary {
    /// One entry per schema entry, in schema order.
    pub entries: Vec<ExtensionStatus>,
}

impl std::fmt::Display for ExtensionsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{}: in_block={:?} signed={:?}",
                entry.identifier, entry.in_block, entry.signed
            )?;
        }
        Ok(())
    }
}
