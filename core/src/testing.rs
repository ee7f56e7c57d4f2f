// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Hand-built [`ChainInfo`] fixtures for tests, approximating the extension
//! schemas found on live chains.

use crate::chain_info::{ChainInfo, Extension, ExtrinsicInfo, MetadataGeneration};
use codec::Compact;
use scale_info::{PortableRegistry, Registry, TypeInfo, meta_type};

// Stands in for `sp_runtime::generic::Era` in the registry. Era bytes never
// travel through the registry codec path, so only its non-zero size matters.
#[allow(dead_code)]
#[derive(TypeInfo)]
enum Era {
    Immortal,
    Mortal(u8),
}

#[allow(dead_code)]
#[derive(TypeInfo)]
enum Mode {
    Disabled,
    Enabled,
}

struct SchemaBuilder {
    registry: Registry,
    extensions: Vec<Extension>,
}

impl SchemaBuilder {
    fn new() -> Self {
        SchemaBuilder {
            registry: Registry::new(),
            extensions: Vec::new(),
        }
    }

    fn add<Ty: TypeInfo + 'static, Implicit: TypeInfo + 'static>(
        mut self,
        identifier: &str,
    ) -> Self {
        let type_id = self.registry.register_type(&meta_type::<Ty>()).id;
        let implicit_type_id = self.registry.register_type(&meta_type::<Implicit>()).id;
        self.extensions.push(Extension {
            identifier: identifier.to_owned(),
            type_id,
            implicit_type_id,
        });
        self
    }

    fn build(self) -> (PortableRegistry, Vec<Extension>) {
        (self.registry.into(), self.extensions)
    }
}

fn kusama_like_schema() -> (PortableRegistry, Vec<Extension>) {
    SchemaBuilder::new()
        .add::<(), ()>("CheckNonZeroSender")
        .add::<(), u32>("CheckSpecVersion")
        .add::<(), u32>("CheckTxVersion")
        .add::<(), [u8; 32]>("CheckGenesis")
        .add::<Era, [u8; 32]>("CheckMortality")
        .add::<Compact<u64>, ()>("CheckNonce")
        .add::<(), ()>("CheckWeight")
        .add::<Compact<u128>, ()>("ChargeTransactionPayment")
        .add::<Mode, Option<[u8; 32]>>("CheckMetadataHash")
        .build()
}

/// A V14 chain with the canonical extension schema.
pub(crate) fn kusama_like_chain_info() -> ChainInfo {
    let (types, extensions) = kusama_like_schema();
    ChainInfo::new(
        types,
        ExtrinsicInfo::new(MetadataGeneration::V14, vec![4], extensions, 0),
    )
}

/// A V16 chain advertising version 5 extrinsics, with the canonical schema.
pub(crate) fn v5_kusama_like_chain_info() -> ChainInfo {
    let (types, extensions) = kusama_like_schema();
    ChainInfo::new(
        types,
        ExtrinsicInfo::new(MetadataGeneration::V16, vec![4, 5], extensions, 0),
    )
}

/// A V14 chain with an empty extension schema.
pub(crate) fn minimal_chain_info() -> ChainInfo {
    ChainInfo::new(
        Registry::new().into(),
        ExtrinsicInfo::new(MetadataGeneration::V14, vec![4], Vec::new(), 0),
    )
}

/// A V16 chain advertising version 5 extrinsics, with an empty schema.
pub(crate) fn v5_minimal_chain_info() -> ChainInfo {
    ChainInfo::new(
        Registry::new().into(),
        ExtrinsicInfo::new(MetadataGeneration::V16, vec![4, 5], Vec::new(), 0),
    )
}
