// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Resolved chain information. [`ChainInfo`] is the product of parsing runtime
//! metadata elsewhere; this crate only consumes it. It carries the type
//! registry used to encode and decode dynamic values, and the extrinsic
//! descriptor: which extrinsic format versions the chain accepts and the
//! ordered transaction extension schema.

use crate::error::ExtrinsicError;
use scale_info::{PortableRegistry, TypeDef};
use scale_value::Value;

/// Which metadata shape the extrinsic descriptor was unified from.
///
/// V14 and V15 metadata declare "signed extensions"; V16 metadata declares
/// "transaction extensions" and may advertise version 5 extrinsics. The
/// distinction only matters for version detection; the schema itself is
/// normalized into [`Extension`] records either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataGeneration {
    /// Unified from V14 metadata.
    V14,
    /// Unified from V15 metadata.
    V15,
    /// Unified from V16 metadata.
    V16,
}

/// One entry of the transaction extension schema, in metadata order.
///
/// An extension can contribute bytes to the extrinsic itself, to the signing
/// payload, or to both; which of these apply is determined by whether the
/// respective type is zero sized, not by stored flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// The extension identifier, eg `CheckNonce`.
    pub identifier: String,
    /// Type id of the value encoded into the extrinsic.
    pub type_id: u32,
    /// Type id of the value folded into the signing payload only
    /// (the "additional signed" or "implicit" data).
    pub implicit_type_id: u32,
}

/// The extrinsic descriptor: supported format versions and the ordered
/// extension schema.
#[derive(Debug, Clone)]
pub struct ExtrinsicInfo {
    generation: MetadataGeneration,
    versions: Vec<u8>,
    extensions: Vec<Extension>,
    extension_version: u8,
}

impl ExtrinsicInfo {
    /// Construct an extrinsic descriptor. `extensions` must be given in the
    /// order that the metadata declares them; that order is the encoding
    /// contract.
    pub fn new(
        generation: MetadataGeneration,
        versions: Vec<u8>,
        extensions: Vec<Extension>,
        extension_version: u8,
    ) -> Self {
        ExtrinsicInfo {
            generation,
            versions,
            extensions,
            extension_version,
        }
    }

    /// The metadata generation this descriptor came from.
    pub fn generation(&self) -> MetadataGeneration {
        self.generation
    }

    /// The extrinsic format versions the chain advertises.
    pub fn versions(&self) -> &[u8] {
        &self.versions
    }

    /// The extension schema, in metadata order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// The transaction extension version byte (V16 metadata; 0 elsewhere).
    pub fn extension_version(&self) -> u8 {
        self.extension_version
    }
}

/// Everything we need to know about a chain in order to build transactions
/// for it: a type registry plus the extrinsic descriptor.
#[derive(Debug, Clone)]
pub struct ChainInfo {
    types: TypeRegistry,
    extrinsic: ExtrinsicInfo,
}

impl ChainInfo {
    /// Construct a [`ChainInfo`] from a resolved type registry and extrinsic
    /// descriptor.
    pub fn new(types: PortableRegistry, extrinsic: ExtrinsicInfo) -> Self {
        ChainInfo {
            types: TypeRegistry::new(types),
            extrinsic,
        }
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The extrinsic descriptor.
    pub fn extrinsic(&self) -> &ExtrinsicInfo {
        &self.extrinsic
    }

    /// The extrinsic format version that transactions for this chain should
    /// be built at. V16 metadata advertising version 5 yields 5; everything
    /// else yields 4.
    pub fn detected_version(&self) -> u8 {
        if self.extrinsic.generation == MetadataGeneration::V16
            && self.extrinsic.versions.contains(&5)
        {
            5
        } else {
            4
        }
    }

    /// The identifier under which this chain declares its era extension,
    /// if it declares one. Newer chains call it `CheckMortality`, older
    /// ones `CheckEra`.
    pub fn era_identifier(&self) -> Option<&str> {
        self.extrinsic
            .extensions
            .iter()
            .map(|e| e.identifier.as_str())
            .find(|id| is_era_identifier(id))
    }
}

/// Whether an extension identifier denotes the era extension, whose value
/// bypasses the registry codec path.
pub(crate) fn is_era_identifier(identifier: &str) -> bool {
    identifier == "CheckMortality" || identifier == "CheckEra"
}

/// A registry resolving type ids to dynamic value codecs.
///
/// This wraps a [`scale_info::PortableRegistry`] and knows how to encode and
/// decode [`scale_value::Value`]s against it, and how to recognize zero sized
/// types (which contribute no bytes to any payload).
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: PortableRegistry,
}

impl TypeRegistry {
    /// Wrap a resolved portable registry.
    pub fn new(types: PortableRegistry) -> Self {
        TypeRegistry { types }
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> &PortableRegistry {
        &self.types
    }

    /// Encode a dynamic value as the type with the given id, appending the
    /// bytes to `out`. The `identifier` is only used to contextualize errors.
    pub fn encode_value(
        &self,
        identifier: &str,
        type_id: u32,
        value: &Value<()>,
        out: &mut Vec<u8>,
    ) -> Result<(), ExtrinsicError> {
        scale_value::scale::encode_as_type(value, type_id, &self.types, out)
            .map_err(|e| ExtrinsicError::codec(identifier, type_id, e))
    }

    /// Decode a dynamic value of the type with the given id from the front of
    /// `cursor`, consuming the bytes read. The `identifier` is only used to
    /// contextualize errors.
    pub fn decode_value(
        &self,
        identifier: &str,
        type_id: u32,
        cursor: &mut &[u8],
    ) -> Result<Value<()>, ExtrinsicError> {
        scale_value::scale::decode_as_type(cursor, type_id, &self.types)
            .map(|v| v.remove_context())
            .map_err(|e| ExtrinsicError::codec(identifier, type_id, e))
    }

    /// Whether values of this type encode to zero bytes. Unit composites and
    /// tuples (recursively) qualify; anything unresolvable does not.
    pub fn is_zero_sized(&self, type_id: u32) -> bool {
        self.is_zero_sized_at_depth(type_id, 0)
    }

    fn is_zero_sized_at_depth(&self, type_id: u32, depth: usize) -> bool {
        // Guards against malicious or broken registries with type cycles.
        const MAX_DEPTH: usize = 16;
        if depth >= MAX_DEPTH {
            return false;
        }

        let Some(ty) = self.types.resolve(type_id) else {
            return false;
        };

        match &ty.type_def {
            TypeDef::Composite(c) => c
                .fields
                .iter()
                .all(|f| self.is_zero_sized_at_depth(f.ty.id, depth + 1)),
            TypeDef::Tuple(t) => t
                .fields
                .iter()
                .all(|f| self.is_zero_sized_at_depth(f.id, depth + 1)),
            TypeDef::Array(a) => {
                a.len == 0 || self.is_zero_sized_at_depth(a.type_param.id, depth + 1)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use scale_info::{Registry, TypeInfo, meta_type};

    fn registry_with<T: TypeInfo + 'static>() -> (PortableRegistry, u32) {
        let mut registry = Registry::new();
        let id = registry.register_type(&meta_type::<T>()).id;
        (registry.into(), id)
    }

    fn info_at(generation: MetadataGeneration, versions: Vec<u8>) -> ChainInfo {
        let (types, _) = registry_with::<u32>();
        ChainInfo::new(
            types,
            ExtrinsicInfo::new(generation, versions, Vec::new(), 0),
        )
    }

    #[test]
    fn v14_and_v15_metadata_always_yield_version_4() {
        assert_eq!(info_at(MetadataGeneration::V14, vec![4]).detected_version(), 4);
        assert_eq!(info_at(MetadataGeneration::V15, vec![4]).detected_version(), 4);
        // Even a (hypothetical) V15 chain advertising 5 stays on 4:
        assert_eq!(info_at(MetadataGeneration::V15, vec![4, 5]).detected_version(), 4);
    }

    #[test]
    fn v16_metadata_yields_5_only_if_advertised() {
        assert_eq!(info_at(MetadataGeneration::V16, vec![4, 5]).detected_version(), 5);
        assert_eq!(info_at(MetadataGeneration::V16, vec![5]).detected_version(), 5);
        assert_eq!(info_at(MetadataGeneration::V16, vec![4]).detected_version(), 4);
    }

    #[test]
    fn unit_types_are_zero_sized() {
        let (types, unit_id) = registry_with::<()>();
        assert!(TypeRegistry::new(types).is_zero_sized(unit_id));

        #[derive(TypeInfo)]
        struct Empty;
        let (types, id) = registry_with::<Empty>();
        assert!(TypeRegistry::new(types).is_zero_sized(id));

        // A struct wrapping only zero sized things is itself zero sized.
        #[derive(TypeInfo)]
        struct Nested {
            _a: (),
            _b: Empty,
        }
        let (types, id) = registry_with::<Nested>();
        assert!(TypeRegistry::new(types).is_zero_sized(id));
    }

    #[test]
    fn payload_bearing_types_are_not_zero_sized() {
        let (types, id) = registry_with::<u32>();
        assert!(!TypeRegistry::new(types).is_zero_sized(id));

        let (types, id) = registry_with::<[u8; 32]>();
        assert!(!TypeRegistry::new(types).is_zero_sized(id));

        // Variants always cost at least their index byte.
        let (types, id) = registry_with::<Option<()>>();
        assert!(!TypeRegistry::new(types).is_zero_sized(id));
    }

    #[test]
    fn unresolvable_type_ids_are_not_zero_sized() {
        let (types, id) = registry_with::<u32>();
        assert!(!TypeRegistry::new(types).is_zero_sized(id + 100));
    }

    #[test]
    fn era_identifier_is_found_under_either_name() {
        let (types, id) = registry_with::<u32>();
        let ext = |identifier: &str| Extension {
            identifier: identifier.into(),
            type_id: id,
            implicit_type_id: id,
        };
        let info = ChainInfo::new(
            types.clone(),
            ExtrinsicInfo::new(
                MetadataGeneration::V14,
                vec![4],
                vec![ext("CheckNonce"), ext("CheckEra")],
                0,
            ),
        );
        assert_eq!(info.era_identifier(), Some("CheckEra"));

        let info = ChainInfo::new(
            types,
            ExtrinsicInfo::new(MetadataGeneration::V14, vec![4], vec![ext("CheckNonce")], 0),
        );
        assert_eq!(info.era_identifier(), None);
    }
}
