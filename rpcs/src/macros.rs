// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

macro_rules! cfg_feature {
    ($feature:literal, $($item:item)*) => {
        $(
            #[cfg(feature = $feature)]
            #[cfg_attr(docsrs, doc(cfg(feature = $feature)))]
            $item
        )*
    }
}

macro_rules! cfg_jsonrpsee {
    ($($item:item)*) => {
        crate::macros::cfg_feature!("jsonrpsee", $($item)*);
    };
}

pub(crate) use {cfg_feature, cfg_jsonrpsee};
