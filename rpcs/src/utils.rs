// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! A couple of utility methods and types that we make use of.

use crate::Error;
use serde::{Deserialize, Serialize};
use url::Url;

/// Hex-serialized shim for `Vec<u8>`; the shape in which byte blobs travel
/// over the JSON-RPC wire (`0x`-prefixed hex strings).
#[derive(PartialEq, Eq, Clone, Serialize, Deserialize, Hash, PartialOrd, Ord, Debug)]
pub struct Bytes(#[serde(with = "impl_serde::serialize")] pub Vec<u8>);

impl std::ops::Deref for Bytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(s: Vec<u8>) -> Self {
        Bytes(s)
    }
}

/// A quick helper to encode some bytes to `0x`-prefixed hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

/// A URL is considered secure if it uses a secure scheme ("https" or "wss") or is referring to localhost.
///
/// Returns an error if the string could not be parsed into a URL.
pub fn url_is_secure(url: &str) -> Result<bool, Error> {
    let url = Url::parse(url).map_err(|e| Error::Client(Box::new(e)))?;

    let secure_scheme = url.scheme() == "https" || url.scheme() == "wss";
    let is_localhost = url.host().is_some_and(|e| match e {
        url::Host::Domain(e) => e == "localhost",
        url::Host::Ipv4(e) => e.is_loopback(),
        url::Host::Ipv6(e) => e.is_loopback(),
    });

    Ok(secure_scheme || is_localhost)
}

/// Validates, that the given Url is secure ("https" or "wss" scheme) or is referring to localhost.
pub fn validate_url_is_secure(url: &str) -> Result<(), Error> {
    if !url_is_secure(url)? {
        Err(Error::InsecureUrl(url.into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bytes_serialize_as_prefixed_hex() {
        let bytes = Bytes(vec![0x00, 0x01, 0xff]);
        let json = serde_json::to_string(&bytes).unwrap();
        assert_eq!(json, "\"0x0001ff\"");
        let back: Bytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn secure_and_local_urls_are_accepted() {
        assert!(url_is_secure("wss://rpc.polkadot.io").unwrap());
        assert!(url_is_secure("https://rpc.polkadot.io").unwrap());
        assert!(url_is_secure("ws://localhost:9944").unwrap());
        assert!(url_is_secure("ws://127.0.0.1:9944").unwrap());
        assert!(!url_is_secure("ws://rpc.polkadot.io").unwrap());
    }
}
