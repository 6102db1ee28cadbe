use bitcoin::{Address, Network, Script};

/// Maps a locking script to a human-readable address.
///
/// Resolution never fails a decode: scripts without a standard address form
/// (bare multisig, P2PK, OP_RETURN, garbage) resolve to `None`.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, script_pub_key: &[u8]) -> Option<String>;
}

/// Resolves standard output scripts (P2PKH, P2SH, P2WPKH, P2WSH, P2TR) for one network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkAddressResolver {
    network: Network,
}

impl NetworkAddressResolver {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl Default for NetworkAddressResolver {
    fn default() -> Self {
        Self::new(Network::Bitcoin)
    }
}

impl AddressResolver for NetworkAddressResolver {
    fn resolve(&self, script_pub_key: &[u8]) -> Option<String> {
        Address::from_script(Script::from_bytes(script_pub_key), self.network)
            .ok()
            .map(|address| address.to_string())
    }
}

/// Resolver that never produces an address.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAddressResolver;

impl AddressResolver for NoAddressResolver {
    fn resolve(&self, _script_pub_key: &[u8]) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_PUBKEY_HASH: &str = "62e907b15cbf27d5425399ebf6f0fb50ebb88f18";

    fn script(prefix: &str, suffix: &str) -> Vec<u8> {
        hex::decode(format!("{prefix}{GENESIS_PUBKEY_HASH}{suffix}")).unwrap()
    }

    #[test]
    fn resolves_p2pkh() {
        let resolver = NetworkAddressResolver::default();
        assert_eq!(
            resolver.resolve(&script("76a914", "88ac")).as_deref(),
            Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
        );
    }

    #[test]
    fn resolves_p2wpkh() {
        let resolver = NetworkAddressResolver::new(Network::Bitcoin);
        assert_eq!(
            resolver.resolve(&script("0014", "")).as_deref(),
            Some("bc1qvt5s0v2uhuna2sjnn84ldu8m2r4m3rcc4048ry")
        );
    }

    #[test]
    fn non_standard_scripts_have_no_address() {
        let resolver = NetworkAddressResolver::default();
        assert_eq!(resolver.resolve(&[]), None);
        assert_eq!(resolver.resolve(&[0x6a, 0x04, 0xde, 0xad, 0xbe, 0xef]), None);
        assert_eq!(NoAddressResolver.resolve(&script("76a914", "88ac")), None);
    }
}
