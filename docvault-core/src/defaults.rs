/// Pinata endpoint that pins a multipart file upload to IPFS.
pub const DEFAULT_PINNING_ENDPOINT: &str =
    "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Public Pinata gateway that serves pinned content by CID.
pub const DEFAULT_GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs/";

/// Receipts awaited before a ledger mutation is reported as final.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

pub(crate) fn pinning_endpoint() -> String {
    DEFAULT_PINNING_ENDPOINT.to_string()
}

pub(crate) fn gateway_base() -> String {
    DEFAULT_GATEWAY_BASE.to_string()
}

pub(crate) const fn confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}
