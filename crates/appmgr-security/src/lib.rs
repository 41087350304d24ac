mod checksum;

pub use checksum::{sha256_hex, verify_package, verify_sha256};
