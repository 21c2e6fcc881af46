pub mod address;
pub mod constants;
pub mod conversions;
pub mod linear_scan;
pub mod logger;
pub mod options;
pub mod sanity;
pub mod statistics;
#[cfg(test)]
pub mod test_util;

pub use self::address::Address;
pub use self::address::ByteSize;
