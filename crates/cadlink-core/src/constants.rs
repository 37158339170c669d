//! Global constants for cadlink-core

/// Number of coordinate columns in a point row (x, y, z)
pub const COORDINATE_COLUMNS: usize = 3;

/// Default CSV field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "cadlink.ron";

/// Configuration file format version
pub const CONFIG_VERSION: u32 = 1;
