//! Constants shared across stage services

/// Upper bound on rows a single ID matching container is expected to emit
pub const MAX_ROWS_PER_PID_CONTAINER: u64 = 10_000_000;

/// Target rows processed by one MPC connection
pub const TARGET_ROWS_PER_MPC_CONNECTION: u64 = 250_000;

/// Number of shards each ID matching output file is split into
pub const NUM_NEW_SHARDS_PER_FILE: u32 =
    ((MAX_ROWS_PER_PID_CONTAINER + TARGET_ROWS_PER_MPC_CONNECTION / 2)
        / TARGET_ROWS_PER_MPC_CONNECTION) as u32;

/// Package name of the sharder binary
pub const SHARDER_BINARY: &str = "data_processing/sharder";
