//! Sharder command line

/// Parameters of one sharder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardArgs {
    /// File to split
    pub input_filename: String,

    /// Output shards are written to `{output_base_path}_{index}`
    pub output_base_path: String,

    /// Index of the first shard this invocation writes
    pub file_start_index: u32,

    /// Number of shards this invocation writes
    pub num_output_files: u32,

    pub tmp_directory: String,

    /// Base64 key for hashing identifiers while sharding
    pub hmac_key: Option<String>,
}

/// Builds the argument line passed to the sharder binary
pub fn build_args(args: &ShardArgs) -> String {
    let mut parts = vec![
        format!("--input_filename={}", args.input_filename),
        format!("--output_base_path={}", args.output_base_path),
        format!("--file_start_index={}", args.file_start_index),
        format!("--num_output_files={}", args.num_output_files),
        format!("--tmp_directory={}", args.tmp_directory),
    ];

    if let Some(key) = &args.hmac_key {
        parts.push(format!("--hmac_base64_key={}", key));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args() -> ShardArgs {
        ShardArgs {
            input_filename: "out.csv_combine_1".to_string(),
            output_base_path: "data_processing_stage/out.csv".to_string(),
            file_start_index: 40,
            num_output_files: 40,
            tmp_directory: "/test_tmp_directory/".to_string(),
            hmac_key: None,
        }
    }

    #[test]
    fn test_build_args() {
        assert_eq!(
            build_args(&sample_args()),
            "--input_filename=out.csv_combine_1 \
             --output_base_path=data_processing_stage/out.csv \
             --file_start_index=40 \
             --num_output_files=40 \
             --tmp_directory=/test_tmp_directory/"
        );
    }

    #[test]
    fn test_build_args_with_hmac_key() {
        let args = ShardArgs {
            hmac_key: Some("c2VjcmV0".to_string()),
            ..sample_args()
        };
        assert!(build_args(&args).ends_with(" --hmac_base64_key=c2VjcmV0"));
    }
}
