use clap::Parser;
use rootca::config::{Args, CaConfig};

/// Flags of a complete, valid invocation writing into `output_path`.
pub fn valid_args(output_path: &str) -> Vec<String> {
    vec![
        "--common-name=Test".to_string(),
        "--organization=Org".to_string(),
        "--organizational-unit=OU".to_string(),
        "--address=1 St".to_string(),
        "--locality=City".to_string(),
        "--province=State".to_string(),
        "--postal-code=00000".to_string(),
        "--country=US".to_string(),
        "--key-size=2048".to_string(),
        "--days-to-expire=365".to_string(),
        format!("--output-path={output_path}"),
    ]
}

#[allow(dead_code)]
pub fn test_config(output_path: &str) -> CaConfig {
    let argv = std::iter::once("rootca".to_string()).chain(valid_args(output_path));
    CaConfig::try_from(Args::parse_from(argv)).expect("valid test configuration")
}
