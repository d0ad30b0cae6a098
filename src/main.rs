use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use rootca::config::{Args, CaConfig};
use rootca::error::Result;
use rootca::{pki, writer};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{err:?}");
            println!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = CaConfig::try_from(args)?;
    let bundle = pki::generate_root_ca(&config)?;
    let written = writer::write_bundle(&config.output_path, &bundle, config.write_mode)?;
    info!(
        "wrote {} and {}",
        written.pem.display(),
        written.crt.display()
    );
    Ok(())
}
