//! Lists the configurations and runs found in an OMNeT++ results directory.
use std::path::PathBuf;

use clap::Parser;

use amacad_utils::omnet::enumerate_configs;

#[derive(Parser, Debug)]
#[command(author, version, about)] // get author/version information from Cargo.toml
struct Args {
    /// Results directory of the simulation campaign.
    directory: PathBuf,
    /// The runs are packed into tar archives.
    #[arg(short = 't', long)]
    use_tar: bool,
    /// Also print the attributes of every run.
    #[arg(short, long)]
    attributes: bool,
    /// Also print the recorded scalars and statistics of every run.
    #[arg(short, long)]
    records: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let args = Args::parse();
    let mut containers = enumerate_configs(&args.directory, args.use_tar)?;
    if containers.is_empty() {
        log::warn!("No configurations found in {:?}", args.directory);
    }

    for (config, container) in containers.iter_mut() {
        let runs = container.run_list();
        println!("{config}: {} runs", runs.len());
        for run in runs {
            match container.select_run(run) {
                Ok(results) => {
                    println!(
                        "  #{run:<4} {}: {} scalars, {} statistics",
                        results.run_id,
                        results.scalars.len(),
                        results.statistics.len()
                    );
                    if args.attributes {
                        for (key, value) in results.run_attributes() {
                            println!("        {key} = {value}");
                        }
                    }
                    if args.records {
                        for (module, name) in results.scalar_list() {
                            println!("        scalar {module} {name}");
                        }
                        for (module, name) in results.statistics_list() {
                            println!("        statistic {module} {name}");
                        }
                    }
                }
                Err(e) => log::warn!("{config} run #{run}: {e}"),
            }
        }
    }

    Ok(())
}
