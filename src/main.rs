// AMACAD cluster analysis: Aggregation and exploration of clustering simulation results
// Copyright (C) 2024-2025 The AMACAD analysis authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use amacad::{
    analyse::Session,
    compile::{compile, CompileOptions},
    export::export,
    params::Process,
    plot::PlotlyRenderer,
    tree::ResultTree,
    util,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // get author/version information from Cargo.toml
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the runs of a results directory into a single data file.
    Compile {
        /// Results directory of the simulation campaign.
        #[arg(short, long)]
        directory: PathBuf,
        /// The runs are packed into tar archives.
        #[arg(short = 't', long)]
        use_tar: bool,
        /// Kind of simulations to compile.
        #[arg(short, long, value_enum, default_value_t = Process::Location)]
        process: Process,
        /// Data file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Interactively explore and plot a compiled data file.
    Analyse {
        /// Compiled data file.
        #[arg(short, long)]
        file: PathBuf,
        /// Directory for charts that are stored instead of shown.
        #[arg(short, long, default_value = "./plots/")]
        output_path: PathBuf,
    },
    /// Write a compiled data file as a CSV table.
    Export {
        /// Compiled data file.
        #[arg(short, long)]
        file: PathBuf,
        /// CSV file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let multi = util::init_logging()?;

    match args.command {
        Command::Compile {
            directory,
            use_tar,
            process,
            output,
        } => {
            let options = CompileOptions {
                directory,
                archived: use_tar,
                process,
                output,
            };
            compile(&options, &multi)
                .with_context(|| format!("Cannot compile {:?}", options.directory))?;
        }
        Command::Analyse { file, output_path } => {
            let tree = match ResultTree::load(&file) {
                Ok(tree) => tree,
                Err(e) => {
                    println!("Cannot load {}: {e}", file.display());
                    return Ok(());
                }
            };
            log::info!(
                "Loaded {} parameter combinations of {} simulations",
                tree.len(),
                tree.settings().process
            );
            let mut session = Session::new(
                &tree,
                io::stdin().lock(),
                io::stdout(),
                PlotlyRenderer,
                output_path,
            );
            session.run().context("Interactive session failed")?;
        }
        Command::Export { file, output } => {
            export(&file, &output).with_context(|| format!("Cannot export {file:?}"))?;
        }
    }

    println!("Good bye!");
    Ok(())
}
