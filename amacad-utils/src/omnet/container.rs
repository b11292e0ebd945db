//! Discovery of configurations and runs in a results directory.

use std::{
    collections::{BTreeMap, BTreeSet},
    ffi::OsStr,
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
    process::Command,
};

use flate2::bufread::GzDecoder;

use super::{parse_runs, OmnetError, RunResults};

/// Enumerate all configurations in `directory`, mapping each configuration name to a container
/// holding its runs. The configuration name is the file name up to the first `-`, considering
/// only tar archives if `archived` is set, and only scalar files otherwise.
pub fn enumerate_configs(
    directory: impl AsRef<Path>,
    archived: bool,
) -> Result<BTreeMap<String, DataContainer>, OmnetError> {
    let directory = directory.as_ref();
    let marker = marker(archived);

    let configs: BTreeSet<String> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.contains(marker))
        .filter_map(|name| name.split('-').next().map(str::to_string))
        .collect();

    configs
        .into_iter()
        .map(|config| DataContainer::new(config.clone(), directory, archived).map(|c| (config, c)))
        .collect()
}

fn marker(archived: bool) -> &'static str {
    if archived {
        "tar"
    } else {
        "sca"
    }
}

/// Extract the run number from a file name `<config>-<run>[-...][.ext]`.
fn run_number(config: &str, file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(config)?
        .strip_prefix('-')?
        .split(|c: char| c == '-' || c == '.')
        .next()?
        .parse()
        .ok()
}

/// All runs of a single configuration, with the currently selected run.
#[derive(Debug)]
pub struct DataContainer {
    config: String,
    archived: bool,
    runs: BTreeMap<u32, PathBuf>,
    selected: Option<RunResults>,
}

impl DataContainer {
    /// Scan `directory` for all runs of `config`.
    pub fn new(
        config: impl Into<String>,
        directory: impl AsRef<Path>,
        archived: bool,
    ) -> Result<Self, OmnetError> {
        let config = config.into();
        let pattern = format!(
            "{}/{}-*",
            glob::Pattern::escape(&directory.as_ref().to_string_lossy()),
            glob::Pattern::escape(&config)
        );

        let mut runs = BTreeMap::new();
        for path in glob::glob(&pattern)?.filter_map(Result::ok) {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            if !file_name.contains(marker(archived)) {
                continue;
            }
            match run_number(&config, &file_name) {
                Some(run) => {
                    runs.insert(run, path);
                }
                None => log::trace!("Ignoring {file_name}, it has no run number"),
            }
        }

        Ok(Self {
            config,
            archived,
            runs,
            selected: None,
        })
    }

    /// Sorted list of all run numbers of this configuration.
    pub fn run_list(&self) -> Vec<u32> {
        self.runs.keys().copied().collect()
    }

    /// Load the given run and make it the selected one.
    pub fn select_run(&mut self, run: u32) -> Result<&RunResults, OmnetError> {
        let path = self
            .runs
            .get(&run)
            .ok_or_else(|| OmnetError::RunNotFound {
                config: self.config.clone(),
                run,
            })?;

        log::trace!("Loading run #{run} of {} from {path:?}", self.config);
        let content = if self.archived {
            read_archive(path)?
        } else {
            read_scalar_file(path)?
        };

        let mut runs = parse_runs(&content)?;
        if runs.is_empty() {
            return Err(OmnetError::NoRuns(path.display().to_string()));
        }
        // a file with a single run may omit the `runnumber` attribute
        let idx = runs
            .iter()
            .position(|r| r.run_number() == Some(run))
            .or_else(|| (runs.len() == 1 && runs[0].run_number().is_none()).then_some(0))
            .ok_or_else(|| OmnetError::RunNotFound {
                config: self.config.clone(),
                run,
            })?;

        Ok(&*self.selected.insert(runs.swap_remove(idx)))
    }

    /// The run loaded by the last successful call to [`DataContainer::select_run`].
    pub fn selected(&self) -> Option<&RunResults> {
        self.selected.as_ref()
    }
}

fn read_scalar_file(path: &Path) -> Result<String, OmnetError> {
    let mut content = String::new();
    if path.extension() == Some(OsStr::new("gz")) {
        GzDecoder::new(BufReader::new(File::open(path)?)).read_to_string(&mut content)?;
    } else {
        File::open(path)?.read_to_string(&mut content)?;
    }
    Ok(content)
}

/// Extract the first scalar file of a tar archive using the system `tar`.
fn read_archive(path: &Path) -> Result<String, OmnetError> {
    let listing = tar(path, &["-tf"], None)?;
    let entry = listing
        .lines()
        .map(str::trim)
        .find(|entry| entry.ends_with(".sca"))
        .ok_or_else(|| OmnetError::NoScalarFile(path.display().to_string()))?;
    tar(path, &["-xOf"], Some(entry))
}

fn tar(path: &Path, flags: &[&str], entry: Option<&str>) -> Result<String, OmnetError> {
    let mut command = Command::new("tar");
    command.args(flags).arg(path);
    if let Some(entry) = entry {
        command.arg(entry);
    }
    let output = command.output()?;
    if !output.status.success() {
        return Err(OmnetError::Tar {
            path: path.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};
    use tempfile::tempdir;

    use super::*;

    fn sca(run: u32, overhead: f64) -> String {
        format!("version 2\nrun Grid-{run}-x\nattr runnumber {run}\nscalar Grid.node[0].net overhead {overhead}\n")
    }

    #[test]
    fn test_run_number() {
        assert_eq!(run_number("Grid", "Grid-12.sca"), Some(12));
        assert_eq!(run_number("Grid", "Grid-3-20120101.sca"), Some(3));
        assert_eq!(run_number("Grid", "Grid-3.tar.gz"), Some(3));
        assert_eq!(run_number("Grid", "GridX-3.sca"), None);
        assert_eq!(run_number("Grid", "Grid-x.sca"), None);
    }

    #[test]
    fn enumerate_loose_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Grid-0.sca"), sca(0, 1.0)).unwrap();
        fs::write(dir.path().join("Grid-1.sca"), sca(1, 2.0)).unwrap();
        fs::write(dir.path().join("Grid-1.vec"), "garbage").unwrap();
        fs::write(dir.path().join("notes.txt"), "garbage").unwrap();
        let mut gz = GzEncoder::new(
            File::create(dir.path().join("Highway-4.sca.gz")).unwrap(),
            Compression::default(),
        );
        gz.write_all(sca(4, 3.0).as_bytes()).unwrap();
        gz.finish().unwrap();

        let mut configs = enumerate_configs(dir.path(), false).unwrap();
        assert_eq!(
            configs.keys().collect::<Vec<_>>(),
            vec!["Grid", "Highway"]
        );

        let grid = configs.get_mut("Grid").unwrap();
        assert_eq!(grid.run_list(), vec![0, 1]);
        let run = grid.select_run(1).unwrap();
        assert_eq!(run.scalars[0].value, 2.0);
        assert_eq!(grid.selected().unwrap().run_number(), Some(1));
        assert!(matches!(
            grid.select_run(7),
            Err(OmnetError::RunNotFound { run: 7, .. })
        ));

        let highway = configs.get_mut("Highway").unwrap();
        assert_eq!(highway.run_list(), vec![4]);
        assert_eq!(highway.select_run(4).unwrap().scalars[0].value, 3.0);
    }

    #[test]
    fn corrupt_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Grid-0.sca"), "run a\nscalar m x nope\n").unwrap();
        fs::write(dir.path().join("Grid-1.sca"), "version 2\n").unwrap();
        let mut container = DataContainer::new("Grid", dir.path(), false).unwrap();
        assert!(matches!(
            container.select_run(0),
            Err(OmnetError::Parse { line: 2, .. })
        ));
        assert!(matches!(container.select_run(1), Err(OmnetError::NoRuns(_))));
        assert!(container.selected().is_none());
    }

    #[test]
    fn run_number_mismatch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Grid-5.sca"), sca(0, 1.0) + &sca(1, 2.0)).unwrap();
        fs::write(
            dir.path().join("Grid-6.sca"),
            "run Grid-6-x\nscalar Grid.node[0].net overhead 6\n",
        )
        .unwrap();
        let mut container = DataContainer::new("Grid", dir.path(), false).unwrap();
        assert!(matches!(
            container.select_run(5),
            Err(OmnetError::RunNotFound { run: 5, .. })
        ));
        assert!(container.selected().is_none());
        assert_eq!(container.select_run(6).unwrap().scalars[0].value, 6.0);
    }

    #[test]
    fn archived_runs() {
        let dir = tempdir().unwrap();
        let staging = tempdir().unwrap();
        fs::write(staging.path().join("Grid-2.sca"), sca(2, 5.0)).unwrap();
        fs::write(staging.path().join("Grid-2.vec"), "vector data").unwrap();
        let status = Command::new("tar")
            .arg("-cf")
            .arg(dir.path().join("Grid-2.tar"))
            .arg("-C")
            .arg(staging.path())
            .args(["Grid-2.vec", "Grid-2.sca"])
            .status()
            .unwrap();
        assert!(status.success());

        let mut configs = enumerate_configs(dir.path(), true).unwrap();
        let grid = configs.get_mut("Grid").unwrap();
        assert_eq!(grid.run_list(), vec![2]);
        assert_eq!(grid.select_run(2).unwrap().scalars[0].value, 5.0);

        // loose mode does not see the archive
        assert!(enumerate_configs(dir.path(), false).unwrap().is_empty());
    }
}
