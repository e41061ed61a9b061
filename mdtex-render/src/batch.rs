//! Parallel conversion of many files
//!
//! Each document gets its own renderer (and so its own table numbering);
//! nothing is shared between jobs but the options.

use crate::convert::{convert_file, ConvertOptions};
use crate::error::ConvertError;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of converting one input of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    /// Path written, or why the input failed
    pub result: Result<PathBuf, ConvertError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Convert `inputs` on a pool of `jobs` threads.
///
/// Outcomes come back in input order. A failing input is reported in its
/// outcome and does not stop the others. With `output_dir`, every output is
/// written there as `<stem>.tex`; otherwise next to its input.
pub fn convert_batch(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    options: &ConvertOptions,
    jobs: usize,
) -> Vec<BatchOutcome> {
    let convert_one = |input: &PathBuf| {
        let output = output_dir.map(|dir| output_path_in(dir, input));
        let result = convert_file(input, output.as_deref(), options);
        if let Err(err) = &result {
            warn!(input = %input.display(), "{err}");
        }
        BatchOutcome {
            input: input.clone(),
            result,
        }
    };

    let jobs = jobs.max(1);
    debug!(inputs = inputs.len(), jobs, "starting batch conversion");
    match ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| inputs.par_iter().map(convert_one).collect()),
        Err(err) => {
            warn!("could not start a worker pool ({err}), converting sequentially");
            inputs.iter().map(convert_one).collect()
        }
    }
}

/// `<dir>/<stem>.tex`. Dots inside the stem are kept.
fn output_path_in(dir: &Path, input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".tex");
    dir.join(name)
}
