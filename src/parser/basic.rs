//! Default [`Parser`] reading `.feature` files from the filesystem.

use std::{
    fs,
    path::{Path, PathBuf},
    vec,
};

use crate::{error::Error, parser::Source, Parser};

/// Default [`Parser`].
///
/// Reads a single file, or every `*.feature` file (case-insensitively) under
/// a directory, in path order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl<I: AsRef<Path>> Parser<I> for Basic {
    type Output = vec::IntoIter<Result<Source, Error>>;

    fn parse(self, input: I) -> Self::Output {
        let path = input.as_ref();
        let paths = if path.is_file() {
            Ok(vec![path.to_path_buf()])
        } else {
            find_features(path)
        };

        match paths {
            Ok(paths) => paths.into_iter().map(read).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        }
        .into_iter()
    }
}

/// Lists the `*.feature` files under the given `dir`, sorted.
fn find_features(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let walker = globwalk::GlobWalkerBuilder::new(dir, "*.feature")
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: io_error(e),
        })?;

    let mut paths = walker
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect::<Vec<_>>();
    paths.sort();

    if paths.is_empty() && !dir.is_dir() {
        return Err(Error::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file or directory",
            ),
        });
    }
    Ok(paths)
}

fn io_error(e: globwalk::GlobError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

fn read(path: PathBuf) -> Result<Source, Error> {
    tracing::trace!(path = %path.display(), "reading feature file");
    match fs::read_to_string(&path) {
        Ok(text) => Ok(Source {
            name: path.display().to_string(),
            text,
        }),
        Err(source) => Err(Error::Io { path, source }),
    }
}
