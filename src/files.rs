//src/files.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::AnnotError;

/// Opens a text input, transparently decompressing it when the name ends in `.gz`.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, AnnotError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| AnnotError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Locked, buffered stdin for the tools that stream their main table.
pub fn stdin_reader() -> Box<dyn BufRead> {
    Box::new(BufReader::new(io::stdin().lock()))
}

/// Creates (truncating) an output file behind a `BufWriter`.
pub fn create_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>, AnnotError> {
    let path = path.as_ref();
    let f = File::create(path).map_err(|source| AnnotError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(f))
}

/// Writes `text` to stdout in one go.
pub fn write_stdout(text: &str) -> Result<(), AnnotError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// The tool's main input: a file when one is given, stdin otherwise.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, AnnotError> {
    match path {
        Some(p) => open_reader(p),
        None => Ok(stdin_reader()),
    }
}

/// Writes the tool's main output to a file when one is given, stdout otherwise.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<(), AnnotError> {
    match path {
        Some(p) => {
            let mut writer = create_writer(p)?;
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            Ok(())
        }
        None => write_stdout(text),
    }
}

/// Reads a list file (one entry per line), ignoring blank lines.
pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>, AnnotError> {
    let reader = open_reader(path)?;
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim_end_matches(['\r', '\n']);
        if !entry.is_empty() {
            entries.push(entry.to_string());
        }
    }
    Ok(entries)
}
