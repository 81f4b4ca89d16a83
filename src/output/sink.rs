use super::Outputs;
use crate::error::{Result, SemverTagsError};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

const HEREDOC_DELIMITER: &str = "SEMVER_TAGS_EOF";

/// Destination for the aggregated export fields
pub trait OutputSink {
    fn emit(&mut self, outputs: &Outputs) -> Result<()>;
}

/// Publishes each field as a GitHub Actions step output
///
/// With an output file (normally `$GITHUB_OUTPUT`) fields are appended to it;
/// without one the `::set-output` workflow command is written instead.
pub struct GithubActionSink<W: Write> {
    output_file: Option<PathBuf>,
    writer: W,
}

impl GithubActionSink<io::Stdout> {
    /// Sink targeting `$GITHUB_OUTPUT` when set, stdout otherwise
    pub fn from_env() -> Self {
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        GithubActionSink::new(output_file, io::stdout())
    }
}

impl<W: Write> GithubActionSink<W> {
    pub fn new(output_file: Option<PathBuf>, writer: W) -> Self {
        GithubActionSink {
            output_file,
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for GithubActionSink<W> {
    fn emit(&mut self, outputs: &Outputs) -> Result<()> {
        match &self.output_file {
            Some(path) => {
                debug!(path = %path.display(), "appending step outputs");
                let block = output_file_block(outputs);
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .and_then(|mut file| file.write_all(block.as_bytes()))
                    .map_err(|e| {
                        SemverTagsError::output(format!(
                            "cannot write step outputs to {}: {}",
                            path.display(),
                            e
                        ))
                    })
            }
            None => write_workflow_commands(&mut self.writer, outputs),
        }
    }
}

/// Heredoc delimiter that no value contains
fn heredoc_delimiter(outputs: &Outputs) -> String {
    let fields = outputs.fields();
    let mut delimiter = HEREDOC_DELIMITER.to_string();
    let mut suffix = 0u32;
    while fields.iter().any(|(_, value)| value.contains(&delimiter)) {
        suffix += 1;
        delimiter = format!("{}_{}", HEREDOC_DELIMITER, suffix);
    }
    delimiter
}

/// All fields as `name<<DELIM` blocks, written in a single append
fn output_file_block(outputs: &Outputs) -> String {
    let delimiter = heredoc_delimiter(outputs);
    outputs
        .fields()
        .iter()
        .map(|(name, value)| format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter))
        .collect()
}

fn write_workflow_commands(out: &mut impl Write, outputs: &Outputs) -> Result<()> {
    for (name, value) in outputs.fields() {
        let escaped = value
            .replace('%', "%25")
            .replace('\r', "%0D")
            .replace('\n', "%0A");
        writeln!(out, "::set-output name={}::{}", name, escaped)?;
    }
    out.flush()?;
    Ok(())
}

/// Prints all fields as one JSON object on a single line
pub struct JsonSink<W: Write> {
    writer: W,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        JsonSink::new(io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        JsonSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for JsonSink<W> {
    fn emit(&mut self, outputs: &Outputs) -> Result<()> {
        serde_json::to_writer(&mut self.writer, outputs)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
