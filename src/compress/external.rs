//! Codecs backed by an external compressor binary.
//!
//! The tool is run once per call on a temporary copy of the input. Its output
//! is decoded again with the in-crate decoder for the same stream format
//! before it is returned, so a misbehaving tool surfaces as an error instead
//! of a stream that fails on the target machine.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::check_input_len;
use super::elias_lz::Variant;
use crate::codec::{Codec, CodecId};
use crate::decode;
use crate::error::{Error, Result};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// A program and its argument template.
///
/// `{input}` in an argument is replaced with the path of the file holding the
/// data to compress; without one, that path is appended as the last
/// argument. When some argument contains `{output}` the result is read from
/// that path, otherwise from the tool's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    /// Executable, looked up on `PATH` when relative.
    pub program: PathBuf,
    /// Argument template.
    pub args: Vec<String>,
}

impl ExternalTool {
    /// Tool without arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument to the template.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Parse a whitespace-separated command line, program first.
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.into(),
            args: words.map(str::to_owned).collect(),
        })
    }

    fn writes_output_file(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER))
    }

    fn command_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input_str)
                    .replace(OUTPUT_PLACEHOLDER, &output_str)
                    .into()
            })
            .collect();
        if !self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            args.push(input.as_os_str().to_owned());
        }
        args
    }

    /// Run the tool on `data` and collect what it produced.
    fn run(&self, data: &[u8]) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir().map_err(|e| io_error("creating temp dir", e))?;
        let input = dir.path().join("input.bin");
        let output = dir.path().join("output.bin");
        std::fs::write(&input, data).map_err(|e| io_error("writing tool input", e))?;

        let result = Command::new(&self.program)
            .args(self.command_args(&input, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                Error::External(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if !result.status.success() {
            return Err(Error::External(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        if self.writes_output_file() {
            std::fs::read(&output).map_err(|e| io_error("reading tool output", e))
        } else {
            Ok(result.stdout)
        }
    }
}

fn io_error(context: &str, err: std::io::Error) -> Error {
    Error::External(format!("{}: {}", context, err))
}

/// Stream format an external tool produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pletter,
    EliasFull,
}

impl Format {
    fn decode(self, stream: &[u8]) -> Result<Vec<u8>> {
        match self {
            Format::Pletter => decode::pletter::unpack(stream, false),
            Format::EliasFull => decode::elias_lz::unpack(stream, Variant::Full),
        }
    }
}

/// Codec delegating compression to an external program.
#[derive(Debug, Clone)]
pub struct ExternalCodec {
    tool: ExternalTool,
    format: Format,
}

impl ExternalCodec {
    /// A tool writing the primary (Pletter) stream format.
    pub fn pletter(tool: ExternalTool) -> Self {
        Self {
            tool,
            format: Format::Pletter,
        }
    }

    /// A tool writing the full-layout Elias-gamma stream format.
    pub fn elias_full(tool: ExternalTool) -> Self {
        Self {
            tool,
            format: Format::EliasFull,
        }
    }

    /// The wrapped tool.
    pub fn tool(&self) -> &ExternalTool {
        &self.tool
    }
}

impl Codec for ExternalCodec {
    fn id(&self) -> CodecId {
        match self.format {
            Format::Pletter => CodecId::ExternalPletter,
            Format::EliasFull => CodecId::ExternalEliasFull,
        }
    }

    fn name(&self) -> &'static str {
        match self.format {
            Format::Pletter => "external-pletter",
            Format::EliasFull => "external-elias-full",
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        check_input_len(data)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let stream = self.tool.run(data).inspect_err(|err| {
            warn!(tool = %self.tool.program.display(), error = %err, "external compressor failed");
        })?;

        match self.format.decode(&stream) {
            Ok(decoded) if decoded == data => {
                debug!(
                    tool = %self.tool.program.display(),
                    input = data.len(),
                    output = stream.len(),
                    "external compress"
                );
                Ok(stream)
            }
            Ok(_) => {
                warn!(tool = %self.tool.program.display(), "external output does not round-trip");
                Err(Error::External(format!(
                    "{} output does not decode to its input",
                    self.tool.program.display()
                )))
            }
            Err(err) => {
                warn!(tool = %self.tool.program.display(), error = %err, "external output rejected");
                Err(Error::External(format!(
                    "{} produced an invalid stream: {}",
                    self.tool.program.display(),
                    err
                )))
            }
        }
    }

    fn uncompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.format.decode(data)
    }
}
