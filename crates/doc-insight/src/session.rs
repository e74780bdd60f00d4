//! Interactive prompt loop over the pipeline

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::types::{InferenceMode, InsightResult, PipelineRequest, SourceKind};

const PATH_PROMPT: &str = "Enter the file path or document id (or 'exit' to quit): ";
const KIND_PROMPT: &str = "Enter the file type (leave blank to detect from the extension): ";
const MODE_PROMPT: &str = "Select inference mode (basic/advanced) [basic]: ";
const AGAIN_PROMPT: &str = "Would you like to process another file? (yes/no): ";

/// Reads requests from `input`, writes results and errors to `output`
pub struct InteractiveSession<R, W> {
    pipeline: Arc<Pipeline>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveSession<R, W> {
    pub fn new(pipeline: Arc<Pipeline>, input: R, output: W) -> Self {
        Self {
            pipeline,
            input,
            output,
        }
    }

    /// Run until the user says `exit`, declines another file, or input ends.
    ///
    /// Pipeline failures are printed and never end the loop by themselves.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(location) = self.ask(PATH_PROMPT)? else {
                break;
            };
            if location.eq_ignore_ascii_case("exit") {
                break;
            }
            if location.is_empty() {
                writeln!(self.output, "Error: no file path given")?;
                continue;
            }

            let tag = self.ask(KIND_PROMPT)?.unwrap_or_default();
            let mode = self.ask(MODE_PROMPT)?.unwrap_or_default();

            match self.process(&location, &tag, &mode).await {
                Ok(insight) => writeln!(self.output, "{}", insight.render())?,
                Err(e) => writeln!(self.output, "Error: {}", e)?,
            }

            let again = self.ask(AGAIN_PROMPT)?.unwrap_or_default();
            if !again.eq_ignore_ascii_case("yes") {
                break;
            }
        }

        writeln!(self.output, "Goodbye.")?;
        self.output.flush()?;
        Ok(())
    }

    async fn process(&self, location: &str, tag: &str, mode: &str) -> Result<InsightResult> {
        let kind = SourceKind::resolve(location, Some(tag))?;
        let mode: InferenceMode = mode.parse()?;
        let request = PipelineRequest::new(location).with_kind(kind).with_mode(mode);
        self.pipeline.run(&request).await
    }

    /// Prompt and read one trimmed line; `None` at end of input
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
