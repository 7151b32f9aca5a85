use anyhow::{Context, Result};
use colored::*;
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dialogue::{DialogueController, FAREWELL};

const PROMPT: &str = "You: ";

/// Line-based terminal front end for the dialogue controller.
pub struct UIHandler {
    colorful: bool,
}

impl UIHandler {
    pub fn new(colorful: bool) -> Self {
        Self { colorful }
    }

    fn agent_line(&self, text: &str) -> String {
        if self.colorful {
            format!("{} {}\n", "Agent:".green().bold(), text)
        } else {
            format!("Agent: {}\n", text)
        }
    }

    fn prompt(&self) -> String {
        if self.colorful {
            format!("\n{}", PROMPT.cyan().bold())
        } else {
            format!("\n{}", PROMPT)
        }
    }

    /// Read utterances until the user says goodbye or input ends.
    pub async fn run<R, W>(
        &self,
        controller: &mut DialogueController,
        banner: &str,
        mut input: R,
        output: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting conversation loop");
        self.write(output, &self.agent_line(banner)).await?;

        let mut buf = Vec::new();
        loop {
            self.write(output, &self.prompt()).await?;
            let Some(line) = read_utterance(&mut input, &mut buf).await? else {
                info!("Input closed");
                self.write(output, &format!("\n{}", self.agent_line(FAREWELL))).await?;
                break;
            };

            let reply = controller.respond(&line).await;
            self.write(output, &self.agent_line(reply.text())).await?;
            if reply.is_farewell() {
                break;
            }
        }
        Ok(())
    }

    async fn write<W: AsyncWrite + Unpin>(&self, output: &mut W, text: &str) -> Result<()> {
        output
            .write_all(text.as_bytes())
            .await
            .context("Failed to write output")?;
        output.flush().await.context("Failed to flush output")
    }
}

/// Next input line without its line ending, or `None` at end of input.
/// Bytes that are not UTF-8 are replaced rather than failing the read.
async fn read_utterance<R: AsyncBufRead + Unpin>(
    input: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Option<String>> {
    buf.clear();
    let read = input
        .read_until(b'\n', buf)
        .await
        .context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    let line = String::from_utf8_lossy(buf);
    if let std::borrow::Cow::Owned(_) = line {
        warn!("Input line was not valid UTF-8; invalid bytes replaced");
    }
    Ok(Some(line.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleClassifier;
    use crate::tools::MockTools;

    async fn transcript(script: &str) -> String {
        transcript_bytes(script.as_bytes()).await
    }

    async fn transcript_bytes(script: &[u8]) -> String {
        let ui = UIHandler::new(false);
        let mut controller = DialogueController::new(Box::new(RuleClassifier), Box::new(MockTools));
        let mut output: Vec<u8> = Vec::new();
        ui.run(&mut controller, "Hi there!", script, &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_conversation_transcript() {
        let out = transcript("What's the weather?\nTokyo\nbye\nhello\n").await;
        assert!(out.starts_with("Agent: Hi there!\n"));
        assert!(out.contains(
            "You: Agent: May I know which city you would like the weather update for?\n"
        ));
        assert!(out.contains("Agent: The weather in Tokyo is 72°F and sunny.\n"));
        assert!(out.ends_with("You: Agent: Goodbye! Have a nice day.\n"));
        assert!(!out.contains("What can I do for you today"));
    }

    #[tokio::test]
    async fn test_end_of_input_says_goodbye() {
        let out = transcript("hello\n").await;
        assert!(out.contains("Agent: Hello! What can I do for you today?\n"));
        assert!(out.ends_with("Agent: Goodbye! Have a nice day.\n"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_conversation() {
        let out = transcript_bytes(b"hello\n\xff\xfe caf\xe9\nweather in Paris\r\nbye\n").await;
        assert!(out.contains("Agent: Hello! What can I do for you today?\n"));
        assert!(out.contains("Agent: The weather in Paris is 72°F and sunny.\n"));
        assert!(out.ends_with("You: Agent: Goodbye! Have a nice day.\n"));
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let out = transcript("What's the weather?\nOslo").await;
        assert!(out.contains("Agent: The weather in Oslo is 72°F and sunny.\n"));
        assert!(out.ends_with("Agent: Goodbye! Have a nice day.\n"));
    }
}
