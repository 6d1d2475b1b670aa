//! The conversation driver: reads user lines, runs turns, prints answers.

use crate::startup::Session;
use jamespot_agent::{AgentLoop, AgentStreamEvent};
use jamespot_core::error::AgentError;
use jamespot_core::message::{Conversation, Message};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const RULE_WIDTH: usize = 60;

/// How the session talks to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    /// One turn for the given query, then exit
    Print(String),
    /// Interactive, with tool activity and text shown as it streams
    StreamInteractive,
}

/// What a line typed at the prompt means.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Debug(bool),
    Skip,
    Ask(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Command::Skip,
        "exit" | "quit" => Command::Exit,
        "debug on" => Command::Debug(true),
        "debug off" => Command::Debug(false),
        _ => Command::Ask(line),
    }
}

/// Owns the transcript and runs turns against the agent, one at a time.
pub struct Driver<O, E> {
    agent: AgentLoop,
    conversation: Conversation,
    debug: bool,
    out: O,
    err: E,
}

impl<O: Write + Send, E: Write + Send> Driver<O, E> {
    pub fn new(agent: AgentLoop, system_prompt: Option<&str>, debug: bool, out: O, err: E) -> Self {
        Self {
            agent,
            conversation: Conversation::with_system_prompt(system_prompt),
            debug,
            out,
            err,
        }
    }

    pub fn from_session(session: Session, out: O, err: E) -> Self {
        Self::new(session.agent, session.system_prompt.as_deref(), session.debug, out, err)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Hand back the output streams.
    pub fn into_output(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Run the session in `mode`, reading prompts from `input`.
    ///
    /// Returns the process exit status.
    pub async fn run<R>(&mut self, mode: Mode, input: R) -> io::Result<u8>
    where
        R: AsyncBufRead + Unpin,
    {
        match mode {
            Mode::Print(query) => self.run_print(&query).await,
            Mode::Interactive => self.run_interactive(input, false).await,
            Mode::StreamInteractive => self.run_interactive(input, true).await,
        }
    }

    /// Welcome text shown before the first interactive prompt.
    pub fn banner(&mut self, session_user: &str, tool_count: usize, llm_summary: &[String]) -> io::Result<()> {
        writeln!(self.out, "✓ Logged in as {session_user}")?;
        writeln!(self.out, "✓ Created {tool_count} tools")?;
        writeln!(self.out)?;
        writeln!(self.out, "LLM Configuration:")?;
        for line in llm_summary {
            writeln!(self.out, "  {line}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "✓ Agent ready!")?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "You can now chat with the Jamespot AI Agent")?;
        writeln!(self.out, "Type \"exit\" or \"quit\" to end the conversation")?;
        if self.debug {
            writeln!(self.out, "Type \"debug on\" or \"debug off\" to toggle debug output")?;
        }
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    async fn run_print(&mut self, query: &str) -> io::Result<u8> {
        let query = query.trim();
        if query.is_empty() {
            writeln!(self.err, "Error: --print requires a query")?;
            return Ok(1);
        }

        match self.turn(query, false).await? {
            Ok(answer) => {
                writeln!(self.out, "{answer}")?;
                Ok(0)
            }
            Err(e) => {
                writeln!(self.err, "Error: {e}")?;
                Ok(1)
            }
        }
    }

    async fn run_interactive<R>(&mut self, mut input: R, streaming: bool) -> io::Result<u8>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        loop {
            write!(self.out, "\nYou: ")?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line).await? == 0 {
                writeln!(self.out, "\nGoodbye!")?;
                return Ok(0);
            }

            match parse_command(&line) {
                Command::Exit => {
                    writeln!(self.out, "\nGoodbye!")?;
                    return Ok(0);
                }
                Command::Debug(enabled) => {
                    self.debug = enabled;
                    let state = if enabled { "enabled" } else { "disabled" };
                    writeln!(self.out, "\n✓ Debug mode {state}")?;
                }
                Command::Skip => {}
                Command::Ask(query) => {
                    if !streaming {
                        writeln!(self.out, "\nThinking...\n")?;
                    }
                    match self.turn(query, streaming).await? {
                        // Streamed answers are already on screen.
                        Ok(_) if streaming => {}
                        Ok(answer) if answer.trim().is_empty() => writeln!(self.out, "Agent: (No response)")?,
                        Ok(answer) => writeln!(self.out, "Agent: {answer}")?,
                        Err(e) => writeln!(self.err, "\nError: {e}")?,
                    }
                }
            }
        }
    }

    /// Append `query` and run one turn. The outer error is terminal I/O;
    /// the inner one is the turn's own failure.
    async fn turn(&mut self, query: &str, streaming: bool) -> io::Result<Result<String, AgentError>> {
        self.conversation.push(Message::user(query));
        if self.debug {
            writeln!(self.err, "Current conversation length: {}", self.conversation.len())?;
        }
        let before = self.conversation.len();

        let result = if streaming {
            let mut printer = StreamPrinter::new(&mut self.out);
            let result = self
                .agent
                .process_stream(&mut self.conversation, |event| printer.handle(event))
                .await;
            printer.finish()?;
            result
        } else {
            self.agent.process(&mut self.conversation).await
        };

        if self.debug {
            self.dump_messages(before)?;
        }
        Ok(result.map(|outcome| outcome.text))
    }

    /// Print the messages a turn appended.
    fn dump_messages(&mut self, from: usize) -> io::Result<()> {
        writeln!(self.err, "Messages this turn:")?;
        for (index, message) in self.conversation.messages.iter().enumerate().skip(from) {
            writeln!(self.err, "  {}. [{}] {}", index + 1, message.role, preview(&message.content))?;
            for call in &message.tool_calls {
                writeln!(self.err, "     -> {} {}", call.name, call.arguments)?;
            }
        }
        Ok(())
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 100;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    }
}

/// Renders streaming events as they arrive.
struct StreamPrinter<'a, W: Write> {
    out: &'a mut W,
    /// Inside an `Agent: ` line
    answering: bool,
    failure: Option<io::Error>,
}

impl<'a, W: Write> StreamPrinter<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self {
            out,
            answering: false,
            failure: None,
        }
    }

    fn handle(&mut self, event: AgentStreamEvent) {
        if self.failure.is_some() {
            return;
        }
        if let Err(e) = self.render(event) {
            self.failure = Some(e);
        }
    }

    fn render(&mut self, event: AgentStreamEvent) -> io::Result<()> {
        match event {
            AgentStreamEvent::Chunk { content } => {
                if !self.answering {
                    write!(self.out, "Agent: ")?;
                    self.answering = true;
                }
                write!(self.out, "{content}")?;
                self.out.flush()
            }
            AgentStreamEvent::ToolCall { name, input, .. } => {
                self.end_line()?;
                writeln!(self.out, "[tool] {name} {input}")
            }
            AgentStreamEvent::ToolResult { name, output, .. } => {
                writeln!(self.out, "[result] {name} ({} chars)", output.chars().count())
            }
            AgentStreamEvent::Done { .. } if !self.answering => writeln!(self.out, "Agent: (No response)"),
            AgentStreamEvent::Done { .. } => self.end_line(),
            AgentStreamEvent::Error { .. } => self.end_line(),
        }
    }

    fn end_line(&mut self) -> io::Result<()> {
        if self.answering {
            writeln!(self.out)?;
            self.answering = false;
        }
        Ok(())
    }

    /// Close the turn, reporting the first write failure if any.
    fn finish(self) -> io::Result<()> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_commands_are_case_insensitive() {
        assert_eq!(parse_command("  EXIT \n"), Command::Exit);
        assert_eq!(parse_command("Quit"), Command::Exit);
        assert_eq!(parse_command("debug ON"), Command::Debug(true));
        assert_eq!(parse_command("debug off"), Command::Debug(false));
        assert_eq!(parse_command("   \n"), Command::Skip);
        assert_eq!(parse_command(" list my groups \n"), Command::Ask("list my groups"));
    }

    #[test]
    fn previews_are_cut_at_a_hundred_chars() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(150);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 103);
    }

    #[test]
    fn stream_printer_separates_tools_and_text() {
        let mut out = Vec::new();
        let mut printer = StreamPrinter::new(&mut out);
        printer.handle(AgentStreamEvent::Chunk { content: "Let me check".into() });
        printer.handle(AgentStreamEvent::ToolCall {
            id: "c1".into(),
            name: "jamespot_list_groups".into(),
            input: serde_json::json!({"limit": 5}),
        });
        printer.handle(AgentStreamEvent::ToolResult {
            id: "c1".into(),
            name: "jamespot_list_groups".into(),
            output: "[1,2]".into(),
            success: true,
        });
        printer.handle(AgentStreamEvent::Chunk { content: "Two ".into() });
        printer.handle(AgentStreamEvent::Chunk { content: "groups.".into() });
        printer.handle(AgentStreamEvent::Done {
            roundtrips: 2,
            tool_calls_made: 1,
            usage: None,
        });
        printer.finish().unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Agent: Let me check\n[tool] jamespot_list_groups {\"limit\":5}\n[result] jamespot_list_groups (5 chars)\nAgent: Two groups.\n"
        );
    }

    #[test]
    fn silent_turn_says_no_response() {
        let mut out = Vec::new();
        let mut printer = StreamPrinter::new(&mut out);
        printer.handle(AgentStreamEvent::Done {
            roundtrips: 1,
            tool_calls_made: 0,
            usage: None,
        });
        printer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Agent: (No response)\n");
    }
}
