//! Terminal prompts.

use std::io::{self, BufRead, Write};

use stratus_login::Prompter;

/// Reads answers from the terminal.
///
/// Blocking reads run on tokio's blocking pool so the login flow can still be
/// cancelled while a prompt is waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Creates a terminal prompter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    async fn ask(&self, label: &str) -> io::Result<String> {
        let prompt = format!("{label}: ");
        run_blocking(move || {
            let mut stdout = io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
            read_answer(&mut io::stdin().lock())
        })
        .await
    }

    async fn ask_secret(&self, label: &str) -> io::Result<String> {
        let prompt = format!("{label}: ");
        run_blocking(move || rpassword::prompt_password(prompt)).await
    }

    fn say(&self, line: &str) {
        println!("{line}");
    }
}

async fn run_blocking<F>(read: F) -> io::Result<String>
where
    F: FnOnce() -> io::Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| io::Error::other(format!("prompt task failed: {e}")))?
}

/// Reads one line, failing on end of input.
fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no input available",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
