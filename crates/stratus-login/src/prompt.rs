//! Operator interaction.
//!
//! The resolver never touches the terminal directly; it asks a [`Prompter`]
//! and races every answer against its cancellation token.

use std::future::Future;
use std::io;

/// Source of interactive answers.
pub trait Prompter: Send + Sync {
    /// Asks for a visible value.
    fn ask(&self, label: &str) -> impl Future<Output = io::Result<String>> + Send;

    /// Asks for a value that must not be echoed.
    fn ask_secret(&self, label: &str) -> impl Future<Output = io::Result<String>> + Send;

    /// Shows one line of information.
    fn say(&self, line: &str);
}

#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedPrompter;

#[cfg(any(test, feature = "test-util"))]
mod scripted {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::Prompter;

    /// Answers prompts from a fixed script and records the conversation.
    ///
    /// Once the script runs out, prompts fail with `UnexpectedEof`, or never
    /// complete if the prompter was built with [`ScriptedPrompter::hanging`].
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedPrompter {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        answers: VecDeque<String>,
        asked: Vec<String>,
        said: Vec<String>,
        hang_when_exhausted: bool,
    }

    impl ScriptedPrompter {
        /// A prompter that replies with `answers` in order.
        #[must_use]
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                inner: Arc::new(Mutex::new(Inner {
                    answers: answers.into_iter().map(Into::into).collect(),
                    ..Inner::default()
                })),
            }
        }

        /// A prompter whose prompts block forever once `answers` run out.
        #[must_use]
        pub fn hanging<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let prompter = Self::new(answers);
            prompter.inner.lock().hang_when_exhausted = true;
            prompter
        }

        /// Labels asked so far, in order.
        #[must_use]
        pub fn asked(&self) -> Vec<String> {
            self.inner.lock().asked.clone()
        }

        /// Lines shown so far, in order.
        #[must_use]
        pub fn said(&self) -> Vec<String> {
            self.inner.lock().said.clone()
        }

        /// Answers not consumed yet.
        #[must_use]
        pub fn remaining(&self) -> usize {
            self.inner.lock().answers.len()
        }

        async fn next(&self, label: &str) -> io::Result<String> {
            let (answer, hang) = {
                let mut inner = self.inner.lock();
                inner.asked.push(label.to_string());
                (inner.answers.pop_front(), inner.hang_when_exhausted)
            };
            match answer {
                Some(answer) => Ok(answer),
                None if hang => std::future::pending().await,
                None => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("no scripted answer for '{label}'"),
                )),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        async fn ask(&self, label: &str) -> io::Result<String> {
            self.next(label).await
        }

        async fn ask_secret(&self, label: &str) -> io::Result<String> {
            self.next(label).await
        }

        fn say(&self, line: &str) {
            self.inner.lock().said.push(line.to_string());
        }
    }
}
