//! The core agent loop — the heart of studyclaw.
//!
//! One user input becomes one answer through a bounded cycle:
//!
//! 1. **Append** the user message to the conversation log
//! 2. **Compress** the log first if it has outgrown its size threshold
//!    (a separate summarization call, then summary + recent tail)
//! 3. **Send to the LLM** via the rate-limited gateway
//! 4. **If tool calls**: execute them in order, append the results, go to 3
//! 5. **If text**: append it, persist the log, return the answer
//!
//! A round limit guarantees termination even against a response stream
//! that requests tools forever.

pub mod loop_runner;

pub use loop_runner::AgentLoop;
