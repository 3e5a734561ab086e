//! Natural-language questions about a loaded statement, answered by an LLM.

use anyhow::{Context, Result};
use tally_core::{Summary, Transaction};

use crate::llm::{ChatBackend, ChatTurn};
use crate::session::{Message, Role, Session};

pub const NO_TRANSACTIONS_RESPONSE: &str = "No transactions to analyze.";

const SYSTEM_PROMPT: &str = "\
You are a financial analyst assistant. You receive:
1. The complete list of bank transactions, as JSON.
2. A pre-computed summary of those transactions, as JSON.

Each transaction looks like:
{
  \"date\": \"YYYY-MM-DDTHH:MM:SS\",
  \"description\": \"Transaction description\",
  \"debit\": amount_out,
  \"credit\": amount_in,
  \"balance\": account_balance
}
Debits are money leaving the account, credits money entering it. Dates that
could not be read are passed through as they appeared in the statement.

The summary holds totals, the date range, a per-month breakdown, the most
common descriptions and the largest credits and debits. Rely on it for the
big picture instead of recomputing it.

Answer the user's question from this data. Be thorough but concise, stay on
what was asked, and use bullet points or tables where they help.
Format the answer in Markdown.";

const QUERY_SUGGESTIONS: &[&str] = &[
    "What is the total amount of credits and debits in these transactions?",
    "What are the most common types of transactions?",
    "What's the pattern of account balance over time?",
    "Are there any unusual or large transactions I should be aware of?",
    "What's the monthly breakdown of income and expenses?",
    "Which months had the highest expenses?",
    "What were the largest transactions this year?",
    "How much did I spend on bank fees?",
];

/// Example questions to offer a user who doesn't know where to start
pub fn query_suggestions() -> &'static [&'static str] {
    QUERY_SUGGESTIONS
}

/// System and user prompt for one question.
pub fn build_prompt(transactions: &[Transaction], summary: &Summary, query: &str) -> Result<(String, String)> {
    let summary_json = serde_json::to_string_pretty(summary).context("serialize summary")?;
    let transactions_json = serde_json::to_string_pretty(transactions).context("serialize transactions")?;

    let user = format!(
        "Here is my question:\n{query}\n\n\
Here is a summary of the transaction data:\n```json\n{summary_json}\n```\n\n\
And here is the complete transaction data:\n```json\n{transactions_json}\n```\n\n\
Please analyze this data to answer the question."
    );

    Ok((SYSTEM_PROMPT.to_string(), user))
}

pub struct QueryService<B> {
    backend: B,
}

impl<B: ChatBackend> QueryService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Ask a question about `session`, recording both sides in its history.
    ///
    /// The backend's text is returned as-is. A failed call leaves the question
    /// in the history without an answer.
    pub fn ask(&self, session: &mut Session, query: &str) -> Result<String> {
        session.messages.push(Message::now(Role::User, query));

        let answer = if session.transactions.is_empty() {
            NO_TRANSACTIONS_RESPONSE.to_string()
        } else {
            let (system, user) = build_prompt(&session.transactions, &session.summary, query)?;
            tracing::info!(session = %session.id, prompt_bytes = user.len(), "querying llm");
            self.backend
                .complete(&system, &[ChatTurn::user(user)])
                .with_context(|| format!("analyzing transactions for {}", session.id))?
        };

        session.messages.push(Message::now(Role::Assistant, answer.clone()));
        Ok(answer)
    }
}
