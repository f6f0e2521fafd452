//! In-memory fakes shared by the unit tests of this crate.

use std::pin::Pin;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures_util::Stream;
use kawaii_types::chat::{Conversation, ConversationId, ConversationSummary, NewTurn, Turn};
use kawaii_types::error::RepositoryError;
use kawaii_types::llm::{CompletionRequest, LlmError, StopReason, StreamEvent};

use crate::chat::repository::ConversationRepository;
use crate::llm::provider::LlmProvider;

#[derive(Default)]
struct RepoState {
    last_conversation_id: i64,
    last_turn_id: i64,
    conversations: Vec<Conversation>,
    turns: Vec<Turn>,
    fail_writes: bool,
    fail_deletes: bool,
}

/// Vec-backed repository with the same ordering rules as the SQLite one.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    state: Mutex<RepoState>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append_turns` fail with a query error.
    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    /// Toggle failure of `delete_created_before`.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    pub fn conversation_count(&self) -> usize {
        self.state.lock().unwrap().conversations.len()
    }

    pub fn turn_count(&self) -> usize {
        self.state.lock().unwrap().turns.len()
    }
}

impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        created_at: DateTime<Utc>,
    ) -> Result<Conversation, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.last_conversation_id += 1;
        let conversation = Conversation {
            id: ConversationId(state.last_conversation_id),
            created_at,
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<ConversationSummary> = state
            .conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id,
                created_at: c.created_at,
                turn_count: state
                    .turns
                    .iter()
                    .filter(|t| t.conversation_id == c.id)
                    .count() as u32,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }

    async fn list_turns(&self, id: ConversationId) -> Result<Vec<Turn>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .turns
            .iter()
            .filter(|t| t.conversation_id == id)
            .cloned()
            .collect())
    }

    async fn append_turns(
        &self,
        id: ConversationId,
        turns: &[NewTurn],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }
        if !state.conversations.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }

        let mut stored = Vec::with_capacity(turns.len());
        for turn in turns {
            state.last_turn_id += 1;
            let turn = Turn {
                id: state.last_turn_id,
                conversation_id: id,
                author: turn.author,
                content: turn.content.clone(),
                created_at,
            };
            state.turns.push(turn.clone());
            stored.push(turn);
        }
        Ok(stored)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(RepositoryError::Query("database is locked".to_string()));
        }
        let doomed: Vec<ConversationId> = state
            .conversations
            .iter()
            .filter(|c| c.created_at < cutoff)
            .map(|c| c.id)
            .collect();
        state.conversations.retain(|c| !doomed.contains(&c.id));
        state.turns.retain(|t| !doomed.contains(&t.conversation_id));
        Ok(doomed.len() as u64)
    }
}

/// What a [`ScriptedProvider`] streams back.
pub enum Script {
    /// Emit each fragment as a text delta, then finish normally.
    Fragments(Vec<&'static str>),
    /// Emit the fragments, then fail mid-stream.
    FailAfter(Vec<&'static str>),
    /// Fail before producing anything.
    Fail,
}

/// Provider that replays a fixed script and records every request.
pub struct ScriptedProvider {
    script: Script,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.requests.lock().unwrap().push(request);

        let text = |fragments: &[&'static str]| -> Vec<Result<StreamEvent, LlmError>> {
            fragments
                .iter()
                .map(|f| {
                    Ok(StreamEvent::TextDelta {
                        text: f.to_string(),
                    })
                })
                .collect()
        };

        let events = match &self.script {
            Script::Fragments(fragments) => {
                let mut events = text(fragments);
                events.push(Ok(StreamEvent::MessageDelta {
                    stop_reason: StopReason::EndTurn,
                }));
                events.push(Ok(StreamEvent::Done));
                events
            }
            Script::FailAfter(fragments) => {
                let mut events = text(fragments);
                events.push(Err(LlmError::Stream("connection reset".to_string())));
                events
            }
            Script::Fail => vec![Err(LlmError::AuthenticationFailed)],
        };

        Box::pin(futures_util::stream::iter(events))
    }
}
