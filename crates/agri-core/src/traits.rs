use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::{AgriResult, ChatMessage, NewsItem};

/// Text fragments of a streamed completion, in emission order.
///
/// Single pass: dropping the stream closes the upstream connection.
pub type CompletionStream = BoxStream<'static, AgriResult<String>>;

/// Runs the fixed news search against an external provider.
#[async_trait]
pub trait NewsSearchProvider: Send + Sync {
    async fn search_news(&self) -> AgriResult<Vec<NewsItem>>;
}

/// Hosted chat-completion model with streamed output.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn stream(&self, messages: Vec<ChatMessage>) -> AgriResult<CompletionStream>;
}
