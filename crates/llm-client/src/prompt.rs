use agri_core::{ChatMessage, NewsItem};

/// Instruction for the news summary: Indonesian only, qualitative outlook,
/// no knowledge beyond the supplied titles.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "Summarize the title of the news in Bahasa Indonesia, and give a qualitative
forecast about Indonesia's agriculture for the future. Only answer in Bahasa Indonesia. Do not use your own knowledge.";

/// Builds the two-message conversation for a news summary.
///
/// The user message is every available title joined by newlines; items
/// without a title are skipped. An empty list yields an empty user message.
pub fn analysis_messages(news: &[NewsItem]) -> Vec<ChatMessage> {
    let titles = news
        .iter()
        .filter_map(|item| item.title.as_deref())
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(titles),
    ]
}
