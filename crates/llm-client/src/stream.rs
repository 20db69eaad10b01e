//! Decoding of OpenAI-style server-sent completion events.
//!
//! Each `data:` event carries one chunk; `choices[0].delta.content` is the
//! fragment. Chunks without content (the opening role-only delta, usage
//! trailers) become empty fragments so the output keeps one fragment per
//! upstream chunk. `data: [DONE]` ends the stream.

use agri_core::{AgriError, AgriResult, CompletionStream};
use eventsource_stream::Eventsource;
use futures_util::{future, Stream, StreamExt};
use serde::Deserialize;

const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

fn parse_delta(data: &str) -> AgriResult<String> {
    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
        AgriError::UpstreamUnavailable(format!("malformed completion chunk: {}", e))
    })?;

    if let Some(error) = chunk.error {
        return Err(AgriError::UpstreamUnavailable(format!(
            "completion stream error: {}",
            error
        )));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default())
}

/// Turns a raw SSE byte stream into completion fragments.
///
/// The returned stream ends after `[DONE]`, or right after the first error.
/// Fragments yielded before an error stay yielded.
pub fn delta_stream<S, B, E>(bytes: S) -> CompletionStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    bytes
        .eventsource()
        .take_while(|event| {
            let done = matches!(event, Ok(event) if event.data.trim() == DONE_MARKER);
            future::ready(!done)
        })
        .map(|event| match event {
            Ok(event) => parse_delta(&event.data),
            Err(e) => Err(AgriError::UpstreamUnavailable(format!(
                "completion stream interrupted: {}",
                e
            ))),
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            if let Err(e) = &item {
                tracing::error!("Completion stream failed: {}", e);
                *failed = true;
            }
            future::ready(Some(item))
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion.chunk",
                "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
            })
        )
    }

    const ROLE_FRAME: &str =
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n";

    async fn collect(chunks: Vec<Result<String, String>>) -> Vec<AgriResult<String>> {
        delta_stream(stream::iter(chunks)).collect().await
    }

    #[tokio::test]
    async fn test_fragments_keep_emission_order() {
        let chunks = vec![
            Ok(frame("Ha")),
            Ok(frame("lo")),
            Ok(frame(" dunia")),
            Ok("data: [DONE]\n\n".to_string()),
        ];

        let fragments: Vec<String> = collect(chunks)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();

        assert_eq!(fragments, vec!["Ha", "lo", " dunia"]);
        assert_eq!(fragments.concat(), "Halo dunia");
    }

    #[tokio::test]
    async fn test_role_only_delta_passes_through_empty() {
        let chunks = vec![Ok(ROLE_FRAME.to_string()), Ok(frame("Panen"))];

        let fragments: Vec<String> = collect(chunks)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();

        assert_eq!(fragments, vec!["", "Panen"]);
    }

    #[tokio::test]
    async fn test_events_split_across_chunks() {
        let whole = format!("{}{}", frame("Halo"), frame(" dunia"));
        let (a, b) = whole.split_at(17);
        let chunks = vec![Ok(a.to_string()), Ok(b.to_string())];

        let text: String = collect(chunks)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();

        assert_eq!(text, "Halo dunia");
    }

    #[tokio::test]
    async fn test_done_stops_the_stream() {
        let chunks = vec![
            Ok(frame("a")),
            Ok("data: [DONE]\n\n".to_string()),
            Ok(frame("b")),
        ];

        let fragments = collect(chunks).await;
        assert_eq!(fragments.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_ends_after_yielded_fragments() {
        let chunks = vec![
            Ok(frame("Produksi")),
            Err("connection reset".to_string()),
            Ok(frame("ignored")),
        ];

        let fragments = collect(chunks).await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_ref().unwrap(), "Produksi");
        assert!(matches!(
            fragments[1],
            Err(AgriError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_chunk_is_upstream_error() {
        let chunks = vec![Ok("data: not json\n\n".to_string())];
        let fragments = collect(chunks).await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_err());
    }

    #[test]
    fn test_error_chunk() {
        let result = parse_delta(r#"{"error": {"message": "out of memory"}}"#);
        assert!(matches!(result, Err(AgriError::UpstreamUnavailable(_))));
    }
}
