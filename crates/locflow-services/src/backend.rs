use async_trait::async_trait;
use indexmap::IndexMap;
use locflow_core::Result;
use tokio::sync::mpsc;

/// Everything a backend may want to see for one task: the full source and
/// target content for context, and the processable subset it must return
/// translations for.
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub source_locale: String,
    pub target_locale: String,
    pub source_data: IndexMap<String, String>,
    pub target_data: IndexMap<String, String>,
    pub processable_data: IndexMap<String, String>,
}

/// A partial result emitted while a backend call is still in flight.
#[derive(Debug, Clone)]
pub struct ProgressChunk {
    pub percent: u8,
    pub processed: IndexMap<String, String>,
}

/// The translation backend seam. Implementations translate the
/// processable subset and may stream partial chunks through `progress`
/// before resolving; the engine never requires them to.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn translate(
        &self,
        request: TranslateRequest,
        progress: Option<mpsc::Sender<ProgressChunk>>,
    ) -> Result<IndexMap<String, String>>;
}

/// Offline pseudo-localization: wraps every value in `⟦…⟧` and replaces
/// vowels with accented forms, leaving `{placeholders}` untouched. Useful
/// for exercising the whole pipeline without a translation provider, and
/// for catching hard-coded strings in the consuming application.
#[derive(Debug, Clone)]
pub struct PseudoBackend {
    /// Keys per streamed progress chunk.
    pub chunk_size: usize,
}

impl Default for PseudoBackend {
    fn default() -> Self {
        PseudoBackend { chunk_size: 10 }
    }
}

fn accent(c: char) -> char {
    match c {
        'a' => 'á',
        'e' => 'é',
        'i' => 'í',
        'o' => 'ó',
        'u' => 'ú',
        'A' => 'Á',
        'E' => 'É',
        'I' => 'Í',
        'O' => 'Ó',
        'U' => 'Ú',
        other => other,
    }
}

pub fn pseudo_localize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 6);
    out.push('⟦');
    let mut brace_depth = 0usize;
    for c in text.chars() {
        match c {
            '{' => {
                brace_depth += 1;
                out.push(c);
            }
            '}' => {
                brace_depth = brace_depth.saturating_sub(1);
                out.push(c);
            }
            _ if brace_depth > 0 => out.push(c),
            _ => out.push(accent(c)),
        }
    }
    out.push('⟧');
    out
}

#[async_trait]
impl TranslationBackend for PseudoBackend {
    fn name(&self) -> &'static str {
        "pseudo"
    }

    async fn translate(
        &self,
        request: TranslateRequest,
        progress: Option<mpsc::Sender<ProgressChunk>>,
    ) -> Result<IndexMap<String, String>> {
        let total = request.processable_data.len();
        let mut out = IndexMap::new();
        let mut pending = IndexMap::new();
        for (index, (key, value)) in request.processable_data.iter().enumerate() {
            let translated = pseudo_localize(value);
            out.insert(key.clone(), translated.clone());
            pending.insert(key.clone(), translated);

            let done = index + 1;
            if done % self.chunk_size.max(1) == 0 && done < total {
                if let Some(tx) = &progress {
                    let percent = (done * 100 / total) as u8;
                    let chunk = ProgressChunk {
                        percent,
                        processed: std::mem::take(&mut pending),
                    };
                    // A dropped receiver just means nobody wants progress.
                    let _ = tx.send(chunk).await;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(entries: &[(&str, &str)]) -> TranslateRequest {
        TranslateRequest {
            source_locale: "en".into(),
            target_locale: "de".into(),
            source_data: IndexMap::new(),
            target_data: IndexMap::new(),
            processable_data: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn pseudo_localize_keeps_placeholders() {
        assert_eq!(pseudo_localize("Hello {name}!"), "⟦Hélló {name}!⟧");
    }

    #[tokio::test]
    async fn translates_every_processable_key() {
        let backend = PseudoBackend::default();
        let result = backend
            .translate(request(&[("a", "Hi"), ("b", "Bye")]), None)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["a"], "⟦Hí⟧");
    }

    #[tokio::test]
    async fn streams_chunks_before_resolving() {
        let backend = PseudoBackend { chunk_size: 1 };
        let (tx, mut rx) = mpsc::channel(8);
        let entries: Vec<(String, String)> = (0..3)
            .map(|i| (format!("k{i}"), format!("v{i}")))
            .collect();
        let request = TranslateRequest {
            source_locale: "en".into(),
            target_locale: "de".into(),
            source_data: IndexMap::new(),
            target_data: IndexMap::new(),
            processable_data: entries.into_iter().collect(),
        };
        backend.translate(request, Some(tx)).await.unwrap();

        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            chunks.push(chunk);
        }
        // The final keys arrive with the resolved call, not as a chunk.
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].percent < chunks[1].percent);
    }
}
