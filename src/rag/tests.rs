use super::*;
use crate::chunking::ChunkMetadata;
use crate::generation::{Generation, GenerationResponse};
use std::cell::RefCell;
use std::collections::HashMap;

/// Generation backend recording every prompt and temperature it receives
struct MockBackend {
    text: String,
    fail: bool,
    prompts: RefCell<Vec<String>>,
    temperatures: RefCell<Vec<f32>>,
}

impl MockBackend {
    fn replying(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
            prompts: RefCell::new(Vec::new()),
            temperatures: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }
}

impl GenerationBackend for MockBackend {
    fn generate(&self, prompt: &str, temperature: f32) -> Result<GenerationResponse> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.temperatures.borrow_mut().push(temperature);
        if self.fail {
            anyhow::bail!("model unavailable");
        }
        Ok(GenerationResponse::Generations {
            generations: vec![Generation {
                text: self.text.clone(),
            }],
        })
    }
}

/// Embedder backed by a fixed text-to-vector table; unregistered texts fail
struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    fn new() -> Self {
        Self {
            vectors: HashMap::new(),
        }
    }

    fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl EmbeddingBackend for TableEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("no vector registered for {text:?}"))
            })
            .collect()
    }

    fn dimension(&self) -> Result<usize> {
        Ok(2)
    }
}

fn chunk(text: &str, source: &str, page: Option<u32>) -> Chunk {
    Chunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source: source.to_string(),
            page,
        },
    }
}

#[test]
fn no_results_yields_the_fixed_message() {
    let store = VectorStore::new(TableEmbedder::new()).expect("should create store");
    let engine = AnswerEngine::new(MockBackend::replying("unused"), 0.7);

    let answer = engine
        .answer(&store, "What is AI?", 4)
        .expect("should answer");

    assert_eq!(answer, NO_RESULTS_RESPONSE);
    assert!(engine.backend.prompts.borrow().is_empty());
}

#[test]
fn prompt_carries_documents_and_question() {
    let embedder = TableEmbedder::new()
        .with_vector("AI is a field of CS.", vec![0.0, 0.0])
        .with_vector("What is AI?", vec![0.1, 0.1]);
    let mut store = VectorStore::new(embedder).expect("should create store");
    store
        .add(vec![chunk("AI is a field of CS.", "intro.pdf", Some(2))])
        .expect("should add chunks");

    let engine = AnswerEngine::new(MockBackend::replying("A field of CS."), 0.7);
    let answer = engine
        .answer(&store, "What is AI?", 1)
        .expect("should answer");

    assert_eq!(answer, "A field of CS.");

    let prompts = engine.backend.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("You are a helpful assistant"));
    assert!(prompts[0].contains("Documents:\nDocument: intro.pdf, Page: 2\nAI is a field of CS."));
    assert!(prompts[0].ends_with("Question: What is AI?"));
}

#[test]
fn temperature_is_passed_through() {
    let embedder = TableEmbedder::new()
        .with_vector("fact", vec![0.0, 0.0])
        .with_vector("query", vec![0.0, 0.0]);
    let mut store = VectorStore::new(embedder).expect("should create store");
    store
        .add(vec![chunk("fact", "a.txt", None)])
        .expect("should add chunks");

    let engine = AnswerEngine::new(MockBackend::replying("ok"), 0.2);
    engine.answer(&store, "query", 1).expect("should answer");

    assert_eq!(*engine.backend.temperatures.borrow(), vec![0.2]);
}

#[test]
fn pageless_chunks_render_an_unknown_page() {
    let chunks = [chunk("plain notes", "notes.txt", None)];

    let prompt = build_prompt(&chunks, "q");

    assert!(prompt.contains("Document: notes.txt, Page: Unknown\nplain notes"));
}

#[test]
fn chunks_join_in_retrieval_order() {
    let chunks = [
        chunk("first passage", "a.pdf", Some(1)),
        chunk("second passage", "b.pdf", Some(3)),
    ];

    let prompt = build_prompt(&chunks, "q");

    assert!(prompt.contains(
        "Document: a.pdf, Page: 1\nfirst passage\n\nDocument: b.pdf, Page: 3\nsecond passage"
    ));
}

#[test]
fn generation_failure_becomes_a_string_result() {
    let embedder = TableEmbedder::new()
        .with_vector("fact", vec![0.0, 0.0])
        .with_vector("query", vec![0.0, 0.0]);
    let mut store = VectorStore::new(embedder).expect("should create store");
    store
        .add(vec![chunk("fact", "a.txt", None)])
        .expect("should add chunks");

    let engine = AnswerEngine::new(MockBackend::failing(), 0.7);
    let answer = engine.answer(&store, "query", 1).expect("should answer");

    assert_eq!(answer, "Error generating response: model unavailable");
}

#[test]
fn retrieval_failure_propagates() {
    let embedder = TableEmbedder::new().with_vector("fact", vec![0.0, 0.0]);
    let mut store = VectorStore::new(embedder).expect("should create store");
    store
        .add(vec![chunk("fact", "a.txt", None)])
        .expect("should add chunks");

    let engine = AnswerEngine::new(MockBackend::replying("unused"), 0.7);

    // The query text has no registered vector, so retrieval itself fails
    assert!(engine.answer(&store, "unregistered query", 1).is_err());
    assert!(engine.backend.prompts.borrow().is_empty());
}
