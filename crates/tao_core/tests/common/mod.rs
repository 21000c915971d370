#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tao_core::sync::Pacer;
use tao_core::{ClassificationError, Classifier, Enrichment, Record};

/// Classifier that answers from a fixed table keyed by record name.
///
/// Names without an entry fail with a parse error. Every call yields to the
/// scheduler once so batch items genuinely interleave.
#[derive(Default)]
pub struct ScriptedClassifier {
    answers: Mutex<HashMap<String, Result<Enrichment, ClassificationError>>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call sleep on the Tokio timer before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn succeed(self, name: &str) -> Self {
        self.answer(name, Ok(enrichment_for(name)))
    }

    pub fn fail(self, name: &str) -> Self {
        self.answer(
            name,
            Err(ClassificationError::Network("connection reset".to_string())),
        )
    }

    fn answer(self, name: &str, result: Result<Enrichment, ClassificationError>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(name.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, name: &str) -> Result<Enrichment, ClassificationError> {
        self.calls.lock().unwrap().push(name.to_string());
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        let answers = self.answers.lock().unwrap();
        match answers.get(name) {
            Some(Ok(enrichment)) => Ok(enrichment.clone()),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ClassificationError::Parse(format!("no answer for {name}"))),
        }
    }
}

/// Deterministic enrichment derived from the record name.
pub fn enrichment_for(name: &str) -> Enrichment {
    Enrichment {
        category: "RPG".to_string(),
        tags: vec!["Story".to_string(), format!("{name} tag")],
        description: format!("About {name}."),
        score: 4.0,
    }
}

/// Pacer that records requested pauses without sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Record that already carries a description.
pub fn classified(name: &str) -> Record {
    let mut record = Record::new(name, "PC");
    record.apply_enrichment(&enrichment_for(name));
    record
}
