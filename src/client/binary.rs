use std::sync::Arc;

use async_trait::async_trait;

use crate::producer::Producer;
use crate::workload::Workload;

use super::{RequestClient, RequestOutcome};

/// Publishes workload payloads through a shared [`Producer`].
pub struct BinaryRequestClient {
    producer: Arc<dyn Producer>,
    workload: Arc<Workload>,
    topic: String,
    ordered: bool,
}

impl BinaryRequestClient {
    #[must_use]
    pub fn new(
        workload: Arc<Workload>,
        producer: Arc<dyn Producer>,
        topic: String,
        ordered: bool,
    ) -> Self {
        Self {
            producer,
            workload,
            topic,
            ordered,
        }
    }

    fn partition_key(&self, index: u64) -> String {
        if self.ordered {
            format!("p{}", index)
        } else {
            String::new()
        }
    }
}

#[async_trait]
impl RequestClient for BinaryRequestClient {
    async fn do_request(&self, index: u64) -> RequestOutcome {
        let Some(body) = self.workload.body(index) else {
            return RequestOutcome::Failure("Workload has no payload for the producer".to_owned());
        };
        let key = self.partition_key(index);
        match self.producer.send(&self.topic, body, &key).await {
            Ok(()) => RequestOutcome::Success,
            Err(err) => RequestOutcome::Failure(err.to_string()),
        }
    }
}
