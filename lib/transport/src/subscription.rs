use paho_mqtt as mqtt;

use crate::topic_matches;

/// Topics the connection subscribes to after every (re)connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub device: String,
    pub diagnostic: Option<String>,
}

/// Which of the subscribed filters a message arrived through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Device,
    Diagnostic,
}

impl Subscription {
    pub fn new(device: impl Into<String>) -> Self {
        Subscription {
            device: device.into(),
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(mut self, filter: impl Into<String>) -> Self {
        self.diagnostic = Some(filter.into());
        self
    }

    pub fn topics_and_qos(&self) -> (Vec<String>, Vec<i32>) {
        let mut topics = vec![self.device.clone()];

        if let Some(diagnostic) = &self.diagnostic {
            if diagnostic != &self.device {
                topics.push(diagnostic.clone());
            }
        }

        let qos = vec![mqtt::QOS_1; topics.len()];

        (topics, qos)
    }

    pub fn classify(&self, topic: &str) -> Option<Source> {
        if topic_matches(&self.device, topic) {
            return Some(Source::Device);
        }

        self.diagnostic
            .as_deref()
            .filter(|filter| topic_matches(filter, topic))
            .map(|_| Source::Diagnostic)
    }
}
