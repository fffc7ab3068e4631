//! Test fixtures: a canned-page transport that records every request.

use crate::error::{MinerError, Result};
use crate::fetch::Transport;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

#[derive(Default)]
pub struct FixtureTransport {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, address: &str, content: &str) -> Self {
        self.pages.insert(address.to_string(), content.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Transport for FixtureTransport {
    fn get<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(address.to_string());
        }
        let page = self.pages.get(address).cloned();
        Box::pin(async move {
            page.ok_or_else(|| MinerError::Http {
                status: 404,
                address: address.to_string(),
            })
        })
    }
}
