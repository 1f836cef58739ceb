//! Bounded memory window.
//!
//! Holds the most recent (step, result summary) pairs and renders them
//! into the context block of the executor prompt. Strict FIFO: eviction
//! is oldest-first on overflow and entries are never re-ordered by
//! access.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rendering used when no step has completed yet.
const EMPTY_MEMORY_TEXT: &str = "None - this is the first step";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub step_text: String,
    pub result_summary: String,
}

/// Bounded FIFO of recent step results. Invariant: `len() <= max_size`
/// after every call.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    entries: VecDeque<MemoryEntry>,
    max_size: usize,
}

impl MemoryWindow {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Append an entry, evicting the oldest entries until the bound holds.
    pub fn record(&mut self, step_text: impl Into<String>, result_summary: impl Into<String>) {
        self.entries.push_back(MemoryEntry {
            step_text: step_text.into(),
            result_summary: result_summary.into(),
        });
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    /// Deterministic 1-indexed rendering in chronological order. Pure:
    /// rendering never mutates the window.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_MEMORY_TEXT.to_string();
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "Step {}: {} → Result: {}",
                    i + 1,
                    entry.step_text,
                    entry.result_summary
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_renders_sentinel() {
        let window = MemoryWindow::new(5);
        assert_eq!(window.render(), "None - this is the first step");
    }

    #[test]
    fn bound_holds_and_keeps_newest_in_order() {
        let mut window = MemoryWindow::new(3);
        for i in 0..7 {
            window.record(format!("step {}", i), format!("result {}", i));
            assert!(window.len() <= 3);
        }
        let steps: Vec<&str> = window.entries().map(|e| e.step_text.as_str()).collect();
        assert_eq!(steps, vec!["step 4", "step 5", "step 6"]);
    }

    #[test]
    fn render_is_one_indexed_and_chronological() {
        let mut window = MemoryWindow::new(2);
        window.record("add", "3");
        window.record("multiply", "6");
        assert_eq!(
            window.render(),
            "Step 1: add → Result: 3\nStep 2: multiply → Result: 6"
        );
    }

    #[test]
    fn zero_capacity_window_stays_empty() {
        let mut window = MemoryWindow::new(0);
        window.record("a", "b");
        assert!(window.is_empty());
        assert_eq!(window.render(), "None - this is the first step");
    }
}
