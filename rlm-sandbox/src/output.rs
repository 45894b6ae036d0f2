//! ABOUTME: Bounded output buffer shared by print()/logger helpers inside a single script execution
//! ABOUTME: Truncates at a configured character cap rather than growing unbounded from a runaway print loop

use std::cell::RefCell;
use std::rc::Rc;

const TRUNCATION_MARKER: &str = "\n...[output truncated]";

#[derive(Clone)]
pub struct OutputBuffer {
    inner: Rc<RefCell<BufferState>>,
}

struct BufferState {
    content: String,
    cap: usize,
    truncated: bool,
}

impl OutputBuffer {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BufferState {
                content: String::new(),
                cap,
                truncated: false,
            })),
        }
    }

    pub fn push(&self, text: &str) {
        let mut state = self.inner.borrow_mut();
        if state.truncated {
            return;
        }
        state.content.push_str(text);
        if state.content.len() > state.cap {
            let mut cut = state.cap.min(state.content.len());
            while !state.content.is_char_boundary(cut) {
                cut -= 1;
            }
            state.content.truncate(cut);
            state.content.push_str(TRUNCATION_MARKER);
            state.truncated = true;
        }
    }

    pub fn push_line(&self, text: &str) {
        self.push(text);
        self.push("\n");
    }

    #[must_use]
    pub fn take(self) -> String {
        Rc::try_unwrap(self.inner).map(|cell| cell.into_inner().content).unwrap_or_else(|rc| rc.borrow().content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_cap_with_marker() {
        let buf = OutputBuffer::new(10);
        buf.push("0123456789ABCDEF");
        let out = buf.take();
        assert!(out.starts_with("0123456789"));
        assert!(out.ends_with("[output truncated]"));
    }

    #[test]
    fn further_writes_after_truncation_are_dropped() {
        let buf = OutputBuffer::new(5);
        buf.push("abcdef");
        buf.push("more");
        let out = buf.take();
        assert_eq!(out.matches("[output truncated]").count(), 1);
    }

    #[test]
    fn untruncated_output_is_returned_verbatim() {
        let buf = OutputBuffer::new(1000);
        buf.push_line("hello");
        assert_eq!(buf.take(), "hello\n");
    }
}
