//! Regex split that keeps the separators.
//!
//! `Regex::split` throws the matched spans away, but the cut pipeline needs
//! both sides: matched spans are dispatched to a block cutter, the gaps go
//! through passthrough handling. This iterator yields every span of the
//! input exactly once, in order, flagged with whether it matched.

use regex::{Matches, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span<'t> {
    pub text: &'t str,
    pub matched: bool,
}

pub(crate) struct SplitSpans<'r, 't> {
    text: &'t str,
    finder: Matches<'r, 't>,
    last: usize,
    queued: Option<(usize, usize)>,
    done: bool,
}

impl<'r, 't> SplitSpans<'r, 't> {
    pub fn new(re: &'r Regex, text: &'t str) -> Self {
        Self {
            text,
            finder: re.find_iter(text),
            last: 0,
            queued: None,
            done: false,
        }
    }
}

impl<'t> Iterator for SplitSpans<'_, 't> {
    type Item = Span<'t>;

    fn next(&mut self) -> Option<Span<'t>> {
        if let Some((start, end)) = self.queued.take() {
            self.last = end;
            return Some(Span {
                text: &self.text[start..end],
                matched: true,
            });
        }
        if self.done {
            return None;
        }
        match self.finder.next() {
            Some(m) => {
                let gap = &self.text[self.last..m.start()];
                self.queued = Some((m.start(), m.end()));
                if gap.is_empty() {
                    self.next()
                } else {
                    Some(Span {
                        text: gap,
                        matched: false,
                    })
                }
            }
            None => {
                self.done = true;
                if self.last < self.text.len() {
                    Some(Span {
                        text: &self.text[self.last..],
                        matched: false,
                    })
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}]+").unwrap());

    fn spans(text: &str) -> Vec<(String, bool)> {
        SplitSpans::new(&RE, text)
            .map(|s| (s.text.to_string(), s.matched))
            .collect()
    }

    #[test]
    fn alternates_gaps_and_matches() {
        assert_eq!(
            spans("abc中文def日语x"),
            [
                ("abc".to_string(), false),
                ("中文".to_string(), true),
                ("def".to_string(), false),
                ("日语".to_string(), true),
                ("x".to_string(), false),
            ]
        );
    }

    #[test]
    fn handles_leading_and_trailing_matches() {
        assert_eq!(
            spans("中文abc中文"),
            [
                ("中文".to_string(), true),
                ("abc".to_string(), false),
                ("中文".to_string(), true),
            ]
        );
    }

    #[test]
    fn all_match_and_no_match() {
        assert_eq!(spans("中文"), [("中文".to_string(), true)]);
        assert_eq!(spans("abc"), [("abc".to_string(), false)]);
        assert!(spans("").is_empty());
    }

    #[test]
    fn concatenation_is_lossless() {
        let text = "a中b文c";
        let joined: String = SplitSpans::new(&RE, text).map(|s| s.text).collect();
        assert_eq!(joined, text);
    }
}
