//! Frame parsing logic
//!
//! A frame is the ordered sequence of text lines collected between two
//! blank-line delimiters. `parse_frame` is pure: no I/O, no state, safe
//! to call repeatedly and concurrently.

use super::event::ServerEvent;

/// Field prefix declaring the event type.
const EVENT_PREFIX: &str = "event: ";
/// Field prefix carrying one payload line.
const DATA_PREFIX: &str = "data: ";

/// Parse the raw lines of exactly one frame into a [`ServerEvent`].
///
/// The first line starting with `event: ` supplies the event type
/// (remainder taken verbatim). All lines starting with `data: ` are
/// stripped of the prefix and concatenated with no separator, per the
/// SSE wire convention for multi-line payloads. Any other field
/// (`id:`, `retry:`, comments) is ignored.
///
/// Returns `None` when the frame carries no usable event: empty input,
/// no event type, no data, or either value empty. Callers skip such
/// frames and continue; a `None` here is never an error.
pub fn parse_frame<S: AsRef<str>>(lines: &[S]) -> Option<ServerEvent> {
    if lines.is_empty() {
        return None;
    }

    let mut event_type: Option<&str> = None;
    let mut data = String::new();

    for line in lines {
        let line = line.as_ref();
        if let Some(rest) = line.strip_prefix(EVENT_PREFIX) {
            if event_type.is_none() {
                event_type = Some(rest);
            }
        } else if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            data.push_str(rest);
        }
    }

    match event_type {
        Some(event_type) if !event_type.is_empty() && !data.is_empty() => {
            Some(ServerEvent::new(event_type, data))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_frame() {
        let event = parse_frame(&["event: IssueChanged", "data: {\"a\":1}"]).unwrap();
        assert_eq!(event.event_type, "IssueChanged");
        assert_eq!(event.data, "{\"a\":1}");
    }

    #[test]
    fn test_multi_line_data_concatenated_without_separator() {
        let event = parse_frame(&["event: X", "data: A", "data: B"]).unwrap();
        assert_eq!(event.event_type, "X");
        assert_eq!(event.data, "AB");
    }

    #[test]
    fn test_data_lines_join_across_fields() {
        let event = parse_frame(&["event: X", "data: foo", "data: bar"]).unwrap();
        assert_eq!(event.data, "foobar");
    }

    #[test]
    fn test_empty_input_returns_none() {
        let lines: [&str; 0] = [];
        assert!(parse_frame(&lines).is_none());
    }

    #[test]
    fn test_missing_event_type_returns_none() {
        assert!(parse_frame(&["data: payload"]).is_none());
    }

    #[test]
    fn test_missing_data_returns_none() {
        assert!(parse_frame(&["event: X"]).is_none());
    }

    #[test]
    fn test_empty_event_type_returns_none() {
        assert!(parse_frame(&["event: ", "data: payload"]).is_none());
    }

    #[test]
    fn test_empty_data_returns_none() {
        assert!(parse_frame(&["event: X", "data: "]).is_none());
    }

    #[test]
    fn test_first_event_line_wins() {
        let event = parse_frame(&["event: First", "event: Second", "data: payload"]).unwrap();
        assert_eq!(event.event_type, "First");
    }

    #[test]
    fn test_event_type_taken_verbatim() {
        // No trimming beyond prefix removal
        let event = parse_frame(&["event: Spaced Type ", "data: x"]).unwrap();
        assert_eq!(event.event_type, "Spaced Type ");
    }

    #[test]
    fn test_unrecognized_fields_ignored() {
        let event = parse_frame(&[
            "id: 42",
            "retry: 1000",
            ": a comment",
            "event: X",
            "data: payload",
        ])
        .unwrap();
        assert_eq!(event.event_type, "X");
        assert_eq!(event.data, "payload");
    }

    #[test]
    fn test_prefix_requires_space() {
        // "event:" without the trailing space is not a recognized field
        assert!(parse_frame(&["event:X", "data:payload"]).is_none());
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let lines = ["event: X", "data: A"];
        let first = parse_frame(&lines).unwrap();
        let second = parse_frame(&lines).unwrap();
        assert_eq!(first, second);
    }
}
