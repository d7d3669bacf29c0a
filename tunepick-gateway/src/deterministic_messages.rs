//! Deterministic user-facing messages for the gateway.

pub mod selection {
    use std::time::Duration;

    use crate::selection::SelectionError;

    pub const NO_RESULTS_HINT: &str = "Try a different keyword.";
    pub const SEARCH_FAILED: &str =
        "The song catalog is unavailable right now. Please try again later.";
    pub const NO_SESSION: &str = "There is no song list to pick from. Search for a song first.";
    pub const SESSION_EXPIRED: &str = "The selection window has elapsed. Please search again.";
    pub const NOT_ORIGINATOR: &str = "Only the person who searched can pick from this list.";
    pub const RESOLVE_FAILED: &str =
        "Could not get a playable link for that song. Please search again.";
    pub const FETCH_FAILED: &str = "Downloading the song failed. Please search again.";
    pub const DELIVERY_FAILED: &str = "Sending the voice message failed. Please search again.";

    pub fn empty_keyword(prefix: &str) -> String {
        format!("Please add a keyword, for example: {} Sunny Day", prefix)
    }

    pub fn no_results(keyword: &str) -> String {
        format!("No songs found for \"{}\". {}", keyword, NO_RESULTS_HINT)
    }

    pub fn index_out_of_range(len: usize) -> String {
        format!("Invalid index. The valid range is 1..{}.", len)
    }

    pub fn list_header(keyword: &str) -> String {
        format!("Results for \"{}\":", keyword)
    }

    pub fn selection_hint(len: usize, ttl: Duration) -> String {
        format!(
            "Reply with a number from 1 to {} within {} seconds.",
            len,
            ttl.as_secs()
        )
    }

    /// Text sent to the chat for a rejected request.
    pub fn rejection(error: &SelectionError, keyword: &str, prefix: &str) -> String {
        match error {
            SelectionError::EmptyKeyword => empty_keyword(prefix),
            SelectionError::NoResults => no_results(keyword),
            SelectionError::SearchFailed => SEARCH_FAILED.to_string(),
            SelectionError::NoSession => NO_SESSION.to_string(),
            SelectionError::SessionExpired => SESSION_EXPIRED.to_string(),
            SelectionError::IndexOutOfRange { len } => index_out_of_range(*len),
            SelectionError::NotOriginator => NOT_ORIGINATOR.to_string(),
            SelectionError::ResolveFailed => RESOLVE_FAILED.to_string(),
            SelectionError::FetchFailed => FETCH_FAILED.to_string(),
            SelectionError::DeliveryFailed => DELIVERY_FAILED.to_string(),
        }
    }
}

pub mod discord {
    pub const RESULTS_IMAGE_NAME: &str = "results.png";
}
