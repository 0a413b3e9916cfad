//! Mock collaborators and fixtures for tests.

mod mock_adapter;
mod recording_transport;

pub use mock_adapter::MockAdapter;
pub use recording_transport::{RecordedCall, RecordingTransport};

/// Small builders for test data.
pub mod fixtures {
    use crate::magnet;
    use crate::models::{DetailRecord, ResultItem};

    pub fn item(title: &str) -> ResultItem {
        let slug = title.to_lowercase().replace(' ', "-");
        ResultItem {
            title: title.to_string(),
            detail_link: format!("https://audiobookbay.lu/abss/{}/", slug),
            image_url: Some(format!("https://covers.example/{}.jpg", slug)),
            size_info: "Format: M4B Size: 500 MBs".to_string(),
        }
    }

    pub fn items(titles: &[&str]) -> Vec<ResultItem> {
        titles.iter().map(|t| item(t)).collect()
    }

    /// Detail record as the scraper would build it, magnet derived.
    pub fn detail(title: &str, info_hash: Option<&str>, trackers: &[&str]) -> DetailRecord {
        let trackers: Vec<String> = trackers.iter().map(|t| t.to_string()).collect();
        DetailRecord {
            title: title.to_string(),
            description: format!("{} read in full.", title),
            image_url: Some("https://covers.example/cover.jpg".to_string()),
            info_hash: info_hash.map(str::to_string),
            magnet: magnet::synthesize(title, info_hash, &trackers),
            trackers,
        }
    }
}
