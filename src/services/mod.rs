// src/services/mod.rs

//! External collaborators: page fetching, data extraction and
//! notification delivery.

pub mod extract;
pub mod notify;
pub mod scraper;

pub use extract::{Extractor, SubstitutionExtractor};
pub use notify::{DiscordNotifier, Notifier};
pub use scraper::{PageFetcher, PageSource};
