pub mod download_event;
