pub mod config;
pub mod file_scanner;
pub mod gps_converter;
pub mod image_updater;
pub mod metadata_parser;
pub mod sanity_checker;
