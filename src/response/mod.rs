//! Response encoding - data URL handling for image transport

pub mod data_url;
