mod common;
mod ranking;
mod scoring;
mod service;
