#![allow(dead_code)]

pub mod scripted_probe;
pub mod status_server;
