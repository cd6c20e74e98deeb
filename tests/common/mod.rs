#![allow(dead_code)]

pub mod alloc_probe;
pub mod fixtures;
