// Line-delimited JSON API for scriptscope.

pub mod dto;
pub mod server;
