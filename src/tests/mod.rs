mod digits;
mod service;
