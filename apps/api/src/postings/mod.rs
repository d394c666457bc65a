// Job postings and survey responses: persistence, the in-process backends the
// wizards drive, and the HTTP surface around them.

pub mod handlers;
pub mod repository;
pub mod service;
