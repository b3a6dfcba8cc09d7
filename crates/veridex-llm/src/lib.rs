//! veridex-llm — Provider backend abstraction and the analysis request pipeline.
//!
//! Pipeline stages:
//!   prompt    — raw text → PromptSpec (pure, versioned template)
//!   backend   — PromptSpec → ProviderReply (one network call, hard timeout)
//!   validate  — ProviderReply → AnalysisResult (structural validation)
//!   classify  — ProviderError → AnalysisError (sanitized taxonomy)
//!   service   — orchestrates the above behind `analyze(text)`

pub mod audit;
pub mod backend;
pub mod classify;
pub mod config;
pub mod prompt;
pub mod service;
pub mod validate;
