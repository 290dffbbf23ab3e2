//! Monoque Intelligence: an adaptive learning core.
//!
//! A small HTTP service that relays user chat messages to a hosted language
//! model, keeps the conversation history, and grows a knowledge base from the
//! concepts the model reports learning. Replies are scanned for a fixed marker
//! format:
//!
//! ```text
//! 🧩 Yeni Öğrenilen: Gravity
//! 💬 Tanım: Force pulling objects together
//! ```
//!
//! and every pair found is stored as a verified knowledge item plus a learned
//! concept record.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (one table per collection), timestamps as RFC 3339 text
//! - **Model**: any OpenAI-compatible chat-completions endpoint
//! - **Phase**: `offline` restricts the model to taught knowledge, `online` lets
//!   it learn from the internet; switching phase resets the chat session
//! - **Transport**: JSON over HTTP (axum) under `/api`
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`knowledge`]: Document types, concept extraction, and the collection stores
//! - [`llm`]: Backend trait, OpenAI-compatible client, and the system prompt
//! - [`chat`]: The chat pipeline and the phase-aware session manager
//! - [`server`]: HTTP routes, handlers, and error mapping

pub mod chat;
pub mod config;
pub mod db;
pub mod knowledge;
pub mod llm;
pub mod server;
