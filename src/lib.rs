// Decision parsing and action categories
pub mod action;

// Configuration (TOML + environment)
pub mod config;

// Stream payload model and parsing
pub mod event;

// Non-interactive front-end
pub mod headless;

// Visual projections (grids, charts, action timeline)
pub mod projection;

// Per-agent series store
pub mod series;

// Connection lifecycle and sequential apply loop
pub mod stream;

// Terminal dashboard
pub mod tui;
