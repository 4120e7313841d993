//! QueryGate - Corporate Query Gatekeeper
//!
//! QueryGate sits in front of an enterprise assistant and decides, for each
//! natural-language question an employee submits, whether it may be
//! answered: the query must be on corporate matters and the employee must
//! be authorized for the department whose data it targets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         QueryGate Gatekeeper                        │
//! │                                                                     │
//! │  requester id ──► Requester Directory (CSV / in-memory)             │
//! │                                                                     │
//! │  query ──► ┌────────────────┐   flagged   ┌─────────────────────┐   │
//! │            │ Threat Screener├────────────►│                     │   │
//! │            └───────┬────────┘             │                     │   │
//! │                    ▼                      │                     │   │
//! │            ┌────────────────┐  personal   │                     │   │
//! │            │ Domain Adapter ├────────────►│                     │   │
//! │            └───────┬────────┘             │   Decision Record   │   │
//! │                    ▼                      │                     │   │
//! │            ┌────────────────┐             │  approved           │   │
//! │            │ Topic + Rules  │             │  unauthorized       │   │
//! │            └───────┬────────┘             │  rejected           │   │
//! │                    ▼                      │  error              │   │
//! │            ┌────────────────┐  high risk  │                     │   │
//! │            │ Risk Scorer    ├────────────►│                     │   │
//! │            └───────┬────────┘             │                     │   │
//! │                    ▼                      │                     │   │
//! │            ┌────────────────┐             │                     │   │
//! │            │ Dept Extractor │             │                     │   │
//! │            └───────┬────────┘             │                     │   │
//! │                    ▼                      │                     │   │
//! │            ┌────────────────┐             │                     │   │
//! │            │ Authorization  ├────────────►│                     │   │
//! │            └────────────────┘             └─────────────────────┘   │
//! └──────────────────────────────┬──────────────────────────────────────┘
//!                                │ HTTPS
//!                 ┌──────────────▼──────────────┐
//!                 │ Zero-shot classifier model  │
//!                 └─────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: The gatekeeper, decision records and HTTP handlers
//! - [`classifier`]: Zero-shot classifier contract, domain and topic stages
//! - [`screening`]: Keyword threat screen and heuristic risk scoring
//! - [`department`]: Canonical departments, aliases and extraction
//! - [`directory`]: Requester lookup
//! - [`authz`]: Rule-based department authorization
//! - [`api`]: Unified HTTP router
//! - [`config`]: Configuration management

pub mod api;
pub mod authz;
pub mod classifier;
pub mod config;
pub mod department;
pub mod directory;
pub mod error;
pub mod pipeline;
pub mod screening;

pub use config::QueryGateConfig;
pub use error::{Error, Result};
pub use pipeline::{DecisionRecord, DecisionStatus, Gatekeeper};
