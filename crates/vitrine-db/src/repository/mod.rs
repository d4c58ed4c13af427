//! # Repository Module
//!
//! Database repository implementations for the order core.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderLifecycle                                                        │
//! │       │                                                                 │
//! │       │  db.orders().find_by_code("ORD-20231211-0001")                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── save(&self, order, items)        one transaction                  │
//! │  ├── find_by_id / find_by_code / find_by_owner / find_all              │
//! │  ├── transition_status(id, from, to)  conditional UPDATE               │
//! │  └── find_missing_codes / assign_code backfill only                    │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Ownership and state-machine rules live above this layer; the          │
//! │  repositories only guarantee atomicity and uniqueness.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Orders and line items
//! - [`ProductRepository`](product::ProductRepository) - Catalog lookups
//! - [`UserRepository`](user::UserRepository) - Caller identity lookups
//! - [`CodeSequenceRepository`](code_sequence::CodeSequenceRepository) - Per-day code counter

pub mod code_sequence;
pub mod order;
pub mod product;
pub mod user;
