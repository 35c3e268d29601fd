//! Procflow Core Types and Definitions
//!
//! This crate provides the foundational types for procflow process graphs.
//! It includes:
//!
//! - **Identifiers**: String-interned node, edge and document identifiers ([`identifier::Id`])
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and anchor sides ([`geometry`] module)
//! - **Strokes**: Line styling handed to renderers ([`stroke`] module)
//! - **Documents**: The process graph document model ([`document`] module)

pub mod color;
pub mod document;
pub mod geometry;
pub mod identifier;
pub mod stroke;
