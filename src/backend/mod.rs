// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum backend interface and implementations.
//!
//! This module provides the [`QuantumBackend`] trait consumed by the
//! orchestration controller, and the reference implementation:
//!
//! - `statevector::StateVectorBackend`: noiseless joint state-vector
//!   simulator used by tests and the CLI

pub mod statevector;
pub mod r#trait;

pub use r#trait::QuantumBackend;
pub use statevector::StateVectorBackend;
