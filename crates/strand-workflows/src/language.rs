// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The declared language domain for the greeting workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the greeting workflow knows about.
///
/// This is the full declared domain; at any point in time only a subset is
/// actually supported (has a greeting mapped). The `Ord` impl defines the
/// deterministic listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    Chinese,
    English,
    French,
    Hindi,
    Portuguese,
    Spanish,
}

impl Language {
    /// All declared languages, in sorted order.
    pub const ALL: [Language; 7] = [
        Language::Arabic,
        Language::Chinese,
        Language::English,
        Language::French,
        Language::Hindi,
        Language::Portuguese,
        Language::Spanish,
    ];

    /// Lowercase wire code for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::Chinese => "chinese",
            Language::English => "english",
            Language::French => "french",
            Language::Hindi => "hindi",
            Language::Portuguese => "portuguese",
            Language::Spanish => "spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized language codes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
