// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Worker-side effect handlers backing the workflows.

use strand_runtime::EffectRegistry;

use crate::greeting::GREETING_SERVICE_OPERATION;
use crate::language::Language;
use crate::relay::UPPERCASE_OPERATION;

/// Greetings known to the remote greeting service.
///
/// A superset of the greeting workflow's built-in defaults, but still not
/// the full declared domain: Hindi is unsupported, which exercises the
/// semantic "absent" result.
fn greeting_for(language: Language) -> Option<String> {
    let greeting = match language {
        Language::Arabic => "مرحبا بالعالم",
        Language::Chinese => "你好，世界",
        Language::English => "Hello, world",
        Language::French => "Bonjour, monde",
        Language::Portuguese => "Olá, mundo",
        Language::Spanish => "Hola, mundo",
        Language::Hindi => return None,
    };
    Some(greeting.to_string())
}

/// Build the registry a worker serves both workflows from.
pub fn worker_registry() -> EffectRegistry {
    EffectRegistry::new()
        .register(UPPERCASE_OPERATION, |input| async move {
            Ok(Some(input.to_uppercase()))
        })
        .register(GREETING_SERVICE_OPERATION, |input| async move {
            // An unparseable code is indistinguishable from an unsupported
            // language to the caller.
            Ok(input
                .parse::<Language>()
                .ok()
                .and_then(greeting_for))
        })
}
